use std::path::PathBuf;

fn rawycc_exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_rawycc")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) { "rawycc.exe" } else { "rawycc" });
            p
        })
}

#[test]
fn cli_decode_writes_one_png_per_scene() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    // Two 4x2 interleaved scenes, 24 bytes each.
    let stream: Vec<u8> = (0..48).collect();
    let in_path = dir.join("scenes.ycbcr");
    std::fs::write(&in_path, &stream).unwrap();

    let out_prefix = dir.join("scene");
    let status = std::process::Command::new(rawycc_exe())
        .args(["decode", "--in"])
        .arg(&in_path)
        .args(["--width", "4", "--height", "2", "--out"])
        .arg(&out_prefix)
        .status()
        .expect("spawn rawycc");
    assert!(status.success());

    for scene in 0..2 {
        let png = dir.join(format!("scene-{scene:03}.png"));
        assert!(png.is_file(), "missing {}", png.display());
        let img = image::open(&png).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (4, 2));
    }
    assert!(!dir.join("scene-002.png").exists());
}

#[test]
fn cli_probe_reports_scene_count() {
    let dir = PathBuf::from("target").join("cli_smoke_probe");
    std::fs::create_dir_all(&dir).unwrap();

    let in_path = dir.join("three.ycbcr");
    std::fs::write(&in_path, vec![0u8; 24 * 3]).unwrap();

    let output = std::process::Command::new(rawycc_exe())
        .args(["probe", "--in"])
        .arg(&in_path)
        .args(["--width", "4", "--height", "2"])
        .output()
        .expect("spawn rawycc");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("24 bytes per scene"), "{stdout}");
    assert!(stdout.contains("3 scene(s)"), "{stdout}");
}

#[test]
fn cli_explicit_scene_offset_zero_overrides_config() {
    let dir = PathBuf::from("target").join("cli_smoke_offset");
    std::fs::create_dir_all(&dir).unwrap();

    let stream: Vec<u8> = (0..48).collect();
    let in_path = dir.join("scenes.ycbcr");
    std::fs::write(&in_path, &stream).unwrap();
    let cfg_path = dir.join("stream.json");
    std::fs::write(&cfg_path, r#"{"width":4,"height":2,"scene_offset":1}"#).unwrap();

    // The sidecar's skip applies when the flag is absent.
    let out_prefix = dir.join("skipped");
    let status = std::process::Command::new(rawycc_exe())
        .args(["decode", "--in"])
        .arg(&in_path)
        .arg("--config")
        .arg(&cfg_path)
        .arg("--out")
        .arg(&out_prefix)
        .status()
        .expect("spawn rawycc");
    assert!(status.success());
    assert!(dir.join("skipped-000.png").is_file());
    assert!(!dir.join("skipped-001.png").exists());

    // An explicit zero wins over the sidecar.
    let out_prefix = dir.join("all");
    let status = std::process::Command::new(rawycc_exe())
        .args(["decode", "--in"])
        .arg(&in_path)
        .arg("--config")
        .arg(&cfg_path)
        .args(["--scene-offset", "0", "--out"])
        .arg(&out_prefix)
        .status()
        .expect("spawn rawycc");
    assert!(status.success());
    assert!(dir.join("all-000.png").is_file());
    assert!(dir.join("all-001.png").is_file());
}

#[test]
fn cli_decode_fails_loudly_on_truncated_input() {
    let dir = PathBuf::from("target").join("cli_smoke_trunc");
    std::fs::create_dir_all(&dir).unwrap();

    let in_path = dir.join("short.ycbcr");
    std::fs::write(&in_path, vec![0u8; 30]).unwrap();

    let out_prefix = dir.join("scene");
    let output = std::process::Command::new(rawycc_exe())
        .args(["decode", "--in"])
        .arg(&in_path)
        .args(["--width", "4", "--height", "2", "--out"])
        .arg(&out_prefix)
        .output()
        .expect("spawn rawycc");
    assert!(!output.status.success());
    // The complete first scene is still written before the failure.
    assert!(dir.join("scene-000.png").is_file());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("truncated stream"), "{stderr}");
}
