use std::{fs::File, io::BufReader, io::BufWriter, path::PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use rawycc::{
    ChannelCount, CropRect, Endian, Frame, FsPartitions, InterlaceLayout, SampleDepth,
    StreamConfig, layout,
};

#[derive(Parser, Debug)]
#[command(name = "rawycc", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a raw sample stream into one PNG per scene.
    Decode(DecodeArgs),
    /// Encode PNG frames into a raw sample stream.
    Encode(EncodeArgs),
    /// Report the per-scene byte size and the scene count implied by the
    /// input length, without reading any pixels.
    Probe(ProbeArgs),
}

#[derive(Parser, Debug)]
struct StreamArgs {
    /// Stream config JSON (same schema as the library's StreamConfig).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas width in pixels (required unless --config is given).
    #[arg(long, required_unless_present = "config")]
    width: Option<u32>,

    /// Canvas height in pixels (required unless --config is given).
    #[arg(long, required_unless_present = "config")]
    height: Option<u32>,

    /// Channels per pixel (default ycc; overrides --config when given).
    #[arg(long, value_enum)]
    channels: Option<ChannelsChoice>,

    /// Bits per sample (default 8; overrides --config when given).
    #[arg(long, value_enum)]
    depth: Option<DepthChoice>,

    /// 16-bit sample byte order (default big; overrides --config when given).
    #[arg(long, value_enum)]
    endian: Option<EndianChoice>,

    /// Channel interleaving (default interleaved; overrides --config when given).
    #[arg(long, value_enum)]
    layout: Option<LayoutChoice>,

    /// Crop window as `x,y,width,height` (decode only).
    #[arg(long)]
    crop: Option<String>,

    /// Leading scenes to discard (default 0; overrides --config when given).
    #[arg(long)]
    scene_offset: Option<u64>,

    /// Maximum scenes to retain (decode only).
    #[arg(long)]
    scene_count: Option<u64>,
}

#[derive(Parser, Debug)]
struct DecodeArgs {
    /// Input stream path; for the partition layout, the base path whose
    /// channel files carry .Y/.Cb/.Cr/.A suffixes.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output prefix; scenes are written as `<out>-NNN.png`.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    stream: StreamArgs,
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Input PNG frames, one per scene, in scene order.
    #[arg(long = "in", required = true, num_args = 1..)]
    in_paths: Vec<PathBuf>,

    /// Output stream path (partition layout: the base path).
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    stream: StreamArgs,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Input stream path (partition layout: the base path).
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    stream: StreamArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ChannelsChoice {
    Ycc,
    Ycca,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DepthChoice {
    #[value(name = "8")]
    Eight,
    #[value(name = "16")]
    Sixteen,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EndianChoice {
    Big,
    Little,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LayoutChoice {
    Interleaved,
    Line,
    Plane,
    Partition,
}

impl StreamArgs {
    fn to_config(&self) -> anyhow::Result<StreamConfig> {
        let mut cfg: StreamConfig = match &self.config {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("open config '{}'", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("parse config '{}'", path.display()))?
            }
            None => StreamConfig::new(
                self.width.context("--width is required without --config")?,
                self.height.context("--height is required without --config")?,
            ),
        };
        if let Some(width) = self.width {
            cfg.width = width;
        }
        if let Some(height) = self.height {
            cfg.height = height;
        }
        if let Some(channels) = self.channels {
            cfg.channels = match channels {
                ChannelsChoice::Ycc => ChannelCount::Ycc,
                ChannelsChoice::Ycca => ChannelCount::YccA,
            };
        }
        if let Some(depth) = self.depth {
            cfg.depth = match depth {
                DepthChoice::Eight => SampleDepth::Eight,
                DepthChoice::Sixteen => SampleDepth::Sixteen,
            };
        }
        if let Some(endian) = self.endian {
            cfg.endian = match endian {
                EndianChoice::Big => Endian::Big,
                EndianChoice::Little => Endian::Little,
            };
        }
        if let Some(layout) = self.layout {
            cfg.layout = match layout {
                LayoutChoice::Interleaved => InterlaceLayout::Interleaved,
                LayoutChoice::Line => InterlaceLayout::LineInterlaced,
                LayoutChoice::Plane => InterlaceLayout::PlaneInterlaced,
                LayoutChoice::Partition => InterlaceLayout::Partitioned,
            };
        }
        if let Some(spec) = &self.crop {
            cfg.crop = Some(parse_crop(spec)?);
        }
        if let Some(offset) = self.scene_offset {
            cfg.scene_offset = offset;
        }
        if self.scene_count.is_some() {
            cfg.scene_count = self.scene_count;
        }
        Ok(cfg)
    }
}

fn parse_crop(spec: &str) -> anyhow::Result<CropRect> {
    let parts: Vec<u32> = spec
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .with_context(|| format!("parse crop '{spec}'"))?;
    anyhow::ensure!(
        parts.len() == 4,
        "crop must be `x,y,width,height`, got '{spec}'"
    );
    Ok(CropRect::new(parts[0], parts[1], parts[2], parts[3]))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Decode(args) => run_decode(args),
        Command::Encode(args) => run_encode(args),
        Command::Probe(args) => run_probe(args),
    }
}

fn run_decode(args: DecodeArgs) -> anyhow::Result<()> {
    let cfg = args.stream.to_config()?;

    let outcome = if cfg.layout == InterlaceLayout::Partitioned {
        let mut parts = FsPartitions::new(&args.in_path);
        rawycc::decode_partitioned(&cfg, &mut parts)
    } else {
        let file = File::open(&args.in_path)
            .with_context(|| format!("open '{}'", args.in_path.display()))?;
        rawycc::decode(&cfg, &mut BufReader::new(file))
    };

    for (scene, frame) in outcome.frames.iter().enumerate() {
        let path = scene_png_path(&args.out, scene);
        save_frame_png(frame, &path)?;
        println!("wrote {}", path.display());
    }
    if let Some(failure) = outcome.failure {
        anyhow::bail!(
            "decode stopped after {} complete scene(s): {failure}",
            outcome.frames.len()
        );
    }
    Ok(())
}

fn run_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let cfg = args.stream.to_config()?;

    let mut frames = Vec::with_capacity(args.in_paths.len());
    for path in &args.in_paths {
        frames.push(load_frame_png(path, &cfg)?);
    }

    if cfg.layout == InterlaceLayout::Partitioned {
        let mut parts = FsPartitions::new(&args.out);
        rawycc::encode_partitioned(&frames, &cfg, &mut parts)?;
        for suffix in &rawycc::PARTITION_SUFFIXES[..cfg.channels.count()] {
            println!("wrote {}", parts.channel_path(suffix).display());
        }
    } else {
        let file = File::create(&args.out)
            .with_context(|| format!("create '{}'", args.out.display()))?;
        let mut out = BufWriter::new(file);
        rawycc::encode(&frames, &cfg, &mut out)?;
        println!("wrote {}", args.out.display());
    }
    Ok(())
}

fn run_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let cfg = args.stream.to_config()?;
    cfg.validate()?;

    let scene_bytes = layout::frame_bytes(&cfg) as u64;
    println!(
        "{}x{} {} channel(s), {}-bit, {:?}: {scene_bytes} bytes per scene",
        cfg.width,
        cfg.height,
        cfg.channels.count(),
        cfg.depth.bytes_per_sample() * 8,
        cfg.layout,
    );

    if cfg.layout == InterlaceLayout::Partitioned {
        let parts = FsPartitions::new(&args.in_path);
        let plane_bytes = scene_bytes / cfg.channels.count() as u64;
        for suffix in &rawycc::PARTITION_SUFFIXES[..cfg.channels.count()] {
            let path = parts.channel_path(suffix);
            let len = std::fs::metadata(&path)
                .with_context(|| format!("stat '{}'", path.display()))?
                .len();
            println!(
                "  {}: {len} bytes = {} scene(s){}",
                path.display(),
                len / plane_bytes,
                if len % plane_bytes != 0 {
                    " + trailing bytes"
                } else {
                    ""
                }
            );
        }
    } else {
        let len = std::fs::metadata(&args.in_path)
            .with_context(|| format!("stat '{}'", args.in_path.display()))?
            .len();
        println!(
            "  {}: {len} bytes = {} scene(s){}",
            args.in_path.display(),
            len / scene_bytes,
            if len % scene_bytes != 0 {
                " + trailing bytes"
            } else {
                ""
            }
        );
    }
    Ok(())
}

fn scene_png_path(prefix: &PathBuf, scene: usize) -> PathBuf {
    let mut name = prefix.file_name().unwrap_or_default().to_os_string();
    name.push(format!("-{scene:03}.png"));
    prefix.with_file_name(name)
}

/// Samples pass through unchanged; the PNG is written as RGB(A) purely as a
/// container. No colorspace conversion happens here.
fn save_frame_png(frame: &Frame, path: &PathBuf) -> anyhow::Result<()> {
    let w = frame.width();
    let h = frame.height();
    match (frame.depth(), frame.channels()) {
        (SampleDepth::Eight, ChannelCount::Ycc) => {
            let data: Vec<u8> = frame.samples().iter().map(|&s| s as u8).collect();
            image::RgbImage::from_raw(w, h, data)
                .context("frame buffer size mismatch")?
                .save(path)?;
        }
        (SampleDepth::Eight, ChannelCount::YccA) => {
            let data: Vec<u8> = frame.samples().iter().map(|&s| s as u8).collect();
            image::RgbaImage::from_raw(w, h, data)
                .context("frame buffer size mismatch")?
                .save(path)?;
        }
        (SampleDepth::Sixteen, ChannelCount::Ycc) => {
            image::ImageBuffer::<image::Rgb<u16>, Vec<u16>>::from_raw(
                w,
                h,
                frame.samples().to_vec(),
            )
            .context("frame buffer size mismatch")?
            .save(path)?;
        }
        (SampleDepth::Sixteen, ChannelCount::YccA) => {
            image::ImageBuffer::<image::Rgba<u16>, Vec<u16>>::from_raw(
                w,
                h,
                frame.samples().to_vec(),
            )
            .context("frame buffer size mismatch")?
            .save(path)?;
        }
    }
    Ok(())
}

fn load_frame_png(path: &PathBuf, cfg: &StreamConfig) -> anyhow::Result<Frame> {
    let img = image::open(path).with_context(|| format!("open '{}'", path.display()))?;
    let samples: Vec<u16> = match (cfg.depth, cfg.channels) {
        (SampleDepth::Eight, ChannelCount::Ycc) => {
            img.to_rgb8().into_raw().into_iter().map(u16::from).collect()
        }
        (SampleDepth::Eight, ChannelCount::YccA) => {
            img.to_rgba8().into_raw().into_iter().map(u16::from).collect()
        }
        (SampleDepth::Sixteen, ChannelCount::Ycc) => img.to_rgb16().into_raw(),
        (SampleDepth::Sixteen, ChannelCount::YccA) => img.to_rgba16().into_raw(),
    };
    Frame::from_samples(cfg.width, cfg.height, cfg.channels, cfg.depth, samples)
        .map_err(|e| anyhow::anyhow!("frame '{}': {e}", path.display()))
}
