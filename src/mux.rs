use std::io::Write;

use anyhow::Context as _;

use crate::{
    canvas::export_chunk,
    config::{InterlaceLayout, StreamConfig},
    error::{RawyccError, RawyccResult},
    frame::Frame,
    layout::{ChunkChannels, PARTITION_SUFFIXES, frame_plan},
    partition::{PartitionMode, PartitionSink},
};

/// Encodes `frames` back-to-back into `dst` in the configured layout.
///
/// The write path has no virtual-canvas asymmetry: every frame is the full
/// canvas, so a config with a narrower crop is rejected before any byte is
/// written. Partitioned streams write per-channel files instead; see
/// [`encode_partitioned`].
#[tracing::instrument(skip(cfg, frames, dst), fields(scenes = frames.len(), layout = ?cfg.layout))]
pub fn encode<W: Write>(frames: &[Frame], cfg: &StreamConfig, dst: &mut W) -> RawyccResult<()> {
    check_encode_config(cfg)?;
    if cfg.layout == InterlaceLayout::Partitioned {
        return Err(RawyccError::configuration(
            "partitioned streams live in per-channel files; use encode_partitioned",
        ));
    }
    let plan = frame_plan(cfg);
    let mut raw = Vec::new();
    for (scene, frame) in frames.iter().enumerate() {
        check_frame_matches(cfg, frame, scene)?;
        for chunk in &plan {
            export_chunk(cfg, chunk, frame, &mut raw);
            dst.write_all(&raw)
                .with_context(|| format!("write scene {scene} chunk"))?;
        }
        tracing::trace!(scene, "scene written");
    }
    Ok(())
}

/// Encodes `frames` across per-channel files. The first scene creates (or
/// truncates) each channel stream; later scenes append, so each stream ends
/// up holding that channel's plane for every scene in order.
#[tracing::instrument(skip(cfg, frames, parts), fields(scenes = frames.len()))]
pub fn encode_partitioned(
    frames: &[Frame],
    cfg: &StreamConfig,
    parts: &mut dyn PartitionSink,
) -> RawyccResult<()> {
    check_encode_config(cfg)?;
    if cfg.layout != InterlaceLayout::Partitioned {
        return Err(RawyccError::configuration(
            "encode_partitioned requires the partitioned layout; use encode",
        ));
    }
    let plan = frame_plan(cfg);
    let mut raw = Vec::new();
    for (scene, frame) in frames.iter().enumerate() {
        check_frame_matches(cfg, frame, scene)?;
        let mode = if scene == 0 {
            PartitionMode::Create
        } else {
            PartitionMode::Append
        };
        // One channel stream open at a time: opened, filled, then closed.
        for chunk in &plan {
            let suffix = match chunk.select {
                ChunkChannels::One(c) => PARTITION_SUFFIXES[c],
                ChunkChannels::All => unreachable!("partitioned plans are per-channel"),
            };
            export_chunk(cfg, chunk, frame, &mut raw);
            let mut dst = parts.open_channel(suffix, mode)?;
            dst.write_all(&raw)
                .with_context(|| format!("write scene {scene} channel '{suffix}' plane"))?;
            dst.flush()
                .with_context(|| format!("flush channel '{suffix}'"))?;
        }
        tracing::trace!(scene, "scene partitioned");
    }
    Ok(())
}

fn check_encode_config(cfg: &StreamConfig) -> RawyccResult<()> {
    cfg.validate()?;
    if !cfg.is_full_canvas() {
        return Err(RawyccError::configuration(
            "encoding does not support a crop rectangle; the frame is always the full canvas",
        ));
    }
    Ok(())
}

fn check_frame_matches(cfg: &StreamConfig, frame: &Frame, scene: usize) -> RawyccResult<()> {
    if frame.width() != cfg.width
        || frame.height() != cfg.height
        || frame.channels() != cfg.channels
        || frame.depth() != cfg.depth
    {
        return Err(RawyccError::configuration(format!(
            "scene {scene} frame is {}x{} ({} channels, {:?}); config wants {}x{} ({} channels, {:?})",
            frame.width(),
            frame.height(),
            frame.channels().count(),
            frame.depth(),
            cfg.width,
            cfg.height,
            cfg.channels.count(),
            cfg.depth,
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelCount, CropRect, SampleDepth};

    fn solid_frame(value: u16) -> Frame {
        Frame::from_samples(
            4,
            2,
            ChannelCount::Ycc,
            SampleDepth::Eight,
            vec![value; 4 * 2 * 3],
        )
        .unwrap()
    }

    #[test]
    fn concrete_4x2_interleaved_stream_is_24_bytes() {
        let data: Vec<u16> = (0..24).collect();
        let frame =
            Frame::from_samples(4, 2, ChannelCount::Ycc, SampleDepth::Eight, data).unwrap();
        let mut out = Vec::new();
        encode(&[frame], &StreamConfig::new(4, 2), &mut out).unwrap();
        let expect: Vec<u8> = (0..24).collect();
        assert_eq!(out, expect);
    }

    #[test]
    fn cropped_config_is_refused() {
        let cfg = StreamConfig::new(4, 2).with_crop(CropRect::new(0, 0, 2, 2));
        let err = encode(&[solid_frame(1)], &cfg, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, RawyccError::Configuration(_)));
    }

    #[test]
    fn mismatched_frame_is_refused() {
        let cfg = StreamConfig::new(8, 8);
        let err = encode(&[solid_frame(1)], &cfg, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, RawyccError::Configuration(_)));
    }

    #[test]
    fn line_interlaced_groups_channels_per_row() {
        let mut frame = Frame::new(2, 1, ChannelCount::Ycc, SampleDepth::Eight).unwrap();
        frame.row_mut(0).copy_from_slice(&[1, 2, 3, 4, 5, 6]);
        let cfg = StreamConfig::new(2, 1).with_layout(InterlaceLayout::LineInterlaced);
        let mut out = Vec::new();
        encode(&[frame], &cfg, &mut out).unwrap();
        // Y pair, Cb pair, Cr pair.
        assert_eq!(out, vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn plane_interlaced_groups_channels_per_frame() {
        let mut frame = Frame::new(2, 2, ChannelCount::Ycc, SampleDepth::Eight).unwrap();
        frame.row_mut(0).copy_from_slice(&[1, 2, 3, 4, 5, 6]);
        frame.row_mut(1).copy_from_slice(&[7, 8, 9, 10, 11, 12]);
        let cfg = StreamConfig::new(2, 2).with_layout(InterlaceLayout::PlaneInterlaced);
        let mut out = Vec::new();
        encode(&[frame], &cfg, &mut out).unwrap();
        assert_eq!(out, vec![1, 4, 7, 10, 2, 5, 8, 11, 3, 6, 9, 12]);
    }

    #[test]
    fn sixteen_bit_output_honors_endianness() {
        let frame = Frame::from_samples(
            1,
            1,
            ChannelCount::Ycc,
            SampleDepth::Sixteen,
            vec![0x1234, 0x0042, 0xFFFF],
        )
        .unwrap();
        let base = StreamConfig::new(1, 1).with_depth(SampleDepth::Sixteen);

        let mut big = Vec::new();
        encode(&[frame.clone()], &base.clone(), &mut big).unwrap();
        assert_eq!(big, vec![0x12, 0x34, 0x00, 0x42, 0xFF, 0xFF]);

        let mut little = Vec::new();
        encode(
            &[frame],
            &base.with_endian(crate::config::Endian::Little),
            &mut little,
        )
        .unwrap();
        assert_eq!(little, vec![0x34, 0x12, 0x42, 0x00, 0xFF, 0xFF]);
    }
}
