use std::io::{self, Read};

use crate::{
    canvas::{ScratchCanvas, composite_chunk},
    config::{InterlaceLayout, StreamConfig},
    error::{RawyccError, RawyccResult},
    frame::Frame,
    layout::{ChunkChannels, ChunkSpec, PARTITION_SUFFIXES, frame_plan},
    partition::PartitionSource,
};

/// Result of one decode call.
///
/// Frames fully completed before a failure are always returned alongside it;
/// a partially-filled frame is never handed out. It is the caller's decision
/// whether a partial sequence is acceptable.
#[derive(Debug)]
pub struct DecodeOutcome {
    pub frames: Vec<Frame>,
    pub failure: Option<RawyccError>,
}

impl DecodeOutcome {
    fn ok(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            failure: None,
        }
    }

    fn fail(frames: Vec<Frame>, failure: RawyccError) -> Self {
        Self {
            frames,
            failure: Some(failure),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }

    /// Collapses to a plain `Result`, discarding partial frames on failure.
    pub fn into_result(self) -> RawyccResult<Vec<Frame>> {
        match self.failure {
            None => Ok(self.frames),
            Some(failure) => Err(failure),
        }
    }
}

/// Decodes every scene of a single-stream layout from `src`.
///
/// Honors `scene_offset` (leading scenes are read and discarded chunk by
/// chunk), `scene_count`, the crop window, and ping mode. Partitioned
/// streams read from per-channel files instead; see [`decode_partitioned`].
#[tracing::instrument(skip(cfg, src), fields(width = cfg.width, height = cfg.height, layout = ?cfg.layout))]
pub fn decode<R: Read>(cfg: &StreamConfig, src: &mut R) -> DecodeOutcome {
    if let Err(e) = cfg.validate() {
        return DecodeOutcome::fail(Vec::new(), e);
    }
    if cfg.layout == InterlaceLayout::Partitioned {
        return DecodeOutcome::fail(
            Vec::new(),
            RawyccError::configuration(
                "partitioned streams live in per-channel files; use decode_partitioned",
            ),
        );
    }
    if cfg.ping {
        return DecodeOutcome::ok(Vec::new());
    }

    let plan = frame_plan(cfg);
    let mut canvas = match ScratchCanvas::for_config(cfg, &plan) {
        Ok(canvas) => canvas,
        Err(e) => return DecodeOutcome::fail(Vec::new(), e),
    };
    let max_len = plan.iter().map(|c| c.byte_len(cfg)).max().unwrap_or(0);
    let mut raw = vec![0u8; max_len];

    for skipped in 0..cfg.scene_offset {
        match consume_scene(cfg, &plan, src, &mut canvas, &mut raw, None) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(skipped, "stream ended during leading-scene skip");
                return DecodeOutcome::ok(Vec::new());
            }
            Err(e) => return DecodeOutcome::fail(Vec::new(), e),
        }
    }

    let crop = cfg.crop();
    let mut frames = Vec::new();
    while cfg
        .scene_count
        .is_none_or(|n| (frames.len() as u64) < n)
    {
        let mut frame = match Frame::new(crop.width, crop.height, cfg.channels, cfg.depth) {
            Ok(frame) => frame,
            Err(e) => return DecodeOutcome::fail(frames, e),
        };
        match consume_scene(cfg, &plan, src, &mut canvas, &mut raw, Some(&mut frame)) {
            Ok(true) => frames.push(frame),
            Ok(false) => break,
            Err(e) => return DecodeOutcome::fail(frames, e),
        }
    }
    tracing::debug!(scenes = frames.len(), "decode complete");
    DecodeOutcome::ok(frames)
}

/// Decodes a partitioned stream, one physical file per channel.
///
/// Each scene re-opens every channel file and independently skips the
/// already-consumed planes, so a truncated or missing channel file is
/// detected exactly when its own chunk read falls short.
#[tracing::instrument(skip(cfg, parts), fields(width = cfg.width, height = cfg.height))]
pub fn decode_partitioned(cfg: &StreamConfig, parts: &mut dyn PartitionSource) -> DecodeOutcome {
    if let Err(e) = cfg.validate() {
        return DecodeOutcome::fail(Vec::new(), e);
    }
    if cfg.layout != InterlaceLayout::Partitioned {
        return DecodeOutcome::fail(
            Vec::new(),
            RawyccError::configuration(
                "decode_partitioned requires the partitioned layout; use decode",
            ),
        );
    }
    if cfg.ping {
        return DecodeOutcome::ok(Vec::new());
    }

    let plan = frame_plan(cfg);
    let mut canvas = match ScratchCanvas::for_config(cfg, &plan) {
        Ok(canvas) => canvas,
        Err(e) => return DecodeOutcome::fail(Vec::new(), e),
    };
    let plane_len = cfg.plane_bytes();
    let mut raw = vec![0u8; plane_len];

    let crop = cfg.crop();
    let mut frames = Vec::new();
    'scenes: while cfg
        .scene_count
        .is_none_or(|n| (frames.len() as u64) < n)
    {
        let skip_planes = cfg.scene_offset + frames.len() as u64;
        let mut frame = match Frame::new(crop.width, crop.height, cfg.channels, cfg.depth) {
            Ok(frame) => frame,
            Err(e) => return DecodeOutcome::fail(frames, e),
        };
        for (index, chunk) in plan.iter().enumerate() {
            let suffix = match chunk.select {
                ChunkChannels::One(c) => PARTITION_SUFFIXES[c],
                ChunkChannels::All => unreachable!("partitioned plans are per-channel"),
            };
            let mut src = match parts.open_channel(suffix) {
                Ok(src) => src,
                Err(e) => return DecodeOutcome::fail(frames, e),
            };
            // Skip this file's planes for every scene already consumed.
            for _ in 0..skip_planes {
                match read_up_to(&mut src, &mut raw[..plane_len]) {
                    Ok(n) if n == plane_len => {}
                    Ok(0) if index == 0 => break 'scenes,
                    Ok(n) => {
                        return DecodeOutcome::fail(
                            frames,
                            short_plane(suffix, plane_len, n),
                        );
                    }
                    Err(e) => return DecodeOutcome::fail(frames, e),
                }
            }
            match read_up_to(&mut src, &mut raw[..plane_len]) {
                Ok(n) if n == plane_len => {
                    let samples = canvas.load(&raw[..plane_len], cfg.depth, cfg.endian);
                    composite_chunk(cfg, chunk, samples, &mut frame);
                }
                Ok(0) if index == 0 => break 'scenes,
                Ok(n) => {
                    return DecodeOutcome::fail(frames, short_plane(suffix, plane_len, n));
                }
                Err(e) => return DecodeOutcome::fail(frames, e),
            }
        }
        tracing::trace!(scene = frames.len(), "partitioned scene composited");
        frames.push(frame);
    }
    tracing::debug!(scenes = frames.len(), "partitioned decode complete");
    DecodeOutcome::ok(frames)
}

/// Pulls one scene's chunk sequence from `src`, compositing into `into` when
/// present and discarding otherwise. Returns `Ok(false)` on a clean end of
/// stream at the scene boundary; any other shortfall is a truncation error.
fn consume_scene<R: Read + ?Sized>(
    cfg: &StreamConfig,
    plan: &[ChunkSpec],
    src: &mut R,
    canvas: &mut ScratchCanvas,
    raw: &mut [u8],
    mut into: Option<&mut Frame>,
) -> RawyccResult<bool> {
    for (index, chunk) in plan.iter().enumerate() {
        let len = chunk.byte_len(cfg);
        let n = read_up_to(src, &mut raw[..len])?;
        if n == 0 && index == 0 {
            return Ok(false);
        }
        if n != len {
            return Err(RawyccError::truncated(format!(
                "chunk {index} needs {len} bytes, stream ended after {n}"
            )));
        }
        if let Some(frame) = into.as_deref_mut() {
            let samples = canvas.load(&raw[..len], cfg.depth, cfg.endian);
            composite_chunk(cfg, chunk, samples, frame);
        }
    }
    Ok(true)
}

fn short_plane(suffix: &str, expected: usize, got: usize) -> RawyccError {
    RawyccError::truncated(format!(
        "channel '{suffix}' plane needs {expected} bytes, file ended after {got}"
    ))
}

/// Reads until `buf` is full or the stream ends, whichever comes first.
fn read_up_to<R: Read + ?Sized>(src: &mut R, buf: &mut [u8]) -> RawyccResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(anyhow::Error::new(e).context("read sample chunk").into()),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::config::{ChannelCount, SampleDepth};

    #[test]
    fn ping_reads_no_bytes() {
        let mut src = Cursor::new(vec![0u8; 24]);
        let outcome = decode(&StreamConfig::new(4, 2).with_ping(true), &mut src);
        assert!(outcome.is_ok());
        assert!(outcome.frames.is_empty());
        assert_eq!(src.position(), 0);
    }

    #[test]
    fn empty_stream_is_a_clean_zero_scene_result() {
        let mut src = Cursor::new(Vec::<u8>::new());
        let outcome = decode(&StreamConfig::new(4, 2), &mut src);
        assert!(outcome.is_ok());
        assert!(outcome.frames.is_empty());
    }

    #[test]
    fn partitioned_layout_is_refused_on_a_single_stream() {
        let cfg = StreamConfig::new(4, 2).with_layout(InterlaceLayout::Partitioned);
        let outcome = decode(&cfg, &mut Cursor::new(vec![0u8; 24]));
        assert!(matches!(
            outcome.failure,
            Some(RawyccError::Configuration(_))
        ));
    }

    #[test]
    fn concrete_4x2_interleaved_example() {
        // row 0: (p0c0,p0c1,p0c2, ... p3c2), then row 1 likewise.
        let bytes: Vec<u8> = (0..24).collect();
        let outcome = decode(&StreamConfig::new(4, 2), &mut Cursor::new(bytes));
        assert!(outcome.is_ok());
        assert_eq!(outcome.frames.len(), 1);
        let frame = &outcome.frames[0];
        for y in 0..2 {
            for x in 0..4 {
                for c in 0..3 {
                    assert_eq!(frame.sample(x, y, c), (y * 12 + x * 3 + c as u32) as u16);
                }
            }
        }
    }

    #[test]
    fn mid_chunk_truncation_reports_and_keeps_whole_frames() {
        let mut bytes: Vec<u8> = (0..24).collect();
        bytes.extend(0u8..10); // second scene cut off mid-scanline
        let outcome = decode(&StreamConfig::new(4, 2), &mut Cursor::new(bytes));
        assert_eq!(outcome.frames.len(), 1);
        assert!(matches!(
            outcome.failure,
            Some(RawyccError::TruncatedStream(_))
        ));
    }

    #[test]
    fn scene_count_bounds_retained_frames() {
        let bytes = vec![7u8; 24 * 3];
        let cfg = StreamConfig::new(4, 2).with_scene_count(2);
        let outcome = decode(&cfg, &mut Cursor::new(bytes));
        assert!(outcome.is_ok());
        assert_eq!(outcome.frames.len(), 2);
    }

    #[test]
    fn into_result_discards_partials() {
        let bytes = vec![7u8; 30];
        let outcome = decode(&StreamConfig::new(4, 2), &mut Cursor::new(bytes));
        assert_eq!(outcome.frames.len(), 1);
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn sixteen_bit_frames_record_their_depth() {
        let bytes = vec![0u8; 4 * 2 * 3 * 2];
        let cfg = StreamConfig::new(4, 2).with_depth(SampleDepth::Sixteen);
        let frames = decode(&cfg, &mut Cursor::new(bytes)).into_result().unwrap();
        assert_eq!(frames[0].depth(), SampleDepth::Sixteen);
        assert_eq!(frames[0].channels(), ChannelCount::Ycc);
    }
}
