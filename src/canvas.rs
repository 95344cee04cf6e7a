use crate::{
    config::{Endian, SampleDepth, StreamConfig},
    error::{RawyccError, RawyccResult},
    frame::Frame,
    layout::{ChunkChannels, ChunkSpec},
};

/// Reusable sample buffer decoupled from the destination crop rectangle.
///
/// Sized for the largest chunk the layout produces: one full-width scanline
/// for the row layouts, one whole-frame single-channel plane for the plane
/// layouts. Holds widened samples; no I/O, no color math.
pub(crate) struct ScratchCanvas {
    samples: Vec<u16>,
}

impl ScratchCanvas {
    pub(crate) fn for_config(cfg: &StreamConfig, plan: &[ChunkSpec]) -> RawyccResult<Self> {
        let len = plan
            .iter()
            .map(|chunk| chunk.sample_count(cfg))
            .max()
            .ok_or_else(|| RawyccError::resource("empty chunk plan"))?;
        Ok(Self {
            samples: vec![0; len],
        })
    }

    /// Converts one chunk's raw bytes into widened samples and returns the
    /// loaded slice. `bytes.len()` must be a whole number of samples.
    pub(crate) fn load(&mut self, bytes: &[u8], depth: SampleDepth, endian: Endian) -> &[u16] {
        let n = bytes.len() / depth.bytes_per_sample();
        debug_assert_eq!(bytes.len() % depth.bytes_per_sample(), 0);
        debug_assert!(n <= self.samples.len());
        match depth {
            SampleDepth::Eight => {
                for (dst, &b) in self.samples[..n].iter_mut().zip(bytes) {
                    *dst = u16::from(b);
                }
            }
            SampleDepth::Sixteen => {
                for (dst, pair) in self.samples[..n].iter_mut().zip(bytes.chunks_exact(2)) {
                    let raw = [pair[0], pair[1]];
                    *dst = match endian {
                        Endian::Big => u16::from_be_bytes(raw),
                        Endian::Little => u16::from_le_bytes(raw),
                    };
                }
            }
        }
        &self.samples[..n]
    }
}

/// Copies the in-crop portion of a decoded chunk into the destination frame.
///
/// Canvas rows outside the crop window were still consumed from the source;
/// they simply produce no write here. Column cropping takes only the
/// in-range slice of each canvas row.
pub(crate) fn composite_chunk(
    cfg: &StreamConfig,
    chunk: &ChunkSpec,
    samples: &[u16],
    frame: &mut Frame,
) {
    let crop = cfg.crop();
    let width = cfg.width as usize;
    for r in 0..chunk.row_count {
        let canvas_y = chunk.row_start + r;
        if canvas_y < crop.y || canvas_y >= crop.y + crop.height {
            continue;
        }
        let dest_y = canvas_y - crop.y;
        match chunk.select {
            ChunkChannels::All => {
                let cc = cfg.channels.count();
                let row = &samples[r as usize * width * cc..][..width * cc];
                let window = &row[crop.x as usize * cc..][..crop.width as usize * cc];
                frame.row_mut(dest_y).copy_from_slice(window);
            }
            ChunkChannels::One(channel) => {
                let row = &samples[r as usize * width..][..width];
                let window = &row[crop.x as usize..][..crop.width as usize];
                let cc = cfg.channels.count();
                let dest = frame.row_mut(dest_y);
                for (x, &sample) in window.iter().enumerate() {
                    dest[x * cc + channel] = sample;
                }
            }
        }
    }
}

/// Encode-direction counterpart of [`ScratchCanvas::load`]: gathers one
/// chunk's samples from the frame and appends their wire bytes to `out`.
pub(crate) fn export_chunk(cfg: &StreamConfig, chunk: &ChunkSpec, frame: &Frame, out: &mut Vec<u8>) {
    out.clear();
    let cc = cfg.channels.count();
    for r in 0..chunk.row_count {
        let row = frame.row(chunk.row_start + r);
        match chunk.select {
            ChunkChannels::All => {
                for &sample in row {
                    push_sample(out, sample, cfg.depth, cfg.endian);
                }
            }
            ChunkChannels::One(channel) => {
                for px in row.chunks_exact(cc) {
                    push_sample(out, px[channel], cfg.depth, cfg.endian);
                }
            }
        }
    }
}

fn push_sample(out: &mut Vec<u8>, sample: u16, depth: SampleDepth, endian: Endian) {
    match depth {
        SampleDepth::Eight => out.push(sample as u8),
        SampleDepth::Sixteen => match endian {
            Endian::Big => out.extend_from_slice(&sample.to_be_bytes()),
            Endian::Little => out.extend_from_slice(&sample.to_le_bytes()),
        },
    }
}
