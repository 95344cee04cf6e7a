use crate::config::{InterlaceLayout, StreamConfig};

/// Fixed per-channel file suffixes for the partitioned layout, in channel
/// order. Three-channel streams use the first three.
pub const PARTITION_SUFFIXES: [&str; 4] = ["Y", "Cb", "Cr", "A"];

/// Which channels one chunk carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkChannels {
    /// All channels of the pixel, cycling fastest.
    All,
    /// A single channel, by index in Y/Cb/Cr/A order.
    One(usize),
}

/// The unit the demultiplexer requests from a byte source in one step.
///
/// The byte length is fully determined by the config and the chunk's shape;
/// it is never inferred from stream content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkSpec {
    pub select: ChunkChannels,
    pub row_start: u32,
    pub row_count: u32,
}

impl ChunkSpec {
    pub fn sample_count(&self, cfg: &StreamConfig) -> usize {
        let per_pixel = match self.select {
            ChunkChannels::All => cfg.channels.count(),
            ChunkChannels::One(_) => 1,
        };
        cfg.width as usize * self.row_count as usize * per_pixel
    }

    pub fn byte_len(&self, cfg: &StreamConfig) -> usize {
        let per_row = match self.select {
            ChunkChannels::All => cfg.row_bytes_all(),
            ChunkChannels::One(_) => cfg.row_bytes_one(),
        };
        per_row * self.row_count as usize
    }
}

/// Produces the ordered chunk sequence that makes up one frame (scene) of
/// the stream. The same plan drives both decode and encode; partitioned
/// streams share the plane-interlaced plan, with each chunk routed to its
/// own file.
pub fn frame_plan(cfg: &StreamConfig) -> Vec<ChunkSpec> {
    let channels = cfg.channels.count();
    match cfg.layout {
        InterlaceLayout::Interleaved => (0..cfg.height)
            .map(|y| ChunkSpec {
                select: ChunkChannels::All,
                row_start: y,
                row_count: 1,
            })
            .collect(),
        InterlaceLayout::LineInterlaced => (0..cfg.height)
            .flat_map(|y| {
                (0..channels).map(move |c| ChunkSpec {
                    select: ChunkChannels::One(c),
                    row_start: y,
                    row_count: 1,
                })
            })
            .collect(),
        InterlaceLayout::PlaneInterlaced | InterlaceLayout::Partitioned => (0..channels)
            .map(|c| ChunkSpec {
                select: ChunkChannels::One(c),
                row_start: 0,
                row_count: cfg.height,
            })
            .collect(),
    }
}

/// Total bytes of one scene, identical across layouts.
pub fn frame_bytes(cfg: &StreamConfig) -> usize {
    cfg.width as usize
        * cfg.height as usize
        * cfg.channels.count()
        * cfg.depth.bytes_per_sample()
}
