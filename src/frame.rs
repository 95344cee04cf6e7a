use crate::{
    config::{ChannelCount, SampleDepth},
    error::{RawyccError, RawyccResult},
};

/// One decoded (or to-be-encoded) raster frame.
///
/// Samples are stored row-major with channels cycling fastest, widened to
/// `u16` without rescaling; `depth` records the wire width so callers can
/// rescale if they need to. Channel order is Y, Cb, Cr, then A when present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    channels: ChannelCount,
    depth: SampleDepth,
    data: Vec<u16>,
}

impl Frame {
    pub fn new(
        width: u32,
        height: u32,
        channels: ChannelCount,
        depth: SampleDepth,
    ) -> RawyccResult<Self> {
        let len = Self::sample_len(width, height, channels)?;
        Ok(Self {
            width,
            height,
            channels,
            depth,
            data: vec![0; len],
        })
    }

    /// Wraps an existing sample buffer. `data.len()` must equal
    /// `width * height * channels`, and every sample must fit in `depth`
    /// bits on the wire.
    pub fn from_samples(
        width: u32,
        height: u32,
        channels: ChannelCount,
        depth: SampleDepth,
        data: Vec<u16>,
    ) -> RawyccResult<Self> {
        let len = Self::sample_len(width, height, channels)?;
        if data.len() != len {
            return Err(RawyccError::configuration(format!(
                "sample buffer holds {} samples, {}x{}x{} needs {}",
                data.len(),
                width,
                height,
                channels.count(),
                len
            )));
        }
        if let Some(&sample) = data.iter().find(|&&s| s > depth.max_sample()) {
            return Err(RawyccError::configuration(format!(
                "sample value {sample} does not fit {} wire bits",
                depth.bytes_per_sample() * 8
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            depth,
            data,
        })
    }

    fn sample_len(width: u32, height: u32, channels: ChannelCount) -> RawyccResult<usize> {
        if width == 0 || height == 0 {
            return Err(RawyccError::configuration(
                "frame width/height must be non-zero",
            ));
        }
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels.count()))
            .ok_or_else(|| RawyccError::resource("frame sample count overflows usize"))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> ChannelCount {
        self.channels
    }

    pub fn depth(&self) -> SampleDepth {
        self.depth
    }

    pub fn samples(&self) -> &[u16] {
        &self.data
    }

    pub fn into_samples(self) -> Vec<u16> {
        self.data
    }

    pub fn sample(&self, x: u32, y: u32, channel: usize) -> u16 {
        debug_assert!(x < self.width && y < self.height && channel < self.channels.count());
        self.data[(y as usize * self.width as usize + x as usize) * self.channels.count() + channel]
    }

    /// All samples of scanline `y`, channels interleaved.
    pub fn row(&self, y: u32) -> &[u16] {
        let stride = self.width as usize * self.channels.count();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [u16] {
        let stride = self.width as usize * self.channels.count();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }
}
