use crate::error::{RawyccError, RawyccResult};

/// Samples per pixel. Alpha is present iff the stream carries four channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChannelCount {
    #[default]
    Ycc,
    YccA,
}

impl ChannelCount {
    pub fn count(self) -> usize {
        match self {
            Self::Ycc => 3,
            Self::YccA => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, Self::YccA)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SampleDepth {
    #[default]
    Eight,
    Sixteen,
}

impl SampleDepth {
    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::Eight => 1,
            Self::Sixteen => 2,
        }
    }

    /// Largest sample value the wire format can carry.
    pub fn max_sample(self) -> u16 {
        match self {
            Self::Eight => u16::from(u8::MAX),
            Self::Sixteen => u16::MAX,
        }
    }
}

/// Byte order of 16-bit samples on the wire. Ignored for 8-bit streams.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Endian {
    #[default]
    Big,
    Little,
}

/// How channel samples are ordered within the stored byte stream.
///
/// Channel order is always Y, Cb, Cr and, for four-channel streams, A last.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InterlaceLayout {
    /// `YCbCrYCbCr...` — channels cycle fastest, one chunk per scanline.
    #[default]
    Interleaved,
    /// `YYY...CbCbCb...CrCrCr...` per scanline, then the next scanline.
    LineInterlaced,
    /// All Y rows, then all Cb rows, then all Cr rows (then all A rows).
    PlaneInterlaced,
    /// Plane order, but each channel lives in its own physical file.
    Partitioned,
}

/// Caller-side view into the stored canvas, in canvas coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full_canvas(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn contained_in(&self, width: u32, height: u32) -> bool {
        let x1 = self.x.checked_add(self.width);
        let y1 = self.y.checked_add(self.height);
        matches!((x1, y1), (Some(x1), Some(y1)) if x1 <= width && y1 <= height)
    }
}

/// One decode/encode call's worth of stream parameters.
///
/// The format is header-less: dimensions, channel count, and layout are never
/// read from the stream itself and must be supplied here.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StreamConfig {
    /// Full stored canvas width in pixels.
    pub width: u32,
    /// Full stored canvas height in pixels.
    pub height: u32,
    #[serde(default)]
    pub channels: ChannelCount,
    #[serde(default)]
    pub depth: SampleDepth,
    #[serde(default)]
    pub endian: Endian,
    #[serde(default)]
    pub layout: InterlaceLayout,
    /// Sub-rectangle to retain on decode. `None` means the full canvas.
    #[serde(default)]
    pub crop: Option<CropRect>,
    /// Leading scenes to discard before the first retained frame.
    #[serde(default)]
    pub scene_offset: u64,
    /// Upper bound on retained frames. `None` decodes until end of stream.
    #[serde(default)]
    pub scene_count: Option<u64>,
    /// Probe-only mode: validate and return without reading any pixel chunk.
    #[serde(default)]
    pub ping: bool,
}

impl StreamConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            channels: ChannelCount::default(),
            depth: SampleDepth::default(),
            endian: Endian::default(),
            layout: InterlaceLayout::default(),
            crop: None,
            scene_offset: 0,
            scene_count: None,
            ping: false,
        }
    }

    pub fn with_channels(mut self, channels: ChannelCount) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_depth(mut self, depth: SampleDepth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn with_layout(mut self, layout: InterlaceLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_crop(mut self, crop: CropRect) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn with_scene_offset(mut self, scene_offset: u64) -> Self {
        self.scene_offset = scene_offset;
        self
    }

    pub fn with_scene_count(mut self, scene_count: u64) -> Self {
        self.scene_count = Some(scene_count);
        self
    }

    pub fn with_ping(mut self, ping: bool) -> Self {
        self.ping = ping;
        self
    }

    pub fn validate(&self) -> RawyccResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RawyccError::configuration(
                "stream width/height must be non-zero",
            ));
        }
        let crop = self.crop();
        if crop.width == 0 || crop.height == 0 {
            return Err(RawyccError::configuration(
                "crop width/height must be non-zero",
            ));
        }
        if !crop.contained_in(self.width, self.height) {
            return Err(RawyccError::configuration(format!(
                "crop {}x{}+{}+{} exceeds the {}x{} canvas",
                crop.width, crop.height, crop.x, crop.y, self.width, self.height
            )));
        }
        // A whole frame must be addressable as one in-memory buffer.
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|n| n.checked_mul(self.channels.count()))
            .and_then(|n| n.checked_mul(self.depth.bytes_per_sample()))
            .ok_or_else(|| RawyccError::resource("frame byte size overflows usize"))?;
        Ok(())
    }

    /// The crop window, resolved to the full canvas when unset.
    pub fn crop(&self) -> CropRect {
        self.crop
            .unwrap_or_else(|| CropRect::full_canvas(self.width, self.height))
    }

    pub fn is_full_canvas(&self) -> bool {
        self.crop() == CropRect::full_canvas(self.width, self.height)
    }

    /// Bytes of one full-width scanline holding every channel.
    pub(crate) fn row_bytes_all(&self) -> usize {
        self.width as usize * self.channels.count() * self.depth.bytes_per_sample()
    }

    /// Bytes of one full-width single-channel scanline.
    pub(crate) fn row_bytes_one(&self) -> usize {
        self.width as usize * self.depth.bytes_per_sample()
    }

    /// Bytes of one whole-frame single-channel plane.
    pub(crate) fn plane_bytes(&self) -> usize {
        self.row_bytes_one() * self.height as usize
    }
}
