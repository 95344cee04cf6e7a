#![forbid(unsafe_code)]

mod canvas;
pub mod config;
pub mod demux;
pub mod error;
pub mod frame;
pub mod layout;
pub mod mux;
pub mod partition;

pub use config::{
    ChannelCount, CropRect, Endian, InterlaceLayout, SampleDepth, StreamConfig,
};
pub use demux::{DecodeOutcome, decode, decode_partitioned};
pub use error::{RawyccError, RawyccResult};
pub use frame::Frame;
pub use layout::PARTITION_SUFFIXES;
pub use mux::{encode, encode_partitioned};
pub use partition::{FsPartitions, MemPartitions, PartitionMode, PartitionSink, PartitionSource};
