use std::{
    collections::BTreeMap,
    fs::{File, OpenOptions},
    io::{Cursor, Read, Write},
    path::PathBuf,
};

use crate::error::{RawyccError, RawyccResult};

/// Write disposition for a partitioned channel stream.
///
/// The first scene creates (or truncates) each channel file; later scenes
/// append, so each file accumulates that channel's plane across all scenes
/// in scene order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartitionMode {
    Create,
    Append,
}

/// Resolves channel suffixes ("Y", "Cb", "Cr", "A") to readable streams.
///
/// Each open hands back a fresh cursor at the start of the channel's data;
/// the decoder owns its whole pass and never resumes a partially-consumed
/// handle across calls.
pub trait PartitionSource {
    fn open_channel(&mut self, suffix: &str) -> RawyccResult<Box<dyn Read + '_>>;
}

/// Resolves channel suffixes to writable streams.
pub trait PartitionSink {
    fn open_channel(
        &mut self,
        suffix: &str,
        mode: PartitionMode,
    ) -> RawyccResult<Box<dyn Write + '_>>;
}

/// Filesystem-backed partition table: channel files live next to the base
/// path as `<base>.Y`, `<base>.Cb`, `<base>.Cr`, `<base>.A`.
#[derive(Clone, Debug)]
pub struct FsPartitions {
    base: PathBuf,
}

impl FsPartitions {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn channel_path(&self, suffix: &str) -> PathBuf {
        let mut name = self.base.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(suffix);
        self.base.with_file_name(name)
    }
}

impl PartitionSource for FsPartitions {
    fn open_channel(&mut self, suffix: &str) -> RawyccResult<Box<dyn Read + '_>> {
        let path = self.channel_path(suffix);
        let file = File::open(&path).map_err(|e| {
            RawyccError::partition(format!("cannot open '{}' for reading: {e}", path.display()))
        })?;
        Ok(Box::new(file))
    }
}

impl PartitionSink for FsPartitions {
    fn open_channel(
        &mut self,
        suffix: &str,
        mode: PartitionMode,
    ) -> RawyccResult<Box<dyn Write + '_>> {
        let path = self.channel_path(suffix);
        let result = match mode {
            PartitionMode::Create => File::create(&path),
            PartitionMode::Append => OpenOptions::new().append(true).create(true).open(&path),
        };
        let file = result.map_err(|e| {
            RawyccError::partition(format!("cannot open '{}' for writing: {e}", path.display()))
        })?;
        Ok(Box::new(file))
    }
}

/// In-memory partition table, keyed by channel suffix. Useful for tests and
/// for embedding streams without touching the filesystem.
#[derive(Clone, Debug, Default)]
pub struct MemPartitions {
    channels: BTreeMap<String, Vec<u8>>,
}

impl MemPartitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_channel(&mut self, suffix: &str, bytes: Vec<u8>) {
        self.channels.insert(suffix.to_string(), bytes);
    }

    pub fn channel(&self, suffix: &str) -> Option<&[u8]> {
        self.channels.get(suffix).map(Vec::as_slice)
    }
}

impl PartitionSource for MemPartitions {
    fn open_channel(&mut self, suffix: &str) -> RawyccResult<Box<dyn Read + '_>> {
        let bytes = self.channels.get(suffix).ok_or_else(|| {
            RawyccError::partition(format!("no in-memory channel '{suffix}'"))
        })?;
        Ok(Box::new(Cursor::new(bytes.as_slice())))
    }
}

impl PartitionSink for MemPartitions {
    fn open_channel(
        &mut self,
        suffix: &str,
        mode: PartitionMode,
    ) -> RawyccResult<Box<dyn Write + '_>> {
        let buf = self.channels.entry(suffix.to_string()).or_default();
        if mode == PartitionMode::Create {
            buf.clear();
        }
        Ok(Box::new(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_paths_append_the_suffix_as_an_extension() {
        let parts = FsPartitions::new("/data/frames/take1.ycbcr");
        assert_eq!(
            parts.channel_path("Cb"),
            PathBuf::from("/data/frames/take1.ycbcr.Cb")
        );
    }

    #[test]
    fn mem_create_truncates_and_append_extends() {
        let mut parts = MemPartitions::new();
        {
            let mut w = PartitionSink::open_channel(&mut parts, "Y", PartitionMode::Create)
                .unwrap();
            w.write_all(b"abc").unwrap();
        }
        {
            let mut w = PartitionSink::open_channel(&mut parts, "Y", PartitionMode::Append)
                .unwrap();
            w.write_all(b"def").unwrap();
        }
        assert_eq!(parts.channel("Y"), Some(&b"abcdef"[..]));

        let mut w =
            PartitionSink::open_channel(&mut parts, "Y", PartitionMode::Create).unwrap();
        w.write_all(b"x").unwrap();
        drop(w);
        assert_eq!(parts.channel("Y"), Some(&b"x"[..]));
    }

    #[test]
    fn mem_missing_channel_is_a_partition_error() {
        let mut parts = MemPartitions::new();
        let err = match PartitionSource::open_channel(&mut parts, "Cr") {
            Ok(_) => panic!("opening a missing channel should fail"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("partition file error:"));
    }
}
