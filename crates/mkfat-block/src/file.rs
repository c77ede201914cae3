use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::{BlockDevice, DeviceError};

/// A block device backed by a [`File`].
///
/// Writes past the current end of the file extend it, so a fresh empty file
/// can be formatted into an image without preallocating it. Reads past the
/// end fail with [`DeviceError::OutOfBounds`].
#[derive(Debug)]
pub struct FileDevice {
    log2_block_size: u32,
    file: File,
}

impl FileDevice {
    /// Wraps an open file, addressing it in `1 << log2_block_size` byte
    /// blocks.
    pub fn new(log2_block_size: u32, file: File) -> Self {
        Self {
            log2_block_size,
            file,
        }
    }

    /// Consumes the device and returns the underlying file.
    pub fn into_inner(self) -> File {
        self.file
    }

    fn seek_to(&mut self, block: u64) -> Result<(), DeviceError> {
        let offset = block << self.log2_block_size;
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|_| DeviceError::Io)?;
        Ok(())
    }
}

impl BlockDevice for FileDevice {
    fn log2_block_size(&self) -> u32 {
        self.log2_block_size
    }

    fn read(&mut self, block: u64, buf: &mut [u8]) -> Result<(), DeviceError> {
        debug_assert_eq!(buf.len() & (self.block_size() - 1), 0);
        self.seek_to(block)?;
        self.file.read_exact(buf).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => DeviceError::OutOfBounds,
            _ => DeviceError::Io,
        })
    }

    fn write(&mut self, block: u64, buf: &[u8]) -> Result<(), DeviceError> {
        debug_assert_eq!(buf.len() & (self.block_size() - 1), 0);
        self.seek_to(block)?;
        self.file.write_all(buf).map_err(|_| DeviceError::Io)
    }
}
