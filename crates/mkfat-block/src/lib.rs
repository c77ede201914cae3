//! Block-addressed device capability used by the mkfat crates.
//!
//! Everything the formatter knows about a device goes through the
//! [`BlockDevice`] trait: a fixed power-of-two block size and synchronous
//! whole-block reads and writes. The crate ships two backends, an in-memory
//! device for tests and image building, and a file-backed device for
//! formatting image files on disk.
//!
//! ## Cargo Features
//!
//! - **alloc**: Enables the 'alloc' feature, which provides the heap-backed
//!   [`MemDevice`]
//! - **std**: Enables the 'std' feature (includes alloc), which provides the
//!   file-backed [`FileDevice`]

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

use thiserror::Error;

/// An error that can occur when accessing a block device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The access touches blocks past the end of the device.
    ///
    /// The device contents are unchanged; nothing is read or written
    /// partially.
    #[error("block access out of bounds")]
    OutOfBounds,
    /// The underlying transport failed.
    #[error("device i/o error")]
    Io,
}

/// A synchronous device addressed in fixed-size blocks.
///
/// Buffers passed to [`read`](Self::read) and [`write`](Self::write) must
/// span a whole number of blocks; the block count of an access is implied by
/// the buffer length. The block size is a power of two and never changes for
/// the lifetime of the device.
///
/// # Example
///
/// ```
/// use mkfat_block::{BlockDevice, MemDevice};
///
/// let mut dev = MemDevice::new(9, 16);
/// dev.write(3, &[0xAA; 512])?;
/// let mut buf = [0u8; 512];
/// dev.read(3, &mut buf)?;
/// assert_eq!(buf[511], 0xAA);
/// # Ok::<(), mkfat_block::DeviceError>(())
/// ```
pub trait BlockDevice {
    /// Log2 of the device block size in bytes.
    fn log2_block_size(&self) -> u32;

    /// Reads whole blocks starting at `block` into `buf`.
    fn read(&mut self, block: u64, buf: &mut [u8]) -> Result<(), DeviceError>;

    /// Writes whole blocks starting at `block` from `buf`.
    fn write(&mut self, block: u64, buf: &[u8]) -> Result<(), DeviceError>;

    /// The device block size in bytes.
    fn block_size(&self) -> usize {
        1 << self.log2_block_size()
    }
}

#[cfg(feature = "alloc")]
mod mem {
    use alloc::vec;
    use alloc::vec::Vec;

    use crate::{BlockDevice, DeviceError};

    /// An in-memory block device.
    ///
    /// All blocks start out zeroed. Accesses past the allocated block count
    /// fail with [`DeviceError::OutOfBounds`], which makes this the device
    /// of choice for exercising error paths in tests.
    #[derive(Debug, Clone)]
    pub struct MemDevice {
        log2_block_size: u32,
        data: Vec<u8>,
    }

    impl MemDevice {
        /// Creates a zero-filled device of `blocks` blocks, each
        /// `1 << log2_block_size` bytes.
        pub fn new(log2_block_size: u32, blocks: u64) -> Self {
            Self {
                log2_block_size,
                data: vec![0u8; (blocks as usize) << log2_block_size],
            }
        }

        /// The number of blocks the device holds.
        pub fn block_count(&self) -> u64 {
            (self.data.len() >> self.log2_block_size) as u64
        }

        /// The raw contents of the device.
        pub fn as_bytes(&self) -> &[u8] {
            &self.data
        }

        fn range(&self, block: u64, len: usize) -> Result<core::ops::Range<usize>, DeviceError> {
            debug_assert_eq!(len & (self.block_size() - 1), 0);
            let blocks = (len >> self.log2_block_size) as u64;
            if block.saturating_add(blocks) > self.block_count() {
                return Err(DeviceError::OutOfBounds);
            }
            let start = (block as usize) << self.log2_block_size;
            Ok(start..start + len)
        }
    }

    impl BlockDevice for MemDevice {
        fn log2_block_size(&self) -> u32 {
            self.log2_block_size
        }

        fn read(&mut self, block: u64, buf: &mut [u8]) -> Result<(), DeviceError> {
            let range = self.range(block, buf.len())?;
            buf.copy_from_slice(&self.data[range]);
            Ok(())
        }

        fn write(&mut self, block: u64, buf: &[u8]) -> Result<(), DeviceError> {
            let range = self.range(block, buf.len())?;
            self.data[range].copy_from_slice(buf);
            Ok(())
        }
    }
}

#[cfg(feature = "alloc")]
pub use mem::MemDevice;

cfg_if::cfg_if! {
    if #[cfg(feature = "std")] {
        mod file;
        pub use file::FileDevice;
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn mem_device_round_trip() {
        let mut dev = MemDevice::new(9, 8);
        assert_eq!(dev.block_count(), 8);
        assert_eq!(dev.block_size(), 512);

        dev.write(2, &[0x5A; 1024]).unwrap();
        let mut buf = [0u8; 512];
        dev.read(3, &mut buf).unwrap();
        assert_eq!(buf, [0x5A; 512]);
        dev.read(4, &mut buf).unwrap();
        assert_eq!(buf, [0u8; 512]);
    }

    #[test]
    fn mem_device_bounds() {
        let mut dev = MemDevice::new(9, 4);
        assert_eq!(dev.write(4, &[0u8; 512]), Err(DeviceError::OutOfBounds));
        assert_eq!(dev.write(3, &[0u8; 1024]), Err(DeviceError::OutOfBounds));
        assert_eq!(dev.write(3, &[1u8; 512]), Ok(()));
        // A failed write leaves the device untouched
        let mut buf = [1u8; 512];
        dev.read(2, &mut buf).unwrap();
        assert_eq!(buf, [0u8; 512]);
    }

    #[test]
    fn mem_device_large_blocks() {
        let mut dev = MemDevice::new(12, 4);
        assert_eq!(dev.block_size(), 4096);
        dev.write(1, &[7u8; 4096]).unwrap();
        assert_eq!(&dev.as_bytes()[4096..8192], &[7u8; 4096][..]);
    }
}
