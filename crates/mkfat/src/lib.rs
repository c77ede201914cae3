//! A library for formatting block devices as FAT12, FAT16 or FAT32 volumes,
//! with no-std support.
//!
//! The formatter computes a volume layout from the device size and block
//! size, then writes the FAT copies, the empty root directory, FSInfo on
//! FAT32, and finally the boot sector. The boot sector comes last so that an
//! interrupted format never leaves behind something that looks like a valid
//! volume. All device access goes through the [`BlockDevice`] trait from
//! `mkfat-block`.
//!
//! ```
//! use mkfat::{mkfs, MemDevice};
//!
//! let mut dev = MemDevice::new(9, 4096);
//! mkfs(&mut dev, 4096)?;
//! assert_eq!(&dev.as_bytes()[0x1FE..0x200], &[0x55, 0xAA]);
//! # Ok::<(), mkfat::FormatError>(())
//! ```
//!
//! ## Cargo Features
//!
//! - **alloc**: Enables the 'alloc' feature, which provides the in-memory
//!   device backend
//! - **std**: Enables the 'std' feature (includes alloc), which provides the
//!   file-backed device backend

#![cfg_attr(not(feature = "std"), no_std)]

pub mod layout;
pub mod mkfs;
pub mod structures;

pub use layout::FsLayout;
pub use mkfs::mkfs;

pub use mkfat_block::{BlockDevice, DeviceError};
#[cfg(feature = "std")]
pub use mkfat_block::FileDevice;
#[cfg(feature = "alloc")]
pub use mkfat_block::MemDevice;

use thiserror::Error;

/// The FAT variant selected for a volume.
///
/// The variant is decided purely by the total logical sector count, so that
/// the cluster counts a reader derives from the BPB land in the matching
/// range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatType {
    Fat12,
    Fat16,
    Fat32,
}

impl FatType {
    /// The blank-padded BS_FilSysType string recorded in the boot sector.
    pub fn label(&self) -> &'static [u8; 8] {
        match self {
            FatType::Fat12 => b"FAT12   ",
            FatType::Fat16 => b"FAT16   ",
            FatType::Fat32 => b"FAT32   ",
        }
    }
}

/// An error that can occur while formatting a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The device block size `1 << log2_block_size` exceeds the largest FAT
    /// sector size of 4096 bytes.
    ///
    /// Raised before anything is written, so the device is untouched.
    #[error("block size 2^{0} exceeds the maximum sector size of 4096 bytes")]
    BlockSize(u32),
    /// A device access failed. Formatting stops at the first failing write
    /// and the device contents are unspecified, except that the boot
    /// signature is only ever written as the final step.
    #[error(transparent)]
    Io(#[from] DeviceError),
}
