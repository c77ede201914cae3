//! On-disk structures of a FAT volume.
//!
//! The `raw` submodule holds the byte-exact layouts; this level holds the
//! write-path builders that fill them from a computed
//! [`FsLayout`](crate::layout::FsLayout), and the FAT entry encoders.

pub mod boot_sector;
pub mod fat;
pub mod fs_info;
pub mod raw;

/// The boot sector and FSInfo images are always 512 bytes regardless of the
/// sector size; the remainder of a larger sector stays zero.
pub const BOOT_SECTOR_SIZE: usize = 512;
