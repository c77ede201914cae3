//! Constants shared by the on-disk structures.
//!
//! The cluster marker values are stored in native endianness; the FAT
//! encoders serialize them little endian. A fresh volume only ever records
//! three kinds of FAT slot: the reserved header slots derived from the
//! media descriptor, bad-cluster markers on the slack past the addressable
//! range, and free clusters everywhere else.

/// Media descriptor for fixed disks, recorded in the BPB and folded into
/// FAT slot 0.
pub const MEDIA_DISK: u8 = 0xF8;

/// First data cluster. FAT32 places the root directory here.
pub const ROOT_CLUSTER: u32 = 2;

/// Sector holding the FAT32 FSInfo structure.
pub const FS_INFO_SECTOR: u64 = 1;
/// First sector of the FAT32 backup boot region. The FSInfo backup lives at
/// the same distance behind it, sector 7.
pub const BACKUP_BOOT_SECTOR: u64 = 6;

/// FAT12 cluster values
pub mod fat12 {
    use super::MEDIA_DISK;

    pub const CLUSTER_FREE: u16 = 0x000;
    pub const CLUSTER_BAD: u16 = 0xFF7;
    pub const CLUSTER_END: u16 = 0xFFF;

    /// FAT slot 0: the media descriptor with the high nibble set.
    pub const SLOT0: u16 = 0xF00 | MEDIA_DISK as u16;
    /// FAT slot 1: end-of-chain.
    pub const SLOT1: u16 = CLUSTER_END;
}

/// FAT16 cluster values
pub mod fat16 {
    use super::MEDIA_DISK;

    pub const CLUSTER_FREE: u16 = 0x0000;
    pub const CLUSTER_BAD: u16 = 0xFFF7;
    pub const CLUSTER_RESERVED: u16 = 0xFFF8;
    pub const CLUSTER_END: u16 = 0xFFFF;

    /// FAT slot 0: the media descriptor with the upper byte set.
    pub const SLOT0: u16 = 0xFF00 | MEDIA_DISK as u16;
    /// FAT slot 1: reserved, no dirty-shutdown bits cleared.
    pub const SLOT1: u16 = CLUSTER_RESERVED;
}

/// FAT32 cluster values
///
/// Only 28 bits of a FAT32 slot are significant; these markers carry the
/// top four bits set, which readers mask off.
pub mod fat32 {
    use super::MEDIA_DISK;

    pub const CLUSTER_FREE: u32 = 0x0000_0000;
    pub const CLUSTER_BAD: u32 = 0xFFFF_FFF7;
    pub const CLUSTER_RESERVED: u32 = 0xFFFF_FFF8;
    pub const CLUSTER_END: u32 = 0xFFFF_FFFF;

    /// FAT slot 0: the media descriptor with the upper bytes set.
    pub const SLOT0: u32 = 0xFFFF_FF00 | MEDIA_DISK as u32;
    /// FAT slots 1 and 2. Slot 2 terminates the chain of the one-cluster
    /// root directory.
    pub const SLOT1: u32 = CLUSTER_RESERVED;
    pub const SLOT2: u32 = CLUSTER_RESERVED;
}
