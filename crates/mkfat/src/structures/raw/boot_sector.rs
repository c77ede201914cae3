//! Raw boot sector layout.
//!
//! The boot sector splits at byte 36: the BPB proper is common to every FAT
//! variant, and the extension that follows differs between FAT12/16 and
//! FAT32. The formatter zeroes a 512-byte image, then fills the BPB and
//! whichever extension the volume type needs; fields it leaves alone (drive
//! number, geometry, volume id) are meant to stay zero.

use crate::structures::BOOT_SECTOR_SIZE;

/// Offset of the type-specific BPB extension inside the boot sector.
pub const BPB_EXT_OFFSET: usize = 36;

/// The common head of the BPB, bytes 0..36.
#[repr(C, packed)]
#[derive(Clone, Copy, bytemuck::NoUninit, bytemuck::AnyBitPattern)]
pub struct RawBpb {
    /// BS_jmpBoot
    ///
    /// A fresh volume is not bootable; the formatter writes a `jmp $; nop`
    /// placeholder.
    pub jump: [u8; 3],
    /// BS_OEMName
    pub oem_name: [u8; 8],
    /// BPB_BytsPerSec, 512..=4096
    pub bytes_per_sector: [u8; 2],
    /// BPB_SecPerClus, a power of two up to 128
    pub sectors_per_cluster: u8,
    /// BPB_RsvdSecCnt
    ///
    /// Sectors ahead of the first FAT: 1 here for FAT12/16, 32 for FAT32.
    pub reserved_sector_count: [u8; 2],
    /// BPB_NumFATs, always 2 here
    pub fat_count: u8,
    /// BPB_RootEntCnt
    ///
    /// 32-byte entries in the flat root directory, 0 on FAT32. The byte
    /// total is a whole number of sectors.
    pub root_entry_count: [u8; 2],
    /// BPB_TotSec16, used when the count fits and the type is not FAT32
    pub total_sectors_16: [u8; 2],
    /// BPB_Media
    pub media_type: u8,
    /// BPB_FATSz16, sectors per FAT copy; 0 on FAT32
    pub sectors_per_fat_16: [u8; 2],
    /// BPB_SecPerTrk, BIOS geometry, unused on block devices
    pub sectors_per_track: [u8; 2],
    /// BPB_NumHeads, BIOS geometry, unused on block devices
    pub num_heads: [u8; 2],
    /// BPB_HiddSec, 0 on unpartitioned media
    pub hidden_sector_count: [u8; 4],
    /// BPB_TotSec32, used when total_sectors_16 is 0
    pub total_sectors_32: [u8; 4],
}

/// The FAT12/FAT16 BPB extension, bytes 36..512.
#[repr(C, packed)]
#[derive(Clone, Copy, bytemuck::NoUninit, bytemuck::AnyBitPattern)]
pub struct RawBpbExt16 {
    /// BS_DrvNum
    pub drive_number: u8,
    /// BS_Reserved1
    pub reserved1: u8,
    /// BS_BootSig, 0x29 announces the three fields that follow
    pub ext_boot_signature: u8,
    /// BS_VolID
    pub volume_id: [u8; 4],
    /// BS_VolLab, blank padded
    pub volume_label: [u8; 11],
    /// BS_FilSysType, "FAT12   " or "FAT16   "
    pub fs_type: [u8; 8],
    /// Boot code area, zero on a fresh volume
    pub padding: [u8; 448],
    /// Signature_word, 0xAA55
    pub signature_word: [u8; 2],
}

/// The FAT32 BPB extension, bytes 36..512.
#[repr(C, packed)]
#[derive(Clone, Copy, bytemuck::NoUninit, bytemuck::AnyBitPattern)]
pub struct RawBpbExt32 {
    /// BPB_FATSz32, sectors per FAT copy
    pub sectors_per_fat_32: [u8; 4],
    /// BPB_ExtFlags, 0 keeps both FATs mirrored
    pub ext_flags: [u8; 2],
    /// BPB_FSVer, must be 0
    pub version: [u8; 2],
    /// BPB_RootClus
    ///
    /// First cluster of the root directory, 2 on a fresh volume.
    pub root_cluster: [u8; 4],
    /// BPB_FSInfo, sector of the FSInfo structure
    pub fs_info_sector: [u8; 2],
    /// BPB_BkBootSec, sector of the backup boot sector (6)
    pub boot_sector: [u8; 2],
    /// BPB_Reserved
    pub reserved: [u8; 12],
    /// BS_DrvNum
    pub drive_number: u8,
    /// BS_Reserved1
    pub reserved1: u8,
    /// BS_BootSig, 0x29 announces the three fields that follow
    pub ext_boot_signature: u8,
    /// BS_VolID
    pub volume_id: [u8; 4],
    /// BS_VolLab, blank padded
    pub volume_label: [u8; 11],
    /// BS_FilSysType, "FAT32   "
    pub fs_type: [u8; 8],
    /// Boot code area, zero on a fresh volume
    pub padding: [u8; 420],
    /// Signature_word, 0xAA55
    pub signature_word: [u8; 2],
}

impl RawBpb {
    /// Views the first 36 bytes of a boot sector image.
    pub fn from_bytes_mut(bytes: &mut [u8]) -> &mut Self {
        bytemuck::from_bytes_mut(bytes)
    }
}

impl RawBpbExt16 {
    /// Views the extension bytes of a boot sector image (`bytes` starts at
    /// offset 36 and runs to 512).
    pub fn from_bytes_mut(bytes: &mut [u8]) -> &mut Self {
        bytemuck::from_bytes_mut(bytes)
    }
}

impl RawBpbExt32 {
    /// Views the extension bytes of a boot sector image (`bytes` starts at
    /// offset 36 and runs to 512).
    pub fn from_bytes_mut(bytes: &mut [u8]) -> &mut Self {
        bytemuck::from_bytes_mut(bytes)
    }
}
