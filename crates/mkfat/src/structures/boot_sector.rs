//! Boot sector construction.

use crate::FatType;
use crate::layout::FsLayout;
use crate::structures::BOOT_SECTOR_SIZE;
use crate::structures::raw::boot_sector::{BPB_EXT_OFFSET, RawBpb, RawBpbExt16, RawBpbExt32};
use crate::structures::raw::constants::{
    BACKUP_BOOT_SECTOR, FS_INFO_SECTOR, MEDIA_DISK, ROOT_CLUSTER,
};

/// Jump stub for a non-bootable volume: `jmp $; nop`.
const JUMP_STUB: [u8; 3] = [0xEB, 0xFE, 0x90];
/// Recorded as BS_OEMName.
const OEM_NAME: [u8; 8] = *b"mkfat   ";
/// An unlabeled volume carries eleven blanks.
const BLANK_LABEL: [u8; 11] = *b"           ";
/// BS_BootSig value announcing the volume id / label / type triple.
const EXT_BOOT_SIGNATURE: u8 = 0x29;

/// A boot sector image describing a freshly formatted volume, ready to be
/// written to sector 0 (and, on FAT32, to the backup sector).
pub struct BootSector {
    image: [u8; BOOT_SECTOR_SIZE],
}

impl BootSector {
    /// Builds the boot sector for `layout`.
    ///
    /// Everything not filled in here deliberately stays zero: drive number,
    /// BIOS geometry, hidden sectors, and the volume id, which keeps the
    /// output deterministic for a given device size.
    pub fn for_layout(layout: &FsLayout) -> Self {
        let mut image = [0u8; BOOT_SECTOR_SIZE];
        let (head, tail) = image.split_at_mut(BPB_EXT_OFFSET);

        let total_sectors = layout.total_sectors();
        let small_total = layout.fat_type != FatType::Fat32 && total_sectors <= 0xFFFF;

        let bpb = RawBpb::from_bytes_mut(head);
        bpb.jump = JUMP_STUB;
        bpb.oem_name = OEM_NAME;
        bpb.bytes_per_sector = (layout.bytes_per_sector() as u16).to_le_bytes();
        bpb.sectors_per_cluster = layout.sectors_per_cluster() as u8;
        bpb.reserved_sector_count = (layout.reserved_sectors() as u16).to_le_bytes();
        bpb.fat_count = 2;
        bpb.media_type = MEDIA_DISK;
        if small_total {
            bpb.total_sectors_16 = (total_sectors as u16).to_le_bytes();
        } else {
            bpb.total_sectors_32 = total_sectors.to_le_bytes();
        }

        match layout.fat_type {
            FatType::Fat32 => {
                let ext = RawBpbExt32::from_bytes_mut(tail);
                ext.sectors_per_fat_32 = layout.fat_sectors().to_le_bytes();
                ext.root_cluster = ROOT_CLUSTER.to_le_bytes();
                ext.fs_info_sector = (FS_INFO_SECTOR as u16).to_le_bytes();
                ext.boot_sector = (BACKUP_BOOT_SECTOR as u16).to_le_bytes();
                ext.ext_boot_signature = EXT_BOOT_SIGNATURE;
                ext.volume_label = BLANK_LABEL;
                ext.fs_type = *layout.fat_type.label();
                ext.signature_word = 0xAA55u16.to_le_bytes();
            }
            _ => {
                bpb.root_entry_count = (layout.root_entry_count() as u16).to_le_bytes();
                bpb.sectors_per_fat_16 = (layout.fat_sectors() as u16).to_le_bytes();
                let ext = RawBpbExt16::from_bytes_mut(tail);
                ext.ext_boot_signature = EXT_BOOT_SIGNATURE;
                ext.volume_label = BLANK_LABEL;
                ext.fs_type = *layout.fat_type.label();
                ext.signature_word = 0xAA55u16.to_le_bytes();
            }
        }

        Self { image }
    }

    /// The 512-byte image.
    pub fn as_bytes(&self) -> &[u8; BOOT_SECTOR_SIZE] {
        &self.image
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn read_u16(image: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([image[offset], image[offset + 1]])
    }

    fn read_u32(image: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            image[offset],
            image[offset + 1],
            image[offset + 2],
            image[offset + 3],
        ])
    }

    #[test]
    fn fat12_boot_sector_fields() {
        let layout = FsLayout::calculate(4096, 9).unwrap();
        let boot = BootSector::for_layout(&layout);
        let image = boot.as_bytes();

        assert_eq!(&image[0..3], &[0xEB, 0xFE, 0x90]);
        assert_eq!(&image[3..11], b"mkfat   ");
        assert_eq!(read_u16(image, 0x00B), 512);
        assert_eq!(image[0x00D], 2); // sectors per cluster
        assert_eq!(read_u16(image, 0x00E), 1); // reserved sectors
        assert_eq!(image[0x010], 2); // FAT count
        assert_eq!(read_u16(image, 0x011), 528); // root entries
        assert_eq!(read_u16(image, 0x013), 4096); // total sectors, 16-bit
        assert_eq!(read_u32(image, 0x020), 0);
        assert_eq!(image[0x015], 0xF8); // media
        assert_eq!(read_u16(image, 0x016), 7); // sectors per FAT
        assert_eq!(image[0x026], 0x29);
        assert_eq!(&image[0x02B..0x036], b"           ");
        assert_eq!(&image[0x036..0x03E], b"FAT12   ");
        assert_eq!(&image[0x1FE..0x200], &[0x55, 0xAA]);
    }

    #[test]
    fn fat32_boot_sector_fields() {
        let layout = FsLayout::calculate(1 << 20, 9).unwrap();
        let boot = BootSector::for_layout(&layout);
        let image = boot.as_bytes();

        assert_eq!(read_u16(image, 0x00B), 512);
        assert_eq!(image[0x00D], 8);
        assert_eq!(read_u16(image, 0x00E), 32);
        assert_eq!(read_u16(image, 0x011), 0); // no flat root
        assert_eq!(read_u16(image, 0x013), 0); // 32-bit total only
        assert_eq!(read_u32(image, 0x020), 1 << 20);
        assert_eq!(read_u16(image, 0x016), 0); // FAT size lives at 0x024
        assert_eq!(read_u32(image, 0x024), 1024);
        assert_eq!(read_u32(image, 0x02C), 2); // root cluster
        assert_eq!(read_u16(image, 0x030), 1); // FSInfo sector
        assert_eq!(read_u16(image, 0x032), 6); // backup boot sector
        assert_eq!(image[0x042], 0x29);
        assert_eq!(&image[0x047..0x052], b"           ");
        assert_eq!(&image[0x052..0x05A], b"FAT32   ");
        assert_eq!(&image[0x1FE..0x200], &[0x55, 0xAA]);
    }

    #[test]
    fn large_fat16_uses_32_bit_total() {
        let layout = FsLayout::calculate(500_000, 9).unwrap();
        assert_eq!(layout.fat_type, FatType::Fat16);
        let boot = BootSector::for_layout(&layout);
        let image = boot.as_bytes();

        assert_eq!(read_u16(image, 0x013), 0);
        assert_eq!(read_u32(image, 0x020), 500_000);
        assert_eq!(&image[0x036..0x03E], b"FAT16   ");
    }
}
