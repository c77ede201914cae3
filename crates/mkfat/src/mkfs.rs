//! Volume formatting.
//!
//! [`mkfs`] lays down a complete empty volume: the reserved region, both
//! FAT copies, the empty root directory, and on FAT32 the FSInfo sector and
//! the backup boot region. The boot sector itself is written last, so until
//! the final write the device never carries the 0x55AA signature and a
//! format interrupted partway leaves nothing a reader would mount.

use mkfat_block::BlockDevice;

use crate::layout::{FsLayout, SECTOR_SIZE_MAX};
use crate::structures::BOOT_SECTOR_SIZE;
use crate::structures::boot_sector::BootSector;
use crate::structures::fat;
use crate::structures::fs_info::FsInfo;
use crate::structures::raw::constants::{BACKUP_BOOT_SECTOR, FS_INFO_SECTOR};
use crate::{FatType, FormatError};

/// Formats `device` as an empty FAT volume.
///
/// `block_count` is the number of blocks available for the volume; the
/// block size comes from the device. The FAT variant and the whole
/// geometry follow from those two figures alone, see
/// [`FsLayout::calculate`]. On success the computed layout is returned.
///
/// Writes stop at the first device error. The caller should treat the
/// device contents as unspecified after a failure, with one guarantee:
/// the boot signature is written as the final step, so an interrupted
/// format is never mistaken for a finished one.
pub fn mkfs<D: BlockDevice + ?Sized>(
    device: &mut D,
    block_count: u64,
) -> Result<FsLayout, FormatError> {
    let layout = FsLayout::calculate(block_count, device.log2_block_size())?;
    log::debug!(
        "formatting {:?} volume: {} sectors of {} bytes, {} sectors per cluster, {} clusters",
        layout.fat_type,
        layout.total_sectors(),
        layout.bytes_per_sector(),
        layout.sectors_per_cluster(),
        layout.clusters
    );

    log::trace!("erasing {} reserved blocks", layout.reserved_blocks);
    erase_blocks(device, layout.log2_block_size, 0, layout.reserved_blocks)?;

    log::trace!("writing 2 FAT copies of {} blocks each", layout.fat_blocks);
    fat::write_tables(device, &layout)?;

    match layout.fat_type {
        FatType::Fat32 => {
            log::trace!("erasing the root directory cluster");
            erase_blocks(
                device,
                layout.log2_block_size,
                layout.data_start_block(),
                layout.blocks_per_cluster(),
            )?;
        }
        _ => {
            log::trace!("erasing {} root directory blocks", layout.root_blocks);
            erase_blocks(
                device,
                layout.log2_block_size,
                layout.root_start_block(),
                layout.root_blocks,
            )?;
        }
    }

    if layout.fat_type == FatType::Fat32 {
        log::trace!("writing FSInfo and the backup boot region");
        let fs_info = FsInfo::for_layout(&layout);
        write_sector(device, &layout, FS_INFO_SECTOR, fs_info.as_bytes())?;
        write_sector(
            device,
            &layout,
            BACKUP_BOOT_SECTOR + FS_INFO_SECTOR,
            fs_info.as_bytes(),
        )?;
    }

    let boot = BootSector::for_layout(&layout);
    if layout.fat_type == FatType::Fat32 {
        write_sector(device, &layout, BACKUP_BOOT_SECTOR, boot.as_bytes())?;
    }
    log::trace!("writing the boot sector");
    write_sector(device, &layout, 0, boot.as_bytes())?;

    Ok(layout)
}

/// Zero-fills `blocks` device blocks starting at `start`.
fn erase_blocks<D: BlockDevice + ?Sized>(
    device: &mut D,
    log2_block_size: u32,
    start: u64,
    blocks: u64,
) -> Result<(), FormatError> {
    let zero = [0u8; SECTOR_SIZE_MAX];
    let zero = &zero[..1 << log2_block_size];
    for block in start..start + blocks {
        device.write(block, zero)?;
    }
    Ok(())
}

/// Writes a 512-byte structure image at the head of logical `sector`,
/// padding the rest of the sector with zeros, in a single device write.
fn write_sector<D: BlockDevice + ?Sized>(
    device: &mut D,
    layout: &FsLayout,
    sector: u64,
    image: &[u8; BOOT_SECTOR_SIZE],
) -> Result<(), FormatError> {
    let mut buf = [0u8; SECTOR_SIZE_MAX];
    buf[..BOOT_SECTOR_SIZE].copy_from_slice(image);
    device.write(
        layout.sector_to_block(sector),
        &buf[..1 << layout.log2_sector_size],
    )?;
    Ok(())
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{DeviceError, MemDevice};

    use super::*;

    #[test]
    fn formats_a_fat12_volume() {
        let mut dev = MemDevice::new(9, 4096);
        let layout = mkfs(&mut dev, 4096).unwrap();
        assert_eq!(layout.fat_type, FatType::Fat12);

        let bytes = dev.as_bytes();
        assert_eq!(&bytes[0x1FE..0x200], &[0x55, 0xAA]);
        assert_eq!(&bytes[3..11], b"mkfat   ");
        // Both FAT copies open with the media descriptor.
        assert_eq!(&bytes[512..515], &[0xF8, 0xFF, 0xFF]);
        assert_eq!(&bytes[8 * 512..8 * 512 + 3], &[0xF8, 0xFF, 0xFF]);
    }

    #[test]
    fn undersized_device_fails_without_a_signature() {
        // Two blocks cannot hold even the metadata; the second FAT copy
        // already lands past the end.
        let mut dev = MemDevice::new(9, 2);
        assert_eq!(
            mkfs(&mut dev, 2),
            Err(FormatError::Io(DeviceError::OutOfBounds))
        );
        assert_eq!(&dev.as_bytes()[0x1FE..0x200], &[0, 0]);
    }

    #[test]
    fn oversized_blocks_leave_the_device_untouched() {
        let mut dev = MemDevice::new(13, 4);
        assert_eq!(mkfs(&mut dev, 4), Err(FormatError::BlockSize(13)));
        assert!(dev.as_bytes().iter().all(|&b| b == 0));
    }
}
