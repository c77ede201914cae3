//! FAT table construction.
//!
//! All three table widths share one fill driver; the width-specific pieces,
//! the group geometry and the entry codec, live behind [`FatEncoding`].
//! The driver encodes whole groups into a small scratch buffer and copies
//! the bytes that land inside the block being written, which is what lets
//! FAT12 groups straddle a block boundary: a 512-byte block holds 170 full
//! three-byte groups plus two bytes of the next one.

use mkfat_block::BlockDevice;

use crate::layout::{FsLayout, SECTOR_SIZE_MAX};
use crate::structures::raw::constants::{fat12, fat16, fat32};
use crate::{FatType, FormatError};

/// The width-specific half of the FAT fill driver.
///
/// An encoding packs [`GROUP_ENTRIES`](Self::GROUP_ENTRIES) table entries
/// into [`GROUP_BYTES`](Self::GROUP_BYTES) bytes. FAT16 and FAT32 entries
/// stand alone; FAT12 packs two 12-bit entries into three bytes.
pub trait FatEncoding {
    const GROUP_BYTES: usize;
    const GROUP_ENTRIES: usize;

    /// The value a freshly formatted table holds in `slot`.
    fn slot_value(slot: u64, clusters: u32) -> u32;

    /// Encodes entry `index` of a group into `group`, leaving the bits of
    /// the other entry in the group untouched.
    fn encode(group: &mut [u8], index: usize, value: u32);

    /// Decodes entry `index` of a group.
    fn decode(group: &[u8], index: usize) -> u32;

    /// Entries fully contained in a table of `bytes` bytes.
    fn capacity(bytes: u64) -> u64 {
        bytes * Self::GROUP_ENTRIES as u64 / Self::GROUP_BYTES as u64
    }
}

/// The 12-bit encoding, two entries packed into three bytes.
pub struct Fat12;
/// The 16-bit little-endian encoding.
pub struct Fat16;
/// The 32-bit little-endian encoding with the top four bits reserved.
pub struct Fat32;

impl FatEncoding for Fat12 {
    const GROUP_BYTES: usize = 3;
    const GROUP_ENTRIES: usize = 2;

    fn slot_value(slot: u64, clusters: u32) -> u32 {
        match slot {
            0 => u32::from(fat12::SLOT0),
            1 => u32::from(fat12::SLOT1),
            _ if slot < u64::from(clusters) => u32::from(fat12::CLUSTER_FREE),
            _ => u32::from(fat12::CLUSTER_BAD),
        }
    }

    fn encode(group: &mut [u8], index: usize, value: u32) {
        if index == 0 {
            group[0] = value as u8;
            group[1] = (group[1] & 0xF0) | ((value >> 8) as u8);
        } else {
            group[1] = (group[1] & 0x0F) | ((value << 4) as u8);
            group[2] = (value >> 4) as u8;
        }
    }

    fn decode(group: &[u8], index: usize) -> u32 {
        if index == 0 {
            u32::from(group[0]) | (u32::from(group[1] & 0x0F) << 8)
        } else {
            u32::from(group[1] >> 4) | (u32::from(group[2]) << 4)
        }
    }
}

impl FatEncoding for Fat16 {
    const GROUP_BYTES: usize = 2;
    const GROUP_ENTRIES: usize = 1;

    fn slot_value(slot: u64, clusters: u32) -> u32 {
        match slot {
            0 => u32::from(fat16::SLOT0),
            1 => u32::from(fat16::SLOT1),
            _ if slot < u64::from(clusters) => u32::from(fat16::CLUSTER_FREE),
            _ => u32::from(fat16::CLUSTER_BAD),
        }
    }

    fn encode(group: &mut [u8], _index: usize, value: u32) {
        group[..2].copy_from_slice(&(value as u16).to_le_bytes());
    }

    fn decode(group: &[u8], _index: usize) -> u32 {
        u32::from(u16::from_le_bytes([group[0], group[1]]))
    }
}

impl FatEncoding for Fat32 {
    const GROUP_BYTES: usize = 4;
    const GROUP_ENTRIES: usize = 1;

    fn slot_value(slot: u64, clusters: u32) -> u32 {
        match slot {
            0 => fat32::SLOT0,
            1 => fat32::SLOT1,
            // End-of-chain for the one-cluster root directory.
            2 => fat32::SLOT2,
            _ if slot < u64::from(clusters) => fat32::CLUSTER_FREE,
            _ => fat32::CLUSTER_BAD,
        }
    }

    fn encode(group: &mut [u8], _index: usize, value: u32) {
        group[..4].copy_from_slice(&value.to_le_bytes());
    }

    fn decode(group: &[u8], _index: usize) -> u32 {
        u32::from_le_bytes([group[0], group[1], group[2], group[3]])
    }
}

/// Fills `buf` with the bytes of a fresh table, starting at `byte_offset`
/// within one copy. Every byte of `buf` is written.
fn fill<E: FatEncoding>(byte_offset: u64, buf: &mut [u8], clusters: u32) {
    let group_bytes = E::GROUP_BYTES as u64;
    let end = byte_offset + buf.len() as u64;
    let mut scratch = [0u8; 4];
    let scratch = &mut scratch[..E::GROUP_BYTES];

    let mut group = byte_offset / group_bytes;
    while group * group_bytes < end {
        let group_start = group * group_bytes;
        for index in 0..E::GROUP_ENTRIES {
            let slot = group * E::GROUP_ENTRIES as u64 + index as u64;
            E::encode(scratch, index, E::slot_value(slot, clusters));
        }
        let from = group_start.max(byte_offset);
        let to = (group_start + group_bytes).min(end);
        buf[(from - byte_offset) as usize..(to - byte_offset) as usize]
            .copy_from_slice(&scratch[(from - group_start) as usize..(to - group_start) as usize]);
        group += 1;
    }
}

/// Writes both FAT copies for `layout`.
///
/// Each copy starts with the reserved header slots, holds one free entry per
/// data cluster, and marks as bad the slack entries the table can address
/// past the last cluster. The second copy restarts at byte 0 of the
/// encoding, header included.
pub(crate) fn write_tables<D: BlockDevice + ?Sized>(
    device: &mut D,
    layout: &FsLayout,
) -> Result<(), FormatError> {
    match layout.fat_type {
        FatType::Fat12 => write_tables_with::<Fat12, D>(device, layout),
        FatType::Fat16 => write_tables_with::<Fat16, D>(device, layout),
        FatType::Fat32 => write_tables_with::<Fat32, D>(device, layout),
    }
}

fn write_tables_with<E: FatEncoding, D: BlockDevice + ?Sized>(
    device: &mut D,
    layout: &FsLayout,
) -> Result<(), FormatError> {
    let mut buf = [0u8; SECTOR_SIZE_MAX];
    let buf = &mut buf[..1 << layout.log2_block_size];
    let start = layout.fat_start_block();
    for i in 0..layout.fat_blocks * 2 {
        let offset = (i % layout.fat_blocks) << layout.log2_block_size;
        fill::<E>(offset, buf, layout.clusters);
        device.write(start + i, buf)?;
    }
    Ok(())
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::MemDevice;

    use super::*;

    /// Reads entry `slot` from a flat table image. Only valid while the
    /// whole group lies inside `table`.
    fn entry_at<E: FatEncoding>(table: &[u8], slot: u64) -> u32 {
        let group = (slot / E::GROUP_ENTRIES as u64) as usize;
        let start = group * E::GROUP_BYTES;
        E::decode(
            &table[start..start + E::GROUP_BYTES],
            (slot % E::GROUP_ENTRIES as u64) as usize,
        )
    }

    #[test]
    fn fat12_packs_two_entries_in_three_bytes() {
        let mut group = [0u8; 3];
        Fat12::encode(&mut group, 0, 0x123);
        Fat12::encode(&mut group, 1, 0xABC);
        assert_eq!(group, [0x23, 0xC1, 0xAB]);
        assert_eq!(Fat12::decode(&group, 0), 0x123);
        assert_eq!(Fat12::decode(&group, 1), 0xABC);

        // Re-encoding one entry leaves the other alone.
        Fat12::encode(&mut group, 0, 0xFF7);
        assert_eq!(Fat12::decode(&group, 1), 0xABC);
    }

    #[test]
    fn header_slots_encode_to_known_bytes() {
        let mut group = [0u8; 3];
        Fat12::encode(&mut group, 0, Fat12::slot_value(0, 100));
        Fat12::encode(&mut group, 1, Fat12::slot_value(1, 100));
        assert_eq!(group, [0xF8, 0xFF, 0xFF]);

        let mut group = [0u8; 2];
        Fat16::encode(&mut group, 0, Fat16::slot_value(0, 100));
        assert_eq!(group, [0xF8, 0xFF]);

        let mut group = [0u8; 4];
        Fat32::encode(&mut group, 0, Fat32::slot_value(0, 100));
        assert_eq!(group, [0xF8, 0xFF, 0xFF, 0xFF]);
        Fat32::encode(&mut group, 0, Fat32::slot_value(2, 100));
        assert_eq!(group, [0xF8, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn fill_marks_reserved_free_and_bad() {
        let layout = FsLayout::calculate(64, 9).unwrap();
        assert_eq!(layout.fat_type, FatType::Fat12);
        assert_eq!(layout.fat_blocks, 1);
        assert_eq!(layout.clusters, 16);

        let mut table = [0u8; 512];
        fill::<Fat12>(0, &mut table, layout.clusters);

        assert_eq!(entry_at::<Fat12>(&table, 0), 0xFF8);
        assert_eq!(entry_at::<Fat12>(&table, 1), 0xFFF);
        for slot in 2..16 {
            assert_eq!(entry_at::<Fat12>(&table, slot), 0x000, "slot {slot}");
        }
        // The slack the table can address past the last cluster is bad.
        for slot in 16..340 {
            assert_eq!(entry_at::<Fat12>(&table, slot), 0xFF7, "slot {slot}");
        }
        // Entry 340 and the truncated entry 341 at the table's edge.
        assert_eq!(table[510], 0xF7);
        assert_eq!(table[511], 0x7F);
    }

    #[test]
    fn fat12_group_straddles_blocks() {
        // Entry 341 spans bytes 511 and 512, so its twelve bits land in two
        // different blocks and each fill sees only part of the group.
        let clusters = 300;
        let mut block0 = [0u8; 512];
        let mut block1 = [0u8; 512];
        fill::<Fat12>(0, &mut block0, clusters);
        fill::<Fat12>(512, &mut block1, clusters);

        assert_eq!(block0[510], 0xF7);
        assert_eq!(block0[511], 0x7F);
        assert_eq!(block1[0], 0xFF);

        let mut table = Vec::new();
        table.extend_from_slice(&block0);
        table.extend_from_slice(&block1);
        assert_eq!(Fat12::capacity(table.len() as u64), 682);
        assert_eq!(entry_at::<Fat12>(&table, 299), 0x000);
        // Everything from the cluster count to the table's capacity is bad,
        // including the entry split across the block boundary.
        for slot in 300..682 {
            assert_eq!(entry_at::<Fat12>(&table, slot), 0xFF7, "slot {slot}");
        }
    }

    #[test]
    fn second_copy_restarts_at_header() {
        let layout = FsLayout::calculate(4096, 9).unwrap();
        assert_eq!(layout.fat_start_block(), 1);
        assert_eq!(layout.fat_blocks, 7);

        let mut dev = MemDevice::new(9, 4096);
        write_tables(&mut dev, &layout).unwrap();
        let bytes = dev.as_bytes();

        assert_eq!(&bytes[512..515], &[0xF8, 0xFF, 0xFF]);
        // The first copy ends mid-group; the second still opens with the
        // media descriptor, not a continuation of the first.
        assert_eq!(bytes[4095], 0x7F);
        assert_eq!(&bytes[4096..4099], &[0xF8, 0xFF, 0xFF]);
        // Nothing outside the FAT region is touched.
        assert_eq!(bytes[511], 0x00);
        assert_eq!(&bytes[7680..7690], &[0u8; 10][..]);
    }
}
