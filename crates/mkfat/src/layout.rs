//! Volume geometry calculation.
//!
//! [`FsLayout::calculate`] derives the complete region layout of a volume
//! from the device size alone; it performs no I/O. The writers in
//! [`crate::mkfs`] and [`crate::structures`] consume the result as-is, so
//! everything a reader will later derive from the BPB is decided here.

use crate::{FatType, FormatError};

/// Smallest legal logical sector, 512 bytes.
pub const LOG2_SECTOR_SIZE_MIN: u32 = 9;
/// Largest legal logical sector, 4096 bytes.
pub const LOG2_SECTOR_SIZE_MAX: u32 = 12;
/// [`LOG2_SECTOR_SIZE_MAX`] in bytes. The format writers keep one sector of
/// scratch on the stack, so this bounds their buffer size.
pub const SECTOR_SIZE_MAX: usize = 1 << LOG2_SECTOR_SIZE_MAX;
/// Largest cluster the growth loop may reach, 32 KiB.
const LOG2_CLUSTER_SIZE_MAX: u32 = 15;

/// Volumes below this sector count become FAT12, per the type selection
/// table in the FAT specification (fatgen103).
const FAT12_MAX_SECTORS: u32 = 8400;
/// Volumes below this sector count (and at or above the FAT12 bound) become
/// FAT16.
const FAT16_MAX_SECTORS: u32 = 1 << 20;

/// The flat FAT12/FAT16 root directory is sized for at least 512 entries of
/// 32 bytes.
const ROOT_DIR_MIN_BYTES: u64 = 512 * 32;

/// The computed geometry of a volume.
///
/// All `*_blocks` figures are in device blocks. One logical sector is
/// `1 << (log2_sector_size - log2_block_size)` blocks and every region
/// covers a whole number of sectors. The regions are laid out in order:
/// reserved, two FAT copies back to back, the flat root directory
/// (FAT12/16 only), then the data clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsLayout {
    /// Log2 of the device block size the layout was computed for.
    pub log2_block_size: u32,
    /// Log2 of the logical sector size in bytes, in `9..=12`.
    pub log2_sector_size: u32,
    /// Log2 of the cluster size in device blocks.
    pub log2_blocks_per_cluster: u32,
    /// Blocks ahead of the first FAT copy: one sector for FAT12/16, 32
    /// sectors for FAT32.
    pub reserved_blocks: u64,
    /// Blocks of the flat root directory region; 0 on FAT32, where the root
    /// directory is cluster 2 instead.
    pub root_blocks: u64,
    /// Blocks of ONE FAT copy.
    pub fat_blocks: u64,
    /// Blocks the volume's regions span. On a device too small to hold its
    /// own metadata this exceeds the device, and formatting fails at the
    /// first out-of-bounds write.
    pub logical_blocks: u64,
    /// Total addressable clusters; cluster numbering starts at 2.
    pub clusters: u32,
    /// The FAT variant the sector count selects.
    pub fat_type: FatType,
}

impl FsLayout {
    /// Computes the layout for a device of `block_count` blocks of
    /// `1 << log2_block_size` bytes each.
    ///
    /// The only failure is a block size above 4096 bytes, which no FAT
    /// sector can cover. Devices whose sector count overflows the BPB's 32
    /// bits are truncated; trailing blocks simply do not become part of the
    /// volume. Devices too small to hold the metadata regions still get a
    /// layout, but formatting them fails once a write lands past the device
    /// end.
    pub fn calculate(block_count: u64, log2_block_size: u32) -> Result<Self, FormatError> {
        if log2_block_size > LOG2_SECTOR_SIZE_MAX {
            return Err(FormatError::BlockSize(log2_block_size));
        }

        // Sectors are never smaller than 512 bytes. Grow them further while
        // the sector count still overflows 32 bits.
        let mut log2_bps = LOG2_SECTOR_SIZE_MIN.saturating_sub(log2_block_size);
        while log2_block_size + log2_bps < LOG2_SECTOR_SIZE_MAX
            && (block_count >> log2_bps) > u64::from(u32::MAX)
        {
            log2_bps += 1;
        }
        let log2_sector_size = log2_block_size + log2_bps;

        // The volume uses whole sectors of whatever the BPB can address.
        let mut nblk = block_count.min(u64::from(u32::MAX) << log2_bps);
        nblk &= !((1u64 << log2_bps) - 1);
        let nsect = (nblk >> log2_bps) as u32;

        let (fat_type, cluster_alarm, mut log2_spc) = if nsect < FAT12_MAX_SECTORS {
            (FatType::Fat12, 1u32 << 12, 1)
        } else if nsect < FAT16_MAX_SECTORS {
            (FatType::Fat16, 1 << 16, 1)
        } else {
            (FatType::Fat32, 1 << 21, 3)
        };

        // Grow clusters up to 32 KiB while their count stays above the
        // per-type alarm threshold. This keeps the FAT small and keeps the
        // cluster count inside the range a reader expects for the type.
        while log2_spc < 7
            && log2_sector_size + log2_spc < LOG2_CLUSTER_SIZE_MAX
            && (nsect >> log2_spc) > cluster_alarm
        {
            log2_spc += 1;
        }
        let log2_bpc = log2_bps + log2_spc;

        let reserved_sectors: u64 = match fat_type {
            FatType::Fat32 => 32,
            _ => 1,
        };
        let reserved_blocks = reserved_sectors << log2_bps;

        // Upper bound on the cluster count, including the two reserved FAT
        // slots. The FAT is sized from it once and never regrows.
        let est_clusters = (nblk.saturating_sub(reserved_blocks) >> log2_bpc) + 2;
        let fat_bytes = match fat_type {
            FatType::Fat32 => est_clusters * 4,
            FatType::Fat16 => est_clusters * 2,
            // Two 12-bit entries per three bytes
            FatType::Fat12 => (est_clusters * 3 + 1) >> 1,
        };
        // Whole sectors, so the BPB's per-sector FAT size is exact.
        let fat_blocks = bytes_to_blocks(log2_sector_size, fat_bytes) << log2_bps;

        let root_blocks = match fat_type {
            FatType::Fat32 => 0,
            _ => bytes_to_blocks(log2_block_size, ROOT_DIR_MIN_BYTES),
        };

        let meta_blocks = reserved_blocks + fat_blocks * 2 + root_blocks;
        let clusters = ((nblk.saturating_sub(meta_blocks) >> log2_bpc) + 2) as u32;
        let data_blocks = u64::from(clusters - 2) << log2_bpc;

        // FAT12/16: the root region absorbs the slack behind the last
        // cluster, so the volume is an exact sum of its regions. FAT32
        // slack stays outside the volume entirely.
        let root_blocks = match fat_type {
            FatType::Fat32 => 0,
            _ => nblk.saturating_sub(reserved_blocks + fat_blocks * 2 + data_blocks),
        };
        let logical_blocks = reserved_blocks + fat_blocks * 2 + root_blocks + data_blocks;

        Ok(FsLayout {
            log2_block_size,
            log2_sector_size,
            log2_blocks_per_cluster: log2_bpc,
            reserved_blocks,
            root_blocks,
            fat_blocks,
            logical_blocks,
            clusters,
            fat_type,
        })
    }

    /// Log2 of the device blocks in one logical sector.
    pub fn log2_blocks_per_sector(&self) -> u32 {
        self.log2_sector_size - self.log2_block_size
    }

    /// The logical sector size in bytes.
    pub fn bytes_per_sector(&self) -> u32 {
        1 << self.log2_sector_size
    }

    /// Sectors in one cluster.
    pub fn sectors_per_cluster(&self) -> u32 {
        1 << (self.log2_blocks_per_cluster - self.log2_blocks_per_sector())
    }

    /// Device blocks in one cluster.
    pub fn blocks_per_cluster(&self) -> u64 {
        1 << self.log2_blocks_per_cluster
    }

    /// The reserved region in sectors: 1 for FAT12/16, 32 for FAT32.
    pub fn reserved_sectors(&self) -> u32 {
        (self.reserved_blocks >> self.log2_blocks_per_sector()) as u32
    }

    /// One FAT copy in sectors.
    pub fn fat_sectors(&self) -> u32 {
        (self.fat_blocks >> self.log2_blocks_per_sector()) as u32
    }

    /// Sectors used by the volume.
    pub fn total_sectors(&self) -> u32 {
        (self.logical_blocks >> self.log2_blocks_per_sector()) as u32
    }

    /// 32-byte entries in the flat root directory; 0 on FAT32.
    pub fn root_entry_count(&self) -> u32 {
        ((self.root_blocks << self.log2_block_size) >> 5) as u32
    }

    /// Data clusters free immediately after formatting. The two reserved
    /// FAT slots never hold data, and on FAT32 the root directory occupies
    /// cluster 2.
    pub fn free_clusters(&self) -> u32 {
        match self.fat_type {
            FatType::Fat32 => self.clusters.saturating_sub(3),
            _ => self.clusters - 2,
        }
    }

    /// First block of the first FAT copy.
    pub fn fat_start_block(&self) -> u64 {
        self.reserved_blocks
    }

    /// First block of the flat root directory region (FAT12/16).
    pub fn root_start_block(&self) -> u64 {
        self.reserved_blocks + self.fat_blocks * 2
    }

    /// First block of the data area. On FAT32 this is where cluster 2, the
    /// root directory, lives.
    pub fn data_start_block(&self) -> u64 {
        self.root_start_block() + self.root_blocks
    }

    /// The device block a logical sector starts at.
    pub fn sector_to_block(&self, sector: u64) -> u64 {
        sector << self.log2_blocks_per_sector()
    }
}

/// Rounds a byte count up to whole units of `1 << log2_size` bytes.
fn bytes_to_blocks(log2_size: u32, bytes: u64) -> u64 {
    (bytes + (1 << log2_size) - 1) >> log2_size
}
