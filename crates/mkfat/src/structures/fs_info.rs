//! FSInfo sector construction, FAT32 only.

use crate::layout::FsLayout;
use crate::structures::BOOT_SECTOR_SIZE;
use crate::structures::raw::constants::ROOT_CLUSTER;
use crate::structures::raw::fs_info::{
    LEAD_SIGNATURE, RawFsInfo, STRUCTURE_SIGNATURE, TRAIL_SIGNATURE,
};

/// An FSInfo sector image for a freshly formatted volume.
pub struct FsInfo {
    image: [u8; BOOT_SECTOR_SIZE],
}

impl FsInfo {
    /// Builds the FSInfo sector for `layout`: every data cluster except the
    /// root directory is free, and allocation starts searching at the first
    /// data cluster.
    pub fn for_layout(layout: &FsLayout) -> Self {
        let mut image = [0u8; BOOT_SECTOR_SIZE];
        let raw = RawFsInfo::from_bytes_mut(&mut image);
        raw.lead_signature = LEAD_SIGNATURE.to_le_bytes();
        raw.structure_signature = STRUCTURE_SIGNATURE.to_le_bytes();
        raw.free_count = layout.free_clusters().to_le_bytes();
        raw.next_free = ROOT_CLUSTER.to_le_bytes();
        raw.trail_signature = TRAIL_SIGNATURE.to_le_bytes();
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

    #[test]
    fn signatures_and_counts() {
        let layout = FsLayout::calculate(1 << 20, 9).unwrap();
        assert_eq!(layout.clusters, 130_814);
        let info = FsInfo::for_layout(&layout);
        let image = info.as_bytes();

        assert_eq!(&image[0..4], &0x41615252u32.to_le_bytes());
        assert_eq!(&image[0x1E4..0x1E8], &0x61417272u32.to_le_bytes());
        assert_eq!(&image[0x1E8..0x1EC], &130_811u32.to_le_bytes());
        assert_eq!(&image[0x1EC..0x1F0], &2u32.to_le_bytes());
        assert_eq!(&image[0x1FC..0x200], &0xAA55_0000u32.to_le_bytes());
        // The reserved ranges stay zero.
        assert!(image[4..0x1E4].iter().all(|&b| b == 0));
        assert!(image[0x1F0..0x1FC].iter().all(|&b| b == 0));
    }
}
