//! Raw FSInfo sector layout, FAT32 only.

/// FSI_LeadSig
pub const LEAD_SIGNATURE: u32 = 0x41615252;
/// FSI_StrucSig
pub const STRUCTURE_SIGNATURE: u32 = 0x61417272;
/// FSI_TrailSig
pub const TRAIL_SIGNATURE: u32 = 0xAA55_0000;

/// The FSInfo sector: free-space bookkeeping so FAT32 drivers do not have
/// to scan the whole FAT on mount.
#[repr(C, packed)]
#[derive(Clone, Copy, bytemuck::NoUninit, bytemuck::AnyBitPattern)]
pub struct RawFsInfo {
    /// FSI_LeadSig
    pub lead_signature: [u8; 4],
    /// FSI_Reserved1
    pub reserved1: [u8; 480],
    /// FSI_StrucSig
    pub structure_signature: [u8; 4],
    /// FSI_Free_Count
    ///
    /// Clusters not yet allocated. On a fresh volume everything except the
    /// root directory cluster is free.
    pub free_count: [u8; 4],
    /// FSI_Nxt_Free
    ///
    /// Allocation hint; the first data cluster on a fresh volume.
    pub next_free: [u8; 4],
    /// FSI_Reserved2
    pub reserved2: [u8; 12],
    /// FSI_TrailSig
    pub trail_signature: [u8; 4],
}

impl RawFsInfo {
    /// Views a 512-byte FSInfo image.
    pub fn from_bytes_mut(bytes: &mut [u8]) -> &mut Self {
        bytemuck::from_bytes_mut(bytes)
    }
}
