//! Raw byte-exact representations of the on-disk structures.
//!
//! Every multi-byte field is a little-endian `[u8; N]`, so the structs have
//! alignment 1 and can be cast straight over sector buffers with bytemuck.
//! The field offsets are pinned by static assertions in each module's tests.

pub mod boot_sector;
pub mod constants;
pub mod fs_info;
