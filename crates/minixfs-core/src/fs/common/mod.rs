//! Byte access shared by every on-disk reader

mod types;

pub use types::{read_bytes_at, read_exact_at, BlockDevice, SECTOR_SIZE};
