/// File system detection and module organization
use std::path::Path;

pub mod common;
pub mod minix;

use crate::error::Result;
use crate::session::{MinixConfig, MinixSession};
use common::{read_bytes_at, BlockDevice};

/// Check whether the selected (sub)partition of an image holds a MINIX filesystem
pub fn detect_filesystem(device_path: &Path, config: &MinixConfig) -> Result<bool> {
    let mut device = BlockDevice::open(device_path)?;
    let location = minix::partition::resolve(&mut device, config.primary_partition, config.subpartition)?;

    let offset = location.start + minix::superblock::SUPERBLOCK_OFFSET;
    match read_bytes_at(&mut device, offset, minix::superblock::SUPERBLOCK_SIZE) {
        Ok(raw) => Ok(minix::is_minix_superblock(&raw)),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Get human-readable file system information
pub fn get_filesystem_info(device_path: &Path, config: &MinixConfig) -> Result<String> {
    let session = MinixSession::open_path(device_path, config)?;
    Ok(minix::get_filesystem_info(session.superblock(), session.partition().start))
}
