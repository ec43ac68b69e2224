//! Directory entry parsing
//!
//! A directory's content is a packed array of 64-byte records: a 4-byte
//! inode number followed by a 60-byte NUL-padded name. Inode number 0
//! marks a free or deleted slot.

use byteorder::{LittleEndian, ReadBytesExt};
use std::borrow::Cow;
use std::io::{Cursor, Read, Seek};

use super::inode::Inode;
use super::zones::{read_inode_data, ZoneLayout};
use crate::error::{MinixError, Result};

/// Directory entry size in bytes
pub const DIRENT_SIZE: usize = 64;
/// Width of the name field
pub const NAME_LEN: usize = 60;

/// One directory slot, live or deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub inode: u32,
    name: [u8; NAME_LEN],
}

impl DirEntry {
    /// Parse a single directory entry from 64 bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < DIRENT_SIZE {
            return Err(MinixError::Format(format!(
                "directory entry needs {} bytes, got {}",
                DIRENT_SIZE,
                data.len()
            )));
        }

        let inode = Cursor::new(data).read_u32::<LittleEndian>()?;
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&data[4..DIRENT_SIZE]);

        Ok(DirEntry { inode, name })
    }

    /// Name bytes up to the first NUL, or all 60 bytes if there is none
    pub fn name_bytes(&self) -> &[u8] {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        &self.name[..end]
    }

    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }

    pub fn is_deleted(&self) -> bool {
        self.inode == 0
    }

    /// Exact byte comparison against a path component
    pub fn matches(&self, component: &str) -> bool {
        self.name_bytes() == component.as_bytes()
    }
}

/// Split directory content into entries, keeping on-disk order.
///
/// Trailing bytes that do not fill a whole record are ignored.
pub fn parse_entries(data: &[u8]) -> Result<Vec<DirEntry>> {
    data.chunks_exact(DIRENT_SIZE).map(DirEntry::parse).collect()
}

/// Every slot of a directory, deleted ones included
pub fn list<R: Read + Seek>(reader: &mut R, layout: ZoneLayout, dir: &Inode) -> Result<Vec<DirEntry>> {
    let data = read_inode_data(reader, layout, dir)?;
    let entries = parse_entries(&data)?;
    tracing::debug!("Directory of {} bytes holds {} slots", dir.size, entries.len());
    Ok(entries)
}
