//! Inode records and the in-memory inode table

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{Cursor, Read, Seek};

use super::superblock::Superblock;
use crate::error::{MinixError, Result};
use crate::fs::common::read_bytes_at;
use crate::FileType;

/// Packed size of one inode record
pub const INODE_SIZE: usize = 64;
/// Zone addresses stored inline in an inode
pub const DIRECT_ZONES: usize = 7;
/// Inode number of the root directory
pub const ROOT_INODE: u32 = 1;

/// File type bits of `mode`
pub const S_IFMT: u16 = 0o170000;
pub const S_IFSOCK: u16 = 0o140000;
pub const S_IFLNK: u16 = 0o120000;
pub const S_IFREG: u16 = 0o100000;
pub const S_IFBLK: u16 = 0o060000;
pub const S_IFDIR: u16 = 0o040000;
pub const S_IFCHR: u16 = 0o020000;
pub const S_IFIFO: u16 = 0o010000;

/// On-disk inode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inode {
    pub mode: u16,
    pub links: u16,
    pub uid: u16,
    pub gid: u16,
    pub size: u32,
    pub atime: i32,
    pub mtime: i32,
    pub ctime: i32,
    /// Direct zone addresses, 0 marks a hole
    pub zones: [u32; DIRECT_ZONES],
    /// Single-indirect zone, 0 when absent
    pub indirect: u32,
    /// Double-indirect zone; never followed by this reader
    pub double_indirect: u32,
    pub unused: u32,
}

impl Inode {
    /// Decode one packed inode record
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < INODE_SIZE {
            return Err(MinixError::Format(format!(
                "inode needs {} bytes, got {}",
                INODE_SIZE,
                data.len()
            )));
        }

        let mut cursor = Cursor::new(data);

        let mode = cursor.read_u16::<LittleEndian>()?;
        let links = cursor.read_u16::<LittleEndian>()?;
        let uid = cursor.read_u16::<LittleEndian>()?;
        let gid = cursor.read_u16::<LittleEndian>()?;
        let size = cursor.read_u32::<LittleEndian>()?;
        let atime = cursor.read_i32::<LittleEndian>()?;
        let mtime = cursor.read_i32::<LittleEndian>()?;
        let ctime = cursor.read_i32::<LittleEndian>()?;

        let mut zones = [0u32; DIRECT_ZONES];
        for zone in zones.iter_mut() {
            *zone = cursor.read_u32::<LittleEndian>()?;
        }

        let indirect = cursor.read_u32::<LittleEndian>()?;
        let double_indirect = cursor.read_u32::<LittleEndian>()?;
        let unused = cursor.read_u32::<LittleEndian>()?;

        Ok(Inode {
            mode,
            links,
            uid,
            gid,
            size,
            atime,
            mtime,
            ctime,
            zones,
            indirect,
            double_indirect,
            unused,
        })
    }

    pub fn file_type(&self) -> FileType {
        match self.mode & S_IFMT {
            S_IFREG => FileType::RegularFile,
            S_IFDIR => FileType::Directory,
            S_IFLNK => FileType::SymbolicLink,
            S_IFBLK => FileType::BlockDevice,
            S_IFCHR => FileType::CharacterDevice,
            S_IFIFO => FileType::Fifo,
            S_IFSOCK => FileType::Socket,
            _ => FileType::Unknown,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.mode & S_IFMT == S_IFDIR
    }

    pub fn is_regular(&self) -> bool {
        self.mode & S_IFMT == S_IFREG
    }

    pub fn is_symlink(&self) -> bool {
        self.mode & S_IFMT == S_IFLNK
    }

    pub fn accessed(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.atime as i64, 0)
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.mtime as i64, 0)
    }

    pub fn changed(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.ctime as i64, 0)
    }
}

/// Every inode of the filesystem, loaded once and read-only afterwards.
///
/// Inode number N (N >= 1) lives at index N - 1; number 0 is reserved.
#[derive(Debug, Clone, Default)]
pub struct InodeTable {
    inodes: Vec<Inode>,
}

impl InodeTable {
    /// Bulk-read the inode array that follows the bitmaps
    pub fn load<R: Read + Seek>(reader: &mut R, partition_start: u64, superblock: &Superblock) -> Result<Self> {
        let offset = partition_start + superblock.inode_table_offset();
        let length = usize::try_from(superblock.ninodes as u64 * INODE_SIZE as u64).map_err(|_| {
            MinixError::Format(format!("inode count {} is too large", superblock.ninodes))
        })?;

        tracing::debug!(
            "Reading {} inodes ({} bytes) at byte {}",
            superblock.ninodes,
            length,
            offset
        );

        let raw = read_bytes_at(reader, offset, length)?;
        let inodes = raw
            .chunks_exact(INODE_SIZE)
            .map(Inode::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(InodeTable { inodes })
    }

    pub fn from_inodes(inodes: Vec<Inode>) -> Self {
        InodeTable { inodes }
    }

    /// Look up an inode by its 1-based number
    pub fn get(&self, number: u32) -> Option<&Inode> {
        if number == 0 {
            return None;
        }
        self.inodes.get(number as usize - 1)
    }

    /// The root directory inode
    pub fn root(&self) -> Result<&Inode> {
        self.get(ROOT_INODE)
            .ok_or_else(|| MinixError::Format("inode table is empty, no root inode".to_string()))
    }

    pub fn len(&self) -> usize {
        self.inodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inodes.is_empty()
    }
}
