//! Read-only access to MINIX V1 disk images
//!
//! Locates an optional partition and subpartition, decodes the superblock and
//! inode table, resolves paths and reconstructs directory listings and file
//! contents from direct and single-indirect zones.

use serde::{Deserialize, Serialize};

pub mod error;
pub mod format;
pub mod fs;
pub mod session;

pub use error::{MinixError, Result};
pub use fs::common::BlockDevice;
pub use fs::minix::{DirEntry, Inode, InodeTable, PartitionEntry, PartitionLocation, Superblock, ZoneLayout};
pub use session::{InodeHandle, Listing, ListingEntry, MinixConfig, MinixSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileType {
    RegularFile,
    Directory,
    SymbolicLink,
    BlockDevice,
    CharacterDevice,
    Fifo,
    Socket,
    Unknown,
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileType::RegularFile => write!(f, "file"),
            FileType::Directory => write!(f, "directory"),
            FileType::SymbolicLink => write!(f, "symlink"),
            FileType::BlockDevice => write!(f, "block device"),
            FileType::CharacterDevice => write!(f, "character device"),
            FileType::Fifo => write!(f, "fifo"),
            FileType::Socket => write!(f, "socket"),
            FileType::Unknown => write!(f, "unknown"),
        }
    }
}
