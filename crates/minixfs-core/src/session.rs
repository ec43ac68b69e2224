//! A read session over one MINIX image
//!
//! Partition location, superblock and inode table are read once when the
//! session opens and stay unchanged afterwards. Every query reuses them.

use serde::{Deserialize, Serialize};
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::{MinixError, Result};
use crate::fs::common::BlockDevice;
use crate::fs::minix::{
    directory, partition, path, superblock, zones, DirEntry, Inode, InodeTable, PartitionLocation,
    ResolvedInode, Superblock, ZoneLayout,
};
use crate::FileType;

/// Which part of the image holds the filesystem
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinixConfig {
    /// Primary partition slot; `None` uses the whole image
    pub primary_partition: Option<u32>,
    /// Subpartition slot inside the selected partition
    pub subpartition: Option<u32>,
}

impl MinixConfig {
    pub fn whole_image() -> Self {
        Self::default()
    }

    pub fn with_partition(mut self, index: u32) -> Self {
        self.primary_partition = Some(index);
        self
    }

    pub fn with_subpartition(mut self, index: u32) -> Self {
        self.subpartition = Some(index);
        self
    }
}

/// An inode copied out of the table together with its number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InodeHandle {
    pub number: u32,
    pub inode: Inode,
}

impl From<ResolvedInode<'_>> for InodeHandle {
    fn from(resolved: ResolvedInode<'_>) -> Self {
        InodeHandle {
            number: resolved.number,
            inode: resolved.inode.clone(),
        }
    }
}

/// One line of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingEntry {
    pub name: String,
    pub inode_number: u32,
    pub file_type: FileType,
    pub mode: u16,
    pub size: u32,
}

impl ListingEntry {
    fn new(name: String, inode_number: u32, inode: &Inode) -> Self {
        ListingEntry {
            name,
            inode_number,
            file_type: inode.file_type(),
            mode: inode.mode,
            size: inode.size,
        }
    }
}

/// Result of listing a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Listing {
    /// Live entries of a directory in on-disk order
    Directory { path: String, entries: Vec<ListingEntry> },
    /// A single regular file
    File { path: String, entry: ListingEntry },
}

/// Open image plus its decoded metadata
pub struct MinixSession<R> {
    reader: R,
    partition: PartitionLocation,
    superblock: Superblock,
    inodes: InodeTable,
    layout: ZoneLayout,
}

impl MinixSession<BlockDevice> {
    /// Open an image file through a memory map
    pub fn open_path<P: AsRef<Path>>(path: P, config: &MinixConfig) -> Result<Self> {
        let device = BlockDevice::open(path.as_ref())?;
        tracing::info!(
            "Opened {} ({} bytes)",
            path.as_ref().display(),
            device.size()
        );
        Self::open(device, config)
    }
}

impl<R: Read + Seek> MinixSession<R> {
    /// Locate the filesystem, then read its superblock and inode table
    pub fn open(mut reader: R, config: &MinixConfig) -> Result<Self> {
        let partition = partition::resolve(&mut reader, config.primary_partition, config.subpartition)?;
        let superblock = superblock::read(&mut reader, partition.start)?;
        let inodes = InodeTable::load(&mut reader, partition.start, &superblock)?;
        let layout = ZoneLayout::new(partition.start, superblock.zone_size());

        tracing::info!(
            "MINIX filesystem at byte {}: {} inodes, zone size {}",
            partition.start,
            inodes.len(),
            layout.zone_size
        );

        Ok(MinixSession {
            reader,
            partition,
            superblock,
            inodes,
            layout,
        })
    }

    pub fn partition(&self) -> &PartitionLocation {
        &self.partition
    }

    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    pub fn inodes(&self) -> &InodeTable {
        &self.inodes
    }

    pub fn layout(&self) -> ZoneLayout {
        self.layout
    }

    pub fn root(&self) -> Result<InodeHandle> {
        Ok(ResolvedInode::root(&self.inodes)?.into())
    }

    /// Look up an inode by number
    pub fn inode(&self, number: u32) -> Result<&Inode> {
        self.inodes
            .get(number)
            .ok_or_else(|| MinixError::NotFound(format!("inode {}", number)))
    }

    /// Resolve a slash-separated path from the root directory
    pub fn resolve(&mut self, path: &str) -> Result<InodeHandle> {
        let components = path::split_path(path);
        let root = ResolvedInode::root(&self.inodes)?;
        let resolved = path::resolve(&mut self.reader, self.layout, &self.inodes, root, components.as_slice())?;
        Ok(resolved.into())
    }

    /// All slots of a directory, deleted ones included
    pub fn list_dir(&mut self, dir: &Inode) -> Result<Vec<DirEntry>> {
        if !dir.is_directory() {
            return Err(MinixError::NotADirectory(format!("mode 0o{:o}", dir.mode)));
        }
        directory::list(&mut self.reader, self.layout, dir)
    }

    /// Full content of an inode
    pub fn read_file(&mut self, inode: &Inode) -> Result<Vec<u8>> {
        zones::read_inode_data(&mut self.reader, self.layout, inode)
    }

    /// List a directory's live entries, or describe a single regular file
    pub fn list(&mut self, path: &str) -> Result<Listing> {
        let target = self.resolve(path)?;

        if target.inode.is_directory() {
            let slots = self.list_dir(&target.inode)?;
            let mut entries = Vec::new();
            for slot in slots.iter().filter(|e| !e.is_deleted()) {
                let inode = self.inodes.get(slot.inode).ok_or_else(|| {
                    MinixError::Format(format!(
                        "entry '{}' points at inode {} outside a table of {}",
                        slot.name(),
                        slot.inode,
                        self.inodes.len()
                    ))
                })?;
                entries.push(ListingEntry::new(slot.name().into_owned(), slot.inode, inode));
            }
            Ok(Listing::Directory {
                path: path.to_string(),
                entries,
            })
        } else if target.inode.is_regular() {
            Ok(Listing::File {
                path: path.to_string(),
                entry: ListingEntry::new(path.to_string(), target.number, &target.inode),
            })
        } else {
            Err(MinixError::NotAFile(format!(
                "'{}' is neither a file nor a directory",
                path
            )))
        }
    }

    /// Content of the regular file at `path`
    pub fn read_path(&mut self, path: &str) -> Result<Vec<u8>> {
        let target = self.resolve(path)?;
        if !target.inode.is_regular() {
            return Err(MinixError::NotAFile(format!("'{}'", path)));
        }
        self.read_file(&target.inode)
    }
}
