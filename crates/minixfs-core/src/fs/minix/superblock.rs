//! MINIX V1 superblock decoding

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::io::{Cursor, Read, Seek};

use crate::error::{MinixError, Result};
use crate::fs::common::read_exact_at;

/// Superblock magic number
pub const MINIX_MAGIC: i16 = 19802;
/// The superblock sits right after the boot block
pub const SUPERBLOCK_OFFSET: u64 = 1024;
/// Packed size of the superblock record
pub const SUPERBLOCK_SIZE: usize = 31;

const MAGIC_OFFSET: usize = 24;
// Largest shift that keeps a 16-bit block size inside a 32-bit zone size
const MAX_LOG_ZONE_SIZE: i16 = 16;

/// Filesystem geometry as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Superblock {
    /// Number of inodes in the filesystem
    pub ninodes: u32,
    /// Blocks used by the inode bitmap
    pub i_blocks: i16,
    /// Blocks used by the zone bitmap
    pub z_blocks: i16,
    /// Number of the first data zone
    pub firstdata: u16,
    /// log2 of blocks per zone
    pub log_zone_size: i16,
    /// Maximum file size
    pub max_file: u32,
    /// Number of zones on disk
    pub zones: u32,
    pub magic: i16,
    /// Block size in bytes
    pub blocksize: u16,
    pub subversion: u8,
}

impl Superblock {
    /// Decode the packed record and validate it
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < SUPERBLOCK_SIZE {
            return Err(MinixError::Format(format!(
                "superblock needs {} bytes, got {}",
                SUPERBLOCK_SIZE,
                data.len()
            )));
        }

        let mut cursor = Cursor::new(data);

        let ninodes = cursor.read_u32::<LittleEndian>()?;
        let _pad1 = cursor.read_u16::<LittleEndian>()?;
        let i_blocks = cursor.read_i16::<LittleEndian>()?;
        let z_blocks = cursor.read_i16::<LittleEndian>()?;
        let firstdata = cursor.read_u16::<LittleEndian>()?;
        let log_zone_size = cursor.read_i16::<LittleEndian>()?;
        let _pad2 = cursor.read_i16::<LittleEndian>()?;
        let max_file = cursor.read_u32::<LittleEndian>()?;
        let zones = cursor.read_u32::<LittleEndian>()?;
        let magic = cursor.read_i16::<LittleEndian>()?;
        let _pad3 = cursor.read_i16::<LittleEndian>()?;
        let blocksize = cursor.read_u16::<LittleEndian>()?;
        let subversion = cursor.read_u8()?;

        let superblock = Superblock {
            ninodes,
            i_blocks,
            z_blocks,
            firstdata,
            log_zone_size,
            max_file,
            zones,
            magic,
            blocksize,
            subversion,
        };
        superblock.validate()?;

        Ok(superblock)
    }

    fn validate(&self) -> Result<()> {
        if self.magic != MINIX_MAGIC {
            return Err(MinixError::Format(format!(
                "bad superblock magic 0x{:04X}, not a MINIX filesystem",
                self.magic as u16
            )));
        }
        if self.blocksize == 0 {
            return Err(MinixError::Format("superblock block size is zero".to_string()));
        }
        if !(0..MAX_LOG_ZONE_SIZE).contains(&self.log_zone_size) {
            return Err(MinixError::Format(format!(
                "unsupported log zone size {}",
                self.log_zone_size
            )));
        }
        if self.i_blocks < 0 || self.z_blocks < 0 {
            return Err(MinixError::Format(format!(
                "negative bitmap size (inode bitmap {}, zone bitmap {})",
                self.i_blocks, self.z_blocks
            )));
        }
        Ok(())
    }

    /// Zone size in bytes: `blocksize << log_zone_size`
    pub fn zone_size(&self) -> u64 {
        (self.blocksize as u64) << self.log_zone_size
    }

    /// Offset of the inode table relative to the partition start.
    ///
    /// Skips the boot block, the superblock block and both bitmaps.
    pub fn inode_table_offset(&self) -> u64 {
        let blocks = 2 + self.i_blocks as u64 + self.z_blocks as u64;
        blocks * self.blocksize as u64
    }
}

/// Check if data starting at a superblock carries the MINIX magic
pub fn is_minix_superblock(data: &[u8]) -> bool {
    if data.len() < MAGIC_OFFSET + 2 {
        return false;
    }

    let mut cursor = Cursor::new(&data[MAGIC_OFFSET..]);
    matches!(cursor.read_i16::<LittleEndian>(), Ok(MINIX_MAGIC))
}

/// Read the superblock of the filesystem starting at `partition_start`
pub fn read<R: Read + Seek>(reader: &mut R, partition_start: u64) -> Result<Superblock> {
    let offset = partition_start + SUPERBLOCK_OFFSET;
    tracing::debug!("Reading superblock at byte {}", offset);

    let mut raw = [0u8; SUPERBLOCK_SIZE];
    read_exact_at(reader, offset, &mut raw)?;
    let superblock = Superblock::parse(&raw)?;

    tracing::debug!(
        "Superblock: {} inodes, block size {}, zone size {}",
        superblock.ninodes,
        superblock.blocksize,
        superblock.zone_size()
    );

    Ok(superblock)
}
