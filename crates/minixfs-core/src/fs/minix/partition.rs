//! Partition table lookup
//!
//! A MINIX image may carry a PC-style partition table in its first sector,
//! and a MINIX partition may carry a second table (subpartitions) in its own
//! first sector. Entry start sectors are absolute within the image.

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;
use std::io::{Cursor, Read, Seek};

use crate::error::{MinixError, Result};
use crate::fs::common::{read_exact_at, SECTOR_SIZE};

/// Offset of the partition table inside its sector
pub const PARTITION_TABLE_OFFSET: u64 = 0x1BE;
/// Size of one partition table entry
pub const PARTITION_ENTRY_SIZE: usize = 16;
/// Number of slots in a partition table
pub const PARTITION_SLOTS: u32 = 4;
/// Partition type code for MINIX
pub const MINIX_PARTITION_TYPE: u8 = 0x81;
/// Boot signature found at bytes 510/511 of a sector holding a table
pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];

const SIGNATURE_OFFSET: u64 = 510;

/// One 16-byte partition table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartitionEntry {
    pub bootind: u8,
    pub start_head: u8,
    pub start_sec: u8,
    pub start_cyl: u8,
    pub part_type: u8,
    pub end_head: u8,
    pub end_sec: u8,
    pub end_cyl: u8,
    /// First sector of the partition, absolute within the image
    pub first_sector: u32,
    /// Partition length in sectors
    pub size: u32,
}

impl PartitionEntry {
    /// Decode an entry from its raw 16 bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PARTITION_ENTRY_SIZE {
            return Err(MinixError::Format(format!(
                "partition entry needs {} bytes, got {}",
                PARTITION_ENTRY_SIZE,
                data.len()
            )));
        }

        let mut cursor = Cursor::new(data);

        Ok(PartitionEntry {
            bootind: cursor.read_u8()?,
            start_head: cursor.read_u8()?,
            start_sec: cursor.read_u8()?,
            start_cyl: cursor.read_u8()?,
            part_type: cursor.read_u8()?,
            end_head: cursor.read_u8()?,
            end_sec: cursor.read_u8()?,
            end_cyl: cursor.read_u8()?,
            first_sector: cursor.read_u32::<LittleEndian>()?,
            size: cursor.read_u32::<LittleEndian>()?,
        })
    }

    pub fn is_minix(&self) -> bool {
        self.part_type == MINIX_PARTITION_TYPE
    }

    /// Byte offset of the partition within the image
    pub fn start_offset(&self) -> u64 {
        self.first_sector as u64 * SECTOR_SIZE
    }
}

/// Where the filesystem lives inside the image, and the entries that led there
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartitionLocation {
    /// Absolute byte offset of the filesystem
    pub start: u64,
    pub primary: Option<PartitionEntry>,
    pub subpartition: Option<PartitionEntry>,
}

/// Resolve the byte offset of the selected (sub)partition.
///
/// With no primary index the whole image is the filesystem. A subpartition
/// index is looked up in the table nested inside the partition selected so far.
pub fn resolve<R: Read + Seek>(
    reader: &mut R,
    primary: Option<u32>,
    subpartition: Option<u32>,
) -> Result<PartitionLocation> {
    let mut location = PartitionLocation::default();

    if let Some(index) = primary {
        let entry = read_entry(reader, location.start, index)?;
        location.start = entry.start_offset();
        location.primary = Some(entry);
        tracing::debug!("Primary partition {} starts at byte {}", index, location.start);
    }

    if let Some(index) = subpartition {
        let entry = read_entry(reader, location.start, index)?;
        location.start = entry.start_offset();
        location.subpartition = Some(entry);
        tracing::debug!("Subpartition {} starts at byte {}", index, location.start);
    }

    Ok(location)
}

/// Validate the table sector at `table_base` and return its MINIX entry `index`
fn read_entry<R: Read + Seek>(reader: &mut R, table_base: u64, index: u32) -> Result<PartitionEntry> {
    if index >= PARTITION_SLOTS {
        return Err(MinixError::NotFound(format!(
            "partition {} (tables have {} slots)",
            index, PARTITION_SLOTS
        )));
    }

    let mut signature = [0u8; 2];
    read_exact_at(reader, table_base + SIGNATURE_OFFSET, &mut signature)?;
    if signature != BOOT_SIGNATURE {
        return Err(MinixError::Format(format!(
            "invalid partition table signature 0x{:02X}{:02X} at byte {}",
            signature[0],
            signature[1],
            table_base + SIGNATURE_OFFSET
        )));
    }

    let entry_offset = table_base + PARTITION_TABLE_OFFSET + (PARTITION_ENTRY_SIZE as u64 * index as u64);
    let mut raw = [0u8; PARTITION_ENTRY_SIZE];
    read_exact_at(reader, entry_offset, &mut raw)?;
    let entry = PartitionEntry::parse(&raw)?;

    if !entry.is_minix() {
        tracing::debug!("Rejected partition entry {:?}", entry);
        return Err(MinixError::Format(format!(
            "partition {} has type 0x{:02X}, not a MINIX partition (0x{:02X})",
            index, entry.part_type, MINIX_PARTITION_TYPE
        )));
    }

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_bytes(part_type: u8, first_sector: u32, size: u32) -> [u8; 16] {
        let mut raw = [0u8; 16];
        raw[0] = 0x80;
        raw[4] = part_type;
        raw[8..12].copy_from_slice(&first_sector.to_le_bytes());
        raw[12..16].copy_from_slice(&size.to_le_bytes());
        raw
    }

    fn table(base: usize, image: &mut [u8], slot: usize, entry: [u8; 16]) {
        let at = base + PARTITION_TABLE_OFFSET as usize + slot * PARTITION_ENTRY_SIZE;
        image[at..at + 16].copy_from_slice(&entry);
        image[base + 510] = 0x55;
        image[base + 511] = 0xAA;
    }

    #[test]
    fn test_parse_entry() {
        let entry = PartitionEntry::parse(&entry_bytes(0x81, 16, 200)).unwrap();
        assert_eq!(entry.bootind, 0x80);
        assert!(entry.is_minix());
        assert_eq!(entry.first_sector, 16);
        assert_eq!(entry.size, 200);
        assert_eq!(entry.start_offset(), 16 * 512);
    }

    #[test]
    fn test_no_partition_means_whole_image() {
        let mut cursor = Cursor::new(vec![0u8; 16]);
        let location = resolve(&mut cursor, None, None).unwrap();
        assert_eq!(location.start, 0);
        assert!(location.primary.is_none());
    }

    #[test]
    fn test_primary_and_nested_subpartition() {
        let mut image = vec![0u8; 8192];
        table(0, &mut image, 2, entry_bytes(0x81, 4, 12));
        table(4 * 512, &mut image, 1, entry_bytes(0x81, 8, 4));

        let mut cursor = Cursor::new(image);
        let location = resolve(&mut cursor, Some(2), Some(1)).unwrap();
        assert_eq!(location.start, 8 * 512);
        assert_eq!(location.primary.unwrap().first_sector, 4);
        assert_eq!(location.subpartition.unwrap().first_sector, 8);
    }

    #[test]
    fn test_wrong_type_is_format_error() {
        let mut image = vec![0u8; 1024];
        table(0, &mut image, 0, entry_bytes(0x83, 2, 2));

        let err = resolve(&mut Cursor::new(image), Some(0), None).unwrap_err();
        assert!(matches!(err, MinixError::Format(_)));
    }

    #[test]
    fn test_missing_signature_is_format_error() {
        let mut image = vec![0u8; 1024];
        table(0, &mut image, 0, entry_bytes(0x81, 2, 2));
        image[511] = 0x00;

        let err = resolve(&mut Cursor::new(image), Some(0), None).unwrap_err();
        assert!(matches!(err, MinixError::Format(_)));
    }

    #[test]
    fn test_slot_out_of_range_is_not_found() {
        let err = resolve(&mut Cursor::new(vec![0u8; 1024]), Some(4), None).unwrap_err();
        assert!(matches!(err, MinixError::NotFound(_)));
    }

    #[test]
    fn test_truncated_image_is_io_error() {
        let err = resolve(&mut Cursor::new(vec![0u8; 100]), Some(0), None).unwrap_err();
        assert!(matches!(err, MinixError::Io(_)));
    }
}
