//! Zone traversal
//!
//! Rebuilds a file's byte stream from its seven direct zones and its
//! single-indirect zone table. Zone address 0 is a hole and reads as zeros.
//! Double-indirect zones are not followed, so a file larger than
//! direct + single-indirect capacity comes back short.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek};

use super::inode::{Inode, DIRECT_ZONES};
use crate::error::Result;
use crate::fs::common::read_exact_at;

/// Size of one entry in an indirect zone table
pub const INDIRECT_ENTRY_SIZE: u64 = 4;

/// Where zones live: zone `n` starts at `partition_start + n * zone_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneLayout {
    pub partition_start: u64,
    pub zone_size: u64,
}

impl ZoneLayout {
    pub fn new(partition_start: u64, zone_size: u64) -> Self {
        Self {
            partition_start,
            zone_size,
        }
    }

    /// Absolute byte offset of a zone
    pub fn zone_offset(&self, zone: u32) -> u64 {
        self.partition_start + zone as u64 * self.zone_size
    }

    /// Zone addresses held by one indirect zone
    pub fn entries_per_indirect(&self) -> u64 {
        self.zone_size / INDIRECT_ENTRY_SIZE
    }

    /// Largest file size reachable through direct and single-indirect zones
    pub fn capacity(&self) -> u64 {
        (DIRECT_ZONES as u64 + self.entries_per_indirect()) * self.zone_size
    }
}

/// Owned output buffer filled zone by zone
struct ZoneStream<'a, R> {
    reader: &'a mut R,
    layout: ZoneLayout,
    buf: Vec<u8>,
    remaining: u64,
}

impl<'a, R: Read + Seek> ZoneStream<'a, R> {
    fn new(reader: &'a mut R, layout: ZoneLayout, total_size: u64) -> Self {
        Self {
            reader,
            layout,
            buf: Vec::with_capacity(total_size.min(layout.capacity()) as usize),
            remaining: total_size,
        }
    }

    fn next_chunk(&self) -> u64 {
        self.remaining.min(self.layout.zone_size)
    }

    /// Append the next chunk from `zone`, or zeros if it is a hole
    fn push_zone(&mut self, zone: u32) -> Result<()> {
        let chunk = self.next_chunk() as usize;
        let start = self.buf.len();
        self.buf.resize(start + chunk, 0);

        if zone != 0 {
            read_exact_at(&mut *self.reader, self.layout.zone_offset(zone), &mut self.buf[start..])?;
        }

        self.remaining -= chunk as u64;
        Ok(())
    }

    fn push_zeros(&mut self, length: u64) {
        let length = length.min(self.remaining);
        self.buf.resize(self.buf.len() + length as usize, 0);
        self.remaining -= length;
    }

    /// Table entries are addressed from the partition start like every other
    /// zone; legacy MINIX tools omitted that offset and misread partitioned images.
    fn read_indirect_entry(&mut self, table_zone: u32, index: u64) -> Result<u32> {
        let offset = self.layout.zone_offset(table_zone) + index * INDIRECT_ENTRY_SIZE;
        let mut raw = [0u8; INDIRECT_ENTRY_SIZE as usize];
        read_exact_at(&mut *self.reader, offset, &mut raw)?;
        Ok(Cursor::new(raw).read_u32::<LittleEndian>()?)
    }
}

/// Read exactly `total_size` bytes described by a direct zone list and an
/// indirect zone pointer.
///
/// Any I/O failure aborts the whole read; no partial buffer is returned.
pub fn read_zones<R: Read + Seek>(
    reader: &mut R,
    layout: ZoneLayout,
    direct: &[u32; DIRECT_ZONES],
    indirect: u32,
    total_size: u32,
) -> Result<Vec<u8>> {
    let mut stream = ZoneStream::new(reader, layout, total_size as u64);

    for &zone in direct {
        if stream.remaining == 0 {
            break;
        }
        stream.push_zone(zone)?;
    }

    if stream.remaining > 0 {
        let entries = layout.entries_per_indirect();

        if indirect == 0 {
            stream.push_zeros(entries * layout.zone_size);
        } else {
            tracing::debug!("Following indirect zone {} ({} entries)", indirect, entries);
            let mut index = 0;
            while index < entries && stream.remaining > 0 {
                let zone = stream.read_indirect_entry(indirect, index)?;
                stream.push_zone(zone)?;
                index += 1;
            }
        }
    }

    if stream.remaining > 0 {
        tracing::warn!(
            "File of {} bytes exceeds direct and single-indirect capacity ({} bytes); {} bytes not read",
            total_size,
            layout.capacity(),
            stream.remaining
        );
    }

    Ok(stream.buf)
}

/// Read the full content of an inode
pub fn read_inode_data<R: Read + Seek>(reader: &mut R, layout: ZoneLayout, inode: &Inode) -> Result<Vec<u8>> {
    read_zones(reader, layout, &inode.zones, inode.indirect, inode.size)
}
