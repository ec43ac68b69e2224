//! In-memory MINIX image builder shared by the integration tests
#![allow(dead_code)]

use std::io::{Cursor, Read, Seek, SeekFrom};

pub const BLOCK: usize = 1024;
pub const NINODES: u32 = 32;
pub const MAGIC: i16 = 19802;

pub const DIR_MODE: u16 = 0o040755;
pub const FILE_MODE: u16 = 0o100644;
pub const LINK_MODE: u16 = 0o120777;

/// A filesystem laid out at `base` inside a byte vector.
///
/// Block size 1024, one zone per block, one inode bitmap block and one
/// zone bitmap block; the inode table starts at block 4.
pub struct FsImage {
    pub bytes: Vec<u8>,
    pub base: usize,
}

impl FsImage {
    pub fn new(zones: usize) -> Self {
        Self::at(0, zones)
    }

    pub fn at(base: usize, zones: usize) -> Self {
        let mut image = FsImage {
            bytes: vec![0u8; base + zones * BLOCK],
            base,
        };
        image.put(BLOCK, &superblock(NINODES, 1, 1, 0, BLOCK as u16, zones as u32));
        image
    }

    pub fn put(&mut self, offset: usize, data: &[u8]) {
        let at = self.base + offset;
        self.bytes[at..at + data.len()].copy_from_slice(data);
    }

    pub fn put_zone(&mut self, zone: u32, data: &[u8]) {
        self.put(zone as usize * BLOCK, data);
    }

    pub fn put_inode(&mut self, number: u32, raw: &[u8; 64]) {
        self.put(4 * BLOCK + (number as usize - 1) * 64, raw);
    }

    pub fn put_dir(&mut self, number: u32, zone: u32, entries: &[(u32, &str)]) {
        let mut data = Vec::new();
        for &(inode, name) in entries {
            data.extend_from_slice(&dirent(inode, name.as_bytes()));
        }
        self.put_zone(zone, &data);
        self.put_inode(number, &inode(DIR_MODE, data.len() as u32, [zone, 0, 0, 0, 0, 0, 0], 0));
    }
}

pub fn superblock(ninodes: u32, i_blocks: i16, z_blocks: i16, log_zone: i16, blocksize: u16, zones: u32) -> [u8; 32] {
    let mut raw = [0u8; 32];
    raw[0..4].copy_from_slice(&ninodes.to_le_bytes());
    raw[6..8].copy_from_slice(&i_blocks.to_le_bytes());
    raw[8..10].copy_from_slice(&z_blocks.to_le_bytes());
    raw[10..12].copy_from_slice(&6u16.to_le_bytes());
    raw[12..14].copy_from_slice(&log_zone.to_le_bytes());
    raw[16..20].copy_from_slice(&0x7FFF_FFFFu32.to_le_bytes());
    raw[20..24].copy_from_slice(&zones.to_le_bytes());
    raw[24..26].copy_from_slice(&MAGIC.to_le_bytes());
    raw[28..30].copy_from_slice(&blocksize.to_le_bytes());
    raw
}

pub fn inode(mode: u16, size: u32, zones: [u32; 7], indirect: u32) -> [u8; 64] {
    let mut raw = [0u8; 64];
    raw[0..2].copy_from_slice(&mode.to_le_bytes());
    raw[2..4].copy_from_slice(&1u16.to_le_bytes());
    raw[8..12].copy_from_slice(&size.to_le_bytes());
    for (i, zone) in zones.iter().enumerate() {
        raw[24 + i * 4..28 + i * 4].copy_from_slice(&zone.to_le_bytes());
    }
    raw[52..56].copy_from_slice(&indirect.to_le_bytes());
    raw
}

pub fn dirent(inode: u32, name: &[u8]) -> [u8; 64] {
    let mut raw = [0u8; 64];
    raw[0..4].copy_from_slice(&inode.to_le_bytes());
    raw[4..4 + name.len()].copy_from_slice(name);
    raw
}

pub const HELLO: &[u8] = b"hello, minix\n";

/// Pattern byte for position `i` of the large file
pub fn big_byte(i: usize) -> u8 {
    (i % 251) as u8
}

/// Size of the large file: all 7 direct zones, a hole in the indirect table
/// and a partial last zone
pub const BIG_SIZE: usize = 7 * BLOCK + 3 * BLOCK + 100;

/// Populate a sample tree:
///
/// ```text
/// /            inode 1
///   hello.txt  inode 2
///   docs/      inode 3
///     readme   inode 5
///     big      inode 6 (direct + indirect, with a hole)
///   (deleted)  "gone"
///   sparse     inode 4 (no zones at all)
///   link       inode 7 (symlink)
/// ```
pub fn populate(image: &mut FsImage) {
    image.put_dir(
        1,
        6,
        &[(1, "."), (1, ".."), (2, "hello.txt"), (3, "docs"), (0, "gone"), (4, "sparse"), (7, "link")],
    );

    image.put_zone(7, HELLO);
    image.put_inode(2, &inode(FILE_MODE, HELLO.len() as u32, [7, 0, 0, 0, 0, 0, 0], 0));

    image.put_dir(3, 8, &[(3, "."), (1, ".."), (5, "readme"), (6, "big")]);

    image.put_zone(9, b"read me first");
    image.put_inode(5, &inode(FILE_MODE, 13, [9, 0, 0, 0, 0, 0, 0], 0));

    image.put_inode(4, &inode(FILE_MODE, 5000, [0; 7], 0));

    image.put_zone(10, b"hello.txt");
    image.put_inode(7, &inode(LINK_MODE, 9, [10, 0, 0, 0, 0, 0, 0], 0));

    // Large file: direct zones 20..27, indirect table in zone 30 -> [31, 0, 32, 33]
    let content: Vec<u8> = (0..BIG_SIZE).map(big_byte).collect();
    let direct = [20, 21, 22, 23, 24, 25, 26];
    for (i, &zone) in direct.iter().enumerate() {
        image.put_zone(zone, &content[i * BLOCK..(i + 1) * BLOCK]);
    }
    let mut table = Vec::new();
    for zone in [31u32, 0, 32, 33] {
        table.extend_from_slice(&zone.to_le_bytes());
    }
    image.put_zone(30, &table);
    image.put_zone(31, &content[7 * BLOCK..8 * BLOCK]);
    image.put_zone(32, &content[9 * BLOCK..10 * BLOCK]);
    image.put_zone(33, &content[10 * BLOCK..]);
    image.put_inode(6, &inode(FILE_MODE, BIG_SIZE as u32, direct, 30));
}

/// Expected content of the large file, with the hole zeroed
pub fn big_expected() -> Vec<u8> {
    (0..BIG_SIZE)
        .map(|i| if (8 * BLOCK..9 * BLOCK).contains(&i) { 0 } else { big_byte(i) })
        .collect()
}

pub fn sample_image() -> Vec<u8> {
    let mut image = FsImage::new(64);
    populate(&mut image);
    image.bytes
}

/// Write a partition table (with boot signature) into the sector at `table_base`
pub fn partition_table(bytes: &mut [u8], table_base: usize, slot: usize, part_type: u8, first_sector: u32) {
    let at = table_base + 0x1BE + slot * 16;
    bytes[at + 4] = part_type;
    bytes[at + 8..at + 12].copy_from_slice(&first_sector.to_le_bytes());
    bytes[at + 12..at + 16].copy_from_slice(&128u32.to_le_bytes());
    bytes[table_base + 510] = 0x55;
    bytes[table_base + 511] = 0xAA;
}

/// Records every seek so tests can check which offsets were touched
pub struct SeekLog {
    inner: Cursor<Vec<u8>>,
    pub seeks: Vec<u64>,
}

impl SeekLog {
    pub fn new(bytes: Vec<u8>) -> Self {
        SeekLog {
            inner: Cursor::new(bytes),
            seeks: Vec::new(),
        }
    }
}

impl Read for SeekLog {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for SeekLog {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        let at = self.inner.seek(pos)?;
        self.seeks.push(at);
        Ok(at)
    }
}
