/// Common types and utilities for image access
use memmap2::{Mmap, MmapOptions};
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// Size of a disk sector; partition tables address the image in sectors
pub const SECTOR_SIZE: u64 = 512;

/// A memory-mapped image file exposed through `Read + Seek`
pub struct BlockDevice {
    _file: File,
    cursor: Cursor<Mmap>,
    size: u64,
}

impl BlockDevice {
    /// Open a block device or image file
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path.as_ref())?;
        let size = file.metadata()?.len();

        let mmap = unsafe { MmapOptions::new().map(&file)? };

        Ok(BlockDevice {
            _file: file,
            cursor: Cursor::new(mmap),
            size,
        })
    }

    /// Get the size of the device in bytes
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Read for BlockDevice {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for BlockDevice {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

/// Seek to an absolute offset and fill `buf` completely.
///
/// Callers never rely on the position left behind by a previous read.
pub fn read_exact_at<R: Read + Seek>(reader: &mut R, offset: u64, buf: &mut [u8]) -> io::Result<()> {
    reader.seek(SeekFrom::Start(offset))?;
    reader.read_exact(buf)
}

/// Read `length` bytes starting at an absolute offset.
///
/// The range is checked against the image size before the buffer is allocated.
pub fn read_bytes_at<R: Read + Seek>(reader: &mut R, offset: u64, length: usize) -> io::Result<Vec<u8>> {
    let image_size = reader.seek(SeekFrom::End(0))?;
    let fits = offset
        .checked_add(length as u64)
        .is_some_and(|end| end <= image_size);
    if !fits {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "read of {} bytes at byte {} runs past the end of a {} byte image",
                length, offset, image_size
            ),
        ));
    }

    let mut buf = vec![0u8; length];
    read_exact_at(reader, offset, &mut buf)?;
    Ok(buf)
}
