/// MINIX V1 file system support
pub mod directory;
pub mod inode;
pub mod partition;
pub mod path;
pub mod superblock;
pub mod zones;

pub use directory::DirEntry;
pub use inode::{Inode, InodeTable, ROOT_INODE};
pub use partition::{PartitionEntry, PartitionLocation};
pub use path::ResolvedInode;
pub use superblock::{is_minix_superblock, Superblock, MINIX_MAGIC};
pub use zones::ZoneLayout;

/// Get MINIX file system information
pub fn get_filesystem_info(superblock: &Superblock, partition_start: u64) -> String {
    let zone_size = superblock.zone_size();
    let fs_size_kb = superblock.zones as u64 * zone_size / 1024;

    format!(
        "MINIX V1 File System\n\
         - Partition Offset: {} bytes\n\
         - Block Size: {} bytes\n\
         - Zone Size: {} bytes\n\
         - Zones: {}\n\
         - File System Size: {} KB\n\
         - Inodes: {}\n\
         - Inode Bitmap Blocks: {}\n\
         - Zone Bitmap Blocks: {}\n\
         - First Data Zone: {}\n\
         - Max File Size: {} bytes\n\
         - Subversion: {}",
        partition_start,
        superblock.blocksize,
        zone_size,
        superblock.zones,
        fs_size_kb,
        superblock.ninodes,
        superblock.i_blocks,
        superblock.z_blocks,
        superblock.firstdata,
        superblock.max_file,
        superblock.subversion
    )
}
