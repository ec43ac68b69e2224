//! Text rendering for listings and verbose metadata dumps

use chrono::{DateTime, Utc};

use crate::fs::minix::inode::{DIRECT_ZONES, S_IFDIR, S_IFMT};
use crate::fs::minix::{Inode, PartitionEntry, Superblock};
use crate::session::{Listing, ListingEntry};

const PERMISSION_BITS: [(u16, char); 9] = [
    (0o400, 'r'),
    (0o200, 'w'),
    (0o100, 'x'),
    (0o040, 'r'),
    (0o020, 'w'),
    (0o010, 'x'),
    (0o004, 'r'),
    (0o002, 'w'),
    (0o001, 'x'),
];

/// `ls -l` style mode string, e.g. `drwxr-xr-x`
pub fn mode_string(mode: u16) -> String {
    let mut out = String::with_capacity(10);
    out.push(if mode & S_IFMT == S_IFDIR { 'd' } else { '-' });
    for (mask, c) in PERMISSION_BITS {
        out.push(if mode & mask == mask { c } else { '-' });
    }
    out
}

/// ctime(3)-style timestamp, e.g. `Tue Nov 14 22:13:20 2023`
pub fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%a %b %e %H:%M:%S %Y").to_string())
        .unwrap_or_else(|| "invalid time".to_string())
}

fn entry_line(entry: &ListingEntry) -> String {
    format!("{}{:>8} {}", mode_string(entry.mode), entry.size, entry.name)
}

/// Render a listing the way `minls` prints it
pub fn format_listing(listing: &Listing) -> String {
    match listing {
        Listing::Directory { path, entries } => {
            let header = if path.is_empty() { "/" } else { path.as_str() };
            let mut out = format!("{}:\n", header);
            for entry in entries {
                out.push_str(&entry_line(entry));
                out.push('\n');
            }
            out
        }
        Listing::File { path, entry } => {
            format!("{}{:>10} {}\n", mode_string(entry.mode), entry.size, path)
        }
    }
}

pub fn describe_partition(entry: &PartitionEntry) -> String {
    format!(
        "Partition Contents:\n\
         bootind      0x{:x}\n\
         start_head   {}\n\
         start_sec    {}\n\
         start_cyl    {}\n\
         type         0x{:x}\n\
         end_head     {}\n\
         end_sec      {}\n\
         end_cyl      {}\n\
         lFirst       {}\n\
         size         {}\n",
        entry.bootind,
        entry.start_head,
        entry.start_sec,
        entry.start_cyl,
        entry.part_type,
        entry.end_head,
        entry.end_sec,
        entry.end_cyl,
        entry.first_sector,
        entry.size
    )
}

pub fn describe_superblock(sb: &Superblock) -> String {
    format!(
        "Superblock Contents:\n\
         Stored Fields:\n  \
         ninodes        {}\n  \
         i_blocks       {}\n  \
         z_blocks       {}\n  \
         firstdata      {}\n  \
         log_zone_size  {} (zone size: {})\n  \
         max_file       {}\n  \
         magic          0x{:04x}\n  \
         zones          {}\n  \
         blocksize      {}\n  \
         subversion     {}\n",
        sb.ninodes,
        sb.i_blocks,
        sb.z_blocks,
        sb.firstdata,
        sb.log_zone_size,
        sb.zone_size(),
        sb.max_file,
        sb.magic as u16,
        sb.zones,
        sb.blocksize,
        sb.subversion
    )
}

pub fn describe_inode(inode: &Inode) -> String {
    let mut out = format!(
        "File inode:\n  \
         mode       0x{:04x} ({})\n  \
         links      {}\n  \
         uid        {}\n  \
         gid        {}\n  \
         size       {}\n  \
         atime      {} --- {}\n  \
         mtime      {} --- {}\n  \
         ctime      {} --- {}\n\n\
         Direct zones:\n",
        inode.mode,
        mode_string(inode.mode),
        inode.links,
        inode.uid,
        inode.gid,
        inode.size,
        inode.atime,
        format_time(inode.accessed()),
        inode.mtime,
        format_time(inode.modified()),
        inode.ctime,
        format_time(inode.changed())
    );
    for i in 0..DIRECT_ZONES {
        out.push_str(&format!("  zone[{}]   = {:>5}\n", i, inode.zones[i]));
    }
    out.push_str(&format!("  indirect   {:>6}\n", inode.indirect));
    out.push_str(&format!("  double     {:>6}\n", inode.double_indirect));
    out
}
