//! Path resolution from the root directory down to a target inode

use std::io::{Read, Seek};

use super::directory;
use super::inode::{Inode, InodeTable, ROOT_INODE};
use super::zones::ZoneLayout;
use crate::error::{MinixError, Result};

/// An inode borrowed from the table together with its number
#[derive(Debug, Clone, Copy)]
pub struct ResolvedInode<'t> {
    pub number: u32,
    pub inode: &'t Inode,
}

impl<'t> ResolvedInode<'t> {
    pub fn root(table: &'t InodeTable) -> Result<Self> {
        Ok(ResolvedInode {
            number: ROOT_INODE,
            inode: table.root()?,
        })
    }
}

/// Split a slash-separated path into components, dropping empty ones
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|c| !c.is_empty()).collect()
}

/// Walk `components` starting from `start`.
///
/// Every inode that still has a component to look up must be a directory.
/// The first live entry with a matching name wins; a missing name aborts
/// the whole resolution.
pub fn resolve<'t, R, S>(
    reader: &mut R,
    layout: ZoneLayout,
    table: &'t InodeTable,
    start: ResolvedInode<'t>,
    components: &[S],
) -> Result<ResolvedInode<'t>>
where
    R: Read + Seek,
    S: AsRef<str>,
{
    let mut current = start;

    for component in components {
        let component = component.as_ref();

        if !current.inode.is_directory() {
            return Err(MinixError::NotADirectory(format!(
                "inode {} cannot contain '{}'",
                current.number, component
            )));
        }

        let entries = directory::list(reader, layout, current.inode)?;
        let entry = entries
            .iter()
            .find(|e| !e.is_deleted() && e.matches(component))
            .ok_or_else(|| MinixError::NotFound(format!("'{}' in inode {}", component, current.number)))?;

        let inode = table.get(entry.inode).ok_or_else(|| {
            MinixError::Format(format!(
                "entry '{}' points at inode {} outside a table of {}",
                component,
                entry.inode,
                table.len()
            ))
        })?;

        tracing::debug!("Resolved '{}' to inode {}", component, entry.inode);
        current = ResolvedInode {
            number: entry.inode,
            inode,
        };
    }

    Ok(current)
}
