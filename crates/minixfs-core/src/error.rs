//! Error taxonomy for MINIX image reads
//!
//! Every error is terminal for the operation that raised it: nothing is
//! retried and no partially built buffer is handed back to the caller.

use thiserror::Error;

/// Errors raised while reading a MINIX image
#[derive(Debug, Error)]
pub enum MinixError {
    /// Seek or read failure at the storage boundary (including short reads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bad boot signature, wrong partition type, bad superblock magic or geometry
    #[error("Invalid format: {0}")]
    Format(String),

    /// No partition slot or path component matched
    #[error("Not found: {0}")]
    NotFound(String),

    /// A directory was expected but the inode is something else
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// A regular file was expected but the inode is a directory or special file
    #[error("Not a regular file: {0}")]
    NotAFile(String),
}

impl MinixError {
    /// True for both directions of the directory/file type mismatch
    pub fn is_type_error(&self) -> bool {
        matches!(self, MinixError::NotADirectory(_) | MinixError::NotAFile(_))
    }
}

pub type Result<T> = std::result::Result<T, MinixError>;
