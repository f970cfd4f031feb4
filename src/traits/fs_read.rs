//! Read-side capabilities.

use std::io::SeekFrom;

use crate::{DirEntry, File, Fs, FsError, Metadata};

/// Metadata lookup by path, following a final symlink.
///
/// Without this capability, [`stat`](crate::stat) opens the file and asks
/// the handle.
pub trait FsStat: Fs {
    /// Metadata of the named file.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if the path does not exist
    fn stat(&self, path: &str) -> Result<Metadata, FsError>;
}

/// Metadata lookup by path that describes a final symlink itself.
///
/// There is no fallback: a filesystem without symlinks has nothing to
/// report that `stat` would not.
pub trait FsLstat: Fs {
    /// Metadata of the named entry, not following a final symlink.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if the path does not exist
    fn lstat(&self, path: &str) -> Result<Metadata, FsError>;
}

/// Directory listing by path.
pub trait FsReadDir: Fs {
    /// Entries of the named directory, sorted by name.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if the path does not exist
    /// - [`ErrorKind::NotADirectory`](crate::ErrorKind::NotADirectory) if it is not a directory
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, FsError>;
}

/// Whole-file reads by path.
pub trait FsReadFile: Fs {
    /// Entire contents of the named file.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if the path does not exist
    fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError>;
}

/// Native pattern expansion.
pub trait FsGlob: Fs {
    /// Names of all files matching `pattern`, in lexical order per directory.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Invalid`](crate::ErrorKind::Invalid) if the pattern is malformed
    fn glob(&self, pattern: &str) -> Result<Vec<String>, FsError>;
}

/// Listing through an open directory handle.
pub trait FileReadDir: File {
    /// Remaining entries of the directory, in the order the filesystem
    /// produces them.
    fn read_dir(&mut self) -> Result<Vec<DirEntry>, FsError>;
}

/// Repositioning an open handle.
pub trait FileSeek: File {
    /// Move the handle's position, returning the new offset from the start.
    ///
    /// Seeking past the end is allowed; a later write zero-fills the gap.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Invalid`](crate::ErrorKind::Invalid) if the position would be negative or overflow
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, FsError>;
}

/// Reads at an explicit offset, leaving the handle's position alone.
pub trait FileReadAt: File {
    /// Read into `buf` starting at `offset`, returning the bytes read.
    /// Zero means `offset` is at or past the end.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, FsError>;
}
