//! Permission and ownership capabilities.
//!
//! Ownership ids are signed: `-1` leaves the corresponding id unchanged.

use crate::{File, Fs, FsError};

/// Change permission bits by path.
pub trait FsChmod: Fs {
    /// Set the permission bits of `path` to `mode & 0o777`.
    fn chmod(&self, path: &str, mode: u32) -> Result<(), FsError>;
}

/// Change permission bits through an open handle.
pub trait FileChmod: File {
    /// Set the permission bits of the open file to `mode & 0o777`.
    fn chmod(&mut self, mode: u32) -> Result<(), FsError>;
}

/// Change ownership by path, following a final symlink.
pub trait FsChown: Fs {
    /// Set the owner and group of `path`; `-1` keeps the current value.
    fn chown(&self, path: &str, uid: i64, gid: i64) -> Result<(), FsError>;
}

/// Change ownership through an open handle.
pub trait FileChown: File {
    /// Set the owner and group of the open file; `-1` keeps the current value.
    fn chown(&mut self, uid: i64, gid: i64) -> Result<(), FsError>;
}

/// Change ownership of a symlink itself.
pub trait FsLchown: Fs {
    /// Like [`FsChown::chown`], but a final symlink is changed rather than followed.
    fn lchown(&self, path: &str, uid: i64, gid: i64) -> Result<(), FsError>;
}
