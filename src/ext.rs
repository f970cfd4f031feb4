//! # Extension Traits
//!
//! Convenience queries built on the dispatch functions.
//!
//! ## Overview
//!
//! [`FsExt`] has default methods and a blanket implementation, so every
//! [`Fs`] (including `dyn Fs` and `Arc<dyn Fs>`) gets them for free. Each
//! goes through [`stat`](crate::stat) or [`lstat`](crate::lstat) and thus
//! works with or without native capabilities.
//!
//! ## Available Methods
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`exists`](FsExt::exists) | Check if anything exists at a path |
//! | [`is_file`](FsExt::is_file) | Check if path is a regular file |
//! | [`is_dir`](FsExt::is_dir) | Check if path is a directory |
//! | [`is_symlink`](FsExt::is_symlink) | Check if path is a symbolic link |
//! | [`file_size`](FsExt::file_size) | Size of a file in bytes |

use crate::{ErrorKind, Fs, FsError, Metadata};

fn stat_if_exists<F: Fs + ?Sized>(fsys: &F, path: &str) -> Result<Option<Metadata>, FsError> {
    match crate::stat(fsys, path) {
        Ok(meta) => Ok(Some(meta)),
        Err(err) if err.is(ErrorKind::NotExist) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Extension methods for any filesystem.
///
/// # Example
///
/// ```rust
/// use anyfs_ops::{FsExt, MapFs, MapFile};
///
/// let fs = MapFs::new();
/// fs.insert("config/app.toml", MapFile::file(b"debug = true".to_vec(), 0o644));
///
/// assert!(fs.is_dir("config").unwrap());
/// assert!(fs.is_file("config/app.toml").unwrap());
/// assert!(!fs.exists("config/other.toml").unwrap());
/// assert_eq!(fs.file_size("config/app.toml").unwrap(), 12);
/// ```
pub trait FsExt: Fs {
    /// Check whether anything exists at `path`.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    /// Returns `Err` for other failures, including invalid paths.
    fn exists(&self, path: &str) -> Result<bool, FsError> {
        Ok(stat_if_exists(self, path)?.is_some())
    }

    /// Check if the path points to a regular file.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    fn is_file(&self, path: &str) -> Result<bool, FsError> {
        Ok(stat_if_exists(self, path)?.is_some_and(|meta| meta.is_file()))
    }

    /// Check if the path points to a directory.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    fn is_dir(&self, path: &str) -> Result<bool, FsError> {
        Ok(stat_if_exists(self, path)?.is_some_and(|meta| meta.is_dir()))
    }

    /// Check if the path is a symbolic link.
    ///
    /// Filesystems without [`FsLstat`](crate::FsLstat) have no way to tell
    /// and always answer `Ok(false)`.
    fn is_symlink(&self, path: &str) -> Result<bool, FsError> {
        match crate::lstat(self, path) {
            Ok(meta) => Ok(meta.is_symlink()),
            Err(err) if err.is(ErrorKind::NotExist) || err.is(ErrorKind::Unsupported) => {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Get the size of a file in bytes.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`] if the path doesn't exist
    fn file_size(&self, path: &str) -> Result<u64, FsError> {
        Ok(crate::stat(self, path)?.size)
    }
}

impl<B: Fs + ?Sized> FsExt for B {}
