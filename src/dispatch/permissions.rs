//! Permission and ownership dispatch: chmod, chown and lchown.
//!
//! `chmod` and `chown` fall back to the handle capability of an opened
//! file; `lchown` has no fallback since opening would follow the link.

use tracing::trace;

use super::{unsupported, with_file};
use crate::path::check_path;
use crate::{Fs, FsError};

/// Set the permission bits of `path`.
///
/// # Errors
///
/// - [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported) if neither the filesystem nor the
///   opened file can change permissions
pub fn chmod<F: Fs + ?Sized>(fsys: &F, path: &str, mode: u32) -> Result<(), FsError> {
    check_path("chmod", path)?;
    if let Some(fsys) = fsys.as_chmod() {
        return fsys.chmod(path, mode);
    }
    trace!(path, mode, "chmod through open handle");
    with_file(fsys.open(path)?, |file| match file.as_chmod() {
        Some(file) => file.chmod(mode),
        None => Err(unsupported("chmod", path)),
    })
}

/// Set the owner and group of `path`; `-1` keeps the current id.
///
/// # Errors
///
/// - [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported) if neither the filesystem nor the
///   opened file can change ownership
///
/// # Examples
///
/// ```rust
/// use anyfs_ops::{chown, MapFs, MapFile};
///
/// let fs = MapFs::new();
/// fs.insert("hello.txt", MapFile::file(b"hi".to_vec(), 0o666));
/// chown(&fs, "hello.txt", 42, -1).unwrap();
/// let file = fs.get("hello.txt").unwrap();
/// assert_eq!((file.uid, file.gid), (42, 0));
/// ```
pub fn chown<F: Fs + ?Sized>(fsys: &F, path: &str, uid: i64, gid: i64) -> Result<(), FsError> {
    check_path("chown", path)?;
    if let Some(fsys) = fsys.as_chown() {
        return fsys.chown(path, uid, gid);
    }
    trace!(path, uid, gid, "chown through open handle");
    with_file(fsys.open(path)?, |file| match file.as_chown() {
        Some(file) => file.chown(uid, gid),
        None => Err(unsupported("chown", path)),
    })
}

/// Like [`chown`], but a final symlink is changed rather than followed.
///
/// # Errors
///
/// - [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported) if the filesystem lacks [`FsLchown`](crate::FsLchown)
pub fn lchown<F: Fs + ?Sized>(fsys: &F, path: &str, uid: i64, gid: i64) -> Result<(), FsError> {
    check_path("lchown", path)?;
    match fsys.as_lchown() {
        Some(fsys) => fsys.lchown(path, uid, gid),
        None => Err(unsupported("lchown", path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, MapFile, MapFs};

    #[test]
    fn chmod_keeps_file_type() {
        let fs = MapFs::new();
        fs.insert("bin", MapFile::dir(0o755));
        chmod(&fs, "bin", 0o700).unwrap();
        let dir = fs.get("bin").unwrap();
        assert!(dir.mode.is_dir());
        assert_eq!(dir.mode.perm(), 0o700);
    }

    #[test]
    fn implicit_directories_cannot_change_owner() {
        let fs = MapFs::new();
        fs.insert("implied/file.txt", MapFile::file(Vec::new(), 0o644));
        let err = chown(&fs, "implied", 1, 1).unwrap_err();
        assert!(err.is(ErrorKind::Unsupported));
        assert_eq!(err.path(), "implied");
    }

    #[test]
    fn lchown_without_capability() {
        let fs = MapFs::new();
        fs.insert("link", MapFile::symlink("target"));
        let err = lchown(&fs, "link", 1, 1).unwrap_err();
        assert!(err.is(ErrorKind::Unsupported));
        assert_eq!(err.op(), "lchown");
    }
}
