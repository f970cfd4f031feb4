//! Directory dispatch: mkdir, mkdir_all, remove and remove_all.

use tracing::trace;

use super::unsupported;
use crate::fallback;
use crate::path::check_path;
use crate::{Fs, FsError};

/// Create a single directory.
///
/// # Errors
///
/// - [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported) if the filesystem lacks [`FsMkdir`](crate::FsMkdir)
pub fn mkdir<F: Fs + ?Sized>(fsys: &F, path: &str, perm: u32) -> Result<(), FsError> {
    check_path("mkdir", path)?;
    match fsys.as_mkdir() {
        Some(fsys) => fsys.mkdir(path, perm),
        None => Err(unsupported("mkdir", path)),
    }
}

/// Create a directory and any missing parents.
///
/// Trailing `/.` elements are dropped first, so `a/b/.` names `a/b`.
/// Without a native [`FsMkdirAll`](crate::FsMkdirAll), parents are created
/// one [`mkdir`] at a time, and an existing directory (including one
/// created concurrently) counts as success.
///
/// # Errors
///
/// - [`ErrorKind::NotADirectory`](crate::ErrorKind::NotADirectory) if the path or an ancestor is a file
/// - [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported) if the filesystem can create neither trees nor single directories,
///   reported before the path is looked up
///
/// # Examples
///
/// ```rust
/// use anyfs_ops::{mkdir_all, stat, MapFs};
///
/// let fs = MapFs::new();
/// mkdir_all(&fs, "a/b/c", 0o755).unwrap();
/// assert!(stat(&fs, "a/b").unwrap().is_dir());
///
/// // Already there: still fine.
/// mkdir_all(&fs, "a/b/c/.", 0o755).unwrap();
/// ```
pub fn mkdir_all<F: Fs + ?Sized>(fsys: &F, path: &str, perm: u32) -> Result<(), FsError> {
    let path = trim_dot_elements(path);
    check_path("mkdir_all", path)?;
    if let Some(fsys) = fsys.as_mkdir_all() {
        return fsys.mkdir_all(path, perm);
    }
    if fsys.as_mkdir().is_none() {
        return Err(unsupported("mkdir_all", path));
    }
    trace!(path, "mkdir_all through single mkdir calls");
    fallback::mkdir_all(fsys, path, perm)
}

/// Remove a file or an empty directory.
pub fn remove<F: Fs + ?Sized>(fsys: &F, path: &str) -> Result<(), FsError> {
    check_path("remove", path)?;
    match fsys.as_remove() {
        Some(fsys) => fsys.remove(path),
        None => Err(unsupported("remove", path)),
    }
}

/// Remove a path and everything it contains.
///
/// Without a native [`FsRemoveAll`](crate::FsRemoveAll), the tree is walked
/// with [`read_dir`](crate::read_dir) and removed bottom-up with [`remove`],
/// stopping at the first failure.
///
/// # Errors
///
/// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if the path does not exist
/// - [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported) if the filesystem cannot remove entries,
///   reported before the path is looked up
pub fn remove_all<F: Fs + ?Sized>(fsys: &F, path: &str) -> Result<(), FsError> {
    check_path("remove_all", path)?;
    if let Some(fsys) = fsys.as_remove_all() {
        return fsys.remove_all(path);
    }
    if fsys.as_remove().is_none() {
        return Err(unsupported("remove_all", path));
    }
    trace!(path, "remove_all through recursive remove");
    fallback::remove_all(fsys, path)
}

/// Drop trailing `/.` elements: `a/b/./.` becomes `a/b`.
fn trim_dot_elements(mut path: &str) -> &str {
    while let Some(rest) = path.strip_suffix("/.") {
        path = rest;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_dots() {
        assert_eq!(trim_dot_elements("foo/bar/baz/."), "foo/bar/baz");
        assert_eq!(trim_dot_elements("a/./."), "a");
        assert_eq!(trim_dot_elements("."), ".");
        assert_eq!(trim_dot_elements("a/b"), "a/b");
        assert_eq!(trim_dot_elements("a/./b"), "a/./b");
    }
}
