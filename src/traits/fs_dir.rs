//! Directory creation and removal capabilities.

use crate::{Fs, FsError};

/// Create a single directory.
///
/// This is also the primitive the [`mkdir_all`](crate::mkdir_all) fallback
/// is built from.
pub trait FsMkdir: Fs {
    /// Create the directory `path` with permission bits `perm`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Exist`](crate::ErrorKind::Exist) if the path already exists
    /// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if the parent does not exist
    fn mkdir(&self, path: &str, perm: u32) -> Result<(), FsError>;
}

/// Create a directory together with any missing parents.
pub trait FsMkdirAll: Fs {
    /// Create `path` and its missing ancestors with permission bits `perm`.
    ///
    /// Succeeds without change if `path` is already a directory.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotADirectory`](crate::ErrorKind::NotADirectory) if `path` or an ancestor is a file
    fn mkdir_all(&self, path: &str, perm: u32) -> Result<(), FsError>;
}

/// Remove a file or an empty directory.
pub trait FsRemove: Fs {
    /// Remove the named file or empty directory.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if the path does not exist
    /// - [`ErrorKind::DirectoryNotEmpty`](crate::ErrorKind::DirectoryNotEmpty) if it is a non-empty directory
    fn remove(&self, path: &str) -> Result<(), FsError>;
}

/// Remove a path and everything below it.
pub trait FsRemoveAll: Fs {
    /// Remove `path` and, if it is a directory, all of its contents.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if the path does not exist
    fn remove_all(&self, path: &str) -> Result<(), FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_traits_are_object_safe() {
        fn _mkdir(_: &dyn FsMkdir) {}
        fn _mkdir_all(_: &dyn FsMkdirAll) {}
        fn _remove(_: &dyn FsRemove) {}
        fn _remove_all(_: &dyn FsRemoveAll) {}
    }
}
