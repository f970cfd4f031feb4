//! Symbolic and hard link capabilities.
//!
//! Link targets are path names relative to the filesystem root, like every
//! other name in this crate.

use crate::{Fs, FsError};

/// Create symbolic links.
pub trait FsSymlink: Fs {
    /// Create `link` as a symbolic link pointing at `target`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Exist`](crate::ErrorKind::Exist) if `link` already exists
    fn symlink(&self, target: &str, link: &str) -> Result<(), FsError>;
}

/// Create hard links.
pub trait FsHardLink: Fs {
    /// Create `new` as another name for the file `old`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if `old` does not exist
    /// - [`ErrorKind::Exist`](crate::ErrorKind::Exist) if `new` already exists
    fn hard_link(&self, old: &str, new: &str) -> Result<(), FsError>;
}

/// Read symbolic link targets.
pub trait FsReadLink: Fs {
    /// The target of the symbolic link `path`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Invalid`](crate::ErrorKind::Invalid) if `path` is not a symbolic link
    fn read_link(&self, path: &str) -> Result<String, FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_traits_are_object_safe() {
        fn _symlink(_: &dyn FsSymlink) {}
        fn _hard_link(_: &dyn FsHardLink) {}
        fn _read_link(_: &dyn FsReadLink) {}
    }
}
