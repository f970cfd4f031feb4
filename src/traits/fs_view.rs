//! File identity and sub-view capabilities.

use std::sync::Arc;

use crate::{Fs, FsError, Metadata};

/// Decide whether two metadata records describe the same underlying file.
pub trait FsSameFile: Fs {
    /// Returns `true` if `a` and `b` were produced for the same file.
    fn same_file(&self, a: &Metadata, b: &Metadata) -> bool;
}

/// Produce a filesystem rooted at one of this filesystem's directories.
pub trait FsSub: Fs {
    /// A view of the tree rooted at `dir`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Invalid`](crate::ErrorKind::Invalid) if `dir` is not a valid path
    fn sub(&self, dir: &str) -> Result<Arc<dyn Fs>, FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_traits_are_object_safe() {
        fn _same_file(_: &dyn FsSameFile) {}
        fn _sub(_: &dyn FsSub) {}
    }
}
