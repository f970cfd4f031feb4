//! Access and modification time capabilities.

use std::time::SystemTime;

use crate::{File, Fs, FsError};

/// Change access and modification times by path.
pub trait FsChtimes: Fs {
    /// Set the access time and modification time of `path`.
    fn chtimes(&self, path: &str, atime: SystemTime, mtime: SystemTime) -> Result<(), FsError>;
}

/// Change access and modification times through an open handle.
pub trait FileChtimes: File {
    /// Set the access time and modification time of the open file.
    fn chtimes(&mut self, atime: SystemTime, mtime: SystemTime) -> Result<(), FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_traits_are_object_safe() {
        fn _chtimes(_: &dyn FsChtimes) {}
        fn _file_chtimes(_: &mut dyn FileChtimes) {}
    }
}
