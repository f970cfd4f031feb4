//! Write-side capabilities: opening with flags, writing, renaming and truncation.

use crate::{File, Fs, FsError, OpenFlags};

/// Open a file with explicit flags and creation permissions.
pub trait FsOpenFile: Fs {
    /// Open `path` according to `flags`, creating it with `perm` when asked.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if the path does not exist and `create` is unset
    /// - [`ErrorKind::Exist`](crate::ErrorKind::Exist) if `create` and `exclusive` are set and the path exists
    fn open_file(&self, path: &str, flags: OpenFlags, perm: u32) -> Result<Box<dyn File>, FsError>;
}

/// Rename an entry.
pub trait FsRename: Fs {
    /// Move `old` to `new`, replacing `new` if it is an existing file.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if `old` does not exist
    fn rename(&self, old: &str, new: &str) -> Result<(), FsError>;
}

/// Change a file's size by path.
pub trait FsTruncate: Fs {
    /// Set the size of the named file, zero-filling any extension.
    fn truncate(&self, path: &str, size: u64) -> Result<(), FsError>;
}

/// Write through an open handle.
pub trait FileWrite: File {
    /// Write `buf` at the handle's position, returning the bytes written.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Permission`](crate::ErrorKind::Permission) if the handle was not opened for writing
    fn write(&mut self, buf: &[u8]) -> Result<usize, FsError>;
}

/// Change a file's size through an open handle.
pub trait FileTruncate: File {
    /// Set the size of the open file, zero-filling any extension.
    fn truncate(&mut self, size: u64) -> Result<(), FsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_traits_are_object_safe() {
        fn _open_file(_: &dyn FsOpenFile) {}
        fn _rename(_: &dyn FsRename) {}
        fn _truncate(_: &dyn FsTruncate) {}
        fn _write(_: &mut dyn FileWrite) {}
        fn _file_truncate(_: &mut dyn FileTruncate) {}
    }
}
