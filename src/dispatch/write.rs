//! Write-side dispatch: open_file, write, write_file, rename and truncate.

use std::io;

use tracing::{debug, trace};

use super::{unsupported, unsupported_link, with_file};
use crate::path::{check_link_paths, check_path};
use crate::{File, Fs, FsError, OpenFlags};

/// Open a file with flags and creation permissions.
///
/// Without [`FsOpenFile`](crate::FsOpenFile), read-only flags fall back to
/// a plain [`Fs::open`].
///
/// # Errors
///
/// - [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported) if the flags ask for more than reading
///   and the filesystem lacks [`FsOpenFile`](crate::FsOpenFile)
pub fn open_file<F: Fs + ?Sized>(
    fsys: &F,
    path: &str,
    flags: OpenFlags,
    perm: u32,
) -> Result<Box<dyn File>, FsError> {
    check_path("open", path)?;
    if let Some(fsys) = fsys.as_open_file() {
        return fsys.open_file(path, flags, perm);
    }
    if flags.is_read_only() {
        return fsys.open(path);
    }
    Err(unsupported("open", path))
}

/// Write `buf` to an open handle, returning the bytes written.
///
/// # Errors
///
/// - [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported) if the handle lacks [`FileWrite`](crate::FileWrite)
pub fn write(file: &mut dyn File, buf: &[u8]) -> Result<usize, FsError> {
    if let Some(file) = file.as_write() {
        return file.write(buf);
    }
    // The handle only knows its name through stat; the error is still
    // Unsupported when that fails too.
    let name = match file.stat() {
        Ok(meta) => meta.name,
        Err(err) => {
            debug!(%err, "cannot name handle for unsupported write");
            String::new()
        }
    };
    Err(unsupported("write", &name))
}

/// Create or truncate `path` and write `data` to it.
///
/// # Examples
///
/// ```rust
/// use anyfs_ops::{read_file, write_file, MapFs};
///
/// let fs = MapFs::new();
/// write_file(&fs, "greeting.txt", b"hello", 0o644).unwrap();
/// assert_eq!(read_file(&fs, "greeting.txt").unwrap(), b"hello");
/// ```
pub fn write_file<F: Fs + ?Sized>(
    fsys: &F,
    path: &str,
    data: &[u8],
    perm: u32,
) -> Result<(), FsError> {
    let file = open_file(fsys, path, OpenFlags::WRITE, perm)?;
    with_file(file, |file| {
        let mut rest = data;
        while !rest.is_empty() {
            let n = write(file, rest)?;
            if n == 0 {
                return Err(FsError::from_io("write", path, io::ErrorKind::WriteZero.into()));
            }
            rest = &rest[n..];
        }
        Ok(())
    })
}

/// Rename `old` to `new`.
///
/// # Errors
///
/// - [`ErrorKind::Unsupported`](crate::ErrorKind::Unsupported) if the filesystem lacks [`FsRename`](crate::FsRename)
pub fn rename<F: Fs + ?Sized>(fsys: &F, old: &str, new: &str) -> Result<(), FsError> {
    check_link_paths("rename", old, new)?;
    match fsys.as_rename() {
        Some(fsys) => fsys.rename(old, new),
        None => Err(unsupported_link("rename", old, new)),
    }
}

/// Change the size of the named file.
///
/// Without [`FsTruncate`](crate::FsTruncate) the file is opened (for writing
/// when the filesystem supports flags) and truncated through its handle.
pub fn truncate<F: Fs + ?Sized>(fsys: &F, path: &str, size: u64) -> Result<(), FsError> {
    check_path("truncate", path)?;
    if let Some(fsys) = fsys.as_truncate() {
        return fsys.truncate(path, size);
    }

    trace!(path, size, "truncate through open handle");
    let file = match fsys.as_open_file() {
        Some(opener) => {
            let flags = OpenFlags {
                write: true,
                ..OpenFlags::default()
            };
            opener.open_file(path, flags, 0)?
        }
        None => fsys.open(path)?,
    };
    with_file(file, |file| match file.as_truncate() {
        Some(file) => file.truncate(size),
        None => Err(unsupported("truncate", path)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, MapFile, MapFs, Metadata};

    struct OpenOnly(MapFs);

    impl Fs for OpenOnly {
        fn open(&self, path: &str) -> Result<Box<dyn File>, FsError> {
            self.0.open(path)
        }
    }

    struct ReadOnly(Box<dyn File>);

    impl File for ReadOnly {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
            self.0.read(buf)
        }

        fn stat(&self) -> Result<Metadata, FsError> {
            self.0.stat()
        }

        fn close(self: Box<Self>) -> Result<(), FsError> {
            self.0.close()
        }
    }

    fn sample() -> MapFs {
        let fs = MapFs::new();
        fs.insert("notes.txt", MapFile::file(b"0123456789".to_vec(), 0o644));
        fs
    }

    #[test]
    fn open_file_falls_back_for_reads_only() {
        let fs = OpenOnly(sample());
        let file = open_file(&fs, "notes.txt", OpenFlags::READ, 0).unwrap();
        file.close().unwrap();

        let err = open_file(&fs, "notes.txt", OpenFlags::WRITE, 0o644).err().unwrap();
        assert!(err.is(ErrorKind::Unsupported));
        assert_eq!(err.op(), "open");
    }

    #[test]
    fn write_without_capability_names_file() {
        let fs = sample();
        let mut file = ReadOnly(fs.open("notes.txt").unwrap());
        let err = write(&mut file, b"x").unwrap_err();
        assert!(err.is(ErrorKind::Unsupported));
        assert_eq!(err.path(), "notes.txt");
    }

    struct Nameless;

    impl File for Nameless {
        fn read(&mut self, _buf: &mut [u8]) -> Result<usize, FsError> {
            Ok(0)
        }

        fn stat(&self) -> Result<Metadata, FsError> {
            Err(FsError::new("stat", "", ErrorKind::Permission))
        }

        fn close(self: Box<Self>) -> Result<(), FsError> {
            Ok(())
        }
    }

    #[test]
    fn write_reports_unsupported_when_stat_fails() {
        let err = write(&mut Nameless, b"x").unwrap_err();
        assert!(err.is(ErrorKind::Unsupported));
        assert_eq!(err.op(), "write");
        assert_eq!(err.path(), "");
    }

    #[test]
    fn write_file_truncates_existing() {
        let fs = sample();
        write_file(&fs, "notes.txt", b"short", 0o600).unwrap();
        let file = fs.get("notes.txt").unwrap();
        assert_eq!(file.data, b"short");
        assert_eq!(file.mode.perm(), 0o644);
    }

    #[test]
    fn rename_without_capability_is_link_error() {
        let fs = OpenOnly(sample());
        let err = rename(&fs, "notes.txt", "moved.txt").unwrap_err();
        assert!(err.is(ErrorKind::Unsupported));
        assert!(matches!(err, FsError::Link { op: "rename", .. }));
    }

    #[test]
    fn truncate_through_writable_handle() {
        let fs = sample();
        truncate(&fs, "notes.txt", 4).unwrap();
        assert_eq!(fs.get("notes.txt").unwrap().data, b"0123");
        truncate(&fs, "notes.txt", 6).unwrap();
        assert_eq!(fs.get("notes.txt").unwrap().data, b"0123\0\0");
    }
}
