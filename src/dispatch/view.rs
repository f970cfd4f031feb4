//! Identity and view dispatch: same_file and sub.

use std::sync::Arc;

use crate::path::{check_path, ROOT};
use crate::{Fs, FsError, Metadata, SubFs};

/// Reports whether `a` and `b` describe the same file.
///
/// Filesystems without [`FsSameFile`](crate::FsSameFile) never report a match.
pub fn same_file<F: Fs + ?Sized>(fsys: &F, a: &Metadata, b: &Metadata) -> bool {
    match fsys.as_same_file() {
        Some(fsys) => fsys.same_file(a, b),
        None => false,
    }
}

/// A filesystem rooted at `dir` within `fsys`.
///
/// `"."` returns `fsys` itself. Filesystems with [`FsSub`](crate::FsSub)
/// produce their own view; every other filesystem is wrapped in a
/// [`SubFs`].
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use anyfs_ops::{read_file, sub, Fs, MapFs, MapFile};
///
/// let fs = MapFs::new();
/// fs.insert("site/index.html", MapFile::file(b"<h1>hi</h1>".to_vec(), 0o644));
///
/// let site = sub(Arc::new(fs), "site").unwrap();
/// assert_eq!(read_file(&site, "index.html").unwrap(), b"<h1>hi</h1>");
///
/// let err = read_file(&site, "missing.html").unwrap_err();
/// assert_eq!(err.path(), "missing.html");
/// ```
pub fn sub(fsys: Arc<dyn Fs>, dir: &str) -> Result<Arc<dyn Fs>, FsError> {
    check_path("sub", dir)?;
    if dir == ROOT {
        return Ok(fsys);
    }
    if let Some(native) = fsys.as_sub() {
        return native.sub(dir);
    }
    Ok(Arc::new(SubFs::new(fsys, dir)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, File, MapFile, MapFs};

    struct OpenOnly(MapFs);

    impl Fs for OpenOnly {
        fn open(&self, path: &str) -> Result<Box<dyn File>, FsError> {
            self.0.open(path)
        }
    }

    #[test]
    fn same_file_defaults_to_false() {
        let fs = OpenOnly(MapFs::new());
        let meta = crate::stat(&fs, ".").unwrap();
        assert!(!same_file(&fs, &meta, &meta));
    }

    #[test]
    fn same_file_sees_hard_links() {
        let fs = MapFs::new();
        fs.insert("a", MapFile::file(Vec::new(), 0o644));
        fs.insert("b", MapFile::file(Vec::new(), 0o644));
        crate::hard_link(&fs, "a", "c").unwrap();

        let a = crate::stat(&fs, "a").unwrap();
        let b = crate::stat(&fs, "b").unwrap();
        let c = crate::stat(&fs, "c").unwrap();
        assert!(same_file(&fs, &a, &c));
        assert!(!same_file(&fs, &a, &b));
    }

    #[test]
    fn sub_validates_dir() {
        let fs: Arc<dyn Fs> = Arc::new(MapFs::new());
        let err = sub(Arc::clone(&fs), "../up").err().unwrap();
        assert!(err.is(ErrorKind::Invalid));
        assert_eq!(err.op(), "sub");
    }

    #[test]
    fn sub_of_sub_is_flattened() {
        let fs = MapFs::new();
        fs.insert("a/b/c.txt", MapFile::file(b"c".to_vec(), 0o644));
        let a = sub(Arc::new(fs), "a").unwrap();
        let b = sub(a, "b").unwrap();
        assert_eq!(crate::read_file(&b, "c.txt").unwrap(), b"c");
        assert_eq!(crate::stat(&b, "x").unwrap_err().path(), "x");
    }
}
