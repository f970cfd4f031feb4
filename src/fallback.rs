//! Synthesized multi-step operations, built only from dispatch calls.
//!
//! Each recursive step goes back through the public dispatch functions, so a
//! wrapper that gains a capability halfway down the tree is still used.

use tracing::trace;

use crate::path::{join, split, ROOT};
use crate::{ErrorKind, Fs, FsError, Metadata};

/// Create `path` and any missing parents using single-directory creation.
pub(crate) fn mkdir_all<F: Fs + ?Sized>(fsys: &F, path: &str, perm: u32) -> Result<(), FsError> {
    match crate::stat(fsys, path) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => return Err(FsError::new("mkdir_all", path, ErrorKind::NotADirectory)),
        Err(_) => {}
    }

    let (parent, _) = split(path);
    if parent != ROOT {
        crate::mkdir_all(fsys, parent, perm)?;
    }

    match crate::mkdir(fsys, path, perm) {
        Ok(()) => {
            trace!(path, perm, "created directory");
            Ok(())
        }
        // Lost a race with another creator, which is fine as long as the
        // winner made a directory.
        Err(err) => match crate::stat(fsys, path) {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(err),
        },
    }
}

/// Remove `path` and everything below it using single-entry removal.
pub(crate) fn remove_all<F: Fs + ?Sized>(fsys: &F, path: &str) -> Result<(), FsError> {
    let meta = lstat_or_stat(fsys, path)?;
    if !meta.is_dir() {
        return crate::remove(fsys, path);
    }

    for entry in crate::read_dir(fsys, path)? {
        let child = join(path, &entry.name);
        if entry.is_dir() {
            crate::remove_all(fsys, &child)?;
        } else {
            crate::remove(fsys, &child)?;
            trace!(path = child.as_str(), "removed");
        }
    }
    crate::remove(fsys, path)?;
    trace!(path, "removed directory");
    Ok(())
}

/// A symlink to a directory must be removed, not descended into.
pub(crate) fn lstat_or_stat<F: Fs + ?Sized>(fsys: &F, path: &str) -> Result<Metadata, FsError> {
    match crate::lstat(fsys, path) {
        Err(err) if err.is(ErrorKind::Unsupported) => crate::stat(fsys, path),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{File, FsMkdir, FsReadDir, FsRemove, FsStat, MapFile, MapFs};

    /// Exposes only the primitives the fallbacks are built from.
    struct Primitives(MapFs);

    impl Fs for Primitives {
        fn open(&self, path: &str) -> Result<Box<dyn File>, FsError> {
            self.0.open(path)
        }
        fn as_stat(&self) -> Option<&dyn FsStat> {
            Some(&self.0)
        }
        fn as_read_dir(&self) -> Option<&dyn FsReadDir> {
            Some(&self.0)
        }
        fn as_mkdir(&self) -> Option<&dyn FsMkdir> {
            Some(&self.0)
        }
        fn as_remove(&self) -> Option<&dyn FsRemove> {
            Some(&self.0)
        }
    }

    #[test]
    fn mkdir_all_creates_each_level() {
        let fs = Primitives(MapFs::new());
        mkdir_all(&fs, "a/b/c", 0o750).unwrap();
        assert_eq!(fs.0.paths(), ["a", "a/b", "a/b/c"]);
        for dir in ["a", "a/b", "a/b/c"] {
            assert_eq!(fs.0.get(dir).unwrap().mode.perm(), 0o750);
        }
    }

    #[test]
    fn mkdir_all_keeps_existing_permissions() {
        let fs = Primitives(MapFs::new());
        fs.0.insert("a", MapFile::dir(0o700));
        mkdir_all(&fs, "a/b", 0o755).unwrap();
        mkdir_all(&fs, "a/b", 0o711).unwrap();
        assert_eq!(fs.0.get("a").unwrap().mode.perm(), 0o700);
        assert_eq!(fs.0.get("a/b").unwrap().mode.perm(), 0o755);
    }

    #[test]
    fn mkdir_all_through_a_file_fails() {
        let fs = Primitives(MapFs::new());
        fs.0.insert("a", MapFile::file(Vec::new(), 0o644));
        let err = mkdir_all(&fs, "a", 0o755).unwrap_err();
        assert!(err.is(ErrorKind::NotADirectory));
        assert_eq!(err.op(), "mkdir_all");

        let err = mkdir_all(&fs, "a/b", 0o755).unwrap_err();
        assert!(err.is(ErrorKind::NotADirectory));
    }

    #[test]
    fn remove_all_empties_tree_and_root() {
        let fs = Primitives(MapFs::new());
        fs.0.insert("t/a.txt", MapFile::file(b"a".to_vec(), 0o644));
        fs.0.insert("t/x/y/z.txt", MapFile::file(b"z".to_vec(), 0o644));
        fs.0.insert("other.txt", MapFile::file(b"o".to_vec(), 0o644));

        remove_all(&fs, "t").unwrap();
        assert_eq!(fs.0.paths(), ["other.txt"]);
        assert!(crate::stat(&fs, "t").unwrap_err().is(ErrorKind::NotExist));
    }

    #[test]
    fn remove_all_of_missing_path_fails() {
        let fs = Primitives(MapFs::new());
        let err = remove_all(&fs, "ghost").unwrap_err();
        assert!(err.is(ErrorKind::NotExist));
        assert_eq!(err.path(), "ghost");
    }

    #[test]
    fn remove_all_does_not_follow_symlinks() {
        let fs = MapFs::new();
        fs.insert("keep/data.txt", MapFile::file(b"d".to_vec(), 0o644));
        fs.insert("t/link", MapFile::symlink("keep"));

        remove_all(&fs, "t").unwrap();
        assert_eq!(fs.paths(), ["keep/data.txt"]);
    }
}
