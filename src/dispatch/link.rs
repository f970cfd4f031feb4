//! Link dispatch: symlink, hard_link and read_link.

use super::{unsupported, unsupported_link};
use crate::path::{check_link_paths, check_path};
use crate::{Fs, FsError};

/// Create `link` as a symbolic link to `target`.
pub fn symlink<F: Fs + ?Sized>(fsys: &F, target: &str, link: &str) -> Result<(), FsError> {
    check_link_paths("symlink", target, link)?;
    match fsys.as_symlink() {
        Some(fsys) => fsys.symlink(target, link),
        None => Err(unsupported_link("symlink", target, link)),
    }
}

/// Create `new` as a hard link to `old`.
pub fn hard_link<F: Fs + ?Sized>(fsys: &F, old: &str, new: &str) -> Result<(), FsError> {
    check_link_paths("link", old, new)?;
    match fsys.as_hard_link() {
        Some(fsys) => fsys.hard_link(old, new),
        None => Err(unsupported_link("link", old, new)),
    }
}

/// Target of the symbolic link `path`.
pub fn read_link<F: Fs + ?Sized>(fsys: &F, path: &str) -> Result<String, FsError> {
    check_path("read_link", path)?;
    match fsys.as_read_link() {
        Some(fsys) => fsys.read_link(path),
        None => Err(unsupported("read_link", path)),
    }
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
    fn links_need_capabilities() {
        let fs = OpenOnly(MapFs::new());
        let err = symlink(&fs, "target", "link").unwrap_err();
        assert!(matches!(err, FsError::Link { op: "symlink", .. }));
        assert!(err.is(ErrorKind::Unsupported));

        let err = hard_link(&fs, "old", "new").unwrap_err();
        assert!(matches!(err, FsError::Link { op: "link", .. }));

        let err = read_link(&fs, "link").unwrap_err();
        assert!(err.is(ErrorKind::Unsupported));
        assert_eq!(err.path(), "link");
    }

    #[test]
    fn symlink_round_trips_target() {
        let fs = MapFs::new();
        fs.insert("data.txt", MapFile::file(b"d".to_vec(), 0o644));
        symlink(&fs, "data.txt", "alias").unwrap();
        assert_eq!(read_link(&fs, "alias").unwrap(), "data.txt");
        assert_eq!(crate::read_file(&fs, "alias").unwrap(), b"d");
    }

    #[test]
    fn link_paths_are_validated_first() {
        let fs = MapFs::new();
        let err = hard_link(&fs, "a", "b/").unwrap_err();
        assert!(err.is(ErrorKind::Invalid));
        assert!(matches!(err, FsError::Link { ref new, .. } if new == "b/"));
    }
}
