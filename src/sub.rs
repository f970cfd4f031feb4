//! # Sub-views
//!
//! [`SubFs`] exposes one directory of a parent filesystem as a filesystem of
//! its own. Every name is validated, joined onto the view's root and passed
//! to the parent through the dispatch functions, so the parent's own
//! fallbacks still apply. Paths in returned errors are shortened back into
//! the view's namespace whenever they lie under its root.
//!
//! ```text
//! caller ──"a/b"──▶ SubFs("site") ──"site/a/b"──▶ parent
//! caller ◀─"a/b"─── shorten ◀──────"site/a/b"─── error
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use crate::path::{check_link_paths, check_path, join, shorten, ROOT};
use crate::{
    DirEntry, File, Fs, FsChmod, FsChown, FsChtimes, FsError, FsGlob, FsHardLink, FsLchown,
    FsLstat, FsMkdir, FsMkdirAll, FsOpenFile, FsReadDir, FsReadFile, FsReadLink, FsRemove,
    FsRemoveAll, FsRename, FsSameFile, FsStat, FsSub, FsSymlink, FsTruncate, Metadata, OpenFlags,
};

/// A filesystem rooted at a directory of a parent filesystem.
///
/// Create one with [`sub`](crate::sub), [`SubFs::new`] or
/// [`SubLayer`](crate::SubLayer). Calling [`sub`](crate::sub) on a
/// `SubFs` yields a single view of the original parent, not a view of a
/// view.
#[derive(Clone)]
pub struct SubFs {
    parent: Arc<dyn Fs>,
    dir: String,
}

impl SubFs {
    /// View the tree under `dir` of `parent`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Invalid`](crate::ErrorKind::Invalid) if `dir` is not a valid path
    pub fn new(parent: Arc<dyn Fs>, dir: &str) -> Result<Self, FsError> {
        check_path("sub", dir)?;
        Ok(Self {
            parent,
            dir: dir.to_string(),
        })
    }

    /// `dir` must already have passed [`check_path`].
    pub(crate) fn from_valid(parent: Arc<dyn Fs>, dir: String) -> Self {
        Self { parent, dir }
    }

    /// The view's root, as a path in the parent.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    /// The parent filesystem.
    pub fn parent(&self) -> &Arc<dyn Fs> {
        &self.parent
    }

    fn full_name(&self, op: &'static str, name: &str) -> Result<String, FsError> {
        check_path(op, name)?;
        Ok(join(&self.dir, name))
    }

    fn short_name(&self, name: String) -> String {
        match shorten(&self.dir, &name) {
            Some(short) => short.to_string(),
            None => name,
        }
    }

    fn fix_err(&self, err: FsError) -> FsError {
        err.map_paths(|path| self.short_name(path))
    }

    /// Run `action` on the parent with `name` joined onto the root.
    fn on_parent<T>(
        &self,
        op: &'static str,
        name: &str,
        action: impl FnOnce(&Arc<dyn Fs>, &str) -> Result<T, FsError>,
    ) -> Result<T, FsError> {
        let full = self.full_name(op, name)?;
        action(&self.parent, &full).map_err(|err| self.fix_err(err))
    }

    fn on_parent_link(
        &self,
        op: &'static str,
        old: &str,
        new: &str,
        action: impl FnOnce(&Arc<dyn Fs>, &str, &str) -> Result<(), FsError>,
    ) -> Result<(), FsError> {
        check_link_paths(op, old, new)?;
        let (old, new) = (join(&self.dir, old), join(&self.dir, new));
        action(&self.parent, &old, &new).map_err(|err| self.fix_err(err))
    }
}

impl fmt::Debug for SubFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubFs").field("dir", &self.dir).finish_non_exhaustive()
    }
}

impl Fs for SubFs {
    fn open(&self, path: &str) -> Result<Box<dyn File>, FsError> {
        self.on_parent("open", path, |fsys, full| fsys.open(full))
    }

    fn as_stat(&self) -> Option<&dyn FsStat> {
        Some(self)
    }

    fn as_lstat(&self) -> Option<&dyn FsLstat> {
        Some(self)
    }

    fn as_read_dir(&self) -> Option<&dyn FsReadDir> {
        Some(self)
    }

    fn as_read_file(&self) -> Option<&dyn FsReadFile> {
        Some(self)
    }

    fn as_glob(&self) -> Option<&dyn FsGlob> {
        Some(self)
    }

    fn as_open_file(&self) -> Option<&dyn FsOpenFile> {
        Some(self)
    }

    fn as_mkdir(&self) -> Option<&dyn FsMkdir> {
        Some(self)
    }

    fn as_mkdir_all(&self) -> Option<&dyn FsMkdirAll> {
        Some(self)
    }

    fn as_remove(&self) -> Option<&dyn FsRemove> {
        Some(self)
    }

    fn as_remove_all(&self) -> Option<&dyn FsRemoveAll> {
        Some(self)
    }

    fn as_rename(&self) -> Option<&dyn FsRename> {
        Some(self)
    }

    fn as_symlink(&self) -> Option<&dyn FsSymlink> {
        Some(self)
    }

    fn as_hard_link(&self) -> Option<&dyn FsHardLink> {
        Some(self)
    }

    fn as_read_link(&self) -> Option<&dyn FsReadLink> {
        Some(self)
    }

    fn as_truncate(&self) -> Option<&dyn FsTruncate> {
        Some(self)
    }

    fn as_chmod(&self) -> Option<&dyn FsChmod> {
        Some(self)
    }

    fn as_chown(&self) -> Option<&dyn FsChown> {
        Some(self)
    }

    fn as_lchown(&self) -> Option<&dyn FsLchown> {
        Some(self)
    }

    fn as_chtimes(&self) -> Option<&dyn FsChtimes> {
        Some(self)
    }

    fn as_same_file(&self) -> Option<&dyn FsSameFile> {
        Some(self)
    }

    fn as_sub(&self) -> Option<&dyn FsSub> {
        Some(self)
    }
}

impl FsStat for SubFs {
    fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        self.on_parent("stat", path, crate::stat)
    }
}

impl FsLstat for SubFs {
    fn lstat(&self, path: &str) -> Result<Metadata, FsError> {
        self.on_parent("lstat", path, crate::lstat)
    }
}

impl FsReadDir for SubFs {
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        self.on_parent("read_dir", path, crate::read_dir)
    }
}

impl FsReadFile for SubFs {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError> {
        self.on_parent("read_file", path, crate::read_file)
    }
}

impl FsGlob for SubFs {
    fn glob(&self, pattern: &str) -> Result<Vec<String>, FsError> {
        crate::path_match(pattern, "")
            .map_err(|_| FsError::new("glob", pattern, crate::ErrorKind::Invalid))?;
        if pattern == ROOT {
            return Ok(vec![ROOT.to_string()]);
        }

        let full = join(&self.dir, pattern);
        let found = crate::glob(&self.parent, &full).map_err(|err| self.fix_err(err))?;
        found
            .into_iter()
            .map(|name| match shorten(&self.dir, &name) {
                Some(short) => Ok(short.to_string()),
                None => Err(FsError::OutsideRoot {
                    op: "glob",
                    path: name,
                    root: self.dir.clone(),
                }),
            })
            .collect()
    }
}

impl FsOpenFile for SubFs {
    fn open_file(&self, path: &str, flags: OpenFlags, perm: u32) -> Result<Box<dyn File>, FsError> {
        self.on_parent("open", path, |fsys, full| {
            crate::open_file(fsys, full, flags, perm)
        })
    }
}

impl FsMkdir for SubFs {
    fn mkdir(&self, path: &str, perm: u32) -> Result<(), FsError> {
        self.on_parent("mkdir", path, |fsys, full| crate::mkdir(fsys, full, perm))
    }
}

impl FsMkdirAll for SubFs {
    fn mkdir_all(&self, path: &str, perm: u32) -> Result<(), FsError> {
        self.on_parent("mkdir_all", path, |fsys, full| {
            crate::mkdir_all(fsys, full, perm)
        })
    }
}

impl FsRemove for SubFs {
    fn remove(&self, path: &str) -> Result<(), FsError> {
        self.on_parent("remove", path, crate::remove)
    }
}

impl FsRemoveAll for SubFs {
    fn remove_all(&self, path: &str) -> Result<(), FsError> {
        self.on_parent("remove_all", path, crate::remove_all)
    }
}

impl FsRename for SubFs {
    fn rename(&self, old: &str, new: &str) -> Result<(), FsError> {
        self.on_parent_link("rename", old, new, crate::rename)
    }
}

impl FsSymlink for SubFs {
    fn symlink(&self, target: &str, link: &str) -> Result<(), FsError> {
        self.on_parent_link("symlink", target, link, crate::symlink)
    }
}

impl FsHardLink for SubFs {
    fn hard_link(&self, old: &str, new: &str) -> Result<(), FsError> {
        self.on_parent_link("link", old, new, crate::hard_link)
    }
}

impl FsReadLink for SubFs {
    fn read_link(&self, path: &str) -> Result<String, FsError> {
        let target = self.on_parent("read_link", path, crate::read_link)?;
        Ok(self.short_name(target))
    }
}

impl FsTruncate for SubFs {
    fn truncate(&self, path: &str, size: u64) -> Result<(), FsError> {
        self.on_parent("truncate", path, |fsys, full| {
            crate::truncate(fsys, full, size)
        })
    }
}

impl FsChmod for SubFs {
    fn chmod(&self, path: &str, mode: u32) -> Result<(), FsError> {
        self.on_parent("chmod", path, |fsys, full| crate::chmod(fsys, full, mode))
    }
}

impl FsChown for SubFs {
    fn chown(&self, path: &str, uid: i64, gid: i64) -> Result<(), FsError> {
        self.on_parent("chown", path, |fsys, full| {
            crate::chown(fsys, full, uid, gid)
        })
    }
}

impl FsLchown for SubFs {
    fn lchown(&self, path: &str, uid: i64, gid: i64) -> Result<(), FsError> {
        self.on_parent("lchown", path, |fsys, full| {
            crate::lchown(fsys, full, uid, gid)
        })
    }
}

impl FsChtimes for SubFs {
    fn chtimes(&self, path: &str, atime: SystemTime, mtime: SystemTime) -> Result<(), FsError> {
        self.on_parent("chtimes", path, |fsys, full| {
            crate::chtimes(fsys, full, atime, mtime)
        })
    }
}

impl FsSameFile for SubFs {
    fn same_file(&self, a: &Metadata, b: &Metadata) -> bool {
        crate::same_file(&self.parent, a, b)
    }
}

impl FsSub for SubFs {
    fn sub(&self, dir: &str) -> Result<Arc<dyn Fs>, FsError> {
        check_path("sub", dir)?;
        let dir = join(&self.dir, dir);
        Ok(Arc::new(SubFs::from_valid(Arc::clone(&self.parent), dir)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, MapFile, MapFs};

    fn site() -> Arc<dyn Fs> {
        let fs = MapFs::new();
        fs.insert("site/index.html", MapFile::file(b"home".to_vec(), 0o644));
        fs.insert("site/css/main.css", MapFile::file(b"body{}".to_vec(), 0o644));
        fs.insert("secret.txt", MapFile::file(b"nope".to_vec(), 0o600));
        Arc::new(fs)
    }

    #[test]
    fn new_rejects_invalid_dir() {
        let err = SubFs::new(site(), "/site").unwrap_err();
        assert!(err.is(ErrorKind::Invalid));
        assert_eq!(err.op(), "sub");
    }

    #[test]
    fn reads_are_joined_onto_root() {
        let view = SubFs::new(site(), "site").unwrap();
        assert_eq!(crate::read_file(&view, "index.html").unwrap(), b"home");
        assert_eq!(crate::read_file(&view, "css/main.css").unwrap(), b"body{}");
    }

    #[test]
    fn escaping_names_are_rejected() {
        let view = SubFs::new(site(), "site").unwrap();
        let err = crate::read_file(&view, "../secret.txt").unwrap_err();
        assert!(err.is(ErrorKind::Invalid));
        assert_eq!(err.path(), "../secret.txt");
    }

    #[test]
    fn error_paths_are_shortened() {
        let view = SubFs::new(site(), "site").unwrap();
        let err = crate::stat(&view, "missing.html").unwrap_err();
        assert!(err.is(ErrorKind::NotExist));
        assert_eq!(err.path(), "missing.html");
    }

    #[test]
    fn link_error_paths_are_shortened() {
        let view = SubFs::new(site(), "site").unwrap();
        let err = crate::rename(&view, "gone.html", "index2.html").unwrap_err();
        match err {
            FsError::Link { old, new, .. } => {
                assert_eq!(old, "gone.html");
                assert_eq!(new, "index2.html");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn glob_results_are_shortened() {
        let view = SubFs::new(site(), "site").unwrap();
        assert_eq!(crate::glob(&view, "*.html").unwrap(), ["index.html"]);
        assert_eq!(crate::glob(&view, "*/*.css").unwrap(), ["css/main.css"]);
        assert_eq!(crate::glob(&view, ".").unwrap(), ["."]);
        assert!(crate::glob(&view, "[").unwrap_err().is(ErrorKind::Invalid));
    }

    /// Answers with names from outside whatever directory it is asked about.
    struct Stray;

    impl Fs for Stray {
        fn open(&self, path: &str) -> Result<Box<dyn File>, FsError> {
            Err(FsError::new("open", path, ErrorKind::NotExist))
        }

        fn as_stat(&self) -> Option<&dyn FsStat> {
            Some(self)
        }

        fn as_glob(&self) -> Option<&dyn FsGlob> {
            Some(self)
        }
    }

    impl FsStat for Stray {
        fn stat(&self, _path: &str) -> Result<Metadata, FsError> {
            Err(FsError::new("stat", "elsewhere/config", ErrorKind::Permission))
        }
    }

    impl FsGlob for Stray {
        fn glob(&self, _pattern: &str) -> Result<Vec<String>, FsError> {
            Ok(vec!["site/ok.txt".to_string(), "elsewhere/x".to_string()])
        }
    }

    #[test]
    fn glob_result_outside_root_is_an_error() {
        let view = SubFs::new(Arc::new(Stray), "site").unwrap();
        match crate::glob(&view, "*.txt").unwrap_err() {
            FsError::OutsideRoot { op, path, root } => {
                assert_eq!(op, "glob");
                assert_eq!(path, "elsewhere/x");
                assert_eq!(root, "site");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn foreign_error_paths_pass_through() {
        let view = SubFs::new(Arc::new(Stray), "site").unwrap();
        let err = crate::stat(&view, "config").unwrap_err();
        assert!(err.is(ErrorKind::Permission));
        assert_eq!(err.path(), "elsewhere/config");
    }

    #[test]
    fn sub_of_sub_collapses() {
        let view = SubFs::new(site(), "site").unwrap();
        let css = view.sub("css").unwrap();
        assert_eq!(crate::read_file(&css, "main.css").unwrap(), b"body{}");
        let err = crate::stat(&css, "other.css").unwrap_err();
        assert_eq!(err.path(), "other.css");
    }

    #[test]
    fn writes_land_in_parent() {
        let parent = site();
        let view = SubFs::new(Arc::clone(&parent), "site").unwrap();
        crate::write_file(&view, "new.txt", b"fresh", 0o644).unwrap();
        assert_eq!(crate::read_file(&parent, "site/new.txt").unwrap(), b"fresh");
    }

    #[test]
    fn debug_shows_dir() {
        let view = SubFs::new(site(), "site").unwrap();
        assert!(format!("{view:?}").contains("site"));
    }
}
