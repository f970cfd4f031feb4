//! Tree traversal built on lstat and read_dir.

use tracing::trace;

use crate::fallback::lstat_or_stat;
use crate::path::{check_path, join};
use crate::{Fs, FsError, Metadata};

/// What [`walk_dir`] does after visiting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    /// Keep going, descending into the entry if it is a directory.
    Continue,
    /// Do not descend into this directory. Same as `Continue` for files.
    SkipDir,
}

/// Visit `root` and everything below it, depth first.
///
/// Entries are visited in lexical order within each directory, a directory
/// before its contents. Metadata comes from [`lstat`](crate::lstat), so
/// symlinks are reported but never followed; filesystems without
/// [`FsLstat`](crate::FsLstat) fall back to [`stat`](crate::stat).
///
/// The first error, from the filesystem or from `visit`, ends the walk.
///
/// # Examples
///
/// ```rust
/// use anyfs_ops::{walk_dir, MapFs, MapFile, WalkControl};
///
/// let fs = MapFs::new();
/// fs.insert("src/lib.rs", MapFile::file(Vec::new(), 0o644));
/// fs.insert("target/debug/app", MapFile::file(Vec::new(), 0o755));
///
/// let mut seen = Vec::new();
/// walk_dir(&fs, ".", |path, _meta| {
///     seen.push(path.to_string());
///     Ok(if path == "target" { WalkControl::SkipDir } else { WalkControl::Continue })
/// })
/// .unwrap();
/// assert_eq!(seen, [".", "src", "src/lib.rs", "target"]);
/// ```
pub fn walk_dir<F, V>(fsys: &F, root: &str, mut visit: V) -> Result<(), FsError>
where
    F: Fs + ?Sized,
    V: FnMut(&str, &Metadata) -> Result<WalkControl, FsError>,
{
    check_path("walk_dir", root)?;
    let meta = lstat_or_stat(fsys, root)?;
    walk(fsys, root, &meta, &mut visit)
}

fn walk<F, V>(fsys: &F, path: &str, meta: &Metadata, visit: &mut V) -> Result<(), FsError>
where
    F: Fs + ?Sized,
    V: FnMut(&str, &Metadata) -> Result<WalkControl, FsError>,
{
    let control = visit(path, meta)?;
    if !meta.is_dir() || control == WalkControl::SkipDir {
        return Ok(());
    }
    trace!(path, "walking directory");
    for entry in crate::read_dir(fsys, path)? {
        let child = join(path, &entry.name);
        let meta = lstat_or_stat(fsys, &child)?;
        walk(fsys, &child, &meta, visit)?;
    }
    Ok(())
}
