//! Read-side dispatch: stat, lstat, read_dir, read_file and glob.

use tracing::trace;

use super::{unsupported, with_file};
use crate::path::{check_path, join, split};
use crate::pattern::{has_meta, path_match};
use crate::{DirEntry, ErrorKind, Fs, FsError, Metadata};

/// Nesting limit for patterns whose directory part also has metacharacters.
const MAX_GLOB_DEPTH: usize = 10_000;

/// Upper bound on what [`read_file`] reserves up front from a reported size.
const MAX_READ_RESERVE: u64 = 1 << 20;

/// Metadata of the named file, following a final symlink.
///
/// Uses [`FsStat`](crate::FsStat) when available, otherwise opens the file
/// and asks the handle.
///
/// # Examples
///
/// ```rust
/// use anyfs_ops::{stat, MapFs, MapFile};
///
/// let fs = MapFs::new();
/// fs.insert("notes.txt", MapFile::file(b"hello".to_vec(), 0o644));
/// let meta = stat(&fs, "notes.txt").unwrap();
/// assert_eq!(meta.size, 5);
/// assert_eq!(meta.name, "notes.txt");
/// ```
pub fn stat<F: Fs + ?Sized>(fsys: &F, path: &str) -> Result<Metadata, FsError> {
    check_path("stat", path)?;
    if let Some(fsys) = fsys.as_stat() {
        return fsys.stat(path);
    }
    trace!(path, "stat through open handle");
    with_file(fsys.open(path)?, |file| file.stat())
}

/// Metadata of the named entry without following a final symlink.
///
/// # Errors
///
/// - [`ErrorKind::Unsupported`] if the filesystem lacks [`FsLstat`](crate::FsLstat)
pub fn lstat<F: Fs + ?Sized>(fsys: &F, path: &str) -> Result<Metadata, FsError> {
    check_path("lstat", path)?;
    match fsys.as_lstat() {
        Some(fsys) => fsys.lstat(path),
        None => Err(unsupported("lstat", path)),
    }
}

/// Entries of the named directory, sorted by name.
///
/// # Errors
///
/// - [`ErrorKind::NotADirectory`] if the path opens to a non-directory that
///   cannot be listed
/// - [`ErrorKind::Unsupported`] if neither the filesystem nor the directory
///   handle can list entries
pub fn read_dir<F: Fs + ?Sized>(fsys: &F, path: &str) -> Result<Vec<DirEntry>, FsError> {
    check_path("read_dir", path)?;
    if let Some(fsys) = fsys.as_read_dir() {
        return fsys.read_dir(path);
    }

    trace!(path, "read_dir through open handle");
    with_file(fsys.open(path)?, |file| {
        if let Some(dir) = file.as_read_dir() {
            let mut entries = dir.read_dir()?;
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            return Ok(entries);
        }
        if file.stat()?.is_dir() {
            Err(unsupported("read_dir", path))
        } else {
            Err(FsError::new("read_dir", path, ErrorKind::NotADirectory))
        }
    })
}

/// Entire contents of the named file.
pub fn read_file<F: Fs + ?Sized>(fsys: &F, path: &str) -> Result<Vec<u8>, FsError> {
    check_path("read_file", path)?;
    if let Some(fsys) = fsys.as_read_file() {
        return fsys.read_file(path);
    }

    trace!(path, "read_file through open handle");
    with_file(fsys.open(path)?, |file| {
        let mut data = match file.stat() {
            Ok(meta) => Vec::with_capacity(meta.size.min(MAX_READ_RESERVE) as usize),
            Err(_) => Vec::new(),
        };
        let mut buf = [0u8; 8192];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                return Ok(data);
            }
            data.extend_from_slice(&buf[..n]);
        }
    })
}

/// Names of all files matching `pattern`.
///
/// The pattern syntax is that of [`path_match`]. Directories that are
/// missing or not directories simply contribute no matches; other failures
/// while walking are returned.
///
/// # Errors
///
/// - [`ErrorKind::Invalid`] (operation `"glob"`) if the pattern is malformed
///
/// # Examples
///
/// ```rust
/// use anyfs_ops::{glob, MapFs, MapFile};
///
/// let fs = MapFs::new();
/// fs.insert("src/lib.rs", MapFile::file(Vec::new(), 0o644));
/// fs.insert("src/main.rs", MapFile::file(Vec::new(), 0o644));
/// fs.insert("src/notes.txt", MapFile::file(Vec::new(), 0o644));
///
/// assert_eq!(glob(&fs, "src/*.rs").unwrap(), ["src/lib.rs", "src/main.rs"]);
/// assert!(glob(&fs, "src/[").is_err());
/// ```
pub fn glob<F: Fs + ?Sized>(fsys: &F, pattern: &str) -> Result<Vec<String>, FsError> {
    glob_with_limit(fsys, pattern, 0)
}

fn bad_glob(pattern: &str) -> FsError {
    FsError::new("glob", pattern, ErrorKind::Invalid)
}

fn no_match(err: &FsError) -> bool {
    err.is(ErrorKind::NotExist) || err.is(ErrorKind::NotADirectory) || err.is(ErrorKind::Invalid)
}

fn glob_with_limit<F: Fs + ?Sized>(
    fsys: &F,
    pattern: &str,
    depth: usize,
) -> Result<Vec<String>, FsError> {
    if depth > MAX_GLOB_DEPTH {
        return Err(bad_glob(pattern));
    }
    if let Some(fsys) = fsys.as_glob() {
        return fsys.glob(pattern);
    }

    path_match(pattern, "").map_err(|_| bad_glob(pattern))?;

    if !has_meta(pattern) {
        return match stat(fsys, pattern) {
            Ok(_) => Ok(vec![pattern.to_string()]),
            Err(err) if no_match(&err) => Ok(Vec::new()),
            Err(err) => Err(err),
        };
    }

    let (dir, file) = split(pattern);
    let mut matches = Vec::new();
    if !has_meta(dir) {
        glob_dir(fsys, dir, file, &mut matches)?;
        return Ok(matches);
    }

    trace!(pattern, dir, "glob expanding directory pattern");
    for dir in glob_with_limit(fsys, dir, depth + 1)? {
        glob_dir(fsys, &dir, file, &mut matches)?;
    }
    Ok(matches)
}

fn glob_dir<F: Fs + ?Sized>(
    fsys: &F,
    dir: &str,
    pattern: &str,
    matches: &mut Vec<String>,
) -> Result<(), FsError> {
    let entries = match read_dir(fsys, dir) {
        Ok(entries) => entries,
        Err(err) if no_match(&err) => return Ok(()),
        Err(err) => return Err(err),
    };
    for entry in entries {
        if path_match(pattern, &entry.name).map_err(|_| bad_glob(pattern))? {
            matches.push(join(dir, &entry.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{File, MapFile, MapFs};

    struct OpenOnly(MapFs);

    impl Fs for OpenOnly {
        fn open(&self, path: &str) -> Result<Box<dyn File>, FsError> {
            self.0.open(path)
        }
    }

    fn sample() -> OpenOnly {
        let fs = MapFs::new();
        fs.insert("a.txt", MapFile::file(b"aaa".to_vec(), 0o644));
        fs.insert("big.bin", MapFile::file(vec![7; 20_000], 0o644));
        fs.insert("dir/b.txt", MapFile::file(Vec::new(), 0o644));
        OpenOnly(fs)
    }

    #[test]
    fn stat_through_handle() {
        let fs = sample();
        let meta = stat(&fs, "a.txt").unwrap();
        assert_eq!(meta.size, 3);
        assert!(stat(&fs, "dir").unwrap().is_dir());
        assert!(stat(&fs, "nope").unwrap_err().is(ErrorKind::NotExist));
    }

    #[test]
    fn read_file_reads_past_one_buffer() {
        let fs = sample();
        let data = read_file(&fs, "big.bin").unwrap();
        assert_eq!(data.len(), 20_000);
        assert!(data.iter().all(|&b| b == 7));
    }

    /// Reports a size far beyond what it actually holds.
    struct Inflated(Box<dyn File>);

    impl File for Inflated {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
            self.0.read(buf)
        }
        fn stat(&self) -> Result<Metadata, FsError> {
            let mut meta = self.0.stat()?;
            meta.size = u64::MAX;
            Ok(meta)
        }
        fn close(self: Box<Self>) -> Result<(), FsError> {
            self.0.close()
        }
    }

    struct InflatedSizes(MapFs);

    impl Fs for InflatedSizes {
        fn open(&self, path: &str) -> Result<Box<dyn File>, FsError> {
            Ok(Box::new(Inflated(self.0.open(path)?)))
        }
    }

    #[test]
    fn read_file_ignores_implausible_size() {
        let fs = InflatedSizes(sample().0);
        assert_eq!(read_file(&fs, "a.txt").unwrap(), b"aaa");
    }

    #[test]
    fn read_dir_of_file_is_not_a_directory() {
        let fs = sample();
        let err = read_dir(&fs, "a.txt").unwrap_err();
        assert!(err.is(ErrorKind::NotADirectory));
        assert_eq!(err.op(), "read_dir");
    }

    #[test]
    fn lstat_needs_capability() {
        let fs = sample();
        let err = lstat(&fs, "a.txt").unwrap_err();
        assert!(err.is(ErrorKind::Unsupported));
        assert!(lstat(&fs.0, "a.txt").is_ok());
    }

    #[test]
    fn glob_literal_checks_existence() {
        let fs = sample();
        assert_eq!(glob(&fs, "dir/b.txt").unwrap(), ["dir/b.txt"]);
        assert!(glob(&fs, "dir/c.txt").unwrap().is_empty());
        assert!(glob(&fs, "a.txt/x").unwrap().is_empty());
    }

    #[test]
    fn glob_malformed_pattern_is_invalid() {
        let fs = sample();
        let err = glob(&fs, "dir/[b").unwrap_err();
        assert!(err.is(ErrorKind::Invalid));
        assert_eq!(err.op(), "glob");
    }

    #[test]
    fn glob_matches_directory_patterns() {
        let fs = sample();
        assert_eq!(glob(&fs, "*/*.txt").unwrap(), ["dir/b.txt"]);
        assert_eq!(glob(&fs, "?.txt").unwrap(), ["a.txt"]);
    }
}
