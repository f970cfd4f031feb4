//! # In-memory Filesystem
//!
//! [`MapFs`] keeps files in a sorted map from path name to [`MapFile`].
//! Directories may be stored explicitly, or exist implicitly because some
//! stored path lies below them. An implied directory is stored explicitly
//! once its last entry is removed or renamed away:
//!
//! ```rust
//! use anyfs_ops::{read_dir, MapFs, MapFile};
//!
//! let fs = MapFs::new();
//! fs.insert("a/b/c.txt", MapFile::file(b"c".to_vec(), 0o644));
//!
//! // "a" and "a/b" were never inserted, but list like directories.
//! let names: Vec<_> = read_dir(&fs, "a").unwrap().into_iter().map(|e| e.name).collect();
//! assert_eq!(names, ["b"]);
//! ```
//!
//! ## Capabilities
//!
//! | Offered by the filesystem | Offered by file handles |
//! |---------------------------|-------------------------|
//! | stat, lstat, read_dir, open_file, mkdir, remove, rename, symlink, hard_link, read_link, same_file | seek, read_at, write, truncate, chmod, chown, chtimes, read_dir (directories) |
//!
//! Everything else (`read_file`, `glob`, `mkdir_all`, `remove_all`,
//! path-based `chmod`/`chown`/`chtimes`/`truncate`) goes through the dispatch
//! fallbacks. `lchown` is unsupported.
//!
//! Symlink targets are path names relative to the filesystem root. Only a
//! final symlink is followed; intermediate path elements are plain names.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, SeekFrom};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use crate::path::{base, check_path, split, ROOT};
use crate::types::owner_id;
use crate::{
    DirEntry, ErrorKind, File, FileChmod, FileChown, FileChtimes, FileId, FileMode, FileReadAt,
    FileReadDir, FileSeek, FileTruncate, FileWrite, Fs, FsError, FsHardLink, FsLstat, FsMkdir, FsOpenFile, FsReadDir,
    FsReadLink, FsRemove, FsRename, FsSameFile, FsStat, FsSymlink, Metadata, OpenFlags,
};

/// Device numbers handed out to filesystem instances, so files from two
/// different `MapFs` values never compare as the same file.
static NEXT_DEV: AtomicU64 = AtomicU64::new(1);

const MAX_SYMLINK_HOPS: usize = 40;

/// Permission bits reported for directories that exist only implicitly.
const IMPLICIT_DIR_PERM: u32 = 0o755;

/// A stored file, directory or symlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFile {
    /// File contents, or the target of a symlink.
    pub data: Vec<u8>,
    /// Type and permission bits.
    pub mode: FileMode,
    /// Last modification time.
    pub modified: SystemTime,
    /// Last access time.
    pub accessed: SystemTime,
    /// Owner user id.
    pub uid: u32,
    /// Owner group id.
    pub gid: u32,
}

impl MapFile {
    /// A regular file with the given contents and permission bits.
    pub fn file(data: Vec<u8>, perm: u32) -> Self {
        Self::with_mode(data, FileMode::from_bits(perm & 0o777))
    }

    /// An explicit, empty directory.
    pub fn dir(perm: u32) -> Self {
        Self::with_mode(Vec::new(), FileMode::DIR.with_perm(perm))
    }

    /// A symlink pointing at `target`.
    pub fn symlink(target: &str) -> Self {
        Self::with_mode(target.as_bytes().to_vec(), FileMode::SYMLINK.with_perm(0o777))
    }

    fn with_mode(data: Vec<u8>, mode: FileMode) -> Self {
        let now = SystemTime::now();
        Self {
            data,
            mode,
            modified: now,
            accessed: now,
            uid: 0,
            gid: 0,
        }
    }

    fn link_target(&self) -> Option<String> {
        self.mode
            .is_symlink()
            .then(|| String::from_utf8_lossy(&self.data).into_owned())
    }
}

/// A stored entry. Hard links share one node.
struct Node {
    ino: u64,
    file: Mutex<MapFile>,
}

impl Node {
    fn lock(&self) -> MutexGuard<'_, MapFile> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn metadata(&self, name: &str, dev: u64) -> Metadata {
        let file = self.lock();
        Metadata {
            name: base(name).to_string(),
            size: file.data.len() as u64,
            mode: file.mode,
            modified: file.modified,
            accessed: file.accessed,
            uid: file.uid,
            gid: file.gid,
            id: Some(FileId { dev, ino: self.ino }),
        }
    }

    fn is_dir(&self) -> bool {
        self.lock().mode.is_dir()
    }

    fn chmod(&self, mode: u32) {
        let mut file = self.lock();
        file.mode = file.mode.with_perm(mode);
    }

    fn chown(&self, path: &str, uid: i64, gid: i64) -> Result<(), FsError> {
        let uid = owner_id("chown", path, uid)?;
        let gid = owner_id("chown", path, gid)?;
        let mut file = self.lock();
        if let Some(uid) = uid {
            file.uid = uid;
        }
        if let Some(gid) = gid {
            file.gid = gid;
        }
        Ok(())
    }

    fn chtimes(&self, atime: SystemTime, mtime: SystemTime) {
        let mut file = self.lock();
        file.accessed = atime;
        file.modified = mtime;
    }
}

fn implicit_dir_metadata(name: &str) -> Metadata {
    Metadata {
        name: base(name).to_string(),
        mode: FileMode::DIR.with_perm(IMPLICIT_DIR_PERM),
        ..Metadata::default()
    }
}

/// Result of looking a name up in the map.
enum Entry {
    Stored(Arc<Node>),
    Implicit,
}

impl Entry {
    fn is_dir(&self) -> bool {
        match self {
            Entry::Stored(node) => node.is_dir(),
            Entry::Implicit => true,
        }
    }

    fn metadata(&self, name: &str, dev: u64) -> Metadata {
        match self {
            Entry::Stored(node) => node.metadata(name, dev),
            Entry::Implicit => implicit_dir_metadata(name),
        }
    }
}

type FileMap = BTreeMap<String, Arc<Node>>;

fn child_prefix(dir: &str) -> String {
    if dir == ROOT {
        String::new()
    } else {
        format!("{dir}/")
    }
}

fn has_children(files: &FileMap, dir: &str) -> bool {
    let prefix = child_prefix(dir);
    files
        .range(prefix.clone()..)
        .take_while(|(key, _)| key.starts_with(&prefix))
        .any(|(key, _)| key != ROOT)
}

fn lookup(files: &FileMap, name: &str) -> Option<Entry> {
    if let Some(node) = files.get(name) {
        return Some(Entry::Stored(Arc::clone(node)));
    }
    (name == ROOT || has_children(files, name)).then_some(Entry::Implicit)
}

/// Check that the parent of `name` exists and is a directory.
fn parent_is_dir(files: &FileMap, name: &str) -> Result<(), ErrorKind> {
    let (parent, _) = split(name);
    match lookup(files, parent) {
        Some(entry) if entry.is_dir() => Ok(()),
        Some(_) => Err(ErrorKind::NotADirectory),
        None => Err(ErrorKind::NotExist),
    }
}

/// An in-memory filesystem.
///
/// All state sits behind a lock, so a `MapFs` can be shared between threads.
/// Open handles keep their file alive after it is removed.
pub struct MapFs {
    dev: u64,
    next_ino: AtomicU64,
    files: RwLock<FileMap>,
}

impl MapFs {
    /// An empty filesystem containing only the root directory.
    pub fn new() -> Self {
        Self {
            dev: NEXT_DEV.fetch_add(1, Ordering::Relaxed),
            next_ino: AtomicU64::new(1),
            files: RwLock::new(BTreeMap::new()),
        }
    }

    /// Store `file` at `path`, replacing whatever was there.
    ///
    /// Missing parent directories are implied. `path` should be a valid
    /// path name; other names are stored but can never be reached.
    pub fn insert(&self, path: impl Into<String>, file: MapFile) {
        let node = self.new_node(file);
        self.write_files().insert(path.into(), node);
    }

    /// A copy of the entry stored at `path`, without following symlinks.
    ///
    /// Implicit directories have no stored entry.
    pub fn get(&self, path: &str) -> Option<MapFile> {
        self.read_files().get(path).map(|node| node.lock().clone())
    }

    /// Stored paths, in order.
    pub fn paths(&self) -> Vec<String> {
        self.read_files().keys().cloned().collect()
    }

    fn new_node(&self, file: MapFile) -> Arc<Node> {
        Arc::new(Node {
            ino: self.next_ino.fetch_add(1, Ordering::Relaxed),
            file: Mutex::new(file),
        })
    }

    /// Store the parent of a just-removed `name` if it was only implied by
    /// its children, so emptying a directory never makes it vanish.
    fn keep_parent(&self, files: &mut FileMap, name: &str) {
        let (parent, _) = split(name);
        if parent != ROOT && !files.contains_key(parent) && !has_children(files, parent) {
            let node = self.new_node(MapFile::dir(IMPLICIT_DIR_PERM));
            files.insert(parent.to_string(), node);
        }
    }

    fn read_files(&self) -> RwLockReadGuard<'_, FileMap> {
        self.files.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_files(&self) -> RwLockWriteGuard<'_, FileMap> {
        self.files.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Follow final symlinks starting at `name`.
    ///
    /// Returns the name reached and its entry, or `None` as the entry when the
    /// chain ends at a missing name.
    fn resolve(
        &self,
        files: &FileMap,
        op: &'static str,
        name: &str,
    ) -> Result<(String, Option<Entry>), FsError> {
        let mut current = name.to_string();
        for _ in 0..MAX_SYMLINK_HOPS {
            let entry = lookup(files, &current);
            let target = match &entry {
                Some(Entry::Stored(node)) => node.lock().link_target(),
                _ => None,
            };
            match target {
                Some(target) => current = target,
                None => return Ok((current, entry)),
            }
        }
        Err(FsError::new(op, name, ErrorKind::Invalid))
    }

    fn existing(
        &self,
        files: &FileMap,
        op: &'static str,
        name: &str,
    ) -> Result<(String, Entry), FsError> {
        match self.resolve(files, op, name)? {
            (resolved, Some(entry)) => Ok((resolved, entry)),
            (_, None) => Err(FsError::new(op, name, ErrorKind::NotExist)),
        }
    }

    fn entries(&self, files: &FileMap, dir: &str) -> Vec<DirEntry> {
        let prefix = child_prefix(dir);
        let mut found: BTreeMap<String, DirEntry> = BTreeMap::new();
        for (key, node) in files.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            if rest.is_empty() || key == ROOT {
                continue;
            }
            match rest.split_once('/') {
                None => {
                    found.insert(rest.to_string(), DirEntry::from_metadata(node.metadata(key, self.dev)));
                }
                Some((first, _)) => {
                    found
                        .entry(first.to_string())
                        .or_insert_with(|| DirEntry::from_metadata(implicit_dir_metadata(first)));
                }
            }
        }
        found.into_values().collect()
    }

    fn open_dir(&self, files: &FileMap, path: &str, resolved: &str, entry: Entry) -> Box<dyn File> {
        let node = match entry {
            Entry::Stored(node) => Some(node),
            Entry::Implicit => None,
        };
        Box::new(MapDirHandle {
            path: path.to_string(),
            node,
            dev: self.dev,
            entries: self.entries(files, resolved),
            offset: 0,
        })
    }
}

impl Default for MapFs {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MapFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapFs")
            .field("dev", &self.dev)
            .field("paths", &self.paths())
            .finish()
    }
}

impl Fs for MapFs {
    fn open(&self, path: &str) -> Result<Box<dyn File>, FsError> {
        check_path("open", path)?;
        let files = self.read_files();
        let (resolved, entry) = self.existing(&files, "open", path)?;
        match entry {
            Entry::Stored(node) if !node.is_dir() => Ok(Box::new(MapFileHandle {
                path: path.to_string(),
                node,
                dev: self.dev,
                offset: 0,
                readable: true,
                writable: false,
                append: false,
            })),
            entry => Ok(self.open_dir(&files, path, &resolved, entry)),
        }
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

    fn as_open_file(&self) -> Option<&dyn FsOpenFile> {
        Some(self)
    }

    fn as_mkdir(&self) -> Option<&dyn FsMkdir> {
        Some(self)
    }

    fn as_remove(&self) -> Option<&dyn FsRemove> {
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

    fn as_same_file(&self) -> Option<&dyn FsSameFile> {
        Some(self)
    }
}

impl FsStat for MapFs {
    fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        check_path("stat", path)?;
        let files = self.read_files();
        let (_, entry) = self.existing(&files, "stat", path)?;
        Ok(entry.metadata(path, self.dev))
    }
}

impl FsLstat for MapFs {
    fn lstat(&self, path: &str) -> Result<Metadata, FsError> {
        check_path("lstat", path)?;
        let files = self.read_files();
        match lookup(&files, path) {
            Some(entry) => Ok(entry.metadata(path, self.dev)),
            None => Err(FsError::new("lstat", path, ErrorKind::NotExist)),
        }
    }
}

impl FsReadDir for MapFs {
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        check_path("read_dir", path)?;
        let files = self.read_files();
        let (resolved, entry) = self.existing(&files, "read_dir", path)?;
        if !entry.is_dir() {
            return Err(FsError::new("read_dir", path, ErrorKind::NotADirectory));
        }
        Ok(self.entries(&files, &resolved))
    }
}

impl FsOpenFile for MapFs {
    fn open_file(&self, path: &str, flags: OpenFlags, perm: u32) -> Result<Box<dyn File>, FsError> {
        if flags.is_read_only() {
            return self.open(path);
        }
        check_path("open", path)?;

        let mut files = self.write_files();
        let (resolved, entry) = self.resolve(&files, "open", path)?;
        let node = match entry {
            Some(entry) if entry.is_dir() => {
                if flags.wants_write() {
                    return Err(FsError::new("open", path, ErrorKind::NotADirectory));
                }
                return Ok(self.open_dir(&files, path, &resolved, entry));
            }
            Some(Entry::Stored(node)) => {
                if flags.create && flags.exclusive {
                    return Err(FsError::new("open", path, ErrorKind::Exist));
                }
                if flags.truncate {
                    let mut file = node.lock();
                    file.data.clear();
                    file.modified = SystemTime::now();
                }
                node
            }
            Some(Entry::Implicit) => {
                return Ok(self.open_dir(&files, path, &resolved, Entry::Implicit));
            }
            None => {
                if !flags.create {
                    return Err(FsError::new("open", path, ErrorKind::NotExist));
                }
                parent_is_dir(&files, &resolved).map_err(|kind| FsError::new("open", path, kind))?;
                let node = self.new_node(MapFile::file(Vec::new(), perm));
                files.insert(resolved, Arc::clone(&node));
                node
            }
        };

        Ok(Box::new(MapFileHandle {
            path: path.to_string(),
            node,
            dev: self.dev,
            offset: 0,
            readable: flags.read || !(flags.write || flags.append),
            writable: flags.write || flags.append,
            append: flags.append,
        }))
    }
}

impl FsMkdir for MapFs {
    fn mkdir(&self, path: &str, perm: u32) -> Result<(), FsError> {
        check_path("mkdir", path)?;
        let mut files = self.write_files();
        if lookup(&files, path).is_some() {
            return Err(FsError::new("mkdir", path, ErrorKind::Exist));
        }
        parent_is_dir(&files, path).map_err(|kind| FsError::new("mkdir", path, kind))?;
        let node = self.new_node(MapFile::dir(perm));
        files.insert(path.to_string(), node);
        Ok(())
    }
}

impl FsRemove for MapFs {
    fn remove(&self, path: &str) -> Result<(), FsError> {
        check_path("remove", path)?;
        if path == ROOT {
            return Err(FsError::new("remove", path, ErrorKind::Invalid));
        }
        let mut files = self.write_files();
        if lookup(&files, path).is_none() {
            return Err(FsError::new("remove", path, ErrorKind::NotExist));
        }
        if has_children(&files, path) {
            return Err(FsError::new("remove", path, ErrorKind::DirectoryNotEmpty));
        }
        files.remove(path);
        self.keep_parent(&mut files, path);
        Ok(())
    }
}

impl FsRename for MapFs {
    fn rename(&self, old: &str, new: &str) -> Result<(), FsError> {
        let fail = |kind| FsError::link("rename", old, new, kind);
        crate::path::check_link_paths("rename", old, new)?;
        if old == ROOT || new == ROOT || new.starts_with(&child_prefix(old)) {
            return Err(fail(ErrorKind::Invalid));
        }

        let mut files = self.write_files();
        let Some(entry) = lookup(&files, old) else {
            return Err(fail(ErrorKind::NotExist));
        };
        if old == new {
            return Ok(());
        }
        match lookup(&files, new) {
            Some(existing) if existing.is_dir() => return Err(fail(ErrorKind::Exist)),
            Some(_) if entry.is_dir() => return Err(fail(ErrorKind::NotADirectory)),
            _ => {}
        }
        parent_is_dir(&files, new).map_err(fail)?;

        let prefix = child_prefix(old);
        let children: Vec<String> = files
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.clone())
            .collect();
        if let Some(node) = files.remove(old) {
            files.insert(new.to_string(), node);
        }
        for key in children {
            if let Some(node) = files.remove(&key) {
                files.insert(format!("{new}/{}", &key[prefix.len()..]), node);
            }
        }
        self.keep_parent(&mut files, old);
        Ok(())
    }
}

impl FsSymlink for MapFs {
    fn symlink(&self, target: &str, link: &str) -> Result<(), FsError> {
        crate::path::check_link_paths("symlink", target, link)?;
        let mut files = self.write_files();
        if lookup(&files, link).is_some() {
            return Err(FsError::link("symlink", target, link, ErrorKind::Exist));
        }
        parent_is_dir(&files, link).map_err(|kind| FsError::link("symlink", target, link, kind))?;
        let node = self.new_node(MapFile::symlink(target));
        files.insert(link.to_string(), node);
        Ok(())
    }
}

impl FsHardLink for MapFs {
    fn hard_link(&self, old: &str, new: &str) -> Result<(), FsError> {
        crate::path::check_link_paths("link", old, new)?;
        let fail = |kind| FsError::link("link", old, new, kind);
        let mut files = self.write_files();
        let node = match lookup(&files, old) {
            Some(Entry::Stored(node)) if !node.is_dir() => node,
            Some(_) => return Err(fail(ErrorKind::Permission)),
            None => return Err(fail(ErrorKind::NotExist)),
        };
        if lookup(&files, new).is_some() {
            return Err(fail(ErrorKind::Exist));
        }
        parent_is_dir(&files, new).map_err(fail)?;
        files.insert(new.to_string(), node);
        Ok(())
    }
}

impl FsReadLink for MapFs {
    fn read_link(&self, path: &str) -> Result<String, FsError> {
        check_path("read_link", path)?;
        let files = self.read_files();
        match lookup(&files, path) {
            Some(Entry::Stored(node)) => node
                .lock()
                .link_target()
                .ok_or_else(|| FsError::new("read_link", path, ErrorKind::Invalid)),
            Some(Entry::Implicit) => Err(FsError::new("read_link", path, ErrorKind::Invalid)),
            None => Err(FsError::new("read_link", path, ErrorKind::NotExist)),
        }
    }
}

impl FsSameFile for MapFs {
    fn same_file(&self, a: &Metadata, b: &Metadata) -> bool {
        match (a.id, b.id) {
            (Some(a), Some(b)) => a == b && a.dev == self.dev,
            _ => false,
        }
    }
}

/// Handle on a regular file.
struct MapFileHandle {
    path: String,
    node: Arc<Node>,
    dev: u64,
    offset: u64,
    readable: bool,
    writable: bool,
    append: bool,
}

impl MapFileHandle {
    fn require_write(&self, op: &'static str) -> Result<(), FsError> {
        if self.writable {
            Ok(())
        } else {
            Err(FsError::new(op, self.path.as_str(), ErrorKind::Permission))
        }
    }

    fn copy_out(&self, buf: &mut [u8], offset: u64) -> usize {
        let file = self.node.lock();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(file.data.len());
        let n = buf.len().min(file.data.len() - start);
        buf[..n].copy_from_slice(&file.data[start..start + n]);
        n
    }
}

/// Resize `data` to `len` bytes, zero-filling growth, without aborting on
/// lengths the host cannot hold.
fn resize_data(data: &mut Vec<u8>, len: u64, op: &'static str, path: &str) -> Result<(), FsError> {
    let len = usize::try_from(len).map_err(|_| FsError::new(op, path, ErrorKind::Invalid))?;
    if len > data.len() {
        data.try_reserve_exact(len - data.len())
            .map_err(|_| FsError::from_io(op, path, io::ErrorKind::OutOfMemory.into()))?;
    }
    data.resize(len, 0);
    Ok(())
}

impl File for MapFileHandle {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        if !self.readable {
            return Err(FsError::new("read", self.path.as_str(), ErrorKind::Permission));
        }
        let n = self.copy_out(buf, self.offset);
        self.offset += n as u64;
        Ok(n)
    }

    fn stat(&self) -> Result<Metadata, FsError> {
        Ok(self.node.metadata(&self.path, self.dev))
    }

    fn close(self: Box<Self>) -> Result<(), FsError> {
        Ok(())
    }

    fn as_seek(&mut self) -> Option<&mut dyn FileSeek> {
        Some(self)
    }

    fn as_read_at(&mut self) -> Option<&mut dyn FileReadAt> {
        Some(self)
    }

    fn as_write(&mut self) -> Option<&mut dyn FileWrite> {
        Some(self)
    }

    fn as_truncate(&mut self) -> Option<&mut dyn FileTruncate> {
        Some(self)
    }

    fn as_chmod(&mut self) -> Option<&mut dyn FileChmod> {
        Some(self)
    }

    fn as_chown(&mut self) -> Option<&mut dyn FileChown> {
        Some(self)
    }

    fn as_chtimes(&mut self) -> Option<&mut dyn FileChtimes> {
        Some(self)
    }
}

impl FileWrite for MapFileHandle {
    fn write(&mut self, buf: &[u8]) -> Result<usize, FsError> {
        self.require_write("write")?;
        let mut file = self.node.lock();
        let at = if self.append {
            file.data.len() as u64
        } else {
            self.offset
        };
        let end = at
            .checked_add(buf.len() as u64)
            .ok_or_else(|| FsError::new("write", self.path.as_str(), ErrorKind::Invalid))?;
        if end > file.data.len() as u64 {
            resize_data(&mut file.data, end, "write", &self.path)?;
        }
        // Both fit in usize once the data holds `end` bytes.
        let (at, end) = (at as usize, end as usize);
        file.data[at..end].copy_from_slice(buf);
        file.modified = SystemTime::now();
        self.offset = end as u64;
        Ok(buf.len())
    }
}

impl FileTruncate for MapFileHandle {
    fn truncate(&mut self, size: u64) -> Result<(), FsError> {
        self.require_write("truncate")?;
        let mut file = self.node.lock();
        resize_data(&mut file.data, size, "truncate", &self.path)?;
        file.modified = SystemTime::now();
        Ok(())
    }
}

impl FileSeek for MapFileHandle {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, FsError> {
        let (base, delta) = match pos {
            SeekFrom::Start(offset) => (offset, 0),
            SeekFrom::Current(delta) => (self.offset, delta),
            SeekFrom::End(delta) => (self.node.lock().data.len() as u64, delta),
        };
        self.offset = base
            .checked_add_signed(delta)
            .ok_or_else(|| FsError::new("seek", self.path.as_str(), ErrorKind::Invalid))?;
        Ok(self.offset)
    }
}

impl FileReadAt for MapFileHandle {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, FsError> {
        if !self.readable {
            return Err(FsError::new("read", self.path.as_str(), ErrorKind::Permission));
        }
        Ok(self.copy_out(buf, offset))
    }
}

impl FileChmod for MapFileHandle {
    fn chmod(&mut self, mode: u32) -> Result<(), FsError> {
        self.node.chmod(mode);
        Ok(())
    }
}

impl FileChown for MapFileHandle {
    fn chown(&mut self, uid: i64, gid: i64) -> Result<(), FsError> {
        self.node.chown(&self.path, uid, gid)
    }
}

impl FileChtimes for MapFileHandle {
    fn chtimes(&mut self, atime: SystemTime, mtime: SystemTime) -> Result<(), FsError> {
        self.node.chtimes(atime, mtime);
        Ok(())
    }
}

/// Handle on a directory, listing a snapshot taken when it was opened.
struct MapDirHandle {
    path: String,
    /// `None` for implicit directories, which have nothing to change.
    node: Option<Arc<Node>>,
    dev: u64,
    entries: Vec<DirEntry>,
    offset: usize,
}

impl File for MapDirHandle {
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, FsError> {
        Err(FsError::new("read", self.path.as_str(), ErrorKind::Invalid))
    }

    fn stat(&self) -> Result<Metadata, FsError> {
        Ok(match &self.node {
            Some(node) => node.metadata(&self.path, self.dev),
            None => implicit_dir_metadata(&self.path),
        })
    }

    fn close(self: Box<Self>) -> Result<(), FsError> {
        Ok(())
    }

    fn as_read_dir(&mut self) -> Option<&mut dyn FileReadDir> {
        Some(self)
    }

    fn as_chmod(&mut self) -> Option<&mut dyn FileChmod> {
        if self.node.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_chown(&mut self) -> Option<&mut dyn FileChown> {
        if self.node.is_some() {
            Some(self)
        } else {
            None
        }
    }

    fn as_chtimes(&mut self) -> Option<&mut dyn FileChtimes> {
        if self.node.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

impl FileReadDir for MapDirHandle {
    fn read_dir(&mut self) -> Result<Vec<DirEntry>, FsError> {
        let rest = self.entries[self.offset..].to_vec();
        self.offset = self.entries.len();
        Ok(rest)
    }
}

impl MapDirHandle {
    fn node(&self, op: &'static str) -> Result<&Node, FsError> {
        self.node
            .as_deref()
            .ok_or_else(|| FsError::new(op, self.path.as_str(), ErrorKind::Unsupported))
    }
}

impl FileChmod for MapDirHandle {
    fn chmod(&mut self, mode: u32) -> Result<(), FsError> {
        self.node("chmod")?.chmod(mode);
        Ok(())
    }
}

impl FileChown for MapDirHandle {
    fn chown(&mut self, uid: i64, gid: i64) -> Result<(), FsError> {
        self.node("chown")?.chown(&self.path, uid, gid)
    }
}

impl FileChtimes for MapDirHandle {
    fn chtimes(&mut self, atime: SystemTime, mtime: SystemTime) -> Result<(), FsError> {
        self.node("chtimes")?.chtimes(atime, mtime);
        Ok(())
    }
}
