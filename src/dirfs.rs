//! # Host Directory Filesystem
//!
//! [`DirFs`] exposes a directory of the host filesystem through slash
//! separated path names. It offers every capability the host can provide,
//! so dispatch never needs a fallback for it.
//!
//! Names are checked before they reach the host. On Windows, names with a
//! backslash or a colon are rejected, since the host would read them as
//! separators or drive prefixes.
//!
//! Symlinks created through `DirFs` point at the absolute host path of
//! their target; [`read_link`](crate::read_link) maps such targets back
//! into root-relative names.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use filetime::FileTime;

use crate::path::{check_link_paths, check_path, ROOT};
use crate::types::owner_id;
use crate::{
    DirEntry, ErrorKind, File, FileChmod, FileChown, FileChtimes, FileId, FileMode, FileReadAt,
    FileReadDir, FileSeek, FileTruncate, FileWrite, Fs, FsChmod, FsChown, FsChtimes, FsError, FsHardLink, FsLchown,
    FsLstat, FsMkdir, FsOpenFile, FsReadDir, FsReadFile, FsReadLink, FsRemove, FsRemoveAll,
    FsRename, FsSameFile, FsStat, FsSymlink, FsTruncate, Metadata, OpenFlags,
};

/// A filesystem backed by a host directory.
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    /// Expose the host directory `root`.
    ///
    /// The directory is not checked here; operations on a missing root fail
    /// with [`ErrorKind::NotExist`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The host directory this filesystem exposes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, op: &'static str, name: &str) -> Result<PathBuf, FsError> {
        check_path(op, name)?;
        if cfg!(windows) && name.contains(['\\', ':']) {
            return Err(FsError::new(op, name, ErrorKind::Invalid));
        }
        if name == ROOT {
            return Ok(self.root.clone());
        }
        Ok(self.root.join(name))
    }

    fn host_paths(
        &self,
        op: &'static str,
        old: &str,
        new: &str,
    ) -> Result<(PathBuf, PathBuf), FsError> {
        check_link_paths(op, old, new)?;
        let old_host = self.host_path(op, old).map_err(|_| invalid_link(op, old, new))?;
        let new_host = self.host_path(op, new).map_err(|_| invalid_link(op, old, new))?;
        Ok((old_host, new_host))
    }

    fn open_host(
        &self,
        path: &str,
        options: &fs::OpenOptions,
        writable: bool,
    ) -> Result<Box<dyn File>, FsError> {
        let host = self.host_path("open", path)?;
        if fs::metadata(&host).is_ok_and(|meta| meta.is_dir()) {
            return Ok(Box::new(DirHandle {
                name: path.to_string(),
                host,
            }));
        }
        let file = options
            .open(&host)
            .map_err(|e| FsError::from_io("open", path, e))?;
        Ok(Box::new(FileHandle {
            name: path.to_string(),
            file,
            writable,
        }))
    }
}

fn invalid_link(op: &'static str, old: &str, new: &str) -> FsError {
    FsError::link(op, old, new, ErrorKind::Invalid)
}

fn link_error(op: &'static str, old: &str, new: &str, err: io::Error) -> FsError {
    match ErrorKind::from_io(err.kind()) {
        Some(kind) => FsError::link(op, old, new, kind),
        None => FsError::from_io(op, old, err),
    }
}

/// Convert host metadata, naming the entry after the final element of `name`.
fn to_metadata(name: &str, meta: &fs::Metadata) -> Metadata {
    let file_type = meta.file_type();
    let mut mode = FileMode::from_bits(permission_bits(meta));
    if file_type.is_dir() {
        mode = mode | FileMode::DIR;
    } else if file_type.is_symlink() {
        mode = mode | FileMode::SYMLINK;
    }

    let (uid, gid, id) = ownership(meta);
    Metadata {
        name: crate::path::base(name).to_string(),
        size: meta.len(),
        mode,
        modified: meta.modified().unwrap_or(UNIX_EPOCH),
        accessed: meta.accessed().unwrap_or(UNIX_EPOCH),
        uid,
        gid,
        id,
    }
}

#[cfg(unix)]
fn permission_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(meta: &fs::Metadata) -> u32 {
    let base = if meta.permissions().readonly() { 0o444 } else { 0o666 };
    if meta.is_dir() { base | 0o111 } else { base }
}

#[cfg(unix)]
fn ownership(meta: &fs::Metadata) -> (u32, u32, Option<FileId>) {
    use std::os::unix::fs::MetadataExt;
    let id = FileId {
        dev: meta.dev(),
        ino: meta.ino(),
    };
    (meta.uid(), meta.gid(), Some(id))
}

#[cfg(not(unix))]
fn ownership(_meta: &fs::Metadata) -> (u32, u32, Option<FileId>) {
    (0, 0, None)
}

#[cfg(unix)]
fn set_mode(host: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(host, fs::Permissions::from_mode(mode & 0o777))
}

#[cfg(not(unix))]
fn set_mode(host: &Path, mode: u32) -> io::Result<()> {
    let mut perms = fs::metadata(host)?.permissions();
    perms.set_readonly(mode & 0o200 == 0);
    fs::set_permissions(host, perms)
}

fn file_time(time: SystemTime) -> FileTime {
    FileTime::from_system_time(time)
}

impl Fs for DirFs {
    fn open(&self, path: &str) -> Result<Box<dyn File>, FsError> {
        self.open_host(path, fs::OpenOptions::new().read(true), false)
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

    fn as_open_file(&self) -> Option<&dyn FsOpenFile> {
        Some(self)
    }

    fn as_mkdir(&self) -> Option<&dyn FsMkdir> {
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
        cfg!(unix).then_some(self as &dyn FsChown)
    }

    fn as_lchown(&self) -> Option<&dyn FsLchown> {
        cfg!(unix).then_some(self as &dyn FsLchown)
    }

    fn as_chtimes(&self) -> Option<&dyn FsChtimes> {
        Some(self)
    }

    fn as_same_file(&self) -> Option<&dyn FsSameFile> {
        Some(self)
    }
}

impl FsStat for DirFs {
    fn stat(&self, path: &str) -> Result<Metadata, FsError> {
        let host = self.host_path("stat", path)?;
        let meta = fs::metadata(host).map_err(|e| FsError::from_io("stat", path, e))?;
        Ok(to_metadata(path, &meta))
    }
}

impl FsLstat for DirFs {
    fn lstat(&self, path: &str) -> Result<Metadata, FsError> {
        let host = self.host_path("lstat", path)?;
        let meta = fs::symlink_metadata(host).map_err(|e| FsError::from_io("lstat", path, e))?;
        Ok(to_metadata(path, &meta))
    }
}

impl FsReadDir for DirFs {
    fn read_dir(&self, path: &str) -> Result<Vec<DirEntry>, FsError> {
        let host = self.host_path("read_dir", path)?;
        list_dir(path, &host)
    }
}

fn list_dir(path: &str, host: &Path) -> Result<Vec<DirEntry>, FsError> {
    let fail = |e| FsError::from_io("read_dir", path, e);
    let mut entries = Vec::new();
    for entry in fs::read_dir(host).map_err(fail)? {
        let entry = entry.map_err(fail)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let meta = entry.metadata().map_err(fail)?;
        entries.push(DirEntry::from_metadata(to_metadata(&name, &meta)));
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

impl FsReadFile for DirFs {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, FsError> {
        let host = self.host_path("read_file", path)?;
        fs::read(host).map_err(|e| FsError::from_io("read_file", path, e))
    }
}

impl FsOpenFile for DirFs {
    fn open_file(&self, path: &str, flags: OpenFlags, perm: u32) -> Result<Box<dyn File>, FsError> {
        let mut options = fs::OpenOptions::new();
        options
            .read(flags.read || !(flags.write || flags.append))
            .write(flags.write)
            .append(flags.append)
            .truncate(flags.truncate)
            .create(flags.create && !flags.exclusive)
            .create_new(flags.create && flags.exclusive);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(perm & 0o777);
        }
        #[cfg(not(unix))]
        let _ = perm;

        if flags.wants_write() {
            let host = self.host_path("open", path)?;
            if fs::metadata(&host).is_ok_and(|meta| meta.is_dir()) {
                return Err(FsError::new("open", path, ErrorKind::NotADirectory));
            }
        }
        self.open_host(path, &options, flags.wants_write())
    }
}

impl FsMkdir for DirFs {
    fn mkdir(&self, path: &str, perm: u32) -> Result<(), FsError> {
        let host = self.host_path("mkdir", path)?;
        let mut builder = fs::DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(perm & 0o777);
        }
        #[cfg(not(unix))]
        let _ = perm;
        builder
            .create(host)
            .map_err(|e| FsError::from_io("mkdir", path, e))
    }
}

impl FsRemove for DirFs {
    fn remove(&self, path: &str) -> Result<(), FsError> {
        let host = self.host_path("remove", path)?;
        let meta = fs::symlink_metadata(&host).map_err(|e| FsError::from_io("remove", path, e))?;
        let result = if meta.is_dir() {
            fs::remove_dir(&host)
        } else {
            fs::remove_file(&host)
        };
        result.map_err(|e| FsError::from_io("remove", path, e))
    }
}

impl FsRemoveAll for DirFs {
    fn remove_all(&self, path: &str) -> Result<(), FsError> {
        let host = self.host_path("remove_all", path)?;
        let meta =
            fs::symlink_metadata(&host).map_err(|e| FsError::from_io("remove_all", path, e))?;
        let result = if meta.is_dir() {
            fs::remove_dir_all(&host)
        } else {
            fs::remove_file(&host)
        };
        result.map_err(|e| FsError::from_io("remove_all", path, e))
    }
}

impl FsRename for DirFs {
    fn rename(&self, old: &str, new: &str) -> Result<(), FsError> {
        let (old_host, new_host) = self.host_paths("rename", old, new)?;
        fs::rename(old_host, new_host).map_err(|e| link_error("rename", old, new, e))
    }
}

impl FsSymlink for DirFs {
    fn symlink(&self, target: &str, link: &str) -> Result<(), FsError> {
        let (target_host, link_host) = self.host_paths("symlink", target, link)?;
        host_symlink(&target_host, &link_host).map_err(|e| link_error("symlink", target, link, e))
    }
}

#[cfg(unix)]
fn host_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn host_symlink(target: &Path, link: &Path) -> io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(not(any(unix, windows)))]
fn host_symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::ErrorKind::Unsupported.into())
}

impl FsHardLink for DirFs {
    fn hard_link(&self, old: &str, new: &str) -> Result<(), FsError> {
        let (old_host, new_host) = self.host_paths("link", old, new)?;
        fs::hard_link(old_host, new_host).map_err(|e| link_error("link", old, new, e))
    }
}

impl FsReadLink for DirFs {
    fn read_link(&self, path: &str) -> Result<String, FsError> {
        let host = self.host_path("read_link", path)?;
        let target = fs::read_link(host).map_err(|e| FsError::from_io("read_link", path, e))?;
        let name = match target.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ROOT.to_string(),
            Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
            Err(_) => target.to_string_lossy().into_owned(),
        };
        Ok(name)
    }
}

impl FsTruncate for DirFs {
    fn truncate(&self, path: &str, size: u64) -> Result<(), FsError> {
        let host = self.host_path("truncate", path)?;
        fs::OpenOptions::new()
            .write(true)
            .open(host)
            .and_then(|file| file.set_len(size))
            .map_err(|e| FsError::from_io("truncate", path, e))
    }
}

impl FsChmod for DirFs {
    fn chmod(&self, path: &str, mode: u32) -> Result<(), FsError> {
        let host = self.host_path("chmod", path)?;
        set_mode(&host, mode).map_err(|e| FsError::from_io("chmod", path, e))
    }
}

impl FsChown for DirFs {
    fn chown(&self, path: &str, uid: i64, gid: i64) -> Result<(), FsError> {
        let host = self.host_path("chown", path)?;
        let (uid, gid) = (owner_id("chown", path, uid)?, owner_id("chown", path, gid)?);
        host_chown(&host, uid, gid, true).map_err(|e| FsError::from_io("chown", path, e))
    }
}

impl FsLchown for DirFs {
    fn lchown(&self, path: &str, uid: i64, gid: i64) -> Result<(), FsError> {
        let host = self.host_path("lchown", path)?;
        let (uid, gid) = (owner_id("lchown", path, uid)?, owner_id("lchown", path, gid)?);
        host_chown(&host, uid, gid, false).map_err(|e| FsError::from_io("lchown", path, e))
    }
}

#[cfg(unix)]
fn host_chown(host: &Path, uid: Option<u32>, gid: Option<u32>, follow: bool) -> io::Result<()> {
    if follow {
        std::os::unix::fs::chown(host, uid, gid)
    } else {
        std::os::unix::fs::lchown(host, uid, gid)
    }
}

#[cfg(not(unix))]
fn host_chown(_host: &Path, _uid: Option<u32>, _gid: Option<u32>, _follow: bool) -> io::Result<()> {
    Err(io::ErrorKind::Unsupported.into())
}

impl FsChtimes for DirFs {
    fn chtimes(&self, path: &str, atime: SystemTime, mtime: SystemTime) -> Result<(), FsError> {
        let host = self.host_path("chtimes", path)?;
        filetime::set_file_times(host, file_time(atime), file_time(mtime))
            .map_err(|e| FsError::from_io("chtimes", path, e))
    }
}

impl FsSameFile for DirFs {
    fn same_file(&self, a: &Metadata, b: &Metadata) -> bool {
        matches!((a.id, b.id), (Some(a), Some(b)) if a == b)
    }
}

/// Open regular file.
struct FileHandle {
    name: String,
    file: fs::File,
    /// Written data is synced to the host on close.
    writable: bool,
}

impl File for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
        self.file
            .read(buf)
            .map_err(|e| FsError::from_io("read", self.name.as_str(), e))
    }

    fn stat(&self) -> Result<Metadata, FsError> {
        let meta = self
            .file
            .metadata()
            .map_err(|e| FsError::from_io("stat", self.name.as_str(), e))?;
        Ok(to_metadata(&self.name, &meta))
    }

    fn close(self: Box<Self>) -> Result<(), FsError> {
        if self.writable {
            self.file
                .sync_all()
                .map_err(|e| FsError::from_io("close", self.name.as_str(), e))?;
        }
        Ok(())
    }

    fn as_seek(&mut self) -> Option<&mut dyn FileSeek> {
        Some(self)
    }

    fn as_read_at(&mut self) -> Option<&mut dyn FileReadAt> {
        if cfg!(unix) {
            Some(self)
        } else {
            None
        }
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
        if cfg!(unix) {
            Some(self)
        } else {
            None
        }
    }

    fn as_chtimes(&mut self) -> Option<&mut dyn FileChtimes> {
        Some(self)
    }
}

impl FileSeek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, FsError> {
        self.file
            .seek(pos)
            .map_err(|e| FsError::from_io("seek", self.name.as_str(), e))
    }
}

impl FileReadAt for FileHandle {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, FsError> {
        #[cfg(unix)]
        let result = std::os::unix::fs::FileExt::read_at(&self.file, buf, offset);
        #[cfg(not(unix))]
        let result: io::Result<usize> = {
            let _ = (buf, offset);
            Err(io::ErrorKind::Unsupported.into())
        };
        result.map_err(|e| FsError::from_io("read", self.name.as_str(), e))
    }
}

impl FileWrite for FileHandle {
    fn write(&mut self, buf: &[u8]) -> Result<usize, FsError> {
        self.file
            .write(buf)
            .map_err(|e| FsError::from_io("write", self.name.as_str(), e))
    }
}

impl FileTruncate for FileHandle {
    fn truncate(&mut self, size: u64) -> Result<(), FsError> {
        self.file
            .set_len(size)
            .map_err(|e| FsError::from_io("truncate", self.name.as_str(), e))
    }
}

impl FileChmod for FileHandle {
    fn chmod(&mut self, mode: u32) -> Result<(), FsError> {
        let fail = |e| FsError::from_io("chmod", self.name.as_str(), e);
        let mut perms = self.file.metadata().map_err(fail)?.permissions();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            perms.set_mode(mode & 0o777);
        }
        #[cfg(not(unix))]
        perms.set_readonly(mode & 0o200 == 0);
        self.file.set_permissions(perms).map_err(fail)
    }
}

impl FileChown for FileHandle {
    fn chown(&mut self, uid: i64, gid: i64) -> Result<(), FsError> {
        let uid = owner_id("chown", &self.name, uid)?;
        let gid = owner_id("chown", &self.name, gid)?;
        #[cfg(unix)]
        let result = std::os::unix::fs::fchown(&self.file, uid, gid);
        #[cfg(not(unix))]
        let result: io::Result<()> = {
            let _ = (uid, gid);
            Err(io::ErrorKind::Unsupported.into())
        };
        result.map_err(|e| FsError::from_io("chown", self.name.as_str(), e))
    }
}

impl FileChtimes for FileHandle {
    fn chtimes(&mut self, atime: SystemTime, mtime: SystemTime) -> Result<(), FsError> {
        filetime::set_file_handle_times(&self.file, Some(file_time(atime)), Some(file_time(mtime)))
            .map_err(|e| FsError::from_io("chtimes", self.name.as_str(), e))
    }
}

/// Open directory. Listing and metadata go through the host path.
struct DirHandle {
    name: String,
    host: PathBuf,
}

impl File for DirHandle {
    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, FsError> {
        Err(FsError::new("read", self.name.as_str(), ErrorKind::Invalid))
    }

    fn stat(&self) -> Result<Metadata, FsError> {
        let meta = fs::metadata(&self.host)
            .map_err(|e| FsError::from_io("stat", self.name.as_str(), e))?;
        Ok(to_metadata(&self.name, &meta))
    }

    fn close(self: Box<Self>) -> Result<(), FsError> {
        Ok(())
    }

    fn as_read_dir(&mut self) -> Option<&mut dyn FileReadDir> {
        Some(self)
    }
}

impl FileReadDir for DirHandle {
    fn read_dir(&mut self) -> Result<Vec<DirEntry>, FsError> {
        list_dir(&self.name, &self.host)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn setup() -> (tempfile::TempDir, DirFs) {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("hello.txt"), b"hello").unwrap();
        fs::create_dir(temp.path().join("dir")).unwrap();
        fs::write(temp.path().join("dir/a.txt"), b"a").unwrap();
        let fsys = DirFs::new(temp.path());
        (temp, fsys)
    }

    #[test]
    fn stat_and_read() {
        let (_temp, fsys) = setup();
        let meta = fsys.stat("hello.txt").unwrap();
        assert_eq!(meta.size, 5);
        assert_eq!(meta.name, "hello.txt");
        assert!(fsys.stat(".").unwrap().is_dir());
        assert_eq!(fsys.read_file("dir/a.txt").unwrap(), b"a");
    }

    #[test]
    fn missing_paths_are_not_exist() {
        let (_temp, fsys) = setup();
        let err = fsys.stat("nope").unwrap_err();
        assert!(err.is(ErrorKind::NotExist));
        assert_eq!(err.path(), "nope");
    }

    #[test]
    fn invalid_names_never_reach_the_host() {
        let (_temp, fsys) = setup();
        for bad in ["../hello.txt", "/etc/passwd", "dir/", ""] {
            let err = fsys.stat(bad).unwrap_err();
            assert!(err.is(ErrorKind::Invalid), "{bad}");
        }
    }

    #[test]
    fn read_dir_is_sorted() {
        let (_temp, fsys) = setup();
        let names: Vec<_> = fsys.read_dir(".").unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, ["dir", "hello.txt"]);
        let err = fsys.read_dir("hello.txt").unwrap_err();
        assert!(err.kind().is_none() || err.is(ErrorKind::NotADirectory));
    }

    #[test]
    fn directory_handle_lists_entries() {
        let (_temp, fsys) = setup();
        let mut dir = fsys.open("dir").unwrap();
        assert!(dir.stat().unwrap().is_dir());
        let entries = dir.as_read_dir().unwrap().read_dir().unwrap();
        assert_eq!(entries[0].name, "a.txt");
        dir.close().unwrap();
    }

    #[test]
    fn open_file_write_and_exclusive() {
        let (temp, fsys) = setup();
        let mut file = fsys.open_file("new.txt", OpenFlags::WRITE, 0o644).unwrap();
        file.as_write().unwrap().write(b"fresh").unwrap();
        file.close().unwrap();
        assert_eq!(fs::read(temp.path().join("new.txt")).unwrap(), b"fresh");

        let err = fsys.open_file("new.txt", OpenFlags::CREATE_NEW, 0o644).err().unwrap();
        assert!(err.is(ErrorKind::Exist));

        let err = fsys.open_file("dir", OpenFlags::WRITE, 0o644).err().unwrap();
        assert!(err.is(ErrorKind::NotADirectory));
    }

    #[test]
    fn close_syncs_written_handles() {
        let (temp, fsys) = setup();
        let mut file = fsys.open_file("hello.txt", OpenFlags::APPEND, 0).unwrap();
        file.as_write().unwrap().write(b", world").unwrap();
        file.close().unwrap();
        assert_eq!(fs::read(temp.path().join("hello.txt")).unwrap(), b"hello, world");

        fsys.open("hello.txt").unwrap().close().unwrap();
    }

    #[test]
    fn seek_then_write_and_read() {
        let (temp, fsys) = setup();
        let mut file = fsys.open_file("hello.txt", OpenFlags::READ_WRITE, 0).unwrap();
        assert_eq!(file.as_seek().unwrap().seek(SeekFrom::End(0)).unwrap(), 5);
        file.as_write().unwrap().write(b"!").unwrap();
        assert_eq!(file.as_seek().unwrap().seek(SeekFrom::Start(1)).unwrap(), 1);
        let mut buf = [0u8; 3];
        assert_eq!(file.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"ell");
        assert!(file.as_seek().unwrap().seek(SeekFrom::Current(-10)).is_err());
        file.close().unwrap();
        assert_eq!(fs::read(temp.path().join("hello.txt")).unwrap(), b"hello!");
    }

    #[cfg(unix)]
    #[test]
    fn read_at_leaves_position_alone() {
        let (_temp, fsys) = setup();
        let mut file = fsys.open("hello.txt").unwrap();
        let mut buf = [0u8; 3];
        assert_eq!(file.as_read_at().unwrap().read_at(&mut buf, 2).unwrap(), 3);
        assert_eq!(&buf, b"llo");
        assert_eq!(file.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"hel");
        file.close().unwrap();
    }

    #[test]
    fn directory_handles_do_not_seek() {
        let (_temp, fsys) = setup();
        let mut dir = fsys.open("dir").unwrap();
        assert!(dir.as_seek().is_none());
        assert!(dir.as_read_at().is_none());
    }

    #[test]
    fn mkdir_remove_rename() {
        let (temp, fsys) = setup();
        fsys.mkdir("made", 0o755).unwrap();
        assert!(fsys.mkdir("made", 0o755).unwrap_err().is(ErrorKind::Exist));
        fsys.rename("made", "renamed").unwrap();
        assert!(temp.path().join("renamed").is_dir());
        fsys.remove("renamed").unwrap();
        assert!(fsys.remove("dir").is_err());
        fsys.remove_all("dir").unwrap();
        assert!(!temp.path().join("dir").exists());
        assert!(fsys.remove_all("dir").unwrap_err().is(ErrorKind::NotExist));
    }

    #[test]
    fn rename_missing_reports_both_names() {
        let (_temp, fsys) = setup();
        let err = fsys.rename("ghost", "other").unwrap_err();
        assert!(matches!(err, FsError::Link { kind: ErrorKind::NotExist, .. }));
    }

    #[test]
    fn truncate_and_chtimes() {
        let (temp, fsys) = setup();
        fsys.truncate("hello.txt", 2).unwrap();
        assert_eq!(fs::read(temp.path().join("hello.txt")).unwrap(), b"he");

        let when = UNIX_EPOCH + Duration::from_secs(1_000_000);
        fsys.chtimes("hello.txt", when, when).unwrap();
        assert_eq!(fsys.stat("hello.txt").unwrap().modified, when);
    }

    #[cfg(unix)]
    #[test]
    fn chmod_by_path_and_handle() {
        let (_temp, fsys) = setup();
        fsys.chmod("hello.txt", 0o600).unwrap();
        assert_eq!(fsys.stat("hello.txt").unwrap().mode.perm(), 0o600);

        let mut file = fsys.open("hello.txt").unwrap();
        file.as_chmod().unwrap().chmod(0o640).unwrap();
        assert_eq!(file.stat().unwrap().mode.perm(), 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn chown_to_current_owner_succeeds() {
        let (_temp, fsys) = setup();
        let meta = fsys.stat("hello.txt").unwrap();
        fsys.chown("hello.txt", i64::from(meta.uid), -1).unwrap();
        fsys.lchown("hello.txt", -1, i64::from(meta.gid)).unwrap();
        assert!(fsys.chown("hello.txt", -5, -1).unwrap_err().is(ErrorKind::Invalid));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_map_back_to_root_relative_names() {
        let (_temp, fsys) = setup();
        fsys.symlink("dir/a.txt", "link").unwrap();
        assert_eq!(fsys.read_link("link").unwrap(), "dir/a.txt");
        assert!(fsys.lstat("link").unwrap().is_symlink());
        assert!(fsys.stat("link").unwrap().is_file());
    }

    #[cfg(unix)]
    #[test]
    fn hard_links_are_the_same_file() {
        let (_temp, fsys) = setup();
        fsys.hard_link("hello.txt", "again.txt").unwrap();
        let a = fsys.stat("hello.txt").unwrap();
        let b = fsys.stat("again.txt").unwrap();
        assert!(fsys.same_file(&a, &b));
        assert!(!fsys.same_file(&a, &fsys.stat("dir/a.txt").unwrap()));
    }
}
