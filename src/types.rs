//! Core value types shared by filesystems and dispatch.

use std::time::SystemTime;

use crate::{ErrorKind, FsError};

/// File mode: type bits plus Unix permission bits.
///
/// The nine least-significant bits are the `rwxrwxrwx` permissions; the
/// high bits mark the entry type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileMode(u32);

impl FileMode {
    /// Directory type bit.
    pub const DIR: Self = Self(1 << 31);
    /// Symbolic link type bit.
    pub const SYMLINK: Self = Self(1 << 27);
    /// Mask of all type bits.
    pub const TYPE: Self = Self(Self::DIR.0 | Self::SYMLINK.0);
    /// Mask of the Unix permission bits.
    pub const PERM: Self = Self(0o777);

    /// Create a mode from raw bits.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw mode bits.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Permission bits only.
    #[inline]
    pub const fn perm(&self) -> u32 {
        self.0 & Self::PERM.0
    }

    /// Type bits only.
    #[inline]
    pub const fn file_type(&self) -> FileType {
        if self.0 & Self::DIR.0 != 0 {
            FileType::Directory
        } else if self.0 & Self::SYMLINK.0 != 0 {
            FileType::Symlink
        } else {
            FileType::File
        }
    }

    /// Returns `true` if the directory bit is set.
    #[inline]
    pub const fn is_dir(&self) -> bool {
        self.0 & Self::DIR.0 != 0
    }

    /// Returns `true` if the symlink bit is set.
    #[inline]
    pub const fn is_symlink(&self) -> bool {
        self.0 & Self::SYMLINK.0 != 0
    }

    /// Same type bits, permissions replaced by `perm`.
    #[inline]
    pub const fn with_perm(&self, perm: u32) -> Self {
        Self((self.0 & !Self::PERM.0) | (perm & Self::PERM.0))
    }
}

impl From<u32> for FileMode {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl std::ops::BitOr for FileMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

/// Identity of a file within a filesystem (device and inode, or equivalent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileId {
    /// Device (or filesystem instance) number.
    pub dev: u64,
    /// Inode (or entry) number.
    pub ino: u64,
}

/// Metadata describing a file, as returned by `stat`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metadata {
    /// Base name of the file.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Mode and permission bits.
    pub mode: FileMode,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
    /// Last access time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub accessed: SystemTime,
    /// Owner user id.
    pub uid: u32,
    /// Owner group id.
    pub gid: u32,
    /// Identity, when the filesystem can report one.
    pub id: Option<FileId>,
}

impl Metadata {
    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }

    /// Returns `true` if this is a regular file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.mode.file_type() == FileType::File
    }

    /// Returns `true` if this is a symbolic link.
    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.mode.is_symlink()
    }

    /// Type of the entry.
    #[inline]
    pub fn file_type(&self) -> FileType {
        self.mode.file_type()
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: 0,
            mode: FileMode::from_bits(0o644),
            modified: SystemTime::UNIX_EPOCH,
            accessed: SystemTime::UNIX_EPOCH,
            uid: 0,
            gid: 0,
            id: None,
        }
    }
}

/// A directory entry returned from `read_dir`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirEntry {
    /// Name of the entry (base name only).
    pub name: String,
    /// Type of the entry.
    pub file_type: FileType,
    /// Full metadata of the entry.
    pub metadata: Metadata,
}

impl DirEntry {
    /// Build an entry from metadata, taking the name from it.
    pub fn from_metadata(metadata: Metadata) -> Self {
        Self {
            name: metadata.name.clone(),
            file_type: metadata.file_type(),
            metadata,
        }
    }

    /// Returns `true` if the entry is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

/// Flags for opening a file with [`open_file`](crate::open_file).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenFlags {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Create the file if it doesn't exist.
    pub create: bool,
    /// Together with `create`, fail if the file already exists.
    pub exclusive: bool,
    /// Truncate the file to zero length.
    pub truncate: bool,
    /// Writes go to the end of the file.
    pub append: bool,
}

impl OpenFlags {
    /// Read-only access.
    pub const READ: Self = Self {
        read: true,
        write: false,
        create: false,
        exclusive: false,
        truncate: false,
        append: false,
    };

    /// Write access with create and truncate.
    pub const WRITE: Self = Self {
        read: false,
        write: true,
        create: true,
        exclusive: false,
        truncate: true,
        append: false,
    };

    /// Read and write access to an existing file.
    pub const READ_WRITE: Self = Self {
        read: true,
        write: true,
        create: false,
        exclusive: false,
        truncate: false,
        append: false,
    };

    /// Write access, create only if the file is new.
    pub const CREATE_NEW: Self = Self {
        read: false,
        write: true,
        create: true,
        exclusive: true,
        truncate: false,
        append: false,
    };

    /// Append mode.
    pub const APPEND: Self = Self {
        read: false,
        write: true,
        create: true,
        exclusive: false,
        truncate: false,
        append: true,
    };

    /// Returns `true` if these flags only ask for reading.
    ///
    /// Flags with no access bits at all count as read-only.
    #[inline]
    pub fn is_read_only(&self) -> bool {
        !self.wants_write() && !self.create
    }

    /// Returns `true` if the flags request any kind of modification.
    #[inline]
    pub fn wants_write(&self) -> bool {
        self.write || self.append || self.truncate
    }
}

/// Interpret an ownership id argument, where `-1` keeps the current id.
pub(crate) fn owner_id(op: &'static str, path: &str, id: i64) -> Result<Option<u32>, FsError> {
    if id == -1 {
        return Ok(None);
    }
    u32::try_from(id)
        .map(Some)
        .map_err(|_| FsError::new(op, path, ErrorKind::Invalid))
}

#[cfg(feature = "serde")]
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_type_bits() {
        let dir = FileMode::DIR | FileMode::from_bits(0o755);
        assert!(dir.is_dir());
        assert_eq!(dir.perm(), 0o755);
        assert_eq!(dir.file_type(), FileType::Directory);

        let link = FileMode::SYMLINK | FileMode::from_bits(0o777);
        assert!(link.is_symlink());
        assert!(!link.is_dir());

        assert_eq!(FileMode::from_bits(0o644).file_type(), FileType::File);
    }

    #[test]
    fn with_perm_keeps_type() {
        let mode = (FileMode::DIR | FileMode::from_bits(0o700)).with_perm(0o1755);
        assert!(mode.is_dir());
        assert_eq!(mode.perm(), 0o755);
    }

    #[test]
    fn metadata_predicates() {
        let m = Metadata {
            mode: FileMode::DIR,
            ..Default::default()
        };
        assert!(m.is_dir());
        assert!(!m.is_file());
        assert!(Metadata::default().is_file());
    }

    #[test]
    fn dir_entry_takes_name_from_metadata() {
        let entry = DirEntry::from_metadata(Metadata {
            name: "sub".into(),
            mode: FileMode::DIR,
            ..Default::default()
        });
        assert_eq!(entry.name, "sub");
        assert!(entry.is_dir());
    }

    #[test]
    fn open_flags_constants() {
        assert!(OpenFlags::READ.is_read_only());
        assert!(OpenFlags::default().is_read_only());
        assert!(!OpenFlags::CREATE_NEW.is_read_only());
        assert!(!OpenFlags::READ.wants_write());
        assert!(OpenFlags::WRITE.wants_write());
        assert!(OpenFlags::WRITE.truncate);
        assert!(OpenFlags::CREATE_NEW.exclusive);
        assert!(!OpenFlags::READ_WRITE.create);
        assert!(OpenFlags::APPEND.append);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn metadata_serde_keeps_times() {
        let m = Metadata {
            name: "f".into(),
            modified: SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(42),
            ..Default::default()
        };
        let json = serde_json::to_string(&m).unwrap();
        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.modified, m.modified);
        assert_eq!(back.name, "f");
    }

    #[test]
    fn owner_id_keeps_minus_one() {
        assert_eq!(owner_id("chown", "f", -1).unwrap(), None);
        assert_eq!(owner_id("chown", "f", 1000).unwrap(), Some(1000));
        assert!(owner_id("chown", "f", -2).unwrap_err().is(ErrorKind::Invalid));
        assert!(owner_id("chown", "f", i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FileMode>();
        assert_send_sync::<Metadata>();
        assert_send_sync::<DirEntry>();
        assert_send_sync::<OpenFlags>();
    }
}
