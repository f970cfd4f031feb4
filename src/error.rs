//! Error types for filesystem dispatch.

use std::fmt;
use std::io;

/// The closed set of causes a filesystem error can carry.
///
/// Every error produced by this crate, or returned by a well-behaved
/// filesystem, reports one of these causes. Callers test for a cause with
/// [`FsError::is`] regardless of whether the operation ran natively or
/// through a synthesized fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The named file does not exist.
    NotExist,
    /// The named file already exists.
    Exist,
    /// Permission denied.
    Permission,
    /// Invalid argument, including invalid path names.
    Invalid,
    /// A path component, or the target itself, is not a directory.
    NotADirectory,
    /// The directory is not empty.
    DirectoryNotEmpty,
    /// Neither the filesystem nor the open file supports the operation.
    Unsupported,
}

impl ErrorKind {
    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotExist => "file does not exist",
            ErrorKind::Exist => "file already exists",
            ErrorKind::Permission => "permission denied",
            ErrorKind::Invalid => "invalid argument",
            ErrorKind::NotADirectory => "not a directory",
            ErrorKind::DirectoryNotEmpty => "directory not empty",
            ErrorKind::Unsupported => "unsupported operation",
        }
    }

    /// Map a host I/O error kind onto the closed set, if it has a counterpart.
    pub fn from_io(kind: io::ErrorKind) -> Option<Self> {
        match kind {
            io::ErrorKind::NotFound => Some(ErrorKind::NotExist),
            io::ErrorKind::AlreadyExists => Some(ErrorKind::Exist),
            io::ErrorKind::PermissionDenied => Some(ErrorKind::Permission),
            io::ErrorKind::InvalidInput => Some(ErrorKind::Invalid),
            io::ErrorKind::NotADirectory => Some(ErrorKind::NotADirectory),
            io::ErrorKind::DirectoryNotEmpty => Some(ErrorKind::DirectoryNotEmpty),
            io::ErrorKind::Unsupported => Some(ErrorKind::Unsupported),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filesystem error carrying the operation, the path(s) involved and a cause.
///
/// # Examples
///
/// ```rust
/// use anyfs_ops::{ErrorKind, FsError};
///
/// let err = FsError::new("open", "missing.txt", ErrorKind::NotExist);
/// assert_eq!(err.to_string(), "open missing.txt: file does not exist");
/// assert!(err.is(ErrorKind::NotExist));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// An operation on a single path failed.
    #[error("{op} {path}: {kind}")]
    Path {
        /// The operation that failed.
        op: &'static str,
        /// The path the operation was applied to.
        path: String,
        /// Why it failed.
        kind: ErrorKind,
    },

    /// An operation on two paths (rename, symlink, link) failed.
    #[error("{op} {old} {new}: {kind}")]
    Link {
        /// The operation that failed.
        op: &'static str,
        /// The source path.
        old: String,
        /// The destination path.
        new: String,
        /// Why it failed.
        kind: ErrorKind,
    },

    /// A parent filesystem reported a path outside the sub-view root.
    #[error("{op}: invalid result from parent filesystem: {path} not in {root}")]
    OutsideRoot {
        /// The operation that produced the result.
        op: &'static str,
        /// The offending path, as reported by the parent.
        path: String,
        /// The sub-view root.
        root: String,
    },

    /// A host I/O error without a counterpart in [`ErrorKind`].
    #[error("{op} {path}: {source}")]
    Io {
        /// The operation that failed.
        op: &'static str,
        /// The path the operation was applied to.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Build a single-path error.
    pub fn new(op: &'static str, path: impl Into<String>, kind: ErrorKind) -> Self {
        FsError::Path {
            op,
            path: path.into(),
            kind,
        }
    }

    /// Build a two-path error.
    pub fn link(
        op: &'static str,
        old: impl Into<String>,
        new: impl Into<String>,
        kind: ErrorKind,
    ) -> Self {
        FsError::Link {
            op,
            old: old.into(),
            new: new.into(),
            kind,
        }
    }

    /// Convert a host I/O error, keeping the closed cause when one applies.
    pub fn from_io(op: &'static str, path: impl Into<String>, source: io::Error) -> Self {
        match ErrorKind::from_io(source.kind()) {
            Some(kind) => FsError::new(op, path, kind),
            None => FsError::Io {
                op,
                path: path.into(),
                source,
            },
        }
    }

    /// The cause of this error, if it belongs to the closed set.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            FsError::Path { kind, .. } | FsError::Link { kind, .. } => Some(*kind),
            FsError::OutsideRoot { .. } => Some(ErrorKind::Invalid),
            FsError::Io { source, .. } => ErrorKind::from_io(source.kind()),
        }
    }

    /// Returns `true` if this error has the given cause.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind() == Some(kind)
    }

    /// The operation name recorded in this error.
    pub fn op(&self) -> &'static str {
        match self {
            FsError::Path { op, .. }
            | FsError::Link { op, .. }
            | FsError::OutsideRoot { op, .. }
            | FsError::Io { op, .. } => op,
        }
    }

    /// The (first) path recorded in this error.
    pub fn path(&self) -> &str {
        match self {
            FsError::Path { path, .. }
            | FsError::OutsideRoot { path, .. }
            | FsError::Io { path, .. } => path,
            FsError::Link { old, .. } => old,
        }
    }

    /// Rewrite every reported path with `f`.
    ///
    /// Used by wrapping filesystems to translate paths between namespaces.
    /// The root of an [`FsError::OutsideRoot`] is left alone.
    pub fn map_paths<F>(self, f: F) -> Self
    where
        F: Fn(String) -> String,
    {
        match self {
            FsError::Path { op, path, kind } => FsError::Path {
                op,
                path: f(path),
                kind,
            },
            FsError::Link { op, old, new, kind } => FsError::Link {
                op,
                old: f(old),
                new: f(new),
                kind,
            },
            FsError::OutsideRoot { op, path, root } => FsError::OutsideRoot {
                op,
                path: f(path),
                root,
            },
            FsError::Io { op, path, source } => FsError::Io {
                op,
                path: f(path),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_error_display() {
        let err = FsError::new("mkdir", "a/b", ErrorKind::Exist);
        assert_eq!(err.to_string(), "mkdir a/b: file already exists");
    }

    #[test]
    fn link_error_display() {
        let err = FsError::link("rename", "a", "b", ErrorKind::Unsupported);
        assert_eq!(err.to_string(), "rename a b: unsupported operation");
        assert_eq!(err.path(), "a");
    }

    #[test]
    fn from_io_maps_known_kinds() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = FsError::from_io("stat", "x", io_err);
        assert!(matches!(
            err,
            FsError::Path {
                kind: ErrorKind::NotExist,
                ..
            }
        ));
    }

    #[test]
    fn from_io_keeps_unknown_kinds() {
        let io_err = io::Error::other("disk on fire");
        let err = FsError::from_io("read", "x", io_err);
        assert!(matches!(err, FsError::Io { .. }));
        assert_eq!(err.kind(), None);
        assert_eq!(err.op(), "read");
    }

    #[test]
    fn outside_root_is_invalid() {
        let err = FsError::OutsideRoot {
            op: "glob",
            path: "elsewhere/x".into(),
            root: "sub".into(),
        };
        assert!(err.is(ErrorKind::Invalid));
        assert!(err.to_string().contains("elsewhere/x"));
    }

    #[test]
    fn map_paths_rewrites_both_link_paths() {
        let err = FsError::link("link", "sub/a", "sub/b", ErrorKind::Exist);
        let err = err.map_paths(|p| p.trim_start_matches("sub/").to_string());
        match err {
            FsError::Link { old, new, .. } => {
                assert_eq!(old, "a");
                assert_eq!(new, "b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FsError>();
    }
}
