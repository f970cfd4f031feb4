//! # anyfs-ops
//!
//! Capability-probing operations for **any filesystem**, even one that can
//! only open files.
//!
//! A filesystem implements the single required method of [`Fs`] and opts in
//! to any subset of small capability traits. The functions exported here
//! look for those capabilities and, when a filesystem lacks one, fall back
//! to an open file handle or to an algorithm built from simpler operations.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use anyfs_ops::{mkdir_all, read_dir, remove_all, stat, write_file, MapFs};
//!
//! let fs = MapFs::new();
//! mkdir_all(&fs, "logs/2024/01", 0o755).unwrap();
//! write_file(&fs, "logs/2024/01/app.log", b"started", 0o644).unwrap();
//!
//! assert!(stat(&fs, "logs/2024").unwrap().is_dir());
//! assert_eq!(read_dir(&fs, "logs/2024/01").unwrap()[0].name, "app.log");
//!
//! remove_all(&fs, "logs").unwrap();
//! assert!(stat(&fs, "logs").is_err());
//! ```
//!
//! ---
//!
//! ## Routing
//!
//! Every operation validates its path first, then tries, in order:
//!
//! 1. the whole-filesystem capability (e.g. [`FsChown`]),
//! 2. the capability on an open handle (e.g. [`FileChown`]),
//! 3. a synthesized fallback ([`mkdir_all`] and [`remove_all`] only),
//! 4. an [`ErrorKind::Unsupported`] error naming the operation and path.
//!
//! Fallbacks call back into these same functions, so wrappers such as
//! [`SubFs`] take part in them transparently.
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Fs`] | Minimal filesystem: open by path, plus capability queries |
//! | [`File`] | Open file or directory: read, stat, close |
//! | [`FsError`] | Error carrying operation, path(s) and an [`ErrorKind`] |
//! | [`Metadata`] | Size, mode, times, ownership and identity of a file |
//! | [`DirEntry`] | Single directory listing entry |
//! | [`SubFs`] | View of a parent filesystem rooted at one of its directories |
//! | [`MapFs`] | In-memory filesystem |
//! | `DirFs` | Host directory tree (feature `dirfs`) |
//!
//! ---
//!
//! ## Paths
//!
//! Paths are slash-separated and relative to the filesystem root, which is
//! named `"."`. They never start or end with `/` and contain no empty, `.`
//! or `..` elements. See [`valid_path`].
//!
//! ---
//!
//! ## Thread Safety
//!
//! [`Fs`] requires `Send + Sync`. Every filesystem capability extends it
//! and takes `&self`. This crate keeps no state of its own: concurrent mutation of a
//! filesystem while a recursive operation walks it is the caller's problem.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `dirfs` | Host directory backend (`DirFs`), on by default |
//! | `serde` | Serialization for [`Metadata`], [`DirEntry`], [`FileMode`], etc. |

// Private modules
mod dispatch;
mod error;
mod ext;
mod fallback;
mod layer;
mod mapfs;
mod pattern;
mod sub;
mod traits;
mod types;

#[cfg(feature = "dirfs")]
mod dirfs;

pub mod path;

// Public re-exports - errors
pub use error::{ErrorKind, FsError};

// Public re-exports - core types
pub use types::{DirEntry, FileId, FileMode, FileType, Metadata, OpenFlags};

// Public re-exports - paths and patterns
pub use path::{check_link_paths, check_path, valid_path, ROOT};
pub use pattern::{has_meta, path_match};

// Public re-exports - core traits
pub use traits::{File, Fs};

// Public re-exports - filesystem capabilities
pub use traits::{
    FsChmod, FsChown, FsChtimes, FsGlob, FsHardLink, FsLchown, FsLstat, FsMkdir, FsMkdirAll,
    FsOpenFile, FsReadDir, FsReadFile, FsReadLink, FsRemove, FsRemoveAll, FsRename, FsSameFile,
    FsStat, FsSub, FsSymlink, FsTruncate,
};

// Public re-exports - handle capabilities
pub use traits::{
    FileChmod, FileChown, FileChtimes, FileReadAt, FileReadDir, FileSeek, FileTruncate, FileWrite,
};

// Public re-exports - operations
pub use dispatch::{
    chmod, chown, chtimes, glob, hard_link, lchown, lstat, mkdir, mkdir_all, open_file, read_dir,
    read_file, read_link, remove, remove_all, rename, same_file, stat, sub, symlink, truncate,
    walk_dir, write, write_file, WalkControl,
};

// Public re-exports - filesystems and composition
pub use ext::FsExt;
pub use layer::{Layer, LayerExt, SubLayer};
pub use mapfs::{MapFile, MapFs};
pub use sub::SubFs;

#[cfg(feature = "dirfs")]
pub use dirfs::DirFs;
