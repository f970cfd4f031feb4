//! # Dispatch
//!
//! One free function per operation. Each validates its path arguments, then
//! picks the first route that applies:
//!
//! 1. the filesystem's own capability, called exactly once with the caller's arguments
//! 2. a capability of a file handle obtained by opening the path
//! 3. a synthesized fallback built from more primitive dispatch calls
//! 4. an [`ErrorKind::Unsupported`] error naming the operation and path
//!
//! | Operation | Handle route | Synthesized fallback |
//! |-----------|--------------|----------------------|
//! | [`stat`] | `File::stat` | |
//! | [`read_dir`] | [`FileReadDir`](crate::FileReadDir) | |
//! | [`read_file`] | `File::read` | |
//! | [`glob`] | | directory walk with [`path_match`](crate::path_match) |
//! | [`open_file`] | | plain `open` for read-only flags |
//! | [`mkdir_all`] | | repeated [`mkdir`] |
//! | [`remove_all`] | | recursive [`remove`] |
//! | [`truncate`] | [`FileTruncate`](crate::FileTruncate) | |
//! | [`chmod`], [`chown`], [`chtimes`] | matching `File*` capability | |
//! | [`sub`] | | [`SubFs`](crate::SubFs) |
//! | [`walk_dir`] | | [`lstat`] (or [`stat`]) and [`read_dir`] |
//!
//! Errors from a native capability are returned unchanged.

use tracing::debug;

use crate::{ErrorKind, File, FsError};

mod dir;
mod link;
mod permissions;
mod read;
mod times;
mod view;
mod walk;
mod write;

pub use dir::{mkdir, mkdir_all, remove, remove_all};
pub use link::{hard_link, read_link, symlink};
pub use permissions::{chmod, chown, lchown};
pub use read::{glob, lstat, read_dir, read_file, stat};
pub use times::chtimes;
pub use view::{same_file, sub};
pub use walk::{walk_dir, WalkControl};
pub use write::{open_file, rename, truncate, write, write_file};

/// Build (and log) the error for an operation no route could serve.
pub(crate) fn unsupported(op: &'static str, path: &str) -> FsError {
    debug!(op, path, "operation not supported");
    FsError::new(op, path, ErrorKind::Unsupported)
}

pub(crate) fn unsupported_link(op: &'static str, old: &str, new: &str) -> FsError {
    debug!(op, old, new, "operation not supported");
    FsError::link(op, old, new, ErrorKind::Unsupported)
}

/// Run `f` on an open handle and close it afterwards, whatever `f` returned.
///
/// A close failure is only reported when `f` itself succeeded.
pub(crate) fn with_file<T, F>(mut file: Box<dyn File>, f: F) -> Result<T, FsError>
where
    F: FnOnce(&mut dyn File) -> Result<T, FsError>,
{
    let result = f(file.as_mut());
    let closed = file.close();
    match result {
        Ok(value) => closed.map(|()| value),
        Err(err) => Err(err),
    }
}
