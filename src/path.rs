//! # Path Names
//!
//! Path names passed to every dispatch function are UTF-8, unrooted,
//! slash-separated sequences of elements like `x/y/z`. Elements must not be
//! empty, `.` or `..`, except that the root directory itself is named `.`.
//! Paths must not start or end with a slash.
//!
//! Paths are slash-separated on every platform. Backslashes and colons are
//! ordinary characters here; filesystems must not treat them as separators.

use crate::{ErrorKind, FsError};

/// The name of the root directory.
pub const ROOT: &str = ".";

/// Reports whether `name` is a valid path name.
///
/// # Examples
///
/// ```rust
/// use anyfs_ops::valid_path;
///
/// assert!(valid_path("."));
/// assert!(valid_path("x/y/z"));
/// assert!(!valid_path("/x"));
/// assert!(!valid_path("x/"));
/// assert!(!valid_path("x/./y"));
/// assert!(!valid_path("x/../y"));
/// assert!(!valid_path(""));
/// ```
pub fn valid_path(name: &str) -> bool {
    if name == ROOT {
        return true;
    }
    name.split('/')
        .all(|elem| !elem.is_empty() && elem != "." && elem != "..")
}

/// Fail with an [`ErrorKind::Invalid`] error tagged `op` unless `name` is valid.
pub fn check_path(op: &'static str, name: &str) -> Result<(), FsError> {
    if valid_path(name) {
        Ok(())
    } else {
        Err(FsError::new(op, name, ErrorKind::Invalid))
    }
}

/// Like [`check_path`] for operations taking two names, failing with an
/// [`FsError::Link`] that carries both.
pub fn check_link_paths(op: &'static str, old: &str, new: &str) -> Result<(), FsError> {
    if valid_path(old) && valid_path(new) {
        Ok(())
    } else {
        Err(FsError::link(op, old, new, ErrorKind::Invalid))
    }
}

/// Join two valid path names.
///
/// The root `.` is the identity on either side, so `join(".", "a")` is `a`
/// and `join("a", ".")` is `a`.
pub fn join(dir: &str, name: &str) -> String {
    match (dir, name) {
        (ROOT, _) => name.to_string(),
        (_, ROOT) => dir.to_string(),
        _ => format!("{dir}/{name}"),
    }
}

/// Map `name`, which should lie under `dir`, back to the suffix after `dir`.
///
/// Returns `None` when `name` is neither `dir` itself nor below it.
pub fn shorten<'a>(dir: &str, name: &'a str) -> Option<&'a str> {
    if dir == ROOT {
        return Some(name);
    }
    if name == dir {
        return Some(ROOT);
    }
    name.strip_prefix(dir)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|rest| !rest.is_empty())
}

/// Split `name` into its parent directory and final element.
///
/// The parent of a single element is the root `.`.
pub fn split(name: &str) -> (&str, &str) {
    match name.rfind('/') {
        Some(i) => (&name[..i], &name[i + 1..]),
        None => (ROOT, name),
    }
}

/// Final element of `name`.
pub fn base(name: &str) -> &str {
    split(name).1
}
