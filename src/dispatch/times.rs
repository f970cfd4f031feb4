//! Time dispatch.

use std::time::SystemTime;

use tracing::trace;

use super::{unsupported, with_file};
use crate::path::check_path;
use crate::{Fs, FsError};

/// Set the access and modification times of `path`.
///
/// Falls back to [`FileChtimes`](crate::FileChtimes) on an opened handle.
pub fn chtimes<F: Fs + ?Sized>(
    fsys: &F,
    path: &str,
    atime: SystemTime,
    mtime: SystemTime,
) -> Result<(), FsError> {
    check_path("chtimes", path)?;
    if let Some(fsys) = fsys.as_chtimes() {
        return fsys.chtimes(path, atime, mtime);
    }
    trace!(path, "chtimes through open handle");
    with_file(fsys.open(path)?, |file| match file.as_chtimes() {
        Some(file) => file.chtimes(atime, mtime),
        None => Err(unsupported("chtimes", path)),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{ErrorKind, MapFile, MapFs};

    #[test]
    fn chtimes_through_handle() {
        let fs = MapFs::new();
        fs.insert("log.txt", MapFile::file(Vec::new(), 0o644));
        let atime = SystemTime::UNIX_EPOCH + Duration::from_secs(60);
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(120);

        chtimes(&fs, "log.txt", atime, mtime).unwrap();
        let file = fs.get("log.txt").unwrap();
        assert_eq!(file.accessed, atime);
        assert_eq!(file.modified, mtime);
    }

    #[test]
    fn chtimes_on_missing_file() {
        let fs = MapFs::new();
        let now = SystemTime::now();
        let err = chtimes(&fs, "ghost", now, now).unwrap_err();
        assert!(err.is(ErrorKind::NotExist));
    }
}
