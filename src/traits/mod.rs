//! # Filesystem Traits
//!
//! A filesystem implements the small core trait [`Fs`], which can only open
//! files. Everything else is an optional capability, expressed as a separate
//! trait and discovered at runtime through the `as_*` query methods on [`Fs`]
//! and [`File`].
//!
//! ## Capability Families
//!
//! | Family | Filesystem capabilities | Handle capabilities |
//! |--------|-------------------------|---------------------|
//! | Read | [`FsStat`], [`FsLstat`], [`FsReadDir`], [`FsReadFile`], [`FsGlob`] | [`FileReadDir`], [`FileSeek`], [`FileReadAt`] |
//! | Directories | [`FsMkdir`], [`FsMkdirAll`], [`FsRemove`], [`FsRemoveAll`] | |
//! | Write | [`FsOpenFile`], [`FsRename`], [`FsTruncate`] | [`FileWrite`], [`FileTruncate`] |
//! | Links | [`FsSymlink`], [`FsHardLink`], [`FsReadLink`] | |
//! | Permissions | [`FsChmod`], [`FsChown`], [`FsLchown`] | [`FileChmod`], [`FileChown`] |
//! | Times | [`FsChtimes`] | [`FileChtimes`] |
//! | Views | [`FsSameFile`], [`FsSub`] | |
//!
//! ## Advertising a Capability
//!
//! Implement the capability trait, then override the matching query to
//! return `Some(self)`. Queries left at their default report the capability
//! as absent:
//!
//! ```rust
//! use anyfs_ops::{File, Fs, FsError, FsMkdir, ErrorKind};
//!
//! struct Scratch;
//!
//! impl Fs for Scratch {
//!     fn open(&self, path: &str) -> Result<Box<dyn File>, FsError> {
//!         Err(FsError::new("open", path, ErrorKind::NotExist))
//!     }
//!
//!     fn as_mkdir(&self) -> Option<&dyn FsMkdir> {
//!         Some(self)
//!     }
//! }
//!
//! impl FsMkdir for Scratch {
//!     fn mkdir(&self, _path: &str, _perm: u32) -> Result<(), FsError> {
//!         Ok(())
//!     }
//! }
//!
//! let fs = Scratch;
//! assert!(fs.as_mkdir().is_some());
//! assert!(fs.as_chmod().is_none());
//! ```
//!
//! Callers should not invoke capability methods directly. The dispatch
//! functions at the crate root validate paths, pick the best available
//! route and synthesize fallbacks.
//!
//! ## Thread Safety
//!
//! [`Fs`] requires `Send + Sync` and every method takes `&self`, so
//! filesystems use interior mutability. Filesystem capabilities extend
//! [`Fs`] and inherit those bounds. [`File`] requires `Send` and handle
//! capabilities extend it; a handle is owned by one caller at a time.
//!
//! ## Object Safety
//!
//! Every trait here is object-safe and is normally used as `dyn Fs`,
//! `&dyn FsMkdir`, `Box<dyn File>` and so on.

use std::sync::Arc;

use crate::{FsError, Metadata};

mod fs_dir;
mod fs_link;
mod fs_permissions;
mod fs_read;
mod fs_times;
mod fs_view;
mod fs_write;

pub use fs_dir::{FsMkdir, FsMkdirAll, FsRemove, FsRemoveAll};
pub use fs_link::{FsHardLink, FsReadLink, FsSymlink};
pub use fs_permissions::{FileChmod, FileChown, FsChmod, FsChown, FsLchown};
pub use fs_read::{FileReadAt, FileReadDir, FileSeek, FsGlob, FsLstat, FsReadDir, FsReadFile, FsStat};
pub use fs_times::{FileChtimes, FsChtimes};
pub use fs_view::{FsSameFile, FsSub};
pub use fs_write::{FileTruncate, FileWrite, FsOpenFile, FsRename, FsTruncate};

/// A filesystem: a tree of files addressed by slash-separated path names.
///
/// The only required operation is [`open`](Fs::open). Every `as_*` method
/// reports whether the filesystem offers the corresponding capability.
pub trait Fs: Send + Sync {
    /// Open the named file for reading.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::NotExist`](crate::ErrorKind::NotExist) if the path does not exist
    /// - [`ErrorKind::Invalid`](crate::ErrorKind::Invalid) if the path is not valid
    fn open(&self, path: &str) -> Result<Box<dyn File>, FsError>;

    /// Metadata lookup.
    fn as_stat(&self) -> Option<&dyn FsStat> {
        None
    }

    /// Metadata lookup without following a final symlink.
    fn as_lstat(&self) -> Option<&dyn FsLstat> {
        None
    }

    /// Directory listing.
    fn as_read_dir(&self) -> Option<&dyn FsReadDir> {
        None
    }

    /// Whole-file reads.
    fn as_read_file(&self) -> Option<&dyn FsReadFile> {
        None
    }

    /// Pattern expansion.
    fn as_glob(&self) -> Option<&dyn FsGlob> {
        None
    }

    /// Opening with flags and permissions.
    fn as_open_file(&self) -> Option<&dyn FsOpenFile> {
        None
    }

    /// Single directory creation.
    fn as_mkdir(&self) -> Option<&dyn FsMkdir> {
        None
    }

    /// Recursive directory creation.
    fn as_mkdir_all(&self) -> Option<&dyn FsMkdirAll> {
        None
    }

    /// Single entry removal.
    fn as_remove(&self) -> Option<&dyn FsRemove> {
        None
    }

    /// Recursive removal.
    fn as_remove_all(&self) -> Option<&dyn FsRemoveAll> {
        None
    }

    /// Renaming.
    fn as_rename(&self) -> Option<&dyn FsRename> {
        None
    }

    /// Symbolic link creation.
    fn as_symlink(&self) -> Option<&dyn FsSymlink> {
        None
    }

    /// Hard link creation.
    fn as_hard_link(&self) -> Option<&dyn FsHardLink> {
        None
    }

    /// Reading symbolic link targets.
    fn as_read_link(&self) -> Option<&dyn FsReadLink> {
        None
    }

    /// Truncation by path.
    fn as_truncate(&self) -> Option<&dyn FsTruncate> {
        None
    }

    /// Permission changes by path.
    fn as_chmod(&self) -> Option<&dyn FsChmod> {
        None
    }

    /// Ownership changes by path.
    fn as_chown(&self) -> Option<&dyn FsChown> {
        None
    }

    /// Ownership changes that do not follow a final symlink.
    fn as_lchown(&self) -> Option<&dyn FsLchown> {
        None
    }

    /// Time changes by path.
    fn as_chtimes(&self) -> Option<&dyn FsChtimes> {
        None
    }

    /// File identity comparison.
    fn as_same_file(&self) -> Option<&dyn FsSameFile> {
        None
    }

    /// Native sub-views.
    fn as_sub(&self) -> Option<&dyn FsSub> {
        None
    }
}

/// An open file or directory handle.
///
/// Handles must be released with [`close`](File::close); dropping a handle
/// without closing it loses any error the close would have reported.
pub trait File: Send {
    /// Read up to `buf.len()` bytes, returning how many were read.
    ///
    /// `Ok(0)` means end of file.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError>;

    /// Metadata of the open file.
    fn stat(&self) -> Result<Metadata, FsError>;

    /// Release the handle.
    fn close(self: Box<Self>) -> Result<(), FsError>;

    /// Listing, when the handle is a directory.
    fn as_read_dir(&mut self) -> Option<&mut dyn FileReadDir> {
        None
    }

    /// Repositioning.
    fn as_seek(&mut self) -> Option<&mut dyn FileSeek> {
        None
    }

    /// Reads at an explicit offset.
    fn as_read_at(&mut self) -> Option<&mut dyn FileReadAt> {
        None
    }

    /// Writing.
    fn as_write(&mut self) -> Option<&mut dyn FileWrite> {
        None
    }

    /// Truncation.
    fn as_truncate(&mut self) -> Option<&mut dyn FileTruncate> {
        None
    }

    /// Permission changes.
    fn as_chmod(&mut self) -> Option<&mut dyn FileChmod> {
        None
    }

    /// Ownership changes.
    fn as_chown(&mut self) -> Option<&mut dyn FileChown> {
        None
    }

    /// Time changes.
    fn as_chtimes(&mut self) -> Option<&mut dyn FileChtimes> {
        None
    }
}

macro_rules! forward_fs {
    ($($wrapper:ident),*) => {$(
        impl<T: Fs + ?Sized> Fs for $wrapper<T> {
            fn open(&self, path: &str) -> Result<Box<dyn File>, FsError> {
                (**self).open(path)
            }
            fn as_stat(&self) -> Option<&dyn FsStat> {
                (**self).as_stat()
            }
            fn as_lstat(&self) -> Option<&dyn FsLstat> {
                (**self).as_lstat()
            }
            fn as_read_dir(&self) -> Option<&dyn FsReadDir> {
                (**self).as_read_dir()
            }
            fn as_read_file(&self) -> Option<&dyn FsReadFile> {
                (**self).as_read_file()
            }
            fn as_glob(&self) -> Option<&dyn FsGlob> {
                (**self).as_glob()
            }
            fn as_open_file(&self) -> Option<&dyn FsOpenFile> {
                (**self).as_open_file()
            }
            fn as_mkdir(&self) -> Option<&dyn FsMkdir> {
                (**self).as_mkdir()
            }
            fn as_mkdir_all(&self) -> Option<&dyn FsMkdirAll> {
                (**self).as_mkdir_all()
            }
            fn as_remove(&self) -> Option<&dyn FsRemove> {
                (**self).as_remove()
            }
            fn as_remove_all(&self) -> Option<&dyn FsRemoveAll> {
                (**self).as_remove_all()
            }
            fn as_rename(&self) -> Option<&dyn FsRename> {
                (**self).as_rename()
            }
            fn as_symlink(&self) -> Option<&dyn FsSymlink> {
                (**self).as_symlink()
            }
            fn as_hard_link(&self) -> Option<&dyn FsHardLink> {
                (**self).as_hard_link()
            }
            fn as_read_link(&self) -> Option<&dyn FsReadLink> {
                (**self).as_read_link()
            }
            fn as_truncate(&self) -> Option<&dyn FsTruncate> {
                (**self).as_truncate()
            }
            fn as_chmod(&self) -> Option<&dyn FsChmod> {
                (**self).as_chmod()
            }
            fn as_chown(&self) -> Option<&dyn FsChown> {
                (**self).as_chown()
            }
            fn as_lchown(&self) -> Option<&dyn FsLchown> {
                (**self).as_lchown()
            }
            fn as_chtimes(&self) -> Option<&dyn FsChtimes> {
                (**self).as_chtimes()
            }
            fn as_same_file(&self) -> Option<&dyn FsSameFile> {
                (**self).as_same_file()
            }
            fn as_sub(&self) -> Option<&dyn FsSub> {
                (**self).as_sub()
            }
        }
    )*};
}

forward_fs!(Arc, Box);
