//! # Layer Trait
//!
//! Tower-style composition for filesystems.
//!
//! ## Overview
//!
//! A [`Layer`] holds configuration and wraps a filesystem into a new one:
//!
//! ```text
//! Filesystem ──▶ Layer::layer() ──▶ Wrapped filesystem
//! ```
//!
//! [`SubLayer`] is the layer form of [`sub`](crate::sub): it roots any
//! filesystem at one of its directories.
//!
//! ## Fluent Composition
//!
//! Use [`LayerExt`] for chaining:
//!
//! ```rust
//! use anyfs_ops::{read_file, LayerExt, MapFs, MapFile, SubLayer};
//!
//! let fs = MapFs::new();
//! fs.insert("srv/www/index.html", MapFile::file(b"home".to_vec(), 0o644));
//!
//! let www = fs
//!     .layer(SubLayer::new("srv").unwrap())
//!     .layer(SubLayer::new("www").unwrap());
//! assert_eq!(read_file(&www, "index.html").unwrap(), b"home");
//! ```

use std::sync::Arc;

use crate::path::check_path;
use crate::{Fs, FsError, SubFs};

/// A layer that wraps a filesystem to change what it exposes.
///
/// # Type Parameters
///
/// - `B`: The filesystem type being wrapped
///
/// `layer(self, backend)` consumes both the layer and the filesystem.
pub trait Layer<B> {
    /// The resulting filesystem type.
    type Backend;

    /// Wrap `backend` with this layer.
    fn layer(self, backend: B) -> Self::Backend;
}

/// Extension trait for fluent layer composition.
///
/// Provides `.layer()` on every [`Fs`].
pub trait LayerExt: Fs + Sized {
    /// Apply a layer to this filesystem.
    fn layer<L: Layer<Self>>(self, layer: L) -> L::Backend {
        layer.layer(self)
    }
}

impl<B: Fs> LayerExt for B {}

/// Layer producing a [`SubFs`] rooted at a fixed directory.
#[derive(Debug, Clone)]
pub struct SubLayer {
    dir: String,
}

impl SubLayer {
    /// A layer rooting filesystems at `dir`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Invalid`](crate::ErrorKind::Invalid) if `dir` is not a valid path
    pub fn new(dir: impl Into<String>) -> Result<Self, FsError> {
        let dir = dir.into();
        check_path("sub", &dir)?;
        Ok(Self { dir })
    }

    /// The directory new views are rooted at.
    pub fn dir(&self) -> &str {
        &self.dir
    }
}

impl<B: Fs + 'static> Layer<B> for SubLayer {
    type Backend = SubFs;

    fn layer(self, backend: B) -> SubFs {
        SubFs::from_valid(Arc::new(backend), self.dir)
    }
}
