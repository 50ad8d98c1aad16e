use std::path::PathBuf;

use pairtree_codec::CodecError;
use pairtree_store::StoreError;
use thiserror::Error;

/// Errors from directory readers and writers.
#[derive(Debug, Error)]
pub enum FsError {
    /// The target pairtree root already exists; trees are never merged.
    #[error("pairtree root already exists: {}", path.display())]
    RootAlreadyExists { path: PathBuf },

    /// An identifier does not start with the configured prefix.
    #[error("identifier {identifier:?} does not start with prefix {prefix:?}")]
    PrefixMismatch { identifier: String, prefix: String },

    /// A containing directory must be an absolute path.
    #[error("containing directory must be absolute: {}", path.display())]
    NotAbsolute { path: PathBuf },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FsResult<T> = Result<T, FsError>;
