use std::path::PathBuf;

use pairtree_codec::CodecError;

use crate::traits::OpenMode;

/// Errors from Pairtree model and write operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The source behind a byte stream cannot be opened in this mode.
    #[error("source cannot be opened for {mode}")]
    NotOpenable { mode: OpenMode },

    /// An object already holds a byte stream at this address.
    #[error("intra-object address collision: {}", address.display())]
    AddressCollision { address: PathBuf },

    /// Two objects in one collection share an identifier and so a directory.
    #[error("duplicate object identifier: {identifier:?}")]
    DuplicateIdentifier { identifier: String },

    /// The address is empty, absolute, or escapes the object directory.
    #[error("invalid intra-object address: {}", address.display())]
    InvalidAddress { address: PathBuf },

    /// Expected a regular file.
    #[error("{} is not a file", path.display())]
    NotAFile { path: PathBuf },

    /// Expected a directory.
    #[error("{} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// A path that should be relative to a root is not beneath it.
    #[error("{} is not under {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// The encapsulation name could be mistaken for a shard directory.
    #[error("invalid encapsulation directory name: {name:?}")]
    InvalidEncapsulation { name: String },

    /// A file was found where only shard directories or objects belong.
    #[error("unencapsulated file in pairtree: {}", path.display())]
    UnencapsulatedFile { path: PathBuf },

    /// The containing directory or root directory name is not set.
    #[error("pairtree root requires both a containing directory and a root directory name")]
    MissingRoot,

    /// Identifier or path decoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Recursive directory walk failed.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// I/O error from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
