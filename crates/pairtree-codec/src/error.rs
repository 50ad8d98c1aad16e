//! Error types for identifier decoding.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning sanitized strings or paths back into identifiers.
#[derive(Debug, Error)]
pub enum CodecError {
    /// A `^` escape marker was not followed by two hex digits.
    #[error("malformed escape in {input:?} at position {position}")]
    MalformedEscape { input: String, position: usize },

    /// The escaped bytes do not form valid UTF-8.
    #[error("escaped bytes in {input:?} are not valid UTF-8")]
    InvalidUtf8 { input: String },

    /// The path does not live under the given root.
    #[error("{} is not under root {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// The path contains a component that cannot be part of a shard path.
    #[error("invalid path component: {component:?}")]
    InvalidComponent { component: String },
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
