//! Identifier codec for the Pairtree directory convention.
//!
//! A Pairtree maps an arbitrary string identifier onto a bounded-depth
//! directory path. The mapping runs in two stages:
//!
//! 1. **Sanitization** turns the identifier into a string that is safe to use
//!    as a filesystem component. Unsafe characters are escaped as `^xx`, and
//!    `/`, `:`, `.` are replaced by `=`, `+`, `,`.
//! 2. **Sharding** splits the sanitized string into consecutive two-character
//!    segments, each of which becomes one directory level.
//!
//! Both stages are exactly invertible, so for every identifier `id` and root
//! `r`:
//!
//! ```
//! use std::path::Path;
//! use pairtree_codec::{identifier_to_path, path_to_identifier};
//!
//! let root = Path::new("/data/pairtree_root");
//! let path = identifier_to_path("ark:/13030/xt12t3", Some(root));
//! assert_eq!(path_to_identifier(&path, Some(root)).unwrap(), "ark:/13030/xt12t3");
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error types for decoding
//! - [`sanitize`]: Character-level escape and substitution tables
//! - [`path`]: Shard splitting and path conversion

pub mod error;
pub mod path;
pub mod sanitize;

pub use error::{CodecError, CodecResult};
pub use path::{
    identifier_to_path, is_shard_name, path_to_identifier, shard, split_at_object_boundary,
    ObjectPath, SHARD_WIDTH,
};
pub use sanitize::{desanitize, sanitize};
