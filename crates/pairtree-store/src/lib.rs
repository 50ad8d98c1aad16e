//! Pairtree object model and its on-disk materialization.
//!
//! A [`Pairtree`] is an ordered collection of [`PairtreeObject`]s rooted at
//! `containing_dir/root_dir_name`. Each object is an ordered collection of
//! [`ByteStream`]s, each addressed by a relative path that is unique within
//! the object. Content is never held by the model itself: every byte stream
//! wraps an [`Openable`] source that is opened on demand.
//!
//! # On-disk layout
//!
//! ```text
//! containing_dir/
//!   pairtree_root/
//!     ab/cd/e/            <- shard path of identifier "abcde"
//!       obj/              <- encapsulation directory
//!         data/file.txt   <- intra-object address "data/file.txt"
//! ```
//!
//! Shard directories are at most two characters long, so the first longer
//! directory name on any branch marks where an object begins.
//!
//! # Design Rules
//!
//! 1. Intra-object addresses are unique; collisions fail at insertion time.
//! 2. Writes create directories as needed and skip existing files unless
//!    clobbering is requested, so an interrupted write can be re-run.
//! 3. A file where only shard directories may appear is corruption and is
//!    reported, never guessed around.
//! 4. All I/O errors are propagated.

pub mod bytestream;
pub mod config;
pub mod error;
pub mod object;
pub mod pairtree;
pub mod source;
pub mod traits;
pub mod walk;

pub use bytestream::{copy_stream, ByteStream, StreamHandle};
pub use config::{
    PairtreeConfig, WriteOptions, DEFAULT_BUFFER_SIZE, DEFAULT_ENCAPSULATION,
    DEFAULT_ROOT_DIR_NAME,
};
pub use error::{StoreError, StoreResult};
pub use object::PairtreeObject;
pub use pairtree::{ObjectSummary, Pairtree, TreeSummary, WriteSummary};
pub use source::{FileSource, MemorySource};
pub use traits::{OpenMode, Openable};
pub use walk::{scan_root, ObjectLocation, RootFiles, WalkState};
