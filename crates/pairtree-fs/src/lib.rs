//! Directory adapters for Pairtree.
//!
//! Moves objects and whole trees between the in-memory model of
//! `pairtree-store` and real directory trees.
//!
//! # Architecture
//!
//! - **ObjectReader**: builds one object from an encapsulation directory
//! - **ObjectWriter**: copies one object's byte streams into a directory
//! - **TreeReader**: builds a [`Pairtree`] from a pairtree root, applying the
//!   sidecar identifier prefix if one is present
//! - **TreeWriter**: writes a [`Pairtree`] into a fresh root, recording and
//!   stripping an identifier prefix if one is configured
//!
//! The sidecar prefix file `pairtree_prefix` lives next to the root
//! directory, not inside it.

pub mod error;
pub mod prefix;
pub mod reader;
pub mod writer;

pub use error::{FsError, FsResult};
pub use prefix::{read_prefix, write_prefix, PREFIX_FILE_NAME};
pub use reader::{ObjectReader, TreeReader};
pub use writer::{ObjectWriter, TreeWriter};

pub use pairtree_store::Pairtree;
