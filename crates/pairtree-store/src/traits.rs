use std::fmt;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// The direction a byte stream is opened in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenMode {
    Read,
    Write,
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

/// Something that can be opened as a binary stream.
///
/// This is the only capability the Pairtree model needs from its content.
/// Handles are closed by dropping them.
pub trait Openable: fmt::Debug + Send + Sync {
    /// Open for binary reading.
    fn open_read(&self) -> StoreResult<Box<dyn Read + Send>>;

    /// Open for binary writing, truncating existing content.
    ///
    /// Sources that cannot be written return [`StoreError::NotOpenable`].
    fn open_write(&self) -> StoreResult<Box<dyn Write + Send>> {
        Err(StoreError::NotOpenable {
            mode: OpenMode::Write,
        })
    }

    /// The file backing this source, if it lives on the local filesystem.
    fn local_path(&self) -> Option<&Path> {
        None
    }
}
