//! Discovery of objects beneath a pairtree root.
//!
//! The walk is an explicit-stack descent over shard directories. Every entry
//! is classified by [`WalkState::classify`]:
//!
//! - a directory whose name fits in a shard is descended into,
//! - a directory with a longer name is an object's encapsulation directory
//!   and ends the descent on that branch,
//! - a file is unexpected. Directly in the root it may be tolerated as a
//!   sidecar marker (see [`RootFiles`]); anywhere else it is corruption.

use std::fs;
use std::path::{Path, PathBuf};

use pairtree_codec::{is_shard_name, path_to_identifier, CodecError, CodecResult};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Classification of one directory entry during a root walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkState {
    /// A shard directory; keep descending.
    InShardLevel,
    /// The encapsulation directory of an object.
    InsideObject,
    /// A file outside any object.
    UnexpectedFile,
}

impl WalkState {
    pub fn classify(name: &str, is_dir: bool) -> Self {
        match (is_dir, is_shard_name(name)) {
            (true, true) => Self::InShardLevel,
            (true, false) => Self::InsideObject,
            (false, _) => Self::UnexpectedFile,
        }
    }
}

/// What to do with files found directly inside the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootFiles {
    /// Ignore them (marker files such as namaste tags).
    Skip,
    /// Treat them as unencapsulated files.
    Reject,
}

/// An object found on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectLocation {
    /// Shard directories from the root to the object, relative to the root.
    pub shard_path: PathBuf,
    /// Absolute path of the encapsulation directory.
    pub object_dir: PathBuf,
    /// Name of the encapsulation directory.
    pub encapsulation: String,
}

impl ObjectLocation {
    /// Decode the identifier from the shard path.
    pub fn identifier(&self) -> CodecResult<String> {
        path_to_identifier(&self.shard_path, None)
    }
}

/// Find every object beneath `root`.
///
/// Entries are visited in file-name order, so the result is deterministic.
pub fn scan_root(root: &Path, root_files: RootFiles) -> StoreResult<Vec<ObjectLocation>> {
    if !root.is_dir() {
        return Err(StoreError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let mut found = Vec::new();
    let mut stack = vec![(root.to_path_buf(), PathBuf::new())];

    while let Some((dir, shard_path)) = stack.pop() {
        let at_root = shard_path.as_os_str().is_empty();
        let mut entries = fs::read_dir(&dir)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(|e| e.file_name());

        let mut shards = Vec::new();
        for entry in entries {
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            let path = entry.path();
            match WalkState::classify(&name, path.is_dir()) {
                // The raw name is kept so that decoding rejects non-UTF-8 shards.
                WalkState::InShardLevel => shards.push((path, shard_path.join(&file_name))),
                WalkState::InsideObject => {
                    let encapsulation = file_name
                        .to_str()
                        .ok_or_else(|| CodecError::InvalidComponent {
                            component: name.to_string(),
                        })?
                        .to_string();
                    debug!(object_dir = %path.display(), "found object");
                    found.push(ObjectLocation {
                        shard_path: shard_path.clone(),
                        object_dir: path,
                        encapsulation,
                    });
                }
                WalkState::UnexpectedFile if at_root && root_files == RootFiles::Skip => {
                    debug!(file = %path.display(), "skipping file in pairtree root");
                }
                WalkState::UnexpectedFile => {
                    return Err(StoreError::UnencapsulatedFile { path });
                }
            }
        }

        // Reverse so that popping visits shards in name order.
        stack.extend(shards.into_iter().rev());
    }

    Ok(found)
}
