use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use pairtree_codec::identifier_to_path;
use pairtree_store::{
    Pairtree, PairtreeObject, StoreError, WriteSummary, DEFAULT_BUFFER_SIZE, DEFAULT_ROOT_DIR_NAME,
};
use tracing::{debug, info};

use crate::error::{FsError, FsResult};
use crate::prefix::write_prefix;

/// Copies one object's byte streams into a directory.
pub struct ObjectWriter<'a> {
    object: &'a PairtreeObject,
    dir: PathBuf,
    buffer_size: usize,
}

impl<'a> ObjectWriter<'a> {
    /// Write `object` so that each byte stream lands at `dir/address`.
    pub fn new(object: &'a PairtreeObject, dir: impl Into<PathBuf>) -> Self {
        Self {
            object,
            dir: dir.into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// Copy every byte stream, creating parent directories as needed.
    ///
    /// Existing files are overwritten, except a file that is itself the
    /// source of the stream being written. Each file is replaced only after
    /// its copy has completed.
    pub fn write(&self) -> FsResult<WriteSummary> {
        fs::create_dir_all(&self.dir)?;

        let mut summary = WriteSummary::default();
        for stream in self.object.bytestreams() {
            let target = self.dir.join(stream.address());
            if stream.is_backed_by(&target) {
                debug!(target = %target.display(), "stream is its own target; skipping");
                summary.skipped += 1;
                continue;
            }
            let exists = target.exists();
            summary.bytes += stream.write_to(&target, self.buffer_size)?;

            if exists {
                summary.clobbered += 1;
            } else {
                summary.written += 1;
            }
        }

        debug!(
            identifier = self.object.identifier(),
            dir = %self.dir.display(),
            streams = summary.written + summary.clobbered,
            "wrote object"
        );
        Ok(summary)
    }
}

/// Writes a whole [`Pairtree`] into a new root directory.
pub struct TreeWriter<'a> {
    tree: &'a Pairtree,
    containing_dir: PathBuf,
    root_dir_name: String,
    prefix: Option<String>,
    buffer_size: usize,
}

impl<'a> TreeWriter<'a> {
    /// Write `tree` beneath `containing_dir`.
    ///
    /// The root directory name defaults to the tree's own, or
    /// `pairtree_root` when it has none.
    pub fn new(tree: &'a Pairtree, containing_dir: impl Into<PathBuf>) -> Self {
        Self {
            tree,
            containing_dir: containing_dir.into(),
            root_dir_name: tree.root_dir_name().unwrap_or(DEFAULT_ROOT_DIR_NAME).to_string(),
            prefix: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_root_dir_name(mut self, name: impl Into<String>) -> Self {
        self.root_dir_name = name.into();
        self
    }

    /// Record `prefix` beside the root and strip it from every identifier.
    pub fn with_identifier_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// The root directory this writer creates.
    pub fn pairtree_root(&self) -> PathBuf {
        self.containing_dir.join(&self.root_dir_name)
    }

    /// Create the root and write every object into it.
    ///
    /// Fails without touching the disk if the root already exists, if an
    /// identifier does not carry the configured prefix, or if two objects
    /// would share a shard directory.
    pub fn write(&self) -> FsResult<WriteSummary> {
        if !self.containing_dir.is_absolute() {
            return Err(FsError::NotAbsolute {
                path: self.containing_dir.clone(),
            });
        }
        let root = self.pairtree_root();
        if root.exists() {
            return Err(FsError::RootAlreadyExists { path: root });
        }

        let shard_ids = self
            .tree
            .objects()
            .iter()
            .map(|obj| self.strip_prefix(obj.identifier()))
            .collect::<FsResult<Vec<_>>>()?;
        let mut seen = HashSet::new();
        for (obj, id) in self.tree.objects().iter().zip(&shard_ids) {
            if !seen.insert(*id) {
                return Err(StoreError::DuplicateIdentifier {
                    identifier: obj.identifier().to_string(),
                }
                .into());
            }
        }

        fs::create_dir_all(&root)?;
        if let Some(prefix) = &self.prefix {
            write_prefix(&self.containing_dir, prefix)?;
        }

        let mut summary = WriteSummary::default();
        for (obj, id) in self.tree.objects().iter().zip(shard_ids) {
            let object_dir = identifier_to_path(id, Some(&root)).join(obj.encapsulation());
            summary += ObjectWriter::new(obj, object_dir)
                .with_buffer_size(self.buffer_size)
                .write()?;
        }

        info!(
            root = %root.display(),
            objects = self.tree.objects().len(),
            written = summary.written,
            bytes = summary.bytes,
            "wrote pairtree"
        );
        Ok(summary)
    }

    fn strip_prefix<'b>(&self, identifier: &'b str) -> FsResult<&'b str> {
        let Some(prefix) = &self.prefix else {
            return Ok(identifier);
        };
        identifier
            .strip_prefix(prefix.as_str())
            .ok_or_else(|| FsError::PrefixMismatch {
                identifier: identifier.to_string(),
                prefix: prefix.clone(),
            })
    }
}
