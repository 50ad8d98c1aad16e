use std::ffi::OsStr;
use std::path::Path;

use pairtree_codec::{is_shard_name, path_to_identifier, sanitize};
use tracing::debug;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::bytestream::ByteStream;
use crate::config::DEFAULT_ENCAPSULATION;
use crate::error::{StoreError, StoreResult};
use crate::source::FileSource;

/// One logical object in a pairtree: an identifier plus its byte streams.
///
/// Byte streams keep insertion order and never share an address.
#[derive(Clone, Debug)]
pub struct PairtreeObject {
    identifier: String,
    sanitized: String,
    encapsulation: String,
    bytestreams: Vec<ByteStream>,
}

impl PairtreeObject {
    /// Create an empty object with the given logical identifier.
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        Self {
            sanitized: sanitize(&identifier),
            identifier,
            encapsulation: DEFAULT_ENCAPSULATION.into(),
            bytestreams: Vec::new(),
        }
    }

    /// Create an empty object with a random hex identifier.
    pub fn random() -> Self {
        Self::new(Uuid::new_v4().simple().to_string())
    }

    /// Derive an object from its location inside a pairtree root.
    ///
    /// `path` is either the object's shard directory or its encapsulation
    /// directory; a trailing component equal to `encapsulation` is removed
    /// before the rest is decoded relative to `root`.
    pub fn from_path(path: &Path, root: &Path, encapsulation: &str) -> StoreResult<Self> {
        let shard_dir = match (path.file_name(), path.parent()) {
            (Some(name), Some(parent)) if name == OsStr::new(encapsulation) => parent,
            _ => path,
        };
        let identifier = path_to_identifier(shard_dir, Some(root))?;
        Self::new(identifier).with_encapsulation(encapsulation)
    }

    /// Replace the encapsulation directory name.
    pub fn with_encapsulation(mut self, name: &str) -> StoreResult<Self> {
        self.set_encapsulation(name)?;
        Ok(self)
    }

    /// Set the encapsulation directory name.
    ///
    /// The name must be longer than a shard directory and a single path
    /// component, or the object boundary could not be found again on disk.
    pub fn set_encapsulation(&mut self, name: &str) -> StoreResult<()> {
        validate_encapsulation(name)?;
        self.encapsulation = name.into();
        Ok(())
    }

    /// The logical identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The sanitized, filesystem-facing form of the identifier.
    pub fn raw_identifier(&self) -> &str {
        &self.sanitized
    }

    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
        self.sanitized = sanitize(&self.identifier);
    }

    pub fn encapsulation(&self) -> &str {
        &self.encapsulation
    }

    pub fn bytestreams(&self) -> &[ByteStream] {
        &self.bytestreams
    }

    /// Look up a byte stream by intra-object address.
    pub fn get(&self, address: &Path) -> Option<&ByteStream> {
        self.bytestreams.iter().find(|b| b.address() == address)
    }

    pub fn len(&self) -> usize {
        self.bytestreams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytestreams.is_empty()
    }

    /// Append a byte stream. Fails if its address is already taken.
    pub fn add_bytestream(&mut self, stream: ByteStream) -> StoreResult<()> {
        if self.get(stream.address()).is_some() {
            return Err(StoreError::AddressCollision {
                address: stream.address().to_path_buf(),
            });
        }
        self.bytestreams.push(stream);
        Ok(())
    }

    /// Remove and return the most recently added byte stream.
    pub fn pop_bytestream(&mut self) -> Option<ByteStream> {
        self.bytestreams.pop()
    }

    /// Replace all byte streams. On a collision the object is left unchanged.
    pub fn set_bytestreams(&mut self, streams: impl IntoIterator<Item = ByteStream>) -> StoreResult<()> {
        let mut replacement: Vec<ByteStream> = Vec::new();
        for stream in streams {
            if replacement.iter().any(|b| b.address() == stream.address()) {
                return Err(StoreError::AddressCollision {
                    address: stream.address().to_path_buf(),
                });
            }
            replacement.push(stream);
        }
        self.bytestreams = replacement;
        Ok(())
    }

    /// Add a single file.
    ///
    /// The address is `path` relative to `root`, or just the file name when
    /// no root is given.
    pub fn add_file(&mut self, path: &Path, root: Option<&Path>) -> StoreResult<()> {
        if !path.is_file() {
            return Err(StoreError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        let address = match root {
            Some(root) => relative_to(path, root)?,
            None => path.file_name().map(Path::new).ok_or_else(|| StoreError::NotAFile {
                path: path.to_path_buf(),
            })?,
        };
        self.add_bytestream(ByteStream::new(FileSource::new(path), address)?)
    }

    /// Add every file beneath a directory, recursively.
    ///
    /// Addresses are relative to `root`, or to `path` itself when no root is
    /// given. Returns the number of files added.
    pub fn add_directory(&mut self, path: &Path, root: Option<&Path>) -> StoreResult<usize> {
        if !path.is_dir() {
            return Err(StoreError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        let base = root.unwrap_or(path);

        let mut added = 0;
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let address = relative_to(entry.path(), base)?;
            self.add_bytestream(ByteStream::new(FileSource::new(entry.path()), address)?)?;
            added += 1;
        }
        debug!(
            identifier = %self.identifier,
            dir = %path.display(),
            files = added,
            "added directory to object"
        );
        Ok(added)
    }
}

pub(crate) fn validate_encapsulation(name: &str) -> StoreResult<()> {
    if is_shard_name(name) || name.contains(['/', '\\']) {
        return Err(StoreError::InvalidEncapsulation { name: name.into() });
    }
    Ok(())
}

fn relative_to<'a>(path: &'a Path, root: &Path) -> StoreResult<&'a Path> {
    path.strip_prefix(root).map_err(|_| StoreError::OutsideRoot {
        path: path.to_path_buf(),
        root: root.to_path_buf(),
    })
}
