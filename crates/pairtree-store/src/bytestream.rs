use std::fs;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use pairtree_codec::identifier_to_path;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::traits::{OpenMode, Openable};

/// An open byte stream, in whichever direction it was opened.
pub enum StreamHandle {
    Reader(Box<dyn Read + Send>),
    Writer(Box<dyn Write + Send>),
}

/// One named unit of content inside a pairtree object.
///
/// A byte stream pairs an intra-object address (a relative path below the
/// object's encapsulation directory) with the source its bytes come from.
/// Cloning is cheap: the source is shared.
#[derive(Clone, Debug)]
pub struct ByteStream {
    address: PathBuf,
    source: Arc<dyn Openable>,
}

impl ByteStream {
    /// Wrap `source` at the given intra-object address.
    pub fn new(source: impl Openable + 'static, address: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::from_shared(Arc::new(source), address)
    }

    /// Wrap an already shared source.
    pub fn from_shared(source: Arc<dyn Openable>, address: impl Into<PathBuf>) -> StoreResult<Self> {
        let address = address.into();
        validate_address(&address)?;
        Ok(Self { address, source })
    }

    /// Wrap `source` at a freshly generated address.
    ///
    /// The address is a random hex identifier run through the shard codec,
    /// so it is always filesystem-safe.
    pub fn with_random_address(source: impl Openable + 'static) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            address: identifier_to_path(&id, None),
            source: Arc::new(source),
        }
    }

    pub fn address(&self) -> &Path {
        &self.address
    }

    pub fn source(&self) -> &Arc<dyn Openable> {
        &self.source
    }

    /// Open the underlying source in `mode`.
    pub fn open(&self, mode: OpenMode) -> StoreResult<StreamHandle> {
        match mode {
            OpenMode::Read => self.open_read().map(StreamHandle::Reader),
            OpenMode::Write => self.open_write().map(StreamHandle::Writer),
        }
    }

    pub fn open_read(&self) -> StoreResult<Box<dyn Read + Send>> {
        self.source.open_read()
    }

    pub fn open_write(&self) -> StoreResult<Box<dyn Write + Send>> {
        self.source.open_write()
    }

    /// Whether this stream reads from the very file at `target`.
    ///
    /// Writing such a stream onto `target` would truncate its own source.
    pub fn is_backed_by(&self, target: &Path) -> bool {
        let Some(source) = self.source.local_path() else {
            return false;
        };
        match (fs::canonicalize(source), fs::canonicalize(target)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Copy the stream's content to `target`, creating parent directories.
    ///
    /// Bytes land in a temporary file beside `target` that replaces it only
    /// once the copy has completed, so a failed copy leaves `target` as it
    /// was. Returns the number of bytes copied.
    pub fn write_to(&self, target: &Path, buffer_size: usize) -> StoreResult<u64> {
        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut src = self.open_read()?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        let copied = copy_stream(&mut src, tmp.as_file_mut(), buffer_size)?;
        tmp.persist(target).map_err(|e| e.error)?;
        Ok(copied)
    }

    /// Read the whole stream into memory.
    pub fn read_to_vec(&self) -> StoreResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.open_read()?.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// Addresses must be non-empty relative paths made only of normal components.
fn validate_address(address: &Path) -> StoreResult<()> {
    let mut components = address.components().peekable();
    if components.peek().is_none() {
        return Err(StoreError::InvalidAddress {
            address: address.to_path_buf(),
        });
    }
    if components.all(|c| matches!(c, Component::Normal(_))) {
        Ok(())
    } else {
        Err(StoreError::InvalidAddress {
            address: address.to_path_buf(),
        })
    }
}

/// Copy `src` into `dst` in chunks of `buffer_size` bytes.
///
/// Reads until the source is exhausted, then flushes the destination.
/// Returns the number of bytes copied.
pub fn copy_stream(src: &mut dyn Read, dst: &mut dyn Write, buffer_size: usize) -> io::Result<u64> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut copied = 0u64;
    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        dst.write_all(&buf[..n])?;
        copied += n as u64;
    }
    dst.flush()?;
    Ok(copied)
}
