use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::StoreResult;
use crate::traits::Openable;

/// A file on the local filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Openable for FileSource {
    fn open_read(&self) -> StoreResult<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(&self.path)?))
    }

    fn open_write(&self) -> StoreResult<Box<dyn Write + Send>> {
        Ok(Box::new(File::create(&self.path)?))
    }

    fn local_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// Immutable in-memory content. Can be read any number of times, never written.
#[derive(Clone, Debug)]
pub struct MemorySource {
    data: Arc<[u8]>,
}

impl MemorySource {
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        Self { data: data.into() }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Openable for MemorySource {
    fn open_read(&self) -> StoreResult<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(Arc::clone(&self.data))))
    }
}
