use std::collections::HashSet;
use std::fs;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};

use pairtree_codec::identifier_to_path;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{PairtreeConfig, WriteOptions, DEFAULT_ENCAPSULATION, DEFAULT_ROOT_DIR_NAME};
use crate::error::{StoreError, StoreResult};
use crate::object::{validate_encapsulation, PairtreeObject};
use crate::walk::{scan_root, RootFiles};

/// An ordered collection of objects rooted at `containing_dir/root_dir_name`.
#[derive(Clone, Debug)]
pub struct Pairtree {
    containing_dir: Option<PathBuf>,
    root_dir_name: Option<String>,
    encapsulation: String,
    objects: Vec<PairtreeObject>,
}

impl Default for Pairtree {
    fn default() -> Self {
        Self {
            containing_dir: None,
            root_dir_name: Some(DEFAULT_ROOT_DIR_NAME.into()),
            encapsulation: DEFAULT_ENCAPSULATION.into(),
            objects: Vec::new(),
        }
    }
}

/// Counts from one [`Pairtree::write`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Byte streams written to new files.
    pub written: usize,
    /// Byte streams that overwrote existing files.
    pub clobbered: usize,
    /// Byte streams left alone because their target already existed.
    pub skipped: usize,
    /// Total bytes copied.
    pub bytes: u64,
}

impl AddAssign for WriteSummary {
    fn add_assign(&mut self, other: Self) {
        self.written += other.written;
        self.clobbered += other.clobbered;
        self.skipped += other.skipped;
        self.bytes += other.bytes;
    }
}

/// Serializable description of one object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ObjectSummary {
    pub identifier: String,
    pub encapsulation: String,
    pub addresses: Vec<PathBuf>,
}

impl From<&PairtreeObject> for ObjectSummary {
    fn from(obj: &PairtreeObject) -> Self {
        Self {
            identifier: obj.identifier().to_string(),
            encapsulation: obj.encapsulation().to_string(),
            addresses: obj.bytestreams().iter().map(|b| b.address().to_path_buf()).collect(),
        }
    }
}

/// Serializable description of a whole pairtree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreeSummary {
    pub pairtree_root: Option<PathBuf>,
    pub containing_dir: Option<PathBuf>,
    pub root_dir_name: Option<String>,
    pub objects: Vec<ObjectSummary>,
}

impl Pairtree {
    /// A pairtree inside `containing_dir` with the default root name.
    pub fn new(containing_dir: impl Into<PathBuf>) -> Self {
        Self {
            containing_dir: Some(containing_dir.into()),
            ..Default::default()
        }
    }

    /// A pairtree inside `containing_dir` laid out according to `config`.
    pub fn with_config(containing_dir: impl Into<PathBuf>, config: &PairtreeConfig) -> StoreResult<Self> {
        validate_encapsulation(&config.encapsulation)?;
        Ok(Self {
            containing_dir: Some(containing_dir.into()),
            root_dir_name: Some(config.root_dir_name.clone()),
            encapsulation: config.encapsulation.clone(),
            objects: Vec::new(),
        })
    }

    pub fn containing_dir(&self) -> Option<&Path> {
        self.containing_dir.as_deref()
    }

    pub fn set_containing_dir(&mut self, dir: Option<PathBuf>) {
        self.containing_dir = dir;
    }

    pub fn root_dir_name(&self) -> Option<&str> {
        self.root_dir_name.as_deref()
    }

    pub fn set_root_dir_name(&mut self, name: Option<String>) {
        self.root_dir_name = name;
    }

    /// `containing_dir/root_dir_name`, if both are set.
    pub fn pairtree_root(&self) -> Option<PathBuf> {
        match (&self.containing_dir, &self.root_dir_name) {
            (Some(dir), Some(name)) => Some(dir.join(name)),
            _ => None,
        }
    }

    pub fn objects(&self) -> &[PairtreeObject] {
        &self.objects
    }

    pub fn add_object(&mut self, object: PairtreeObject) {
        self.objects.push(object);
    }

    /// Remove and return the most recently added object.
    pub fn remove_object(&mut self) -> Option<PairtreeObject> {
        self.objects.pop()
    }

    pub fn set_objects(&mut self, objects: Vec<PairtreeObject>) {
        self.objects = objects;
    }

    /// First object with the given logical identifier.
    pub fn find_object(&self, identifier: &str) -> Option<&PairtreeObject> {
        self.objects.iter().find(|o| o.identifier() == identifier)
    }

    /// Wrap one file as a new object.
    ///
    /// A random identifier is generated when none is given.
    pub fn add_file(&mut self, path: &Path, identifier: Option<&str>, root: Option<&Path>) -> StoreResult<()> {
        let mut obj = self.new_object(identifier)?;
        obj.add_file(path, root)?;
        self.add_object(obj);
        Ok(())
    }

    /// Wrap a directory tree as a new object.
    ///
    /// A random identifier is generated when none is given.
    pub fn add_directory(&mut self, path: &Path, identifier: Option<&str>, root: Option<&Path>) -> StoreResult<()> {
        let mut obj = self.new_object(identifier)?;
        obj.add_directory(path, root)?;
        self.add_object(obj);
        Ok(())
    }

    fn new_object(&self, identifier: Option<&str>) -> StoreResult<PairtreeObject> {
        let obj = match identifier {
            Some(id) => PairtreeObject::new(id),
            None => PairtreeObject::random(),
        };
        obj.with_encapsulation(&self.encapsulation)
    }

    /// Scan the on-disk root and append every object found.
    ///
    /// Files directly in the root are ignored; a file anywhere else outside
    /// an object fails with [`StoreError::UnencapsulatedFile`]. Returns the
    /// number of objects added.
    pub fn gather_objects(&mut self) -> StoreResult<usize> {
        let root = self.pairtree_root().ok_or(StoreError::MissingRoot)?;

        let locations = scan_root(&root, RootFiles::Skip)?;
        let count = locations.len();
        for location in locations {
            let mut obj = PairtreeObject::new(location.identifier()?)
                .with_encapsulation(&location.encapsulation)?;
            obj.add_directory(&location.object_dir, None)?;
            self.add_object(obj);
        }

        info!(root = %root.display(), objects = count, "gathered pairtree objects");
        Ok(count)
    }

    /// Materialize every object beneath the pairtree root.
    ///
    /// Each byte stream lands at `shard_dir/encapsulation/address`. Existing
    /// files are skipped unless `options.clobber` is set. A byte stream that
    /// is already backed by its own target file is never rewritten. Files
    /// are copied through a temporary file, so an interrupted write can be
    /// re-run and never leaves a partial file at a target path.
    ///
    /// Fails with [`StoreError::DuplicateIdentifier`] before touching the
    /// disk if two objects share an identifier.
    pub fn write(&self, options: &WriteOptions) -> StoreResult<WriteSummary> {
        let root = self.pairtree_root().ok_or(StoreError::MissingRoot)?;
        self.check_unique_identifiers()?;
        fs::create_dir_all(&root)?;

        let mut summary = WriteSummary::default();
        for obj in &self.objects {
            let object_dir = identifier_to_path(obj.identifier(), Some(&root)).join(obj.encapsulation());
            fs::create_dir_all(&object_dir)?;

            for stream in obj.bytestreams() {
                let target = object_dir.join(stream.address());
                let exists = target.exists();

                if exists && (!options.clobber || stream.is_backed_by(&target)) {
                    debug!(target = %target.display(), "target exists; skipping");
                    summary.skipped += 1;
                    continue;
                }

                summary.bytes += stream.write_to(&target, options.buffer_size)?;

                if exists {
                    debug!(target = %target.display(), "clobbered existing file");
                    summary.clobbered += 1;
                } else {
                    summary.written += 1;
                }
            }
        }

        info!(
            root = %root.display(),
            written = summary.written,
            clobbered = summary.clobbered,
            skipped = summary.skipped,
            bytes = summary.bytes,
            "pairtree write complete"
        );
        Ok(summary)
    }

    fn check_unique_identifiers(&self) -> StoreResult<()> {
        let mut seen = HashSet::new();
        for obj in &self.objects {
            if !seen.insert(obj.identifier()) {
                return Err(StoreError::DuplicateIdentifier {
                    identifier: obj.identifier().to_string(),
                });
            }
        }
        Ok(())
    }

    /// A serializable snapshot of the collection.
    pub fn summary(&self) -> TreeSummary {
        TreeSummary {
            pairtree_root: self.pairtree_root(),
            containing_dir: self.containing_dir.clone(),
            root_dir_name: self.root_dir_name.clone(),
            objects: self.objects.iter().map(ObjectSummary::from).collect(),
        }
    }
}
