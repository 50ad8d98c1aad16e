use std::path::{Path, PathBuf};

use pairtree_store::{
    scan_root, Pairtree, PairtreeObject, RootFiles, StoreError, DEFAULT_ENCAPSULATION,
};
use tracing::{debug, info};

use crate::error::FsResult;
use crate::prefix::read_prefix;

/// Builds one object from the files beneath its encapsulation directory.
pub struct ObjectReader {
    path: PathBuf,
    identifier: String,
    prefix: Option<String>,
    encapsulation: String,
}

impl ObjectReader {
    /// Read the directory at `path` as the object named `identifier`.
    pub fn new(path: impl Into<PathBuf>, identifier: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            identifier: identifier.into(),
            prefix: None,
            encapsulation: DEFAULT_ENCAPSULATION.into(),
        }
    }

    /// Prepend `prefix` to the identifier of the object read.
    pub fn with_prefix(mut self, prefix: Option<String>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Record `name` as the object's encapsulation directory name.
    pub fn with_encapsulation(mut self, name: impl Into<String>) -> Self {
        self.encapsulation = name.into();
        self
    }

    /// The identifier the object will carry, prefix included.
    pub fn identifier(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{}", self.identifier),
            None => self.identifier.clone(),
        }
    }

    /// Walk the directory and build the object.
    ///
    /// Every file becomes a byte stream addressed by its path relative to
    /// the directory.
    pub fn read(&self) -> FsResult<PairtreeObject> {
        let mut obj = PairtreeObject::new(self.identifier()).with_encapsulation(&self.encapsulation)?;
        let files = obj.add_directory(&self.path, None)?;
        debug!(
            identifier = obj.identifier(),
            dir = %self.path.display(),
            files,
            "read object"
        );
        Ok(obj)
    }
}

/// Builds a [`Pairtree`] from an existing pairtree root directory.
pub struct TreeReader {
    root: PathBuf,
    strict: bool,
}

impl TreeReader {
    /// Read the pairtree rooted at `root`, which must be a directory.
    pub fn new(root: impl Into<PathBuf>) -> FsResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::NotADirectory { path: root }.into());
        }
        Ok(Self { root, strict: false })
    }

    /// Reject files sitting directly in the root as well as deeper ones.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory holding the root and its prefix file.
    pub fn containing_dir(&self) -> Option<&Path> {
        self.root.parent()
    }

    pub fn root_dir_name(&self) -> Option<String> {
        self.root.file_name().map(|n| n.to_string_lossy().into_owned())
    }

    /// The identifier prefix recorded beside the root, if any.
    pub fn identifier_prefix(&self) -> FsResult<Option<String>> {
        match self.containing_dir() {
            Some(dir) => read_prefix(dir),
            None => Ok(None),
        }
    }

    /// Discover every object beneath the root.
    ///
    /// A file anywhere between the root and an object fails with
    /// [`StoreError::UnencapsulatedFile`]. Files directly in the root are
    /// only rejected in strict mode.
    pub fn read(&self) -> FsResult<Pairtree> {
        let prefix = self.identifier_prefix()?;
        let root_files = if self.strict {
            RootFiles::Reject
        } else {
            RootFiles::Skip
        };

        let mut tree = match self.containing_dir() {
            Some(dir) => Pairtree::new(dir),
            None => Pairtree::default(),
        };
        tree.set_root_dir_name(self.root_dir_name());

        for location in scan_root(&self.root, root_files)? {
            let obj = ObjectReader::new(&location.object_dir, location.identifier()?)
                .with_prefix(prefix.clone())
                .with_encapsulation(location.encapsulation)
                .read()?;
            tree.add_object(obj);
        }

        info!(
            root = %self.root.display(),
            objects = tree.objects().len(),
            prefix = prefix.as_deref().unwrap_or(""),
            "read pairtree"
        );
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FsError;
    use crate::prefix::write_prefix;
    use std::fs;

    fn mkobj(root: &Path, rel: &str, files: &[(&str, &[u8])]) {
        let dir = root.join(rel);
        for (name, content) in files {
            let path = dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    #[test]
    fn object_reader_addresses_are_relative() {
        let dir = tempfile::tempdir().unwrap();
        mkobj(dir.path(), "obj", &[("a.txt", b"a"), ("sub/b.txt", b"b")]);

        let obj = ObjectReader::new(dir.path().join("obj"), "id1").read().unwrap();
        assert_eq!(obj.identifier(), "id1");
        assert_eq!(obj.encapsulation(), "obj");
        let addresses: Vec<&Path> = obj.bytestreams().iter().map(|b| b.address()).collect();
        assert_eq!(addresses, vec![Path::new("a.txt"), Path::new("sub/b.txt")]);
        assert_eq!(obj.get(Path::new("sub/b.txt")).unwrap().read_to_vec().unwrap(), b"b");
    }

    #[test]
    fn object_reader_applies_prefix() {
        let dir = tempfile::tempdir().unwrap();
        mkobj(dir.path(), "content", &[("x", b"")]);

        let reader = ObjectReader::new(dir.path().join("content"), "xt12")
            .with_prefix(Some("ark:/13030/".into()))
            .with_encapsulation("content");
        assert_eq!(reader.identifier(), "ark:/13030/xt12");
        let obj = reader.read().unwrap();
        assert_eq!(obj.identifier(), "ark:/13030/xt12");
        assert_eq!(obj.encapsulation(), "content");
    }

    #[test]
    fn object_reader_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = ObjectReader::new(dir.path().join("missing"), "x").read().unwrap_err();
        assert!(matches!(err, FsError::Store(StoreError::NotADirectory { .. })));

        let err = ObjectReader::new(dir.path(), "x").with_encapsulation("ab").read().unwrap_err();
        assert!(matches!(err, FsError::Store(StoreError::InvalidEncapsulation { .. })));
    }

    #[test]
    fn tree_reader_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = TreeReader::new(dir.path().join("pairtree_root")).err().unwrap();
        assert!(matches!(err, FsError::Store(StoreError::NotADirectory { .. })));
    }

    #[test]
    fn tree_reader_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pairtree_root");
        fs::create_dir(&root).unwrap();
        write_prefix(dir.path(), "pfx:").unwrap();

        let reader = TreeReader::new(&root).unwrap();
        assert_eq!(reader.root(), root);
        assert_eq!(reader.containing_dir(), Some(dir.path()));
        assert_eq!(reader.root_dir_name().as_deref(), Some("pairtree_root"));
        assert_eq!(reader.identifier_prefix().unwrap().as_deref(), Some("pfx:"));

        let tree = reader.read().unwrap();
        assert!(tree.objects().is_empty());
        assert_eq!(tree.pairtree_root(), Some(root));
    }

    #[test]
    fn tree_reader_root_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pairtree_root");
        mkobj(&root, "ab/cd/obj", &[("f", b"1")]);
        mkobj(&root, "ab/obj", &[("g", b"2")]);
        fs::write(root.join("pairtree_version0_1"), b"").unwrap();

        let tree = TreeReader::new(&root).unwrap().read().unwrap();
        let ids: Vec<&str> = tree.objects().iter().map(|o| o.identifier()).collect();
        assert_eq!(ids, vec!["ab", "abcd"]);

        let err = TreeReader::new(&root).unwrap().strict(true).read().unwrap_err();
        assert!(matches!(err, FsError::Store(StoreError::UnencapsulatedFile { .. })));
    }

    #[test]
    fn tree_reader_keeps_found_encapsulation() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pairtree_root");
        mkobj(&root, "xy/z/content", &[("f", b"1")]);

        let tree = TreeReader::new(&root).unwrap().read().unwrap();
        let obj = tree.find_object("xyz").unwrap();
        assert_eq!(obj.encapsulation(), "content");
        assert_eq!(obj.get(Path::new("f")).unwrap().read_to_vec().unwrap(), b"1");
    }
}
