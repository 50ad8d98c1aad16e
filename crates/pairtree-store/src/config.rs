use serde::{Deserialize, Serialize};

/// Default name of the directory holding the shard tree.
pub const DEFAULT_ROOT_DIR_NAME: &str = "pairtree_root";

/// Default name of the directory holding one object's content.
pub const DEFAULT_ENCAPSULATION: &str = "obj";

/// Default chunk size for stream copies.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Layout settings for a pairtree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairtreeConfig {
    /// Name of the root directory inside the containing directory.
    pub root_dir_name: String,
    /// Encapsulation directory name given to newly created objects.
    pub encapsulation: String,
    /// Chunk size used when copying byte streams.
    pub buffer_size: usize,
}

impl Default for PairtreeConfig {
    fn default() -> Self {
        Self {
            root_dir_name: DEFAULT_ROOT_DIR_NAME.into(),
            encapsulation: DEFAULT_ENCAPSULATION.into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl PairtreeConfig {
    /// Write options using this config's buffer size.
    pub fn write_options(&self, clobber: bool) -> WriteOptions {
        WriteOptions {
            clobber,
            buffer_size: self.buffer_size,
        }
    }
}

/// Options for [`Pairtree::write`](crate::Pairtree::write).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Overwrite files that already exist instead of skipping them.
    pub clobber: bool,
    /// Chunk size used when copying byte streams.
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            clobber: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl WriteOptions {
    /// Options that overwrite existing files.
    pub fn clobber() -> Self {
        Self {
            clobber: true,
            ..Default::default()
        }
    }
}
