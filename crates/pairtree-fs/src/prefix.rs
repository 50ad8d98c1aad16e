//! The `pairtree_prefix` sidecar file.
//!
//! A single line holding a string prepended to every identifier in the tree.
//! It sits in the containing directory, beside the pairtree root.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::FsResult;

pub const PREFIX_FILE_NAME: &str = "pairtree_prefix";

/// Read the identifier prefix from `containing_dir`, if one is recorded.
///
/// One trailing line ending (`\n` or `\r\n`) is stripped. A missing or
/// empty file means no prefix.
pub fn read_prefix(containing_dir: &Path) -> FsResult<Option<String>> {
    let path = containing_dir.join(PREFIX_FILE_NAME);
    if !path.is_file() {
        return Ok(None);
    }
    let contents = fs::read_to_string(&path)?;
    let prefix = contents
        .strip_suffix("\r\n")
        .or_else(|| contents.strip_suffix('\n'))
        .unwrap_or(contents.as_str());
    debug!(path = %path.display(), prefix, "read identifier prefix");
    Ok((!prefix.is_empty()).then(|| prefix.to_string()))
}

/// Record `prefix` in `containing_dir`.
pub fn write_prefix(containing_dir: &Path, prefix: &str) -> FsResult<()> {
    let path = containing_dir.join(PREFIX_FILE_NAME);
    fs::write(&path, format!("{prefix}\n"))?;
    debug!(path = %path.display(), prefix, "wrote identifier prefix");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_prefix() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(read_prefix(dir.path()).unwrap(), None);
    }

    #[test]
    fn prefix_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        write_prefix(dir.path(), "ark:/13030/").unwrap();
        assert_eq!(read_prefix(dir.path()).unwrap().as_deref(), Some("ark:/13030/"));
    }

    #[test]
    fn strips_one_line_ending() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PREFIX_FILE_NAME), " pre \n").unwrap();
        assert_eq!(read_prefix(dir.path()).unwrap().as_deref(), Some(" pre "));

        fs::write(dir.path().join(PREFIX_FILE_NAME), "ark:/13030/\r\n").unwrap();
        assert_eq!(read_prefix(dir.path()).unwrap().as_deref(), Some("ark:/13030/"));

        fs::write(dir.path().join(PREFIX_FILE_NAME), "no-newline").unwrap();
        assert_eq!(read_prefix(dir.path()).unwrap().as_deref(), Some("no-newline"));
    }

    #[test]
    fn empty_file_is_no_prefix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PREFIX_FILE_NAME), "\n").unwrap();
        assert_eq!(read_prefix(dir.path()).unwrap(), None);
    }
}
