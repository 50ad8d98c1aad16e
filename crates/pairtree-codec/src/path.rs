//! Shard splitting and identifier/path conversion.

use std::path::{Component, Path, PathBuf};

use crate::error::{CodecError, CodecResult};
use crate::sanitize::{desanitize, sanitize};

/// Maximum length, in characters, of a shard directory name.
///
/// Any directory name longer than this marks the boundary between a shard
/// path and an object's encapsulation directory.
pub const SHARD_WIDTH: usize = 2;

/// Returns `true` if `name` is short enough to be a shard directory.
pub fn is_shard_name(name: &str) -> bool {
    name.chars().count() <= SHARD_WIDTH
}

/// Split a sanitized string into consecutive two-character segments.
///
/// The last segment holds a single character when the input has odd length.
/// An empty input yields no segments.
pub fn shard(sanitized: &str) -> Vec<String> {
    let chars: Vec<char> = sanitized.chars().collect();
    chars
        .chunks(SHARD_WIDTH)
        .map(|pair| pair.iter().collect())
        .collect()
}

/// Map an identifier to its shard path.
///
/// With a `root` the segments are nested beneath it; without one the result
/// is a relative path. The empty identifier maps to the root itself.
pub fn identifier_to_path(identifier: &str, root: Option<&Path>) -> PathBuf {
    let mut path = root.map(Path::to_path_buf).unwrap_or_default();
    for segment in shard(&sanitize(identifier)) {
        path.push(segment);
    }
    path
}

/// Recover an identifier from a shard path.
///
/// When `root` is given, `path` must live beneath it and only the remainder
/// is decoded. A leading filesystem root is ignored. Every remaining segment
/// is concatenated into one sanitized string, which is then desanitized.
pub fn path_to_identifier(path: &Path, root: Option<&Path>) -> CodecResult<String> {
    let relative = match root {
        Some(root) => path.strip_prefix(root).map_err(|_| CodecError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?,
        None => path,
    };

    let mut sanitized = String::new();
    for component in relative.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => continue,
            Component::ParentDir => {
                return Err(CodecError::InvalidComponent {
                    component: "..".into(),
                })
            }
            Component::Normal(segment) => {
                let segment = segment.to_str().ok_or_else(|| CodecError::InvalidComponent {
                    component: segment.to_string_lossy().into_owned(),
                })?;
                sanitized.push_str(segment);
            }
        }
    }

    desanitize(&sanitized)
}

/// A path inside a pairtree split at the object boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectPath {
    /// The shard directories leading to the object.
    pub shard: PathBuf,
    /// The first component longer than [`SHARD_WIDTH`], if any.
    pub encapsulation: Option<String>,
    /// Everything after the encapsulation directory.
    pub address: PathBuf,
}

/// Split a path at the first component longer than [`SHARD_WIDTH`].
///
/// Components before the boundary form the shard path; the boundary
/// component is the encapsulation directory name; the rest is the
/// intra-object address.
pub fn split_at_object_boundary(path: &Path) -> ObjectPath {
    let mut split = ObjectPath {
        shard: PathBuf::new(),
        encapsulation: None,
        address: PathBuf::new(),
    };

    for component in path.components() {
        if split.encapsulation.is_some() {
            split.address.push(component);
            continue;
        }
        match component {
            Component::Normal(segment) => {
                let name = segment.to_string_lossy();
                if is_shard_name(&name) {
                    split.shard.push(segment);
                } else {
                    split.encapsulation = Some(name.into_owned());
                }
            }
            other => split.shard.push(other),
        }
    }

    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shard_pairs_with_odd_tail() {
        assert_eq!(shard("ab=c,d"), vec!["ab", "=c", ",d"]);
        assert_eq!(shard("abcde"), vec!["ab", "cd", "e"]);
        assert!(shard("").is_empty());
    }

    #[test]
    fn identifier_to_relative_path() {
        let path = identifier_to_path("ab/c.d", None);
        assert_eq!(path, PathBuf::from("ab").join("=c").join(",d"));
    }

    #[test]
    fn identifier_to_rooted_path() {
        let root = Path::new("/tmp/pairtree_root");
        let path = identifier_to_path("abc", Some(root));
        assert_eq!(path, root.join("ab").join("c"));
    }

    #[test]
    fn empty_identifier_is_root() {
        let root = Path::new("/tmp/pairtree_root");
        assert_eq!(identifier_to_path("", Some(root)), root);
        assert_eq!(path_to_identifier(root, Some(root)).unwrap(), "");
    }

    #[test]
    fn escape_split_across_shards_roundtrips() {
        // "a b" sanitizes to "a^20b", which shards as "a^", "20", "b".
        let path = identifier_to_path("a b", None);
        assert_eq!(path, PathBuf::from("a^").join("20").join("b"));
        assert_eq!(path_to_identifier(&path, None).unwrap(), "a b");
    }

    #[test]
    fn leading_root_is_ignored() {
        assert_eq!(path_to_identifier(Path::new("/ab/c"), None).unwrap(), "abc");
    }

    #[test]
    fn path_outside_root_is_rejected() {
        let err = path_to_identifier(Path::new("/elsewhere/ab"), Some(Path::new("/root"))).unwrap_err();
        assert!(matches!(err, CodecError::OutsideRoot { .. }));
    }

    #[test]
    fn parent_component_is_rejected() {
        let err = path_to_identifier(Path::new("ab/../cd"), None).unwrap_err();
        assert!(matches!(err, CodecError::InvalidComponent { .. }));
    }

    #[test]
    fn split_object_path() {
        let split = split_at_object_boundary(Path::new("ab/cd/e/obj/data/file.txt"));
        assert_eq!(split.shard, PathBuf::from("ab/cd/e"));
        assert_eq!(split.encapsulation.as_deref(), Some("obj"));
        assert_eq!(split.address, PathBuf::from("data/file.txt"));
    }

    #[test]
    fn split_without_boundary() {
        let split = split_at_object_boundary(Path::new("ab/cd"));
        assert_eq!(split.shard, PathBuf::from("ab/cd"));
        assert!(split.encapsulation.is_none());
        assert_eq!(split.address, PathBuf::new());
    }

    #[test]
    fn shard_name_width() {
        assert!(is_shard_name("ab"));
        assert!(is_shard_name("a"));
        assert!(!is_shard_name("obj"));
    }

    proptest! {
        #[test]
        fn path_roundtrips_under_root(id in any::<String>()) {
            let root = Path::new("/var/lib/pairtree_root");
            let path = identifier_to_path(&id, Some(root));
            prop_assert_eq!(path_to_identifier(&path, Some(root)).unwrap(), id);
        }

        #[test]
        fn shard_names_fit_width(id in any::<String>()) {
            let path = identifier_to_path(&id, None);
            for component in path.components() {
                let name = component.as_os_str().to_string_lossy();
                prop_assert!(is_shard_name(&name));
            }
        }
    }
}
