use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use pairtree_codec::{identifier_to_path, path_to_identifier, split_at_object_boundary, CodecError, ObjectPath};
use pairtree_fs::{FsError, ObjectReader, ObjectWriter, TreeReader};
use pairtree_store::{Pairtree, PairtreeConfig, PairtreeObject, WalkState, WriteSummary};
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::IdToPath(args) => cmd_id_to_path(args, format),
        Command::PathToId(args) => cmd_path_to_id(args, format),
        Command::Ls(args) => cmd_ls(args, format),
        Command::Put(args) => cmd_put(args, format),
        Command::Get(args) => cmd_get(args, format),
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_id_to_path(args: IdToPathArgs, format: OutputFormat) -> anyhow::Result<()> {
    let path = object_path(&args);
    match format {
        OutputFormat::Json => print_json(&json!({ "identifier": args.id, "path": path })),
        OutputFormat::Text => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn cmd_path_to_id(args: PathToIdArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (identifier, split) = resolve_identifier(&args.path, args.root.as_deref())?;
    match format {
        OutputFormat::Json => print_json(&json!({
            "identifier": identifier,
            "encapsulation": split.encapsulation,
            "address": split.address,
        })),
        OutputFormat::Text => {
            println!("{identifier}");
            if let Some(encapsulation) = &split.encapsulation {
                println!("  {} {}", "encapsulation:".dimmed(), encapsulation);
            }
            if !split.address.as_os_str().is_empty() {
                println!("  {} {}", "address:".dimmed(), split.address.display());
            }
            Ok(())
        }
    }
}

fn cmd_ls(args: LsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let tree = TreeReader::new(&args.root)?.strict(args.strict).read()?;
    match format {
        OutputFormat::Json => print_json(&serde_json::to_value(tree.summary())?),
        OutputFormat::Text => {
            if tree.objects().is_empty() {
                println!("No objects.");
            }
            for obj in tree.objects() {
                println!("{} {}", obj.identifier().yellow().bold(), format!("({})", obj.encapsulation()).dimmed());
                for stream in obj.bytestreams() {
                    println!("  {}", stream.address().display());
                }
            }
            Ok(())
        }
    }
}

fn cmd_put(args: PutArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (tree, summary) = put(&args)?;
    match format {
        OutputFormat::Json => print_json(&json!({ "tree": tree.summary(), "write": summary })),
        OutputFormat::Text => {
            for obj in tree.objects() {
                println!("{} Stored {}", "✓".green().bold(), obj.identifier().yellow());
            }
            print_write_summary(&summary);
            Ok(())
        }
    }
}

fn cmd_get(args: GetArgs, format: OutputFormat) -> anyhow::Result<()> {
    let (obj, summary) = get(&args)?;
    match format {
        OutputFormat::Json => print_json(&json!({
            "identifier": obj.identifier(),
            "dest": args.dest,
            "write": summary,
        })),
        OutputFormat::Text => {
            println!(
                "{} Copied {} to {}",
                "✓".green().bold(),
                obj.identifier().yellow(),
                args.dest.display().to_string().bold()
            );
            print_write_summary(&summary);
            Ok(())
        }
    }
}

fn print_write_summary(summary: &WriteSummary) {
    println!(
        "  {} written, {} clobbered, {} skipped, {} bytes",
        summary.written, summary.clobbered, summary.skipped, summary.bytes
    );
}

/// The shard path of an identifier, with the encapsulation and address appended.
fn object_path(args: &IdToPathArgs) -> PathBuf {
    let mut path = identifier_to_path(&args.id, args.root.as_deref());
    if let Some(encapsulation) = &args.encapsulation {
        path.push(encapsulation);
    }
    if let Some(address) = &args.address {
        path.push(address);
    }
    path
}

/// Decode the identifier of `path`, stopping at the object boundary.
fn resolve_identifier(path: &Path, root: Option<&Path>) -> anyhow::Result<(String, ObjectPath)> {
    let relative = match root {
        Some(root) => path.strip_prefix(root).map_err(|_| CodecError::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?,
        None => path,
    };
    let split = split_at_object_boundary(relative);
    let identifier = path_to_identifier(&split.shard, None)?;
    Ok((identifier, split))
}

fn put(args: &PutArgs) -> anyhow::Result<(Pairtree, WriteSummary)> {
    let config = PairtreeConfig {
        root_dir_name: args.root_name.clone(),
        encapsulation: args.encapsulation.clone(),
        ..Default::default()
    };
    let mut tree = Pairtree::with_config(&args.containing_dir, &config)?;
    match &args.id {
        // One identifier: every path goes into the same object.
        Some(id) => {
            let mut obj = PairtreeObject::new(id.as_str()).with_encapsulation(&config.encapsulation)?;
            for path in &args.paths {
                let added = if path.is_dir() {
                    obj.add_directory(path, None).map(|_| ())
                } else {
                    obj.add_file(path, None)
                };
                added.with_context(|| format!("cannot add {}", path.display()))?;
            }
            tree.add_object(obj);
        }
        None => {
            for path in &args.paths {
                let added = if path.is_dir() {
                    tree.add_directory(path, None, None)
                } else {
                    tree.add_file(path, None, None)
                };
                added.with_context(|| format!("cannot add {}", path.display()))?;
            }
        }
    }
    let summary = tree.write(&config.write_options(args.clobber))?;
    Ok((tree, summary))
}

fn get(args: &GetArgs) -> anyhow::Result<(PairtreeObject, WriteSummary)> {
    let reader = TreeReader::new(&args.root)?;
    let prefix = reader.identifier_prefix()?;
    let local_id = match &prefix {
        Some(prefix) => args
            .id
            .strip_prefix(prefix.as_str())
            .ok_or_else(|| FsError::PrefixMismatch {
                identifier: args.id.clone(),
                prefix: prefix.clone(),
            })?,
        None => args.id.as_str(),
    };

    let shard_dir = identifier_to_path(local_id, Some(reader.root()));
    let encapsulation = match &args.encapsulation {
        Some(name) => name.clone(),
        None => find_encapsulation(&shard_dir)?,
    };
    let obj = ObjectReader::new(shard_dir.join(&encapsulation), local_id)
        .with_prefix(prefix)
        .with_encapsulation(encapsulation)
        .read()
        .with_context(|| format!("no object {:?} in {}", args.id, args.root.display()))?;
    let summary = ObjectWriter::new(&obj, &args.dest).write()?;
    Ok((obj, summary))
}

/// The first encapsulation directory (by name) inside a shard directory.
fn find_encapsulation(shard_dir: &Path) -> anyhow::Result<String> {
    if !shard_dir.is_dir() {
        bail!("no object at {}", shard_dir.display());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(shard_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if WalkState::classify(&name, entry.path().is_dir()) == WalkState::InsideObject {
            names.push(name);
        }
    }
    names.sort();
    names
        .into_iter()
        .next()
        .with_context(|| format!("no object at {}", shard_dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairtree_fs::TreeWriter;
    use pairtree_store::{ByteStream, MemorySource, StoreError};

    fn put_args(containing_dir: &Path, paths: Vec<PathBuf>, id: Option<&str>) -> PutArgs {
        PutArgs {
            containing_dir: containing_dir.to_path_buf(),
            paths,
            id: id.map(str::to_string),
            root_name: "pairtree_root".into(),
            encapsulation: "obj".into(),
            clobber: false,
        }
    }

    #[test]
    fn id_to_path_appends_object_parts() {
        let args = IdToPathArgs {
            id: "ark:/13030/xt12t3".into(),
            root: Some("/data/pairtree_root".into()),
            encapsulation: Some("obj".into()),
            address: Some("page/1.tif".into()),
        };
        assert_eq!(
            object_path(&args),
            PathBuf::from("/data/pairtree_root/ar/k+/=1/30/30/=x/t1/2t/3/obj/page/1.tif")
        );
    }

    #[test]
    fn path_to_id_stops_at_boundary() {
        let (id, split) = resolve_identifier(
            Path::new("/data/pairtree_root/ar/k+/=1/30/30/=x/t1/2t/3/obj/page/1.tif"),
            Some(Path::new("/data/pairtree_root")),
        )
        .unwrap();
        assert_eq!(id, "ark:/13030/xt12t3");
        assert_eq!(split.encapsulation.as_deref(), Some("obj"));
        assert_eq!(split.address, PathBuf::from("page/1.tif"));

        let (id, split) = resolve_identifier(Path::new("ab/cd"), None).unwrap();
        assert_eq!(id, "abcd");
        assert!(split.encapsulation.is_none());
    }

    #[test]
    fn path_to_id_outside_root() {
        let err = resolve_identifier(Path::new("/elsewhere/ab"), Some(Path::new("/data"))).unwrap_err();
        assert!(matches!(err.downcast_ref::<CodecError>(), Some(CodecError::OutsideRoot { .. })));
    }

    #[test]
    fn put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("a.txt"), b"a").unwrap();
        fs::write(src.join("sub/b.txt"), b"b").unwrap();
        let store = dir.path().join("store");

        let (tree, summary) = put(&put_args(&store, vec![src], Some("doc:1"))).unwrap();
        assert_eq!(tree.objects().len(), 1);
        assert_eq!(summary.written, 2);
        assert!(store.join("pairtree_root/do/c+/1/obj/sub/b.txt").is_file());

        let dest = dir.path().join("out");
        let (obj, summary) = get(&GetArgs {
            root: store.join("pairtree_root"),
            id: "doc:1".into(),
            dest: dest.clone(),
            encapsulation: None,
        })
        .unwrap();
        assert_eq!(obj.identifier(), "doc:1");
        assert_eq!(summary.written, 2);
        assert_eq!(fs::read(dest.join("sub/b.txt")).unwrap(), b"b");
    }

    #[test]
    fn put_random_ids_and_skip_existing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, b"x").unwrap();
        let store = dir.path().join("store");

        let (tree, _) = put(&put_args(&store, vec![file.clone(), file.clone()], None)).unwrap();
        assert_eq!(tree.objects().len(), 2);
        assert_ne!(tree.objects()[0].identifier(), tree.objects()[1].identifier());

        let (_, summary) = put(&put_args(&store, vec![file.clone()], Some("same"))).unwrap();
        assert_eq!(summary.written, 1);
        let (_, summary) = put(&put_args(&store, vec![file], Some("same"))).unwrap();
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn put_with_id_merges_paths_into_one_object() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("one.txt"), b"1").unwrap();
        fs::write(b.join("two.txt"), b"2").unwrap();
        let store = dir.path().join("store");

        let (tree, summary) = put(&put_args(&store, vec![a.clone(), b], Some("doc"))).unwrap();
        assert_eq!(tree.objects().len(), 1);
        assert_eq!(tree.objects()[0].len(), 2);
        assert_eq!(summary.written, 2);

        let c = dir.path().join("c");
        fs::create_dir_all(&c).unwrap();
        fs::write(c.join("one.txt"), b"other").unwrap();
        let err = put(&put_args(&store, vec![a, c], Some("doc2"))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::AddressCollision { .. })
        ));
    }

    #[test]
    fn get_honours_prefix_and_encapsulation() {
        let dir = tempfile::tempdir().unwrap();
        let mut tree = Pairtree::default();
        let mut obj = PairtreeObject::new("ark:/1/xy").with_encapsulation("content").unwrap();
        obj.add_bytestream(ByteStream::new(MemorySource::new(b"hi".to_vec()), "f").unwrap())
            .unwrap();
        tree.add_object(obj);
        TreeWriter::new(&tree, dir.path())
            .with_identifier_prefix("ark:/1/")
            .write()
            .unwrap();

        let root = dir.path().join("pairtree_root");
        assert_eq!(find_encapsulation(&root.join("xy")).unwrap(), "content");

        let dest = dir.path().join("out");
        let (obj, _) = get(&GetArgs {
            root: root.clone(),
            id: "ark:/1/xy".into(),
            dest: dest.clone(),
            encapsulation: None,
        })
        .unwrap();
        assert_eq!(obj.identifier(), "ark:/1/xy");
        assert_eq!(fs::read(dest.join("f")).unwrap(), b"hi");

        let err = get(&GetArgs {
            root,
            id: "doi:xy".into(),
            dest,
            encapsulation: None,
        })
        .unwrap_err();
        assert!(matches!(err.downcast_ref::<FsError>(), Some(FsError::PrefixMismatch { .. })));
    }

    #[test]
    fn get_missing_object() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("pairtree_root")).unwrap();
        assert!(get(&GetArgs {
            root: dir.path().join("pairtree_root"),
            id: "nope".into(),
            dest: dir.path().join("out"),
            encapsulation: None,
        })
        .is_err());
    }
}
