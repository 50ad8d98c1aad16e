use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pairtree",
    about = "Pairtree identifier mapping and object storage",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Map an identifier to its pairtree path
    IdToPath(IdToPathArgs),
    /// Map a pairtree path back to its identifier
    PathToId(PathToIdArgs),
    /// List the objects in a pairtree
    Ls(LsArgs),
    /// Store files or directories as pairtree objects
    Put(PutArgs),
    /// Copy one object's files out of a pairtree
    Get(GetArgs),
}

#[derive(Args)]
pub struct IdToPathArgs {
    pub id: String,
    /// Pairtree root to prepend
    #[arg(long)]
    pub root: Option<PathBuf>,
    /// Encapsulation directory to append
    #[arg(long)]
    pub encapsulation: Option<String>,
    /// Intra-object address to append after the encapsulation directory
    #[arg(long, requires = "encapsulation")]
    pub address: Option<PathBuf>,
}

#[derive(Args)]
pub struct PathToIdArgs {
    pub path: PathBuf,
    /// Pairtree root the path lies under
    #[arg(long)]
    pub root: Option<PathBuf>,
}

#[derive(Args)]
pub struct LsArgs {
    pub root: PathBuf,
    /// Treat files directly in the root as corruption
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct PutArgs {
    /// Directory that holds (or will hold) the pairtree root
    pub containing_dir: PathBuf,
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Store every path in one object with this identifier; one random object per path when omitted
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long, default_value = "pairtree_root")]
    pub root_name: String,
    #[arg(long, default_value = "obj")]
    pub encapsulation: String,
    /// Overwrite files that already exist
    #[arg(long)]
    pub clobber: bool,
}

#[derive(Args)]
pub struct GetArgs {
    pub root: PathBuf,
    pub id: String,
    pub dest: PathBuf,
    /// Encapsulation directory to read; detected when omitted
    #[arg(long)]
    pub encapsulation: Option<String>,
}
