use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use spak_pack::FormatKind;

#[derive(Parser)]
#[command(
    name = "spak",
    about = "Build and inspect compressed shader packages",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML file with default format and compression level
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum FormatArg {
    Default,
    Alt7bit,
    Ucsp,
}

impl From<FormatArg> for FormatKind {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Default => FormatKind::Default,
            FormatArg::Alt7bit => FormatKind::Alt7Bit,
            FormatArg::Ucsp => FormatKind::Ucsp,
        }
    }
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Pack every file under a directory into a package
    Pack(PackArgs),
    /// Write every shader in a package out as files
    Unpack(UnpackArgs),
    /// List the shaders in a package
    List(ListArgs),
    /// Write a single shader out of a package
    Extract(ExtractArgs),
    /// Re-encode a package in another format
    Convert(ConvertArgs),
}

#[derive(Args)]
pub struct PackArgs {
    pub dir: PathBuf,
    #[arg(short, long)]
    pub output: PathBuf,
    #[arg(short, long)]
    pub format: Option<FormatArg>,
    /// Deflate level 0-9
    #[arg(short, long)]
    pub level: Option<u32>,
}

#[derive(Args)]
pub struct UnpackArgs {
    pub package: PathBuf,
    #[arg(short, long)]
    pub output: PathBuf,
    #[arg(short, long)]
    pub format: Option<FormatArg>,
}

#[derive(Args)]
pub struct ListArgs {
    pub package: PathBuf,
    #[arg(short, long)]
    pub format: Option<FormatArg>,
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Args)]
pub struct ExtractArgs {
    pub package: PathBuf,
    pub name: String,
    #[arg(short, long)]
    pub output: PathBuf,
    #[arg(short, long)]
    pub format: Option<FormatArg>,
}

#[derive(Args)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    #[arg(long)]
    pub from: Option<FormatArg>,
    #[arg(long)]
    pub to: FormatArg,
    #[arg(short, long)]
    pub level: Option<u32>,
}
