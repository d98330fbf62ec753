//! CLI argument definitions for versave.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "versave",
    version,
    about = "Versioned saves for single-file projects",
    long_about = "Save project files as numbered versions (scene_v1.blend, scene_v2.blend, ...).\n\n\
                  Earlier versions are never overwritten. Numbered backups left by\n\
                  in-place saves are moved into a backup/ folder."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Settings file (default: versave.toml in the platform config folder).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start a new project folder with its first version.
    Init(InitArgs),

    /// Save a file in place and move its numbered backups away.
    Save(FileArgs),

    /// Save a file as the next version of its project.
    Next(FileArgs),

    /// List the versions of the project a file belongs to.
    List(ListArgs),

    /// Switch from the current file to another version.
    Open(OpenArgs),

    /// Move numbered backups of a file into the backup folder.
    Rotate(FileArgs),

    /// List the rotated backups of a file.
    Backups(ListArgs),

    /// Delete one rotated backup.
    DeleteBackup(DeleteBackupArgs),
}

#[derive(Parser)]
pub struct InitArgs {
    /// Where the project should go, e.g. `work/scene.blend`.
    #[arg(value_name = "CANDIDATE")]
    pub candidate: PathBuf,

    /// Seed the first version with the contents of this file.
    #[arg(long = "from", value_name = "FILE")]
    pub from: Option<PathBuf>,
}

#[derive(Parser)]
pub struct FileArgs {
    /// The working file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

#[derive(Parser)]
pub struct ListArgs {
    /// The working file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct OpenArgs {
    /// The file open now.
    #[arg(value_name = "CURRENT")]
    pub current: PathBuf,

    /// The version to switch to.
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Treat the current file as having unsaved changes.
    #[arg(long = "modified")]
    pub modified: bool,
}

#[derive(Parser)]
pub struct DeleteBackupArgs {
    /// The working file the backup belongs to.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Backup slot (1 is the newest).
    #[arg(value_name = "SLOT")]
    pub slot: u32,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
