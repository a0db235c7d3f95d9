use clap::{Parser, ValueEnum};
use jvz_core::SourceEncoding;
use std::path::PathBuf;

/// CLI arguments for the jvz binary.
#[derive(Parser, Debug)]
#[command(
    name = "jvz",
    version,
    about = "Parse a Java 7 project and resolve its bindings"
)]
pub struct CliArgs {
    /// Project directory laid out as `src/`, `libs/*.jar` and `classes/`.
    #[arg(default_value = ".")]
    pub project: PathBuf,

    /// Path to a jvz.json file (defaults to `PROJECT/jvz.json` when present).
    #[arg(long)]
    pub config: Option<PathBuf>,

    // ==================== Inputs ====================
    /// Source root to scan for `.java` files. Repeatable; replaces `PROJECT/src`.
    #[arg(long = "source-root", alias = "sourceRoot")]
    pub source_roots: Vec<PathBuf>,

    /// Class directories and archives, separated by the platform path separator.
    #[arg(long, alias = "cp")]
    pub classpath: Option<String>,

    /// Encoding of source files without a byte order mark.
    #[arg(long)]
    pub encoding: Option<SourceEncoding>,

    /// Glob of source paths to skip. Repeatable.
    #[arg(long)]
    pub exclude: Vec<String>,

    // ==================== Analysis ====================
    /// Parse only; skip classpath resolution and binding.
    #[arg(long = "no-bindings", alias = "noBindings")]
    pub no_bindings: bool,

    /// Do not index the embedded boot library.
    #[arg(long = "no-boot", alias = "noBoot")]
    pub no_boot: bool,

    /// Number of worker threads.
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Process files one at a time on the main thread.
    #[arg(long)]
    pub sequential: bool,

    // ==================== Output ====================
    /// Also list warnings.
    #[arg(long)]
    pub warnings: bool,

    /// Report format.
    #[arg(long, value_enum, ignore_case = true)]
    pub format: Option<OutputFormat>,

    /// Colors and source snippets (defaults to on for terminals).
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub pretty: Option<bool>,

    /// Wait for enter after indexing the classpath, e.g. to attach a profiler.
    #[arg(long)]
    pub pause: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
