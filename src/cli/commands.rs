use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tm", about = concat!("[x] tickmark v", env!("CARGO_PKG_VERSION"), " - cycle and copy checkbox tasks in markdown"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different vault directory
    #[arg(short = 'C', long = "vault-dir", global = true)]
    pub vault_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default .tickmark/config.toml
    Init(InitArgs),
    /// Advance the status of one task
    Cycle(CycleArgs),
    /// Duplicate a task
    Dup(DupArgs),
    /// Describe what a duplication would do
    Describe(DescribeArgs),
    /// Show the status that follows a mark
    Next(NextArgs),
    /// Show the recovery and diagnostics log
    Log(LogArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct CycleArgs {
    /// Document path, relative to the vault
    pub file: String,
    /// Line of the task relative to its block (0-based)
    #[arg(long)]
    pub line: usize,
    /// Document line where the block starts (default: 0)
    #[arg(long, conflicts_with = "container")]
    pub section_start: Option<usize>,
    /// Character range of an enclosing callout: START..END
    #[arg(long, value_parser = parse_range)]
    pub container: Option<(usize, usize)>,
    /// Mark currently shown for the task (default: the stored mark)
    #[arg(long)]
    pub mark: Option<String>,
}

#[derive(Args)]
pub struct DupArgs {
    /// Document holding the task
    pub file: String,
    /// 0-based line of the task
    pub line: usize,
    /// Target document (default: same document)
    #[arg(long)]
    pub to: Option<String>,
    /// Heading to insert under
    #[arg(long)]
    pub section: Option<String>,
    /// Keep completion and scheduled dates
    #[arg(long)]
    pub keep_metadata: bool,
}

#[derive(Args)]
pub struct DescribeArgs {
    /// Target document
    #[arg(long)]
    pub to: Option<String>,
    /// Heading to insert under
    #[arg(long)]
    pub section: Option<String>,
}

#[derive(Args)]
pub struct NextArgs {
    /// Current mark (use quotes for a space)
    pub mark: String,
}

#[derive(Args)]
pub struct LogArgs {
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

fn parse_range(s: &str) -> Result<(usize, usize), String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{}'", s))?;
    let start = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid range start '{}'", start))?;
    let end = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid range end '{}'", end))?;
    Ok((start, end))
}
