mod init;
pub use init::cmd_init;

use std::path::PathBuf;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::recovery;
use crate::io::store::{DocumentStore, is_canvas_path};
use crate::io::{VaultStore, config_io};
use crate::model::config::{DuplicateConfig, TickmarkConfig};
use crate::model::location::{RenderContext, TaskElement};
use crate::model::task::Task;
use crate::ops::canvas::UnsupportedCanvas;
use crate::ops::duplicate::{describe_duplicate, duplicate_task};
use crate::ops::locate::resolve_location;
use crate::ops::status_cycle::{CompletionListener, StatusCycler, next_transition};
use crate::parse::checkbox::checkbox_mark;
use crate::parse::task_line::{MarkdownTaskParser, TaskLineParser};
use crate::parse::split_lines;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.vault_dir.as_deref())?;

    match cli.command {
        Commands::Init(args) => cmd_init(args, &start),
        Commands::Describe(args) => cmd_describe(args, json),
        Commands::Cycle(args) => cmd_cycle(args, &open_vault(start)?, json),
        Commands::Dup(args) => cmd_dup(args, &open_vault(start)?, json),
        Commands::Next(args) => cmd_next(args, &open_vault(start)?, json),
        Commands::Log(args) => cmd_log(args, &open_vault(start)?, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Vault {
    store: VaultStore,
    config: TickmarkConfig,
}

fn start_dir(override_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match override_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

/// The nearest enclosing vault, or `start` itself when none is configured.
fn open_vault(start: PathBuf) -> Result<Vault, Box<dyn std::error::Error>> {
    let root = config_io::discover_vault(&start).unwrap_or(start);
    let config = config_io::load_config(&root)?;
    Ok(Vault {
        store: VaultStore::new(root),
        config,
    })
}

fn parser_for(config: &TickmarkConfig) -> MarkdownTaskParser {
    MarkdownTaskParser::new(config.parser.metadata_format)
}

/// Reports completions on stdout
struct PrintCompleted;

impl CompletionListener for PrintCompleted {
    fn task_completed(&self, task: &Task) {
        println!("completed: {}", task.content);
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_cycle(args: CycleArgs, vault: &Vault, json: bool) -> CmdResult {
    let ctx = match args.container {
        Some((start, end)) => RenderContext::container(&args.file, start, end),
        None => RenderContext::section(&args.file, args.section_start.unwrap_or(0)),
    };

    let mark = match args.mark {
        Some(m) => m,
        None => stored_mark(vault, &ctx, args.line)?,
    };
    let element = TaskElement::new(args.line, &mark);

    let mut cycler = StatusCycler::new(vault.config.status.clone())
        .with_parser(parser_for(&vault.config))
        .with_diagnostics(vault.store.state_dir());
    if !json {
        cycler = cycler.with_listener(PrintCompleted);
    }

    let outcome = cycler.cycle_status(&vault.store, &element, &ctx);
    if json {
        let out = CycleJson {
            changed: outcome.is_some(),
            outcome,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", format_cycle(outcome.as_ref()));
    }
    Ok(())
}

/// The mark currently stored at the clicked line.
fn stored_mark(
    vault: &Vault,
    ctx: &RenderContext,
    line: usize,
) -> Result<String, Box<dyn std::error::Error>> {
    let content = vault.store.read(&ctx.source_path)?;
    let loc = resolve_location(&TaskElement::new(line, " "), ctx.hint.as_ref(), &content)?;
    let mark = checkbox_mark(&loc.line_text)
        .ok_or_else(|| format!("line {} is not a task", loc.line_index))?;
    Ok(mark.to_string())
}

fn cmd_dup(args: DupArgs, vault: &Vault, json: bool) -> CmdResult {
    if is_canvas_path(&args.file) {
        return Err("canvas documents are not supported by this build".into());
    }

    let task = load_task(vault, &args.file, args.line);
    let config = DuplicateConfig {
        target_file: args.to,
        target_section: args.section,
        preserve_metadata: args.keep_metadata,
    };

    let result = duplicate_task(&vault.store, &UnsupportedCanvas, &task, &config);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    match (result.success, result.error) {
        (true, _) => {
            if !json && let Some(message) = result.message {
                println!("{}", message);
            }
            Ok(())
        }
        (false, error) => Err(error
            .unwrap_or_else(|| "Failed to duplicate task".to_string())
            .into()),
    }
}

/// Capture the task at `line` of `file`. A missing document or line still
/// yields a task so the duplication reports the failure itself.
fn load_task(vault: &Vault, file: &str, line: usize) -> Task {
    let text = vault
        .store
        .read(file)
        .ok()
        .and_then(|content| split_lines(&content).into_iter().nth(line))
        .unwrap_or_default();

    parser_for(&vault.config)
        .parse(file, &text, line)
        .unwrap_or_else(|| Task::new_text(file, line, &text, " "))
}

fn cmd_describe(args: DescribeArgs, json: bool) -> CmdResult {
    let description = describe_duplicate(&DuplicateConfig {
        target_file: args.to,
        target_section: args.section,
        preserve_metadata: false,
    });
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&DescribeJson { description })?
        );
    } else {
        println!("{}", description);
    }
    Ok(())
}

fn cmd_next(args: NextArgs, vault: &Vault, json: bool) -> CmdResult {
    let transition = next_transition(&vault.config.status, &args.mark)
        .ok_or("every status is excluded from the cycle")?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&NextJson::new(&args.mark, &transition))?
        );
    } else {
        println!("{}", format_next(&args.mark, &transition));
    }
    Ok(())
}

fn cmd_log(args: LogArgs, vault: &Vault, json: bool) -> CmdResult {
    let limit = args.limit.unwrap_or(10);
    let entries = recovery::read_recovery_entries(&vault.store.state_dir(), Some(limit));

    if json {
        let values: Vec<_> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("recovery log is empty");
        return Ok(());
    }
    for entry in &entries {
        print!("{}", entry.to_display_markdown());
    }
    Ok(())
}
