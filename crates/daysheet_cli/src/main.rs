//! Command-line front end for `daysheet_core`.
//!
//! # Responsibility
//! - Apply summary text to a schedule and print the canonical result.
//! - Keep all schedule semantics in core; this binary only wires I/O.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use daysheet_core::{
    init_logging, init_stderr_logging, ReflowPolicy, ScheduleConfig, ScheduleController,
    TimeOfDay,
};
use log::debug;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "daysheet", about = "Time-block schedule summaries", version)]
struct Cli {
    #[command(flatten)]
    schedule: ScheduleArgs,
    /// Log to stderr at debug level.
    #[arg(long, global = true)]
    verbose: bool,
    /// Write rotating log files to this absolute directory instead.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct ScheduleArgs {
    /// JSON schedule config (stepMinutes, windowStart, windowEnd, reflowPolicy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Window start, HH:MM.
    #[arg(long, global = true)]
    start: Option<TimeOfDay>,
    /// Window end, HH:MM.
    #[arg(long, global = true)]
    end: Option<TimeOfDay>,
    /// Step in minutes.
    #[arg(long, global = true)]
    step: Option<u32>,
    /// Reflow policy for boundary edits.
    #[arg(long, global = true, value_enum)]
    policy: Option<PolicyArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Cascade,
    AlignNext,
}

impl From<PolicyArg> for ReflowPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Cascade => Self::Cascade,
            PolicyArg::AlignNext => Self::AlignNext,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse summary text and print it in canonical merged form.
    Normalize(InputArgs),
    /// Parse summary text and print the resulting blocks.
    Blocks(BlocksArgs),
    /// Print the step-aligned time options of one day.
    Options,
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Summary file; reads stdin when omitted.
    input: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct BlocksArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_logging(cli.verbose, cli.log_dir.as_deref())?;

    let config = resolve_config(&cli.schedule)?;
    let mut schedule = ScheduleController::try_new(&config).context("invalid schedule config")?;

    match cli.command {
        Commands::Normalize(args) => {
            apply_input(&mut schedule, &args, cli.verbose)?;
            println!("{}", schedule.summary_text());
        }
        Commands::Blocks(args) => {
            apply_input(&mut schedule, &args.input, cli.verbose)?;
            print_blocks(&schedule, args.json)?;
        }
        Commands::Options => {
            for time in schedule.time_options() {
                println!("{time}");
            }
        }
    }
    Ok(())
}

fn init_cli_logging(verbose: bool, log_dir: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let outcome = match log_dir {
        Some(dir) => {
            let dir = dir
                .to_str()
                .context("log directory must be valid UTF-8")?;
            init_logging(level, dir)
        }
        None => init_stderr_logging(level),
    };
    outcome.map_err(anyhow::Error::msg)
}

fn resolve_config(args: &ScheduleArgs) -> Result<ScheduleConfig> {
    let mut config = match &args.config {
        Some(path) => ScheduleConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScheduleConfig::default(),
    };
    if let Some(step) = args.step {
        config.step_minutes = step;
    }
    if let Some(start) = args.start {
        config.window_start = start;
    }
    if let Some(end) = args.end {
        config.window_end = end;
    }
    if let Some(policy) = args.policy {
        config.reflow_policy = policy.into();
    }
    Ok(config)
}

fn apply_input(schedule: &mut ScheduleController, args: &InputArgs, verbose: bool) -> Result<()> {
    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            buffer
        }
    };

    schedule.set_summary_text(text);
    if let Some(report) = schedule.last_decode() {
        debug!(
            "event=cli_apply module=cli status=ok accepted={} discarded={}",
            report.accepted, report.discarded
        );
        if verbose && report.discarded > 0 {
            eprintln!("skipped {} unreadable line(s)", report.discarded);
        }
    }
    Ok(())
}

fn print_blocks(schedule: &ScheduleController, json: bool) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(schedule.blocks())?;
        println!("{rendered}");
        return Ok(());
    }

    println!(
        "window {}-{} step {}m",
        schedule.window_start(),
        schedule.window_end(),
        schedule.step_minutes()
    );
    for block in schedule.blocks() {
        let marker = if block.label.is_user_set() { '*' } else { ' ' };
        println!("{}-{} {} {}", block.start, block.end, marker, block.text());
    }
    Ok(())
}
