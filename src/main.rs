// Fri Oct 16 2026 - Alex

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use thread_promise::{
    config::Config,
    engine::{Engine, SettledSummary, Task},
    utils::{self, logging, LoggingUtils},
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Combinator {
    All,
    AllSettled,
    Any,
    Race,
}

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Run sleeping tasks through a promise combinator", long_about = None)]
struct Args {
    #[arg(short, long, value_enum, default_value = "all")]
    combinator: Combinator,

    /// Sleep per task in milliseconds, one task per entry
    #[arg(short, long, value_delimiter = ',', default_value = "100,50")]
    delays: Vec<u64>,

    /// Indices of tasks that panic after sleeping
    #[arg(short, long, value_delimiter = ',')]
    fail: Vec<usize>,

    #[arg(long)]
    config: Option<PathBuf>,

    /// -v info, -vv debug, -vvv trace; RUST_LOG applies when absent
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();

    if args.verbose > 0 {
        LoggingUtils::init_logger(LoggingUtils::level_from_verbosity(args.verbose));
    } else {
        logging::init_from_env();
    }

    if let Err(e) = run(&args) {
        eprintln!("{} {:#}", "[!]".red(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    if let Some(&index) = args.fail.iter().find(|&&i| i >= args.delays.len()) {
        bail!("--fail index {} is out of range for {} tasks", index, args.delays.len());
    }

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };

    let engine = Engine::new(config);
    let tasks = build_tasks(&args.delays, &args.fail);

    println!(
        "{} Running {} through {:?}",
        "[*]".blue(),
        utils::pluralize(tasks.len(), "task", "tasks"),
        args.combinator
    );

    let start = Instant::now();

    let outcome = match args.combinator {
        Combinator::All => engine.all(&tasks).map(|values| format!("{:?}", values)),
        Combinator::AllSettled => {
            let settled = engine.all_settled(&tasks);
            let summary = SettledSummary::from_settlements(&settled);
            for (index, settlement) in settled.iter().enumerate() {
                let tag = if settlement.is_fulfilled() {
                    settlement.to_string().green()
                } else {
                    settlement.to_string().red()
                };
                println!("  task {}: {}", index, tag);
            }
            Ok(format!("{}/{} fulfilled", summary.fulfilled, summary.total()))
        }
        Combinator::Any => engine.any(&tasks),
        Combinator::Race => engine.race(&tasks),
    };

    let elapsed = utils::format_duration(start.elapsed());

    match outcome {
        Ok(value) => {
            println!("{} {} in {}", "[+]".green(), value, elapsed);
            Ok(())
        }
        Err(e) => bail!("{} (after {})", e, elapsed),
    }
}

fn build_tasks(delays: &[u64], fail: &[usize]) -> Vec<Task<String>> {
    delays.iter()
        .enumerate()
        .map(|(index, &ms)| {
            let fails = fail.contains(&index);
            Task::named(format!("demo-{}", index), move || {
                thread::sleep(Duration::from_millis(ms));
                if fails {
                    panic!("task {} failed after {}ms", index, ms);
                }
                format!("task {} ({}ms)", index, ms)
            })
        })
        .collect()
}
