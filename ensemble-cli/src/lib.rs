#![warn(missing_docs)]
//! Ensemble CLI Library
//!
//! Loads the declared suite and runs its groups under process or thread
//! isolation. Call `ensemble::run()` (or `ensemble_cli::run()`) from a
//! binary that links the declaration files in.
//!
//! # Example
//!
//! ```ignore
//! use ensemble::prelude::*;
//!
//! fn register(suite: &mut SuiteBuilder) {
//!     suite.group("arithmetic", |g| {
//!         g.report("add", |r| {
//!             r.control("Integer", || 1 + 1);
//!             r.test("Float", || 1.0 + 1.0);
//!         });
//!     });
//! }
//! ensemble::declare!(register);
//!
//! fn main() -> anyhow::Result<()> {
//!     ensemble::run()
//! }
//! ```

mod config;
mod loader;
mod runner;
mod shell;

pub use config::*;
pub use loader::{LoadError, SuiteLoader};
pub use runner::{
    Failure, ProcessRunner, RunError, Runner, RunnerKind, ThreadRunner, WorkFactory, WorkUnit,
};
pub use shell::{ConsoleShell, Line, MemoryShell, Shell};

use clap::{Parser, Subcommand};
use ensemble_core::{Group, Registered, Report, SuiteBuilder, SuiteError, Test};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Ensemble CLI arguments
#[derive(Parser, Debug)]
#[command(name = "ensemble")]
#[command(author, version, about = "Ensemble - isolated group runner for benchmark suites")]
pub struct Cli {
    /// Subcommand; defaults to `run`
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory scanned for declaration files
    #[arg(long, global = true)]
    pub tests_dir: Option<PathBuf>,

    /// File loaded once before any declaration file
    #[arg(long, global = true)]
    pub setup_file: Option<PathBuf>,

    /// File-name pattern selecting declaration files
    #[arg(long, global = true)]
    pub pattern: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Internal: Absorb cargo bench's --bench flag
    #[arg(long, hide = true, global = true)]
    pub bench: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List groups, reports and tests
    List {
        /// Only list these groups (comma-separated)
        #[arg(long, value_delimiter = ',')]
        groups: Vec<String>,
    },
    /// Run one group, or every selected group concurrently
    Run(RunArgs),
    /// Write a default ensemble.toml in the current directory
    Init,
}

/// Arguments of the `run` command
#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Run only this group
    pub group: Option<String>,

    /// Only exercise this report
    #[arg(long)]
    pub report: Option<String>,

    /// Only exercise this test (within the selected reports)
    #[arg(long)]
    pub test: Option<String>,

    /// Restrict the suite to these groups (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Isolation strategy
    #[arg(long, value_enum)]
    pub strategy: Option<RunnerKind>,

    /// Invocations of each test's work
    #[arg(long)]
    pub iterations: Option<u64>,
}

/// Run the Ensemble CLI, parsing arguments from the command line.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Ensemble CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Discover ensemble.toml configuration (CLI flags override)
    let mut config = EnsembleConfig::discover().unwrap_or_default();
    apply_overrides(&mut config, &cli);

    let filter = if config.output.verbose {
        "ensemble=debug"
    } else {
        "ensemble=info"
    };
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();

    let shell: Arc<dyn Shell> = Arc::new(ConsoleShell);
    match cli.command {
        Some(Commands::List { ref groups }) => list_suite(&config, groups, shell.as_ref()),
        Some(Commands::Run(ref args)) => run_suite(&config, args, shell),
        Some(Commands::Init) => init_config(),
        None => run_suite(&config, &RunArgs::default(), shell),
    }
}

fn apply_overrides(config: &mut EnsembleConfig, cli: &Cli) {
    if let Some(dir) = &cli.tests_dir {
        config.suite.tests_dir = dir.clone();
    }
    if let Some(setup) = &cli.setup_file {
        config.suite.setup_file = Some(setup.clone());
    }
    if let Some(pattern) = &cli.pattern {
        config.suite.pattern = pattern.clone();
    }
    if cli.verbose {
        config.output.verbose = true;
    }
    if let Some(Commands::Run(args)) = &cli.command {
        if let Some(strategy) = args.strategy {
            config.runner.strategy = strategy;
        }
        if let Some(iterations) = args.iterations {
            config.runner.iterations = iterations;
        }
    }
}

/// Print the suite as an indented tree, marking controls.
pub fn list_suite(
    config: &EnsembleConfig,
    groups: &[String],
    shell: &dyn Shell,
) -> anyhow::Result<()> {
    let mut builder = SuiteBuilder::new();
    let suite = SuiteLoader::new(&config.suite, &Registered)
        .with_groups(groups.to_vec())
        .load(&mut builder)?;

    for group in suite.groups() {
        shell.say(&format!("{} ({} tests)", group.name(), group.size()));
        for report in group.reports() {
            shell.say(&format!("  {}", report.name()));
            for test in report.tests() {
                let marker = if test.is_control() { " [control]" } else { "" };
                shell.say(&format!("    {}{marker}", test.name()));
            }
        }
    }

    shell.say(&format!(
        "\n{} groups, {} tests",
        suite.len(),
        suite.groups().iter().map(|g| g.size()).sum::<usize>()
    ));
    Ok(())
}

/// Load the suite and run the selected groups with the configured runner.
pub fn run_suite(
    config: &EnsembleConfig,
    args: &RunArgs,
    shell: Arc<dyn Shell>,
) -> anyhow::Result<()> {
    let mut builder = SuiteBuilder::new();
    let suite = SuiteLoader::new(&config.suite, &Registered)
        .with_groups(args.groups.clone())
        .load(&mut builder)?;

    let iterations = config.runner.iterations;
    let report = args.report.as_deref();
    let test = args.test.as_deref();
    let factory: &WorkFactory<'_> = &|group: &Group| {
        let group = group.clone();
        Box::new(move || exercise(&group, report, test, iterations))
    };

    let runner = config.runner.strategy.build(shell);
    debug!(strategy = ?config.runner.strategy, groups = suite.len(), "running suite");
    runner.run(&suite, args.group.as_deref(), factory)?;
    Ok(())
}

/// Work unit of the built-in `run` command: call each selected test's
/// work `iterations` times.
pub fn exercise(
    group: &Group,
    report: Option<&str>,
    test: Option<&str>,
    iterations: u64,
) -> anyhow::Result<()> {
    if !group.has_tests() {
        return Err(SuiteError::GroupEmpty(group.name().to_string()).into());
    }

    let reports: Vec<&Report> = match report {
        Some(name) => vec![group.find_report(name)?],
        None => group.reports().iter().collect(),
    };

    for report in reports {
        let tests: Vec<&Test> = match test {
            Some(name) => vec![report.find_test(name)?],
            None => report.tests().iter().collect(),
        };
        for test in tests {
            for _ in 0..iterations {
                test.call();
            }
            debug!(
                group = group.name(),
                report = report.name(),
                test = test.name(),
                iterations,
                "exercised test"
            );
        }
    }
    Ok(())
}

fn init_config() -> anyhow::Result<()> {
    let path = PathBuf::from(CONFIG_FILE_NAME);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    std::fs::write(&path, EnsembleConfig::default_toml())?;
    println!("Created {}", path.display());
    Ok(())
}
