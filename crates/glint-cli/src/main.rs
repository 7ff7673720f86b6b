//! Glint CLI
//!
//! Command-line interface for the glint analysis engine

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use glint_core::init_tracing;
use tracing::error;

#[derive(Parser)]
#[command(name = "glint")]
#[command(about = "Glint: rule-based analysis and repair for C# sources")]
#[command(version = glint_core::VERSION)]
#[command(
    long_about = "Glint finds code that does needless work or reads worse than an equivalent\n\
spelling, and rewrites it while keeping comments and layout intact.\n\
\n\
Examples:\n  \
glint check                  # Check the current directory\n  \
glint check --format json .  # Machine-readable diagnostics\n  \
glint fix --dry-run src/     # Show the fixes as a diff\n  \
glint rules                  # List all available rules"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(
        short,
        long,
        global = true,
        help = "Path to configuration file (.glintrc.toml/.glintrc.json)"
    )]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads to use for parallel processing
    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of threads (default: number of CPU cores)"
    )]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report diagnostics for C# files
    #[command(alias = "lint")]
    Check {
        /// Files or directories to check
        #[arg(help = "Files or directories to process (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text", help = "Output format for diagnostics")]
        format: OutputFormat,

        /// Print the offending line under each diagnostic
        #[arg(long, help = "Show the source line of each diagnostic")]
        show_source: bool,
    },

    /// Apply fixes until no fixable diagnostic remains
    Fix {
        /// Files or directories to fix
        #[arg(help = "Files or directories to process (default: current directory)")]
        paths: Vec<PathBuf>,

        /// Show fixes without applying them
        #[arg(long, help = "Print a unified diff instead of writing files")]
        dry_run: bool,

        /// Upper bound on fix passes per file
        #[arg(
            long,
            default_value_t = glint_rules::DEFAULT_MAX_FIX_ITERATIONS,
            help = "Maximum number of fixes applied to one file"
        )]
        max_iterations: usize,
    },

    /// List the available rules
    Rules {
        /// Output format
        #[arg(short, long, default_value = "text", help = "Output format for the rule table")]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    /// Human-readable output
    Text,
    /// JSON format for programmatic consumption
    Json,
}

impl From<OutputFormat> for glint_core::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// Options shared by every command
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub no_color: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "glint=warn",
        1 => glint_core::DEFAULT_LOG_FILTER,
        2 => "glint=debug",
        _ => "glint=trace",
    };
    init_tracing(log_level);

    if let Some(threads) = cli.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        error!("Failed to set thread pool size: {}", e);
        return ExitCode::from(2);
    }

    match run_command(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("glint failed: {e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let options = GlobalOptions {
        config: cli.config,
        no_color: cli.no_color || std::env::var_os("NO_COLOR").is_some(),
    };
    match cli.command {
        Commands::Check {
            paths,
            format,
            show_source,
        } => commands::check::check_command(paths, format.into(), show_source, &options),
        Commands::Fix {
            paths,
            dry_run,
            max_iterations,
        } => commands::fix::fix_command(paths, dry_run, max_iterations, &options),
        Commands::Rules { format } => commands::rules::rules_command(format.into()),
    }
}
