mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{check, key, migrate, run, CheckArgs, KeyArgs, MigrateArgs, RunArgs};
use tracing_subscriber::EnvFilter;

/// Quire CLI - structural editing for sectioned documents
#[derive(Parser, Debug)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log every editing decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check documents against the content rules
    Check(CheckArgs),

    /// Wrap a legacy flat document into sections
    Migrate(MigrateArgs),

    /// Run one structural command at a cursor position
    Run(RunArgs),

    /// Press a key at a cursor position
    Key(KeyArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Documents go to stdout, so logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Check(args) => check(args, &cwd),
                Command::Migrate(args) => migrate(args, &cwd),
                Command::Run(args) => run(args, &cwd),
                Command::Key(args) => key(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
