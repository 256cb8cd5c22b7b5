#![forbid(unsafe_code)]

mod cmd;
mod output;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use gmfix_core::PreconditionFailure;
use gmfix_core::config::load_config;
use output::{CliError, OutputMode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "gmfix: restore and rewrite code in GameMaker projects",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print error notes.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (default: <config_dir>/gmfix/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Migration",
        about = "Copy codes from a split export into a 1.x project",
        after_help = "EXAMPLES:\n    gmfix restore-codes --split ./export --project ./MyGame.gmx\n\n    # Events only, without carriage-return references\n    gmfix restore-codes --split ./export --project ./MyGame.gmx --skip-scripts --skip-rooms --strip-cr"
    )]
    RestoreCodes(cmd::restore::RestoreArgs),

    #[command(
        next_help_heading = "Migration",
        about = "Rewrite 'break' to 'exit' in 2.x scripts",
        after_help = "Scripts containing for, while, repeat, do, switch or with are skipped.\n\nEXAMPLES:\n    gmfix break-to-exit ./MyGame"
    )]
    BreakToExit(cmd::break_to_exit::BreakToExitArgs),

    #[command(
        next_help_heading = "Migration",
        about = "Replace text in every 2.x script",
        after_help = "EXAMPLES:\n    gmfix replace ./MyGame --rename draw_set_blend_mode_ext=gpu_set_blendmode_ext"
    )]
    Replace(cmd::replace::ReplaceArgs),

    #[command(about = "Generate shell completions")]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("GMFIX_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "gmfix=debug,info"
        } else {
            "gmfix=info,warn"
        })
    });

    let format = env::var("GMFIX_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        cmd::completions::run_completions(args.shell, &mut command)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(cli.config.as_deref()).context("Failed to load gmfix config")?;
    debug!(?config, "loaded config");

    let ctx = cmd::CommandContext {
        mode: cli.output_mode(),
        quiet: cli.quiet,
        config,
    };

    let result = match &cli.command {
        Commands::RestoreCodes(args) => cmd::restore::run_restore(args, &ctx),
        Commands::BreakToExit(args) => cmd::break_to_exit::run_break_to_exit(args, &ctx),
        Commands::Replace(args) => cmd::replace::run_replace(args, &ctx),
        Commands::Completions(_) => Ok(()),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<PreconditionFailure>() {
            Some(failure) => {
                info!(code = %failure.code(), "aborted before touching any file");
                output::render_error(ctx.mode, &CliError::from(failure))?;
                Ok(ExitCode::from(2))
            }
            None => Err(err),
        },
    }
}
