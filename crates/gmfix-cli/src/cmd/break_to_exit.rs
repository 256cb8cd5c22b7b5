use anyhow::Result;
use clap::Args;
use gmfix_core::batch::rewrite_keyword;
use std::path::PathBuf;
use tracing::info;

use crate::cmd::CommandContext;
use crate::output::render_summary;

/// Arguments for `gmfix break-to-exit`.
#[derive(Args, Debug)]
pub struct BreakToExitArgs {
    /// 2.x project folder (holds the *.yyp file).
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,
}

/// Rewrite the configured keyword (`break` by default) in every script that
/// contains none of the stop-words.
///
/// # Errors
///
/// Returns the precondition failure when the folder is not a 2.x project.
pub fn run_break_to_exit(args: &BreakToExitArgs, ctx: &CommandContext) -> Result<()> {
    let gate = ctx.config.rewrite.gate();
    info!(
        dir = %args.dir.display(),
        target = %gate.target,
        replacement = %gate.replacement,
        "rewriting keyword"
    );

    let mut printer = ctx.printer();
    let summary = rewrite_keyword(&args.dir, &gate, &mut printer)?;
    render_summary(ctx.mode, "break-to-exit", &summary)
}
