use anyhow::{Result, bail};
use clap::Args;
use gmfix_core::batch::replace_tokens;
use std::path::PathBuf;
use tracing::info;

use crate::cmd::CommandContext;
use crate::output::render_summary;

/// Arguments for `gmfix replace`.
#[derive(Args, Debug)]
pub struct ReplaceArgs {
    /// 2.x project folder (holds the *.yyp file).
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Replacement pair, applied in the order given. Repeatable.
    /// Falls back to the `[[renames]]` entries of the config file.
    #[arg(long = "rename", value_name = "FROM=TO", value_parser = parse_rename)]
    pub renames: Vec<(String, String)>,
}

/// Parse `FROM=TO`. `TO` may be empty; `FROM` may not.
fn parse_rename(raw: &str) -> Result<(String, String), String> {
    let (from, to) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FROM=TO, got \"{raw}\""))?;
    if from.is_empty() {
        return Err("FROM must not be empty".to_string());
    }
    Ok((from.to_string(), to.to_string()))
}

/// Apply rename pairs to every script in a 2.x project.
///
/// # Errors
///
/// Fails when no pairs are available, or with the precondition failure when
/// the folder is not a 2.x project.
pub fn run_replace(args: &ReplaceArgs, ctx: &CommandContext) -> Result<()> {
    let pairs = if args.renames.is_empty() {
        ctx.config.rename_pairs()
    } else {
        args.renames.clone()
    };
    if pairs.is_empty() {
        bail!("no rename pairs: pass --rename FROM=TO or add [[renames]] entries to the config");
    }
    info!(dir = %args.dir.display(), pairs = pairs.len(), "replacing tokens");

    let mut printer = ctx.printer();
    let summary = replace_tokens(&args.dir, &pairs, &mut printer)?;
    render_summary(ctx.mode, "replace", &summary)
}
