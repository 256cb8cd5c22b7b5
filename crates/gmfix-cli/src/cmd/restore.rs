use anyhow::Result;
use clap::Args;
use gmfix_core::batch::{OutputOptions, RestoreOptions, restore_codes};
use std::path::PathBuf;
use tracing::info;

use crate::cmd::CommandContext;
use crate::output::render_summary;

/// Arguments for `gmfix restore-codes`.
#[derive(Args, Debug)]
pub struct RestoreArgs {
    /// Folder written by the splitting tool (holds Scripts/, Objects/, Rooms/).
    #[arg(long, value_name = "DIR")]
    pub split: PathBuf,

    /// 1.x project folder (holds the *.project.gmx file).
    #[arg(long, value_name = "DIR")]
    pub project: PathBuf,

    /// Do not copy scripts.
    #[arg(long)]
    pub skip_scripts: bool,

    /// Do not restore object event codes.
    #[arg(long)]
    pub skip_objects: bool,

    /// Do not restore room and instance creation codes.
    #[arg(long)]
    pub skip_rooms: bool,

    /// Remove `&#xD;` references from rewritten documents.
    #[arg(long)]
    pub strip_cr: bool,
}

impl RestoreArgs {
    fn options(&self, ctx: &CommandContext) -> RestoreOptions {
        RestoreOptions {
            scripts: !self.skip_scripts,
            objects: !self.skip_objects,
            rooms: !self.skip_rooms,
            output: OutputOptions {
                strip_cr_entities: self.strip_cr || ctx.config.output.strip_cr_entities,
            },
        }
    }
}

/// Copy codes from a split export into a 1.x project.
///
/// # Errors
///
/// Returns the precondition failure when either folder is unusable.
pub fn run_restore(args: &RestoreArgs, ctx: &CommandContext) -> Result<()> {
    let options = args.options(ctx);
    info!(
        split = %args.split.display(),
        project = %args.project.display(),
        ?options,
        "restoring codes"
    );

    let mut printer = ctx.printer();
    let summary = restore_codes(&args.split, &args.project, &options, &mut printer)?;
    render_summary(ctx.mode, "restore-codes", &summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputMode;
    use gmfix_core::config::GmfixConfig;

    fn args(strip_cr: bool, skip_rooms: bool) -> RestoreArgs {
        RestoreArgs {
            split: PathBuf::from("split"),
            project: PathBuf::from("project"),
            skip_scripts: false,
            skip_objects: false,
            skip_rooms,
            strip_cr,
        }
    }

    fn ctx(config_strip: bool) -> CommandContext {
        let mut config = GmfixConfig::default();
        config.output.strip_cr_entities = config_strip;
        CommandContext {
            mode: OutputMode::Text,
            quiet: false,
            config,
        }
    }

    #[test]
    fn skip_flags_clear_kinds() {
        let options = args(false, true).options(&ctx(false));
        assert!(options.scripts && options.objects);
        assert!(!options.rooms);
        assert!(!options.output.strip_cr_entities);
    }

    #[test]
    fn strip_cr_comes_from_flag_or_config() {
        assert!(args(true, false).options(&ctx(false)).output.strip_cr_entities);
        assert!(args(false, false).options(&ctx(true)).output.strip_cr_entities);
    }
}
