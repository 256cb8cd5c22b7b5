pub mod break_to_exit;
pub mod completions;
pub mod replace;
pub mod restore;

use gmfix_core::config::GmfixConfig;

use crate::output::{NotePrinter, OutputMode};

/// Settings shared by every batch command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub mode: OutputMode,
    pub quiet: bool,
    pub config: GmfixConfig,
}

impl CommandContext {
    pub fn printer(&self) -> NotePrinter<std::io::Stdout> {
        NotePrinter::stdout(self.mode, self.quiet)
    }
}
