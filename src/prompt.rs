use std::io::{self, IsTerminal};

use crate::error::{CliError, Result};

/// Asks the operator a yes/no question.
pub trait Confirmer {
    fn confirm(&self, message: &str) -> Result<bool>;
}

/// Prompts on the terminal. Defaults to "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, message: &str) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .map_err(|e| CliError::Prompt(e.to_string()))
    }
}

/// Whether stdin is attached to a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal()
}
