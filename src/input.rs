use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::Path;

use crate::error::{CliError, Result};

/// Read the whole input, from `path` when given or stdin otherwise.
///
/// Refuses to block on an interactive terminal with nothing piped in.
pub fn read_stdin_or_file(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path).map_err(|source| CliError::ReadFile {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(CliError::NoInput);
            }
            let mut buf = Vec::new();
            stdin.lock().read_to_end(&mut buf).map_err(CliError::Stdin)?;
            Ok(buf)
        }
    }
}

/// Write `content` to `path`, or to stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, content).map_err(|source| CliError::WriteFile {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            print!("{}", content);
            Ok(())
        }
    }
}
