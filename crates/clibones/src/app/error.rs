use crate::app::commands::OutputFormat;
use thiserror::Error;

/// A fatal error already classified for output: the message to print, the
/// format to print it in, and the process exit code.
#[derive(Debug)]
pub struct CliError {
    pub exit_code: i32,
    pub format: OutputFormat,
    pub message: String,
}

impl CliError {
    pub fn new(format: OutputFormat, message: impl Into<String>, exit_code: i32) -> Self {
        Self {
            exit_code,
            format,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// No subcommand was given and nothing else was asked for.
#[derive(Debug, Error)]
#[error("No command given. Run 'clibones --help' for usage.")]
pub struct MissingCommand;
