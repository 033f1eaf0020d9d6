use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Unterminated quote in command '{command}'")]
    UnterminatedQuote { command: String },

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed while waiting for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' did not finish within {timeout_ms} ms")]
    TimedOut { program: String, timeout_ms: u128 },
}

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error("Malformed window list line: '{line}'")]
    MalformedLine { line: String },

    #[error("Invalid window id '{id}'")]
    InvalidId { id: String },

    #[error("Invalid window title pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error("Toolkit refused focus: {message}")]
    Toolkit { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SoundError {
    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error("Audio device error: {message}")]
    Device { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PreflightError {
    #[error("the command '{}' is not available! Abort.", .path.display())]
    MissingBinary { path: PathBuf },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CliError {
    #[error("unknown option.")]
    UnknownOption { arg: String },
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::UnknownOption { .. } => 1,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read settings from '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
