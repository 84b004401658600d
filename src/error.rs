use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no pdf file has been opened")]
    NoInput,

    #[error("input file '{}' does not exist", path.display())]
    InputNotFound { path: PathBuf },

    #[error("pdftohtml executable '{}' not found", path.display())]
    ExecutableNotFound { path: PathBuf },

    #[error("'{}' exited with {}: {stderr}", path.display(), exit_description(*code))]
    ExecutableFailed {
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },

    #[error("failed to start '{}': {source}", path.display())]
    Spawn { path: PathBuf, source: io::Error },

    #[error("output directory '{}' is not writable: {source}", path.display())]
    OutputDirectoryUnwritable { path: PathBuf, source: io::Error },

    #[error("failed to remove '{}': {source}", path.display())]
    CleanupFailed { path: PathBuf, source: io::Error },

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{key}'")]
    InvalidOptionValue { key: String, value: String },

    #[error("failed to read config '{}': {source}", path.display())]
    ConfigRead { path: PathBuf, source: io::Error },

    #[error("invalid config '{}': {source}", path.display())]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_owned(),
    }
}
