use crate::value::Kind;
use colored::Colorize;
use std::{fmt, io, path::PathBuf};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum Error {
    /// Neither the given path nor its counterpart next to the executable exists
    #[error("{}: configuration file not found", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("{}: configuration file is empty", .path.display())]
    EmptyFile { path: PathBuf },

    /// The extension is missing or not one of `yaml`, `yml`, `json`
    #[error("unsupported configuration file format: {0}")]
    UnsupportedFormat(String),

    #[error("{}: {source}", .path.display())]
    Deserialize { path: PathBuf, source: FormatError },

    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("cannot locate the running executable: {0}")]
    CurrentExe(#[source] io::Error),

    /// An environment variable is set but its value does not parse
    #[error("{}: invalid value '{value}': {source}", .var.magenta().bold())]
    EnvParse {
        var: String,
        value: String,
        source: ValueError,
    },

    #[error("failed to load dotenv file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// Command-line parsing failed (only recorded by `Loader::cmd_from`)
    #[error("{0}")]
    Cmd(#[from] clap::Error),
}

/// Parser failure for a configuration file
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A raw string or a typed value could not be stored in a field
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    #[error("cannot parse '{input}' as {kind}: {reason}")]
    Parse {
        kind: Kind,
        input: String,
        reason: String,
    },

    #[error("expected a {expected} value, got a {found} value")]
    KindMismatch { expected: Kind, found: Kind },

    #[error("{value} does not fit in {target}")]
    OutOfRange { value: String, target: &'static str },
}

/// Every error collected over one load chain, in the order the steps ran
#[derive(Debug)]
pub struct LoadErrors(pub Vec<Error>);

impl LoadErrors {
    pub fn errors(&self) -> &[Error] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LoadErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Configuration failed with {} error(s):",
            self.0.len().to_string().yellow().bold()
        )?;
        for error in &self.0 {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for LoadErrors {}

impl IntoIterator for LoadErrors {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
