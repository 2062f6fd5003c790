use std::{fmt, path::Path};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingError<'i> {
    pub problem: String,
    pub details: String,
    pub filename: &'i Path,
}

impl<'i> fmt::Display for LoadingError<'i> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.problem, self.details)
    }
}

/// Failure reported by one of the formatters the composition delegates to.
#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("{0}")]
    Rejected(String),
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("{program} produced output that is not UTF-8")]
    Encoding { program: String },
}

/// Anything that aborts formatting of a template. No partial output is
/// ever produced once one of these is raised.
#[derive(Debug, Error)]
pub enum FormattingError {
    #[error("{source}")]
    Parsing {
        #[from]
        source: crate::parsing::ParsingError,
    },
    #[error("formatting Ruby in {id} failed: {source}")]
    Script { id: String, source: DelegateError },
    #[error("formatting HTML failed: {source}")]
    Markup { source: DelegateError },
    #[error("scaffolding around {id} did not survive formatting: {formatted:?}")]
    Scaffolding { id: String, formatted: String },
    #[error("malformed tree: {0}")]
    Structure(String),
}
