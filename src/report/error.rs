use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::link::LinkEndpoints;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read report {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed report at line {line}: {reason}")]
    MalformedReport { line: usize, reason: String },

    #[error("link at line {line} ({endpoints}) references undeclared {missing}")]
    DanglingReference {
        line: usize,
        endpoints: LinkEndpoints,
        missing: String,
    },

    #[error("report contains no workbook declarations")]
    EmptyReport,
}

/// A line that was skipped while parsing. Parsing continues after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseWarning {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
