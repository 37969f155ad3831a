//! Failures raised while enriching a single path-info entry.
//!
//! Every variant is fatal for the batch; the driver aborts on the first one.
use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum EnrichError {
    /// The identifier carries no 32-character `[0-9a-z]` hash.
    MalformedIdentifier { identifier: String },
    /// The `<hash>.narinfo` file is missing or cannot be opened/stat'ed.
    DescriptorNotFound { path: PathBuf, source: io::Error },
    /// The descriptor's first line is absent or lacks the `StorePath: ` prefix.
    MalformedDescriptor { path: PathBuf, reason: String },
}

impl EnrichError {
    pub fn kind(&self) -> &'static str {
        match self {
            EnrichError::MalformedIdentifier { .. } => "MalformedIdentifier",
            EnrichError::DescriptorNotFound { .. } => "DescriptorNotFound",
            EnrichError::MalformedDescriptor { .. } => "MalformedDescriptor",
        }
    }
}

impl fmt::Display for EnrichError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichError::MalformedIdentifier { identifier } => {
                write!(f, "{}: no store hash in identifier {identifier:?}", self.kind())
            }
            EnrichError::DescriptorNotFound { path, source } => {
                write!(f, "{}: {}: {source}", self.kind(), path.display())
            }
            EnrichError::MalformedDescriptor { path, reason } => {
                write!(f, "{}: {}: {reason}", self.kind(), path.display())
            }
        }
    }
}

impl std::error::Error for EnrichError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EnrichError::DescriptorNotFound { source, .. } => Some(source),
            _ => None,
        }
    }
}
