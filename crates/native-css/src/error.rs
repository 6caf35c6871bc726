//! Error types for the style runtime.

use std::path::PathBuf;

use crate::tree::NodeId;

/// Result type alias for style operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the style runtime.
///
/// Malformed stylesheet input is not an error: it is reported through
/// [`ParseDiagnostic`](crate::parser::ParseDiagnostic)s and the rest of the
/// sheet stays usable.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error.
    #[error("Failed to read stylesheet '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The node was never mounted or has been released.
    #[error("Unknown or released node {0:?}")]
    UnknownNode(NodeId),

    /// A group or container ancestor appeared on an already-rendered ancestor
    /// after a descendant rule was first matched without it.
    #[error(
        "`{introduced}` was introduced on an ancestor after `{selector}` was first matched; \
         group and container roles must be present when the subtree first renders"
    )]
    StructuralConfiguration { selector: String, introduced: String },
}

impl Error {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a structural configuration error.
    pub fn structural(selector: impl Into<String>, introduced: impl Into<String>) -> Self {
        Self::StructuralConfiguration {
            selector: selector.into(),
            introduced: introduced.into(),
        }
    }
}
