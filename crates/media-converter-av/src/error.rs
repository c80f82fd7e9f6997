//! Error types for media-converter-av.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running a conversion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A track, outstream or instream was built from an unusable source.
    #[error("invalid source: {0}")]
    InvalidSource(String),

    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool ran but exited unsuccessfully.
    #[error("{tool} failed (exit code {}): {message}", code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    ToolFailed {
        tool: String,
        code: Option<i32>,
        message: String,
    },

    /// Creating the temporary output or publishing it failed.
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid source error.
    pub fn invalid_source(message: impl Into<String>) -> Self {
        Self::InvalidSource(message.into())
    }

    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a tool execution failed error.
    pub fn tool_failed(tool: impl Into<String>, code: Option<i32>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            code,
            message: message.into(),
        }
    }

    /// Create a filesystem error for the given path.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Exit code of a failed tool run, if this is one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ToolFailed { code, .. } => *code,
            _ => None,
        }
    }
}
