use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Resolver '{resolver}' is not implemented (directive '{directive}' in document '{document}')")]
    NotImplemented {
        resolver: &'static str,
        directive: String,
        document: String,
    },

    #[error("Unsupported directive: {0}")]
    UnsupportedDirective(String),

    #[error("Malformed directive '{directive}' in document '{document}': {reason}")]
    MalformedDirective {
        directive: String,
        document: String,
        reason: String,
    },

    #[error("Failed to resolve directive '{directive}' in document '{document}': {source}")]
    DirectiveResolution {
        directive: String,
        document: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl HarnessError {
    /// Returns `true` if the failure only affects the test that carried the directive.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HarnessError::MalformedDirective { .. } | HarnessError::DirectiveResolution { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
