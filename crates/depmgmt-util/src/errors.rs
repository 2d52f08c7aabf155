use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all depmgmt operations.
///
/// Dependency management itself is total; only the surrounding layers
/// (coordinate parsing, configuration loading) can fail.
#[derive(Debug, Error, Diagnostic)]
pub enum DepMgmtError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed manager configuration.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check the [manager] table of your configuration file"))]
    Config { message: String },

    /// A coordinate string could not be parsed into an artifact.
    #[error("Invalid artifact coordinate: {coordinate}")]
    #[diagnostic(help(
        "Expected <group>:<artifact>[:<extension>[:<classifier>]]:<version>"
    ))]
    Coordinate { coordinate: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type DepMgmtResult<T> = miette::Result<T>;
