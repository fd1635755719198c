use std::path::PathBuf;

/// Fatal configuration errors. The process does not start when one occurs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required variable is absent or blank.
    #[error("{var} must be set")]
    MissingVar { var: &'static str },

    /// A numeric variable could not be parsed.
    #[error("{var} must be an unsigned integer, got {value:?}")]
    InvalidInteger {
        var: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A duration variable is set to zero, which would make every request
    /// time out immediately.
    #[error("{var} must be greater than zero")]
    ZeroDuration { var: &'static str },

    /// The env file exists but could not be read or parsed.
    #[error("failed to load env file {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

impl Error {
    #[must_use]
    pub fn missing(var: &'static str) -> Self {
        Self::MissingVar { var }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
