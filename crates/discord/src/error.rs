use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Discord(#[from] serenity::Error),

    /// Transport failure. The URL is stripped because it embeds the webhook token.
    #[error("webhook request failed: {0}")]
    Http(reqwest::Error),

    #[error("webhook rejected payload ({status}): {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
