/// Errors emitted by the third-party API clients.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
}

pub type Result<T> = std::result::Result<T, UpstreamError>;
