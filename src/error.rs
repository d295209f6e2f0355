// Error taxonomy shared by every upstream fetcher.
//
// A stale weather value is not an error: see `weather::WeatherReading::Degraded`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Transport failure, timeout or a non-2xx status.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Unexpected JSON shape, missing field or an undecodable feed.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The key or token for a source is not configured.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

pub type Result<T> = std::result::Result<T, BoardError>;
