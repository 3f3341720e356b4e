use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned while fetching papers from the preprint API.
pub enum SourceError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {message}")]
    ClientBuildFailed {
        /// Error message.
        message: String,
    },

    /// The request never produced a response (DNS, connect, read).
    #[error("request to '{url}' failed: {message}")]
    RequestFailed {
        /// Endpoint URL.
        url: String,
        /// Error message.
        message: String,
    },

    /// The endpoint answered with a non-success status.
    #[error("'{url}' returned HTTP {status}")]
    HttpStatus {
        /// Endpoint URL.
        url: String,
        /// Status code.
        status: u16,
    },

    /// The body was not a well-formed Atom feed.
    #[error("malformed feed: {message}")]
    MalformedFeed {
        /// Error message.
        message: String,
    },

    /// A mock source was told to fail.
    #[error("source unavailable: {message}")]
    Unavailable {
        /// Error message.
        message: String,
    },
}
