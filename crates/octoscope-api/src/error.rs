//! Error types for octoscope-api.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the GitHub API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection options are missing, conflicting or unrecognized.
    #[error("invalid connection configuration: {0}")]
    InvalidConfiguration(String),

    /// An argument was outside its allowed set, or the operation needs an
    /// authenticated connection.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request could not be sent or no response was received.
    #[error("unable to retrieve {end_point}: {source}")]
    RequestFailed {
        end_point: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response had no body where JSON was expected.
    #[error("unable to retrieve {0}: empty response")]
    EmptyResponse(String),

    /// The JSON body did not have the expected shape.
    #[error("unexpected response from {end_point}: expected {expected}")]
    UnexpectedPayload {
        end_point: String,
        expected: &'static str,
    },

    /// No field with this name in any available snapshot.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// The field exists but holds a different JSON type.
    #[error("attribute '{name}' is not {expected}")]
    AttributeType { name: String, expected: &'static str },

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// Authentication failed.
    #[error("GitHub authentication failed - check the user name, password or token")]
    AuthenticationFailed,

    /// API rate limit exceeded.
    #[error("GitHub API rate limit exceeded - wait and try again")]
    RateLimited,

    /// API error with status code.
    #[error("GitHub API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// Network error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("failed to parse GitHub response: {0}")]
    Parse(#[from] serde_json::Error),
}
