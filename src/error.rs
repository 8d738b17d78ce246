use std::error::Error;
use std::io;

/// Custom error type for gitlab_push operations
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    #[error("{}", error_chain(.0))]
    Transport(#[from] reqwest::Error),

    #[error("Status report rejected with status code {code}: {body}")]
    StatusRejected { code: u16, body: String },

    #[error("JSON encoding error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Helper type for Results that use ForwarderError
pub type Result<T> = std::result::Result<T, ForwarderError>;

/// Renders an error followed by each of its sources, `outer: inner: root`
pub fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_includes_cause() {
        let err = reqwest::Client::new()
            .post("/async-function/git-tar")
            .build()
            .unwrap_err();

        let message = ForwarderError::from(err).to_string();
        assert!(message.starts_with("builder error"), "{message}");
        assert!(message.contains("relative URL without a base"), "{message}");
    }
}
