use thiserror::Error;

/// Recoverable upstream-feed errors.
///
/// None of these are fatal to the process: parse failures are logged and
/// dropped, and a closed tick channel only ends the feed worker.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("malformed feed message: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("tick channel closed: {0}")]
    ChannelClosed(String),
}
