/// Core error type for the corrector bot.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can handle failures consistently (user-facing message vs plumbing).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// Completion backend not configured. The Display text is shown to the
    /// user as-is, so keep it a full sentence.
    #[error("Sorry, the correction service is currently unavailable.")]
    ServiceUnavailable,

    /// Network/provider/malformed-response failure from the completion
    /// endpoint. Carries the cause for logs; the user gets a fixed apology.
    #[error("completion error: {0}")]
    Completion(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
