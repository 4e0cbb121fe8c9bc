//! Error types for the 1secmail client.

use thiserror::Error;

/// Errors that can occur during 1secmail operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed, including non-2xx responses.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON parsing error (also covers malformed message dates).
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// The service no longer has the requested message.
    #[error("message with id {id} not found on {login}@{domain}")]
    MessageNotFound {
        /// Mailbox login the lookup was issued for.
        login: String,
        /// Mailbox domain the lookup was issued for.
        domain: String,
        /// Message id that could not be found.
        id: u64,
    },

    /// The service returned an empty domain list.
    #[error("No domains available")]
    NoDomains,

    /// A combined address did not contain an `@`.
    #[error("invalid mailbox address `{0}`: expected login@domain")]
    InvalidAddress(String),

    /// The cancel signal passed to [`Client::wait_mail_until`](crate::Client::wait_mail_until) fired.
    #[error("waiting for mail was cancelled")]
    WaitCancelled,
}
