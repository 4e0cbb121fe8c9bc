//! # 1secmail Client
//! Asynchronous wrapper around the 1secmail disposable email HTTP API: list served domains, pick or generate a [`Mailbox`], read its messages and attachments, and wait for a specific message to arrive.
//!
//! ## Audience and uses
//! For Rust developers who need throwaway addresses in integration tests, demos, or automation scripts without running mail infrastructure: build a [`Client`] (optionally via [`ClientBuilder`]), get a mailbox, then poll it with [`Client::get_messages`] or block on [`Client::wait_mail`] until the message you care about shows up.
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`, and the polling helper sleeps with `tokio::time`.
//!
//! ## Out of scope
//! Not a general-purpose mail client or SMTP sender. No retries, no authentication, no caching: every call goes to the service and inherits its availability and retention limits.
//!
//! ## Errors
//! Transport failures and non-2xx statuses surface as [`Error::Request`], malformed payloads as [`Error::Json`], and reading an expired message as [`Error::MessageNotFound`]. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Logging
//! Requests and polling progress are reported through `tracing`; install a subscriber to see them.
//!
//! ## Example
//! ```no_run
//! use onesecmail_client::{Client, WaitOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), onesecmail_client::Error> {
//!     let client = Client::new()?;
//!     let mailbox = client.get_mailbox(None, None).await?;
//!     println!("Send something to: {}", mailbox);
//!
//!     let mail = mailbox
//!         .wait_mail(&client, |mail| mail.subject.contains("Welcome"), WaitOptions::new())
//!         .await?;
//!     println!("From: {}, Subject: {}", mail.from, mail.subject);
//!
//!     for attachment in &mail.attachments {
//!         let bytes = attachment.fetch_content(&client).await?;
//!         println!("{}: {} bytes", attachment.filename, bytes.len());
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod models;
mod wait;

pub use client::{Client, ClientBuilder};
pub use error::Error;
pub use models::{Attachment, Mail, Mailbox, ShortMail};
pub use wait::WaitOptions;

/// Result type alias for 1secmail operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
