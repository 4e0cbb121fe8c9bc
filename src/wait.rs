//! Polling helper that waits for a message matching a predicate.

use crate::{Client, Error, Mail, Mailbox, Result};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_DELAY: Duration = Duration::from_millis(5000);

/// Options for [`Client::wait_mail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    delay: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
        }
    }
}

impl WaitOptions {
    /// Options with the default 5 second delay between polls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay between polls that found no match.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The configured delay between polls.
    pub fn poll_delay(&self) -> Duration {
        self.delay
    }
}

impl Client {
    /// Wait until a message in `mailbox` satisfies `predicate` and return it.
    ///
    /// Each poll lists the inbox, then fetches and evaluates every message whose id has not
    /// been evaluated before, in the order the service lists them. The first accepted message
    /// is returned; rejected ids are remembered for the rest of this call and never evaluated
    /// again. When a poll finds no match the loop sleeps for [`WaitOptions::poll_delay`].
    ///
    /// There is no built-in timeout: the future only completes on a match or an error.
    /// Use [`Client::wait_mail_until`] (or drop the future) to stop waiting.
    ///
    /// # Errors
    /// Any request error aborts the wait, including [`Error::MessageNotFound`] for a
    /// message that expired between listing and reading it.
    ///
    /// # Examples
    /// ```no_run
    /// # use onesecmail_client::{Client, WaitOptions};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), onesecmail_client::Error> {
    /// let client = Client::new()?;
    /// let mailbox = client.random_mailbox().await?;
    /// let mail = client
    ///     .wait_mail(&mailbox, |mail| mail.subject.contains("Verify"), WaitOptions::new())
    ///     .await?;
    /// println!("{}", mail.text_body);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn wait_mail<F>(
        &self,
        mailbox: &Mailbox,
        mut predicate: F,
        options: WaitOptions,
    ) -> Result<Mail>
    where
        F: FnMut(&Mail) -> bool,
    {
        let mut seen = HashSet::new();

        loop {
            if let Some(mail) = self.poll_once(mailbox, &mut seen, &mut predicate).await? {
                return Ok(mail);
            }

            debug!(
                mailbox = %mailbox,
                delay = ?options.delay,
                "no matching mail, sleeping"
            );
            tokio::time::sleep(options.delay).await;
        }
    }

    /// Like [`Client::wait_mail`], but gives up when `cancel` completes first.
    ///
    /// `cancel` can be any future, and its output is ignored: a `tokio::time::sleep`
    /// for a deadline, `tokio::signal::ctrl_c()`, a `oneshot::Receiver`, and so on.
    ///
    /// # Errors
    /// Returns [`Error::WaitCancelled`] if `cancel` completes before a match.
    pub async fn wait_mail_until<F, C>(
        &self,
        mailbox: &Mailbox,
        predicate: F,
        options: WaitOptions,
        cancel: C,
    ) -> Result<Mail>
    where
        F: FnMut(&Mail) -> bool,
        C: Future,
    {
        tokio::select! {
            result = self.wait_mail(mailbox, predicate, options) => result,
            _ = cancel => {
                info!(mailbox = %mailbox, "wait for mail cancelled");
                Err(Error::WaitCancelled)
            }
        }
    }

    async fn poll_once<F>(
        &self,
        mailbox: &Mailbox,
        seen: &mut HashSet<u64>,
        predicate: &mut F,
    ) -> Result<Option<Mail>>
    where
        F: FnMut(&Mail) -> bool,
    {
        let summaries = self.get_messages(mailbox).await?;
        debug!(
            mailbox = %mailbox,
            listed = summaries.len(),
            seen = seen.len(),
            "polled inbox"
        );

        for summary in &summaries {
            if seen.contains(&summary.id) {
                continue;
            }

            let mail = summary.fetch_full(self).await?;
            if predicate(&mail) {
                info!(mailbox = %mailbox, id = mail.id, "matching mail received");
                return Ok(Some(mail));
            }
            seen.insert(summary.id);
        }

        Ok(None)
    }
}

impl Mailbox {
    /// Wait for a message in this mailbox; see [`Client::wait_mail`].
    pub async fn wait_mail<F>(
        &self,
        client: &Client,
        predicate: F,
        options: WaitOptions,
    ) -> Result<Mail>
    where
        F: FnMut(&Mail) -> bool,
    {
        client.wait_mail(self, predicate, options).await
    }
}
