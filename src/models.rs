//! Mailbox and message models for 1secmail.
//!
//! Records returned by the service carry copies of the identifiers needed to
//! fetch more data later ([`Mailbox`] and message id), so the lazy methods on
//! them only need a [`Client`] to issue the follow-up request.

use crate::{Client, Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// Timestamp format used by the service for message dates.
const SERVICE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A `login@domain` address on the 1secmail service.
///
/// Mailboxes are not registered anywhere: any login on a served domain receives mail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Mailbox {
    /// Local part of the address (before `@`).
    pub login: String,
    /// Domain part of the address.
    pub domain: String,
}

impl Mailbox {
    /// Create a mailbox from an explicit login and domain.
    pub fn new(login: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            domain: domain.into(),
        }
    }

    /// Parse a combined `login@domain` address, splitting on the first `@`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAddress`] if the input has no `@`.
    pub fn parse(address: &str) -> Result<Self> {
        address
            .split_once('@')
            .map(|(login, domain)| Self::new(login, domain))
            .ok_or_else(|| Error::InvalidAddress(address.to_string()))
    }

    /// The full address as a string.
    pub fn address(&self) -> String {
        self.to_string()
    }

    /// List message summaries in the order the service returned them.
    ///
    /// This is the cheap path: one request, no bodies.
    pub async fn list_messages(&self, client: &Client) -> Result<Vec<ShortMail>> {
        client.get_messages(self).await
    }

    /// List messages with their full bodies.
    ///
    /// Issues one `readMessage` request per summary, in listing order.
    pub async fn list_full_messages(&self, client: &Client) -> Result<Vec<Mail>> {
        client.get_full_messages(self).await
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.login, self.domain)
    }
}

impl FromStr for Mailbox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Summary of an inbox message (no body content).
#[derive(Debug, Clone, PartialEq)]
pub struct ShortMail {
    /// Server-assigned message id.
    pub id: u64,
    /// Sender address.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// Time the service received the message.
    pub date: NaiveDateTime,
    /// Mailbox the message was listed from.
    pub mailbox: Mailbox,
}

impl ShortMail {
    /// Fetch the full message for this summary.
    ///
    /// # Errors
    /// Returns [`Error::MessageNotFound`] if the message expired from the inbox.
    pub async fn fetch_full(&self, client: &Client) -> Result<Mail> {
        client.read_message(&self.mailbox, self.id).await
    }
}

/// A full message including bodies and attachment metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Mail {
    /// Server-assigned message id.
    pub id: u64,
    /// Sender address.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// Time the service received the message.
    pub date: NaiveDateTime,
    /// Preferred body (HTML when available, otherwise text).
    pub body: String,
    /// Plain-text body.
    pub text_body: String,
    /// HTML body.
    pub html_body: String,
    /// Attachment metadata; use [`Attachment::fetch_content`] for the bytes.
    pub attachments: Vec<Attachment>,
    /// Mailbox the message belongs to.
    pub mailbox: Mailbox,
}

impl Mail {
    /// Find an attachment by file name.
    pub fn attachment(&self, filename: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.filename == filename)
    }

    /// Drop the bodies and attachments, keeping the summary fields.
    pub fn summary(&self) -> ShortMail {
        ShortMail {
            id: self.id,
            from: self.from.clone(),
            subject: self.subject.clone(),
            date: self.date,
            mailbox: self.mailbox.clone(),
        }
    }
}

/// Attachment metadata from a full message.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    /// File name, also used as the download key.
    pub filename: String,
    /// MIME type reported by the service.
    pub content_type: String,
    /// Size in bytes reported by the service.
    pub size: u64,
    /// Id of the message this attachment belongs to.
    pub mail_id: u64,
    /// Mailbox of the owning message.
    pub mailbox: Mailbox,
}

impl Attachment {
    /// Download the attachment bytes.
    pub async fn fetch_content(&self, client: &Client) -> Result<Vec<u8>> {
        client
            .download(&self.mailbox, self.mail_id, &self.filename)
            .await
    }
}

/// `getMessages` entry as sent by the service.
#[derive(Debug, Deserialize)]
pub(crate) struct ShortMailRecord {
    id: u64,
    from: String,
    subject: String,
    #[serde(deserialize_with = "service_date")]
    date: NaiveDateTime,
}

impl ShortMailRecord {
    pub(crate) fn into_short_mail(self, mailbox: &Mailbox) -> ShortMail {
        ShortMail {
            id: self.id,
            from: self.from,
            subject: self.subject,
            date: self.date,
            mailbox: mailbox.clone(),
        }
    }
}

/// `readMessage` payload as sent by the service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MailRecord {
    id: u64,
    from: String,
    subject: String,
    #[serde(deserialize_with = "service_date")]
    date: NaiveDateTime,
    #[serde(default)]
    attachments: Vec<AttachmentRecord>,
    #[serde(default)]
    body: String,
    #[serde(default)]
    text_body: String,
    #[serde(default)]
    html_body: String,
}

impl MailRecord {
    pub(crate) fn into_mail(self, mailbox: &Mailbox) -> Mail {
        let id = self.id;
        let attachments = self
            .attachments
            .into_iter()
            .map(|a| Attachment {
                filename: a.filename,
                content_type: a.content_type,
                size: a.size,
                mail_id: id,
                mailbox: mailbox.clone(),
            })
            .collect();

        Mail {
            id,
            from: self.from,
            subject: self.subject,
            date: self.date,
            body: self.body,
            text_body: self.text_body,
            html_body: self.html_body,
            attachments,
            mailbox: mailbox.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentRecord {
    filename: String,
    content_type: String,
    size: u64,
}

fn service_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, SERVICE_DATE_FORMAT).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use serde_json::json;

    #[test]
    fn parse_splits_on_first_at() {
        let mailbox = Mailbox::parse("user@example.com").unwrap();
        assert_eq!(mailbox, Mailbox::new("user", "example.com"));

        let odd = Mailbox::parse("a@b@c").unwrap();
        assert_eq!(odd.login, "a");
        assert_eq!(odd.domain, "b@c");
    }

    #[test]
    fn parse_rejects_address_without_at() {
        let err = "nobody".parse::<Mailbox>().unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(ref s) if s == "nobody"));
    }

    #[test]
    fn display_joins_login_and_domain() {
        assert_eq!(Mailbox::new("bob", "test.org").address(), "bob@test.org");
    }

    #[test]
    fn short_mail_record_parses_service_date() {
        let record: ShortMailRecord = serde_json::from_value(json!({
            "id": 639,
            "from": "someone@example.com",
            "subject": "Some subject",
            "date": "2018-06-08 14:33:55"
        }))
        .unwrap();
        let mail = record.into_short_mail(&Mailbox::new("bob", "example.com"));

        let expected_day = NaiveDate::from_ymd_opt(2018, 6, 8).unwrap();
        assert_eq!(mail.date.date(), expected_day);
        assert_eq!(mail.date.hour(), 14);
        assert_eq!(mail.date.second(), 55);
        assert_eq!(mail.mailbox.login, "bob");
    }

    #[test]
    fn malformed_date_is_a_json_error() {
        let result = serde_json::from_value::<ShortMailRecord>(json!({
            "id": 1,
            "from": "a@b.c",
            "subject": "s",
            "date": "yesterday"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn mail_record_links_attachments_back_to_message() {
        let record: MailRecord = serde_json::from_value(json!({
            "id": 7,
            "from": "sender@example.com",
            "subject": "Report",
            "date": "2024-01-02 03:04:05",
            "attachments": [
                { "filename": "report.pdf", "contentType": "application/pdf", "size": 1024 }
            ],
            "body": "<b>hi</b>",
            "textBody": "hi",
            "htmlBody": "<b>hi</b>"
        }))
        .unwrap();
        let mailbox = Mailbox::new("alice", "test.org");
        let mail = record.into_mail(&mailbox);

        assert_eq!(mail.text_body, "hi");
        let attachment = mail.attachment("report.pdf").unwrap();
        assert_eq!(attachment.content_type, "application/pdf");
        assert_eq!(attachment.size, 1024);
        assert_eq!(attachment.mail_id, 7);
        assert_eq!(attachment.mailbox, mailbox);
        assert!(mail.attachment("missing.txt").is_none());

        let summary = mail.summary();
        assert_eq!(summary.id, 7);
        assert_eq!(summary.subject, "Report");
        assert_eq!(summary.mailbox, mailbox);
    }
}
