//! 1secmail async client implementation.
//!
//! Every operation is a single GET against one endpoint, with the `action`
//! query parameter selecting what the service does:
//! 1) List served domains via [`Client::get_domains`]
//! 2) Pick an address via [`Client::get_mailbox`] or [`Client::random_mailbox`]
//! 3) Poll the inbox via [`Client::get_messages`] (or [`Client::wait_mail`](crate::Client::wait_mail))
//! 4) Fetch full message content via [`Client::read_message`]
//! 5) Download attachment bytes via [`Client::download`]

use crate::models::{MailRecord, ShortMailRecord};
use crate::{Error, Mail, Mailbox, Result, ShortMail};
use rand::Rng;
use rand::seq::IndexedRandom;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use std::borrow::Cow;
use std::time::Duration;
use tracing::{debug, trace};

/// Async client for the 1secmail temporary email service.
///
/// A `Client` is cheap to clone (the underlying `reqwest` connection pool is shared).
/// Create it once and clone as needed.
///
/// The client holds no mailbox state: every method takes the [`Mailbox`] it operates on,
/// and records it returns carry a copy of that mailbox for follow-up requests.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    proxy: Option<String>,
    user_agent: String,
    endpoint: String,
}

impl Client {
    /// Create a [`ClientBuilder`] for configuring a new client.
    ///
    /// # Examples
    /// ```no_run
    /// # use onesecmail_client::Client;
    /// # fn main() -> Result<(), onesecmail_client::Error> {
    /// let client = Client::builder()
    ///     .user_agent("my-app/1.0")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new client using default settings.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Get the proxy URL configured for this client (if any).
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// The API endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List the domains currently served by 1secmail.
    ///
    /// # Examples
    /// ```no_run
    /// # use onesecmail_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), onesecmail_client::Error> {
    /// let client = Client::new()?;
    /// for domain in client.get_domains().await? {
    ///     println!("{domain}");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_domains(&self) -> Result<Vec<String>> {
        let params = [("action", Cow::Borrowed("getDomainList"))];
        self.request(&params).await
    }

    /// Resolve a mailbox from an optional login and domain.
    ///
    /// - login and domain: exactly that mailbox.
    /// - login only: treated as a combined `login@domain` address, split on the first `@`.
    /// - domain only: a random login on that domain.
    /// - neither: a random mailbox, see [`Client::random_mailbox`].
    ///
    /// Empty strings count as not given. Only the last case performs a network request.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAddress`] when a lone login has no `@`, and
    /// [`Error::NoDomains`] if a random domain is needed but none are served.
    ///
    /// # Examples
    /// ```no_run
    /// # use onesecmail_client::Client;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), onesecmail_client::Error> {
    /// let client = Client::new()?;
    /// let specific = client.get_mailbox(Some("example@1secmail.com"), None).await?;
    /// let random = client.get_mailbox(None, None).await?;
    /// println!("{specific} {random}");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_mailbox(&self, login: Option<&str>, domain: Option<&str>) -> Result<Mailbox> {
        let login = login.filter(|s| !s.is_empty());
        let domain = domain.filter(|s| !s.is_empty());

        match (login, domain) {
            (Some(login), Some(domain)) => Ok(Mailbox::new(login, domain)),
            (Some(address), None) => Mailbox::parse(address),
            (None, Some(domain)) => Ok(Self::random_mailbox_on(domain)),
            (None, None) => self.random_mailbox().await,
        }
    }

    /// Create a random mailbox on a domain picked uniformly from the live domain list.
    ///
    /// The login is six random lowercase ASCII letters.
    ///
    /// # Errors
    /// Returns [`Error::NoDomains`] if the service returns an empty domain list.
    pub async fn random_mailbox(&self) -> Result<Mailbox> {
        let domains = self.get_domains().await?;
        let domain = domains
            .choose(&mut rand::rng())
            .cloned()
            .ok_or(Error::NoDomains)?;
        Ok(Self::random_mailbox_on(domain))
    }

    /// Create a mailbox with a random login on the given domain, without any request.
    pub fn random_mailbox_on(domain: impl Into<String>) -> Mailbox {
        let mut rng = rand::rng();
        let login: String = (0..RANDOM_LOGIN_LEN)
            .map(|_| char::from(rng.random_range(b'a'..=b'z')))
            .collect();
        Mailbox::new(login, domain)
    }

    /// Retrieve the inbox summaries for a mailbox, in the order the service returned them.
    ///
    /// # Errors
    /// Returns an error if the request fails or the response is not a valid message list.
    ///
    /// # Examples
    /// ```no_run
    /// # use onesecmail_client::{Client, Mailbox};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), onesecmail_client::Error> {
    /// let client = Client::new()?;
    /// let mailbox = Mailbox::new("demo", "1secmail.com");
    /// for msg in client.get_messages(&mailbox).await? {
    ///     println!("{}: {}", msg.from, msg.subject);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_messages(&self, mailbox: &Mailbox) -> Result<Vec<ShortMail>> {
        let params = Self::mailbox_params("getMessages", mailbox);
        let records: Vec<ShortMailRecord> = self.request(&params).await?;

        Ok(records
            .into_iter()
            .map(|record| record.into_short_mail(mailbox))
            .collect())
    }

    /// Retrieve every message of a mailbox with its full body.
    ///
    /// Lists the summaries, then reads each one in order. A message that expires
    /// between the two steps fails the whole call with [`Error::MessageNotFound`].
    pub async fn get_full_messages(&self, mailbox: &Mailbox) -> Result<Vec<Mail>> {
        let summaries = self.get_messages(mailbox).await?;
        let mut mails = Vec::with_capacity(summaries.len());
        for summary in &summaries {
            mails.push(self.read_message(mailbox, summary.id).await?);
        }
        Ok(mails)
    }

    /// Fetch the full content of a specific message.
    ///
    /// # Errors
    /// Returns [`Error::MessageNotFound`] carrying `(login, domain, id)` when the service
    /// answers `Message not found`; otherwise request and JSON errors as usual.
    ///
    /// # Examples
    /// ```no_run
    /// # use onesecmail_client::{Client, Mailbox};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), onesecmail_client::Error> {
    /// let client = Client::new()?;
    /// let mailbox = Mailbox::new("demo", "1secmail.com");
    /// let messages = client.get_messages(&mailbox).await?;
    /// if let Some(msg) = messages.first() {
    ///     let mail = client.read_message(&mailbox, msg.id).await?;
    ///     println!("{}", mail.text_body);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn read_message(&self, mailbox: &Mailbox, id: u64) -> Result<Mail> {
        let mut params = Self::mailbox_params("readMessage", mailbox);
        params.push(("id", Cow::Owned(id.to_string())));

        // The not-found marker wins over the status code.
        let response = self.execute_request(&params).await?;
        if response.body.trim_ascii() == NOT_FOUND_BODY.as_bytes() {
            debug!(mailbox = %mailbox, id, "message not found");
            return Err(Error::MessageNotFound {
                login: mailbox.login.clone(),
                domain: mailbox.domain.clone(),
                id,
            });
        }

        let body = response.into_body()?;
        let record: MailRecord = serde_json::from_slice(&body)?;
        Ok(record.into_mail(mailbox))
    }

    /// Download the raw bytes of an attachment.
    ///
    /// Prefer [`Attachment::fetch_content`](crate::Attachment::fetch_content) when you
    /// already hold the attachment metadata.
    pub async fn download(&self, mailbox: &Mailbox, id: u64, filename: &str) -> Result<Vec<u8>> {
        let mut params = Self::mailbox_params("download", mailbox);
        params.push(("id", Cow::Owned(id.to_string())));
        params.push(("file", Cow::Borrowed(filename)));

        self.execute_request(&params).await?.into_body()
    }

    fn mailbox_params<'a>(action: &'a str, mailbox: &'a Mailbox) -> Vec<Param<'a>> {
        vec![
            ("action", Cow::Borrowed(action)),
            ("login", Cow::Borrowed(mailbox.login.as_str())),
            ("domain", Cow::Borrowed(mailbox.domain.as_str())),
        ]
    }

    async fn request<T>(&self, params: &[Param<'_>]) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = self.execute_request(params).await?.into_body()?;
        let parsed = serde_json::from_slice::<T>(&body)?;
        Ok(parsed)
    }

    async fn execute_request(&self, params: &[Param<'_>]) -> Result<RawResponse> {
        debug!(
            endpoint = %self.endpoint,
            query = %Self::describe_query(params),
            "1secmail request"
        );

        let response = self
            .http
            .get(&self.endpoint)
            .query(params)
            .headers(self.headers())
            .send()
            .await?;

        let status = response.status();
        let status_err = response.error_for_status_ref().err();
        let body = response.bytes().await?;

        trace!(status = status.as_u16(), bytes = body.len(), "1secmail response");

        Ok(RawResponse {
            status_err,
            body: body.to_vec(),
        })
    }

    fn describe_query(params: &[Param<'_>]) -> String {
        params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );

        headers
    }
}

const ENDPOINT: &str = "https://www.1secmail.com/api/v1/";
const NOT_FOUND_BODY: &str = "Message not found";
const RANDOM_LOGIN_LEN: usize = 6;
const USER_AGENT_VALUE: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:131.0) Gecko/20100101 Firefox/131.0";

type Param<'a> = (&'a str, Cow<'a, str>);

/// Response body with its deferred non-2xx error.
struct RawResponse {
    status_err: Option<reqwest::Error>,
    body: Vec<u8>,
}

impl RawResponse {
    fn into_body(self) -> Result<Vec<u8>> {
        match self.status_err {
            Some(err) => Err(err.into()),
            None => Ok(self.body),
        }
    }
}

/// Builder for configuring a 1secmail [`Client`].
///
/// # Defaults
/// - The public 1secmail endpoint
/// - No proxy
/// - `danger_accept_invalid_certs = false`
/// - A browser-like user agent
/// - No request timeout
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    proxy: Option<String>,
    danger_accept_invalid_certs: bool,
    user_agent: String,
    endpoint: String,
    timeout: Option<Duration>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// See [`ClientBuilder`] for the list of defaults.
    pub fn new() -> Self {
        Self {
            proxy: None,
            danger_accept_invalid_certs: false,
            user_agent: USER_AGENT_VALUE.to_string(),
            endpoint: ENDPOINT.to_string(),
            timeout: None,
        }
    }

    /// Set a proxy URL (e.g. `"http://127.0.0.1:8080"` or `"socks5://127.0.0.1:9050"`).
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Configure whether to accept invalid TLS certificates (default: `false`).
    ///
    /// # Security
    /// Only useful for traffic inspection in controlled environments.
    pub fn danger_accept_invalid_certs(mut self, value: bool) -> Self {
        self.danger_accept_invalid_certs = value;
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the API endpoint URL.
    ///
    /// Primarily useful for testing against a mock server.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set a request timeout applied to every call.
    ///
    /// Without it, requests wait as long as reqwest does by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the [`Client`].
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed (e.g. an invalid proxy URL).
    pub fn build(self) -> Result<Client> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs);

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder.build()?;

        Ok(Client {
            http,
            proxy: self.proxy,
            user_agent: self.user_agent,
            endpoint: self.endpoint,
        })
    }
}

#[cfg(test)]
impl Client {
    pub(crate) fn new_for_tests(endpoint: String) -> Self {
        ClientBuilder::new()
            .endpoint(endpoint)
            .build()
            .expect("test client build failed")
    }
}
