use crate::error::TransportError;

use log::debug;
use mime::Mime;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use std::time::Duration;

/// Timeout applied to each request by the default `HttpTransport`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request and response transport abstraction.
///
/// The `Transport` trait sends a serialized method call to the API endpoint and hands back the raw
/// response body. [`HttpTransport`] is the implementation used by default; implement this trait
/// yourself to route calls through a different HTTP stack or to serve canned responses in tests.
///
/// Implementations are shared by every call a `Client` makes, so they take `&self`.
///
/// [`HttpTransport`]: struct.HttpTransport.html
pub trait Transport {
    /// POSTs `body` to `url` and returns the complete response body.
    ///
    /// # Errors
    ///
    /// Implementations must fail with `TransportError::Status` if the server answers with a status
    /// other than 200, and must not return a partially read body.
    fn post(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}

/// A `Transport` that sends calls with a blocking reqwest `Client`.
///
/// The client pools connections internally; cloning an `HttpTransport` shares the pool.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with a request timeout of [`DEFAULT_TIMEOUT`].
    ///
    /// [`DEFAULT_TIMEOUT`]: constant.DEFAULT_TIMEOUT.html
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a transport whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        Client::builder()
            .timeout(timeout)
            .user_agent(concat!("loopia/", env!("CARGO_PKG_VERSION")))
            .build()
            .map(Self::from_client)
            .map_err(TransportError::Http)
    }

    /// Uses a preconfigured reqwest `Client`, e.g. one with a proxy or custom TLS settings.
    pub fn from_client(client: Client) -> Self {
        HttpTransport { client }
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .map_err(TransportError::Http)?;

        check_response(&response)?;

        let body = response.bytes().map_err(TransportError::Body)?;
        Ok(body.to_vec())
    }
}

/// Checks that a reqwest `Response` has status 200 OK.
///
/// The body is left unread, so a failed check never attempts to decode an error page.
fn check_response(response: &Response) -> Result<(), TransportError> {
    if response.status() != StatusCode::OK {
        return Err(TransportError::Status(response.status().as_u16()));
    }

    // Loopia always answers text/xml; anything else is worth a note but is still parsed
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Mime>().ok());
    if let Some(found) = content_type {
        if found.type_() != mime::TEXT || found.subtype() != mime::XML {
            debug!("response has unexpected Content-Type '{}'", found);
        }
    }

    Ok(())
}
