//! Defines error types used by this library.

use crate::Fault;

use thiserror::Error;
use xml::common::TextPosition;
use xml::reader::Error as XmlReadError;
use xml::writer::Error as XmlWriteError;

/// An API call did not succeed.
///
/// Each variant corresponds to the phase of the call that failed, so callers can tell a broken
/// connection apart from a rejected login or a malformed server response. Nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// The method call could not be serialized to XML.
    #[error("marshal error: {0}")]
    Marshal(#[from] MarshalError),

    /// The HTTP request failed or the server answered with a non-200 status.
    #[error("HTTP Post error: {0}")]
    Transport(#[from] TransportError),

    /// The response body was not a well-formed response of the expected shape.
    #[error("unmarshal error: {0}")]
    Unmarshal(#[from] ParseError),

    /// The server reported a non-zero fault code.
    #[error("RPC error: {0}")]
    Fault(#[from] Fault),

    /// The server answered `AUTH_ERROR`.
    #[error("authentication error")]
    Auth,

    /// The server answered with a status string other than `OK` or `AUTH_ERROR`.
    #[error("unknown error: \"{0}\"")]
    Unknown(String),
}

impl Error {
    /// Returns `true` if the server rejected the account credentials.
    pub fn is_auth(&self) -> bool {
        matches!(*self, Error::Auth)
    }

    /// Returns the `Fault` if this error was caused by a fault response.
    pub fn fault(&self) -> Option<&Fault> {
        match *self {
            Error::Fault(ref fault) => Some(fault),
            _ => None,
        }
    }

    /// Returns the HTTP status code if the server answered with a non-200 status.
    pub fn status(&self) -> Option<u16> {
        match *self {
            Error::Transport(TransportError::Status(code)) => Some(code),
            _ => None,
        }
    }
}

/// A method call could not be written as XML.
///
/// Calls built through the public constructors always serialize; this only surfaces when the
/// underlying XML writer rejects the document.
#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("could not write XML: {0}")]
    Xml(#[from] XmlWriteError),
}

/// Sending the request or receiving the response failed.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established or the request could not be sent.
    #[error("{0}")]
    Http(#[source] reqwest::Error),

    /// The server answered with a status code other than 200.
    #[error("unexpected status code {0}")]
    Status(u16),

    /// The response body could not be read.
    #[error("could not read response body: {0}")]
    Body(#[source] reqwest::Error),

    /// An error raised by a custom `Transport` implementation.
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Describes possible errors that can occur when parsing a response.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Error while parsing (malformed?) XML.
    #[error("malformed XML: {0}")]
    Xml(#[from] XmlReadError),

    /// Could not parse the given CDATA as XML-RPC value.
    ///
    /// For example, `<value><int>AAA</int></value>` describes an invalid value.
    #[error("invalid value for type '{for_type}': {found}")]
    InvalidValue {
        /// The type for which an invalid value was supplied (eg. `int` or `dateTime.iso8601`).
        for_type: &'static str,
        /// The value we encountered, as a string.
        found: String,
    },

    /// Found an unexpected tag, attribute, etc.
    #[error("unexpected XML at {position} (expected {expected})")]
    UnexpectedXml {
        /// A short description of the kind of data that was expected.
        expected: String,
        /// The position of the unexpected data inside the XML document.
        position: TextPosition,
    },

    /// The response is valid XML-RPC, but not what the called method returns.
    #[error("unexpected value (expected {expected}, found {found})")]
    UnexpectedValue {
        expected: &'static str,
        found: String,
    },
}
