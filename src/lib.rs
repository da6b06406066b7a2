//! A client for Loopia's XML-RPC API.
//!
//! The `loopia` crate covers the small slice of the API needed to prove domain ownership via DNS:
//! adding, listing and removing TXT records, and removing a subdomain once it is no longer needed.
//!
//! ```no_run
//! # fn main() -> Result<(), loopia::Error> {
//! let client = loopia::Client::new("user@loopiaapi", "secret")?;
//!
//! client.add_txt_record("example.com", "_acme-challenge", 300, "token")?;
//! for record in client.get_txt_records("example.com", "_acme-challenge")? {
//!     if record.rdata == "token" {
//!         client.remove_txt_record("example.com", "_acme-challenge", record.record_id)?;
//!     }
//! }
//! client.remove_subdomain("example.com", "_acme-challenge")?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/loopia/0.1.0")]

mod client;
mod error;
mod fault;
mod parser;
mod request;
mod response;
mod transport;
mod value;

pub use client::{Client, DEFAULT_BASE_URL};
pub use error::{Error, MarshalError, ParseError, TransportError};
pub use fault::Fault;
pub use request::{Member, MemberValue, MethodCall, Param};
pub use response::{Response, ResponseKind, ZoneRecord};
pub use transport::{HttpTransport, Transport, DEFAULT_TIMEOUT};
pub use value::Value;
