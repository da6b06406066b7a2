//! Typed responses of the Loopia API methods.

use crate::error::ParseError;
use crate::parser::parse_response;
use crate::{Fault, Value};

/// The shape of response a method returns on success.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseKind {
    /// A status string such as `OK` or `AUTH_ERROR`.
    Status,
    /// An array of zone record structs.
    Records,
}

/// A decoded method response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// The untrimmed status string returned by the server.
    Status(String),
    /// Zone records, in the order the server listed them.
    Records(Vec<ZoneRecord>),
    /// The server answered with a non-zero fault code.
    Fault(Fault),
}

/// A DNS record of a (sub)domain's zone, as returned by `getZoneRecords`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneRecord {
    pub record_id: i32,
    /// Record type, e.g. `TXT`.
    pub kind: String,
    pub ttl: i32,
    pub priority: i32,
    /// Record data; for TXT records, the text.
    pub rdata: String,
}

impl Response {
    /// Parses a response body, expecting a successful result of the given `kind`.
    ///
    /// A `<fault>` with code 0 is not a failure: it decodes to the empty result of `kind`.
    pub fn parse(body: &[u8], kind: ResponseKind) -> Result<Response, ParseError> {
        let value = match parse_response(body)? {
            Ok(value) => value,
            Err(fault) if fault.code() != 0 => return Ok(Response::Fault(fault)),
            Err(_) => {
                return Ok(match kind {
                    ResponseKind::Status => Response::Status(String::new()),
                    ResponseKind::Records => Response::Records(Vec::new()),
                })
            }
        };

        match kind {
            ResponseKind::Status => match value {
                Value::String(status) => Ok(Response::Status(status)),
                other => Err(unexpected("string", &other)),
            },
            ResponseKind::Records => {
                let array = value.as_array().ok_or_else(|| unexpected("array of records", &value))?;
                array
                    .iter()
                    .map(ZoneRecord::from_value)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Response::Records)
            }
        }
    }

    /// Returns the fault carried by this response, if any.
    pub fn fault(&self) -> Option<&Fault> {
        match *self {
            Response::Fault(ref fault) => Some(fault),
            _ => None,
        }
    }
}

impl ZoneRecord {
    /// Reads a record from a `<struct>`.
    ///
    /// Unknown members are ignored and missing members keep their default value.
    pub fn from_value(value: &Value) -> Result<Self, ParseError> {
        let members = value.as_struct().ok_or_else(|| unexpected("record struct", value))?;

        let mut record = ZoneRecord::default();
        for (name, value) in members {
            match &**name {
                "type" => record.kind = string_member(value)?,
                "rdata" => record.rdata = string_member(value)?,
                "ttl" => record.ttl = int_member(value)?,
                "priority" => record.priority = int_member(value)?,
                "record_id" => record.record_id = int_member(value)?,
                _ => {}
            }
        }

        Ok(record)
    }
}

fn string_member(value: &Value) -> Result<String, ParseError> {
    value
        .as_str()
        .map(|s| s.trim().to_string())
        .ok_or_else(|| unexpected("string member", value))
}

fn int_member(value: &Value) -> Result<i32, ParseError> {
    value.as_i32().ok_or_else(|| unexpected("int member", value))
}

fn unexpected(expected: &'static str, found: &Value) -> ParseError {
    let found = match *found {
        Value::String(ref s) => format!("string {:?}", s.trim()),
        ref other => other.type_name().to_string(),
    };
    ParseError::UnexpectedValue { expected, found }
}
