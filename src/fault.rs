use crate::Value;

use thiserror::Error;

/// A `<fault>` response, indicating that a call failed.
///
/// Loopia returns a `<fault>` with a `faultCode` and `faultString` when it rejects a call outright
/// (wrong parameter count, unknown method, ...). The message is stored with surrounding whitespace
/// removed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("({code}) {string}")]
pub struct Fault {
    code: i32,
    string: String,
}

impl Fault {
    /// Creates a new `Fault` from an error code and a message.
    pub fn new<S: AsRef<str>>(code: i32, string: S) -> Fault {
        Fault {
            code,
            string: string.as_ref().trim().to_string(),
        }
    }

    /// Returns the fault code.
    ///
    /// A code of 0 means "no fault"; such faults are never returned as errors.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Returns the (trimmed) fault message.
    pub fn string(&self) -> &str {
        &self.string
    }

    /// Creates a `Fault` from a `Value`.
    ///
    /// The `Value` must be a `Value::Struct` with an integer `faultCode` field. A missing or
    /// non-string `faultString` is read as an empty message. Additional fields are ignored.
    ///
    /// Returns `None` if the value isn't a valid `Fault`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_struct()?;
        let code = map.get("faultCode")?.as_i32()?;
        let string = map.get("faultString").and_then(Value::as_str).unwrap_or("");

        Some(Fault::new(code, string))
    }
}
