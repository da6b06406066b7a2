//! XML-RPC response parser.

use crate::error::ParseError;
use crate::{Fault, Value};

use iso8601::datetime;
use xml::common::Position;
use xml::name::OwnedName;
use xml::reader::{EventReader, XmlEvent};
use xml::ParserConfig;

use std::collections::BTreeMap;
use std::io::Read;

pub type ParseResult<T> = Result<T, ParseError>;

/// The outcome of a method call: the returned value, or the server's `<fault>`.
pub type RawResponse = Result<Value, Fault>;

pub struct Parser<R: Read> {
    reader: EventReader<R>,
}

impl<R: Read> Parser<R> {
    pub fn new(reader: R) -> Self {
        Parser {
            reader: EventReader::new_with_config(
                reader,
                ParserConfig::new().cdata_to_characters(true),
            ),
        }
    }

    /// Reads an `XmlEvent` from a reader, disposing events we want to ignore.
    ///
    /// When encountering a new element, returns an `Err` if it has any attributes.
    fn pull_event(&mut self) -> ParseResult<XmlEvent> {
        loop {
            let event = self.reader.next()?;
            match event {
                XmlEvent::StartDocument { .. }
                | XmlEvent::Comment(_)
                | XmlEvent::Whitespace(_)
                | XmlEvent::ProcessingInstruction { .. } => continue,
                XmlEvent::StartElement { ref attributes, ref name, .. } => {
                    if !attributes.is_empty() {
                        return self.expected(format!("tag <{}> without attributes", name));
                    }
                }
                _ => {}
            }

            return Ok(event);
        }
    }

    /// Expects an opening tag like `<tag>` without attributes (and a local name without namespaces).
    fn expect_open(&mut self, tag: &str) -> ParseResult<()> {
        match self.pull_event()? {
            XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local(tag) => Ok(()),
            _ => self.expected(format!("<{}>", tag)),
        }
    }

    /// Expects a closing tag like `</tag>` with a local name without namespaces.
    fn expect_close(&mut self, tag: &str) -> ParseResult<()> {
        match self.pull_event()? {
            XmlEvent::EndElement { ref name } if name == &OwnedName::local(tag) => Ok(()),
            _ => self.expected(format!("</{}>", tag)),
        }
    }

    /// Builds and returns an `Err(UnexpectedXml)`.
    fn expected<T, E: ToString>(&self, expected: E) -> ParseResult<T> {
        Err(ParseError::UnexpectedXml {
            expected: expected.to_string(),
            position: self.reader.position(),
        })
    }

    /// Reads the text content of the element `tag` whose opening tag was just consumed, up to and
    /// including its closing tag. An empty element yields an empty string.
    fn element_text(&mut self, tag: &str) -> ParseResult<String> {
        match self.pull_event()? {
            XmlEvent::Characters(string) => {
                self.expect_close(tag)?;
                Ok(string)
            }
            XmlEvent::EndElement { ref name } if name == &OwnedName::local(tag) => Ok(String::new()),
            _ => self.expected(format!("characters or </{}>", tag)),
        }
    }

    fn parse_response(&mut self) -> ParseResult<RawResponse> {
        let response: RawResponse;

        // <methodResponse>
        self.expect_open("methodResponse")?;

        // <fault> / <params>
        match self.pull_event()? {
            XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("fault") => {
                let value = self.parse_value()?;
                let fault = Fault::from_value(&value).ok_or_else(|| ParseError::UnexpectedValue {
                    expected: "fault struct with an integer faultCode",
                    found: value.type_name().to_string(),
                })?;
                response = Err(fault);

                self.expect_close("fault")?;
            }
            XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("params") => {
                // <param>
                self.expect_open("param")?;

                response = Ok(self.parse_value()?);

                // </param>
                self.expect_close("param")?;
                self.expect_close("params")?;
            }
            _ => return self.expected("<fault> or <params>"),
        }

        // </methodResponse>
        self.expect_close("methodResponse")?;

        Ok(response)
    }

    pub fn parse_value(&mut self) -> ParseResult<Value> {
        // <value>
        self.expect_open("value")?;

        self.parse_value_inner()
    }

    /// Parses the content of a `<value>` element whose opening tag was already consumed, including
    /// the closing `</value>`.
    fn parse_value_inner(&mut self) -> ParseResult<Value> {
        fn invalid_value(for_type: &'static str, found: String) -> ParseError {
            ParseError::InvalidValue { for_type, found }
        }

        // Raw string or specific type tag
        let value = match self.pull_event()? {
            XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("struct") => {
                let mut members = BTreeMap::new();
                loop {
                    match self.pull_event()? {
                        XmlEvent::EndElement { ref name } if name == &OwnedName::local("struct") => break,
                        XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("member") => {
                            // <name>NAME</name>
                            self.expect_open("name")?;
                            let name = self.element_text("name")?.trim().to_string();

                            let value = self.parse_value()?;

                            // </member>
                            self.expect_close("member")?;

                            members.insert(name, value);
                        }
                        _ => return self.expected("</struct> or <member>"),
                    }
                }

                Value::Struct(members)
            }
            XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("array") => {
                let mut elements = Vec::new();
                self.expect_open("data")?;
                loop {
                    match self.pull_event()? {
                        XmlEvent::EndElement { ref name } if name == &OwnedName::local("data") => break,
                        XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("value") => {
                            elements.push(self.parse_value_inner()?);
                        }
                        _ => return self.expected("</data> or <value>"),
                    }
                }
                self.expect_close("array")?;
                Value::Array(elements)
            }
            XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("nil") => {
                self.expect_close("nil")?;
                Value::Nil
            }
            XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("string") => {
                Value::String(self.element_text("string")?)
            }
            XmlEvent::StartElement { ref name, .. } if name == &OwnedName::local("base64") => {
                let data = self.element_text("base64")?;
                let bytes = base64::decode(data.trim()).map_err(|_| invalid_value("base64", data))?;
                Value::Base64(bytes)
            }
            XmlEvent::StartElement { name, .. } => {
                // All other types expect raw characters and a corresponding close tag
                let tag = name.local_name;
                let data = match self.pull_event()? {
                    XmlEvent::Characters(string) => string,
                    _ => return self.expected("characters"),
                };
                self.expect_close(&tag)?;

                let text = data.trim();
                match &*tag {
                    "i4" | "int" => Value::Int(text.parse().map_err(|_| invalid_value("integer", data.clone()))?),
                    "i8" => Value::Int64(text.parse().map_err(|_| invalid_value("i8", data.clone()))?),
                    "boolean" => match text {
                        "0" => Value::Bool(false),
                        "1" => Value::Bool(true),
                        _ => return Err(invalid_value("boolean", data.clone())),
                    },
                    "double" => Value::Double(text.parse().map_err(|_| invalid_value("double", data.clone()))?),
                    "dateTime.iso8601" => {
                        Value::DateTime(datetime(text).map_err(|_| invalid_value("dateTime.iso8601", data.clone()))?)
                    }
                    _ => return self.expected("valid type tag or characters"),
                }
            }
            XmlEvent::Characters(string) => {
                // Untyped values are strings; the text is the whole content of `<value>`
                self.expect_close("value")?;
                return Ok(Value::String(string));
            }
            XmlEvent::EndElement { ref name } if name == &OwnedName::local("value") => {
                return Ok(Value::String(String::new()));
            }
            _ => return self.expected("type tag or characters"),
        };

        // </value>
        self.expect_close("value")?;

        Ok(value)
    }
}

/// Parses a response from an XML reader.
pub fn parse_response<R: Read>(reader: R) -> ParseResult<RawResponse> {
    Parser::new(reader).parse_response()
}
