use crate::error::MarshalError;

use xml::writer::{EmitterConfig, EventWriter, Result as WriteResult, XmlEvent};

use std::io::Write;

/// A call to a remote procedure: a method name and positional parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodCall {
    name: String,
    params: Vec<Param>,
}

/// A positional parameter of a `MethodCall`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Param {
    /// `<string>`
    String(String),
    /// `<int>`, 32-bit signed integer.
    Int(i32),
    /// `<struct>`, members are written in the given order.
    Struct(Vec<Member>),
}

/// A named member of a `Param::Struct`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub value: MemberValue,
}

/// The value of a struct `Member`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberValue {
    String(String),
    Int(i32),
}

impl MethodCall {
    /// Creates a new call to a method named `name`.
    ///
    /// By default, no parameters are passed. Use the `arg` method to append parameters.
    pub fn new<S: Into<String>>(name: S) -> Self {
        MethodCall {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Appends a parameter to be passed to the current list of parameters.
    pub fn arg<T: Into<Param>>(mut self, param: T) -> Self {
        self.params.push(param.into());
        self
    }

    /// The name of the called method.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parameters, in the order they are sent.
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Formats this `MethodCall` as an indented, UTF-8 encoded XML document.
    ///
    /// The document starts with a bare `<?xml version="1.0"?>` declaration.
    ///
    /// # Errors
    ///
    /// Any errors reported by the writer will be propagated to the caller.
    pub fn write_as_xml<W: Write>(&self, mut sink: W) -> Result<(), MarshalError> {
        sink.write_all(b"<?xml version=\"1.0\"?>\n")
            .map_err(xml::writer::Error::from)?;

        let mut writer = EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(false)
            .create_writer(sink);

        writer.write(XmlEvent::start_element("methodCall"))?;
        text_element(&mut writer, "methodName", &self.name)?;
        writer.write(XmlEvent::start_element("params"))?;
        for param in &self.params {
            writer.write(XmlEvent::start_element("param"))?;
            param.write_as_xml(&mut writer)?;
            writer.write(XmlEvent::end_element())?;
        }
        writer.write(XmlEvent::end_element())?;
        writer.write(XmlEvent::end_element())?;
        Ok(())
    }

    /// Serializes this `MethodCall` into a new buffer.
    pub fn to_xml(&self) -> Result<Vec<u8>, MarshalError> {
        let mut body = Vec::new();
        self.write_as_xml(&mut body)?;
        Ok(body)
    }
}

impl Param {
    /// Writes this parameter as a `<value>` element.
    fn write_as_xml<W: Write>(&self, writer: &mut EventWriter<W>) -> WriteResult<()> {
        match *self {
            Param::String(ref s) => MemberValue::write_scalar(writer, "string", s),
            Param::Int(i) => MemberValue::write_scalar(writer, "int", &i.to_string()),
            Param::Struct(ref members) => {
                writer.write(XmlEvent::start_element("value"))?;
                writer.write(XmlEvent::start_element("struct"))?;
                for member in members {
                    writer.write(XmlEvent::start_element("member"))?;
                    text_element(writer, "name", &member.name)?;
                    member.value.write_as_xml(writer)?;
                    writer.write(XmlEvent::end_element())?;
                }
                writer.write(XmlEvent::end_element())?;
                writer.write(XmlEvent::end_element())
            }
        }
    }
}

impl Member {
    pub fn string<N: Into<String>, S: Into<String>>(name: N, value: S) -> Self {
        Member {
            name: name.into(),
            value: MemberValue::String(value.into()),
        }
    }

    pub fn int<N: Into<String>>(name: N, value: i32) -> Self {
        Member {
            name: name.into(),
            value: MemberValue::Int(value),
        }
    }
}

impl MemberValue {
    fn write_as_xml<W: Write>(&self, writer: &mut EventWriter<W>) -> WriteResult<()> {
        match *self {
            MemberValue::String(ref s) => Self::write_scalar(writer, "string", s),
            MemberValue::Int(i) => Self::write_scalar(writer, "int", &i.to_string()),
        }
    }

    /// Writes `<value><tag>text</tag></value>`.
    fn write_scalar<W: Write>(writer: &mut EventWriter<W>, tag: &str, text: &str) -> WriteResult<()> {
        writer.write(XmlEvent::start_element("value"))?;
        text_element(writer, tag, text)?;
        writer.write(XmlEvent::end_element())
    }
}

fn text_element<W: Write>(writer: &mut EventWriter<W>, tag: &str, text: &str) -> WriteResult<()> {
    writer.write(XmlEvent::start_element(tag))?;
    writer.write(XmlEvent::characters(text))?;
    writer.write(XmlEvent::end_element())
}

impl From<String> for Param {
    fn from(other: String) -> Self {
        Param::String(other)
    }
}

impl<'a> From<&'a str> for Param {
    fn from(other: &'a str) -> Self {
        Param::String(other.to_string())
    }
}

impl From<i32> for Param {
    fn from(other: i32) -> Self {
        Param::Int(other)
    }
}

impl From<Vec<Member>> for Param {
    fn from(other: Vec<Member>) -> Self {
        Param::Struct(other)
    }
}
