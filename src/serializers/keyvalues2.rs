use std::{
    fmt::{self, Display, Formatter},
    io::BufRead,
};

use indexmap::IndexMap;

use super::{Deserializer, conversion};
use crate::{DmxError, Element, Header, header::read_byte};

/// A value in the untyped KeyValues2 tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Element(ElementNode),
    Array(ArrayNode),
}

/// A `{ ... }` block of named items.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementNode {
    pub children: IndexMap<String, ElementItem>,
}

/// A `[ ... ]` block of items. The document itself is an array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrayNode {
    pub items: Vec<ArrayItem>,
}

/// An item of an element body, `name type value`.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementItem {
    pub type_name: String,
    pub value: Value,
}

/// An item of an array body. Bare values carry no type.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayItem {
    pub type_name: Option<String>,
    pub value: Value,
}

fn write_indent(f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str("\t")?;
    }
    Ok(())
}

impl Value {
    fn write_tree(&self, f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Value::String(value) => {
                write_indent(f, depth)?;
                writeln!(f, "{value}")
            }
            Value::Element(element) => element.write_tree(f, depth),
            Value::Array(array) => array.write_tree(f, depth),
        }
    }
}

impl ElementNode {
    fn write_tree(&self, f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
        write_indent(f, depth)?;
        writeln!(f, "Element")?;

        for (name, item) in &self.children {
            write_indent(f, depth + 1)?;
            writeln!(f, "ElementItem[{name}][{}]", item.type_name)?;
            item.value.write_tree(f, depth + 2)?;
        }

        Ok(())
    }
}

impl ArrayNode {
    fn write_tree(&self, f: &mut Formatter<'_>, depth: usize) -> fmt::Result {
        write_indent(f, depth)?;
        writeln!(f, "Array")?;

        for item in &self.items {
            write_indent(f, depth + 1)?;
            writeln!(f, "ArrayItem[{}]", item.type_name.as_deref().unwrap_or("NoType"))?;
            item.value.write_tree(f, depth + 2)?;
        }

        Ok(())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

impl Display for ElementNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

impl Display for ArrayNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}

fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

/// Reads the KeyValues2 text that follows the header into an [ArrayNode].
pub struct KeyValues2Reader<B: BufRead> {
    buffer: B,
    pushback: Option<u8>,
    line: usize,
    depth: usize,
}

impl<B: BufRead> KeyValues2Reader<B> {
    /// How many elements and arrays may be open at once. Deeper text is a syntax error.
    pub const MAX_DEPTH: usize = 128;

    pub fn new(buffer: B) -> Self {
        Self::starting_at_line(buffer, 1)
    }

    /// Creates a reader whose line counter starts at `line`, for text that does not start the file.
    pub fn starting_at_line(buffer: B, line: usize) -> Self {
        Self {
            buffer,
            pushback: None,
            line,
            depth: 0,
        }
    }

    /// The current line, counting from one.
    pub fn get_line(&self) -> usize {
        self.line
    }

    fn syntax_error(&self) -> DmxError {
        DmxError::SyntaxError(self.line)
    }

    fn read_byte(&mut self) -> Result<Option<u8>, DmxError> {
        let byte = match self.pushback.take() {
            Some(byte) => Some(byte),
            None => read_byte(&mut self.buffer)?,
        };

        if byte == Some(b'\n') {
            self.line += 1;
        }

        Ok(byte)
    }

    fn unread(&mut self, byte: u8) {
        if byte == b'\n' {
            self.line -= 1;
        }
        self.pushback = Some(byte);
    }

    /// Returns the next byte, skipping whitespace unless `include_whitespace` is set.
    ///
    /// The end of the stream and a null byte both end the text.
    pub fn read_token(&mut self, include_whitespace: bool) -> Result<Option<u8>, DmxError> {
        loop {
            match self.read_byte()? {
                None | Some(0) => return Ok(None),
                Some(byte) if !include_whitespace && is_whitespace(byte) => continue,
                Some(byte) => return Ok(Some(byte)),
            }
        }
    }

    /// Reads a quoted or bare string. Returns None if the text ends inside a quoted string.
    pub fn read_string(&mut self) -> Result<Option<String>, DmxError> {
        let Some(first) = self.read_token(false)? else {
            return Ok(None);
        };

        let mut string_buffer = Vec::new();

        if first == b'"' {
            loop {
                match self.read_token(true)? {
                    None => return Ok(None),
                    Some(b'"') => break,
                    Some(b'\\') => match self.read_token(true)? {
                        None => return Ok(None),
                        Some(escaped @ (b'"' | b'\\')) => string_buffer.push(escaped),
                        Some(other) => string_buffer.extend_from_slice(&[b'\\', other]),
                    },
                    Some(byte) => string_buffer.push(byte),
                }
            }
        } else {
            string_buffer.push(first);

            while let Some(byte) = self.read_token(true)? {
                if is_whitespace(byte) {
                    break;
                }
                string_buffer.push(byte);
            }
        }

        Ok(Some(String::from_utf8_lossy(&string_buffer).into_owned()))
    }

    /// Skips past the next `target` outside whitespace. Returns false if the text ends first.
    pub fn read_until(&mut self, target: u8) -> Result<bool, DmxError> {
        while let Some(token) = self.read_token(false)? {
            if token == target {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Like [KeyValues2Reader::read_until], then skips the byte that follows `target`.
    ///
    /// Returns false if the text ends before that byte.
    pub fn read_until_after(&mut self, target: u8) -> Result<bool, DmxError> {
        if !self.read_until(target)? {
            return Ok(false);
        }

        Ok(self.read_byte()?.is_some())
    }

    /// Reads the whole text as the implicit root array.
    pub fn read_document(&mut self) -> Result<ArrayNode, DmxError> {
        let mut root = ArrayNode::default();
        self.read_array_body(&mut root, true)?;
        Ok(root)
    }

    fn read_array_body(&mut self, array: &mut ArrayNode, root: bool) -> Result<(), DmxError> {
        let mut token = self.read_token(false)?;

        while let Some(byte) = token {
            if byte == b']' {
                return Ok(());
            }

            self.unread(byte);
            self.read_array_item(array)?;

            token = self.read_token(false)?;
            while token == Some(b',') {
                token = self.read_token(false)?;
            }
        }

        if root { Ok(()) } else { Err(self.syntax_error()) }
    }

    fn read_array_item(&mut self, array: &mut ArrayNode) -> Result<(), DmxError> {
        let type_name = self.read_string()?.ok_or_else(|| self.syntax_error())?;
        let token = self.read_token(false)?.ok_or_else(|| self.syntax_error())?;

        if token == b',' || token == b']' {
            if token == b']' {
                self.unread(token);
            }

            array.items.push(ArrayItem {
                type_name: None,
                value: Value::String(type_name),
            });
            return Ok(());
        }

        let value = self.read_value(token)?;
        array.items.push(ArrayItem {
            type_name: Some(type_name),
            value,
        });

        Ok(())
    }

    fn read_element_body(&mut self, element: &mut ElementNode) -> Result<(), DmxError> {
        loop {
            match self.read_token(false)? {
                None => return Err(self.syntax_error()),
                Some(b'}') => return Ok(()),
                Some(byte) => {
                    self.unread(byte);
                    self.read_element_item(element)?;
                }
            }
        }
    }

    fn read_element_item(&mut self, element: &mut ElementNode) -> Result<(), DmxError> {
        let name = self.read_string()?.ok_or_else(|| self.syntax_error())?;
        let type_name = self.read_string()?.ok_or_else(|| self.syntax_error())?;
        let token = self.read_token(false)?.ok_or_else(|| self.syntax_error())?;

        let value = self.read_value(token)?;
        element.children.insert(name, ElementItem { type_name, value });

        Ok(())
    }

    /// Reads the value that starts with `token`, which has already been consumed.
    fn read_value(&mut self, token: u8) -> Result<Value, DmxError> {
        match token {
            b'{' | b'[' if self.depth >= Self::MAX_DEPTH => Err(self.syntax_error()),
            b'{' => {
                let mut element = ElementNode::default();
                self.depth += 1;
                let result = self.read_element_body(&mut element);
                self.depth -= 1;
                result.map(|()| Value::Element(element))
            }
            b'[' => {
                let mut array = ArrayNode::default();
                self.depth += 1;
                let result = self.read_array_body(&mut array, false);
                self.depth -= 1;
                result.map(|()| Value::Array(array))
            }
            b'}' | b']' => Err(self.syntax_error()),
            _ => {
                self.unread(token);
                let value = self.read_string()?.ok_or_else(|| self.syntax_error())?;
                Ok(Value::String(value))
            }
        }
    }
}

/// Decodes KeyValues2 text files.
pub struct KeyValues2Deserializer;

impl Deserializer for KeyValues2Deserializer {
    fn name() -> &'static str {
        "keyvalues2"
    }

    fn deserialize(buffer: &mut impl BufRead, header: &Header) -> Result<Vec<Element>, DmxError> {
        let mut reader = KeyValues2Reader::starting_at_line(buffer, header.body_line());
        let document = reader.read_document()?;

        tracing::debug!(items = document.items.len(), lines = reader.get_line(), "parsed keyvalues2 document");

        conversion::convert(&document)
    }
}
