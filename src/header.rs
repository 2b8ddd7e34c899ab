use std::io::{BufRead, ErrorKind};

use crate::DmxError;

/// A named and versioned header entry, such as `encoding binary 5`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderField {
    pub name: String,
    pub version: i32,
}

/// The comment line every DMX file starts with.
///
/// For example `<!-- dmx encoding binary 5 format model 22 -->`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    text: String,
    tokens: Vec<String>,
    lines: usize,
}

impl Header {
    pub const END_TOKEN: &'static str = "-->";
    pub const MAX_HEADER_LENGTH: usize = 1024;

    const ENCODING_TOKEN: &'static str = "encoding";
    const FORMAT_TOKEN: &'static str = "format";

    /// Reads bytes up to and including the end token, then one line terminator if present.
    pub fn read(buffer: &mut impl BufRead) -> Result<Self, DmxError> {
        let mut header = Vec::new();

        loop {
            let Some(byte) = read_byte(buffer)? else {
                return Err(DmxError::HeaderNotFound);
            };

            header.push(byte);

            if header.len() > Self::MAX_HEADER_LENGTH {
                return Err(DmxError::HeaderNotFound);
            }

            if header.ends_with(Self::END_TOKEN.as_bytes()) {
                break;
            }
        }

        if peek_byte(buffer)? == Some(b'\r') {
            buffer.consume(1);
        }

        let mut header = Self::from_text(String::from_utf8_lossy(&header).into_owned());

        if peek_byte(buffer)? == Some(b'\n') {
            buffer.consume(1);
            header.lines += 1;
        }

        Ok(header)
    }

    fn from_text(text: String) -> Self {
        let tokens = text.split_whitespace().map(String::from).collect();
        let lines = text.matches('\n').count();
        Self { text, tokens, lines }
    }

    /// The line number the body starts on, counting from one.
    pub(crate) fn body_line(&self) -> usize {
        self.lines + 1
    }

    /// Returns the header as it was read, including the comment markers.
    pub fn get_text(&self) -> &str {
        &self.text
    }

    /// Returns the whitespace separated tokens of the header.
    pub fn get_tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Returns true if the header names the dmx format in its second token.
    pub fn is_dmx(&self) -> bool {
        self.tokens.get(1).is_some_and(|token| token == "dmx")
    }

    /// Returns the token naming the encoding, without checking the rest of the header.
    pub fn get_encoding_name(&self) -> Option<&str> {
        self.tokens.get(3).map(String::as_str)
    }

    /// Finds `id` and returns the name and version that follow it.
    pub fn get_field(&self, id: &str) -> Result<HeaderField, DmxError> {
        let invalid = || DmxError::InvalidHeader(self.text.clone());

        let position = self.tokens.iter().position(|token| token == id).ok_or_else(invalid)?;

        if position + 2 >= self.tokens.len() {
            return Err(invalid());
        }

        let version = leading_int(&self.tokens[position + 2]).ok_or_else(invalid)?;

        Ok(HeaderField {
            name: self.tokens[position + 1].clone(),
            version,
        })
    }

    pub fn get_encoding(&self) -> Result<HeaderField, DmxError> {
        self.get_field(Self::ENCODING_TOKEN)
    }

    pub fn get_format(&self) -> Result<HeaderField, DmxError> {
        self.get_field(Self::FORMAT_TOKEN)
    }
}

/// Parses the integer at the start of `token`, so a version written against the end token still reads.
fn leading_int(token: &str) -> Option<i32> {
    let digits = token.strip_prefix(['-', '+']).unwrap_or(token);
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    let sign = token.len() - digits.len();

    token[..sign + end].parse().ok()
}

fn peek_byte(buffer: &mut impl BufRead) -> Result<Option<u8>, DmxError> {
    loop {
        match buffer.fill_buf() {
            Ok(available) => return Ok(available.first().copied()),
            Err(error) if error.kind() == ErrorKind::Interrupted => continue,
            Err(error) => return Err(error.into()),
        }
    }
}

pub(crate) fn read_byte(buffer: &mut impl BufRead) -> Result<Option<u8>, DmxError> {
    let byte = peek_byte(buffer)?;

    if byte.is_some() {
        buffer.consume(1);
    }

    Ok(byte)
}
