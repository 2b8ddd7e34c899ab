#![allow(dead_code)]

use std::io::Cursor;

use dmx_reader::{DmxError, FileData};

/// Builds binary DMX files in memory. Every write is little-endian.
pub struct BinaryWriter {
    bytes: Vec<u8>,
}

impl BinaryWriter {
    /// Starts a file with a binary header for `version` and the reserved byte that follows it.
    pub fn new(version: i32) -> Self {
        Self::with_header(&format!("<!-- dmx encoding binary {version} format model 22 -->"))
    }

    pub fn with_header(header: &str) -> Self {
        let mut bytes = header.as_bytes().to_vec();
        bytes.push(b'\n');
        bytes.push(0);
        Self { bytes }
    }

    pub fn byte(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    pub fn short(&mut self, value: i16) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn int(&mut self, value: i32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn float(&mut self, value: f32) -> &mut Self {
        self.bytes.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn string(&mut self, value: &str) -> &mut Self {
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.push(0);
        self
    }

    pub fn guid(&mut self, seed: u8) -> &mut Self {
        self.bytes.extend_from_slice(&[seed; 16]);
        self
    }

    /// Writes a string table with a 32-bit count.
    pub fn string_table(&mut self, strings: &[&str]) -> &mut Self {
        self.int(strings.len() as i32);
        for string in strings {
            self.string(string);
        }
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn load(&self) -> Result<FileData, DmxError> {
        load_bytes(&self.bytes)
    }
}

pub fn load_bytes(bytes: &[u8]) -> Result<FileData, DmxError> {
    dmx_reader::load(&mut Cursor::new(bytes))
}

/// Loads KeyValues2 text behind a keyvalues2 header.
pub fn load_keyvalues2(text: &str) -> Result<FileData, DmxError> {
    let mut bytes = b"<!-- dmx encoding keyvalues2 1 format dmx 1 -->\n".to_vec();
    bytes.extend_from_slice(text.as_bytes());
    load_bytes(&bytes)
}
