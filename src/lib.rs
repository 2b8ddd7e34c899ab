//! Loads Valve DMX files, in either the binary or the KeyValues2 encoding, into a [FileData] element graph.

use std::{fs::File, io::BufRead, io::BufReader, path::Path};

mod attribute;

pub use attribute::Angle;
pub use attribute::Attribute;
pub use attribute::AttributeError;
pub use attribute::Binary;
pub use attribute::Color;
pub use attribute::Matrix;
pub use attribute::Quaternion;
pub use attribute::Vector2;
pub use attribute::Vector3;
pub use attribute::Vector4;

mod attribute_type;

pub use attribute_type::AttrType;

mod element;

pub use element::Element;
pub use element::ElementId;
pub use element::ElementRef;

mod error;

pub use error::DmxError;

mod file_data;

pub use file_data::FileData;

mod header;

pub use header::Header;
pub use header::HeaderField;

pub mod serializers;

use serializers::{BinaryDeserializer, Deserializer, KeyValues2Deserializer};

/// Loads a DMX file from a buffer, picking the decoder from its header.
pub fn load(buffer: &mut impl BufRead) -> Result<FileData, DmxError> {
    let header = Header::read(buffer)?;

    if !header.is_dmx() {
        return Err(DmxError::InvalidFormat(header.get_text().to_string()));
    }

    tracing::debug!(header = header.get_text(), "read dmx header");

    let elements = match header.get_encoding_name() {
        Some(name) if name == KeyValues2Deserializer::name() => KeyValues2Deserializer::deserialize(buffer, &header)?,
        Some(name) if name == BinaryDeserializer::name() => BinaryDeserializer::deserialize(buffer, &header)?,
        _ => return Err(DmxError::InvalidFormat(header.get_text().to_string())),
    };

    FileData::new(elements)
}

/// Loads the DMX file at `path`.
pub fn load_file(path: impl AsRef<Path>) -> Result<FileData, DmxError> {
    let mut buffer = BufReader::new(File::open(path)?);
    load(&mut buffer)
}
