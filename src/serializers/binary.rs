use std::io::{BufRead, Error, ErrorKind, Read};

use super::{Deserializer, dictionary::StringDictionary};
use crate::{
    AttrType, Attribute, DmxError, Element, ElementId, Header,
    attribute::{Angle, Color, Matrix, Quaternion, Vector2, Vector3, Vector4},
};

/// The name given to placeholders for elements a file refers to but does not contain.
pub const MISSING_ELEMENT_NAME: &str = "Missing element";

const MISSING_ELEMENT_HEADROOM: usize = 100;
const MAX_PREALLOCATED_ITEMS: usize = 1 << 16;

const V1_TYPES: [AttrType; 29] = [
    AttrType::None,
    AttrType::Element,
    AttrType::Int,
    AttrType::Float,
    AttrType::Bool,
    AttrType::String,
    AttrType::Binary,
    AttrType::ObjectId,
    AttrType::Color,
    AttrType::Vector2,
    AttrType::Vector3,
    AttrType::Vector4,
    AttrType::Angle,
    AttrType::Quaternion,
    AttrType::Matrix,
    AttrType::ElementArray,
    AttrType::IntArray,
    AttrType::FloatArray,
    AttrType::BoolArray,
    AttrType::StringArray,
    AttrType::BinaryArray,
    AttrType::ObjectIdArray,
    AttrType::ColorArray,
    AttrType::Vector2Array,
    AttrType::Vector3Array,
    AttrType::Vector4Array,
    AttrType::AngleArray,
    AttrType::QuaternionArray,
    AttrType::MatrixArray,
];

const V2_TYPES: [AttrType; 29] = [
    AttrType::None,
    AttrType::Element,
    AttrType::Int,
    AttrType::Float,
    AttrType::Bool,
    AttrType::String,
    AttrType::Binary,
    AttrType::Time,
    AttrType::Color,
    AttrType::Vector2,
    AttrType::Vector3,
    AttrType::Vector4,
    AttrType::Angle,
    AttrType::Quaternion,
    AttrType::Matrix,
    AttrType::ElementArray,
    AttrType::IntArray,
    AttrType::FloatArray,
    AttrType::BoolArray,
    AttrType::StringArray,
    AttrType::BinaryArray,
    AttrType::TimeArray,
    AttrType::ColorArray,
    AttrType::Vector2Array,
    AttrType::Vector3Array,
    AttrType::Vector4Array,
    AttrType::AngleArray,
    AttrType::QuaternionArray,
    AttrType::MatrixArray,
];

const V3_TYPES: [AttrType; 17] = [
    AttrType::None,
    AttrType::Element,
    AttrType::Int,
    AttrType::Float,
    AttrType::Bool,
    AttrType::String,
    AttrType::Binary,
    AttrType::Time,
    AttrType::Color,
    AttrType::Vector2,
    AttrType::Vector3,
    AttrType::Vector4,
    AttrType::Angle,
    AttrType::Quaternion,
    AttrType::Matrix,
    AttrType::UInt64,
    AttrType::UInt8,
];

/// Maps a binary type id to its kind for the given encoding version.
///
/// Versions without a table map every id to [AttrType::None].
pub fn attribute_type_for_id(encoding: &str, version: i32, id: u32) -> Result<AttrType, DmxError> {
    if encoding != "binary" && encoding != "binary_proto" {
        return Err(DmxError::InvalidFormat(format!("Unknown Binary Encoding {encoding:?}")));
    }

    let table: &[AttrType] = match version {
        1 | 2 => &V1_TYPES,
        3..=5 => &V2_TYPES,
        9 => {
            if id >= 32 {
                return Err(DmxError::UnsupportedVersion(version));
            }
            &V3_TYPES
        }
        _ => return Ok(AttrType::None),
    };

    table.get(id as usize).copied().ok_or(DmxError::IndexOutOfRange {
        table: "type table",
        index: i64::from(id),
    })
}

macro_rules! declare_read {
    ($name:ident, $qualifier:ty) => {
        pub(crate) fn $name(&mut self) -> Result<$qualifier, DmxError> {
            let mut bytes = [0; size_of::<$qualifier>()];
            self.buffer.read_exact(&mut bytes)?;
            Ok(<$qualifier>::from_le_bytes(bytes))
        }
    };
}

pub(crate) struct BinaryReader<T: BufRead> {
    buffer: T,
}

impl<T: BufRead> BinaryReader<T> {
    pub(crate) fn new(buffer: T) -> Self {
        Self { buffer }
    }

    pub(crate) fn read_string(&mut self) -> Result<String, DmxError> {
        let mut string_buffer = Vec::new();
        self.buffer.read_until(0, &mut string_buffer)?;

        if string_buffer.pop() != Some(0) {
            return Err(Error::from(ErrorKind::UnexpectedEof).into());
        }

        Ok(String::from_utf8_lossy(&string_buffer).into_owned())
    }

    pub(crate) fn read_guid(&mut self) -> Result<[u8; 16], DmxError> {
        let mut guid = [0; 16];
        self.buffer.read_exact(&mut guid)?;
        Ok(guid)
    }

    /// Reads `length` raw bytes without trusting the length for the allocation.
    pub(crate) fn read_bytes(&mut self, length: i32) -> Result<Vec<u8>, DmxError> {
        let expected = u64::try_from(length).map_err(|_| DmxError::InvalidLength(length))?;

        let mut bytes = Vec::new();
        let read = (&mut self.buffer).take(expected).read_to_end(&mut bytes)?;

        if (read as u64) < expected {
            return Err(Error::from(ErrorKind::UnexpectedEof).into());
        }

        Ok(bytes)
    }

    declare_read!(read_u8, u8);
    declare_read!(read_i16, i16);
    declare_read!(read_u16, u16);
    declare_read!(read_i32, i32);
    declare_read!(read_u64, u64);
    declare_read!(read_f32, f32);

    fn read_length(&mut self) -> Result<usize, DmxError> {
        let length = self.read_i32()?;
        usize::try_from(length).map_err(|_| DmxError::InvalidLength(length))
    }

    fn read_floats<const N: usize>(&mut self) -> Result<[f32; N], DmxError> {
        let mut values = [0.0; N];
        for value in &mut values {
            *value = self.read_f32()?;
        }
        Ok(values)
    }
}

/// Decodes binary files up to encoding version 5.
pub struct BinaryDeserializer;

impl BinaryDeserializer {
    /// Encoding versions above this are rejected.
    pub const MAX_SUPPORTED_VERSION: i32 = 8;
}

impl Deserializer for BinaryDeserializer {
    fn name() -> &'static str {
        "binary"
    }

    fn deserialize(buffer: &mut impl BufRead, header: &Header) -> Result<Vec<Element>, DmxError> {
        let mut reader = BinaryReader::new(buffer);
        reader.read_u8()?; // Reserved byte after the header

        let encoding = header.get_encoding()?;
        let format = header.get_format()?;

        if encoding.version > Self::MAX_SUPPORTED_VERSION {
            return Err(DmxError::UnsupportedVersion(encoding.version));
        }

        tracing::debug!(
            encoding = %encoding.name,
            version = encoding.version,
            format = %format.name,
            format_version = format.version,
            "decoding binary dmx"
        );

        let dictionary = StringDictionary::read(&mut reader, &encoding.name, encoding.version)?;

        BinaryDecoder {
            reader,
            dictionary,
            encoding: &encoding.name,
            version: encoding.version,
            elements: Vec::new(),
        }
        .decode()
    }
}

struct BinaryDecoder<'a, T: BufRead> {
    reader: BinaryReader<T>,
    dictionary: StringDictionary,
    encoding: &'a str,
    version: i32,
    elements: Vec<Element>,
}

impl<T: BufRead> BinaryDecoder<'_, T> {
    fn decode(mut self) -> Result<Vec<Element>, DmxError> {
        let element_count = self.reader.read_length()?;

        // Placeholders for missing elements are appended while reading attributes.
        self.elements.reserve((element_count + element_count / 20).min(MAX_PREALLOCATED_ITEMS));

        for _ in 0..element_count {
            let class = self.dictionary.read_indexed(&mut self.reader)?;
            let name = if self.version >= 4 {
                self.dictionary.read_indexed(&mut self.reader)?
            } else {
                self.dictionary.read_inline(&mut self.reader)?
            };
            let guid = self.reader.read_guid()?;

            self.elements.push(Element::new(class, name, guid));
        }

        let mut attribute_total = 0;

        for element_index in 0..element_count {
            let attribute_count = self.reader.read_length()?;
            let mut attributes = Vec::with_capacity(attribute_count.min(MAX_PREALLOCATED_ITEMS));

            for _ in 0..attribute_count {
                let name = self.dictionary.read_indexed(&mut self.reader)?;
                let type_id = self.reader.read_u8()?;
                let kind = attribute_type_for_id(self.encoding, self.version, u32::from(type_id))?;

                let attribute = if kind.is_array() {
                    let length = self.reader.read_length()?;
                    let single_kind = kind.to_single_kind();
                    let mut items = Vec::with_capacity(length.min(MAX_PREALLOCATED_ITEMS));

                    for _ in 0..length {
                        items.push(self.decode_value(single_kind, true)?);
                    }

                    Attribute::array(kind, items)
                } else {
                    self.decode_value(kind, false)?
                };

                attributes.push((name, attribute));
            }

            attribute_total += attributes.len();

            if let Some(element) = self.elements.get_mut(element_index) {
                element.reserve_attributes(attributes.len());
                for (name, attribute) in attributes {
                    element.set_attribute(name, attribute);
                }
            }
        }

        tracing::debug!(
            elements = element_count,
            placeholders = self.elements.len() - element_count,
            attributes = attribute_total,
            "decoded binary elements"
        );

        Ok(self.elements)
    }

    fn decode_value(&mut self, kind: AttrType, from_array: bool) -> Result<Attribute, DmxError> {
        let reader = &mut self.reader;

        let attribute = match kind {
            AttrType::Element => Attribute::Element(self.decode_element_reference()?),
            AttrType::Int => Attribute::Int(reader.read_i32()?),
            AttrType::Float => Attribute::Float(reader.read_f32()?),
            AttrType::Bool => Attribute::Bool(reader.read_u8()? != 0),
            AttrType::String => {
                let value = if self.version < 4 || from_array {
                    self.dictionary.read_inline(reader)?
                } else {
                    self.dictionary.read_indexed(reader)?
                };
                Attribute::String(value)
            }
            AttrType::Binary => {
                let length = reader.read_i32()?;
                Attribute::Binary(reader.read_bytes(length)?)
            }
            AttrType::Time => Attribute::Time(reader.read_i32()? as f32 / 10_000.0),
            AttrType::Color => Attribute::Color(Color {
                red: reader.read_u8()?,
                green: reader.read_u8()?,
                blue: reader.read_u8()?,
                alpha: reader.read_u8()?,
            }),
            AttrType::Vector2 => {
                let [x, y] = reader.read_floats()?;
                Attribute::Vector2(Vector2 { x, y })
            }
            AttrType::Vector3 => {
                let [x, y, z] = reader.read_floats()?;
                Attribute::Vector3(Vector3 { x, y, z })
            }
            AttrType::Vector4 => {
                let [x, y, z, w] = reader.read_floats()?;
                Attribute::Vector4(Vector4 { x, y, z, w })
            }
            AttrType::Angle => {
                let [pitch, yaw, roll] = reader.read_floats()?;
                Attribute::Angle(Angle { pitch, yaw, roll })
            }
            AttrType::Quaternion => {
                let [x, y, z, w] = reader.read_floats()?;
                Attribute::Quaternion(Quaternion { x, y, z, w })
            }
            AttrType::Matrix => {
                let mut entries = [[0.0; 4]; 4];
                for row in &mut entries {
                    *row = reader.read_floats()?;
                }
                Attribute::Matrix(Matrix { entries })
            }
            AttrType::UInt64 => Attribute::UInt64(reader.read_u64()?),
            AttrType::UInt8 => Attribute::UInt8(reader.read_u8()?),
            _ => return Err(DmxError::UnsupportedType(kind.to_string())),
        };

        Ok(attribute)
    }

    fn decode_element_reference(&mut self) -> Result<Option<ElementId>, DmxError> {
        let index = self.reader.read_i32()?;

        match index {
            -1 => Ok(None),
            -2 => {
                let id = self.reader.read_string()?;

                if self.elements.len() == self.elements.capacity() {
                    self.elements.reserve(MISSING_ELEMENT_HEADROOM);
                }
                self.elements.push(Element::new(String::new(), MISSING_ELEMENT_NAME, [0; 16]));

                tracing::debug!(%id, placeholder = self.elements.len() - 1, "element missing from file");

                Ok(Some(ElementId(self.elements.len() - 1)))
            }
            _ => match usize::try_from(index) {
                Ok(position) if position < self.elements.len() => Ok(Some(ElementId(position))),
                _ => Err(DmxError::IndexOutOfRange {
                    table: "element table",
                    index: i64::from(index),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn type_tables_cover_supported_versions() {
        for (version, length) in [(1, 29), (2, 29), (3, 29), (4, 29), (5, 29), (9, 17)] {
            for id in 0..length {
                let kind = attribute_type_for_id("binary", version, id).unwrap();
                assert_ne!(kind, AttrType::Invalid);
            }

            assert!(matches!(
                attribute_type_for_id("binary", version, length),
                Err(DmxError::IndexOutOfRange { table: "type table", .. })
            ));
        }
    }

    #[test]
    fn type_tables_differ_by_version() {
        assert_eq!(attribute_type_for_id("binary", 2, 7).unwrap(), AttrType::ObjectId);
        assert_eq!(attribute_type_for_id("binary", 3, 7).unwrap(), AttrType::Time);
        assert_eq!(attribute_type_for_id("binary_proto", 5, 21).unwrap(), AttrType::TimeArray);
        assert_eq!(attribute_type_for_id("binary", 9, 16).unwrap(), AttrType::UInt8);
        assert_eq!(attribute_type_for_id("binary", 7, 3).unwrap(), AttrType::None);
    }

    #[test]
    fn type_table_rejections() {
        assert!(matches!(attribute_type_for_id("binary", 9, 32), Err(DmxError::UnsupportedVersion(9))));
        assert!(matches!(attribute_type_for_id("keyvalues2", 1, 0), Err(DmxError::InvalidFormat(_))));
    }

    #[test]
    fn reader_primitives() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(-7i32).to_le_bytes());
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(b"text\0");
        bytes.extend_from_slice(&3i32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3]);

        let mut reader = BinaryReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_i32().unwrap(), -7);
        assert_eq!(reader.read_f32().unwrap(), 1.5);
        assert_eq!(reader.read_string().unwrap(), "text");
        let length = reader.read_i32().unwrap();
        assert_eq!(reader.read_bytes(length).unwrap(), vec![1, 2, 3]);
        assert!(matches!(reader.read_u8(), Err(DmxError::Io(_))));
    }

    #[test]
    fn unterminated_string_and_short_binary() {
        let mut reader = BinaryReader::new(Cursor::new(b"open".to_vec()));
        assert!(matches!(reader.read_string(), Err(DmxError::Io(_))));

        let mut reader = BinaryReader::new(Cursor::new(vec![1, 2]));
        assert!(matches!(reader.read_bytes(8), Err(DmxError::Io(_))));

        let mut reader = BinaryReader::new(Cursor::new(Vec::new()));
        assert!(matches!(reader.read_bytes(-1), Err(DmxError::InvalidLength(-1))));
    }
}
