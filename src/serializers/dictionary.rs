use std::io::BufRead;

use super::binary::BinaryReader;
use crate::DmxError;

const MAX_PREALLOCATED_STRINGS: usize = 1 << 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Width {
    Short,
    Long,
}

/// The string table of a binary file.
///
/// Legacy encodings have no table, in which case every string is stored inline.
#[derive(Debug, Default)]
pub(crate) struct StringDictionary {
    strings: Vec<String>,
    index_width: Option<Width>,
}

impl StringDictionary {
    pub(crate) fn read<T: BufRead>(reader: &mut BinaryReader<T>, encoding: &str, version: i32) -> Result<Self, DmxError> {
        let (count_width, index_width) = match (encoding, version) {
            ("binary_proto", _) | ("binary", 1) => return Ok(Self::default()),
            ("binary", 2 | 3) => (Width::Short, Width::Short),
            ("binary", 4) => (Width::Long, Width::Short),
            ("binary", _) => (Width::Long, Width::Long),
            _ => return Err(DmxError::InvalidFormat(format!("Unknown Binary Encoding {encoding:?}"))),
        };

        let count = match count_width {
            Width::Short => reader.read_i16()? as i32,
            Width::Long => reader.read_i32()?,
        };
        let count = usize::try_from(count).map_err(|_| DmxError::InvalidLength(count))?;

        let mut strings = Vec::with_capacity(count.min(MAX_PREALLOCATED_STRINGS));
        for _ in 0..count {
            strings.push(reader.read_string()?);
        }

        tracing::debug!(strings = strings.len(), ?index_width, "read string table");

        Ok(Self {
            strings,
            index_width: Some(index_width),
        })
    }

    /// Reads an index into the table, or an inline string if there is no table.
    pub(crate) fn read_indexed<T: BufRead>(&self, reader: &mut BinaryReader<T>) -> Result<String, DmxError> {
        let index = match self.index_width {
            None => return reader.read_string(),
            Some(Width::Short) => i64::from(reader.read_u16()?),
            Some(Width::Long) => i64::from(reader.read_i32()?),
        };

        usize::try_from(index)
            .ok()
            .and_then(|position| self.strings.get(position))
            .cloned()
            .ok_or(DmxError::IndexOutOfRange {
                table: "string table",
                index,
            })
    }

    pub(crate) fn read_inline<T: BufRead>(&self, reader: &mut BinaryReader<T>) -> Result<String, DmxError> {
        reader.read_string()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn reader(bytes: Vec<u8>) -> BinaryReader<Cursor<Vec<u8>>> {
        BinaryReader::new(Cursor::new(bytes))
    }

    #[test]
    fn legacy_encodings_read_inline() {
        for (encoding, version) in [("binary", 1), ("binary_proto", 2)] {
            let mut reader = reader(b"inline\0".to_vec());
            let dictionary = StringDictionary::read(&mut reader, encoding, version).unwrap();
            assert_eq!(dictionary.read_indexed(&mut reader).unwrap(), "inline");
        }
    }

    #[test]
    fn short_count_and_short_index() {
        let mut bytes = vec![2, 0];
        bytes.extend_from_slice(b"first\0second\0");
        bytes.extend_from_slice(&[1, 0]);

        let mut reader = reader(bytes);
        let dictionary = StringDictionary::read(&mut reader, "binary", 3).unwrap();
        assert_eq!(dictionary.read_indexed(&mut reader).unwrap(), "second");
    }

    #[test]
    fn long_count_and_short_index() {
        let mut bytes = vec![1, 0, 0, 0];
        bytes.extend_from_slice(b"only\0");
        bytes.extend_from_slice(&[0, 0]);
        bytes.extend_from_slice(b"raw\0");

        let mut reader = reader(bytes);
        let dictionary = StringDictionary::read(&mut reader, "binary", 4).unwrap();
        assert_eq!(dictionary.read_indexed(&mut reader).unwrap(), "only");
        assert_eq!(dictionary.read_inline(&mut reader).unwrap(), "raw");
    }

    #[test]
    fn index_out_of_range() {
        let mut bytes = vec![1, 0, 0, 0];
        bytes.extend_from_slice(b"only\0");
        bytes.extend_from_slice(&3i32.to_le_bytes());

        let mut reader = reader(bytes);
        let dictionary = StringDictionary::read(&mut reader, "binary", 5).unwrap();
        assert!(matches!(
            dictionary.read_indexed(&mut reader),
            Err(DmxError::IndexOutOfRange {
                table: "string table",
                index: 3
            })
        ));
    }

    #[test]
    fn unknown_encoding() {
        let mut reader = reader(Vec::new());
        assert!(matches!(StringDictionary::read(&mut reader, "xml", 1), Err(DmxError::InvalidFormat(_))));
    }
}
