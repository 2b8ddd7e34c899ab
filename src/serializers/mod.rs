//! Decoders for the binary and KeyValues2 encodings.

use std::io::BufRead;

use crate::{DmxError, Element, Header};

mod binary;
pub use binary::BinaryDeserializer;
pub use binary::MISSING_ELEMENT_NAME;
pub use binary::attribute_type_for_id;

mod conversion;

mod dictionary;

mod keyvalues2;
pub use keyvalues2::ArrayItem;
pub use keyvalues2::ArrayNode;
pub use keyvalues2::ElementItem;
pub use keyvalues2::ElementNode;
pub use keyvalues2::KeyValues2Deserializer;
pub use keyvalues2::KeyValues2Reader;
pub use keyvalues2::Value;

/// Decodes the body that follows a [Header] into a flat element list.
///
/// The first element of the list is the root of the file.
pub trait Deserializer {
    /// The encoding name this deserializer handles.
    fn name() -> &'static str;

    fn deserialize(buffer: &mut impl BufRead, header: &Header) -> Result<Vec<Element>, DmxError>;
}
