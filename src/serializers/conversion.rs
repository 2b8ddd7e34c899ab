use std::{
    collections::{HashMap, hash_map::Entry},
    str::FromStr,
    sync::LazyLock,
};

use regex::Regex;
use uuid::Uuid as UUID;

use super::keyvalues2::{ArrayNode, ElementItem, ElementNode, KeyValues2Reader, Value};
use crate::{
    AttrType, Attribute, DmxError, Element, ElementId,
    attribute::{Angle, Color, Matrix, Quaternion, Vector2, Vector3, Vector4},
};

static COMPONENT_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s,]+").expect("component separator is a valid pattern"));

const MAX_ELEMENT_DEPTH: usize = KeyValues2Reader::<&'static [u8]>::MAX_DEPTH;

/// An element reference written by id, patched once every id is known.
#[derive(Debug)]
struct ReferenceSlot {
    element: ElementId,
    attribute: String,
    index: Option<usize>,
    id: String,
}

#[derive(Debug, Default)]
struct Converter {
    elements: Vec<Element>,
    ids: HashMap<String, ElementId>,
    pending: Vec<ReferenceSlot>,
    depth: usize,
}

/// Builds the element list for a parsed KeyValues2 document. The first root item becomes the first element.
pub(crate) fn convert(document: &ArrayNode) -> Result<Vec<Element>, DmxError> {
    let mut converter = Converter::default();

    for item in &document.items {
        let Value::Element(node) = &item.value else {
            return Err(DmxError::InvalidStructure(String::from("Root Item Is Not An Element")));
        };

        converter.convert_element(item.type_name.as_deref().unwrap_or_default(), node)?;
    }

    converter.resolve_references()?;

    tracing::debug!(
        elements = converter.elements.len(),
        ids = converter.ids.len(),
        "converted keyvalues2 document"
    );

    Ok(converter.elements)
}

impl Converter {
    fn convert_element(&mut self, class: &str, node: &ElementNode) -> Result<ElementId, DmxError> {
        if self.depth >= MAX_ELEMENT_DEPTH {
            return Err(DmxError::InvalidStructure(String::from("Elements Nested Too Deeply")));
        }

        let id = ElementId(self.elements.len());
        self.elements.push(Element::class(class));

        self.depth += 1;
        let result = self.convert_children(id, node);
        self.depth -= 1;

        result.map(|()| id)
    }

    fn convert_children(&mut self, id: ElementId, node: &ElementNode) -> Result<(), DmxError> {
        for (name, item) in &node.children {
            if let Some(attribute) = self.convert_item(id, name, item)? {
                if let Some(element) = self.elements.get_mut(id.0) {
                    element.set_attribute(name.as_str(), attribute);
                }
            }
        }

        Ok(())
    }

    fn convert_item(&mut self, owner: ElementId, name: &str, item: &ElementItem) -> Result<Option<Attribute>, DmxError> {
        let type_name = item.type_name.as_str();

        match &item.value {
            Value::String(value) if type_name == "string" && name == "name" => {
                if let Some(element) = self.elements.get_mut(owner.0) {
                    element.set_name(value.as_str());
                }
                Ok(None)
            }
            Value::String(value) if type_name == "elementid" => {
                if name != "id" {
                    return Err(DmxError::InvalidStructure(format!("Element Id Stored In {name:?}")));
                }
                self.define_id(value, owner);
                Ok(None)
            }
            Value::String(value) => {
                let kind = single_kind(type_name)?;
                self.convert_scalar(kind, value, owner, name, None).map(Some)
            }
            Value::Element(_) | Value::Array(_) if type_name == "elementid" => {
                Err(DmxError::InvalidStructure(format!("Element Id {name:?} Is Not A String")))
            }
            Value::Element(node) => Ok(Some(Attribute::Element(Some(self.convert_element(type_name, node)?)))),
            Value::Array(array) => self.convert_array(type_name, array, owner, name).map(Some),
        }
    }

    fn convert_array(&mut self, type_name: &str, array: &ArrayNode, owner: ElementId, name: &str) -> Result<Attribute, DmxError> {
        let kind = AttrType::from_keyvalues2_name(type_name)
            .filter(|kind| kind.is_array())
            .ok_or_else(|| DmxError::UnsupportedType(type_name.to_string()))?;
        let single_kind = kind.to_single_kind();
        let single_name = single_kind.keyvalues2_name().unwrap_or_default();

        let mut items = Vec::with_capacity(array.items.len());

        for (index, item) in array.items.iter().enumerate() {
            let attribute = match &item.value {
                Value::String(value) => self.convert_scalar(single_kind, value, owner, name, Some(index))?,
                Value::Element(node) => {
                    let class = item.type_name.as_deref().unwrap_or(single_name);
                    Attribute::Element(Some(self.convert_element(class, node)?))
                }
                Value::Array(_) => return Err(DmxError::InvalidStructure(format!("Array Nested In Array {name:?}"))),
            };

            items.push(attribute);
        }

        Ok(Attribute::array(kind, items))
    }

    fn convert_scalar(&mut self, kind: AttrType, value: &str, owner: ElementId, name: &str, index: Option<usize>) -> Result<Attribute, DmxError> {
        if kind != AttrType::Element {
            return parse_scalar(kind, value);
        }

        if !value.is_empty() {
            self.pending.push(ReferenceSlot {
                element: owner,
                attribute: name.to_string(),
                index,
                id: value.to_string(),
            });
        }

        Ok(Attribute::Element(None))
    }

    fn define_id(&mut self, id: &str, element: ElementId) {
        match self.ids.entry(id.to_string()) {
            Entry::Occupied(existing) => {
                tracing::warn!(id, first = %existing.get(), duplicate = %element, "element id defined twice, keeping first")
            }
            Entry::Vacant(slot) => {
                slot.insert(element);
            }
        }

        if let (Ok(guid), Some(element)) = (UUID::try_parse(id), self.elements.get_mut(element.0)) {
            element.set_guid(guid.to_bytes_le());
        }
    }

    fn resolve_references(&mut self) -> Result<(), DmxError> {
        let pending = std::mem::take(&mut self.pending);

        for slot in pending {
            let target = *self
                .ids
                .get(&slot.id)
                .ok_or_else(|| DmxError::UnknownElementReference(slot.id.clone()))?;

            let attribute = self
                .elements
                .get_mut(slot.element.0)
                .and_then(|element| element.get_attribute_mut(&slot.attribute));

            let attribute = match (attribute, slot.index) {
                (Some(attribute), None) => Some(attribute),
                (Some(Attribute::Array { items, .. }), Some(index)) => items.get_mut(index),
                _ => None,
            };

            if let Some(attribute) = attribute {
                *attribute = Attribute::Element(Some(target));
            }
        }

        Ok(())
    }
}

fn single_kind(type_name: &str) -> Result<AttrType, DmxError> {
    AttrType::from_keyvalues2_name(type_name)
        .filter(|kind| kind.is_single())
        .ok_or_else(|| DmxError::UnsupportedType(type_name.to_string()))
}

fn components<T: FromStr + Copy + Default, const N: usize>(value: &str) -> Option<[T; N]> {
    let mut parts = COMPONENT_SEPARATOR.split(value).filter(|part| !part.is_empty());
    let mut result = [T::default(); N];

    for component in &mut result {
        *component = parts.next()?.parse().ok()?;
    }

    parts.next().is_none().then_some(result)
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        return Some(true);
    }

    if value.eq_ignore_ascii_case("false") {
        return Some(false);
    }

    value.parse::<i64>().ok().map(|number| number != 0)
}

fn parse_scalar(kind: AttrType, value: &str) -> Result<Attribute, DmxError> {
    let invalid = || DmxError::InvalidValue {
        kind,
        value: value.to_string(),
    };
    let trimmed = value.trim();

    let attribute = match kind {
        AttrType::Int => Attribute::Int(trimmed.parse().map_err(|_| invalid())?),
        AttrType::Float => Attribute::Float(trimmed.parse().map_err(|_| invalid())?),
        AttrType::Bool => Attribute::Bool(parse_bool(trimmed).ok_or_else(invalid)?),
        AttrType::String => Attribute::String(value.to_string()),
        AttrType::Binary => Attribute::Binary(value.as_bytes().to_vec()),
        AttrType::Time => Attribute::Time(trimmed.parse().map_err(|_| invalid())?),
        AttrType::Color => {
            let [red, green, blue, alpha] = components(value).ok_or_else(invalid)?;
            Attribute::Color(Color { red, green, blue, alpha })
        }
        AttrType::Vector2 => {
            let [x, y] = components(value).ok_or_else(invalid)?;
            Attribute::Vector2(Vector2 { x, y })
        }
        AttrType::Vector3 => {
            let [x, y, z] = components(value).ok_or_else(invalid)?;
            Attribute::Vector3(Vector3 { x, y, z })
        }
        AttrType::Vector4 => {
            let [x, y, z, w] = components(value).ok_or_else(invalid)?;
            Attribute::Vector4(Vector4 { x, y, z, w })
        }
        AttrType::Angle => {
            let [pitch, yaw, roll] = components(value).ok_or_else(invalid)?;
            Attribute::Angle(Angle { pitch, yaw, roll })
        }
        AttrType::Quaternion => {
            let [x, y, z, w] = components(value).ok_or_else(invalid)?;
            Attribute::Quaternion(Quaternion { x, y, z, w })
        }
        AttrType::Matrix => {
            let values: [f32; 16] = components(value).ok_or_else(invalid)?;
            let mut entries = [[0.0; 4]; 4];
            for (row, chunk) in entries.iter_mut().zip(values.chunks_exact(4)) {
                row.copy_from_slice(chunk);
            }
            Attribute::Matrix(Matrix { entries })
        }
        AttrType::UInt64 => Attribute::UInt64(trimmed.parse().map_err(|_| invalid())?),
        AttrType::UInt8 => Attribute::UInt8(trimmed.parse().map_err(|_| invalid())?),
        _ => return Err(DmxError::UnsupportedType(kind.to_string())),
    };

    Ok(attribute)
}
