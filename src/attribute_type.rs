use std::fmt::{self, Display, Formatter};

/// The kind of value an [Attribute](crate::Attribute) holds.
///
/// Single kinds occupy one contiguous range and array kinds another, in the same relative order.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttrType {
    None = 0,
    Element,
    Int,
    Float,
    Bool,
    String,
    Binary,
    Time,
    ObjectId,
    Color,
    Vector2,
    Vector3,
    Vector4,
    Angle,
    Quaternion,
    Matrix,
    UInt64,
    UInt8,

    ElementArray,
    IntArray,
    FloatArray,
    BoolArray,
    StringArray,
    BinaryArray,
    TimeArray,
    ObjectIdArray,
    ColorArray,
    Vector2Array,
    Vector3Array,
    Vector4Array,
    AngleArray,
    QuaternionArray,
    MatrixArray,
    UInt64Array,
    UInt8Array,

    Invalid = u32::MAX,
}

impl AttrType {
    pub const SINGLE_FIRST: AttrType = AttrType::None;
    pub const SINGLE_LAST: AttrType = AttrType::UInt8;
    pub const ARRAY_FIRST: AttrType = AttrType::ElementArray;
    pub const ARRAY_LAST: AttrType = AttrType::UInt8Array;

    /// Every kind except [AttrType::Invalid], in declaration order.
    pub const ALL: [AttrType; 35] = [
        AttrType::None,
        AttrType::Element,
        AttrType::Int,
        AttrType::Float,
        AttrType::Bool,
        AttrType::String,
        AttrType::Binary,
        AttrType::Time,
        AttrType::ObjectId,
        AttrType::Color,
        AttrType::Vector2,
        AttrType::Vector3,
        AttrType::Vector4,
        AttrType::Angle,
        AttrType::Quaternion,
        AttrType::Matrix,
        AttrType::UInt64,
        AttrType::UInt8,
        AttrType::ElementArray,
        AttrType::IntArray,
        AttrType::FloatArray,
        AttrType::BoolArray,
        AttrType::StringArray,
        AttrType::BinaryArray,
        AttrType::TimeArray,
        AttrType::ObjectIdArray,
        AttrType::ColorArray,
        AttrType::Vector2Array,
        AttrType::Vector3Array,
        AttrType::Vector4Array,
        AttrType::AngleArray,
        AttrType::QuaternionArray,
        AttrType::MatrixArray,
        AttrType::UInt64Array,
        AttrType::UInt8Array,
    ];

    pub fn is_single(self) -> bool {
        self >= Self::SINGLE_FIRST && self <= Self::SINGLE_LAST
    }

    pub fn is_array(self) -> bool {
        self >= Self::ARRAY_FIRST && self <= Self::ARRAY_LAST
    }

    /// Returns the array counterpart of a single kind. Array kinds are returned unchanged and
    /// kinds without a counterpart map to [AttrType::None].
    pub fn to_array_kind(self) -> AttrType {
        match self {
            AttrType::Element => AttrType::ElementArray,
            AttrType::Int => AttrType::IntArray,
            AttrType::Float => AttrType::FloatArray,
            AttrType::Bool => AttrType::BoolArray,
            AttrType::String => AttrType::StringArray,
            AttrType::Binary => AttrType::BinaryArray,
            AttrType::Time => AttrType::TimeArray,
            AttrType::ObjectId => AttrType::ObjectIdArray,
            AttrType::Color => AttrType::ColorArray,
            AttrType::Vector2 => AttrType::Vector2Array,
            AttrType::Vector3 => AttrType::Vector3Array,
            AttrType::Vector4 => AttrType::Vector4Array,
            AttrType::Angle => AttrType::AngleArray,
            AttrType::Quaternion => AttrType::QuaternionArray,
            AttrType::Matrix => AttrType::MatrixArray,
            AttrType::UInt64 => AttrType::UInt64Array,
            AttrType::UInt8 => AttrType::UInt8Array,
            kind if kind.is_array() => kind,
            _ => AttrType::None,
        }
    }

    /// Returns the single counterpart of an array kind. Single kinds are returned unchanged.
    pub fn to_single_kind(self) -> AttrType {
        match self {
            AttrType::ElementArray => AttrType::Element,
            AttrType::IntArray => AttrType::Int,
            AttrType::FloatArray => AttrType::Float,
            AttrType::BoolArray => AttrType::Bool,
            AttrType::StringArray => AttrType::String,
            AttrType::BinaryArray => AttrType::Binary,
            AttrType::TimeArray => AttrType::Time,
            AttrType::ObjectIdArray => AttrType::ObjectId,
            AttrType::ColorArray => AttrType::Color,
            AttrType::Vector2Array => AttrType::Vector2,
            AttrType::Vector3Array => AttrType::Vector3,
            AttrType::Vector4Array => AttrType::Vector4,
            AttrType::AngleArray => AttrType::Angle,
            AttrType::QuaternionArray => AttrType::Quaternion,
            AttrType::MatrixArray => AttrType::Matrix,
            AttrType::UInt64Array => AttrType::UInt64,
            AttrType::UInt8Array => AttrType::UInt8,
            kind if kind.is_single() => kind,
            _ => AttrType::None,
        }
    }

    pub fn type_name(self) -> &'static str {
        match self {
            AttrType::None => "None",
            AttrType::Element => "Element",
            AttrType::Int => "Int",
            AttrType::Float => "Float",
            AttrType::Bool => "Bool",
            AttrType::String => "String",
            AttrType::Binary => "Binary",
            AttrType::Time => "Time",
            AttrType::ObjectId => "ObjectId",
            AttrType::Color => "Color",
            AttrType::Vector2 => "Vector2",
            AttrType::Vector3 => "Vector3",
            AttrType::Vector4 => "Vector4",
            AttrType::Angle => "Angle",
            AttrType::Quaternion => "Quaternion",
            AttrType::Matrix => "Matrix",
            AttrType::UInt64 => "UInt64",
            AttrType::UInt8 => "UInt8",
            AttrType::ElementArray => "ElementArray",
            AttrType::IntArray => "IntArray",
            AttrType::FloatArray => "FloatArray",
            AttrType::BoolArray => "BoolArray",
            AttrType::StringArray => "StringArray",
            AttrType::BinaryArray => "BinaryArray",
            AttrType::TimeArray => "TimeArray",
            AttrType::ObjectIdArray => "ObjectIdArray",
            AttrType::ColorArray => "ColorArray",
            AttrType::Vector2Array => "Vector2Array",
            AttrType::Vector3Array => "Vector3Array",
            AttrType::Vector4Array => "Vector4Array",
            AttrType::AngleArray => "AngleArray",
            AttrType::QuaternionArray => "QuaternionArray",
            AttrType::MatrixArray => "MatrixArray",
            AttrType::UInt64Array => "UInt64Array",
            AttrType::UInt8Array => "UInt8Array",
            AttrType::Invalid => "Invalid",
        }
    }

    /// The type name KeyValues2 files use for this kind, if it has one.
    pub fn keyvalues2_name(self) -> Option<&'static str> {
        let name = match self {
            AttrType::Element => "element",
            AttrType::Int => "int",
            AttrType::Float => "float",
            AttrType::Bool => "bool",
            AttrType::String => "string",
            AttrType::Binary => "binary",
            AttrType::Time => "time",
            AttrType::ObjectId => "elementid",
            AttrType::Color => "color",
            AttrType::Vector2 => "vector2",
            AttrType::Vector3 => "vector3",
            AttrType::Vector4 => "vector4",
            AttrType::Angle => "qangle",
            AttrType::Quaternion => "quaternion",
            AttrType::Matrix => "matrix",
            AttrType::UInt64 => "uint64",
            AttrType::UInt8 => "uint8",
            AttrType::ElementArray => "element_array",
            AttrType::IntArray => "int_array",
            AttrType::FloatArray => "float_array",
            AttrType::BoolArray => "bool_array",
            AttrType::StringArray => "string_array",
            AttrType::BinaryArray => "binary_array",
            AttrType::TimeArray => "time_array",
            AttrType::ObjectIdArray => "elementid_array",
            AttrType::ColorArray => "color_array",
            AttrType::Vector2Array => "vector2_array",
            AttrType::Vector3Array => "vector3_array",
            AttrType::Vector4Array => "vector4_array",
            AttrType::AngleArray => "qangle_array",
            AttrType::QuaternionArray => "quaternion_array",
            AttrType::MatrixArray => "matrix_array",
            AttrType::UInt64Array => "uint64_array",
            AttrType::UInt8Array => "uint8_array",
            AttrType::None | AttrType::Invalid => return None,
        };
        Some(name)
    }

    pub fn from_keyvalues2_name(name: &str) -> Option<AttrType> {
        Self::ALL.into_iter().find(|kind| kind.keyvalues2_name() == Some(name))
    }
}

impl Display for AttrType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
