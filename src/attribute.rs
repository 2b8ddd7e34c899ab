use std::fmt::{self, Display, Formatter};

use thiserror::Error as ThisError;

use crate::{AttrType, ElementId};

pub type Binary = Vec<u8>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.red, self.green, self.blue, self.alpha)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Display for Vector2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Display for Vector3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Display for Vector4 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.z, self.w)
    }
}

/// Euler angles in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Angle {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Display for Angle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.pitch, self.yaw, self.roll)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }
}

impl Display for Quaternion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.x, self.y, self.z, self.w)
    }
}

/// A 4x4 matrix stored row by row, in the order the file lists its components.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Matrix {
    pub entries: [[f32; 4]; 4],
}

impl Display for Matrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in self.entries.iter().flatten() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

impl From<Vector2> for mint::Vector2<f32> {
    fn from(value: Vector2) -> Self {
        mint::Vector2 { x: value.x, y: value.y }
    }
}

impl From<mint::Vector2<f32>> for Vector2 {
    fn from(value: mint::Vector2<f32>) -> Self {
        Self { x: value.x, y: value.y }
    }
}

impl From<Vector3> for mint::Vector3<f32> {
    fn from(value: Vector3) -> Self {
        mint::Vector3 {
            x: value.x,
            y: value.y,
            z: value.z,
        }
    }
}

impl From<mint::Vector3<f32>> for Vector3 {
    fn from(value: mint::Vector3<f32>) -> Self {
        Self {
            x: value.x,
            y: value.y,
            z: value.z,
        }
    }
}

impl From<Vector4> for mint::Vector4<f32> {
    fn from(value: Vector4) -> Self {
        mint::Vector4 {
            x: value.x,
            y: value.y,
            z: value.z,
            w: value.w,
        }
    }
}

impl From<mint::Vector4<f32>> for Vector4 {
    fn from(value: mint::Vector4<f32>) -> Self {
        Self {
            x: value.x,
            y: value.y,
            z: value.z,
            w: value.w,
        }
    }
}

impl From<Quaternion> for mint::Quaternion<f32> {
    fn from(value: Quaternion) -> Self {
        mint::Quaternion {
            v: mint::Vector3 {
                x: value.x,
                y: value.y,
                z: value.z,
            },
            s: value.w,
        }
    }
}

impl From<mint::Quaternion<f32>> for Quaternion {
    fn from(value: mint::Quaternion<f32>) -> Self {
        Self {
            x: value.v.x,
            y: value.v.y,
            z: value.v.z,
            w: value.s,
        }
    }
}

impl From<Matrix> for mint::RowMatrix4<f32> {
    fn from(value: Matrix) -> Self {
        mint::RowMatrix4 {
            x: mint::Vector4::from(value.entries[0]),
            y: mint::Vector4::from(value.entries[1]),
            z: mint::Vector4::from(value.entries[2]),
            w: mint::Vector4::from(value.entries[3]),
        }
    }
}

#[derive(Debug, ThisError)]
pub enum AttributeError {
    #[error("Attribute Is {found} Not {expected}")]
    WrongType { expected: AttrType, found: AttrType },
}

/// A single typed value owned by an element.
///
/// Element references are [ElementId] handles into the owning [FileData](crate::FileData), so an attribute
/// never keeps an element alive. Array kinds hold one attribute per entry, each carrying its own kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Attribute {
    #[default]
    None,
    Element(Option<ElementId>),
    Int(i32),
    Float(f32),
    Bool(bool),
    String(String),
    Binary(Binary),
    /// Seconds.
    Time(f32),
    Color(Color),
    Vector2(Vector2),
    Vector3(Vector3),
    Vector4(Vector4),
    Angle(Angle),
    Quaternion(Quaternion),
    Matrix(Matrix),
    UInt64(u64),
    UInt8(u8),
    Array { kind: AttrType, items: Vec<Attribute> },
}

macro_rules! declare_attribute {
    ($qualifier:ty, $attribute:ident) => {
        impl From<$qualifier> for Attribute {
            fn from(value: $qualifier) -> Self {
                Attribute::$attribute(value)
            }
        }

        impl<'a> TryFrom<&'a Attribute> for &'a $qualifier {
            type Error = AttributeError;

            fn try_from(value: &'a Attribute) -> Result<Self, Self::Error> {
                match value {
                    Attribute::$attribute(inner) => Ok(inner),
                    _ => Err(AttributeError::WrongType {
                        expected: AttrType::$attribute,
                        found: value.get_type(),
                    }),
                }
            }
        }
    };
}

declare_attribute!(i32, Int);
declare_attribute!(f32, Float);
declare_attribute!(bool, Bool);
declare_attribute!(String, String);
declare_attribute!(Binary, Binary);
declare_attribute!(Color, Color);
declare_attribute!(Vector2, Vector2);
declare_attribute!(Vector3, Vector3);
declare_attribute!(Vector4, Vector4);
declare_attribute!(Angle, Angle);
declare_attribute!(Quaternion, Quaternion);
declare_attribute!(Matrix, Matrix);
declare_attribute!(u64, UInt64);
declare_attribute!(u8, UInt8);

macro_rules! declare_accessor {
    ($accessor:ident, $attribute:ident, $qualifier:ty) => {
        pub fn $accessor(&self) -> Option<$qualifier> {
            match self {
                Attribute::$attribute(value) => Some(*value),
                _ => None,
            }
        }
    };
}

impl From<ElementId> for Attribute {
    fn from(value: ElementId) -> Self {
        Attribute::Element(Some(value))
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::String(value.to_string())
    }
}

impl Attribute {
    /// Creates an array attribute. Entries are not checked against `kind`.
    pub fn array(kind: AttrType, items: Vec<Attribute>) -> Self {
        Attribute::Array { kind, items }
    }

    pub fn get_type(&self) -> AttrType {
        match self {
            Attribute::None => AttrType::None,
            Attribute::Element(_) => AttrType::Element,
            Attribute::Int(_) => AttrType::Int,
            Attribute::Float(_) => AttrType::Float,
            Attribute::Bool(_) => AttrType::Bool,
            Attribute::String(_) => AttrType::String,
            Attribute::Binary(_) => AttrType::Binary,
            Attribute::Time(_) => AttrType::Time,
            Attribute::Color(_) => AttrType::Color,
            Attribute::Vector2(_) => AttrType::Vector2,
            Attribute::Vector3(_) => AttrType::Vector3,
            Attribute::Vector4(_) => AttrType::Vector4,
            Attribute::Angle(_) => AttrType::Angle,
            Attribute::Quaternion(_) => AttrType::Quaternion,
            Attribute::Matrix(_) => AttrType::Matrix,
            Attribute::UInt64(_) => AttrType::UInt64,
            Attribute::UInt8(_) => AttrType::UInt8,
            Attribute::Array { kind, .. } => *kind,
        }
    }

    /// Returns true if the attribute carries no payload, either as [Attribute::None] or as an empty element reference.
    pub fn is_empty(&self) -> bool {
        matches!(self, Attribute::None | Attribute::Element(None))
    }

    /// Returns the referenced element if this is an element attribute with a reference.
    pub fn as_element(&self) -> Option<ElementId> {
        match self {
            Attribute::Element(value) => *value,
            _ => None,
        }
    }

    declare_accessor!(as_int, Int, i32);
    declare_accessor!(as_float, Float, f32);
    declare_accessor!(as_bool, Bool, bool);
    declare_accessor!(as_time, Time, f32);
    declare_accessor!(as_color, Color, Color);
    declare_accessor!(as_vector2, Vector2, Vector2);
    declare_accessor!(as_vector3, Vector3, Vector3);
    declare_accessor!(as_vector4, Vector4, Vector4);
    declare_accessor!(as_angle, Angle, Angle);
    declare_accessor!(as_quaternion, Quaternion, Quaternion);
    declare_accessor!(as_matrix, Matrix, Matrix);
    declare_accessor!(as_uint64, UInt64, u64);
    declare_accessor!(as_uint8, UInt8, u8);

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Attribute::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Attribute::Binary(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the entries of any array attribute.
    pub fn as_array(&self) -> Option<&[Attribute]> {
        match self {
            Attribute::Array { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Returns the entries only if the attribute is an array of exactly `kind`.
    pub fn as_array_of(&self, kind: AttrType) -> Option<&[Attribute]> {
        match self {
            Attribute::Array { kind: array_kind, items } if *array_kind == kind => Some(items),
            _ => None,
        }
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        const ARRAY_PREVIEW_LIMIT: usize = 4;

        match self {
            Attribute::None => f.write_str("NoData"),
            Attribute::Element(Some(element)) => write!(f, "{element}"),
            Attribute::Element(None) => f.write_str("NULL"),
            Attribute::Int(value) => write!(f, "{value}"),
            Attribute::Float(value) => write!(f, "{value}"),
            Attribute::Bool(value) => write!(f, "{}", *value as u8),
            Attribute::String(value) => f.write_str(value),
            Attribute::Binary(value) => write!(f, "{} bytes", value.len()),
            Attribute::Time(value) => write!(f, "{value}"),
            Attribute::Color(value) => write!(f, "{value}"),
            Attribute::Vector2(value) => write!(f, "{value}"),
            Attribute::Vector3(value) => write!(f, "{value}"),
            Attribute::Vector4(value) => write!(f, "{value}"),
            Attribute::Angle(value) => write!(f, "{value}"),
            Attribute::Quaternion(value) => write!(f, "{value}"),
            Attribute::Matrix(value) => write!(f, "{value}"),
            Attribute::UInt64(value) => write!(f, "{value}"),
            Attribute::UInt8(value) => write!(f, "{value}"),
            Attribute::Array { items, .. } => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    if index == ARRAY_PREVIEW_LIMIT {
                        return f.write_str("...");
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}
