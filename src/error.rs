use std::io::Error;

use thiserror::Error as ThisError;

use crate::AttrType;

/// Everything that can make a load fail. No partial graph is ever returned alongside one of these.
#[derive(Debug, ThisError)]
pub enum DmxError {
    #[error("IO Error: {0}")]
    Io(#[from] Error),
    #[error("DMX Header Not Found")]
    HeaderNotFound,
    #[error("Not A Valid DMX File: {0}")]
    InvalidFormat(String),
    #[error("Invalid DMX Header: {0:?}")]
    InvalidHeader(String),
    #[error("Unsupported Encoding Version: {0}")]
    UnsupportedVersion(i32),
    #[error("Index {index} Out Of Range For {table}")]
    IndexOutOfRange { table: &'static str, index: i64 },
    #[error("Unsupported Attribute Type: {0}")]
    UnsupportedType(String),
    #[error("Syntax Error On Line: {0}")]
    SyntaxError(usize),
    #[error("Element Id {0:?} Refers To Unknown Element")]
    UnknownElementReference(String),
    #[error("Object Of Type {0} Is Member Of Element Array")]
    MalformedElementArray(AttrType),
    #[error("Failed To Parse {kind} Value: {value:?}")]
    InvalidValue { kind: AttrType, value: String },
    #[error("Invalid Data Length: {0}")]
    InvalidLength(i32),
    #[error("Invalid KeyValues2 Structure: {0}")]
    InvalidStructure(String),
}
