//! Wire format types and utilities.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Flag bit set in the frame header when the payload is zlib-compressed.
pub const COMPRESSED_FLAG: u8 = 0x20;

/// Flag bit set in the frame header when the length field is 4 bytes wide.
pub const LARGE_LENGTH_FLAG: u8 = 0x08;

/// Largest payload length that fits the short (2-byte) length field.
pub const MAX_SHORT_LENGTH: usize = u16::MAX as usize;

/// Longest object key accepted on either side of the codec.
pub const MAX_KEY_LENGTH: usize = 255;

/// Type tags used in the SFS encoding format.
///
/// The numeric values are part of the wire contract. Tag 19 is
/// reserved and never produced or accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    Null = 0,
    Bool = 1,
    Byte = 2,
    Short = 3,
    Int = 4,
    Long = 5,
    Float = 6,
    Double = 7,
    UtfString = 8,
    BoolArray = 9,
    ByteArray = 10,
    ShortArray = 11,
    IntArray = 12,
    LongArray = 13,
    FloatArray = 14,
    DoubleArray = 15,
    UtfStringArray = 16,
    SfsArray = 17,
    SfsObject = 18,
    // 19 is reserved
    /// Long string with a 4-byte length prefix.
    Text = 20,
}

impl TypeTag {
    /// Converts a u8 to a TypeTag.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TypeTag::Null),
            1 => Some(TypeTag::Bool),
            2 => Some(TypeTag::Byte),
            3 => Some(TypeTag::Short),
            4 => Some(TypeTag::Int),
            5 => Some(TypeTag::Long),
            6 => Some(TypeTag::Float),
            7 => Some(TypeTag::Double),
            8 => Some(TypeTag::UtfString),
            9 => Some(TypeTag::BoolArray),
            10 => Some(TypeTag::ByteArray),
            11 => Some(TypeTag::ShortArray),
            12 => Some(TypeTag::IntArray),
            13 => Some(TypeTag::LongArray),
            14 => Some(TypeTag::FloatArray),
            15 => Some(TypeTag::DoubleArray),
            16 => Some(TypeTag::UtfStringArray),
            17 => Some(TypeTag::SfsArray),
            18 => Some(TypeTag::SfsObject),
            20 => Some(TypeTag::Text),
            _ => None,
        }
    }

    /// Returns the canonical upper-case name used in field tags.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Null => "NULL",
            TypeTag::Bool => "BOOL",
            TypeTag::Byte => "BYTE",
            TypeTag::Short => "SHORT",
            TypeTag::Int => "INT",
            TypeTag::Long => "LONG",
            TypeTag::Float => "FLOAT",
            TypeTag::Double => "DOUBLE",
            TypeTag::UtfString => "UTF_STRING",
            TypeTag::BoolArray => "BOOL_ARRAY",
            TypeTag::ByteArray => "BYTE_ARRAY",
            TypeTag::ShortArray => "SHORT_ARRAY",
            TypeTag::IntArray => "INT_ARRAY",
            TypeTag::LongArray => "LONG_ARRAY",
            TypeTag::FloatArray => "FLOAT_ARRAY",
            TypeTag::DoubleArray => "DOUBLE_ARRAY",
            TypeTag::UtfStringArray => "UTF_STRING_ARRAY",
            TypeTag::SfsArray => "SFS_ARRAY",
            TypeTag::SfsObject => "SFS_OBJECT",
            TypeTag::Text => "TEXT",
        }
    }

    /// Returns true for the eight homogeneous array tags.
    pub fn is_typed_array(self) -> bool {
        (TypeTag::BoolArray as u8..=TypeTag::UtfStringArray as u8).contains(&(self as u8))
    }

    /// Returns true for any array tag, typed or generic.
    pub fn is_array(self) -> bool {
        self.is_typed_array() || self == TypeTag::SfsArray
    }

    /// Maps a typed array tag to the tag of its elements.
    pub fn element_tag(self) -> Option<TypeTag> {
        match self {
            TypeTag::BoolArray => Some(TypeTag::Bool),
            TypeTag::ByteArray => Some(TypeTag::Byte),
            TypeTag::ShortArray => Some(TypeTag::Short),
            TypeTag::IntArray => Some(TypeTag::Int),
            TypeTag::LongArray => Some(TypeTag::Long),
            TypeTag::FloatArray => Some(TypeTag::Float),
            TypeTag::DoubleArray => Some(TypeTag::Double),
            TypeTag::UtfStringArray => Some(TypeTag::UtfString),
            _ => None,
        }
    }

    /// Maps a scalar tag to the typed array tag holding it.
    pub fn array_tag(self) -> Option<TypeTag> {
        match self {
            TypeTag::Bool => Some(TypeTag::BoolArray),
            TypeTag::Byte => Some(TypeTag::ByteArray),
            TypeTag::Short => Some(TypeTag::ShortArray),
            TypeTag::Int => Some(TypeTag::IntArray),
            TypeTag::Long => Some(TypeTag::LongArray),
            TypeTag::Float => Some(TypeTag::FloatArray),
            TypeTag::Double => Some(TypeTag::DoubleArray),
            TypeTag::UtfString => Some(TypeTag::UtfStringArray),
            _ => None,
        }
    }

    /// Width in bytes of the element count that precedes a typed or
    /// generic array body.
    ///
    /// Bool and byte arrays carry a 4-byte count; every other array
    /// kind carries a 2-byte count. Encoder and decoder share this table.
    pub fn count_width(self) -> Option<usize> {
        match self {
            TypeTag::BoolArray | TypeTag::ByteArray => Some(4),
            TypeTag::ShortArray
            | TypeTag::IntArray
            | TypeTag::LongArray
            | TypeTag::FloatArray
            | TypeTag::DoubleArray
            | TypeTag::UtfStringArray
            | TypeTag::SfsArray
            | TypeTag::SfsObject => Some(2),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = Error;

    /// Parses a tag name case-insensitively, e.g. `"int"` or `"UTF_STRING"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s.to_ascii_uppercase().as_str() {
            "NULL" => TypeTag::Null,
            "BOOL" => TypeTag::Bool,
            "BYTE" => TypeTag::Byte,
            "SHORT" => TypeTag::Short,
            "INT" => TypeTag::Int,
            "LONG" => TypeTag::Long,
            "FLOAT" => TypeTag::Float,
            "DOUBLE" => TypeTag::Double,
            "UTF_STRING" => TypeTag::UtfString,
            "BOOL_ARRAY" => TypeTag::BoolArray,
            "BYTE_ARRAY" => TypeTag::ByteArray,
            "SHORT_ARRAY" => TypeTag::ShortArray,
            "INT_ARRAY" => TypeTag::IntArray,
            "LONG_ARRAY" => TypeTag::LongArray,
            "FLOAT_ARRAY" => TypeTag::FloatArray,
            "DOUBLE_ARRAY" => TypeTag::DoubleArray,
            "UTF_STRING_ARRAY" => TypeTag::UtfStringArray,
            "SFS_ARRAY" => TypeTag::SfsArray,
            "SFS_OBJECT" => TypeTag::SfsObject,
            "TEXT" => TypeTag::Text,
            _ => return Err(Error::UnknownDataType(s.to_string())),
        };
        Ok(tag)
    }
}
