//! Dynamic value model.
//!
//! A [`Value`] tree is the interchange form between the binary codec and
//! the record mapper. Trees are built wholesale (by the decoder or by
//! [`marshal`](crate::marshal)) and consumed wholesale; nothing in the
//! crate mutates a tree after construction.

use std::collections::HashMap;

use crate::error::{Error, Result, ResultExt};
use crate::types::TypeTag;

/// Key/value container encoded as `SFS_OBJECT`. Key order is not
/// significant and is not preserved across a round trip.
pub type Object = HashMap<String, Value>;

/// Heterogeneous ordered sequence encoded as `SFS_ARRAY`.
pub type Array = Vec<Value>;

/// A dynamically typed SFS value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    /// String with a 2-byte length prefix.
    Str(String),
    /// String with a 4-byte length prefix.
    Text(String),
    BoolArray(Vec<bool>),
    ByteArray(Vec<u8>),
    ShortArray(Vec<i16>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
    FloatArray(Vec<f32>),
    DoubleArray(Vec<f64>),
    StrArray(Vec<String>),
    Array(Array),
    Object(Object),
}

impl Value {
    /// Returns the wire tag for this value.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Bool,
            Value::Byte(_) => TypeTag::Byte,
            Value::Short(_) => TypeTag::Short,
            Value::Int(_) => TypeTag::Int,
            Value::Long(_) => TypeTag::Long,
            Value::Float(_) => TypeTag::Float,
            Value::Double(_) => TypeTag::Double,
            Value::Str(_) => TypeTag::UtfString,
            Value::Text(_) => TypeTag::Text,
            Value::BoolArray(_) => TypeTag::BoolArray,
            Value::ByteArray(_) => TypeTag::ByteArray,
            Value::ShortArray(_) => TypeTag::ShortArray,
            Value::IntArray(_) => TypeTag::IntArray,
            Value::LongArray(_) => TypeTag::LongArray,
            Value::FloatArray(_) => TypeTag::FloatArray,
            Value::DoubleArray(_) => TypeTag::DoubleArray,
            Value::StrArray(_) => TypeTag::UtfStringArray,
            Value::Array(_) => TypeTag::SfsArray,
            Value::Object(_) => TypeTag::SfsObject,
        }
    }

    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the map of an `Object` value.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Returns the elements of a generic `Array` value.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns the string payload of a `Str` or `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a key when this value is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Builds an array value of the given array tag from scalar items.
    ///
    /// For a typed array tag every item must carry the matching scalar
    /// variant. `SfsArray` keeps the items as a generic array.
    pub fn typed_array(array_tag: TypeTag, items: Vec<Value>) -> Result<Value> {
        macro_rules! collect {
            ($variant:ident, $element:expr) => {{
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    match item {
                        Value::$variant(v) => out.push(v),
                        other => {
                            return Err(Error::mismatch($element.name(), other.tag())).index(i)
                        }
                    }
                }
                out
            }};
        }

        let value = match array_tag {
            TypeTag::BoolArray => Value::BoolArray(collect!(Bool, TypeTag::Bool)),
            TypeTag::ByteArray => Value::ByteArray(collect!(Byte, TypeTag::Byte)),
            TypeTag::ShortArray => Value::ShortArray(collect!(Short, TypeTag::Short)),
            TypeTag::IntArray => Value::IntArray(collect!(Int, TypeTag::Int)),
            TypeTag::LongArray => Value::LongArray(collect!(Long, TypeTag::Long)),
            TypeTag::FloatArray => Value::FloatArray(collect!(Float, TypeTag::Float)),
            TypeTag::DoubleArray => Value::DoubleArray(collect!(Double, TypeTag::Double)),
            TypeTag::UtfStringArray => Value::StrArray(collect!(Str, TypeTag::UtfString)),
            TypeTag::SfsArray => Value::Array(items),
            other => {
                return Err(Error::Shape(format!("{other} is not an array type")));
            }
        };
        Ok(value)
    }

    /// Splits any array value into per-element scalar values.
    pub fn elements(&self) -> Option<Vec<Value>> {
        let items = match self {
            Value::BoolArray(v) => v.iter().copied().map(Value::Bool).collect(),
            Value::ByteArray(v) => v.iter().copied().map(Value::Byte).collect(),
            Value::ShortArray(v) => v.iter().copied().map(Value::Short).collect(),
            Value::IntArray(v) => v.iter().copied().map(Value::Int).collect(),
            Value::LongArray(v) => v.iter().copied().map(Value::Long).collect(),
            Value::FloatArray(v) => v.iter().copied().map(Value::Float).collect(),
            Value::DoubleArray(v) => v.iter().copied().map(Value::Double).collect(),
            Value::StrArray(v) => v.iter().cloned().map(Value::Str).collect(),
            Value::Array(v) => v.clone(),
            _ => return None,
        };
        Some(items)
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    u8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => Str,
    Vec<bool> => BoolArray,
    Vec<u8> => ByteArray,
    Vec<i16> => ShortArray,
    Vec<i32> => IntArray,
    Vec<i64> => LongArray,
    Vec<f32> => FloatArray,
    Vec<f64> => DoubleArray,
    Vec<String> => StrArray,
    Array => Array,
    Object => Object,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Value::Object(iter.into_iter().collect())
    }
}
