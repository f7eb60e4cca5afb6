//! Conversions between native Rust types and [`Value`].
//!
//! [`ToSfs`] and [`FromSfs`] are implemented for the scalar types,
//! `String`, `Vec<T>`, string-keyed maps, `Option<T>`, `Box<T>` and
//! [`Value`] itself. Records get both through the
//! [`record!`](crate::record) macro.
//!
//! Integer rules: unsigned types share the tag of the signed type with
//! the same width. Between equal widths the bits are reinterpreted;
//! between different widths the value must fit or the conversion fails
//! with [`Error::Overflow`]. `isize` and `usize` are treated as 64-bit.
//! Integers and floats never convert into each other.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result, ResultExt};
use crate::mapper::{marshal, unmarshal};
use crate::schema::Record;
use crate::types::TypeTag;
use crate::value::{Object, Value};

/// Converts a native value into a wire value.
pub trait ToSfs {
    /// Converts using the declared wire type, or the natural one when
    /// `declared` is `None`.
    ///
    /// `Ok(None)` means there is nothing to encode: the key is omitted
    /// from the enclosing object.
    fn to_sfs(&self, declared: Option<TypeTag>) -> Result<Option<Value>>;

    /// Returns true for the type's zero value.
    fn is_zero(&self) -> bool;

    /// Scalar tag used for sequences of this type. `None` makes a
    /// sequence encode as a generic `SFS_ARRAY`.
    fn element_tag() -> Option<TypeTag>
    where
        Self: Sized,
    {
        None
    }

    /// Returns true when an empty sequence of this type is omitted
    /// rather than encoded as an empty array.
    fn empty_is_absent() -> bool
    where
        Self: Sized,
    {
        true
    }

    #[doc(hidden)]
    fn byte_slice(_items: &[Self]) -> Option<&[u8]>
    where
        Self: Sized,
    {
        None
    }
}

/// Builds a native value from a wire value.
pub trait FromSfs: Sized + Default {
    /// Converts `value`, which must match `declared` when one is given.
    fn from_sfs(value: &Value, declared: Option<TypeTag>) -> Result<Self>;

    #[doc(hidden)]
    fn from_byte_array(_bytes: &[u8]) -> Option<Vec<Self>> {
        None
    }
}

/// Decodes a value, mapping `Null` to the zero value.
fn decode_or_default<T: FromSfs>(value: &Value, declared: Option<TypeTag>) -> Result<T> {
    if value.is_null() {
        Ok(T::default())
    } else {
        T::from_sfs(value, declared)
    }
}

fn check_declared(value: &Value, declared: Option<TypeTag>) -> Result<()> {
    match declared {
        Some(tag) if tag != value.tag() => Err(Error::mismatch(tag.name(), value.tag())),
        _ => Ok(()),
    }
}

fn unsupported(source: &str, tag: TypeTag) -> Error {
    Error::UnsupportedType(format!("{source} cannot be encoded as {tag}"))
}

// ============================================================================
// Integers
// ============================================================================

fn int_to_value(x: i128, width: u32, tag: TypeTag, source: &str) -> Result<Value> {
    macro_rules! narrow {
        ($t:ty, $w:literal) => {
            if width == $w {
                x as $t
            } else {
                <$t>::try_from(x).map_err(|_| Error::overflow(x, tag.name()))?
            }
        };
    }

    let value = match tag {
        TypeTag::Byte => Value::Byte(narrow!(u8, 8)),
        TypeTag::Short => Value::Short(narrow!(i16, 16)),
        TypeTag::Int => Value::Int(narrow!(i32, 32)),
        TypeTag::Long => Value::Long(narrow!(i64, 64)),
        other => return Err(unsupported(source, other)),
    };
    Ok(value)
}

/// Returns the wire width in bits and the value of an integer variant.
fn int_of(value: &Value) -> Option<(u32, i128)> {
    match *value {
        Value::Byte(v) => Some((8, v.into())),
        Value::Short(v) => Some((16, v.into())),
        Value::Int(v) => Some((32, v.into())),
        Value::Long(v) => Some((64, v.into())),
        _ => None,
    }
}

macro_rules! int_to_sfs {
    ($ty:ty, $width:literal, $tag:ident) => {
        fn to_sfs(&self, declared: Option<TypeTag>) -> Result<Option<Value>> {
            let tag = declared.unwrap_or(TypeTag::$tag);
            int_to_value(*self as i128, $width, tag, stringify!($ty)).map(Some)
        }

        fn is_zero(&self) -> bool {
            *self == 0
        }

        fn element_tag() -> Option<TypeTag> {
            Some(TypeTag::$tag)
        }
    };
}

macro_rules! int_from_sfs {
    ($ty:ty, $width:literal) => {
        fn from_sfs(value: &Value, declared: Option<TypeTag>) -> Result<Self> {
            check_declared(value, declared)?;
            let (width, x) =
                int_of(value).ok_or_else(|| Error::mismatch(stringify!($ty), value.tag()))?;
            if width == $width {
                Ok(x as $ty)
            } else {
                <$ty>::try_from(x).map_err(|_| Error::overflow(x, stringify!($ty)))
            }
        }
    };
}

macro_rules! impl_int {
    ($($ty:ty => $width:literal, $tag:ident;)*) => {
        $(
            impl ToSfs for $ty {
                int_to_sfs!($ty, $width, $tag);
            }

            impl FromSfs for $ty {
                int_from_sfs!($ty, $width);
            }
        )*
    };
}

impl_int! {
    i8 => 8, Byte;
    i16 => 16, Short;
    u16 => 16, Short;
    i32 => 32, Int;
    u32 => 32, Int;
    i64 => 64, Long;
    u64 => 64, Long;
    isize => 64, Long;
    usize => 64, Long;
}

// u8 copies byte sequences directly.
impl ToSfs for u8 {
    int_to_sfs!(u8, 8, Byte);

    fn byte_slice(items: &[Self]) -> Option<&[u8]> {
        Some(items)
    }
}

impl FromSfs for u8 {
    int_from_sfs!(u8, 8);

    fn from_byte_array(bytes: &[u8]) -> Option<Vec<Self>> {
        Some(bytes.to_vec())
    }
}

// ============================================================================
// Floats, bool, strings
// ============================================================================

fn narrow_double(x: f64, target: &'static str) -> Result<f32> {
    if x.is_finite() && x.abs() > f64::from(f32::MAX) {
        Err(Error::overflow(x, target))
    } else {
        Ok(x as f32)
    }
}

impl ToSfs for f32 {
    fn to_sfs(&self, declared: Option<TypeTag>) -> Result<Option<Value>> {
        match declared.unwrap_or(TypeTag::Float) {
            TypeTag::Float => Ok(Some(Value::Float(*self))),
            TypeTag::Double => Ok(Some(Value::Double(f64::from(*self)))),
            other => Err(unsupported("f32", other)),
        }
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn element_tag() -> Option<TypeTag> {
        Some(TypeTag::Float)
    }
}

impl FromSfs for f32 {
    fn from_sfs(value: &Value, declared: Option<TypeTag>) -> Result<Self> {
        check_declared(value, declared)?;
        match *value {
            Value::Float(v) => Ok(v),
            Value::Double(v) => narrow_double(v, "f32"),
            ref other => Err(Error::mismatch("f32", other.tag())),
        }
    }
}

impl ToSfs for f64 {
    fn to_sfs(&self, declared: Option<TypeTag>) -> Result<Option<Value>> {
        match declared.unwrap_or(TypeTag::Double) {
            TypeTag::Double => Ok(Some(Value::Double(*self))),
            TypeTag::Float => narrow_double(*self, "FLOAT").map(|v| Some(Value::Float(v))),
            other => Err(unsupported("f64", other)),
        }
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn element_tag() -> Option<TypeTag> {
        Some(TypeTag::Double)
    }
}

impl FromSfs for f64 {
    fn from_sfs(value: &Value, declared: Option<TypeTag>) -> Result<Self> {
        check_declared(value, declared)?;
        match *value {
            Value::Double(v) => Ok(v),
            Value::Float(v) => Ok(f64::from(v)),
            ref other => Err(Error::mismatch("f64", other.tag())),
        }
    }
}

impl ToSfs for bool {
    fn to_sfs(&self, declared: Option<TypeTag>) -> Result<Option<Value>> {
        match declared.unwrap_or(TypeTag::Bool) {
            TypeTag::Bool => Ok(Some(Value::Bool(*self))),
            other => Err(unsupported("bool", other)),
        }
    }

    fn is_zero(&self) -> bool {
        !*self
    }

    fn element_tag() -> Option<TypeTag> {
        Some(TypeTag::Bool)
    }
}

impl FromSfs for bool {
    fn from_sfs(value: &Value, declared: Option<TypeTag>) -> Result<Self> {
        check_declared(value, declared)?;
        match *value {
            Value::Bool(v) => Ok(v),
            ref other => Err(Error::mismatch("bool", other.tag())),
        }
    }
}

impl ToSfs for String {
    fn to_sfs(&self, declared: Option<TypeTag>) -> Result<Option<Value>> {
        match declared.unwrap_or(TypeTag::UtfString) {
            TypeTag::UtfString => Ok(Some(Value::Str(self.clone()))),
            TypeTag::Text => Ok(Some(Value::Text(self.clone()))),
            other => Err(unsupported("String", other)),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn element_tag() -> Option<TypeTag> {
        Some(TypeTag::UtfString)
    }
}

impl FromSfs for String {
    fn from_sfs(value: &Value, declared: Option<TypeTag>) -> Result<Self> {
        check_declared(value, declared)?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::mismatch("String", value.tag()))
    }
}

// ============================================================================
// Wrappers
// ============================================================================

impl<T: ToSfs> ToSfs for Option<T> {
    fn to_sfs(&self, declared: Option<TypeTag>) -> Result<Option<Value>> {
        match self {
            Some(v) => v.to_sfs(declared),
            None => Ok(Some(Value::Null)),
        }
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

impl<T: FromSfs> FromSfs for Option<T> {
    fn from_sfs(value: &Value, declared: Option<TypeTag>) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_sfs(value, declared).map(Some)
        }
    }
}

impl<T: ToSfs> ToSfs for Box<T> {
    fn to_sfs(&self, declared: Option<TypeTag>) -> Result<Option<Value>> {
        (**self).to_sfs(declared)
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn element_tag() -> Option<TypeTag> {
        T::element_tag()
    }

    fn empty_is_absent() -> bool {
        T::empty_is_absent()
    }
}

impl<T: FromSfs> FromSfs for Box<T> {
    fn from_sfs(value: &Value, declared: Option<TypeTag>) -> Result<Self> {
        T::from_sfs(value, declared).map(Box::new)
    }
}

/// A `Value` field holds any wire value unchanged.
impl ToSfs for Value {
    fn to_sfs(&self, declared: Option<TypeTag>) -> Result<Option<Value>> {
        check_declared(self, declared)?;
        Ok(Some(self.clone()))
    }

    fn is_zero(&self) -> bool {
        self.is_null()
    }

    fn empty_is_absent() -> bool {
        false
    }
}

impl FromSfs for Value {
    fn from_sfs(value: &Value, declared: Option<TypeTag>) -> Result<Self> {
        check_declared(value, declared)?;
        Ok(value.clone())
    }
}

// ============================================================================
// Sequences
// ============================================================================

impl<T: ToSfs> ToSfs for Vec<T> {
    fn to_sfs(&self, declared: Option<TypeTag>) -> Result<Option<Value>> {
        if self.is_empty() && T::empty_is_absent() {
            return Ok(None);
        }

        let array_tag = match declared {
            Some(tag) if tag.is_array() => tag,
            Some(tag) => {
                return Err(Error::Shape(format!("a sequence cannot be encoded as {tag}")))
            }
            None => T::element_tag()
                .and_then(TypeTag::array_tag)
                .unwrap_or(TypeTag::SfsArray),
        };

        if array_tag == TypeTag::ByteArray {
            if let Some(bytes) = T::byte_slice(self) {
                return Ok(Some(Value::ByteArray(bytes.to_vec())));
            }
        }

        let element = array_tag.element_tag();
        let items = self
            .iter()
            .enumerate()
            .map(|(i, item)| Ok(item.to_sfs(element).index(i)?.unwrap_or(Value::Null)))
            .collect::<Result<Vec<_>>>()?;
        Value::typed_array(array_tag, items).map(Some)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: FromSfs + ToSfs> FromSfs for Vec<T> {
    fn from_sfs(value: &Value, declared: Option<TypeTag>) -> Result<Self> {
        if let Some(tag) = declared {
            if !tag.is_array() {
                return Err(Error::Shape(format!("a sequence cannot be decoded from {tag}")));
            }
            check_declared(value, declared)?;
        }

        if let Value::ByteArray(bytes) = value {
            if let Some(items) = T::from_byte_array(bytes) {
                return Ok(items);
            }
        }

        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| decode_or_default(item, None).index(i))
                .collect(),
            typed if typed.tag().is_typed_array() => {
                if declared.is_none() && T::element_tag() != typed.tag().element_tag() {
                    return Err(Error::mismatch(
                        format!("sequence of {}", type_name::<T>()),
                        typed.tag(),
                    ));
                }
                typed
                    .elements()
                    .unwrap_or_default()
                    .iter()
                    .enumerate()
                    .map(|(i, item)| T::from_sfs(item, None).index(i))
                    .collect()
            }
            other => Err(Error::mismatch("array", other.tag())),
        }
    }
}

// ============================================================================
// Objects
// ============================================================================

fn check_object_type(declared: Option<TypeTag>) -> Result<()> {
    match declared {
        None | Some(TypeTag::SfsObject) => Ok(()),
        Some(other) => Err(Error::Shape(format!("an object cannot be converted to {other}"))),
    }
}

fn object_of(value: &Value, declared: Option<TypeTag>) -> Result<&Object> {
    check_object_type(declared)?;
    value
        .as_object()
        .ok_or_else(|| Error::mismatch(TypeTag::SfsObject.name(), value.tag()))
}

fn map_to_sfs<'a, T, I>(entries: I, declared: Option<TypeTag>) -> Result<Option<Value>>
where
    T: ToSfs + 'a,
    I: Iterator<Item = (&'a String, &'a T)>,
{
    check_object_type(declared)?;
    let mut object = Object::new();
    for (key, value) in entries {
        let value = value.to_sfs(None).key(key)?.unwrap_or(Value::Null);
        object.insert(key.clone(), value);
    }
    Ok(Some(Value::Object(object)))
}

macro_rules! impl_map {
    ($($map:ident),*) => {
        $(
            impl<T: ToSfs> ToSfs for $map<String, T> {
                fn to_sfs(&self, declared: Option<TypeTag>) -> Result<Option<Value>> {
                    map_to_sfs(self.iter(), declared)
                }

                fn is_zero(&self) -> bool {
                    self.is_empty()
                }
            }

            impl<T: FromSfs> FromSfs for $map<String, T> {
                fn from_sfs(value: &Value, declared: Option<TypeTag>) -> Result<Self> {
                    object_of(value, declared)?
                        .iter()
                        .map(|(key, item)| Ok((key.clone(), decode_or_default(item, None).key(key)?)))
                        .collect()
                }
            }
        )*
    };
}

impl_map!(HashMap, BTreeMap);

#[doc(hidden)]
pub fn record_to_sfs<R: Record>(record: &R, declared: Option<TypeTag>) -> Result<Option<Value>> {
    check_object_type(declared)?;
    marshal(record).map(|object| Some(Value::Object(object)))
}

#[doc(hidden)]
pub fn record_is_zero<R: Record>(record: &R) -> bool {
    R::FIELDS.iter().all(|field| (field.get)(record).is_zero())
}

#[doc(hidden)]
pub fn record_from_sfs<R: Record>(value: &Value, declared: Option<TypeTag>) -> Result<R> {
    let object = object_of(value, declared)?;
    let mut record = R::default();
    unmarshal(object, &mut record)?;
    Ok(record)
}
