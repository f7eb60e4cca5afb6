//! SFS value encoder.

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{Error, Result, ResultExt};
use crate::types::{TypeTag, MAX_KEY_LENGTH};
use crate::value::{Object, Value};

const INITIAL_CAPACITY: usize = 256;

/// Writer encodes SFS values into a binary buffer.
///
/// Every value is written as a one-byte [`TypeTag`] followed by its
/// big-endian body.
pub struct Writer {
    buffer: Vec<u8>,
    sorted_keys: bool,
}

impl Writer {
    /// Creates a new writer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Creates a new writer with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            sorted_keys: false,
        }
    }

    /// Writes object entries in ascending key order instead of map order.
    pub fn with_sorted_keys(mut self, sorted: bool) -> Self {
        self.sorted_keys = sorted;
        self
    }

    /// Returns the current length of the buffer.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the encoded bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the writer and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Resets the writer for reuse.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Writes a type tag.
    pub fn write_tag(&mut self, tag: TypeTag) -> Result<()> {
        self.write_byte(tag as u8)
    }

    /// Writes a raw byte.
    pub fn write_byte(&mut self, value: u8) -> Result<()> {
        self.buffer.push(value);
        Ok(())
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    /// Writes a boolean as a single 0/1 byte.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_byte(u8::from(value))
    }

    /// Writes a big-endian u16.
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.buffer.write_u16::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a big-endian u32.
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.buffer.write_u32::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a big-endian i16.
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.buffer.write_i16::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a big-endian i32.
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.buffer.write_i32::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a big-endian i64.
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.buffer.write_i64::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a 32-bit float (IEEE 754, big-endian).
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.buffer.write_f32::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a 64-bit float (IEEE 754, big-endian).
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.buffer.write_f64::<BigEndian>(value)?;
        Ok(())
    }

    /// Writes a string with a 2-byte length prefix.
    pub fn write_utf_string(&mut self, value: &str) -> Result<()> {
        let len = checked_u16("string", value.len())?;
        self.write_u16(len)?;
        self.write_bytes(value.as_bytes())
    }

    /// Writes a string with a 4-byte length prefix.
    pub fn write_text(&mut self, value: &str) -> Result<()> {
        let len = checked_u32("text", value.len())?;
        self.write_u32(len)?;
        self.write_bytes(value.as_bytes())
    }

    /// Writes the element count for an array tag using the count width
    /// that tag carries on the wire.
    fn write_count(&mut self, tag: TypeTag, len: usize) -> Result<()> {
        match tag.count_width() {
            Some(4) => self.write_u32(checked_u32(tag.name(), len)?),
            _ => self.write_u16(checked_u16(tag.name(), len)?),
        }
    }

    /// Writes a tagged value, recursing through arrays and objects.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        let tag = value.tag();
        self.write_tag(tag)?;
        match value {
            Value::Null => Ok(()),
            Value::Bool(v) => self.write_bool(*v),
            Value::Byte(v) => self.write_byte(*v),
            Value::Short(v) => self.write_i16(*v),
            Value::Int(v) => self.write_i32(*v),
            Value::Long(v) => self.write_i64(*v),
            Value::Float(v) => self.write_f32(*v),
            Value::Double(v) => self.write_f64(*v),
            Value::Str(v) => self.write_utf_string(v),
            Value::Text(v) => self.write_text(v),
            Value::BoolArray(v) => {
                self.write_count(tag, v.len())?;
                v.iter().try_for_each(|b| self.write_bool(*b))
            }
            Value::ByteArray(v) => {
                self.write_count(tag, v.len())?;
                self.write_bytes(v)
            }
            Value::ShortArray(v) => {
                self.write_count(tag, v.len())?;
                v.iter().try_for_each(|x| self.write_i16(*x))
            }
            Value::IntArray(v) => {
                self.write_count(tag, v.len())?;
                v.iter().try_for_each(|x| self.write_i32(*x))
            }
            Value::LongArray(v) => {
                self.write_count(tag, v.len())?;
                v.iter().try_for_each(|x| self.write_i64(*x))
            }
            Value::FloatArray(v) => {
                self.write_count(tag, v.len())?;
                v.iter().try_for_each(|x| self.write_f32(*x))
            }
            Value::DoubleArray(v) => {
                self.write_count(tag, v.len())?;
                v.iter().try_for_each(|x| self.write_f64(*x))
            }
            Value::StrArray(v) => {
                self.write_count(tag, v.len())?;
                for (i, s) in v.iter().enumerate() {
                    self.write_utf_string(s).index(i)?;
                }
                Ok(())
            }
            Value::Array(v) => self.write_array_body(v),
            Value::Object(v) => self.write_object_body(v),
        }
    }

    /// Writes a generic array: tag, 2-byte count, then each element.
    pub fn write_array(&mut self, items: &[Value]) -> Result<()> {
        self.write_tag(TypeTag::SfsArray)?;
        self.write_array_body(items)
    }

    fn write_array_body(&mut self, items: &[Value]) -> Result<()> {
        self.write_count(TypeTag::SfsArray, items.len())?;
        for (i, item) in items.iter().enumerate() {
            self.write_value(item).index(i)?;
        }
        Ok(())
    }

    /// Writes an object: tag, 2-byte count, then key/value pairs.
    pub fn write_object(&mut self, obj: &Object) -> Result<()> {
        self.write_tag(TypeTag::SfsObject)?;
        self.write_object_body(obj)
    }

    fn write_object_body(&mut self, obj: &Object) -> Result<()> {
        self.write_count(TypeTag::SfsObject, obj.len())?;

        if self.sorted_keys {
            let mut entries: Vec<_> = obj.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (key, value) in entries {
                self.write_entry(key, value)?;
            }
        } else {
            for (key, value) in obj {
                self.write_entry(key, value)?;
            }
        }
        Ok(())
    }

    fn write_entry(&mut self, key: &str, value: &Value) -> Result<()> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(Error::InvalidKeyLength(key.len()));
        }
        self.write_u16(key.len() as u16)?;
        self.write_bytes(key.as_bytes())?;
        self.write_value(value).key(key)
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

fn checked_u16(what: &'static str, len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| Error::limit(what, len, u16::MAX as usize))
}

fn checked_u32(what: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::limit(what, len, u32::MAX as usize))
}
