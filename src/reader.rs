//! SFS value decoder.

use byteorder::{BigEndian, ByteOrder};

use crate::error::{Error, Result, ResultExt};
use crate::limits::Limits;
use crate::types::{TypeTag, MAX_KEY_LENGTH};
use crate::value::{Object, Value};

/// Reader decodes SFS values from a binary buffer.
///
/// Object entries and generic array elements must not decode to
/// `Null`; a null there is rejected with [`Error::NullValue`].
pub struct Reader<'a> {
    buffer: &'a [u8],
    pos: usize,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader from a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_limits(data, &Limits::default())
    }

    /// Creates a reader that enforces the given limits.
    pub fn with_limits(data: &'a [u8], limits: &Limits) -> Self {
        Self {
            buffer: data,
            pos: 0,
            max_depth: limits.max_depth,
        }
    }

    /// Returns the current position in the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes remaining.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.pos
    }

    /// Returns true if there is more data to read.
    pub fn has_more(&self) -> bool {
        self.pos < self.buffer.len()
    }

    /// Checks if there are enough bytes available.
    fn check_available(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(Error::truncated(needed, self.remaining()));
        }
        Ok(())
    }

    /// Reads a raw byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        self.check_available(1)?;
        let value = self.buffer[self.pos];
        self.pos += 1;
        Ok(value)
    }

    /// Reads raw bytes.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        self.check_available(length)?;
        let bytes = &self.buffer[self.pos..self.pos + length];
        self.pos += length;
        Ok(bytes)
    }

    /// Reads a boolean; any non-zero byte is true.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte()? != 0)
    }

    /// Reads a big-endian u16.
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(BigEndian::read_u16(self.read_bytes(2)?))
    }

    /// Reads a big-endian u32.
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(BigEndian::read_u32(self.read_bytes(4)?))
    }

    /// Reads a big-endian i16.
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(BigEndian::read_i16(self.read_bytes(2)?))
    }

    /// Reads a big-endian i32.
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(BigEndian::read_i32(self.read_bytes(4)?))
    }

    /// Reads a big-endian i64.
    pub fn read_i64(&mut self) -> Result<i64> {
        Ok(BigEndian::read_i64(self.read_bytes(8)?))
    }

    /// Reads a 32-bit float (IEEE 754, big-endian).
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(BigEndian::read_f32(self.read_bytes(4)?))
    }

    /// Reads a 64-bit float (IEEE 754, big-endian).
    pub fn read_f64(&mut self) -> Result<f64> {
        Ok(BigEndian::read_f64(self.read_bytes(8)?))
    }

    /// Reads a string with a 2-byte length prefix.
    pub fn read_utf_string(&mut self) -> Result<&'a str> {
        let length = self.read_u16()? as usize;
        self.read_str(length)
    }

    /// Reads a string with a 4-byte length prefix.
    pub fn read_text(&mut self) -> Result<&'a str> {
        let length = self.read_u32()? as usize;
        self.read_str(length)
    }

    fn read_str(&mut self, length: usize) -> Result<&'a str> {
        let bytes = self.read_bytes(length)?;
        std::str::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
    }

    /// Reads a type tag byte.
    pub fn read_tag(&mut self) -> Result<TypeTag> {
        let byte = self.read_byte()?;
        TypeTag::from_u8(byte).ok_or(Error::InvalidTypeTag(byte))
    }

    /// Reads an element count in the width the tag carries and checks
    /// that at least `element_size * count` bytes remain.
    fn read_count(&mut self, tag: TypeTag, element_size: usize) -> Result<usize> {
        let count = match tag.count_width() {
            Some(4) => self.read_u32()? as usize,
            _ => self.read_u16()? as usize,
        };
        self.check_available(count.saturating_mul(element_size))?;
        Ok(count)
    }

    /// Reads one tagged value.
    pub fn read_value(&mut self) -> Result<Value> {
        self.read_value_at(0)
    }

    fn read_value_at(&mut self, depth: usize) -> Result<Value> {
        let tag = self.read_tag()?;

        let value = match tag {
            TypeTag::Null => Value::Null,
            TypeTag::Bool => Value::Bool(self.read_bool()?),
            TypeTag::Byte => Value::Byte(self.read_byte()?),
            TypeTag::Short => Value::Short(self.read_i16()?),
            TypeTag::Int => Value::Int(self.read_i32()?),
            TypeTag::Long => Value::Long(self.read_i64()?),
            TypeTag::Float => Value::Float(self.read_f32()?),
            TypeTag::Double => Value::Double(self.read_f64()?),
            TypeTag::UtfString => Value::Str(self.read_utf_string()?.to_string()),
            TypeTag::Text => Value::Text(self.read_text()?.to_string()),
            TypeTag::BoolArray => {
                let count = self.read_count(tag, 1)?;
                let bytes = self.read_bytes(count)?;
                Value::BoolArray(bytes.iter().map(|b| *b != 0).collect())
            }
            TypeTag::ByteArray => {
                let count = self.read_count(tag, 1)?;
                Value::ByteArray(self.read_bytes(count)?.to_vec())
            }
            TypeTag::ShortArray => {
                let count = self.read_count(tag, 2)?;
                Value::ShortArray((0..count).map(|_| self.read_i16()).collect::<Result<_>>()?)
            }
            TypeTag::IntArray => {
                let count = self.read_count(tag, 4)?;
                Value::IntArray((0..count).map(|_| self.read_i32()).collect::<Result<_>>()?)
            }
            TypeTag::LongArray => {
                let count = self.read_count(tag, 8)?;
                Value::LongArray((0..count).map(|_| self.read_i64()).collect::<Result<_>>()?)
            }
            TypeTag::FloatArray => {
                let count = self.read_count(tag, 4)?;
                Value::FloatArray((0..count).map(|_| self.read_f32()).collect::<Result<_>>()?)
            }
            TypeTag::DoubleArray => {
                let count = self.read_count(tag, 8)?;
                Value::DoubleArray((0..count).map(|_| self.read_f64()).collect::<Result<_>>()?)
            }
            TypeTag::UtfStringArray => {
                // Every element carries at least its 2-byte length.
                let count = self.read_count(tag, 2)?;
                let mut items = Vec::with_capacity(count);
                for i in 0..count {
                    items.push(self.read_utf_string().index(i)?.to_string());
                }
                Value::StrArray(items)
            }
            TypeTag::SfsArray => {
                self.check_depth(depth)?;
                let count = self.read_count(tag, 1)?;
                let mut items = Vec::with_capacity(count);
                for i in 0..count {
                    items.push(self.read_element(depth).index(i)?);
                }
                Value::Array(items)
            }
            TypeTag::SfsObject => {
                self.check_depth(depth)?;
                Value::Object(self.read_object_body(depth)?)
            }
        };

        Ok(value)
    }

    fn read_object_body(&mut self, depth: usize) -> Result<Object> {
        // Smallest entry: 2-byte key length + 1-byte tag.
        let count = self.read_count(TypeTag::SfsObject, 3)?;
        let mut obj = Object::with_capacity(count);
        for _ in 0..count {
            let key_len = self.read_u16()? as usize;
            if key_len > MAX_KEY_LENGTH {
                return Err(Error::InvalidKeyLength(key_len));
            }
            let key = self.read_str(key_len)?;
            let value = self.read_element(depth).key(key)?;
            obj.insert(key.to_string(), value);
        }
        Ok(obj)
    }

    /// Reads a container element, rejecting null.
    fn read_element(&mut self, depth: usize) -> Result<Value> {
        match self.read_value_at(depth + 1)? {
            Value::Null => Err(Error::NullValue),
            value => Ok(value),
        }
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth >= self.max_depth {
            return Err(Error::limit("nesting depth", depth + 1, self.max_depth));
        }
        Ok(())
    }
}
