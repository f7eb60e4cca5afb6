//! Streaming support for back-to-back frames.
//!
//! This module provides streaming readers and writers that work with
//! any type implementing std::io::Read or std::io::Write traits. Each
//! frame is self-delimiting: uncompressed payloads by their declared
//! length, compressed payloads by the end of the zlib stream.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use sfs::stream::{StreamReader, StreamWriter};
//! use sfs::{Object, Result, Value};
//!
//! fn main() -> Result<()> {
//!     let mut buffer = Vec::new();
//!
//!     {
//!         let mut stream = StreamWriter::new(&mut buffer);
//!
//!         let mut login = Object::new();
//!         login.insert("c".into(), Value::Short(1));
//!         stream.write_frame(&login, false)?;
//!
//!         let mut chat = Object::new();
//!         chat.insert("m".into(), Value::from("hello"));
//!         stream.write_frame(&chat, true)?;
//!
//!         stream.flush()?;
//!     }
//!
//!     let mut stream = StreamReader::new(Cursor::new(&buffer));
//!     let login = stream.read_frame()?;
//!     assert_eq!(login["c"], Value::Short(1));
//!     let chat = stream.read_frame()?;
//!     assert_eq!(chat["m"].as_str(), Some("hello"));
//!     assert!(stream.try_read_frame()?.is_none());
//!
//!     Ok(())
//! }
//! ```

use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use byteorder::{BigEndian, ReadBytesExt};
use tracing::debug;

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::mapper::{marshal, unmarshal};
use crate::packer::{check_frame_size, inflate, FrameHeader, Packer};
use crate::reader::Reader;
use crate::schema::Record;
use crate::value::{Object, Value};

/// Default buffer capacity for stream readers/writers.
const DEFAULT_BUFFER_CAPACITY: usize = 8192;

/// StreamWriter writes frames to a byte stream.
pub struct StreamWriter<W: Write> {
    inner: BufWriter<W>,
    packer: Packer,
}

impl<W: Write> StreamWriter<W> {
    /// Creates a new StreamWriter wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, writer)
    }

    /// Creates a new StreamWriter with the specified buffer capacity.
    pub fn with_capacity(capacity: usize, writer: W) -> Self {
        Self {
            inner: BufWriter::with_capacity(capacity, writer),
            packer: Packer::new(),
        }
    }

    /// Writes object keys in ascending order.
    pub fn with_sorted_keys(mut self, sorted: bool) -> Self {
        self.packer = self.packer.with_sorted_keys(sorted);
        self
    }

    /// Packs and writes one frame, returning its size in bytes.
    pub fn write_frame(&mut self, root: &Object, compress: bool) -> Result<usize> {
        let frame = self.packer.pack(root, compress)?;
        self.inner.write_all(&frame)?;
        Ok(frame.len())
    }

    /// Marshals a record and writes it as one frame.
    pub fn write_record<R: Record>(&mut self, record: &R, compress: bool) -> Result<usize> {
        let root = marshal(record)?;
        self.write_frame(&root, compress)
    }

    /// Flushes the underlying buffer.
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().map_err(Error::from)
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        self.inner.get_mut()
    }

    /// Consumes this StreamWriter, returning the underlying writer.
    ///
    /// This will flush any buffered data before returning the inner writer.
    pub fn into_inner(self) -> Result<W> {
        self.inner.into_inner().map_err(|e| Error::from(e.into_error()))
    }
}

/// StreamReader reads frames from a byte stream.
pub struct StreamReader<R: Read> {
    inner: BufReader<R>,
    limits: Limits,
}

impl<R: Read> StreamReader<R> {
    /// Creates a new StreamReader wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY, reader)
    }

    /// Creates a new StreamReader with the specified buffer capacity.
    pub fn with_capacity(capacity: usize, reader: R) -> Self {
        Self {
            inner: BufReader::with_capacity(capacity, reader),
            limits: Limits::default(),
        }
    }

    /// Sets the frame size and nesting limits.
    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    /// Reads one frame whose root must be an object.
    ///
    /// Returns an error if the stream ends before a complete frame is read.
    pub fn read_frame(&mut self) -> Result<Object> {
        let flags = self.inner.read_u8()?;
        let length = match FrameHeader::length_width(flags) {
            4 => self.inner.read_u32::<BigEndian>()? as usize,
            _ => self.inner.read_u16::<BigEndian>()? as usize,
        };
        let header = FrameHeader { flags, length };
        check_frame_size(length, &self.limits)?;

        let payload = if header.is_compressed() {
            inflate(&mut self.inner, length, &self.limits)?
        } else {
            let mut data = Vec::new();
            (&mut self.inner).take(length as u64).read_to_end(&mut data)?;
            if data.len() < length {
                return Err(Error::truncated(length, data.len()));
            }
            data
        };

        debug!(flags, length, payload = payload.len(), "read frame");
        match Reader::with_limits(&payload, &self.limits).read_value()? {
            Value::Object(root) => Ok(root),
            other => Err(Error::mismatch("SFS_OBJECT root", other.tag())),
        }
    }

    /// Attempts to read a frame, returning None if the stream is at EOF.
    pub fn try_read_frame(&mut self) -> Result<Option<Object>> {
        if self.inner.fill_buf()?.is_empty() {
            return Ok(None);
        }
        self.read_frame().map(Some)
    }

    /// Reads one frame and unmarshals it into a new record.
    pub fn read_record<T: Record>(&mut self) -> Result<T> {
        let root = self.read_frame()?;
        let mut record = T::default();
        unmarshal(&root, &mut record)?;
        Ok(record)
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.inner.get_ref()
    }

    /// Returns a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        self.inner.get_mut()
    }
}

/// Iterator over frames in a stream.
pub struct FrameIter<'a, R: Read> {
    reader: &'a mut StreamReader<R>,
}

impl<R: Read> StreamReader<R> {
    /// Returns an iterator over frames in the stream.
    pub fn frames(&mut self) -> FrameIter<'_, R> {
        FrameIter { reader: self }
    }
}

impl<R: Read> Iterator for FrameIter<'_, R> {
    type Item = Result<Object>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.try_read_frame().transpose()
    }
}
