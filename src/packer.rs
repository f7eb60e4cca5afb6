//! Frame packing and unpacking.
//!
//! A frame is `flags:u8 length:(u16|u32) payload`. The payload is one
//! tagged value, normally an `SFS_OBJECT`, optionally zlib-compressed.
//!
//! # Length accounting
//!
//! [`Packer`] always writes the *uncompressed* payload length, even when
//! the bytes that follow are compressed. [`Unpacker`] therefore treats
//! the length of a compressed frame as a check rather than a byte count:
//! it inflates the self-delimiting zlib stream that starts right after
//! the header and accepts the frame when the declared length equals
//! either the inflated size or the compressed size consumed. The second
//! form is what reference servers emit.

use std::borrow::Cow;
use std::io::{BufRead, Write};

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::reader::Reader;
use crate::types::{COMPRESSED_FLAG, LARGE_LENGTH_FLAG, MAX_SHORT_LENGTH};
use crate::value::{Object, Value};
use crate::writer::Writer;

/// Output growth step while inflating.
const INFLATE_CHUNK: usize = 32 * 1024;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Raw flags byte. Bits other than the compression and length-width
    /// flags are carried but not interpreted.
    pub flags: u8,
    /// Declared payload length.
    pub length: usize,
}

impl FrameHeader {
    /// Returns true if the payload is zlib-compressed.
    pub fn is_compressed(&self) -> bool {
        self.flags & COMPRESSED_FLAG != 0
    }

    /// Width of the length field that follows a flags byte.
    pub fn length_width(flags: u8) -> usize {
        if flags & LARGE_LENGTH_FLAG != 0 {
            4
        } else {
            2
        }
    }

    /// Reads a header from the start of a buffer.
    pub fn read(reader: &mut Reader<'_>) -> Result<Self> {
        let flags = reader.read_byte()?;
        let length = match Self::length_width(flags) {
            4 => reader.read_u32()? as usize,
            _ => reader.read_u16()? as usize,
        };
        Ok(Self { flags, length })
    }
}

/// Packer encodes a root object into a frame.
#[derive(Debug, Clone, Default)]
pub struct Packer {
    sorted_keys: bool,
}

impl Packer {
    /// Creates a packer that writes keys in map order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits object keys in ascending order so equal trees produce
    /// identical bytes.
    pub fn with_sorted_keys(mut self, sorted: bool) -> Self {
        self.sorted_keys = sorted;
        self
    }

    /// Encodes `root` into a complete frame.
    pub fn pack(&self, root: &Object, compress: bool) -> Result<Vec<u8>> {
        let mut writer = Writer::new().with_sorted_keys(self.sorted_keys);
        writer.write_object(root)?;
        let payload = writer.into_bytes();
        let length = payload.len();

        let mut flags = 0u8;
        if compress {
            flags |= COMPRESSED_FLAG;
        }
        if length > MAX_SHORT_LENGTH {
            flags |= LARGE_LENGTH_FLAG;
        }

        let body = if compress { deflate(&payload)? } else { payload };

        let mut frame = Writer::with_capacity(body.len() + 5);
        frame.write_byte(flags)?;
        if flags & LARGE_LENGTH_FLAG != 0 {
            let length = u32::try_from(length)
                .map_err(|_| Error::limit("frame", length, u32::MAX as usize))?;
            frame.write_u32(length)?;
        } else {
            frame.write_u16(length as u16)?;
        }
        frame.write_bytes(&body)?;

        debug!(
            flags,
            length,
            wire_length = body.len(),
            compressed = compress,
            "packed frame"
        );
        Ok(frame.into_bytes())
    }
}

/// Unpacker decodes frames back into values.
#[derive(Debug, Clone, Default)]
pub struct Unpacker {
    limits: Limits,
}

impl Unpacker {
    /// Creates an unpacker with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unpacker that enforces the given limits.
    pub fn with_limits(limits: Limits) -> Self {
        Self { limits }
    }

    /// Returns the limits this unpacker enforces.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Decodes a frame whose root value must be an object.
    pub fn unpack(&self, data: &[u8]) -> Result<Object> {
        match self.unpack_value(data)? {
            Value::Object(obj) => Ok(obj),
            other => Err(Error::mismatch("SFS_OBJECT root", other.tag())),
        }
    }

    /// Decodes a frame and returns its root value whatever its tag.
    ///
    /// Bytes after the root value are ignored.
    pub fn unpack_value(&self, data: &[u8]) -> Result<Value> {
        let mut reader = Reader::new(data);
        let header = FrameHeader::read(&mut reader)?;
        check_frame_size(header.length, &self.limits)?;

        let payload: Cow<'_, [u8]> = if header.is_compressed() {
            let rest = reader.read_bytes(reader.remaining())?;
            Cow::Owned(inflate(rest, header.length, &self.limits)?)
        } else {
            Cow::Borrowed(reader.read_bytes(header.length)?)
        };

        debug!(
            flags = header.flags,
            length = header.length,
            payload = payload.len(),
            "unpacking frame"
        );
        Reader::with_limits(&payload, &self.limits).read_value()
    }
}

pub(crate) fn check_frame_size(length: usize, limits: &Limits) -> Result<()> {
    if length > limits.max_frame_size {
        return Err(Error::limit("frame", length, limits.max_frame_size));
    }
    Ok(())
}

/// Compresses a payload with zlib at the default level.
pub(crate) fn deflate(payload: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(payload)
        .map_err(|e| Error::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| Error::Compression(e.to_string()))
}

/// Inflates one zlib stream from `input`, consuming exactly the
/// compressed bytes, and checks the declared frame length against it.
pub(crate) fn inflate<R: BufRead>(mut input: R, declared: usize, limits: &Limits) -> Result<Vec<u8>> {
    let mut decompress = Decompress::new(true);
    let mut inflated = Vec::new();

    loop {
        if inflated.capacity() - inflated.len() < INFLATE_CHUNK {
            inflated.reserve(INFLATE_CHUNK);
        }

        let chunk = input.fill_buf()?;
        let eof = chunk.is_empty();
        let flush = if eof {
            FlushDecompress::Finish
        } else {
            FlushDecompress::None
        };
        let (in_before, out_before) = (decompress.total_in(), inflated.len());
        let status = decompress
            .decompress_vec(chunk, &mut inflated, flush)
            .map_err(|e| Error::Compression(e.to_string()))?;
        let consumed = (decompress.total_in() - in_before) as usize;
        input.consume(consumed);

        if inflated.len() > limits.max_frame_size {
            return Err(Error::limit("frame", inflated.len(), limits.max_frame_size));
        }
        match status {
            Status::StreamEnd => break,
            _ if eof && inflated.len() == out_before => {
                return Err(Error::Compression("truncated compressed stream".into()));
            }
            _ => {}
        }
    }

    let consumed = decompress.total_in() as usize;
    if declared != inflated.len() && declared != consumed {
        warn!(
            declared,
            inflated = inflated.len(),
            consumed,
            "compressed frame length mismatch"
        );
        return Err(Error::Compression(format!(
            "declared length {declared} matches neither inflated size {} nor compressed size {consumed}",
            inflated.len()
        )));
    }
    Ok(inflated)
}
