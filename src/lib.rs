//! SFS - binary object serialization for SmartFoxServer-style protocols
//!
//! Three layers, usable independently:
//!
//! - [`Value`] and [`TypeTag`]: the tagged value tree.
//! - [`Packer`] / [`Unpacker`]: frames of `[flags][length][payload]`,
//!   big-endian, with optional zlib compression.
//! - [`marshal`] / [`unmarshal`]: mapping between [`Record`] types and
//!   objects, driven by field tags.
//!
//! # Example
//!
//! ```rust
//! use sfs::Result;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Data {
//!     name: String,
//!     age: i32,
//! }
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Respond {
//!     code: i32,
//!     data: Vec<Data>,
//!     msg: String,
//! }
//!
//! sfs::record!(Data { name => "name", age => "age" });
//! sfs::record!(Respond { code => "code", data => "data", msg => "msg,optional" });
//!
//! fn main() -> Result<()> {
//!     let respond = Respond {
//!         code: 200,
//!         data: vec![Data { name: "xxx".into(), age: 18 }],
//!         msg: "success".into(),
//!     };
//!
//!     let frame = sfs::to_bytes(&respond, true)?;
//!     let decoded: Respond = sfs::from_bytes(&frame)?;
//!     assert_eq!(decoded, respond);
//!     Ok(())
//! }
//! ```

pub mod convert;
mod error;
mod field;
mod limits;
mod mapper;
mod packer;
mod reader;
mod schema;
pub mod stream;
mod types;
mod value;
mod writer;

pub use convert::{FromSfs, ToSfs};
pub use error::{Error, Result};
pub use field::{resolve_field, FieldInfo};
pub use limits::{Limits, DEFAULT_MAX_DEPTH, DEFAULT_MAX_FRAME_SIZE};
pub use mapper::{marshal, unmarshal};
pub use packer::{FrameHeader, Packer, Unpacker};
pub use reader::Reader;
pub use schema::{schema_for, Field, Record, Schema, SchemaCache};
pub use stream::{StreamReader, StreamWriter};
pub use types::{TypeTag, COMPRESSED_FLAG, LARGE_LENGTH_FLAG, MAX_KEY_LENGTH};
pub use value::{Array, Object, Value};
pub use writer::Writer;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Packs an object into a frame with the default packer.
pub fn pack(root: &Object, compress: bool) -> Result<Vec<u8>> {
    Packer::new().pack(root, compress)
}

/// Unpacks a frame into its root object with the default limits.
pub fn unpack(data: &[u8]) -> Result<Object> {
    Unpacker::new().unpack(data)
}

/// Marshals a record and packs it into a frame.
pub fn to_bytes<R: Record>(record: &R, compress: bool) -> Result<Vec<u8>> {
    pack(&marshal(record)?, compress)
}

/// Unpacks a frame and unmarshals it into a new record.
pub fn from_bytes<R: Record>(data: &[u8]) -> Result<R> {
    let root = unpack(data)?;
    let mut record = R::default();
    unmarshal(&root, &mut record)?;
    Ok(record)
}
