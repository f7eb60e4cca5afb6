//! Record to object mapping.

use std::any::type_name;

use tracing::trace;

use crate::error::{Error, Result, ResultExt};
use crate::schema::{schema_for, Record};
use crate::value::{Object, Value};

/// Converts a record into an object keyed by wire names.
///
/// Optional fields holding their zero value are skipped, and so are
/// fields that convert to nothing (empty sequences).
pub fn marshal<R: Record>(record: &R) -> Result<Object> {
    let schema = schema_for::<R>()?;
    let mut object = Object::with_capacity(R::FIELDS.len());

    for (field, info) in R::FIELDS.iter().zip(&schema.fields) {
        let value = (field.get)(record);
        if info.optional && value.is_zero() {
            continue;
        }
        if let Some(value) = value.to_sfs(info.declared).field(field.ident)? {
            object.insert(info.name.clone(), value);
        }
    }

    trace!(record = type_name::<R>(), keys = object.len(), "marshaled record");
    Ok(object)
}

/// Populates a record from an object.
///
/// A present `Null` resets the field to its zero value. A missing
/// required field fails with [`Error::MissingField`]. On failure the
/// fields assigned so far keep their new values.
pub fn unmarshal<R: Record>(object: &Object, record: &mut R) -> Result<()> {
    let schema = schema_for::<R>()?;

    for (field, info) in R::FIELDS.iter().zip(&schema.fields) {
        match object.get(&info.name) {
            None if info.optional => {}
            None => return Err(Error::MissingField(info.name.clone())),
            Some(Value::Null) => (field.reset)(record),
            Some(value) => (field.set)(record, value, info.declared).field(field.ident)?,
        }
    }

    trace!(record = type_name::<R>(), keys = object.len(), "unmarshaled record");
    Ok(())
}
