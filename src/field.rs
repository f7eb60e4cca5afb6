//! Field tag resolution.
//!
//! A record field carries a tag string of the form
//! `"wire_name,type=NAME,optional"`. Every part is optional: an empty
//! wire name falls back to the field identifier, a missing `type=`
//! means the wire type is inferred from the field's Rust type, and
//! `type=NULL` also means "infer".

use crate::error::{Error, Result};
use crate::types::TypeTag;

/// Resolved wire metadata for one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Key used in the encoded object.
    pub name: String,
    /// Declared wire type, or `None` to infer from the Rust type.
    pub declared: Option<TypeTag>,
    /// Omit on marshal when zero; tolerate absence on unmarshal.
    pub optional: bool,
}

/// Resolves a field's identifier and tag string into its wire metadata.
///
/// Unknown type names fail here, before any value is converted.
pub fn resolve_field(ident: &str, tag: &str) -> Result<FieldInfo> {
    let mut parts = tag.split(',');
    let name = match parts.next() {
        Some(name) if !name.trim().is_empty() => name.trim(),
        _ => ident,
    };

    let mut info = FieldInfo {
        name: name.to_string(),
        declared: None,
        optional: false,
    };

    for part in parts.map(str::trim) {
        if part == "optional" {
            info.optional = true;
        } else if let Some(type_name) = part.strip_prefix("type=") {
            let tag: TypeTag = type_name
                .parse()
                .map_err(|e: Error| e.context(format!("field {ident}")))?;
            info.declared = (tag != TypeTag::Null).then_some(tag);
        }
    }

    Ok(info)
}
