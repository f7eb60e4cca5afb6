//! Record registration and resolved-schema cache.
//!
//! Records describe their fields statically through [`Record::FIELDS`],
//! usually generated by the [`record!`](crate::record) macro. Tag strings
//! are resolved into [`FieldInfo`] once per type and cached.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::trace;

use crate::convert::ToSfs;
use crate::error::Result;
use crate::field::{resolve_field, FieldInfo};
use crate::types::TypeTag;
use crate::value::Value;

/// Reads a field as a convertible value.
pub type Getter<R> = fn(&R) -> &dyn ToSfs;

/// Converts a value and stores it into a field.
pub type Setter<R> = fn(&mut R, &Value, Option<TypeTag>) -> Result<()>;

/// Resets a field to its zero value.
pub type Resetter<R> = fn(&mut R);

/// Static description of one record field.
pub struct Field<R> {
    /// Rust identifier, used as the default wire name and in error context.
    pub ident: &'static str,
    /// Tag string, see [`resolve_field`].
    pub tag: &'static str,
    pub get: Getter<R>,
    pub set: Setter<R>,
    pub reset: Resetter<R>,
}

/// A structured record that maps to an `SFS_OBJECT`.
///
/// Fields are visited in declaration order.
pub trait Record: Default + 'static {
    const FIELDS: &'static [Field<Self>];
}

/// Resolved field metadata for one record type, aligned with
/// [`Record::FIELDS`].
#[derive(Debug)]
pub struct Schema {
    pub type_name: &'static str,
    pub fields: Vec<FieldInfo>,
}

impl Schema {
    /// Resolves every field tag of `R`.
    pub fn resolve<R: Record>() -> Result<Self> {
        let type_name = type_name::<R>();
        let fields = R::FIELDS
            .iter()
            .map(|field| resolve_field(field.ident, field.tag))
            .collect::<Result<Vec<_>>>()
            .map_err(|e| e.context(format!("record {type_name}")))?;
        trace!(record = type_name, fields = fields.len(), "resolved schema");
        Ok(Self { type_name, fields })
    }
}

/// SchemaCache holds resolved schemas keyed by record type.
/// Thread-safe: uses RwLock for concurrent read access.
pub struct SchemaCache {
    inner: RwLock<HashMap<TypeId, Arc<Schema>>>,
}

impl SchemaCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the schema for `R`, resolving it on first use.
    /// Resolution failures are returned every time and never cached.
    pub fn get<R: Record>(&self) -> Result<Arc<Schema>> {
        let id = TypeId::of::<R>();

        // Fast path: already resolved (read lock)
        {
            let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(schema) = inner.get(&id) {
                return Ok(Arc::clone(schema));
            }
        }

        let schema = Arc::new(Schema::resolve::<R>()?);

        // Slow path: another thread may have raced us here
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(inner.entry(id).or_insert(schema)))
    }

    /// Checks if a record type has been resolved.
    pub fn contains<R: Record>(&self) -> bool {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.contains_key(&TypeId::of::<R>())
    }

    /// Returns the number of cached schemas.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all cached schemas.
    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the schema for `R` from the process-wide cache.
pub fn schema_for<R: Record>() -> Result<Arc<Schema>> {
    static CACHE: OnceLock<SchemaCache> = OnceLock::new();
    CACHE.get_or_init(SchemaCache::new).get::<R>()
}

/// Implements [`Record`], [`ToSfs`] and [`FromSfs`](crate::FromSfs) for a
/// struct with named fields.
///
/// Each listed field may carry a tag string (`"wire,type=NAME,optional"`);
/// fields not listed are ignored by marshal and unmarshal. The struct must
/// implement `Default`.
///
/// ```
/// #[derive(Debug, Default, PartialEq)]
/// struct Login {
///     user: String,
///     zone: String,
///     attempts: u8,
///     cache: Vec<u8>,
/// }
///
/// sfs::record!(Login {
///     user => "un",
///     zone => "zn,type=UTF_STRING",
///     attempts => "at,optional",
/// });
///
/// let obj = sfs::marshal(&Login { user: "neo".into(), ..Default::default() }).unwrap();
/// assert_eq!(obj.get("un"), Some(&sfs::Value::from("neo")));
/// assert!(!obj.contains_key("at"));
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($field:ident $(=> $tag:literal)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            const FIELDS: &'static [$crate::Field<Self>] = &[
                $(
                    $crate::Field {
                        ident: stringify!($field),
                        tag: concat!("" $(, $tag)?),
                        get: {
                            fn get(record: &$ty) -> &dyn $crate::ToSfs {
                                &record.$field
                            }
                            get
                        },
                        set: {
                            fn set(
                                record: &mut $ty,
                                value: &$crate::Value,
                                declared: ::core::option::Option<$crate::TypeTag>,
                            ) -> $crate::Result<()> {
                                record.$field = $crate::FromSfs::from_sfs(value, declared)?;
                                Ok(())
                            }
                            set
                        },
                        reset: {
                            fn reset(record: &mut $ty) {
                                record.$field = ::core::default::Default::default();
                            }
                            reset
                        },
                    },
                )*
            ];
        }

        impl $crate::ToSfs for $ty {
            fn to_sfs(
                &self,
                declared: ::core::option::Option<$crate::TypeTag>,
            ) -> $crate::Result<::core::option::Option<$crate::Value>> {
                $crate::convert::record_to_sfs(self, declared)
            }

            fn is_zero(&self) -> bool {
                $crate::convert::record_is_zero(self)
            }
        }

        impl $crate::FromSfs for $ty {
            fn from_sfs(
                value: &$crate::Value,
                declared: ::core::option::Option<$crate::TypeTag>,
            ) -> $crate::Result<Self> {
                $crate::convert::record_from_sfs(value, declared)
            }
        }
    };
}
