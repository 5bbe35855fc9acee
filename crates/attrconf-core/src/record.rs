//! Schema-validated records
//!
//! A record is an ordinary serde struct that opts in with
//! `impl TypedRecord for MyRecord {}`. Validation goes through the crate's
//! own deserializer, so a missing field or a wrong type surfaces as a
//! [`MissingField`](crate::error::ErrorKind::MissingField) or
//! [`TypeMismatch`](crate::error::ErrorKind::TypeMismatch) error with a
//! dotted path. Once built, a record is stored in the value tree as a
//! [`RecordRef`] and never transformed again.
//!
//! # Example
//!
//! ```rust
//! use attrconf_core::{TypedRecord, Value};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct DbConfig {
//!     host: String,
//!     #[serde(default = "default_port")]
//!     port: i64,
//! }
//!
//! fn default_port() -> i64 {
//!     5432
//! }
//!
//! impl TypedRecord for DbConfig {}
//!
//! let raw = Value::from_yaml("host: localhost").unwrap();
//! let db = DbConfig::from_value(&raw).unwrap();
//! assert_eq!(db.port, 5432);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::de::{DeserializeOwned, Deserializer, Visitor};
use serde::Serialize;

use crate::error::Result;
use crate::value::Value;

/// A schema-validated structured value
pub trait TypedRecord:
    DeserializeOwned + Serialize + fmt::Debug + PartialEq + Send + Sync + 'static
{
    /// Validate a value into this record
    ///
    /// Accepts plain mappings, dynamic nodes and records of any type.
    fn from_value(value: &Value) -> Result<Self> {
        crate::de::from_value(value)
    }

    /// Store this record as a value, untouched by later conversion
    fn into_value(self) -> Value {
        Value::Record(RecordRef::new(self))
    }
}

/// Object-safe view of a [`TypedRecord`]
pub trait Record: Any + fmt::Debug + Send + Sync {
    /// Short type name of the record (e.g., "DbConfig")
    fn record_name(&self) -> &'static str;

    /// Field values of the record as a plain mapping
    fn to_value(&self) -> Value;

    fn as_any(&self) -> &dyn Any;

    /// Same concrete type and equal fields
    fn dyn_eq(&self, other: &dyn Record) -> bool;
}

impl<T: TypedRecord> Record for T {
    fn record_name(&self) -> &'static str {
        short_type_name::<T>()
    }

    fn to_value(&self) -> Value {
        match serde_json::to_value(self) {
            Ok(json) => Value::from(json),
            Err(e) => {
                log::warn!(
                    "Record '{}' could not be converted to a value: {}",
                    short_type_name::<T>(),
                    e
                );
                Value::Null
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn Record) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// Shared handle to a type-erased record
#[derive(Clone)]
pub struct RecordRef(Arc<dyn Record>);

impl RecordRef {
    /// Wrap a record
    pub fn new<T: TypedRecord>(record: T) -> Self {
        Self(Arc::new(record))
    }

    /// Check whether the record is of type `T`
    pub fn is<T: TypedRecord>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Borrow the record as its concrete type
    pub fn downcast_ref<T: TypedRecord>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Short type name of the record
    pub fn name(&self) -> &'static str {
        self.0.record_name()
    }

    /// Field values of the record as a plain mapping
    pub fn to_value(&self) -> Value {
        self.0.to_value()
    }

    /// Check whether two handles point at the same record
    pub fn ptr_eq(&self, other: &RecordRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl PartialEq for RecordRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.dyn_eq(&*other.0)
    }
}

impl<T: TypedRecord> From<T> for RecordRef {
    fn from(record: T) -> Self {
        RecordRef::new(record)
    }
}

pub(crate) fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    // Strip module paths but keep generic arguments intact
    let base_end = full.find('<').unwrap_or(full.len());
    match full[..base_end].rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

/// Field names a serde struct declares (after renames)
///
/// Returns an empty slice for types that are not plain structs, such as
/// structs with flattened fields or maps.
pub fn declared_fields<T: DeserializeOwned>() -> &'static [&'static str] {
    let mut fields: &'static [&'static str] = &[];
    // The probe always errors out once it has seen the field list
    let _ = T::deserialize(FieldProbe {
        fields: &mut fields,
    });
    fields
}

#[derive(Debug, thiserror::Error)]
#[error("field introspection finished")]
struct ProbeDone;

impl serde::de::Error for ProbeDone {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        ProbeDone
    }
}

struct FieldProbe<'a> {
    fields: &'a mut &'static [&'static str],
}

impl<'de> Deserializer<'de> for FieldProbe<'_> {
    type Error = ProbeDone;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> std::result::Result<V::Value, ProbeDone> {
        Err(ProbeDone)
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> std::result::Result<V::Value, ProbeDone> {
        *self.fields = fields;
        Err(ProbeDone)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}
