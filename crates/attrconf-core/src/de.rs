//! Record validation
//!
//! A serde `Deserializer` over [`Value`]. Building a record through it turns
//! serde's missing-field and invalid-type reports into attrconf errors and
//! prefixes each error with the path of the failing field.
//!
//! Coercions are deliberately narrow:
//! - integers accept integral floats and numeric strings
//! - floats accept integers and numeric strings
//! - booleans accept the strings "true" and "false" (any case)
//! - strings accept strings only

use indexmap::IndexMap;
use serde::de::value::StringDeserializer;
use serde::de::{
    self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess,
    VariantAccess, Visitor,
};

use crate::error::{Error, Result};
use crate::value::Value;

/// Validate a value into `T`
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    from_owned(value.clone())
}

/// Validate an owned value into `T`
pub(crate) fn from_owned<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(ValueDeserializer::new(value))
}

struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    fn new(value: Value) -> Self {
        Self {
            value: flatten(value),
        }
    }
}

/// Records and nodes are read through their plain contents
fn flatten(value: Value) -> Value {
    match value {
        Value::Record(record) => record.to_value(),
        Value::Node(node) => node.to_plain(),
        other => other,
    }
}

fn visit_sequence<'de, V: Visitor<'de>>(items: Vec<Value>, visitor: V) -> Result<V::Value> {
    let len = items.len();
    let mut access = SeqDeserializer {
        iter: items.into_iter(),
        index: 0,
    };
    let value = visitor.visit_seq(&mut access)?;
    if access.iter.len() == 0 {
        Ok(value)
    } else {
        Err(de::Error::invalid_length(len, &"fewer elements in sequence"))
    }
}

fn visit_mapping<'de, V: Visitor<'de>>(
    entries: IndexMap<String, Value>,
    visitor: V,
) -> Result<V::Value> {
    let mut access = MapDeserializer {
        iter: entries.into_iter(),
        pending: None,
    };
    visitor.visit_map(&mut access)
}

/// An integral float inside the i64 range, without saturating
fn integral_float(f: f64) -> Result<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(f as i64)
    } else {
        Err(Error::type_mismatch("integer", format!("float {}", f)).with_help(
            "Integers must fit in 64 bits; quote unsigned values above 9223372036854775807",
        ))
    }
}

fn numeric_string_mismatch(expected: &str, s: &str) -> Error {
    Error::type_mismatch(expected, format!("string \"{}\"", s))
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Integer(i) => visitor.visit_i64(i),
            Value::Float(f) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Sequence(items) => visit_sequence(items, visitor),
            Value::Mapping(entries) => visit_mapping(entries, visitor),
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Bool(b) => visitor.visit_bool(b),
            Value::String(ref s) if s.eq_ignore_ascii_case("true") => visitor.visit_bool(true),
            Value::String(ref s) if s.eq_ignore_ascii_case("false") => visitor.visit_bool(false),
            Value::String(s) => Err(Error::type_mismatch(
                "boolean",
                format!("string \"{}\" - only \"true\" or \"false\" allowed", s),
            )),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_i8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Integer(i) => visitor.visit_i64(i),
            Value::Float(f) => visitor.visit_i64(integral_float(f)?),
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => visitor.visit_i64(i),
                Err(_) => Err(numeric_string_mismatch("integer", &s)),
            },
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_i128<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            // Quoted values keep the full u64 range
            Value::String(s) => match s.trim().parse::<u64>() {
                Ok(u) => visitor.visit_u64(u),
                Err(_) => Err(numeric_string_mismatch("unsigned integer", &s)),
            },
            _ => self.deserialize_i64(visitor),
        }
    }

    fn deserialize_u128<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Float(f) => visitor.visit_f64(f),
            Value::Integer(i) => visitor.visit_f64(i as f64),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(f) => visitor.visit_f64(f),
                Err(_) => Err(numeric_string_mismatch("float", &s)),
            },
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            _ => self.deserialize_any(visitor),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: None,
            }),
            Value::Mapping(entries) if entries.len() == 1 => {
                let Some((variant, value)) = entries.into_iter().next() else {
                    return Err(Error::internal("single-entry mapping yielded no entry"));
                };
                visitor.visit_enum(EnumDeserializer {
                    variant,
                    value: Some(value),
                })
            }
            Value::Mapping(entries) => Err(Error::type_mismatch(
                "string or single-key mapping",
                format!("mapping with {} keys", entries.len()),
            )),
            other => Err(Error::type_mismatch(
                "string or single-key mapping",
                other.type_name(),
            )),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }

    serde::forward_to_deserialize_any! {
        char str string bytes byte_buf seq tuple tuple_struct map struct identifier
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
    index: usize,
}

impl<'de> SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.iter.next() {
            Some(value) => {
                let index = self.index;
                self.index += 1;
                seed.deserialize(ValueDeserializer::new(value))
                    .map(Some)
                    .map_err(|e| e.under_index(index))
            }
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    pending: Option<(String, Value)>,
}

impl<'de> MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.iter.next() {
            Some((key, value)) => {
                let key_de: StringDeserializer<Error> = key.clone().into_deserializer();
                let parsed = seed.deserialize(key_de)?;
                self.pending = Some((key, value));
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let (key, value) = self
            .pending
            .take()
            .ok_or_else(|| Error::internal("map value requested before its key"))?;
        seed.deserialize(ValueDeserializer::new(value))
            .map_err(|e| e.under_key(&key))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant_de: StringDeserializer<Error> = self.variant.clone().into_deserializer();
        let parsed = seed.deserialize(variant_de)?;
        Ok((
            parsed,
            VariantDeserializer {
                variant: self.variant,
                value: self.value,
            },
        ))
    }
}

struct VariantDeserializer {
    variant: String,
    value: Option<Value>,
}

impl VariantDeserializer {
    fn payload(self, expected: &str) -> Result<(String, Value)> {
        match self.value {
            Some(value) => Ok((self.variant, value)),
            None => Err(Error::type_mismatch(expected, "unit variant").with_path(self.variant)),
        }
    }
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None | Some(Value::Null) => Ok(()),
            Some(other) => Err(
                Error::type_mismatch("unit variant", other.type_name()).with_path(self.variant)
            ),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        let (variant, value) = self.payload("newtype variant")?;
        seed.deserialize(ValueDeserializer::new(value))
            .map_err(|e| e.under_key(&variant))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        let (variant, value) = self.payload("tuple variant")?;
        de::Deserializer::deserialize_seq(ValueDeserializer::new(value), visitor)
            .map_err(|e| e.under_key(&variant))
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        let (variant, value) = self.payload("struct variant")?;
        de::Deserializer::deserialize_map(ValueDeserializer::new(value), visitor)
            .map_err(|e| e.under_key(&variant))
    }
}
