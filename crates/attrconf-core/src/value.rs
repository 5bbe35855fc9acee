//! Configuration value types
//!
//! A `Value` is either raw input (scalars, plain sequences and mappings,
//! possibly pre-built records) or part of a converted tree, where mappings
//! and sequences live inside shared [`DynamicNode`]s.

use indexmap::IndexMap;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;

use crate::error::{Error, Result, SourceLocation};
use crate::node::DynamicNode;
use crate::record::{RecordRef, TypedRecord};

/// A configuration value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Null value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    String(String),
    /// Plain sequence of values
    Sequence(Vec<Value>),
    /// Plain mapping of string keys to values
    Mapping(IndexMap<String, Value>),
    /// A schema-validated record, never rewrapped
    Record(RecordRef),
    /// A dynamic mapping or sequence; clones share storage
    Node(DynamicNode),
}

impl Value {
    /// Parse a YAML document into a raw value
    pub fn from_yaml(yaml: &str) -> Result<Value> {
        serde_yaml::from_str(yaml).map_err(yaml_error)
    }

    /// Parse a JSON document into a raw value
    pub fn from_json(json: &str) -> Result<Value> {
        serde_json::from_str(json).map_err(|e| {
            Error::parse(e.to_string()).with_source_location(SourceLocation {
                file: "<json>".into(),
                line: Some(e.line()),
                column: Some(e.column()),
            })
        })
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a boolean
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Check if this value is an integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    /// Check if this value is a float
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// Check if this value is a string
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Check if this value is a sequence, plain or dynamic
    pub fn is_sequence(&self) -> bool {
        match self {
            Value::Sequence(_) => true,
            Value::Node(node) => node.is_sequence(),
            _ => false,
        }
    }

    /// Check if this value is a mapping, plain or dynamic
    pub fn is_mapping(&self) -> bool {
        match self {
            Value::Mapping(_) => true,
            Value::Node(node) => node.is_mapping(),
            _ => false,
        }
    }

    /// Check if this value is a record
    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// Check if this value is a dynamic node
    pub fn is_node(&self) -> bool {
        matches!(self, Value::Node(_))
    }

    /// Get as boolean if this is a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if this is a Float or Integer
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as str if this is a String
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as slice if this is a plain Sequence
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(s) => Some(s),
            _ => None,
        }
    }

    /// Get as mapping if this is a plain Mapping
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Get the record handle if this is a Record
    pub fn as_record(&self) -> Option<&RecordRef> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Get the dynamic node if this is a Node
    pub fn as_node(&self) -> Option<&DynamicNode> {
        match self {
            Value::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Borrow the record as its concrete type
    pub fn downcast_record<T: TypedRecord>(&self) -> Option<&T> {
        self.as_record().and_then(|r| r.downcast_ref::<T>())
    }

    /// Wrap a typed record
    pub fn record<T: TypedRecord>(record: T) -> Value {
        Value::Record(RecordRef::new(record))
    }

    /// Get a value by path (e.g., "logging.handlers" or "versions[0].sub")
    ///
    /// Missing keys on dynamic mappings follow the node's auto-vivify rule;
    /// missing keys on plain mappings are `PathNotFound`.
    pub fn get_path(&self, path: &str) -> Result<Value> {
        if path.is_empty() {
            return Ok(self.clone());
        }

        let segments = parse_path(path)?;
        let Some((first, rest)) = segments.split_first() else {
            return Ok(self.clone());
        };

        let mut current = step(self, first, path)?;
        for segment in rest {
            current = step(&current, segment, path)?;
        }
        Ok(current)
    }

    /// Convert dynamic nodes back into plain sequences and mappings
    ///
    /// Records are kept as records.
    pub fn to_plain(&self) -> Value {
        match self {
            Value::Sequence(seq) => Value::Sequence(seq.iter().map(Value::to_plain).collect()),
            Value::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_plain()))
                    .collect(),
            ),
            Value::Node(node) => node.to_plain(),
            other => other.clone(),
        }
    }

    /// Convert to a serde_json value, expanding records and nodes
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Sequence(seq) => serde_json::Value::Array(seq.iter().map(Value::to_json).collect()),
            Value::Mapping(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Record(record) => record.to_value().to_json(),
            Value::Node(node) => node.to_plain().to_json(),
        }
    }

    /// Returns the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Record(_) => "record",
            Value::Node(node) if node.is_sequence() => "dynamic sequence",
            Value::Node(_) => "dynamic mapping",
        }
    }
}

fn step(current: &Value, segment: &PathSegment, path: &str) -> Result<Value> {
    match (segment, current) {
        (PathSegment::Key(key), Value::Mapping(map)) => map
            .get(key.as_str())
            .cloned()
            .ok_or_else(|| Error::path_not_found(path)),
        (PathSegment::Key(key), Value::Node(node)) if node.is_mapping() => {
            node.get(key).map_err(|e| e.with_path(path))
        }
        (PathSegment::Key(key), Value::Record(record)) => match record.to_value() {
            Value::Mapping(map) => map
                .get(key.as_str())
                .cloned()
                .ok_or_else(|| Error::path_not_found(path)),
            _ => Err(Error::path_not_found(path)),
        },
        (PathSegment::Index(idx), Value::Sequence(seq)) => seq
            .get(*idx)
            .cloned()
            .ok_or_else(|| Error::index_out_of_range(*idx, seq.len()).with_path(path)),
        (PathSegment::Index(idx), Value::Node(node)) if node.is_sequence() => {
            node.index(*idx).map_err(|e| e.with_path(path))
        }
        _ => Err(Error::path_not_found(path)),
    }
}

pub(crate) fn yaml_error(e: serde_yaml::Error) -> Error {
    let err = Error::parse(e.to_string());
    match e.location() {
        Some(loc) => err.with_source_location(SourceLocation {
            file: "<yaml>".into(),
            line: Some(loc.line()),
            column: Some(loc.column()),
        }),
        None => err,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a == b,
            (Value::Node(node), plain) | (plain, Value::Node(node)) => node == plain,
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(seq) => seq.serialize(serializer),
            Value::Mapping(map) => map.serialize(serializer),
            Value::Record(record) => record.to_value().serialize(serializer),
            Value::Node(node) => node.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Value, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any configuration value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(Value::Integer(v))
    }

    // Above i64::MAX the value is kept as a float; integer record fields
    // reject such floats rather than saturating them
    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(i64::try_from(v)
            .map(Value::Integer)
            .unwrap_or(Value::Float(v as f64)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, d: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(d)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Value, A::Error> {
        let mut entries = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            entries.insert(key, value);
        }
        Ok(Value::Mapping(entries))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Sequence(seq) => {
                write!(f, "[")?;
                for (i, v) in seq.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Mapping(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Record(record) => write!(f, "{} {}", record.name(), record.to_value()),
            Value::Node(node) => write!(f, "{}", node),
        }
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(m: IndexMap<String, Value>) -> Self {
        Value::Mapping(m)
    }
}

impl From<RecordRef> for Value {
    fn from(r: RecordRef) -> Self {
        Value::Record(r)
    }
}

impl From<DynamicNode> for Value {
    fn from(n: DynamicNode) -> Self {
        Value::Node(n)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Mapping(
                obj.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// A segment in a path expression
#[derive(Debug, Clone, PartialEq)]
enum PathSegment {
    /// A key in a mapping (e.g., "logging" in "logging.level")
    Key(String),
    /// An index in a sequence (e.g., 0 in "versions[0]")
    Index(usize),
}

/// Parse a path string into segments
/// Supports: "key", "key.subkey", "key[0]", "key[0].subkey"
fn parse_path(path: &str) -> Result<Vec<PathSegment>> {
    let mut segments = Vec::new();
    let mut current_key = String::new();
    let mut chars = path.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
            }
            '[' => {
                if !current_key.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current_key)));
                }
                let index_str: String = chars.by_ref().take_while(|&c| c != ']').collect();
                let idx: usize = index_str.trim().parse().map_err(|_| {
                    Error::parse(format!("Invalid sequence index in path: {}", index_str))
                        .with_path(path)
                })?;
                segments.push(PathSegment::Index(idx));
            }
            ']' => {
                return Err(Error::parse("Unexpected ']' in path").with_path(path));
            }
            _ => {
                current_key.push(c);
            }
        }
    }

    if !current_key.is_empty() {
        segments.push(PathSegment::Key(current_key));
    }

    Ok(segments)
}
