//! Root configuration objects
//!
//! A [`RootConfig`] splits a raw mapping into the fields its record type
//! declares and everything else. Declared fields are validated into the
//! record; undeclared fields are converted into dynamic nodes.

use std::ops::Deref;
use std::path::Path;

use indexmap::IndexMap;

use crate::convert::{convert_extras, convert_field};
use crate::error::{Error, Result};
use crate::node::DynamicNode;
use crate::record::{declared_fields, short_type_name, Record, TypedRecord};
use crate::value::Value;

/// How undeclared top-level sequences are converted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SequencePolicy {
    /// Keep the raw sequence as it was supplied
    #[default]
    PassThrough,
    /// Wrap into a sequence node, classifying each element
    Wrap,
}

/// Configuration options for building a root config
#[derive(Debug, Clone)]
pub struct ConfigOptions {
    /// Missing keys on dynamic nodes yield empty nodes instead of errors
    pub auto_vivify: bool,
    /// Treatment of undeclared top-level sequences
    pub sequences: SequencePolicy,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            auto_vivify: true,
            sequences: SequencePolicy::PassThrough,
        }
    }
}

/// A validated configuration with declared and dynamic fields
///
/// Declared fields are reachable through `Deref`; undeclared fields through
/// [`extra`](Self::extra), [`dynamic`](Self::dynamic) and
/// [`get_path`](Self::get_path).
#[derive(Debug, Clone)]
pub struct RootConfig<S: TypedRecord> {
    declared: S,
    extras: IndexMap<String, Value>,
    options: ConfigOptions,
}

impl<S: TypedRecord> RootConfig<S> {
    /// Build a config from a raw mapping with default options
    pub fn new(raw: Value) -> Result<Self> {
        Self::with_options(raw, ConfigOptions::default())
    }

    /// Build a config from a raw mapping with custom options
    pub fn with_options(raw: Value, options: ConfigOptions) -> Result<Self> {
        let mapping = into_mapping(raw)?;
        let fields = declared_fields::<S>();

        let (declared, extras) = if fields.is_empty() {
            // No introspectable field list: validate everything, keep everything
            (Value::Mapping(mapping.clone()), mapping)
        } else {
            let mut declared = IndexMap::new();
            let mut extras = IndexMap::new();
            for (key, value) in mapping {
                if fields.contains(&key.as_str()) {
                    declared.insert(key, value);
                } else {
                    extras.insert(key, value);
                }
            }
            (Value::Mapping(declared), extras)
        };

        let declared: S = crate::de::from_owned(declared)?;
        let extras = convert_extras(extras, &options);

        log::debug!(
            "Built {} with {} declared and {} undeclared fields",
            short_type_name::<S>(),
            fields.len(),
            extras.len()
        );

        Ok(Self {
            declared,
            extras,
            options,
        })
    }

    /// Parse YAML text and build a config
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::new(Value::from_yaml(yaml)?)
    }

    /// Parse JSON text and build a config
    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(Value::from_json(json)?)
    }

    /// Load a YAML file and build a config
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(&file, e.to_string()))?;

        let raw = Value::from_yaml(&content).map_err(|mut e| {
            if let Some(loc) = e.source_location.as_mut() {
                loc.file = file.clone();
            }
            e
        })?;

        log::debug!("Loaded config from {}", file);
        Self::new(raw)
    }

    /// The validated record of declared fields
    pub fn declared(&self) -> &S {
        &self.declared
    }

    /// An undeclared field, as stored after conversion
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }

    /// All undeclared fields in their original order
    pub fn extras(&self) -> &IndexMap<String, Value> {
        &self.extras
    }

    /// An undeclared field that holds a dynamic node
    ///
    /// Missing root keys are not vivified.
    pub fn dynamic(&self, key: &str) -> Result<DynamicNode> {
        match self.extras.get(key) {
            Some(Value::Node(node)) => Ok(node.clone()),
            Some(other) => {
                Err(Error::type_mismatch("dynamic node", other.type_name()).with_path(key))
            }
            None => {
                let err = Error::path_not_found(key);
                if declared_fields::<S>().contains(&key) {
                    Err(err.with_help(format!("'{}' is a declared field; read it from the record", key)))
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Get a value by path across declared and undeclared fields
    ///
    /// Paths into undeclared fields keep dynamic-node semantics, so a
    /// missing key under a node yields an empty node.
    pub fn get_path(&self, path: &str) -> Result<Value> {
        if path.is_empty() {
            return Ok(self.to_value());
        }

        let head = path.split(['.', '[']).next().unwrap_or_default();
        if let Some(value) = self.extras.get(head) {
            let rest = path[head.len()..].trim_start_matches('.');
            return value.get_path(rest).map_err(|e| e.with_path(path));
        }

        Record::to_value(&self.declared).get_path(path)
    }

    /// Add or replace an undeclared field, converting it like the others
    ///
    /// Declared field names are rejected.
    pub fn insert_extra(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        if declared_fields::<S>().contains(&key.as_str()) {
            return Err(Error::validation(
                key,
                "Declared fields cannot be replaced with undeclared values",
            ));
        }

        let value = convert_field(value.into(), &self.options);
        log::trace!("Undeclared field '{}' stored as {}", key, value.type_name());
        self.extras.insert(key, value);
        Ok(())
    }

    /// Split into the declared record and the converted undeclared fields
    pub fn into_parts(self) -> (S, IndexMap<String, Value>) {
        (self.declared, self.extras)
    }

    /// Export as a single mapping
    ///
    /// The declared record is expanded into its fields, and dynamic nodes
    /// are turned back into plain containers.
    pub fn to_value(&self) -> Value {
        let mut map = match Record::to_value(&self.declared) {
            Value::Mapping(map) => map,
            _ => IndexMap::new(),
        };
        for (key, value) in &self.extras {
            map.insert(key.clone(), value.to_plain());
        }
        Value::Mapping(map)
    }

    /// Export as YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.to_value()).map_err(|e| Error::internal(e.to_string()))
    }

    /// Export as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.to_value()).map_err(|e| Error::internal(e.to_string()))
    }

    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }
}

impl<S: TypedRecord> Deref for RootConfig<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.declared
    }
}

fn into_mapping(raw: Value) -> Result<IndexMap<String, Value>> {
    match raw {
        Value::Mapping(map) => Ok(map),
        Value::Node(node) if node.is_mapping() => Ok(node.entries().into_iter().collect()),
        other => Err(Error::type_mismatch("mapping", other.type_name())
            .with_help("The root of a configuration must be a mapping")),
    }
}
