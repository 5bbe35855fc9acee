//! Conversion of undeclared root fields into dynamic nodes
//!
//! Runs once per [`RootConfig`](crate::RootConfig), after the declared fields
//! have validated. Nothing here validates and nothing here fails.

use indexmap::IndexMap;

use crate::config::{ConfigOptions, SequencePolicy};
use crate::node::DynamicNode;
use crate::value::Value;

/// Convert every undeclared field, preserving key order
pub fn convert_extras(
    extras: IndexMap<String, Value>,
    options: &ConfigOptions,
) -> IndexMap<String, Value> {
    extras
        .into_iter()
        .map(|(key, value)| {
            let converted = convert_field(value, options);
            log::trace!("Undeclared field '{}' stored as {}", key, converted.type_name());
            (key, converted)
        })
        .collect()
}

/// Convert a single undeclared field
///
/// Mappings become mapping nodes. Top-level sequences follow
/// [`SequencePolicy`]. Scalars, records and existing nodes pass through.
pub fn convert_field(value: Value, options: &ConfigOptions) -> Value {
    match value {
        Value::Mapping(_) => DynamicNode::wrap_with(value, options.auto_vivify),
        Value::Sequence(_) => match options.sequences {
            SequencePolicy::PassThrough => value,
            SequencePolicy::Wrap => DynamicNode::wrap_with(value, options.auto_vivify),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TypedRecord;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Version {
        majority: String,
    }

    impl TypedRecord for Version {}

    fn extras(yaml: &str) -> IndexMap<String, Value> {
        match Value::from_yaml(yaml).unwrap() {
            Value::Mapping(map) => map,
            other => panic!("expected a mapping, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_mapping_becomes_node() {
        let converted = convert_extras(extras("extra: {a: {b: 1}}"), &ConfigOptions::default());

        let extra = converted.get("extra").unwrap();
        let node = extra.as_node().unwrap();
        assert!(node.auto_vivify());
        assert_eq!(*node, Value::from_yaml("a: {b: 1}").unwrap());
        assert!(extra.get_path("a").unwrap().is_node());
    }

    #[test]
    fn test_scalars_pass_through() {
        let converted = convert_extras(
            extras("name: app\nretries: 3\nratio: 0.5\nenabled: true\nnothing: null"),
            &ConfigOptions::default(),
        );
        assert_eq!(converted.get("name"), Some(&Value::from("app")));
        assert_eq!(converted.get("retries"), Some(&Value::Integer(3)));
        assert_eq!(converted.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(converted.get("enabled"), Some(&Value::Bool(true)));
        assert_eq!(converted.get("nothing"), Some(&Value::Null));
    }

    #[test]
    fn test_records_and_nodes_pass_through() {
        let record = Value::record(Version {
            majority: "1".into(),
        });
        let node = DynamicNode::wrap(Value::from_yaml("a: 1").unwrap());

        let options = ConfigOptions::default();
        let converted = convert_field(record.clone(), &options);
        assert!(converted.as_record().unwrap().ptr_eq(record.as_record().unwrap()));

        let converted = convert_field(node.clone(), &options);
        assert!(converted.as_node().unwrap().ptr_eq(node.as_node().unwrap()));
    }

    #[test]
    fn test_top_level_sequence_pass_through_by_default() {
        let raw = Value::from_yaml("[{a: 1}, 2]").unwrap();
        let converted = convert_field(raw.clone(), &ConfigOptions::default());
        assert!(matches!(converted, Value::Sequence(_)));
        assert_eq!(converted, raw);
    }

    #[test]
    fn test_top_level_sequence_wrap_policy() {
        let options = ConfigOptions {
            sequences: SequencePolicy::Wrap,
            ..ConfigOptions::default()
        };
        let converted = convert_field(Value::from_yaml("[{a: 1}, 2]").unwrap(), &options);

        let node = converted.as_node().unwrap();
        assert!(node.is_sequence());
        assert!(node.index(0).unwrap().is_node());
        assert_eq!(node.index(1).unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_auto_vivify_option_is_inherited() {
        let options = ConfigOptions {
            auto_vivify: false,
            ..ConfigOptions::default()
        };
        let converted = convert_extras(extras("extra: {a: {b: 1}}"), &options);
        let extra = converted.get("extra").unwrap().as_node().unwrap();
        assert!(!extra.auto_vivify());
        assert!(extra.get("missing").is_err());
        assert!(!extra.child("a").unwrap().auto_vivify());
    }

    #[test]
    fn test_order_is_preserved() {
        let converted = convert_extras(extras("z: {}\na: 1\nm: [1]"), &ConfigOptions::default());
        let keys: Vec<&str> = converted.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
