//! Dynamic configuration nodes
//!
//! A [`DynamicNode`] wraps a mapping or a sequence of [`Value`]s. Wrapping is
//! eager and transitive: nested mappings and sequences become nodes as soon
//! as they enter the tree, while records and scalars are stored as-is.
//!
//! Nodes have reference semantics. Cloning a node clones the handle, and a
//! write through any handle is visible through all of them.
//!
//! Reading a missing key from a mapping node (with auto-vivify enabled)
//! returns a fresh, empty node without touching the parent. The first write
//! into that node commits it into the parent under the key it was read from,
//! together with any pending ancestors.
//!
//! ```rust
//! use attrconf_core::{DynamicNode, Value};
//!
//! let root = DynamicNode::new();
//! let handlers = root.child("handlers").unwrap();
//! assert!(!root.contains_key("handlers"));
//!
//! handlers.set("level", "INFO").unwrap();
//! assert_eq!(root.get_path("handlers.level").unwrap(), Value::from("INFO"));
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::record::TypedRecord;
use crate::value::Value;

/// A shared, attribute-addressable mapping or sequence
#[derive(Clone)]
pub struct DynamicNode {
    shared: Arc<Shared>,
}

struct Shared {
    store: RwLock<Store>,
    auto_vivify: bool,
    /// Set while the node was vivified from a missing key and not yet written
    origin: Mutex<Option<Origin>>,
}

#[derive(PartialEq)]
enum Store {
    Mapping(IndexMap<String, Value>),
    Sequence(Vec<Value>),
}

struct Origin {
    parent: DynamicNode,
    key: String,
}

impl DynamicNode {
    /// Create an empty mapping node with auto-vivify enabled
    pub fn new() -> Self {
        Self::mapping(IndexMap::new(), true)
    }

    /// Create a mapping node, wrapping nested mappings and sequences
    pub fn mapping(entries: IndexMap<String, Value>, auto_vivify: bool) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key, Self::wrap_with(value, auto_vivify)))
            .collect();
        Self::from_store(Store::Mapping(entries), auto_vivify, None)
    }

    /// Create a sequence node, classifying each element on its own
    pub fn sequence(items: Vec<Value>, auto_vivify: bool) -> Self {
        let items = items
            .into_iter()
            .map(|item| Self::wrap_with(item, auto_vivify))
            .collect();
        Self::from_store(Store::Sequence(items), auto_vivify, None)
    }

    /// Wrap a raw value with auto-vivify enabled
    ///
    /// Mappings and sequences become nodes; records, scalars and existing
    /// nodes are returned unchanged.
    pub fn wrap(raw: Value) -> Value {
        Self::wrap_with(raw, true)
    }

    /// Wrap a raw value with an explicit auto-vivify setting
    pub fn wrap_with(raw: Value, auto_vivify: bool) -> Value {
        match raw {
            Value::Mapping(entries) => Value::Node(Self::mapping(entries, auto_vivify)),
            Value::Sequence(items) => Value::Node(Self::sequence(items, auto_vivify)),
            other => other,
        }
    }

    fn from_store(store: Store, auto_vivify: bool, origin: Option<Origin>) -> Self {
        Self {
            shared: Arc::new(Shared {
                store: RwLock::new(store),
                auto_vivify,
                origin: Mutex::new(origin),
            }),
        }
    }

    /// Whether reading a missing key yields an empty node instead of an error
    pub fn auto_vivify(&self) -> bool {
        self.shared.auto_vivify
    }

    /// Check if this node is backed by a mapping
    pub fn is_mapping(&self) -> bool {
        matches!(&*self.read(), Store::Mapping(_))
    }

    /// Check if this node is backed by a sequence
    pub fn is_sequence(&self) -> bool {
        matches!(&*self.read(), Store::Sequence(_))
    }

    /// Check if this node was vivified from a missing key and not written yet
    pub fn is_pending(&self) -> bool {
        self.lock_origin().is_some()
    }

    /// Check whether two handles share the same storage
    pub fn ptr_eq(&self, other: &DynamicNode) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Number of entries or items
    pub fn len(&self) -> usize {
        match &*self.read() {
            Store::Mapping(map) => map.len(),
            Store::Sequence(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether a mapping node holds `key`
    ///
    /// Always false for sequence nodes.
    pub fn contains_key(&self, key: &str) -> bool {
        match &*self.read() {
            Store::Mapping(map) => map.contains_key(key),
            Store::Sequence(_) => false,
        }
    }

    /// Keys in insertion order (empty for sequence nodes)
    pub fn keys(&self) -> Vec<String> {
        match &*self.read() {
            Store::Mapping(map) => map.keys().cloned().collect(),
            Store::Sequence(_) => Vec::new(),
        }
    }

    /// Mapping values or sequence items, in order
    pub fn values(&self) -> Vec<Value> {
        match &*self.read() {
            Store::Mapping(map) => map.values().cloned().collect(),
            Store::Sequence(items) => items.clone(),
        }
    }

    /// Key/value pairs in insertion order (empty for sequence nodes)
    pub fn entries(&self) -> Vec<(String, Value)> {
        match &*self.read() {
            Store::Mapping(map) => map
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            Store::Sequence(_) => Vec::new(),
        }
    }

    /// Read a key from a mapping node
    ///
    /// A missing key yields a new empty node when auto-vivify is enabled;
    /// the parent is left untouched until that node is written to.
    pub fn get(&self, key: &str) -> Result<Value> {
        match &*self.read() {
            Store::Mapping(map) => match map.get(key) {
                Some(value) => Ok(value.clone()),
                None if self.shared.auto_vivify => Ok(Value::Node(self.vivify(key))),
                None => Err(Error::path_not_found(key)),
            },
            Store::Sequence(_) => Err(Error::type_mismatch("mapping", "sequence").with_path(key)),
        }
    }

    /// Read a key that must hold a node
    pub fn child(&self, key: &str) -> Result<DynamicNode> {
        match self.get(key)? {
            Value::Node(node) => Ok(node),
            other => Err(Error::type_mismatch("dynamic node", other.type_name()).with_path(key)),
        }
    }

    /// Read an item from a sequence node
    pub fn index(&self, index: usize) -> Result<Value> {
        match &*self.read() {
            Store::Sequence(items) => items.get(index).cloned().ok_or_else(|| {
                Error::index_out_of_range(index, items.len()).with_path(format!("[{}]", index))
            }),
            Store::Mapping(_) => Err(Error::type_mismatch("sequence", "mapping")
                .with_path(format!("[{}]", index))),
        }
    }

    /// Navigate a dotted path such as "handlers.file.path" or "versions[1]"
    pub fn get_path(&self, path: &str) -> Result<Value> {
        Value::Node(self.clone()).get_path(path)
    }

    /// Read a record of type `T` stored under `key`
    ///
    /// A dynamic mapping under the key is validated into `T` on demand; the
    /// stored value is not replaced.
    pub fn record<T: TypedRecord + Clone>(&self, key: &str) -> Result<T> {
        match self.get(key)? {
            Value::Record(record) => record.downcast_ref::<T>().cloned().ok_or_else(|| {
                Error::type_mismatch(std::any::type_name::<T>(), record.name()).with_path(key)
            }),
            value @ (Value::Node(_) | Value::Mapping(_)) => {
                T::from_value(&value).map_err(|e| e.under_key(key))
            }
            other => Err(Error::type_mismatch("record", other.type_name()).with_path(key)),
        }
    }

    /// Assign a key on a mapping node
    ///
    /// Raw mappings and sequences are wrapped before they are stored. A
    /// value that contains this node, or one of its pending ancestors, is
    /// rejected with a `Validation` error.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let key = key.into();
        let value = Self::wrap_with(value.into(), self.shared.auto_vivify);
        if self.creates_cycle(&value) {
            return Err(cycle_error(key));
        }
        match &mut *self.write() {
            Store::Mapping(map) => {
                map.insert(key, value);
            }
            Store::Sequence(_) => {
                return Err(Error::type_mismatch("mapping", "sequence").with_path(key));
            }
        }
        self.commit();
        Ok(())
    }

    /// Replace an item of a sequence node
    pub fn set_index(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = Self::wrap_with(value.into(), self.shared.auto_vivify);
        if self.creates_cycle(&value) {
            return Err(cycle_error(format!("[{}]", index)));
        }
        match &mut *self.write() {
            Store::Sequence(items) => {
                let len = items.len();
                if index >= len {
                    return Err(
                        Error::index_out_of_range(index, len).with_path(format!("[{}]", index))
                    );
                }
                items[index] = value;
            }
            Store::Mapping(_) => {
                return Err(Error::type_mismatch("sequence", "mapping")
                    .with_path(format!("[{}]", index)));
            }
        }
        self.commit();
        Ok(())
    }

    /// Append an item to a sequence node
    pub fn push(&self, value: impl Into<Value>) -> Result<()> {
        let value = Self::wrap_with(value.into(), self.shared.auto_vivify);
        if self.creates_cycle(&value) {
            return Err(cycle_error(format!("[{}]", self.len())));
        }
        match &mut *self.write() {
            Store::Sequence(items) => items.push(value),
            Store::Mapping(_) => return Err(Error::type_mismatch("sequence", "mapping")),
        }
        self.commit();
        Ok(())
    }

    /// Remove a key from a mapping node, preserving the order of the rest
    pub fn remove(&self, key: &str) -> Option<Value> {
        match &mut *self.write() {
            Store::Mapping(map) => map.shift_remove(key),
            Store::Sequence(_) => None,
        }
    }

    /// Convert this node and its descendants into plain values
    pub fn to_plain(&self) -> Value {
        match &*self.read() {
            Store::Mapping(map) => Value::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_plain()))
                    .collect(),
            ),
            Store::Sequence(items) => Value::Sequence(items.iter().map(Value::to_plain).collect()),
        }
    }

    fn vivify(&self, key: &str) -> DynamicNode {
        Self::from_store(
            Store::Mapping(IndexMap::new()),
            self.shared.auto_vivify,
            Some(Origin {
                parent: self.clone(),
                key: key.to_string(),
            }),
        )
    }

    /// Whether storing `value` here would make a node contain itself
    ///
    /// Pending ancestors count, since the write will commit them.
    fn creates_cycle(&self, value: &Value) -> bool {
        let mut chain = vec![self.clone()];
        let mut cursor = self.clone();
        loop {
            let parent = match &*cursor.lock_origin() {
                Some(origin) => origin.parent.clone(),
                None => break,
            };
            chain.push(parent.clone());
            cursor = parent;
        }
        reaches(value, &chain)
    }

    /// Attach a pending node to its parent after its first write
    fn commit(&self) {
        let Some(Origin { parent, key }) = self.lock_origin().take() else {
            return;
        };

        let attached = match &mut *parent.write() {
            Store::Mapping(map) if !map.contains_key(&key) => {
                map.insert(key.clone(), Value::Node(self.clone()));
                true
            }
            _ => false,
        };

        if attached {
            log::trace!("Committed vivified node under '{}'", key);
            parent.commit();
        } else {
            log::debug!(
                "Key '{}' was assigned before its vivified node was written; node stays detached",
                key
            );
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.shared
            .store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.shared
            .store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_origin(&self) -> MutexGuard<'_, Option<Origin>> {
        self.shared
            .origin
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn reaches(value: &Value, targets: &[DynamicNode]) -> bool {
    match value {
        Value::Node(node) => {
            targets.iter().any(|target| target.ptr_eq(node))
                || node.values().iter().any(|v| reaches(v, targets))
        }
        Value::Sequence(items) => items.iter().any(|v| reaches(v, targets)),
        Value::Mapping(map) => map.values().any(|v| reaches(v, targets)),
        _ => false,
    }
}

fn cycle_error(path: String) -> Error {
    Error::validation(path, "A node cannot be stored inside itself")
        .with_help("Store a copy made with to_plain() instead")
}

impl Default for DynamicNode {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for DynamicNode {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let (a, b) = (self.read(), other.read());
        *a == *b
    }
}

impl PartialEq<Value> for DynamicNode {
    fn eq(&self, other: &Value) -> bool {
        match other {
            Value::Node(node) => self == node,
            Value::Mapping(plain) => matches!(&*self.read(), Store::Mapping(map) if map == plain),
            Value::Sequence(plain) => {
                matches!(&*self.read(), Store::Sequence(items) if items == plain)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for DynamicNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.read() {
            Store::Mapping(map) => f.debug_tuple("DynamicNode").field(map).finish(),
            Store::Sequence(items) => f.debug_tuple("DynamicNode").field(items).finish(),
        }
    }
}

impl fmt::Display for DynamicNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_plain())
    }
}

impl Serialize for DynamicNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match &*self.read() {
            Store::Mapping(map) => map.serialize(serializer),
            Store::Sequence(items) => items.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Version {
        majority: String,
        #[serde(default = "default_sub")]
        sub: i64,
    }

    fn default_sub() -> i64 {
        1
    }

    impl TypedRecord for Version {}

    fn version(majority: &str, sub: i64) -> Version {
        Version {
            majority: majority.into(),
            sub,
        }
    }

    fn node(yaml: &str) -> DynamicNode {
        match DynamicNode::wrap(Value::from_yaml(yaml).unwrap()) {
            Value::Node(node) => node,
            other => panic!("expected a node, got {}", other.type_name()),
        }
    }

    #[test]
    fn test_wrap_is_eager_and_transitive() {
        let root = node(
            r#"
handlers:
  file:
    path: /var/log
    options: {alignment: center}
level: INFO
"#,
        );

        let handlers = root.get("handlers").unwrap();
        assert!(handlers.is_node());
        let file = root.get_path("handlers.file").unwrap();
        assert!(file.is_node());
        let options = root.get_path("handlers.file.options").unwrap();
        assert!(options.is_node());
        assert_eq!(
            root.get_path("handlers.file.path").unwrap(),
            Value::from("/var/log")
        );
        assert_eq!(root.get("level").unwrap(), Value::from("INFO"));
    }

    #[test]
    fn test_wrap_leaves_scalars_and_records() {
        assert_eq!(DynamicNode::wrap(Value::from(5)), Value::Integer(5));

        let record = Value::record(version("1", 2));
        let wrapped = DynamicNode::wrap(record.clone());
        assert!(wrapped.as_record().unwrap().ptr_eq(record.as_record().unwrap()));
    }

    #[test]
    fn test_mixed_sequence_keeps_per_element_classification() {
        let shared = Value::record(version("1", 2));
        let items = vec![
            shared.clone(),
            Value::record(version("3", 1)),
            Value::from_yaml("majority: '10'\nsub: 15").unwrap(),
            Value::from("plain"),
            Value::from_yaml("[a, {b: 1}]").unwrap(),
        ];
        let seq = DynamicNode::sequence(items, true);

        assert!(seq.is_sequence());
        assert_eq!(seq.len(), 5);

        let first = seq.index(0).unwrap();
        assert!(first.as_record().unwrap().ptr_eq(shared.as_record().unwrap()));
        assert_eq!(
            seq.index(1).unwrap().downcast_record::<Version>(),
            Some(&version("3", 1))
        );

        let third = seq.index(2).unwrap();
        assert!(third.is_node());
        assert_eq!(third.get_path("majority").unwrap(), Value::from("10"));

        assert_eq!(seq.index(3).unwrap(), Value::from("plain"));

        let nested = seq.index(4).unwrap();
        assert!(nested.is_sequence());
        assert!(nested.get_path("[1]").unwrap().is_node());
    }

    #[test]
    fn test_sequence_index_out_of_range() {
        let seq = DynamicNode::sequence(vec![Value::from(1)], true);
        let err = seq.index(3).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexOutOfRange { index: 3, len: 1 });

        let err = seq.set_index(1, 5).unwrap_err();
        assert!(err.is_index_out_of_range());
    }

    #[test]
    fn test_missing_key_vivifies_without_persisting() {
        let root = node("a: 1");

        let missing = root.get("missing").unwrap();
        let missing = missing.as_node().unwrap();
        assert!(missing.is_mapping());
        assert!(missing.is_empty());
        assert!(missing.is_pending());

        assert!(!root.contains_key("missing"));
        assert_eq!(root.keys(), vec!["a".to_string()]);
        assert_eq!(root, Value::from_yaml("a: 1").unwrap());
    }

    #[test]
    fn test_write_commits_vivified_node() {
        let root = node("a: 1");

        let rotate = root.child("rotate").unwrap();
        rotate.set("days", 7).unwrap();

        assert!(!rotate.is_pending());
        assert!(root.contains_key("rotate"));
        let reread = root.child("rotate").unwrap();
        assert!(reread.ptr_eq(&rotate));
        assert_eq!(reread.get("days").unwrap(), Value::Integer(7));
    }

    #[test]
    fn test_deep_write_commits_pending_ancestors() {
        let root = DynamicNode::new();

        let c = root
            .child("a")
            .unwrap()
            .child("b")
            .unwrap()
            .child("c")
            .unwrap();
        assert!(root.is_empty());

        c.set("d", true).unwrap();

        assert_eq!(root.get_path("a.b.c.d").unwrap(), Value::Bool(true));
        assert_eq!(root.keys(), vec!["a".to_string()]);
    }

    #[test]
    fn test_commit_skips_keys_assigned_meanwhile() {
        let root = DynamicNode::new();
        let pending = root.child("slot").unwrap();

        root.set("slot", "taken").unwrap();
        pending.set("x", 1).unwrap();

        assert_eq!(root.get("slot").unwrap(), Value::from("taken"));
        assert!(!pending.is_pending());
    }

    #[test]
    fn test_repeated_reads_return_fresh_nodes() {
        let root = DynamicNode::new();
        let first = root.child("x").unwrap();
        let second = root.child("x").unwrap();
        assert!(!first.ptr_eq(&second));
    }

    #[test]
    fn test_mutation_is_visible_through_aliases() {
        let root = node("logging: {level: INFO}");

        let alias = root.child("logging").unwrap();
        alias.set("level", "ERROR").unwrap();

        assert_eq!(alias.get("level").unwrap(), Value::from("ERROR"));
        assert_eq!(
            root.get_path("logging.level").unwrap(),
            Value::from("ERROR")
        );

        let clone = root.clone();
        clone.remove("logging");
        assert!(!root.contains_key("logging"));
    }

    #[test]
    fn test_set_wraps_raw_mappings() {
        let root = DynamicNode::new();
        root.set("db", Value::from_yaml("host: localhost\nreplicas: [{id: 1}]").unwrap())
            .unwrap();

        let db = root.get("db").unwrap();
        assert!(db.is_node());
        assert!(db.get_path("replicas").unwrap().is_node());
        assert!(db.get_path("replicas[0]").unwrap().is_node());
    }

    #[test]
    fn test_set_stores_records_verbatim() {
        let root = DynamicNode::new();
        root.set("version", Value::record(version("2", 5))).unwrap();

        let value = root.get("version").unwrap();
        assert_eq!(value.downcast_record::<Version>(), Some(&version("2", 5)));
        assert_eq!(root.record::<Version>("version").unwrap(), version("2", 5));
    }

    #[test]
    fn test_record_extracts_dynamic_mapping_on_demand() {
        let root = node("version2: {majority: '10', sub: 15}\nbad: {sub: 1}\nlevel: INFO");

        assert_eq!(root.record::<Version>("version2").unwrap(), version("10", 15));
        // The stored value stays dynamic
        assert!(root.get("version2").unwrap().is_node());

        let err = root.record::<Version>("bad").unwrap_err();
        assert!(err.is_missing_field());
        assert_eq!(err.path.as_deref(), Some("bad.majority"));

        let err = root.record::<Version>("level").unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[test]
    fn test_self_assignment_is_rejected() {
        let root = node("a: {b: 1}");

        let err = root.set("me", root.clone()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.path.as_deref(), Some("me"));
        assert!(!root.contains_key("me"));

        // Through a descendant
        let a = root.child("a").unwrap();
        assert!(a.set("up", root.clone()).is_err());

        // Nested inside a raw mapping
        let mut wrapper = IndexMap::new();
        wrapper.insert("inner".to_string(), Value::Node(root.clone()));
        assert!(a.set("wrapped", Value::Mapping(wrapper)).is_err());

        let seq = DynamicNode::sequence(vec![Value::from(1)], true);
        assert!(seq.push(seq.clone()).is_err());
        assert!(seq.set_index(0, seq.clone()).is_err());
        assert_eq!(seq.len(), 1);

        // Plain copies and sibling aliases are fine
        a.set("copy", root.to_plain()).unwrap();
        root.set("alias", a.clone()).unwrap();
        assert_eq!(root.get_path("alias.b").unwrap(), Value::Integer(1));
        assert!(!root.to_string().is_empty());
    }

    #[test]
    fn test_assignment_into_pending_ancestor_is_rejected() {
        let root = DynamicNode::new();
        let pending = root.child("x").unwrap();

        assert!(pending.set("back", root.clone()).is_err());
        assert!(!root.contains_key("x"));
        assert!(pending.is_pending());
    }

    #[test]
    fn test_auto_vivify_disabled() {
        let root = DynamicNode::mapping(IndexMap::new(), false);
        let err = root.get("missing").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PathNotFound);

        root.set("nested", Value::from_yaml("a: 1").unwrap()).unwrap();
        let nested = root.child("nested").unwrap();
        assert!(!nested.auto_vivify());
        assert!(nested.get("b").is_err());
    }

    #[test]
    fn test_key_access_on_sequence_is_type_mismatch() {
        let seq = DynamicNode::sequence(vec![], true);
        assert!(seq.get("a").unwrap_err().is_type_mismatch());
        assert!(seq.set("a", 1).unwrap_err().is_type_mismatch());
        assert!(!seq.contains_key("a"));
        assert_eq!(seq.remove("a"), None);

        let map = DynamicNode::new();
        assert!(map.index(0).unwrap_err().is_type_mismatch());
        assert!(map.push(1).unwrap_err().is_type_mismatch());
    }

    #[test]
    fn test_push_and_set_index() {
        let seq = DynamicNode::sequence(vec![Value::from(1)], true);
        seq.push(Value::from_yaml("a: 1").unwrap()).unwrap();
        seq.set_index(0, "first").unwrap();

        assert_eq!(seq.index(0).unwrap(), Value::from("first"));
        assert!(seq.index(1).unwrap().is_node());
        assert_eq!(seq.values().len(), 2);
    }

    #[test]
    fn test_iteration_preserves_order() {
        let root = node("z: 1\na: 2\nm: 3");
        assert_eq!(root.keys(), vec!["z", "a", "m"]);
        let entries = root.entries();
        assert_eq!(entries[1], ("a".to_string(), Value::Integer(2)));
        assert_eq!(
            root.values(),
            vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
        );
    }

    #[test]
    fn test_equality_against_plain_values() {
        let raw = Value::from_yaml("a: {b: 1}\nlist: [1, 2]").unwrap();
        let root = node("a: {b: 1}\nlist: [1, 2]");

        assert_eq!(root, raw);
        assert_eq!(root, node("list: [1, 2]\na: {b: 1}"));
        assert_ne!(root, Value::from_yaml("a: {b: 2}\nlist: [1, 2]").unwrap());
        assert_ne!(root, Value::from_yaml("[1, 2]").unwrap());
    }

    #[test]
    fn test_to_plain_and_serialize() {
        let root = node("a: {b: [1, {c: 2}]}");
        root.set("version", Value::record(version("1", 2))).unwrap();

        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "a": {"b": [1, {"c": 2}]},
                "version": {"majority": "1", "sub": 2}
            })
        );

        let plain = root.to_plain();
        assert!(plain.get_path("a.b").unwrap().as_sequence().is_some());
        assert!(plain.get_path("version").unwrap().is_record());
    }

    #[test]
    fn test_display_and_debug() {
        let root = node("a: 1");
        assert_eq!(root.to_string(), "{a: 1}");
        assert_eq!(DynamicNode::new().to_string(), "{}");
        assert!(format!("{:?}", root).starts_with("DynamicNode("));
    }

    #[test]
    fn test_node_round_trips_through_deserialize() {
        let root = node("a: {b: 1}");
        let yaml = serde_yaml::to_string(&root).unwrap();
        let back = Value::deserialize(serde_yaml::Deserializer::from_str(&yaml)).unwrap();
        assert_eq!(root, back);
    }

    #[test]
    fn test_node_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DynamicNode>();
        assert_send_sync::<Value>();
    }

    #[test]
    fn test_concurrent_readers() {
        let root = node("a: {b: 1}");
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let root = root.clone();
                std::thread::spawn(move || root.get_path("a.b").unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Value::Integer(1));
        }
    }
}
