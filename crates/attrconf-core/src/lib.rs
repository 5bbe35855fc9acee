//! attrconf-core: Typed configuration records with dynamic, attribute-style extras
//!
//! A configuration root declares the fields it knows about as a serde record.
//! Those fields are validated strictly. Every other top-level field is kept
//! and converted into a [`DynamicNode`], an auto-vivifying tree that can be
//! navigated and mutated freely. Records placed inside the dynamic tree are
//! never rewrapped.
//!
//! # Example
//!
//! ```rust
//! use attrconf_core::{RootConfig, TypedRecord, Value};
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
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct AppConfig {
//!     db: DbConfig,
//! }
//!
//! impl TypedRecord for AppConfig {}
//!
//! let yaml = r#"
//! db:
//!   host: localhost
//! logging:
//!   level: INFO
//! "#;
//!
//! let config = RootConfig::<AppConfig>::from_yaml(yaml).unwrap();
//! assert_eq!(config.db.port, 5432);
//!
//! let logging = config.dynamic("logging").unwrap();
//! logging.child("handlers").unwrap().set("file", "/var/log").unwrap();
//! assert_eq!(
//!     config.get_path("logging.handlers.file").unwrap(),
//!     Value::from("/var/log")
//! );
//! ```

pub mod convert;
pub mod de;
pub mod error;
pub mod node;
pub mod record;
pub mod value;

mod config;

pub use config::{ConfigOptions, RootConfig, SequencePolicy};
pub use error::{Error, ErrorKind, Result};
pub use node::DynamicNode;
pub use record::{declared_fields, Record, RecordRef, TypedRecord};
pub use value::Value;
