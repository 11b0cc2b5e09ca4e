//! # Built-in Blocks
//!
//! The block kinds every editor starts with. Each one lives in its own module
//! under `kinds` and implements [`BlockImplementation`]; none of them is
//! special to the engine; they are registered exactly like third-party kinds.
//!
//! `paragraph` is registered first and therefore becomes the registry default.

pub mod kinds;

pub use kinds::{Code, Delimiter, Header, List, Paragraph, Quote};

use crate::registry::BlockRegistry;
use serde_json::Value;

/// Registry pre-populated with the built-in block kinds.
pub fn builtin_registry() -> BlockRegistry {
    let mut registry = BlockRegistry::new();
    registry
        .register(Paragraph)
        .register(Header)
        .register(List)
        .register(Quote)
        .register(Code)
        .register(Delimiter);
    registry
}

/// Read a string field, treating anything else as empty.
pub(crate) fn str_field<'a>(data: &'a Value, key: &str) -> &'a str {
    data.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Copy of `data` with `key` set. Non-object data is replaced outright.
pub(crate) fn with_field(data: &Value, key: &str, value: Value) -> Value {
    let mut map = match data {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    map.insert(key.to_string(), value);
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_registry_order_and_default() {
        let registry = builtin_registry();
        let types: Vec<_> = registry.types().collect();
        assert_eq!(
            types,
            vec!["paragraph", "header", "list", "quote", "code", "delimiter"]
        );
        assert_eq!(registry.default_type(), Some("paragraph"));
    }

    #[test]
    fn test_every_default_value_is_empty() {
        let registry = builtin_registry();
        for entry in registry.list() {
            assert!(
                entry.is_empty(&entry.default_value()),
                "default value emptiness for {}",
                entry.block_type()
            );
        }
    }
}
