//! # Block Registry
//!
//! Maps a block type key to the [`BlockImplementation`] that knows how to
//! create, test and (optionally) convert that kind of block. The rest of the
//! engine only ever talks to blocks through this trait, so new block types
//! can be added by registering them at editor setup without the core knowing
//! anything about them.
//!
//! Registration order is preserved and drives insert menus. Registering the
//! same type twice replaces the earlier entry in place.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{EditorError, Result};

/// Display metadata for insert menus. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub text: String,
    pub symbol: String,
}

impl Icon {
    pub fn new(text: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            symbol: symbol.into(),
        }
    }
}

/// Contract every block kind implements.
///
/// The engine calls `default_value` when it materialises a new block and
/// `is_empty` when deciding whether Backspace may delete the block. It never
/// looks inside `data` otherwise.
pub trait BlockImplementation: Send + Sync {
    /// Registry key, e.g. `"paragraph"`.
    fn block_type(&self) -> &str;

    fn icon(&self) -> Icon;

    /// Data template for freshly created blocks of this type.
    fn default_value(&self) -> Value;

    /// Defaults to "no own keys" when a block kind has nothing better to say.
    fn is_empty(&self, data: &Value) -> bool {
        has_no_own_keys(data)
    }

    /// Serialization hook: the block's content as plain text, if it has any.
    fn export_text(&self, _data: &Value) -> Option<String> {
        None
    }

    /// Serialization hook: build block data from plain text.
    fn import_text(&self, _text: &str) -> Option<Value> {
        None
    }

    /// Rewrite the text of existing `data`, keeping whatever else the block
    /// stores. Defaults to `import_text`.
    fn edit_text(&self, _data: &Value, text: &str) -> Option<Value> {
        self.import_text(text)
    }
}

impl fmt::Debug for dyn BlockImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockImplementation({})", self.block_type())
    }
}

/// Emptiness predicate used when a block kind supplies none, or when the
/// block's type cannot be resolved at all.
pub fn has_no_own_keys(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Shared handle to a registered block kind.
pub type BlockEntry = Arc<dyn BlockImplementation>;

#[derive(Default, Clone)]
pub struct BlockRegistry {
    entries: Vec<BlockEntry>,
    positions: HashMap<String, usize>,
    default_type: Option<String>,
}

impl fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockRegistry")
            .field("types", &self.types().collect::<Vec<_>>())
            .field("default_type", &self.default_type())
            .finish()
    }
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block kind. The last registration for a type wins but keeps
    /// the position of the first one.
    pub fn register(&mut self, entry: impl BlockImplementation + 'static) -> &mut Self {
        self.register_arc(Arc::new(entry))
    }

    pub fn register_arc(&mut self, entry: BlockEntry) -> &mut Self {
        let key = entry.block_type().to_string();
        match self.positions.get(&key) {
            Some(&position) => {
                log::debug!("replacing block implementation for type '{key}'");
                self.entries[position] = entry;
            }
            None => {
                self.positions.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
        self
    }

    /// Remove a block kind. Returns the removed entry, if any.
    pub fn unregister(&mut self, block_type: &str) -> Option<BlockEntry> {
        let position = self.positions.remove(block_type)?;
        let removed = self.entries.remove(position);
        for index in self.positions.values_mut() {
            if *index > position {
                *index -= 1;
            }
        }
        if self.default_type.as_deref() == Some(block_type) {
            self.default_type = None;
        }
        Some(removed)
    }

    pub fn get(&self, block_type: &str) -> Result<&BlockEntry> {
        self.positions
            .get(block_type)
            .map(|&position| &self.entries[position])
            .ok_or_else(|| EditorError::UnknownBlockType(block_type.to_string()))
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.positions.contains_key(block_type)
    }

    /// Entries in registration order.
    pub fn list(&self) -> &[BlockEntry] {
        &self.entries
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.block_type())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delegate to the entry's emptiness predicate.
    pub fn is_block_empty(&self, block_type: &str, data: &Value) -> Result<bool> {
        Ok(self.get(block_type)?.is_empty(data))
    }

    /// Pick the type used for `clear()`, Enter and new documents.
    pub fn set_default_type(&mut self, block_type: &str) -> Result<()> {
        if !self.contains(block_type) {
            return Err(EditorError::UnknownBlockType(block_type.to_string()));
        }
        self.default_type = Some(block_type.to_string());
        Ok(())
    }

    /// The explicitly chosen default, falling back to the first registration.
    pub fn default_type(&self) -> Option<&str> {
        self.default_type
            .as_deref()
            .or_else(|| self.entries.first().map(|entry| entry.block_type()))
    }

    pub fn default_entry(&self) -> Result<&BlockEntry> {
        let block_type = self.default_type().ok_or(EditorError::NoDefaultBlock)?;
        self.get(block_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{Code, Header, Paragraph};
    use serde_json::json;

    struct Bare;

    impl BlockImplementation for Bare {
        fn block_type(&self) -> &str {
            "bare"
        }

        fn icon(&self) -> Icon {
            Icon::new("Bare", "?")
        }

        fn default_value(&self) -> Value {
            json!({})
        }
    }

    struct LoudParagraph;

    impl BlockImplementation for LoudParagraph {
        fn block_type(&self) -> &str {
            "paragraph"
        }

        fn icon(&self) -> Icon {
            Icon::new("LOUD", "!")
        }

        fn default_value(&self) -> Value {
            json!({ "text": "" })
        }
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let mut registry = BlockRegistry::new();
        registry.register(Header).register(Paragraph).register(Code);

        let types: Vec<_> = registry.types().collect();
        assert_eq!(types, vec!["header", "paragraph", "code"]);
    }

    #[test]
    fn test_reregistration_replaces_in_place() {
        let mut registry = BlockRegistry::new();
        registry
            .register(Paragraph)
            .register(Header)
            .register(LoudParagraph);

        assert_eq!(registry.len(), 2);
        let types: Vec<_> = registry.types().collect();
        assert_eq!(types, vec!["paragraph", "header"]);
        assert_eq!(registry.get("paragraph").unwrap().icon().text, "LOUD");
    }

    #[test]
    fn test_get_unknown_type_fails() {
        let registry = BlockRegistry::new();
        let err = registry.get("unknown").err().unwrap();
        assert!(matches!(err, EditorError::UnknownBlockType(t) if t == "unknown"));
    }

    #[test]
    fn test_is_empty_defaults_to_no_own_keys() {
        let mut registry = BlockRegistry::new();
        registry.register(Bare);

        assert!(registry.is_block_empty("bare", &json!({})).unwrap());
        assert!(!registry.is_block_empty("bare", &json!({ "x": "" })).unwrap());
        assert!(registry.is_block_empty("missing", &json!({})).is_err());
    }

    #[test]
    fn test_default_type_falls_back_to_first_registration() {
        let mut registry = BlockRegistry::new();
        assert!(matches!(
            registry.default_entry().err().unwrap(),
            EditorError::NoDefaultBlock
        ));

        registry.register(Header).register(Paragraph);
        assert_eq!(registry.default_type(), Some("header"));

        registry.set_default_type("paragraph").unwrap();
        assert_eq!(registry.default_type(), Some("paragraph"));
        assert!(registry.set_default_type("nope").is_err());
    }

    #[test]
    fn test_unregister_keeps_remaining_lookups_valid() {
        let mut registry = BlockRegistry::new();
        registry.register(Paragraph).register(Header).register(Code);
        registry.set_default_type("header").unwrap();

        assert!(registry.unregister("header").is_some());
        assert!(registry.unregister("header").is_none());

        assert_eq!(registry.get("code").unwrap().block_type(), "code");
        assert_eq!(registry.default_type(), Some("paragraph"));
    }
}
