use serde_json::{Value, json};

use crate::blocks::{str_field, with_field};
use crate::registry::{BlockImplementation, Icon};

/// Section heading. `{ "text": "...", "level": 1..=6 }`
pub struct Header;

impl Header {
    pub const TYPE: &'static str = "header";
    pub const DEFAULT_LEVEL: u64 = 2;

    /// Heading level, clamped to 1..=6.
    pub fn level(data: &Value) -> u8 {
        let level = data
            .get("level")
            .and_then(Value::as_u64)
            .unwrap_or(Self::DEFAULT_LEVEL);
        level.clamp(1, 6) as u8
    }
}

impl BlockImplementation for Header {
    fn block_type(&self) -> &str {
        Self::TYPE
    }

    fn icon(&self) -> Icon {
        Icon::new("Heading", "H")
    }

    fn default_value(&self) -> Value {
        json!({ "text": "", "level": Self::DEFAULT_LEVEL })
    }

    fn is_empty(&self, data: &Value) -> bool {
        str_field(data, "text").trim().is_empty()
    }

    fn export_text(&self, data: &Value) -> Option<String> {
        Some(str_field(data, "text").to_string())
    }

    fn import_text(&self, text: &str) -> Option<Value> {
        Some(json!({ "text": text, "level": Self::DEFAULT_LEVEL }))
    }

    fn edit_text(&self, data: &Value, text: &str) -> Option<Value> {
        Some(with_field(data, "text", text.into()))
    }
}
