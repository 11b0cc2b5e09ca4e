use serde_json::{Value, json};

use crate::blocks::str_field;
use crate::registry::{BlockImplementation, Icon};

/// Plain text block. `{ "text": "..." }`
///
/// The default block kind: Enter, `clear()` and new documents create one.
pub struct Paragraph;

impl Paragraph {
    pub const TYPE: &'static str = "paragraph";
}

impl BlockImplementation for Paragraph {
    fn block_type(&self) -> &str {
        Self::TYPE
    }

    fn icon(&self) -> Icon {
        Icon::new("Paragraph", "¶")
    }

    fn default_value(&self) -> Value {
        json!({ "text": "" })
    }

    fn is_empty(&self, data: &Value) -> bool {
        str_field(data, "text").is_empty()
    }

    fn export_text(&self, data: &Value) -> Option<String> {
        Some(str_field(data, "text").to_string())
    }

    fn import_text(&self, text: &str) -> Option<Value> {
        Some(json!({ "text": text }))
    }
}
