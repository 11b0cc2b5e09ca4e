use serde_json::{Value, json};

use crate::blocks::{str_field, with_field};
use crate::registry::{BlockImplementation, Icon};

/// Quotation with optional attribution. `{ "text": "...", "caption": "..." }`
pub struct Quote;

impl Quote {
    pub const TYPE: &'static str = "quote";
}

impl BlockImplementation for Quote {
    fn block_type(&self) -> &str {
        Self::TYPE
    }

    fn icon(&self) -> Icon {
        Icon::new("Quote", "❝")
    }

    fn default_value(&self) -> Value {
        json!({ "text": "", "caption": "" })
    }

    fn is_empty(&self, data: &Value) -> bool {
        str_field(data, "text").trim().is_empty() && str_field(data, "caption").trim().is_empty()
    }

    fn export_text(&self, data: &Value) -> Option<String> {
        Some(str_field(data, "text").to_string())
    }

    fn import_text(&self, text: &str) -> Option<Value> {
        Some(json!({ "text": text, "caption": "" }))
    }

    fn edit_text(&self, data: &Value, text: &str) -> Option<Value> {
        Some(with_field(data, "text", text.into()))
    }
}
