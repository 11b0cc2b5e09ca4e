use serde_json::{Value, json};

use crate::blocks::with_field;
use crate::registry::{BlockImplementation, Icon};

/// Bulleted or numbered list. `{ "style": "unordered" | "ordered", "items": [..] }`
///
/// Plain text form is one item per line.
pub struct List;

impl List {
    pub const TYPE: &'static str = "list";

    pub fn items(data: &Value) -> Vec<&str> {
        data.get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_ordered(data: &Value) -> bool {
        data.get("style").and_then(Value::as_str) == Some("ordered")
    }
}

impl BlockImplementation for List {
    fn block_type(&self) -> &str {
        Self::TYPE
    }

    fn icon(&self) -> Icon {
        Icon::new("List", "•")
    }

    fn default_value(&self) -> Value {
        json!({ "style": "unordered", "items": [""] })
    }

    fn is_empty(&self, data: &Value) -> bool {
        Self::items(data).iter().all(|item| item.trim().is_empty())
    }

    fn export_text(&self, data: &Value) -> Option<String> {
        Some(Self::items(data).join("\n"))
    }

    fn import_text(&self, text: &str) -> Option<Value> {
        let items: Vec<&str> = text.split('\n').collect();
        Some(json!({ "style": "unordered", "items": items }))
    }

    fn edit_text(&self, data: &Value, text: &str) -> Option<Value> {
        let items: Vec<&str> = text.split('\n').collect();
        Some(with_field(data, "items", json!(items)))
    }
}
