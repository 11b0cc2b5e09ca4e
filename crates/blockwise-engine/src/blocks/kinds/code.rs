use serde_json::{Value, json};

use crate::blocks::{str_field, with_field};
use crate::registry::{BlockImplementation, Icon};

/// Code listing. `{ "value": "...", "lang": "rust" }`
pub struct Code;

impl Code {
    pub const TYPE: &'static str = "code";

    /// Language tag, if one was set.
    pub fn lang(data: &Value) -> Option<&str> {
        data.get("lang")
            .and_then(Value::as_str)
            .filter(|lang| !lang.is_empty())
    }
}

impl BlockImplementation for Code {
    fn block_type(&self) -> &str {
        Self::TYPE
    }

    fn icon(&self) -> Icon {
        Icon::new("Code Block", "</>")
    }

    fn default_value(&self) -> Value {
        json!({ "value": "" })
    }

    fn is_empty(&self, data: &Value) -> bool {
        str_field(data, "value").trim().is_empty()
    }

    fn export_text(&self, data: &Value) -> Option<String> {
        Some(str_field(data, "value").to_string())
    }

    fn import_text(&self, text: &str) -> Option<Value> {
        Some(json!({ "value": text }))
    }

    fn edit_text(&self, data: &Value, text: &str) -> Option<Value> {
        Some(with_field(data, "value", text.into()))
    }
}
