use serde_json::{Value, json};

use crate::registry::{BlockImplementation, Icon};

/// Horizontal separator. Carries no data, so the default no-own-keys
/// emptiness applies.
pub struct Delimiter;

impl Delimiter {
    pub const TYPE: &'static str = "delimiter";
}

impl BlockImplementation for Delimiter {
    fn block_type(&self) -> &str {
        Self::TYPE
    }

    fn icon(&self) -> Icon {
        Icon::new("Delimiter", "—")
    }

    fn default_value(&self) -> Value {
        json!({})
    }
}
