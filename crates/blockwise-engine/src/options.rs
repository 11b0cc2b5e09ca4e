use serde::{Deserialize, Serialize};

/// What happens when a removal would leave the document with zero blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastBlockPolicy {
    /// Reset the document to a single fresh default block.
    #[default]
    Clear,
    /// Leave the document untouched and return `EditorError::LastBlock`.
    Reject,
}

/// How `load` treats a record whose type is not registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTypePolicy {
    /// Keep the record; it renders as an inert placeholder.
    #[default]
    Placeholder,
    /// Fail the whole load with `EditorError::UnknownBlockType`.
    Reject,
    /// Discard the record and log a warning.
    Drop,
}

/// Editor behaviour knobs, usually read from the `[editor]` table of the
/// configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// Overrides the registry's default block type (the first registered one).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_block_type: Option<String>,
    pub last_block_policy: LastBlockPolicy,
    pub unknown_type_policy: UnknownTypePolicy,
}
