//! Shared helpers for unit tests.

use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::blocks::builtin_registry;
use crate::{BlockId, BlockRecord, Editor, EditorOptions};

pub fn create_test_documents_dir() -> TempDir {
    TempDir::new().unwrap()
}

pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Record with a fresh id.
pub fn record(block_type: &str, data: Value) -> BlockRecord {
    BlockRecord {
        id: BlockId::new(),
        block_type: block_type.to_string(),
        data,
    }
}

/// Editor over the built-in registry with default options.
pub fn editor_with(records: Vec<BlockRecord>) -> Editor {
    Editor::with_records(builtin_registry(), EditorOptions::default(), records).unwrap()
}
