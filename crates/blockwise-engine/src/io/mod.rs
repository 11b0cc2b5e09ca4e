use crate::editing::store::BlockRecord;
use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of persisted block documents.
pub const DOCUMENT_EXTENSION: &str = "json";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed document {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid documents directory: {0}")]
    InvalidDocumentsDir(String),
}

/// Read a persisted document: a JSON array of `{id, type, data}` records.
pub fn read_document(
    relative_path: &RelativePath,
    documents_root: &Path,
) -> Result<Vec<BlockRecord>, IoError> {
    let absolute_path = relative_path.to_path(documents_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    let content = fs::read_to_string(&absolute_path)?;
    serde_json::from_str(&content).map_err(|source| IoError::Malformed {
        path: absolute_path,
        source,
    })
}

/// Write records as a pretty-printed JSON document
pub fn write_document(
    relative_path: &RelativePath,
    documents_root: &Path,
    records: &[BlockRecord],
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(documents_root);

    // Create parent directories if they don't exist
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(records).map_err(|source| IoError::Malformed {
        path: absolute_path.clone(),
        source,
    })?;
    fs::write(&absolute_path, content).map_err(IoError::Io)
}

/// Find every document below the documents root, sorted by path.
pub fn scan_documents(documents_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !documents_root.exists() {
        return Err(IoError::InvalidDocumentsDir(
            "documents directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    scan_directory_recursive(documents_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == DOCUMENT_EXTENSION
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_documents_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidDocumentsDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}
