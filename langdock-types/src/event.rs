use std::path::{Path, PathBuf};

pub const FILE_SCHEME: &str = "file";

/// Where an activation came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentMeta {
    pub path: PathBuf,
    pub scheme: String,
}

impl DocumentMeta {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DocumentMeta {
            path: path.into(),
            scheme: FILE_SCHEME.to_string(),
        }
    }

    pub fn is_file(&self) -> bool {
        self.scheme == FILE_SCHEME
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// "A document of `category` is now open." The category is the raw id as
/// reported by the front end and may not be one the broker knows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivationEvent {
    pub category: String,
    pub metadata: DocumentMeta,
}

impl ActivationEvent {
    pub fn new(category: impl Into<String>, metadata: DocumentMeta) -> Self {
        ActivationEvent {
            category: category.into(),
            metadata,
        }
    }
}
