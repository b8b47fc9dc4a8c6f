use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use langdock_types::{ActivationEvent, DocumentMeta};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::config::CategoryTable;
use crate::runtime::source::ActivationSource;

#[derive(Default)]
struct Documents {
    open: BTreeMap<PathBuf, ActivationEvent>,
    subscribers: Vec<UnboundedSender<ActivationEvent>>,
}

/// In-memory record of open documents, standing in for the editor front
/// end. Every open of a `file` document is published to subscribers.
#[derive(Clone)]
pub struct DocumentTracker {
    table: Arc<CategoryTable>,
    documents: Arc<Mutex<Documents>>,
}

impl DocumentTracker {
    pub fn new(table: Arc<CategoryTable>) -> Self {
        Self {
            table,
            documents: Arc::new(Mutex::new(Documents::default())),
        }
    }

    fn documents(&self) -> MutexGuard<'_, Documents> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a file document, classifying it by extension. Returns `None`
    /// when no category claims the extension.
    pub fn open(&self, path: impl Into<PathBuf>) -> Option<ActivationEvent> {
        let path = path.into();
        let Some(category) = self.table.category_for_path(&path) else {
            debug!(document = %path.display(), "no category for document");
            return None;
        };
        let category = category.to_string();
        self.open_with(category, DocumentMeta::file(path))
    }

    /// Opens a document whose category the caller already knows. Documents
    /// that are not on the `file` scheme are not tracked.
    pub fn open_with(
        &self,
        category: impl Into<String>,
        metadata: DocumentMeta,
    ) -> Option<ActivationEvent> {
        if !metadata.is_file() {
            debug!(scheme = %metadata.scheme, "ignoring non-file document");
            return None;
        }

        let event = ActivationEvent::new(category, metadata);
        let mut documents = self.documents();
        documents
            .open
            .insert(event.metadata.path.clone(), event.clone());
        documents
            .subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
        Some(event)
    }

    pub fn close(&self, path: &Path) -> bool {
        self.documents().open.remove(path).is_some()
    }

    pub fn open_documents(&self) -> usize {
        self.documents().open.len()
    }
}

impl ActivationSource for DocumentTracker {
    fn subscribe(&self) -> UnboundedReceiver<ActivationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.documents().subscribers.push(tx);
        rx
    }

    fn current(&self) -> Vec<ActivationEvent> {
        self.documents().open.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> DocumentTracker {
        DocumentTracker::new(Arc::new(CategoryTable::default()))
    }

    #[test]
    fn open_classifies_by_extension() {
        let tracker = tracker();
        let event = tracker.open("/w/src/main.rs").expect("rust file");
        assert_eq!(event.category, "rust");
        assert_eq!(event.metadata, DocumentMeta::file("/w/src/main.rs"));
        assert!(tracker.open("/w/notes.txt").is_none());
        assert_eq!(tracker.open_documents(), 1);
    }

    #[test]
    fn non_file_documents_are_ignored() {
        let tracker = tracker();
        let meta = DocumentMeta {
            path: PathBuf::from("main.rs"),
            scheme: "untitled".to_string(),
        };
        assert!(tracker.open_with("rust", meta).is_none());
        assert!(tracker.current().is_empty());
    }

    #[test]
    fn subscribers_see_new_documents_and_current_replays_open_ones() {
        let tracker = tracker();
        tracker.open("a.rs");
        let mut rx = tracker.subscribe();
        tracker.open_with("cobol", DocumentMeta::file("b.cbl"));

        let event = rx.try_recv().expect("published");
        assert_eq!(event.category, "cobol");
        assert!(rx.try_recv().is_err());

        let replay: Vec<_> = tracker.current().into_iter().map(|e| e.category).collect();
        assert_eq!(replay, vec!["rust".to_string(), "cobol".to_string()]);

        assert!(tracker.close(Path::new("a.rs")));
        assert!(!tracker.close(Path::new("a.rs")));
        assert_eq!(tracker.open_documents(), 1);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let tracker = tracker();
        drop(tracker.subscribe());
        tracker.open("a.rs");
        assert!(tracker.documents().subscribers.is_empty());
    }
}
