use std::path::{Component, Path, PathBuf};

use crate::io::lock::LockError;

/// Recognized backing document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Linear markdown text
    Markdown,
    /// Node-graph canvas (JSON)
    Canvas,
}

impl DocumentKind {
    /// Classify a document path by extension
    pub fn of(path: &str) -> Option<DocumentKind> {
        let ext = path.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase())?;
        match ext.as_str() {
            "md" => Some(DocumentKind::Markdown),
            "canvas" => Some(DocumentKind::Canvas),
            _ => None,
        }
    }
}

pub fn is_canvas_path(path: &str) -> bool {
    DocumentKind::of(path) == Some(DocumentKind::Canvas)
}

/// Whether two vault-relative paths name the same document, ignoring `.`
/// components and doubled separators.
pub fn same_document(a: &str, b: &str) -> bool {
    Path::new(a)
        .components()
        .filter(|c| *c != Component::CurDir)
        .eq(Path::new(b).components().filter(|c| *c != Component::CurDir))
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("not a recognized document type: {0}")]
    Unsupported(String),
    #[error("invalid document path: {0}")]
    InvalidPath(String),
    #[error("document already exists: {0}")]
    AlreadyExists(String),
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("update of {0} was not applied")]
    NotApplied(String),
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// The storage primitives the engine relies on.
///
/// `process` is the atomic update: the callback receives the full current
/// text and returns the full new text. If the callback errs nothing is
/// written, and no other write lands between the read and the write.
pub trait DocumentStore {
    fn exists(&self, path: &str) -> bool;

    fn read(&self, path: &str) -> Result<String, StoreError>;

    /// Create a new document. Fails if it already exists.
    fn create(&self, path: &str, initial: &str) -> Result<(), StoreError>;

    fn process<F, E>(&self, path: &str, f: F) -> Result<(), E>
    where
        F: FnOnce(&str) -> Result<String, E>,
        E: From<StoreError>;
}

/// Ensure `path` names an existing document of a recognized kind.
pub fn resolve_document<S: DocumentStore>(
    store: &S,
    path: &str,
) -> Result<DocumentKind, StoreError> {
    let kind = DocumentKind::of(path).ok_or_else(|| StoreError::Unsupported(path.to_string()))?;
    if !store.exists(path) {
        return Err(StoreError::NotFound(path.to_string()));
    }
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_by_extension() {
        assert_eq!(DocumentKind::of("notes/today.md"), Some(DocumentKind::Markdown));
        assert_eq!(DocumentKind::of("Board.CANVAS"), Some(DocumentKind::Canvas));
        assert_eq!(DocumentKind::of("image.png"), None);
        assert_eq!(DocumentKind::of("README"), None);
        assert!(is_canvas_path("plans/q1.canvas"));
        assert!(!is_canvas_path("plans/q1.md"));
    }

    #[test]
    fn same_document_ignores_dot_segments() {
        assert!(same_document("a.md", "./a.md"));
        assert!(same_document("notes/./t.md", "notes//t.md"));
        assert!(!same_document("a.md", "notes/a.md"));
        assert!(!same_document("a.md", "A.md"));
    }
}
