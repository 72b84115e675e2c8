use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use crate::io::store::{DocumentStore, StoreError};

type WriteHook = Box<dyn Fn(&str, &str)>;

/// In-process document store. Useful for embedding and for tests: it can
/// refuse creation of chosen paths and run a hook just before each write
/// commits, standing in for a slow storage layer.
#[derive(Default)]
pub struct MemoryStore {
    docs: RefCell<BTreeMap<String, String>>,
    deny_create: RefCell<HashSet<String>>,
    on_write: Option<WriteHook>,
    writes: RefCell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(self, path: &str, content: &str) -> Self {
        self.docs
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        self
    }

    /// Make `create(path, ..)` fail as if the path were invalid
    pub fn deny_create(self, path: &str) -> Self {
        self.deny_create.borrow_mut().insert(path.to_string());
        self
    }

    /// Run `hook(path, new_content)` before each write is committed
    pub fn on_write(mut self, hook: impl Fn(&str, &str) + 'static) -> Self {
        self.on_write = Some(Box::new(hook));
        self
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.docs.borrow().get(path).cloned()
    }

    /// Number of committed writes (creates included)
    pub fn write_count(&self) -> usize {
        *self.writes.borrow()
    }

    fn commit(&self, path: &str, content: String) {
        if let Some(hook) = &self.on_write {
            hook(path, &content);
        }
        self.docs.borrow_mut().insert(path.to_string(), content);
        *self.writes.borrow_mut() += 1;
    }
}

impl DocumentStore for MemoryStore {
    fn exists(&self, path: &str) -> bool {
        self.docs.borrow().contains_key(path)
    }

    fn read(&self, path: &str) -> Result<String, StoreError> {
        self.get(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn create(&self, path: &str, initial: &str) -> Result<(), StoreError> {
        if self.deny_create.borrow().contains(path) {
            return Err(StoreError::Write {
                path: PathBuf::from(path),
                source: std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "creation refused",
                ),
            });
        }
        if self.exists(path) {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        self.commit(path, initial.to_string());
        Ok(())
    }

    fn process<F, E>(&self, path: &str, f: F) -> Result<(), E>
    where
        F: FnOnce(&str) -> Result<String, E>,
        E: From<StoreError>,
    {
        let current = self.read(path)?;
        let updated = f(&current)?;
        if updated != current {
            self.commit(path, updated);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn hook_sees_content_before_commit() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let store = MemoryStore::new()
            .with_doc("a.md", "old")
            .on_write(move |path, content| {
                sink.borrow_mut().push(format!("{path}={content}"));
            });

        store
            .process("a.md", |_| Ok::<_, StoreError>("new".to_string()))
            .unwrap();
        assert_eq!(*seen.borrow(), vec!["a.md=new"]);
        assert_eq!(store.get("a.md").as_deref(), Some("new"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn unchanged_content_is_not_written() {
        let store = MemoryStore::new().with_doc("a.md", "same");
        store
            .process("a.md", |t| Ok::<_, StoreError>(t.to_string()))
            .unwrap();
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn denied_create_fails() {
        let store = MemoryStore::new().deny_create("bad.md");
        assert!(store.create("bad.md", "").is_err());
        assert!(!store.exists("bad.md"));
        assert!(store.create("good.md", "").is_ok());
    }
}
