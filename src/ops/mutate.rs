use crate::io::store::{DocumentStore, StoreError};
use crate::parse::{join_lines, split_lines};

/// Read, edit and write one document as a single unit.
///
/// `edit` gets the snapshot text and its lines; every location lookup for
/// the operation must happen inside it, against that snapshot. Returning
/// `Err` aborts with nothing written.
pub fn mutate_lines<S, F, T, E>(store: &S, path: &str, edit: F) -> Result<T, E>
where
    S: DocumentStore,
    F: FnOnce(&str, &mut Vec<String>) -> Result<T, E>,
    E: From<StoreError>,
{
    let mut output = None;
    store.process::<_, E>(path, |content| {
        let mut lines = split_lines(content);
        output = Some(edit(content, &mut lines)?);
        Ok(join_lines(&lines))
    })?;
    output.ok_or_else(|| StoreError::NotApplied(path.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryStore;

    #[test]
    fn edit_and_return_value() {
        let store = MemoryStore::new().with_doc("a.md", "one\ntwo\n");
        let count = mutate_lines(&store, "a.md", |_, lines| {
            lines.insert(1, "inserted".to_string());
            Ok::<_, StoreError>(lines.len())
        })
        .unwrap();
        assert_eq!(count, 4);
        assert_eq!(store.get("a.md").unwrap(), "one\ninserted\ntwo\n");
    }

    #[test]
    fn error_leaves_document_alone() {
        let store = MemoryStore::new().with_doc("a.md", "one\n");
        let result: Result<(), StoreError> = mutate_lines(&store, "a.md", |_, lines| {
            lines.clear();
            Err(StoreError::NotFound("abort".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.get("a.md").unwrap(), "one\n");
        assert_eq!(store.write_count(), 0);
    }

    #[derive(Debug, PartialEq)]
    enum EditError {
        Refused,
        Store(String),
    }

    impl From<StoreError> for EditError {
        fn from(e: StoreError) -> Self {
            EditError::Store(e.to_string())
        }
    }

    #[test]
    fn caller_error_type_passes_through() {
        let store = MemoryStore::new().with_doc("a.md", "one\n");
        let refused: Result<(), EditError> =
            mutate_lines(&store, "a.md", |_, _| Err(EditError::Refused));
        assert_eq!(refused, Err(EditError::Refused));

        let missing: Result<(), EditError> = mutate_lines(&store, "b.md", |_, _| Ok(()));
        assert!(matches!(missing, Err(EditError::Store(_))));
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn missing_document() {
        let store = MemoryStore::new();
        let result: Result<(), StoreError> = mutate_lines(&store, "nope.md", |_, _| Ok(()));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
