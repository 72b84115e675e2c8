pub mod config_io;
pub mod lock;
pub mod memory;
pub mod recovery;
pub mod store;
pub mod vault;

pub use memory::MemoryStore;
pub use store::{DocumentKind, DocumentStore, StoreError, is_canvas_path, resolve_document, same_document};
pub use vault::VaultStore;
