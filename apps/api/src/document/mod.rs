// The résumé/cover-letter document: the editing operations behind the forms,
// the persisted single-document store, and the plain-text preview.

pub mod editor;
pub mod handlers;
pub mod preview;
pub mod store;

pub use store::DocumentStore;
