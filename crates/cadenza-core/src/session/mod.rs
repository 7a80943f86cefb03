//! Session domain module.
//!
//! - `model`: per-user conversation state (`Session`) and its value types
//! - `store`: the `SessionStore` trait plus the in-memory implementation

mod model;
mod store;

pub use model::{Candidate, HistoryEntry, Language, MediaKind, Session, UserId};
pub use store::{InMemorySessionStore, SessionMutation, SessionStore};
