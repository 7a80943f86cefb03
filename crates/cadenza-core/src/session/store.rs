//! Session store trait and in-memory implementation.
//!
//! The store only holds data; ordering of same-user mutations is the
//! dispatcher's job (one worker per user).

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::model::{Session, UserId};
use crate::error::Result;

/// Mutation applied to a session under [`SessionStore::update`].
pub type SessionMutation = Box<dyn FnOnce(&mut Session) + Send>;

/// An abstract store mapping user identity to conversation state.
///
/// This decouples the engine from the storage mechanism so the map can be
/// swapped for a keyed lock table or an external cache without changing
/// engine logic. There is exactly one session per user; first access
/// creates it with defaults.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session for `user`, creating a default one if absent.
    async fn get(&self, user: UserId) -> Result<Session>;

    /// Replaces the stored session for `user`.
    async fn put(&self, user: UserId, session: Session) -> Result<()>;

    /// Applies `mutate` to the stored session (default if absent) and
    /// returns the session as stored afterwards.
    async fn update(&self, user: UserId, mutate: SessionMutation) -> Result<Session>;
}

/// Process-local store backed by a map.
///
/// Sessions live for the lifetime of the process; there is no durability
/// and none is required.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<UserId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user: UserId) -> Result<Session> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.entry(user).or_default().clone())
    }

    async fn put(&self, user: UserId, session: Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(user, session);
        Ok(())
    }

    async fn update(&self, user: UserId, mutate: SessionMutation) -> Result<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user).or_default();
        mutate(session);
        Ok(session.clone())
    }
}
