//! In-memory session store.

use crate::domain::{BridgeError, BridgeSession, SessionId};
use crate::ports::outbound::SessionStore;
use parking_lot::RwLock;
use shared_types::Hash;
use std::collections::HashMap;

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, BridgeSession>,
    order: Vec<SessionId>,
}

/// Sessions held in process memory; lost on restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    inner: RwLock<Inner>,
}

impl InMemorySessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions.
    pub fn len(&self) -> usize {
        self.inner.read().sessions.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn save(&self, session: &BridgeSession) -> Result<(), BridgeError> {
        let mut inner = self.inner.write();
        if inner.sessions.insert(session.id, session.clone()).is_none() {
            inner.order.push(session.id);
        }
        Ok(())
    }

    fn load(&self, id: &SessionId) -> Result<Option<BridgeSession>, BridgeError> {
        Ok(self.inner.read().sessions.get(id).cloned())
    }

    fn find_by_burn(&self, burn_id: &Hash) -> Result<Option<BridgeSession>, BridgeError> {
        Ok(self
            .inner
            .read()
            .sessions
            .values()
            .find(|s| s.burn_id.as_ref() == Some(burn_id))
            .cloned())
    }

    fn list(&self) -> Result<Vec<BridgeSession>, BridgeError> {
        let inner = self.inner.read();
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.sessions.get(id).cloned())
            .collect())
    }
}
