//! JSON-file session store.
//!
//! One `<session-id>.json` file per session in a directory. Writes go to a
//! temporary file that is then renamed over the old one, so a crash never
//! leaves a half-written session behind.

use crate::domain::{BridgeError, BridgeSession, SessionId};
use crate::ports::outbound::SessionStore;
use parking_lot::Mutex;
use shared_types::Hash;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Sessions persisted as JSON files.
pub struct JsonFileSessionStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSessionStore {
    /// Store rooted at `dir`, created if missing.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, BridgeError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the session files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read(path: &Path) -> Result<BridgeSession, BridgeError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl SessionStore for JsonFileSessionStore {
    fn save(&self, session: &BridgeSession) -> Result<(), BridgeError> {
        let json = serde_json::to_vec_pretty(session)?;
        let path = self.path_for(&session.id);
        let tmp = path.with_extension("json.tmp");
        let _guard = self.write_lock.lock();
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn load(&self, id: &SessionId) -> Result<Option<BridgeSession>, BridgeError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        Self::read(&path).map(Some)
    }

    fn find_by_burn(&self, burn_id: &Hash) -> Result<Option<BridgeSession>, BridgeError> {
        Ok(self
            .list()?
            .into_iter()
            .find(|s| s.burn_id.as_ref() == Some(burn_id)))
    }

    fn list(&self) -> Result<Vec<BridgeSession>, BridgeError> {
        let mut sessions = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match Self::read(&path) {
                Ok(session) => sessions.push(session),
                Err(e) => warn!("[al-04] Skipping unreadable session {}: {}", path.display(), e),
            }
        }
        sessions.sort_by_key(|s| (s.created_at, s.id));
        Ok(sessions)
    }
}
