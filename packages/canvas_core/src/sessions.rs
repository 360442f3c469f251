//! Registry of connected sessions.
//!
//! Each entry maps a session id to whatever handle the transport uses to
//! reach that session (an outbound channel in the server). The registry
//! itself does no I/O; it only guarantees that every id is present at most
//! once and that `count()` always matches the set.

use std::collections::HashMap;

use crate::error::CanvasError;
use crate::placement::SessionId;

pub struct SessionRegistry<T> {
    sessions: HashMap<SessionId, T>,
}

impl<T> SessionRegistry<T> {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Register a session. An id that is already present is refused and the
    /// existing entry is left untouched.
    pub fn join(&mut self, session_id: SessionId, handle: T) -> Result<(), CanvasError> {
        if self.contains(&session_id) {
            return Err(CanvasError::DuplicateSession(session_id));
        }
        self.sessions.insert(session_id, handle);
        Ok(())
    }

    /// Remove a session, returning its handle. Unknown ids are ignored.
    pub fn leave(&mut self, session_id: &SessionId) -> Option<T> {
        self.sessions.remove(session_id)
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SessionId, &T)> {
        self.sessions.iter()
    }
}

impl<T> Default for SessionRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
