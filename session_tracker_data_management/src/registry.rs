use chrono::{DateTime, Utc};
use session_tracker_lib::{SessionRecord, SessionSpec};

use crate::SessionManagerError;

/**
 * SessionRegistry owns every logged session, in the order they were logged.
 * Projections and storage only ever see copies or ids.
 */
#[derive(Debug, Default, Clone)]
pub struct SessionRegistry {
    sessions: Vec<SessionRecord>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids come from the creation millisecond, so a second session in the same millisecond is refused.
    pub fn create(&mut self, spec: SessionSpec, created_at: DateTime<Utc>) -> Result<SessionRecord, SessionManagerError> {
        spec.validate()?;

        let record = SessionRecord::new(created_at, spec);
        if self.find_by_id(&record.id).is_some() {
            return Err(SessionManagerError::DuplicateId { id: record.id });
        }

        self.sessions.push(record.clone());
        Ok(record)
    }

    /// Returns the removed record together with the position it held.
    pub fn delete(&mut self, id: &str) -> Result<(usize, SessionRecord), SessionManagerError> {
        let index = self.position(id).ok_or_else(|| SessionManagerError::NotFound { id: id.to_string() })?;
        let record = self.sessions.remove(index);
        Ok((index, record))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&SessionRecord> {
        self.sessions.iter().find(|session| session.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|session| session.id == id)
    }

    /// Presentation only, the registry keeps its own order. Ties keep logging order either way.
    pub fn sort_by_distance(&self, ascending: bool) -> Vec<&SessionRecord> {
        let mut sorted: Vec<&SessionRecord> = self.sessions.iter().collect();
        if ascending {
            sorted.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        } else {
            sorted.sort_by(|a, b| b.distance_km.total_cmp(&a.distance_km));
        }
        sorted
    }

    pub fn all(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Seeds the registry from restored sessions. Later sessions repeating an id are dropped.
    pub fn replace_all(&mut self, sessions: Vec<SessionRecord>) {
        self.sessions = Vec::with_capacity(sessions.len());
        for session in sessions {
            if self.find_by_id(&session.id).is_some() {
                tracing::warn!("Skipping restored session {}, the id is already in use", session.id);
                continue;
            }
            self.sessions.push(session);
        }
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}
