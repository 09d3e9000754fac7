use chrono::{DateTime, Utc};
use geo_types::Point;
use session_tracker_lib::{codec, SessionRecord, SessionSpec};

use crate::{
    projection::{ListSurface, MapSurface, ProjectionTracker},
    registry::SessionRegistry,
    storage::{SessionStore, StorageError},
    SessionManagerError,
};

/// The public interface for logging, listing and removing sessions.
/// Every change goes registry first, then storage, then map and list.
pub struct SessionManager<S: SessionStore, M: MapSurface, L: ListSurface> {
    registry: SessionRegistry,
    tracker: ProjectionTracker<M, L>,
    store: S,
    persistence_degraded: bool,
}

impl<S: SessionStore, M: MapSurface, L: ListSurface> SessionManager<S, M, L> {
    /// Restores whatever the store holds. Unreadable or malformed data means starting empty.
    pub fn start(store: S, map: M, list: L) -> Self {
        let mut manager = Self {
            registry: SessionRegistry::new(),
            tracker: ProjectionTracker::new(map, list),
            store,
            persistence_degraded: false,
        };

        match manager.restore() {
            Ok(count) => tracing::info!("Restored {} sessions", count),
            Err(err) => {
                tracing::warn!("Starting without stored sessions: {}", err);
                if matches!(err, SessionManagerError::Persistence(_)) {
                    manager.persistence_degraded = true;
                }
            }
        }

        manager
    }

    fn restore(&mut self) -> Result<usize, SessionManagerError> {
        let Some(blob) = self.store.load()? else {
            return Ok(0);
        };

        self.registry.replace_all(codec::deserialize(&blob)?);
        for session in self.registry.all() {
            self.tracker.on_created(session);
        }
        Ok(self.registry.len())
    }

    pub fn create_session(&mut self, spec: SessionSpec) -> Result<SessionRecord, SessionManagerError> {
        self.create_session_at(spec, Utc::now())
    }

    pub fn create_session_at(&mut self, spec: SessionSpec, created_at: DateTime<Utc>) -> Result<SessionRecord, SessionManagerError> {
        let record = self.registry.create(spec, created_at)?;
        tracing::info!("Logged session {}: {}", record.id, record.description);

        self.persist();
        self.tracker.on_created(&record);
        Ok(record)
    }

    pub fn delete_session(&mut self, id: &str) -> Result<SessionRecord, SessionManagerError> {
        let (index, record) = self.registry.delete(id)?;
        tracing::info!("Deleted session {} (was #{})", record.id, index);

        self.persist();
        self.tracker.on_deleted(&record);
        Ok(record)
    }

    pub fn find_session(&self, id: &str) -> Option<&SessionRecord> {
        self.registry.find_by_id(id)
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        self.registry.all()
    }

    pub fn has_sessions(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Sorted copy of the sessions. The list is re-rendered in that order, the registry keeps its own.
    pub fn sort_by_distance(&mut self, ascending: bool) -> Vec<SessionRecord> {
        let sorted: Vec<SessionRecord> = self.registry.sort_by_distance(ascending).into_iter().cloned().collect();
        self.tracker.on_sorted(&sorted);
        sorted
    }

    /// Drops every session, including the stored ones.
    pub fn reset(&mut self) {
        tracing::info!("Resetting {} sessions", self.registry.len());
        self.registry.clear();

        match self.store.clear() {
            Ok(()) => self.persistence_degraded = false,
            Err(err) => self.storage_failed(err),
        }
        self.tracker.on_reset();
    }

    pub fn show_all(&mut self) {
        let locations: Vec<Point> = self.registry.all().iter().map(|session| session.location).collect();
        self.tracker.show_all(&locations);
    }

    pub fn focus_session(&mut self, id: &str) -> Result<(), SessionManagerError> {
        let location = self.registry.find_by_id(id)
            .map(|session| session.location)
            .ok_or_else(|| SessionManagerError::NotFound { id: id.to_string() })?;
        self.tracker.pan_to(location);
        Ok(())
    }

    /// True while the last write to storage failed. Sessions are still kept in memory.
    pub fn persistence_degraded(&self) -> bool {
        self.persistence_degraded
    }

    pub fn tracker(&self) -> &ProjectionTracker<M, L> {
        &self.tracker
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn persist(&mut self) {
        let result = codec::serialize(self.registry.all())
            .map_err(StorageError::from)
            .and_then(|blob| self.store.save(&blob));

        match result {
            Ok(()) => self.persistence_degraded = false,
            Err(err) => self.storage_failed(err),
        }
    }

    fn storage_failed(&mut self, err: StorageError) {
        tracing::warn!("Sessions are only kept in memory: {}", err);
        self.persistence_degraded = true;
    }
}
