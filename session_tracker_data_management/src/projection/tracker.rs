use std::collections::HashMap;

use geo_types::Point;
use session_tracker_lib::SessionRecord;

use super::surface::{ListSurface, MapSurface};

struct Projection<Marker, Entry> {
    marker: Marker,
    entry: Entry,
}

/**
 * Keeps exactly one map marker and one list entry per live session.
 * Handles are keyed by session id, never by position, so deletes in any order release the right pair.
 */
pub struct ProjectionTracker<M: MapSurface, L: ListSurface> {
    map: M,
    list: L,
    projections: HashMap<String, Projection<M::Marker, L::Entry>>,
}

impl<M: MapSurface, L: ListSurface> ProjectionTracker<M, L> {
    pub fn new(map: M, list: L) -> Self {
        Self {
            map,
            list,
            projections: HashMap::new(),
        }
    }

    pub fn on_created(&mut self, record: &SessionRecord) {
        if self.projections.contains_key(&record.id) {
            tracing::warn!("Session {} already has a marker, not adding another", record.id);
            return;
        }

        let marker = self.map.place_marker(record.location, &record.popup_text(), record.kind().popup_style());
        let entry = self.list.append_entry(record);
        self.projections.insert(record.id.clone(), Projection { marker, entry });
    }

    /// Returns false if the session was not tracked. That is logged but otherwise ignored.
    pub fn on_deleted(&mut self, record: &SessionRecord) -> bool {
        let Some(projection) = self.projections.remove(&record.id) else {
            tracing::warn!("Session {} has no marker to remove", record.id);
            return false;
        };

        self.map.remove_marker(projection.marker);
        self.list.remove_entry(projection.entry);
        true
    }

    /// Re-renders the list in the given order. Markers stay where they are.
    pub fn on_sorted<'a>(&mut self, records: impl IntoIterator<Item = &'a SessionRecord>) {
        self.list.clear_all();

        for record in records {
            match self.projections.get_mut(&record.id) {
                Some(projection) => projection.entry = self.list.append_entry(record),
                None => tracing::warn!("Session {} is not tracked, leaving it out of the list", record.id),
            }
        }
    }

    pub fn on_reset(&mut self) {
        for (_, projection) in self.projections.drain() {
            self.map.remove_marker(projection.marker);
        }
        self.list.clear_all();
    }

    pub fn show_all(&mut self, locations: &[Point]) {
        if !locations.is_empty() {
            self.map.fit_bounds(locations);
        }
    }

    pub fn pan_to(&mut self, location: Point) {
        self.map.pan_to(location);
    }

    pub fn is_tracked(&self, id: &str) -> bool {
        self.projections.contains_key(id)
    }

    pub fn tracked_ids(&self) -> impl Iterator<Item = &str> {
        self.projections.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.projections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projections.is_empty()
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn list(&self) -> &L {
        &self.list
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use session_tracker_lib::SessionSpec;

    use super::*;
    use crate::projection::{ConsoleList, ConsoleMap};

    fn record(millis: i64, distance_km: f64) -> SessionRecord {
        SessionRecord::new(Utc.timestamp_millis_opt(millis).single().unwrap(), SessionSpec::run(40.0, -3.0, distance_km, 30.0, 170.0))
    }

    fn tracker() -> ProjectionTracker<ConsoleMap, ConsoleList> {
        ProjectionTracker::new(ConsoleMap::new(), ConsoleList::new())
    }

    #[test]
    fn created_session_gets_marker_and_entry() {
        let mut tracker = tracker();
        let first = record(1_700_000_000_000, 5.0);

        tracker.on_created(&first);

        assert!(tracker.is_tracked(&first.id));
        assert_eq!(tracker.map().marker_count(), 1);
        assert_eq!(tracker.list().shown_ids(), vec![first.id.as_str()]);
        let (_, (location, popup)) = tracker.map().markers().next().unwrap();
        assert_eq!(*location, first.location);
        assert_eq!(popup, &first.popup_text());
    }

    #[test]
    fn duplicate_create_is_ignored() {
        let mut tracker = tracker();
        let first = record(1_700_000_000_000, 5.0);

        tracker.on_created(&first);
        tracker.on_created(&first);

        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.map().marker_count(), 1);
        assert_eq!(tracker.list().entry_count(), 1);
    }

    #[test]
    fn out_of_order_deletes_release_the_right_pair() {
        let mut tracker = tracker();
        let records: Vec<SessionRecord> = (0..4).map(|i| record(1_700_000_000_000 + i * 1000, i as f64 + 1.0)).collect();
        for r in &records {
            tracker.on_created(r);
        }

        assert!(tracker.on_deleted(&records[2]));
        assert!(tracker.on_deleted(&records[0]));

        let mut tracked: Vec<&str> = tracker.tracked_ids().collect();
        tracked.sort();
        let mut expected = vec![records[1].id.as_str(), records[3].id.as_str()];
        expected.sort();
        assert_eq!(tracked, expected);
        assert_eq!(tracker.list().shown_ids(), vec![records[1].id.as_str(), records[3].id.as_str()]);
        let remaining: Vec<f64> = tracker.map().markers().map(|(_, (location, _))| location.y()).collect();
        assert_eq!(remaining.len(), 2);
    }

    #[test]
    fn deleting_untracked_session_is_soft() {
        let mut tracker = tracker();
        tracker.on_created(&record(1_700_000_000_000, 1.0));

        assert!(!tracker.on_deleted(&record(1_700_000_005_000, 1.0)));
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.map().marker_count(), 1);
    }

    #[test]
    fn sorting_reorders_list_only() {
        let mut tracker = tracker();
        let records: Vec<SessionRecord> = [3.0, 1.0, 2.0].iter().enumerate().map(|(i, d)| record(1_700_000_000_000 + i as i64 * 1000, *d)).collect();
        for r in &records {
            tracker.on_created(r);
        }

        tracker.on_sorted([&records[1], &records[2], &records[0]]);

        assert_eq!(tracker.list().shown_ids(), vec![records[1].id.as_str(), records[2].id.as_str(), records[0].id.as_str()]);
        assert_eq!(tracker.map().marker_count(), 3);

        // Entry handles were replaced, so a delete after sorting still finds its entry
        assert!(tracker.on_deleted(&records[2]));
        assert_eq!(tracker.list().shown_ids(), vec![records[1].id.as_str(), records[0].id.as_str()]);
    }

    #[test]
    fn reset_clears_everything() {
        let mut tracker = tracker();
        tracker.on_created(&record(1_700_000_000_000, 1.0));
        tracker.on_created(&record(1_700_000_001_000, 2.0));

        tracker.on_reset();

        assert!(tracker.is_empty());
        assert_eq!(tracker.map().marker_count(), 0);
        assert_eq!(tracker.list().entry_count(), 0);
    }
}
