use std::collections::BTreeMap;

use geo_types::Point;
use session_tracker_lib::SessionRecord;

use crate::MAP_ZOOM_LEVEL;

use super::surface::{ListSurface, MapSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryHandle(pub u64);

/// Map without a widget behind it. Logs every call and remembers which markers are live.
#[derive(Debug)]
pub struct ConsoleMap {
    next_handle: u64,
    markers: BTreeMap<MarkerHandle, (Point, String)>,
    center: Option<Point>,
    zoom: f64,
}

impl Default for ConsoleMap {
    fn default() -> Self {
        Self {
            next_handle: 0,
            markers: BTreeMap::new(),
            center: None,
            zoom: MAP_ZOOM_LEVEL,
        }
    }
}

impl ConsoleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerHandle, &(Point, String))> {
        self.markers.iter()
    }

    pub fn center(&self) -> Option<Point> {
        self.center
    }
}

impl MapSurface for ConsoleMap {
    type Marker = MarkerHandle;

    fn place_marker(&mut self, location: Point, popup_text: &str, style_tag: &str) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        tracing::debug!("Marker {} at ({}, {}) [{}]: {}", handle.0, location.y(), location.x(), style_tag, popup_text);
        self.markers.insert(handle, (location, popup_text.to_string()));
        handle
    }

    fn remove_marker(&mut self, marker: MarkerHandle) {
        if self.markers.remove(&marker).is_none() {
            tracing::warn!("Marker {} was not on the map", marker.0);
        } else {
            tracing::debug!("Removed marker {}", marker.0);
        }
    }

    fn fit_bounds(&mut self, locations: &[Point]) {
        let Some(first) = locations.first() else {
            return;
        };

        let (mut min, mut max) = (*first, *first);
        for location in locations {
            min = Point::new(min.x().min(location.x()), min.y().min(location.y()));
            max = Point::new(max.x().max(location.x()), max.y().max(location.y()));
        }

        self.center = Some(Point::new((min.x() + max.x()) / 2.0, (min.y() + max.y()) / 2.0));
        tracing::info!("Showing ({}, {}) to ({}, {})", min.y(), min.x(), max.y(), max.x());
    }

    fn pan_to(&mut self, location: Point) {
        self.center = Some(location);
        tracing::info!("Centered on ({}, {}) at zoom {}", location.y(), location.x(), self.zoom);
    }
}

/// List without a DOM behind it. Keeps rendered lines in display order.
#[derive(Debug, Default)]
pub struct ConsoleList {
    next_handle: u64,
    entries: Vec<(EntryHandle, String, String)>,
}

impl ConsoleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Session ids in the order they are currently shown.
    pub fn shown_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, id, _)| id.as_str()).collect()
    }
}

impl ListSurface for ConsoleList {
    type Entry = EntryHandle;

    fn append_entry(&mut self, record: &SessionRecord) -> EntryHandle {
        let handle = EntryHandle(self.next_handle);
        self.next_handle += 1;
        let line = format!("[{}] {}: {}", record.id, record.description, record.summary());
        tracing::debug!("Entry {}: {}", handle.0, line);
        self.entries.push((handle, record.id.clone(), line));
        handle
    }

    fn remove_entry(&mut self, entry: EntryHandle) {
        match self.entries.iter().position(|(handle, _, _)| *handle == entry) {
            Some(index) => {
                self.entries.remove(index);
                tracing::debug!("Removed entry {}", entry.0);
            }
            None => tracing::warn!("Entry {} was not in the list", entry.0),
        }
    }

    fn clear_all(&mut self) {
        tracing::debug!("Cleared {} entries", self.entries.len());
        self.entries.clear();
    }
}

#[test]
fn fit_bounds_centers_between_extremes() {
    let mut map = ConsoleMap::new();
    map.fit_bounds(&[]);
    assert_eq!(map.center(), None);

    map.fit_bounds(&[Point::new(-3.0, 40.0), Point::new(-1.0, 42.0), Point::new(-2.0, 41.5)]);
    assert_eq!(map.center(), Some(Point::new(-2.0, 41.0)));
}
