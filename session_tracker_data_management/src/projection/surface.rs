use geo_types::Point;
use session_tracker_lib::SessionRecord;

/// The map widget. Markers are only placed and removed through the tracker.
pub trait MapSurface {
    type Marker;

    fn place_marker(&mut self, location: Point, popup_text: &str, style_tag: &str) -> Self::Marker;
    fn remove_marker(&mut self, marker: Self::Marker);
    fn fit_bounds(&mut self, locations: &[Point]);
    fn pan_to(&mut self, location: Point);
}

/// The rendered session list.
pub trait ListSurface {
    type Entry;

    fn append_entry(&mut self, record: &SessionRecord) -> Self::Entry;
    fn remove_entry(&mut self, entry: Self::Entry);
    fn clear_all(&mut self);
}
