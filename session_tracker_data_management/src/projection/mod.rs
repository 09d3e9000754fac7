mod console;
mod surface;
mod tracker;

pub use console::{ConsoleList, ConsoleMap, EntryHandle, MarkerHandle};
pub use surface::{ListSurface, MapSurface};
pub use tracker::ProjectionTracker;
