pub mod codec;
pub mod error;
pub mod session_record;

pub use error::{CodecError, RestoreError, SessionField, ValidationError, ValidationReason};
pub use session_record::{SessionExtra, SessionKind, SessionMetrics, SessionRecord, SessionSpec};
