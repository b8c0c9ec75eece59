use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A fixed-length time interval `[start, end)` that is a candidate for
/// a tutoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
