use serde::{Deserialize, Serialize};

/// Work item carried by the recording queue. Discarded once dequeued; the job
/// store keeps the authoritative record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingTask {
    pub request_id: String,
    pub url: String,
}
