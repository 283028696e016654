use serde::{Deserialize, Serialize};

use crate::models::payload::PushPayload;

/// Admin request to notify every stored subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastRequest {
    pub title: String,
    pub body: String,
}

impl From<BroadcastRequest> for PushPayload {
    fn from(request: BroadcastRequest) -> Self {
        PushPayload::new(request.title, request.body)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResults {
    pub success: u32,
    pub failed: u32,
    pub removed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The push service answered 410: the subscription no longer exists.
    Gone,
    Rejected { status: u16, body: String },
}
