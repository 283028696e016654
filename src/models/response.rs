use serde::{Deserialize, Serialize};

use crate::models::broadcast::BroadcastResults;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub status: String,
    pub results: BroadcastResults,
}

impl BroadcastResponse {
    pub fn completed(results: BroadcastResults) -> Self {
        Self {
            status: "completed".to_string(),
            results,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKeyResponse {
    #[serde(rename = "publicKey")]
    pub public_key: String,
}
