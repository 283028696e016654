use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Browser push subscription as produced by `PushManager.subscribe()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionInfo {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

impl SubscriptionInfo {
    pub fn new(
        endpoint: impl Into<String>,
        p256dh: impl Into<String>,
        auth: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            keys: SubscriptionKeys {
                p256dh: p256dh.into(),
                auth: auth.into(),
            },
        }
    }

    /// Shortened endpoint for log lines.
    pub fn endpoint_prefix(&self) -> &str {
        match self.endpoint.char_indices().nth(20) {
            Some((idx, _)) => &self.endpoint[..idx],
            None => &self.endpoint,
        }
    }
}

impl From<&SubscriptionInfo> for web_push::SubscriptionInfo {
    fn from(sub: &SubscriptionInfo) -> Self {
        web_push::SubscriptionInfo::new(&sub.endpoint, &sub.keys.p256dh, &sub.keys.auth)
    }
}
