use serde::{Deserialize, Serialize};

pub const FALLBACK_TITLE: &str = "Default title";
pub const FALLBACK_BODY: &str = "No message content";

/// Icon shown with every notification, relative to the site root.
pub const NOTIFICATION_ICON: &str = "/icon.png";

/// Wire payload carried by a push message.
///
/// Either field may be missing on the wire; a missing field resolves to an
/// empty string. The fallback strings only apply when the whole payload is
/// absent, see [`PushPayload::fallback`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub body: String,
}

impl PushPayload {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn fallback() -> Self {
        Self::new(FALLBACK_TITLE, FALLBACK_BODY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
}

impl NotificationOptions {
    pub fn with_body(body: String) -> Self {
        Self {
            body,
            icon: NOTIFICATION_ICON.to_string(),
        }
    }
}
