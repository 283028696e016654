use std::path::PathBuf;

use anyhow::{Context, Error, Result};
use tokio::{fs, sync::Mutex};
use tracing::{debug, info, warn};

use crate::models::subscription::SubscriptionInfo;

/// Subscriptions persisted as a pretty-printed JSON array.
pub struct SubscriptionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SubscriptionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!(path = %path.display(), "Subscription store initialized");

        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// A missing or unreadable file yields an empty list.
    pub async fn load(&self) -> Vec<SubscriptionInfo> {
        match self.read().await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Treating subscription file as empty");
                Vec::new()
            }
        }
    }

    /// Strict variant of [`load`](Self::load) used by health checks.
    pub async fn read(&self) -> Result<Vec<SubscriptionInfo>, Error> {
        if !fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let subscriptions = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt subscription file {}", self.path.display()))?;

        Ok(subscriptions)
    }

    /// Returns `false` when a subscription with the same endpoint is already stored.
    pub async fn save(&self, subscription: SubscriptionInfo) -> Result<bool, Error> {
        let _guard = self.write_lock.lock().await;

        let mut subscriptions = self.load().await;
        if subscriptions
            .iter()
            .any(|s| s.endpoint == subscription.endpoint)
        {
            debug!(endpoint = %subscription.endpoint_prefix(), "Subscription already stored");
            return Ok(false);
        }

        subscriptions.push(subscription);
        self.write(&subscriptions).await?;

        Ok(true)
    }

    /// Returns `true` if a subscription was removed.
    pub async fn remove(&self, endpoint: &str) -> Result<bool, Error> {
        let _guard = self.write_lock.lock().await;

        let subscriptions = self.load().await;
        let before = subscriptions.len();
        let remaining: Vec<_> = subscriptions
            .into_iter()
            .filter(|s| s.endpoint != endpoint)
            .collect();

        if remaining.len() == before {
            return Ok(false);
        }

        self.write(&remaining).await?;
        info!(remaining = remaining.len(), "Subscription removed");

        Ok(true)
    }

    async fn write(&self, subscriptions: &[SubscriptionInfo]) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let raw = serde_json::to_string_pretty(subscriptions)?;
        if let Err(e) = fs::write(&self.path, raw).await {
            warn!(path = %self.path.display(), error = %e, "Failed to write subscription file");
            return Err(e.into());
        }

        Ok(())
    }
}
