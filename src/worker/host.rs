use std::future::Future;

use anyhow::{Error, Result};
use tracing::info;

use crate::models::payload::NotificationOptions;

/// The platform primitive that renders a notification banner.
pub trait NotificationHost: Send + Sync + 'static {
    fn show_notification(
        &self,
        title: String,
        options: NotificationOptions,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Host that renders notifications as log lines.
#[derive(Debug, Clone, Default)]
pub struct TracingHost;

impl NotificationHost for TracingHost {
    async fn show_notification(
        &self,
        title: String,
        options: NotificationOptions,
    ) -> Result<(), Error> {
        info!(
            title = %title,
            body = %options.body,
            icon = %options.icon,
            "Showing notification"
        );
        Ok(())
    }
}
