use std::sync::Arc;

use anyhow::{Error, Result};
use tracing::debug;

use crate::{
    models::payload::{NotificationOptions, PushPayload},
    worker::{event::PushEvent, host::NotificationHost},
};

/// Turns push events into notifications on `H`.
pub struct PushNotifier<H> {
    host: Arc<H>,
}

impl<H: NotificationHost> PushNotifier<H> {
    pub fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    /// Resolves the payload, then starts the display request and attaches it
    /// to the event.
    ///
    /// Fails without showing anything when the data is present but is not a
    /// JSON object with string `title`/`body` fields.
    pub fn handle(&self, event: &mut PushEvent) -> Result<(), Error> {
        let payload = match event.data() {
            Some(data) => data.json::<PushPayload>()?,
            None => {
                debug!("Push event carried no data, using fallback payload");
                PushPayload::fallback()
            }
        };

        let PushPayload { title, body } = payload;
        let options = NotificationOptions::with_body(body);
        let host = Arc::clone(&self.host);

        event.wait_until(tokio::spawn(async move {
            host.show_notification(title, options).await
        }));

        Ok(())
    }
}
