use anyhow::{Error, Result, anyhow};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::worker::{
    event::{PushEvent, PushMessageData},
    host::NotificationHost,
    notifier::PushNotifier,
};

struct Delivery {
    event: PushEvent,
    outcome: oneshot::Sender<Result<(), Error>>,
}

/// In-process stand-in for the service worker platform.
///
/// Exactly one handler is subscribed, at install time. Events are handled one
/// at a time in arrival order, and an event is finished only once everything
/// attached through `wait_until` has settled.
pub struct ServiceWorker {
    sender: mpsc::UnboundedSender<Delivery>,
    dispatcher: JoinHandle<()>,
}

impl ServiceWorker {
    pub fn install<H: NotificationHost>(notifier: PushNotifier<H>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let dispatcher = tokio::spawn(Self::run(notifier, receiver));

        info!("Service worker installed, push handler registered");

        Self { sender, dispatcher }
    }

    async fn run<H: NotificationHost>(
        notifier: PushNotifier<H>,
        mut receiver: mpsc::UnboundedReceiver<Delivery>,
    ) {
        while let Some(Delivery { mut event, outcome }) = receiver.recv().await {
            let handled = notifier.handle(&mut event);
            debug!(pending = event.pending(), "Push handler returned");

            // Attached work still runs to completion when the handler itself failed.
            let settled = event.settle().await;
            let result = handled.and(settled);

            if let Err(e) = &result {
                warn!(error = %e, "Unhandled error in push event handler");
            }

            // The dispatcher may have stopped waiting; the event is done either way.
            let _ = outcome.send(result);
        }

        debug!("Push event channel closed");
    }

    /// Delivers one push message and waits until its event has settled.
    pub async fn dispatch(&self, data: Option<Vec<u8>>) -> Result<(), Error> {
        let (outcome, receiver) = oneshot::channel();
        let event = PushEvent::new(data.map(PushMessageData::new));

        self.sender
            .send(Delivery { event, outcome })
            .map_err(|_| anyhow!("Service worker is no longer running"))?;

        receiver
            .await
            .map_err(|_| anyhow!("Service worker dropped the push event"))?
    }

    /// Stops accepting events and waits for in-flight ones.
    pub async fn shutdown(self) -> Result<(), Error> {
        drop(self.sender);
        self.dispatcher.await?;

        info!("Service worker stopped");
        Ok(())
    }
}
