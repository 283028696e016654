use anyhow::{Error, Result, anyhow};
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

/// Raw bytes attached to a push message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessageData(Vec<u8>);

impl PushMessageData {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.0).map_err(|e| anyhow!("Malformed push payload: {}", e))
    }
}

/// A single push delivery.
///
/// Work started while handling the event is attached with
/// [`wait_until`](Self::wait_until); the host keeps the event open until all of
/// it has settled.
pub struct PushEvent {
    data: Option<PushMessageData>,
    pending: Vec<JoinHandle<Result<(), Error>>>,
}

impl PushEvent {
    pub fn new(data: Option<PushMessageData>) -> Self {
        Self {
            data,
            pending: Vec::new(),
        }
    }

    pub fn data(&self) -> Option<&PushMessageData> {
        self.data.as_ref()
    }

    pub fn wait_until(&mut self, task: JoinHandle<Result<(), Error>>) {
        self.pending.push(task);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Waits for every extension and returns the first failure, if any.
    pub async fn settle(self) -> Result<(), Error> {
        let mut first_error = None;

        for task in self.pending {
            let outcome = match task.await {
                Ok(result) => result,
                Err(e) => Err(anyhow!("Event task aborted: {}", e)),
            };

            if let Err(e) = outcome {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
