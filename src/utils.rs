use anyhow::{Error, Result};
use tracing::{error, info, warn};

use crate::{
    clients::{store::SubscriptionStore, vapid::VapidKeyManager, webpush::WebPushClient},
    models::{
        broadcast::{BroadcastResults, DeliveryOutcome},
        payload::PushPayload,
    },
};

/// Sends `payload` to every stored subscription.
///
/// Endpoints answering 410 are dropped from the store. Any other failure only
/// bumps the `failed` counter; one bad subscriber never aborts the broadcast.
pub async fn broadcast_notification(
    payload: &PushPayload,
    store: &SubscriptionStore,
    vapid: &VapidKeyManager,
    push_client: &WebPushClient,
) -> Result<BroadcastResults, Error> {
    let keys = vapid.ensure_valid().await?;
    let subscriptions = store.load().await;

    info!(
        subscribers = subscriptions.len(),
        key_len = keys.private_pem.len(),
        "Broadcasting push notification"
    );

    let mut results = BroadcastResults::default();

    for subscription in &subscriptions {
        match push_client
            .send(subscription, payload, &keys.private_pem)
            .await
        {
            Ok(DeliveryOutcome::Delivered) => {
                results.success += 1;
            }
            Ok(DeliveryOutcome::Gone) => {
                warn!(
                    endpoint = %subscription.endpoint_prefix(),
                    "Subscription gone, removing"
                );
                if let Err(e) = store.remove(&subscription.endpoint).await {
                    error!(error = %e, "Failed to remove expired subscription");
                }
                results.removed += 1;
            }
            Ok(DeliveryOutcome::Rejected { status, body }) => {
                error!(
                    endpoint = %subscription.endpoint_prefix(),
                    status,
                    body = %body,
                    "WebPush error"
                );
                results.failed += 1;
            }
            Err(e) => {
                error!(
                    endpoint = %subscription.endpoint_prefix(),
                    error = %e,
                    "General error while sending push"
                );
                results.failed += 1;
            }
        }
    }

    info!(
        success = results.success,
        failed = results.failed,
        removed = results.removed,
        "Broadcast completed"
    );

    Ok(results)
}
