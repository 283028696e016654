use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use web_push::{ContentEncoding, VapidSignatureBuilder, WebPushMessage, WebPushMessageBuilder};

use crate::{
    config::Config,
    models::{broadcast::DeliveryOutcome, payload::PushPayload, subscription::SubscriptionInfo},
};

/// Sends encrypted, VAPID-signed messages straight to push service endpoints.
#[derive(Clone)]
pub struct WebPushClient {
    http_client: Client,
    vapid_subject: String,
    ttl: u32,
}

impl WebPushClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(subject = %config.vapid_subject, ttl = config.push_ttl_seconds, "Web push client initialized");

        Ok(Self {
            http_client,
            vapid_subject: config.vapid_subject.clone(),
            ttl: config.push_ttl_seconds,
        })
    }

    pub async fn send(
        &self,
        subscription: &SubscriptionInfo,
        payload: &PushPayload,
        vapid_private_pem: &str,
    ) -> Result<DeliveryOutcome, Error> {
        debug!(endpoint = %subscription.endpoint_prefix(), "Sending web push message");

        let content = serde_json::to_vec(payload)?;
        let message = self.build_message(subscription, &content, vapid_private_pem)?;

        self.post(message).await
    }

    fn build_message(
        &self,
        subscription: &SubscriptionInfo,
        content: &[u8],
        vapid_private_pem: &str,
    ) -> Result<WebPushMessage, Error> {
        let subscription_info = web_push::SubscriptionInfo::from(subscription);

        let mut signature_builder =
            VapidSignatureBuilder::from_pem(vapid_private_pem.as_bytes(), &subscription_info)?;
        signature_builder.add_claim("sub", self.vapid_subject.as_str());
        let signature = signature_builder.build()?;

        let mut builder = WebPushMessageBuilder::new(&subscription_info);
        builder.set_payload(ContentEncoding::Aes128Gcm, content);
        builder.set_vapid_signature(signature);
        builder.set_ttl(self.ttl);

        Ok(builder.build()?)
    }

    async fn post(&self, message: WebPushMessage) -> Result<DeliveryOutcome, Error> {
        let mut request = self
            .http_client
            .post(message.endpoint.to_string())
            .header("TTL", message.ttl.to_string());

        match message.payload {
            Some(payload) => {
                request = request
                    .header("Content-Encoding", payload.content_encoding.to_str())
                    .header("Content-Type", "application/octet-stream");

                for (name, value) in payload.crypto_headers {
                    request = request.header(name, value);
                }

                request = request.body(payload.content);
            }
            None => {
                request = request.header("Content-Length", "0");
            }
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            debug!(status = status.as_u16(), "Push service accepted message");
            return Ok(DeliveryOutcome::Delivered);
        }

        if status == StatusCode::GONE {
            return Ok(DeliveryOutcome::Gone);
        }

        let body = response.text().await.unwrap_or_default();
        Ok(DeliveryOutcome::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
