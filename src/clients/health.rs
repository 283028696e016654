use std::{collections::HashMap, sync::Arc, time::Instant};

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    clients::{
        store::SubscriptionStore,
        vapid::{VapidKeyManager, parse_private_key},
    },
    models::health::{ComponentHealth, HealthCheckResponse, HealthStatus},
};

pub struct HealthChecker {
    store: Arc<SubscriptionStore>,
    vapid: Arc<VapidKeyManager>,
}

impl HealthChecker {
    pub fn new(store: Arc<SubscriptionStore>, vapid: Arc<VapidKeyManager>) -> Self {
        Self { store, vapid }
    }

    pub async fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        let store_health = self.check_subscription_store().await;
        checks.insert("subscription_store".to_string(), store_health);

        let vapid_health = self.check_vapid_keys().await;
        checks.insert("vapid_keys".to_string(), vapid_health);

        let overall_status = self.determine_overall_status(&checks);

        HealthCheckResponse {
            status: overall_status,
            timestamp: Utc::now(),
            checks,
        }
    }

    async fn check_subscription_store(&self) -> ComponentHealth {
        let start = Instant::now();

        match self.store.read().await {
            Ok(subscriptions) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(
                    response_time_ms = elapsed,
                    subscribers = subscriptions.len(),
                    "Subscription store health check passed"
                );
                ComponentHealth::healthy(elapsed)
                    .with_detail(format!("{} subscribers", subscriptions.len()))
            }
            Err(e) => {
                warn!(error = %e, "Subscription store health check failed");
                ComponentHealth::unhealthy(format!("Read failed: {}", e))
            }
        }
    }

    async fn check_vapid_keys(&self) -> ComponentHealth {
        let start = Instant::now();
        let keys = self.vapid.current().await;

        if let Err(e) = parse_private_key(&keys.private_pem) {
            warn!(error = %e, "VAPID key health check failed");
            return ComponentHealth::unhealthy(e.to_string());
        }

        match self.vapid.public_key().await {
            Some(_) => ComponentHealth::healthy(start.elapsed().as_millis() as u64),
            None => ComponentHealth::degraded("VAPID public key file missing".to_string()),
        }
    }

    fn determine_overall_status(&self, checks: &HashMap<String, ComponentHealth>) -> HealthStatus {
        let has_unhealthy = checks
            .values()
            .any(|health| health.status == HealthStatus::Unhealthy);

        let has_degraded = checks
            .values()
            .any(|health| health.status == HealthStatus::Degraded);

        if has_unhealthy {
            HealthStatus::Unhealthy
        } else if has_degraded {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}
