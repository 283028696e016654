use std::{path::Path, sync::Arc};

use anyhow::Result;
use axum::Router;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use p256::SecretKey;
use push_notifier::{
    api::{AppState, router},
    clients::vapid::encode_public_key,
    config::Config,
    models::subscription::SubscriptionInfo,
};
use rand_core::{OsRng, RngCore};
use tempfile::TempDir;

pub struct TestApp {
    pub state: Arc<AppState>,
    pub router: Router,
    pub dir: TempDir,
}

pub fn test_config(root: &Path) -> Config {
    Config::with_dirs(root.join("data"), root.join("static"))
}

pub async fn spawn_app() -> Result<TestApp> {
    let dir = tempfile::tempdir()?;
    std::fs::create_dir_all(dir.path().join("static"))?;

    let state = Arc::new(AppState::initialize(test_config(dir.path())).await?);
    let router = router(Arc::clone(&state));

    Ok(TestApp { state, router, dir })
}

/// A subscription with real browser-style keys pointing at `endpoint`.
pub fn browser_subscription(endpoint: impl Into<String>) -> SubscriptionInfo {
    let client_key = SecretKey::random(&mut OsRng);
    let mut auth = [0u8; 16];
    OsRng.fill_bytes(&mut auth);

    SubscriptionInfo::new(
        endpoint,
        encode_public_key(&client_key),
        URL_SAFE_NO_PAD.encode(auth),
    )
}
