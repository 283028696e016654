use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
};
use tokio::{fs, net::TcpListener};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::{
    clients::{
        health::HealthChecker, store::SubscriptionStore, vapid::VapidKeyManager,
        webpush::WebPushClient,
    },
    config::Config,
    error::ApiError,
    models::{
        broadcast::BroadcastRequest,
        health::HealthStatus,
        payload::PushPayload,
        response::{BroadcastResponse, PublicKeyResponse, StatusResponse},
        subscription::SubscriptionInfo,
    },
    utils::broadcast_notification,
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<SubscriptionStore>,
    pub vapid: Arc<VapidKeyManager>,
    pub push_client: WebPushClient,
    pub health_checker: HealthChecker,
}

impl AppState {
    pub async fn initialize(config: Config) -> Result<Self, Error> {
        fs::create_dir_all(&config.data_dir).await?;

        let store = Arc::new(SubscriptionStore::new(config.subscriptions_file()));
        let vapid = Arc::new(VapidKeyManager::load_or_generate(&config).await?);
        let push_client = WebPushClient::new(&config)?;
        let health_checker = HealthChecker::new(Arc::clone(&store), Arc::clone(&vapid));

        Ok(Self {
            config,
            store,
            vapid,
            push_client,
            health_checker,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/api/subscribe", post(subscribe))
        .route("/api/broadcast", post(broadcast))
        .route("/vapid-public-key", get(vapid_public_key))
        .route("/admin", get(admin_page))
        .route("/health", get(health_check))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: Config) -> Result<(), Error> {
    let addr = config.server_address();
    let state = Arc::new(AppState::initialize(config).await?);

    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Push notification server started");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

async fn subscribe(
    State(state): State<Arc<AppState>>,
    Json(subscription): Json<SubscriptionInfo>,
) -> Result<Json<StatusResponse>, ApiError> {
    let endpoint = subscription.endpoint_prefix().to_string();
    let added = state.store.save(subscription).await?;

    info!(endpoint = %endpoint, added, "New subscriber");

    Ok(Json(StatusResponse::success("Subscription saved")))
}

async fn broadcast(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BroadcastRequest>,
) -> Result<Json<BroadcastResponse>, ApiError> {
    let payload: PushPayload = request.into();
    let results =
        broadcast_notification(&payload, &state.store, &state.vapid, &state.push_client).await?;

    Ok(Json(BroadcastResponse::completed(results)))
}

async fn vapid_public_key(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PublicKeyResponse>, ApiError> {
    state.vapid.ensure_valid().await?;

    match state.vapid.public_key().await {
        Some(public_key) => Ok(Json(PublicKeyResponse { public_key })),
        None => Err(ApiError::Unavailable(
            "VAPID public key not available".to_string(),
        )),
    }
}

async fn admin_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let path = state.config.static_dir.join("admin.html");

    match fs::read_to_string(&path).await {
        Ok(page) => Ok(Html(page)),
        Err(_) => Err(ApiError::NotFound("File not found".to_string())),
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_checker.check_all().await;

    let status_code = match health.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}
