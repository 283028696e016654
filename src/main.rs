use std::sync::Arc;

use anyhow::{Error, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use push_notifier::{
    api::run_api_server,
    clients::{vapid::VapidKeyManager, webpush::WebPushClient},
    config::Config,
    models::{broadcast::DeliveryOutcome, payload::PushPayload, subscription::SubscriptionInfo},
    worker::{PushNotifier, ServiceWorker, TracingHost},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the subscription and broadcast HTTP server.
    Serve,
    /// Sends one notification to a single subscription.
    Send(SendArgs),
    /// Delivers one push message to a local worker that logs the notification.
    Deliver {
        /// JSON payload; omit to deliver a push without data.
        #[arg(long)]
        data: Option<String>,
    },
}

#[derive(Args)]
struct SendArgs {
    #[arg(long)]
    endpoint: String,
    #[arg(long)]
    p256dh: String,
    #[arg(long)]
    auth: String,
    #[arg(long)]
    title: String,
    #[arg(long)]
    body: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_api_server(config).await,
        Commands::Send(args) => send_once(config, args).await,
        Commands::Deliver { data } => deliver_locally(data).await,
    }
}

async fn send_once(config: Config, args: SendArgs) -> Result<(), Error> {
    let vapid = VapidKeyManager::load_or_generate(&config).await?;
    let keys = vapid.ensure_valid().await?;
    let push_client = WebPushClient::new(&config)?;

    let subscription = SubscriptionInfo::new(args.endpoint, args.p256dh, args.auth);
    let payload = PushPayload::new(args.title, args.body);

    match push_client
        .send(&subscription, &payload, &keys.private_pem)
        .await?
    {
        DeliveryOutcome::Delivered => {
            info!(endpoint = %subscription.endpoint_prefix(), "Push delivered");
            Ok(())
        }
        DeliveryOutcome::Gone => Err(anyhow!("Subscription is no longer valid (410 Gone)")),
        DeliveryOutcome::Rejected { status, body } => {
            Err(anyhow!("Push service rejected message ({}): {}", status, body))
        }
    }
}

async fn deliver_locally(data: Option<String>) -> Result<(), Error> {
    let worker = ServiceWorker::install(PushNotifier::new(Arc::new(TracingHost)));

    let outcome = worker.dispatch(data.map(String::into_bytes)).await;
    worker.shutdown().await?;

    outcome
}
