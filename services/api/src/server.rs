use crate::cli::ServeArgs;
use crate::infra::{seed_demo_accounts, AppState, Services};
use crate::routes::platform_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use careerlaunch::config::AppConfig;
use careerlaunch::error::AppError;
use careerlaunch::memory::MemoryStore;
use careerlaunch::notifications::{ChannelPublisher, LogMailer, NotificationWorker};
use careerlaunch::portfolio::GitHubProvider;
use careerlaunch::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryStore::new());
    if args.seed_demo {
        seed_demo_accounts(&store)?;
        info!("seeded demo accounts");
    }

    let (publisher, receiver) = ChannelPublisher::channel();
    let worker = NotificationWorker::new(
        receiver,
        Arc::new(LogMailer),
        config.notifications.clone(),
    )
    .spawn();

    let provider = Arc::new(GitHubProvider::new(&config.github)?);
    let services = Services::new(
        store,
        Arc::new(publisher),
        provider,
        config.github.max_pages,
    );

    let app = platform_routes(&services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);
    drop(services);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "careerlaunch api ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router owned the last publisher handles; the worker drains what is left.
    match worker.await {
        Ok(summary) => info!(
            delivered = summary.delivered,
            failed = summary.failed,
            "notification worker drained"
        ),
        Err(error) => warn!(%error, "notification worker aborted"),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for shutdown signal");
    }
}
