use crate::{
    cmd::{build_adapters, connect_store},
    config::Config,
    modules::{
        handlers::{
            contest::{
                list_completed, list_contests, list_ongoing, list_platform_contests,
                list_upcoming, update_contests,
            },
            liveness, readiness, root,
        },
        ingestion::IngestionCoordinator,
        query::ContestQueryService,
        scheduler::Scheduler,
    },
};
use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue},
    routing, Router, Server,
};
use clap::Args;
use coderadar_libs::{InMemoryContestStore, SharedContestStore};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, Args)]
pub struct ServerArgs {
    #[arg(long)]
    port: Option<u16>,
    /// Keep contests in process memory instead of PostgreSQL.
    #[arg(long)]
    in_memory: bool,
}

pub async fn run(args: ServerArgs, config: Config) -> Result<()> {
    let store: SharedContestStore = if args.in_memory {
        tracing::warn!("Contests are kept in memory and will be lost on shutdown");
        Arc::new(InMemoryContestStore::new())
    } else {
        connect_store(&config).await?
    };

    let coordinator = Arc::new(IngestionCoordinator::new(
        store.clone(),
        build_adapters(&config)?,
    ));
    let query_service = Arc::new(ContestQueryService::new(
        store.clone(),
        config.all_view_window,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = Scheduler::new(coordinator.clone(), config.update_interval).spawn(shutdown_rx);

    let app = create_router(
        store,
        coordinator,
        query_service,
        config.frontend_origin.clone(),
    );
    let port = args.port.unwrap_or(config.port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server start at port {}", port);
    Server::try_bind(&addr)
        .with_context(|| {
            let message = format!("Failed to bind server to port {}.", port);
            tracing::error!(message);
            message
        })?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tx.send(true).ok();
    scheduler.await?;

    Ok(())
}

pub fn create_router(
    store: SharedContestStore,
    coordinator: Arc<IngestionCoordinator>,
    query_service: Arc<ContestQueryService>,
    frontend_origin: Option<HeaderValue>,
) -> Router {
    let cors = match frontend_origin {
        Some(origin) => CorsLayer::new().allow_origin(AllowOrigin::exact(origin)),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods(Any)
    .allow_headers(vec![CONTENT_TYPE]);

    Router::new()
        .route("/", routing::get(root))
        .route("/api/liveness", routing::get(liveness))
        .route("/api/readiness", routing::get(readiness))
        .route("/api/contests", routing::get(list_contests))
        .route("/api/contests/upcoming", routing::get(list_upcoming))
        .route("/api/contests/ongoing", routing::get(list_ongoing))
        .route("/api/contests/completed", routing::get(list_completed))
        .route("/api/contests/update", routing::post(update_contests))
        .route("/api/contests/:platform", routing::get(list_platform_contests))
        .layer(Extension(store))
        .layer(Extension(coordinator))
        .layer(Extension(query_service))
        .layer(cors)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler.");
    };

    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("SIGINT signal received, starting graceful shutdown.");
}
