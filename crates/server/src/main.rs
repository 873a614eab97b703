//! Scribe server entry point.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, middleware};
use scribe_api::{AppState, middleware::auth_middleware, router as app_router};
use scribe_common::{Config, LocalStorage, PageCache, StorageBackend};
use scribe_core::{
    CommentService, FeedService, FollowService, GroupService, PostService, UserService,
};
use scribe_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribe=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting scribe server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = scribe_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    scribe_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));

    // Media storage for uploaded post images
    let storage: Arc<dyn StorageBackend> = Arc::new(LocalStorage::new(
        PathBuf::from(&config.media.base_path),
        config.media.base_url.clone(),
    ));

    // Initialize services
    let user_service = UserService::new(user_repo.clone());
    let feed_service = FeedService::new(
        post_repo.clone(),
        group_repo.clone(),
        user_repo.clone(),
        follow_repo.clone(),
        config.pagination.page_size,
    );
    let post_service = PostService::new(
        post_repo.clone(),
        group_repo.clone(),
        comment_repo.clone(),
        storage,
    );
    let comment_service = CommentService::new(comment_repo, post_repo);
    let follow_service = FollowService::new(follow_repo, user_repo);
    let group_service = GroupService::new(group_repo);

    // Time-boxed cache for rendered global-feed pages
    let page_cache = PageCache::new(config.cache.feed_ttl_secs);

    // Create app state
    let state = AppState {
        user_service,
        feed_service,
        post_service,
        comment_service,
        follow_service,
        group_service,
        page_cache,
    };

    // Build router
    let app = Router::new()
        .merge(app_router())
        .nest_service(
            config.media.base_url.as_str(),
            ServeDir::new(&config.media.base_path),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
