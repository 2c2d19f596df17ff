//! Galeria server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use galeria_api::{
    StreamingHub, files_router, middleware::AppState, router as api_router, streaming_handler,
};
use galeria_common::{Config, TokenService};
use galeria_core::{
    AccountService, AlbumService, AuthService, BlockingService, ChatService, CommentService,
    EmailService, FeedService, FollowingService, LikeService, MercadoPagoClient,
    NotificationService, PaymentGatewayService, PaymentService, PhotoService, ReportService,
    SellerService, UnlockService,
};
use galeria_db::repositories::{
    AlbumRepository, BlockingRepository, ChatRepository, CommentRepository, FollowingRepository,
    LikeRepository, NotificationRepository, PhotoRepository, ReportRepository, SellerRepository,
    UnlockRepository, UserRepository,
};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Largest accepted request body. Uploads carry videos.
const MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
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

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "galeria=debug,tower_http=debug".into());

    let json = std::env::var("GALERIA_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Session cookies need credentialed CORS, which rules out wildcards
    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    info!("Starting galeria server...");

    // Load configuration, from an explicit file when GALERIA_CONFIG is set
    let config = match std::env::var("GALERIA_CONFIG") {
        Ok(path) => Config::from_file(path)?,
        Err(_) => Config::load()?,
    };

    // Connect to database
    let db = galeria_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    galeria_db::migrate(&db).await?;
    info!("Migrations completed");

    let storage = config.storage.build().await?;
    info!("Storage backend ready");

    let email = EmailService::new(config.email.as_ref())?;
    if !email.is_enabled() {
        warn!("SMTP is not configured; password reset links will be logged");
    }

    let gateway: PaymentGatewayService =
        Arc::new(MercadoPagoClient::new(config.payments.clone())?);
    let server_url = config.server.url.trim_end_matches('/').to_string();
    let frontend_url = config.server.frontend_url.trim_end_matches('/').to_string();
    let marketplace_fee = config.payments.marketplace_fee;

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let photo_repo = PhotoRepository::new(Arc::clone(&db));
    let album_repo = AlbumRepository::new(Arc::clone(&db));
    let following_repo = FollowingRepository::new(Arc::clone(&db));
    let blocking_repo = BlockingRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let unlock_repo = UnlockRepository::new(Arc::clone(&db));
    let seller_repo = SellerRepository::new(Arc::clone(&db));
    let report_repo = ReportRepository::new(Arc::clone(&db));
    let chat_repo = ChatRepository::new(Arc::clone(&db));

    // Realtime hub, shared by the services that push events
    let streaming = StreamingHub::new();

    // Initialize services
    let mut notification_service =
        NotificationService::new(notification_repo, user_repo.clone());
    notification_service.set_event_publisher(Arc::new(streaming.clone()));

    let mut chat_service =
        ChatService::new(chat_repo, user_repo.clone(), blocking_repo.clone());
    chat_service.set_event_publisher(Arc::new(streaming.clone()));

    let unlock_service = UnlockService::new(unlock_repo.clone(), photo_repo.clone());
    let photo_service = PhotoService::new(
        photo_repo.clone(),
        user_repo.clone(),
        blocking_repo.clone(),
        unlock_repo.clone(),
        seller_repo.clone(),
        Arc::clone(&storage),
    );
    let auth_service = AuthService::new(user_repo.clone(), email, frontend_url.clone());
    let account_service = AccountService::new(
        user_repo.clone(),
        photo_repo.clone(),
        album_repo.clone(),
        blocking_repo.clone(),
        following_repo.clone(),
        report_repo.clone(),
        photo_service.clone(),
        Arc::clone(&storage),
    );
    let album_service = AlbumService::new(
        album_repo.clone(),
        photo_repo.clone(),
        user_repo.clone(),
        blocking_repo.clone(),
        unlock_repo.clone(),
        unlock_service.clone(),
        photo_service.clone(),
    )
    .with_simulated_purchases(config.payments.simulate_purchases);
    let like_service = LikeService::new(
        like_repo,
        photo_repo.clone(),
        album_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    let comment_service = CommentService::new(
        comment_repo,
        photo_repo.clone(),
        album_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    let feed_service = FeedService::new(
        photo_repo.clone(),
        following_repo.clone(),
        unlock_repo,
    );
    let following_service = FollowingService::new(
        following_repo.clone(),
        blocking_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    let blocking_service =
        BlockingService::new(blocking_repo, following_repo, user_repo.clone());
    let payment_service = PaymentService::new(
        photo_repo,
        album_repo,
        user_repo.clone(),
        seller_repo.clone(),
        unlock_service,
        Arc::clone(&gateway),
        &server_url,
        marketplace_fee,
    );
    let seller_service = SellerService::new(
        seller_repo,
        user_repo.clone(),
        gateway,
        &frontend_url,
        &server_url,
        marketplace_fee,
    );
    let report_service = ReportService::new(report_repo, user_repo);

    let state = AppState {
        auth_service,
        account_service,
        photo_service,
        album_service,
        like_service,
        comment_service,
        feed_service,
        following_service,
        blocking_service,
        notification_service,
        payment_service,
        seller_service,
        report_service,
        chat_service,
        tokens: TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl_hours),
        storage,
        frontend_url,
        cookie_secure: config.auth.cookie_secure,
        streaming,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/streaming", get(streaming_handler))
        .nest("/api", api_router())
        .nest("/files", files_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            galeria_api::middleware::auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config))
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
