mod core;
mod features;
mod modules;
mod shared;

use crate::core::clock::{Clock, SystemClock};
use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::appointments::schedule::PgScheduleIndex;
use crate::features::appointments::{routes as appointments_routes, AppointmentScheduler};
use crate::features::auth;
use crate::features::residents::{
    routes as residents_routes, HttpResidentDirectory, ResidentDirectory,
};
use crate::features::statistics::{routes as statistics_routes, StatisticsService};
use crate::features::tickets::repositories::TicketRepository;
use crate::features::tickets::{
    routes as tickets_routes, PgTicketRepository, TicketService, TicketStore,
};
use crate::modules::notifications::{LogNotifier, Notifier, WebhookNotifier};
use crate::modules::storage::{BlobStorage, S3BlobStorage};
use axum::extract::{DefaultBodyLimit, State};
use axum::{middleware::from_fn, Router};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.issuer,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.roles_claim.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!(
        "Auth configuration initialized (roles claim: {})",
        config.auth.roles_claim
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let offset = config.scheduling.offset();
    tracing::info!("Office clock offset: {}", offset);

    // Initialize outbound notifications
    let notifier: Arc<dyn Notifier> = match config.notification.webhook_url.clone() {
        Some(url) => {
            tracing::info!("Ticket events delivered to webhook {}", url);
            Arc::new(
                WebhookNotifier::new(url, config.notification.timeout)
                    .map_err(|e| anyhow::anyhow!("Failed to create webhook notifier: {}", e))?,
            )
        }
        None => {
            tracing::info!("No notification webhook configured; ticket events are only logged");
            Arc::new(LogNotifier)
        }
    };

    // Initialize document storage
    let storage: Arc<dyn BlobStorage> = Arc::new(
        S3BlobStorage::new(config.storage.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize document storage: {}", e))?,
    );
    tracing::info!("Document storage initialized for bucket: {}", config.storage.bucket);

    // Initialize resident directory client
    let resident_directory: Arc<dyn ResidentDirectory> = Arc::new(
        HttpResidentDirectory::new(
            &config.resident_directory.base_url,
            config.resident_directory.timeout,
        )
        .map_err(|e| anyhow::anyhow!("Failed to create resident directory client: {}", e))?,
    );
    tracing::info!(
        "Resident directory client initialized: {}",
        config.resident_directory.base_url
    );

    // Initialize ticket persistence and scheduling
    let ticket_repository: Arc<dyn TicketRepository> =
        Arc::new(PgTicketRepository::new(pool.clone()));
    let ticket_store = Arc::new(TicketStore::new(
        Arc::clone(&ticket_repository),
        Arc::clone(&clock),
        offset,
    ));
    let appointment_scheduler = Arc::new(AppointmentScheduler::new(
        Arc::clone(&ticket_store),
        Arc::new(PgScheduleIndex::new(pool.clone())),
        Arc::clone(&notifier),
        Arc::clone(&clock),
        offset,
    ));
    tracing::info!("Appointment scheduler initialized");

    let ticket_service = Arc::new(TicketService::new(
        Arc::clone(&ticket_store),
        Arc::clone(&appointment_scheduler),
        storage,
        notifier,
        clock,
    ));
    tracing::info!("Ticket service initialized");

    let statistics_service = Arc::new(StatisticsService::new(ticket_repository));
    tracing::info!("Statistics service initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(tickets_routes::routes(ticket_service))
        .merge(appointments_routes::routes(appointment_scheduler))
        .merge(statistics_routes::routes(statistics_service))
        .merge(residents_routes::routes(resident_directory))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Health check pings the database (no auth required)
    async fn health_check(State(pool): State<PgPool>) -> axum::http::StatusCode {
        match database::ping(&pool).await {
            Ok(()) => axum::http::StatusCode::OK,
            Err(e) => {
                tracing::warn!("Health check failed: {}", e);
                axum::http::StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
    let health_route = Router::new()
        .route("/health", axum::routing::get(health_check))
        .with_state(pool);

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
