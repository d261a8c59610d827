mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::audit::{AuditService, PgAuditRepository};
use crate::features::auth::clients::SupabaseAuthClient;
use crate::features::auth::{routes as auth_routes, AuthService, JwtValidator};
use crate::features::classification::{ClassificationService, OpenAiClassifier};
use crate::features::files::{routes as files_routes, FileService, IngestionService, PgFileRepository};
use crate::features::folders::{routes as folders_routes, FolderService, PgFolderRepository};
use crate::features::users::PgUserRepository;
use crate::features::whatsapp::{
    routes as whatsapp_routes, GraphApiClient, PgSessionRepository, WhatsAppService,
};
use crate::modules::storage::S3ObjectStore;
use axum::{extract::DefaultBodyLimit, middleware::from_fn_with_state, Router};
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

    // Repositories
    let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
    let folder_repository = Arc::new(PgFolderRepository::new(pool.clone()));
    let file_repository = Arc::new(PgFileRepository::new(pool.clone()));
    let session_repository = Arc::new(PgSessionRepository::new(pool.clone()));
    let audit_service = Arc::new(AuditService::new(Arc::new(PgAuditRepository::new(
        pool.clone(),
    ))));

    // Initialize auth
    let jwt_validator = Arc::new(JwtValidator::new(
        &config.auth.jwt_secret,
        config.auth.jwt_leeway,
        user_repository.clone(),
    ));
    let identity_provider = Arc::new(
        SupabaseAuthClient::new(&config.auth)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Supabase auth client: {}", e))?,
    );
    let auth_service = Arc::new(AuthService::new(
        identity_provider,
        user_repository.clone(),
    ));
    tracing::info!("Auth service initialized ({})", config.auth.supabase_url);

    // Initialize S3 storage
    let object_store = Arc::new(
        S3ObjectStore::new(&config.storage)
            .map_err(|e| anyhow::anyhow!("Failed to initialize S3 client: {}", e))?,
    );
    tracing::info!(
        "S3 object store initialized for bucket: {}",
        object_store.bucket_name()
    );

    // Initialize classification
    let classifier = Arc::new(
        OpenAiClassifier::new(&config.openai)
            .map_err(|e| anyhow::anyhow!("Failed to initialize OpenAI client: {}", e))?,
    );
    let classification_service = Arc::new(ClassificationService::new(classifier));
    tracing::info!(
        "Classification service initialized (model: {})",
        config.openai.model
    );

    // Initialize file services
    let file_service = Arc::new(FileService::new(
        file_repository.clone(),
        object_store.clone(),
        audit_service.clone(),
        config.storage.presigned_url_expiry_secs,
    ));
    let ingestion_service = Arc::new(IngestionService::new(
        classification_service,
        object_store.clone(),
        file_repository.clone(),
        folder_repository.clone(),
        audit_service.clone(),
        config.vault.encryption_key.clone(),
    ));
    tracing::info!("File services initialized");

    // Initialize folder service
    let folder_service = Arc::new(FolderService::new(folder_repository, audit_service));
    tracing::info!("Folder service initialized");

    // Initialize WhatsApp bot
    let messenger = Arc::new(
        GraphApiClient::new(&config.whatsapp)
            .map_err(|e| anyhow::anyhow!("Failed to initialize WhatsApp client: {}", e))?,
    );
    let whatsapp_service = Arc::new(WhatsAppService::new(
        session_repository,
        user_repository,
        file_repository,
        object_store,
        messenger,
        config.whatsapp.verify_token.clone(),
    ));
    tracing::info!("WhatsApp service initialized");

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
            .layer(from_fn_with_state(
                Arc::new(credentials),
                middleware::basic_auth_middleware,
            ))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .merge(files_routes::routes(file_service, ingestion_service))
        .merge(folders_routes::routes(folder_service))
        .route_layer(from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(auth_routes::public_routes(auth_service))
        .merge(whatsapp_routes::routes(whatsapp_service));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
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
