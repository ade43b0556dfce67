use actix_web::{web, App, HttpServer};
use posts_service::clients::http::{
    HttpAttachmentResolver, HttpCrosspostLinker, HttpProfileResolver,
};
use posts_service::handlers;
use posts_service::middleware::{MetricsMiddleware, RequireAuth};
use posts_service::services::posts::PostsService;
use posts_service::Config;
use snowflake_id::SnowflakeGenerator;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {e}");
            eprintln!("ERROR: Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting posts-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database connection pool
    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {e}");
            eprintln!("ERROR: Failed to create database pool: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("Database migration failed: {e}");
        eprintln!("ERROR: Failed to run migrations: {e}");
        std::process::exit(1);
    }

    let ids = match SnowflakeGenerator::new(config.feed.machine_id) {
        Ok(gen) => Arc::new(gen),
        Err(e) => {
            tracing::error!("Id allocator initialization failed: {e}");
            std::process::exit(1);
        }
    };

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.services.request_timeout_ms))
        .build()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let service = PostsService::new(
        pool,
        ids,
        Duration::from_secs(config.feed.bucket_window_secs),
        Arc::new(HttpAttachmentResolver::new(
            http.clone(),
            config.services.storage_url.clone(),
        )),
        Arc::new(HttpProfileResolver::new(
            http.clone(),
            config.services.users_url.clone(),
        )),
        Arc::new(HttpCrosspostLinker::new(
            http,
            config.services.linkedacc_url.clone(),
        )),
    );
    let service = web::Data::new(service);

    let auth = RequireAuth::new(config.auth.signing_key.as_bytes());
    let bind_addr = (config.app.host.clone(), config.app.port);
    tracing::info!("Listening on {}:{}", config.app.host, config.app.port);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(MetricsMiddleware)
            .app_data(service.clone())
            .route("/health", web::get().to(handlers::health))
            .route("/metrics", web::get().to(handlers::metrics))
            .service(
                web::scope("/api/v1")
                    .wrap(auth.clone())
                    .configure(handlers::configure),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
