use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use lume_relations::config::{Settings, StorageBackend};
use lume_relations::routes::{self, AppState};
use lume_relations::services::{MemoryStore, PostgresStore, RelationshipStore};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Lume Relations service...");

    // Load configuration
    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    let store: Arc<dyn RelationshipStore> = match settings.storage.backend {
        StorageBackend::Postgres => {
            let db_max_conn = settings.database.max_connections.unwrap_or(10);
            let postgres = PostgresStore::from_settings(
                &settings.database.url,
                Some(db_max_conn),
                settings.database.min_connections,
                settings.database.acquire_timeout_secs,
                settings.database.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;

            info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);
            Arc::new(postgres)
        }
        StorageBackend::Memory => {
            info!("Using in-memory store, nothing will be persisted");
            Arc::new(MemoryStore::new())
        }
    };

    let policy = settings.matching.policy();
    info!("Matching policy: {:?}", policy);

    // Build application state
    let app_state = AppState::new(store, policy, &settings.auth.jwt_secret);

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(routes::handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
