use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use pantry_finder::config::{LoggingSettings, Settings, StoreBackend};
use pantry_finder::core::{Clock, SystemClock};
use pantry_finder::routes::{self, pantries::AppState};
use pantry_finder::services::{AppwriteClient, CacheManager, InMemoryPantryStore, PantryCatalog, PantrySource, ReviewStore};
use std::sync::Arc;
use tracing::{info, error, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_tracing(logging: &LoggingSettings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn io_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration comes first so logging can honour it
    let settings = Settings::load().map_err(|e| io_error(format!("Configuration error: {}", e)))?;

    init_tracing(&settings.logging);

    info!("Starting pantry finder service...");

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(1000);

    let cache = match CacheManager::new(settings.cache.redis_url.as_deref(), l1_cache_size, cache_ttl).await {
        Ok(c) => {
            info!("Cache manager initialized (L1: {} entries, L2: {}, TTL: {}s)", l1_cache_size, c.has_l2(), cache_ttl);
            Arc::new(c)
        }
        Err(e) => {
            warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
            Arc::new(CacheManager::in_memory(l1_cache_size, cache_ttl))
        }
    };

    let reviews = match &settings.database {
        Some(db) => {
            let store = ReviewStore::from_settings(
                &db.url,
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                io_error(format!("PostgreSQL connection error: {}", e))
            })?;
            info!("Review store initialized");
            Some(Arc::new(store))
        }
        None => {
            info!("No database configured, reviews disabled");
            None
        }
    };

    let source = match settings.store.backend {
        StoreBackend::Appwrite => {
            let appwrite = settings
                .appwrite
                .clone()
                .ok_or_else(|| io_error("store.backend is appwrite but [appwrite] is not configured".to_string()))?;
            let client = AppwriteClient::new(
                appwrite.endpoint,
                appwrite.api_key,
                appwrite.project_id,
                appwrite.database_id,
                appwrite.pantries_collection,
            )
            .map_err(|e| io_error(format!("Failed to create Appwrite client: {}", e)))?;
            PantrySource::Appwrite(client)
        }
        StoreBackend::Memory => {
            let store = match &settings.store.seed_file {
                Some(path) => InMemoryPantryStore::from_json_file(path)
                    .map_err(|e| io_error(e.to_string()))?,
                None => InMemoryPantryStore::default(),
            };
            PantrySource::InMemory(store)
        }
    };

    info!("Pantry source: {}", source.backend_name());

    let clock: Arc<dyn Clock> = match settings.search.utc_offset_minutes {
        Some(minutes) => Arc::new(
            SystemClock::with_utc_offset_minutes(minutes)
                .ok_or_else(|| io_error(format!("Invalid UTC offset: {} minutes", minutes)))?,
        ),
        None => Arc::new(SystemClock::local()),
    };

    let app_state = AppState {
        catalog: Arc::new(PantryCatalog::new(source, reviews, cache.clone())),
        cache,
        clock,
        default_limit: settings.search.default_limit,
        max_limit: settings.search.max_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
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
