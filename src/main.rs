use actix_web::{middleware, web, App, HttpServer};
use chrono::Utc;
use std::io::{Error, ErrorKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod handlers;

use handlers::{calculate, health, share};
use surebet::share::{JsonDirShareStore, MemoryShareStore, ShareCodec, ShareStore};

/// How often expired shares are swept while the server runs
const SHARE_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Application state shared across handlers
pub struct AppState {
    pub codec: ShareCodec<Arc<dyn ShareStore>>,
    /// Bet-entry form that receives the ledger hand-off
    pub ledger_base_url: String,
    pub store_kind: &'static str,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::new(ErrorKind::Other, e))?;

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("{}:{}", host, port);

    let ledger_base_url =
        std::env::var("LEDGER_BASE_URL").unwrap_or_else(|_| "/bets/new".to_string());

    // Shares live on disk when SHARE_DIR is set, in memory otherwise
    let (store, store_kind): (Arc<dyn ShareStore>, &'static str) =
        match std::env::var("SHARE_DIR").map(PathBuf::from) {
            Ok(dir) => {
                info!("Storing shares in {:?}", dir);
                (Arc::new(JsonDirShareStore::new(dir)), "json-dir")
            }
            Err(_) => {
                warn!("SHARE_DIR not set, shares will not survive a restart");
                (Arc::new(MemoryShareStore::new()), "memory")
            }
        };

    let app_state = Arc::new(AppState {
        codec: ShareCodec::new(store),
        ledger_base_url,
        store_kind,
    });

    // The first tick fires immediately, so this also cleans up at startup
    let sweeper = app_state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(SHARE_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(e) = sweeper.codec.purge_expired(Utc::now()).await {
                warn!("Failed to clean up expired shares: {}", e);
            }
        }
    });

    info!("Starting Surebet API server at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health::health_check))
            .route(
                "/calculate/dutching",
                web::post().to(calculate::calculate_dutching),
            )
            .route(
                "/calculate/aumentada",
                web::post().to(calculate::calculate_aumentada),
            )
            .route(
                "/calculate/limitation",
                web::post().to(calculate::calculate_limitation),
            )
            .route(
                "/calculate/extraction",
                web::post().to(calculate::calculate_extraction),
            )
            .route("/ledger-url", web::post().to(calculate::ledger_url))
            .route("/share", web::post().to(share::create_share))
            .route("/share/{code}", web::get().to(share::get_share))
    })
    .bind(&addr)?
    .run()
    .await
}
