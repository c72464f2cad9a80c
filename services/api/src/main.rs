use anyhow::Result;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod error;
mod middleware;
mod models;
mod policy;
mod repositories;
mod routes;
mod state;
mod upload;

use common::database;
use tower_http::cors::{Any, CorsLayer};

use crate::middleware::TokenVerifier;
use crate::repositories::{
    AccountRepository, BranchRepository, MaterialRepository, NoticeRepository,
    SubjectRepository, TimetableRepository,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Token verification shares the secret with the auth service
    let verifier = TokenVerifier::from_env()?;

    let media_dir = PathBuf::from(std::env::var("MEDIA_DIR").unwrap_or_else(|_| "media".to_string()));
    tokio::fs::create_dir_all(&media_dir).await?;

    let app_state = AppState {
        db_pool: pool.clone(),
        verifier,
        accounts: AccountRepository::new(pool.clone()),
        branches: BranchRepository::new(pool.clone()),
        subjects: SubjectRepository::new(pool.clone()),
        notices: NoticeRepository::new(pool.clone()),
        timetables: TimetableRepository::new(pool.clone()),
        materials: MaterialRepository::new(pool),
        media_dir,
    };

    let cors = match std::env::var("CORS_ORIGIN") {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => CorsLayer::permissive(),
    };

    // Start the web server
    let app = routes::create_router(app_state).layer(cors);

    let port = std::env::var("PORT").unwrap_or_else(|_| "4000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
