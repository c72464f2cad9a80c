use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod jwt;
mod lockout;
mod models;
mod repositories;
mod routes;
mod validation;

use common::database;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::{jwt::TokenService, lockout::LoginLockout, repositories::PrincipalRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub token_service: TokenService,
    pub principals: PrincipalRepository,
    pub lockout: LoginLockout,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting authentication service");

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize token service
    let jwt_config = jwt::JwtConfig::from_env()?;
    let token_service = TokenService::new(jwt_config);

    let principals = PrincipalRepository::new(pool.clone());
    let lockout = LoginLockout::new(lockout::LockoutConfig::default());

    let app_state = AppState {
        db_pool: pool,
        token_service,
        principals,
        lockout,
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

    let port = std::env::var("AUTH_PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Authentication service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
