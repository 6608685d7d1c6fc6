//! travel-cloud: travel agency booking backend
//!
//! Long-running HTTP service that:
//! - Publishes the localized tour catalog, categories and announcements
//! - Accepts bookings with server-side pricing and emails both parties
//! - Provides customer accounts, reviews and currency conversion
//! - Exposes admin management of tours, bookings and announcements (JWT)

mod api;
mod auth;
mod config;
mod currency;
mod db;
mod email;
mod error;
mod pricing;
mod state;
mod util;

use std::net::SocketAddr;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travel_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting travel-cloud (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    bootstrap_admin(&state, &config).await?;

    let app = api::build_app(state.clone(), &config.cors_origins);

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup().await;
        }
    });

    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("travel-cloud HTTP listening on {http_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Create the configured admin account on first start
async fn bootstrap_admin(state: &AppState, config: &Config) -> Result<(), BoxError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };
    let email = util::normalize_email(email);
    let hashed = util::hash_password(password)
        .map_err(|e| format!("admin password hashing failed: {e}"))?;

    if db::users::ensure_admin(&state.pool, &email, &hashed, shared::util::now_millis()).await? {
        tracing::info!(email = %email, "Admin account created");
    }
    Ok(())
}
