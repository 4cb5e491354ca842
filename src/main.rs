mod albums;
mod assets;
mod auth;
mod config;
mod db;
mod error;
mod extractors;
mod routes;
mod state;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::{Cli, Config};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database
    let pool = db::create_pool(&config.db_path())?;
    db::run_migrations(&pool)?;

    // Build app state
    let state = AppState::new(pool, config.clone());

    // Build router
    let mut app = Router::new()
        .route("/health", get(health))
        .merge(routes::assets::router())
        .merge(routes::albums::router());

    // Test-only seed endpoint: creates a user + session, returns session cookie
    if std::env::var("FOTOTECA_TEST_SEED").is_ok() {
        app = app.route("/test/seed", get(test_seed));
    }

    let app = app.layer(TraceLayer::new_for_http()).with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

/// Test-only: seed a user + session and return the session cookie.
/// Only mounted when FOTOTECA_TEST_SEED env var is set.
async fn test_seed(State(state): State<AppState>) -> impl IntoResponse {
    let user = match db::users::create_user(&state.db, "testuser", None) {
        Ok(user) => user,
        Err(_) => {
            // user may already exist from a previous seed call
            let conn = state.db.get().unwrap();
            let id: String = conn
                .query_row(
                    "SELECT id FROM users WHERE username = 'testuser'",
                    [],
                    |r| r.get(0),
                )
                .unwrap();
            drop(conn);
            db::users::get_user(&state.db, &id).unwrap()
        }
    };

    let token = auth::session::create_session(
        &state.db,
        &user.id,
        state.config.auth.session_hours,
    )
    .unwrap();

    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age=3600",
        state.config.auth.cookie_name, token
    );

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        format!("{{\"user_id\":\"{}\",\"username\":\"testuser\"}}", user.id),
    )
}
