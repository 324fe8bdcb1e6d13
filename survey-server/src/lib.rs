//! survey-server library - survey authoring and reply service
//!
//! Admins author surveys and browse the replies to them; anyone may list
//! surveys and submit a reply.

use std::time::Duration;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod session;

pub use session::{Principal, SessionStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Logged-in admins by session token
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            sessions: SessionStore::new(),
        }
    }

    /// State whose admin sessions lapse after `ttl`
    pub fn with_session_ttl(db: SqlitePool, ttl: Duration) -> Self {
        Self {
            db,
            sessions: SessionStore::with_ttl(ttl),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route(
            "/surveys",
            get(api::list_surveys).post(api::create_survey),
        )
        .route("/surveys/:survey_id", get(api::get_survey))
        .route(
            "/surveys/:survey_id/survey-replies",
            post(api::create_survey_reply),
        )
        .route(
            "/surveys/:survey_id/survey-replies/:reply_id",
            get(api::get_survey_reply),
        )
        .route("/sessions", post(api::login))
        .route(
            "/sessions/current",
            get(api::current_session).delete(api::logout),
        );

    Router::new()
        .nest("/api", api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
