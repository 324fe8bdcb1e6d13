//! Admin login and logout

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use survey_common::db;
use survey_common::model::Admin;
use tracing::info;

use crate::error::ApiResult;
use crate::session::{expired_session_cookie, session_cookie, session_token, Principal};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/sessions
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(credentials) = payload?;
    let admin = db::login_admin(&state.db, &credentials.username, &credentials.password).await?;

    let token = state.sessions.create(admin.clone()).await;
    info!("Admin '{}' logged in", admin.username);

    Ok((jar.add(session_cookie(token)), Json(admin)))
}

/// DELETE /api/sessions/current
///
/// Succeeds whether or not a session was active.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(token) = session_token(&jar) {
        if let Some(admin) = state.sessions.remove(&token).await {
            info!("Admin '{}' logged out", admin.username);
        }
    }

    (StatusCode::OK, jar.add(expired_session_cookie()))
}

/// GET /api/sessions/current
pub async fn current_session(principal: Principal) -> Json<Admin> {
    Json(principal.0)
}
