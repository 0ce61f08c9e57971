//! Session request handlers: register, login, logout, current, premium.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum_extra::extract::cookie::CookieJar;
use globaltech_core::auth::session::{self, PREMIUM_UPGRADE_MESSAGE, Session};
use globaltech_core::models::auth::{CurrentUser, Registration};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::session::AuthenticatedUser;
use crate::models::{LoginRequest, MessageResponse, RegisterResponse};
use crate::services::cookies::{clear_session_cookie, session_cookie};

fn with_session_cookie(state: &AppState, jar: CookieJar, session: &Session) -> CookieJar {
    jar.add(session_cookie(
        &session.token,
        state.auth().token_ttl_secs,
        state.config.secure_cookies,
    ))
}

/// `POST /api/sessions/register`: create a user with role `user`.
pub async fn register_handler(
    State(state): State<AppState>,
    body: Result<Json<Registration>, JsonRejection>,
) -> AppResult<Json<RegisterResponse>> {
    let Json(candidate) = body?;
    let user = session::register(state.store(), state.auth(), candidate).await?;
    Ok(Json(RegisterResponse {
        status_code: 200,
        user,
    }))
}

/// `POST /api/sessions/login`: authenticate and set the session cookie.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    let Json(body) = body?;
    let session =
        session::login(state.store(), state.auth(), &body.email, &body.password).await?;
    let jar = with_session_cookie(&state, jar, &session);
    Ok((jar, Json(MessageResponse::ok("Login successful"))))
}

/// `POST /api/sessions/logout`: expire the session cookie.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(clear_session_cookie(state.config.secure_cookies));
    (jar, Json(MessageResponse::ok("Logout successful")))
}

/// `GET /api/sessions/current`: the caller's session projection.
pub async fn current_handler(
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
) -> Json<CurrentUser> {
    Json(session::current(&user.0))
}

/// `POST /api/sessions/premium/{uid}`: upgrade to premium and re-issue the
/// session cookie.
pub async fn premium_handler(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthenticatedUser>,
    jar: CookieJar,
    path: Result<Path<String>, PathRejection>,
) -> AppResult<(CookieJar, Json<MessageResponse>)> {
    let Path(uid) = path?;
    let session =
        session::upgrade_to_premium(state.store(), state.auth(), &user.0, &uid).await?;
    let jar = with_session_cookie(&state, jar, &session);
    Ok((jar, Json(MessageResponse::ok(PREMIUM_UPGRADE_MESSAGE))))
}
