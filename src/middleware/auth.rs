use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use time::Duration;

use crate::router::QrgenState;
use crate::service::sessions::AdminSession;

pub const SESSION_COOKIE: &str = "qrgen.sid";
pub const LOGIN_PATH: &str = "/admin/login";

/// Session id carried by the private cookie, if any.
pub fn session_id(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_owned())
}

/// Extractor for admin-only routes. Without a live session the request is
/// redirected to the login page.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AdminSession);

impl FromRequestParts<QrgenState> for RequireAdmin {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &QrgenState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(jar) = PrivateCookieJar::<Key>::from_request_parts(parts, state).await;
        let Some(id) = session_id(&jar) else {
            return Err(Redirect::to(LOGIN_PATH).into_response());
        };
        state
            .auth
            .require_session(&id)
            .await
            .map(RequireAdmin)
            .map_err(|_| Redirect::to(LOGIN_PATH).into_response())
    }
}

pub fn session_cookie(session_id: String, ttl_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(ttl_secs))
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}
