use crate::db::Record;
use crate::error::QrgenError;
use crate::handlers::{FormOrJson, TableQuery, api_item_base, encode_blocking, page_error};
use crate::middleware::RequireAdmin;
use crate::middleware::auth::{LOGIN_PATH, clear_session_cookie, session_cookie, session_id};
use crate::router::QrgenState;
use crate::service::qr::{PRINT_PX, THUMBNAIL_PX};
use crate::views::{AdminPanelTemplate, ListedRecord, LoginTemplate, render};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::TypedHeader;
use axum_extra::extract::cookie::PrivateCookieJar;
use headers::Host;
use serde::Deserialize;

const PANEL_PATH: &str = "/admin";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

fn login_view(status: StatusCode, error: Option<String>) -> Response {
    match render(&LoginTemplate { error }) {
        Ok(html) => (status, html).into_response(),
        Err(e) => page_error(e),
    }
}

/// GET /admin/login
pub async fn login_page(State(state): State<QrgenState>, jar: PrivateCookieJar) -> Response {
    if let Some(id) = session_id(&jar)
        && state.auth.require_session(&id).await.is_ok()
    {
        return Redirect::to(PANEL_PATH).into_response();
    }
    login_view(StatusCode::OK, None)
}

/// POST /admin/login
pub async fn login_submit(
    State(state): State<QrgenState>,
    jar: PrivateCookieJar,
    FormOrJson(form): FormOrJson<LoginForm>,
) -> Response {
    match state.auth.login(&form.username, &form.password).await {
        Ok(session) => {
            let ttl = state.auth.sessions().ttl().num_seconds();
            let jar = jar.add(session_cookie(session.session_id, ttl, state.secure_cookie));
            (jar, Redirect::to(PANEL_PATH)).into_response()
        }
        Err(QrgenError::InvalidCredentials) => login_view(
            StatusCode::UNAUTHORIZED,
            Some(QrgenError::InvalidCredentials.public_message()),
        ),
        Err(err) => {
            err.log_internal();
            login_view(err.status(), Some(err.public_message()))
        }
    }
}

/// POST /admin/logout
pub async fn logout(State(state): State<QrgenState>, jar: PrivateCookieJar) -> Response {
    if let Some(id) = session_id(&jar) {
        state.auth.logout(&id).await;
    }
    let jar = jar.remove(clear_session_cookie());
    (jar, Redirect::to(LOGIN_PATH)).into_response()
}

/// GET /admin?table=T
pub async fn admin_panel(
    RequireAdmin(session): RequireAdmin,
    State(state): State<QrgenState>,
    Query(query): Query<TableQuery>,
    host: Option<TypedHeader<Host>>,
) -> Response {
    let table = query
        .table
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| state.default_table.to_string());

    let resolved = match state.registry.resolve(&table).await {
        Ok(t) => t,
        Err(QrgenError::UnknownTable { name, available }) => {
            return (
                StatusCode::NOT_FOUND,
                format!(
                    "Table '{name}' not found. Available tables: {}",
                    available.join(", ")
                ),
            )
                .into_response();
        }
        Err(err) => return page_error(err),
    };

    let records = match state.store.list_all(&resolved).await {
        Ok(rows) => rows,
        Err(err) => return page_error(err),
    };
    let tables = match state.registry.list_tables().await {
        Ok(t) => t,
        Err(err) => return page_error(err),
    };

    let items = match listing(records, api_item_base(host)).await {
        Ok(items) => items,
        Err(err) => return page_error(err),
    };

    let template = AdminPanelTemplate {
        username: session.username,
        current_table: resolved.to_string(),
        tables,
        items,
    };
    match render(&template) {
        Ok(html) => html.into_response(),
        Err(err) => page_error(err),
    }
}

/// Attach a thumbnail, a printable image and the JSON link to every row.
async fn listing(records: Vec<Record>, api_base: String) -> Result<Vec<ListedRecord>, QrgenError> {
    let payloads = records
        .iter()
        .map(Record::payload)
        .collect::<Result<Vec<_>, _>>()?;

    let jobs = payloads
        .iter()
        .flat_map(|p| [(p.clone(), THUMBNAIL_PX), (p.clone(), PRINT_PX)])
        .collect();
    let mut images = encode_blocking(jobs).await?.into_iter();

    records
        .into_iter()
        .zip(payloads)
        .map(|(record, json_text)| {
            let (Some(qr), Some(qr_hd)) = (images.next(), images.next()) else {
                return Err(QrgenError::Task("QR encoder returned too few images".to_string()));
            };
            Ok(ListedRecord {
                json_url: format!("{api_base}{}", record.s_no),
                record,
                qr,
                qr_hd,
                json_text,
            })
        })
        .collect()
}
