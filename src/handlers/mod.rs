pub mod admin;
pub mod api;
pub mod form;

use crate::error::QrgenError;
use crate::service::qr;
use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header,
    response::{IntoResponse, Response},
};
use axum_extra::TypedHeader;
use headers::Host;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// `?table=` on pages that default to the configured table.
#[derive(Debug, Deserialize)]
pub struct TableQuery {
    pub table: Option<String>,
}

/// Body accepted either as `application/json` or as a urlencoded form.
#[derive(Debug)]
pub struct FormOrJson<T>(pub T);

impl<S, T> FromRequest<S> for FormOrJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));
        if is_json {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        }
    }
}

/// Record ids arrive as raw path text. Anything that is not an `s_no` cannot
/// name a record, so it reads as not found.
pub(crate) fn parse_record_id(raw: &str) -> Result<i64, QrgenError> {
    raw.parse().map_err(|_| QrgenError::NotFound)
}

/// Plain-text error page. Internal details are logged, never sent.
pub(crate) fn page_error(err: QrgenError) -> Response {
    err.log_internal();
    (err.status(), err.public_message()).into_response()
}

/// Prefix for `/api/item/{id}` links: absolute when the request names its host.
pub(crate) fn api_item_base(host: Option<TypedHeader<Host>>) -> String {
    match host {
        Some(TypedHeader(host)) => format!("http://{host}/api/item/"),
        None => "/api/item/".to_string(),
    }
}

/// QR data URLs for each `(payload, size)` pair, rendered off the async runtime.
pub(crate) async fn encode_blocking(
    jobs: Vec<(String, u32)>,
) -> Result<Vec<String>, QrgenError> {
    tokio::task::spawn_blocking(move || {
        jobs.iter()
            .map(|(payload, size)| qr::encode_data_url(payload.as_bytes(), *size))
            .collect()
    })
    .await
    .map_err(|e| QrgenError::Task(e.to_string()))?
}
