use crate::db::{NewRecord, TableName};
use crate::error::QrgenError;
use crate::handlers::{
    FormOrJson, TableQuery, api_item_base, encode_blocking, page_error, parse_record_id,
};
use crate::router::QrgenState;
use crate::service::qr::SUCCESS_PX;
use crate::views::{FormTemplate, FormValues, SuccessTemplate, render};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::TypedHeader;
use headers::Host;
use serde::Deserialize;
use tracing::info;

/// Body of `POST /form`. Missing fields deserialize as empty and fail validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FormSubmission {
    pub table: String,
    pub lp_no: String,
    pub items: String,
    pub issue_voucher_number: String,
}

impl From<FormSubmission> for FormValues {
    fn from(s: FormSubmission) -> Self {
        Self {
            table: s.table,
            lp_no: s.lp_no,
            items: s.items,
            issue_voucher_number: s.issue_voucher_number,
        }
    }
}

/// GET /form
pub async fn form_page() -> Result<Html<String>, QrgenError> {
    render(&FormTemplate {
        error: None,
        values: FormValues::default(),
    })
}

/// POST /form -> redirect to the success page of the new record.
pub async fn form_submit(
    State(state): State<QrgenState>,
    FormOrJson(submission): FormOrJson<FormSubmission>,
) -> Response {
    match save(&state, &submission).await {
        Ok((table, s_no)) => Redirect::to(&success_location(s_no, &table)).into_response(),
        Err(err) => {
            // An unknown table is a bad submission here, not a missing page.
            let status = match &err {
                QrgenError::UnknownTable { .. } => StatusCode::BAD_REQUEST,
                other => other.status(),
            };
            err.log_internal();
            let template = FormTemplate {
                error: Some(err.public_message()),
                values: submission.into(),
            };
            match render(&template) {
                Ok(html) => (status, html).into_response(),
                Err(e) => page_error(e),
            }
        }
    }
}

async fn save(state: &QrgenState, sub: &FormSubmission) -> Result<(TableName, i64), QrgenError> {
    if sub.table.is_empty() {
        return Err(QrgenError::Validation("All fields are required.".to_string()));
    }
    let record = NewRecord::new(&sub.lp_no, &sub.items, &sub.issue_voucher_number)?;
    let table = state.registry.resolve(&sub.table).await?;
    let s_no = state.store.insert(&table, &record).await?;
    info!(table = %table, s_no, "record saved");
    Ok((table, s_no))
}

fn success_location(s_no: i64, table: &TableName) -> String {
    let table: String = url::form_urlencoded::byte_serialize(table.as_str().as_bytes()).collect();
    format!("/success/{s_no}?table={table}")
}

/// GET /success/{id}?table=T
pub async fn success_page(
    State(state): State<QrgenState>,
    Path(id): Path<String>,
    Query(query): Query<TableQuery>,
    host: Option<TypedHeader<Host>>,
) -> Response {
    let id = match parse_record_id(&id) {
        Ok(id) => id,
        Err(err) => return page_error(err),
    };
    let table = query
        .table
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| state.default_table.to_string());
    match success_view(&state, id, &table, api_item_base(host)).await {
        Ok(html) => html.into_response(),
        Err(err) => page_error(err),
    }
}

async fn success_view(
    state: &QrgenState,
    id: i64,
    table: &str,
    api_base: String,
) -> Result<Html<String>, QrgenError> {
    let table = state.registry.resolve(table).await?;
    let record = state
        .store
        .get_by_id(&table, id)
        .await?
        .ok_or(QrgenError::NotFound)?;

    let json_text = record.payload()?;
    let qr_data_url = encode_blocking(vec![(json_text.clone(), SUCCESS_PX)])
        .await?
        .pop()
        .ok_or_else(|| QrgenError::Task("QR encoder returned no image".to_string()))?;

    render(&SuccessTemplate {
        json_url: format!("{api_base}{}", record.s_no),
        table: table.to_string(),
        record,
        qr_data_url,
        json_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_submission_fields_default_to_empty() {
        let sub: FormSubmission = serde_json::from_str(r#"{"table":"it"}"#).unwrap();
        assert_eq!(sub.table, "it");
        assert!(sub.lp_no.is_empty());
        assert!(sub.items.is_empty());
    }
}
