use crate::db::Record;
use crate::error::QrgenError;
use crate::handlers::parse_record_id;
use crate::router::QrgenState;
use axum::{
    Json,
    extract::{Path, State},
};

/// GET /api/item/{id}
///
/// Always reads the configured `api_table`; unlike the HTML routes it takes no
/// `?table=` parameter.
pub async fn get_item(
    State(state): State<QrgenState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, QrgenError> {
    let id = parse_record_id(&id)?;
    let table = state.registry.resolve(&state.api_table).await?;
    let record = state
        .store
        .get_by_id(&table, id)
        .await?
        .ok_or(QrgenError::NotFound)?;
    Ok(Json(record))
}
