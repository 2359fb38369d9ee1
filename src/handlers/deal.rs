use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    entities::deals,
    error::{AppError, AppResult},
    models::deal::ImportReportResponse,
    services::deal_importer::BatchRow,
    AppState,
};

/// Handler for POST /api/deals/save
///
/// An empty body or a JSON `null` is treated as a missing payload. Well-formed
/// JSON that is not shaped like a deal is a validation failure.
pub async fn save_deal(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<deals::Model>> {
    let row = parse_optional_body::<Value>(&body)?
        .map_or(BatchRow::Submitted(None), BatchRow::from);

    let saved = state.importer.submit_row(row).await?;

    Ok(Json(saved))
}

/// Handler for POST /api/deals/import
///
/// Returns the saved deals; rows that were skipped are only logged. Fails with
/// 400 when no row could be saved.
pub async fn import_deals(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Vec<deals::Model>>> {
    let deals = parse_batch_body(&body)?;
    tracing::info!("Received import request with {} deals", deals.len());

    let report = state.importer.import_batch(deals).await?;

    Ok(Json(report.saved))
}

/// Handler for POST /api/deals/import/report
///
/// Same processing as `/import`, but always answers with the full per-row report.
pub async fn import_deals_report(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<ImportReportResponse>> {
    let deals = parse_batch_body(&body)?;

    let report = state.importer.process_batch(deals).await;

    Ok(Json(ImportReportResponse {
        saved_count: report.saved_count(),
        skipped_count: report.skipped_count(),
        processed: report.processed,
        saved: report.saved,
        errors: report.errors,
    }))
}

/// Handler for GET /api/deals/check-duplicate/{deal_unique_id}
pub async fn check_duplicate(
    State(state): State<AppState>,
    Path(deal_unique_id): Path<String>,
) -> AppResult<Json<bool>> {
    let exists = state
        .importer
        .duplicates()
        .exists(Some(deal_unique_id.as_str()))
        .await?;

    Ok(Json(exists))
}

fn parse_optional_body<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice::<Option<T>>(body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)))
}

/// Rows are read one by one so a row with the wrong shape only skips itself
fn parse_batch_body(body: &[u8]) -> Result<Vec<BatchRow>, AppError> {
    let rows = parse_optional_body::<Vec<Value>>(body)?.ok_or_else(|| {
        AppError::BadRequest("Request body must be a JSON array of deals".to_string())
    })?;

    Ok(rows.into_iter().map(BatchRow::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::deal::SubmittedDeal;

    #[test]
    fn test_empty_and_null_bodies_are_missing_payloads() {
        assert!(parse_optional_body::<SubmittedDeal>(b"").unwrap().is_none());
        assert!(parse_optional_body::<SubmittedDeal>(b"  \n").unwrap().is_none());
        assert!(parse_optional_body::<SubmittedDeal>(b"null").unwrap().is_none());
    }

    #[test]
    fn test_malformed_body_is_bad_request() {
        let err = parse_optional_body::<SubmittedDeal>(b"{not json").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_batch_body_must_be_an_array() {
        assert!(matches!(parse_batch_body(b""), Err(AppError::BadRequest(_))));
        assert!(matches!(
            parse_batch_body(br#"{"dealUniqueId": "A"}"#),
            Err(AppError::BadRequest(_))
        ));
        assert_eq!(parse_batch_body(b"[]").unwrap().len(), 0);
    }

    #[test]
    fn test_batch_body_keeps_mistyped_rows() {
        let rows = parse_batch_body(br#"[{"dealUniqueId": "A"}, {"dealUniqueId": 42}, null]"#)
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert!(matches!(rows[0], BatchRow::Submitted(Some(_))));
        assert!(matches!(rows[1], BatchRow::Unreadable(_)));
        assert!(matches!(rows[2], BatchRow::Submitted(None)));
    }
}
