//! Report generation and snapshot export.
//!
//! `query` runs the whole read path in one request: parse the prompt,
//! build the plan, execute with the preview cap, and freeze the rows into
//! a snapshot. `export` re-serves the snapshot with pagination; it never
//! re-runs the query, so an export always matches the preview.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use ventas_core::report::{build_plan, parse_prompt, OutputFormat, ParsedPrompt};
use ventas_core::validation::validate_prompt;

use crate::config::MAX_EXPORT_PAGE_SIZE;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub query_id: String,
    pub parsed_data: ParsedPrompt,
    /// The resolved query, as rendered SQL.
    pub query: String,
    pub results: Vec<Value>,
    pub total_records: usize,
    pub format: OutputFormat,
}

pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> ApiResult<Json<QueryResponse>> {
    let prompt = validate_prompt(&req.prompt).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let parsed = parse_prompt(&prompt);
    let plan = build_plan(&parsed);

    let (results, rendered) = state.db.reports().run(&plan).await?;
    let snapshot = state
        .db
        .reports()
        .save_snapshot(&prompt, &rendered, &results, plan.format)
        .await?;

    info!(
        query_id = %snapshot.id,
        rows = results.len(),
        format = plan.format.as_str(),
        "report generated"
    );

    Ok(Json(QueryResponse {
        query_id: snapshot.id,
        parsed_data: parsed,
        query: rendered.sql,
        total_records: results.len(),
        results,
        format: plan.format,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub report_id: String,
    pub prompt: String,
    pub page: i64,
    pub page_size: i64,
    pub total_records: i64,
    pub total_pages: i64,
    pub results: Vec<Value>,
}

pub async fn export(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ExportParams>,
) -> ApiResult<Json<ExportResponse>> {
    let format = match params.format.as_deref() {
        None => OutputFormat::Json,
        Some(token) => OutputFormat::parse(token)
            .ok_or_else(|| ApiError::UnsupportedFormat(token.to_string()))?,
    };
    if format != OutputFormat::Json {
        return Err(ApiError::UnsupportedFormat(format.as_str().to_string()));
    }

    let snapshot = state
        .db
        .reports()
        .get_snapshot(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Report not found: {id}")))?;

    let rows: Vec<Value> = serde_json::from_str(&snapshot.rows_json)
        .map_err(|e| ApiError::Internal(format!("corrupt snapshot {id}: {e}")))?;

    let page = params.page.unwrap_or(1).max(1);
    let page_size = params
        .page_size
        .unwrap_or(state.config.export_page_size)
        .clamp(1, MAX_EXPORT_PAGE_SIZE);
    let total_records = rows.len() as i64;
    let total_pages = (total_records + page_size - 1) / page_size;

    // Page numbers come straight off the query string; saturate instead of
    // trusting the multiply. A page past the end is an empty result, not an
    // error.
    let start = page.saturating_sub(1).saturating_mul(page_size);
    let results: Vec<Value> = rows
        .into_iter()
        .skip(start.min(total_records) as usize)
        .take(page_size as usize)
        .collect();

    Ok(Json(ExportResponse {
        report_id: snapshot.id,
        prompt: snapshot.prompt,
        page,
        page_size,
        total_records,
        total_pages,
        results,
    }))
}
