//! Axum route handlers for the Analyze API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::analysis::analyzer::analyze;
use crate::analysis::models::{AnalysisRequest, AnalysisResult, AnalyzeBody};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/analyze
///
/// Scores a message for the chosen receiver and tone. Rewrites are omitted
/// for messages that already score above 85.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Json<AnalysisResult>, AppError> {
    let Json(body) = payload?;
    let request = AnalysisRequest::from_body(body)?;

    let result = analyze(&state.dispatcher, &request).await?;

    Ok(Json(result))
}
