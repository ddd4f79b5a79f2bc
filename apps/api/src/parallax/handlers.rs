//! Axum route handlers for the Parallax API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::errors::AppError;
use crate::parallax::advisor::{draft_message, weigh_options, ChatRequest, DraftRequest};
use crate::parallax::models::{ChatBody, DraftBody, DraftResponse, ParallaxResponse};
use crate::state::AppState;

/// POST /api/parallax/chat
///
/// Weighs a described situation and returns strategy options with risk levels.
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ParallaxResponse>, AppError> {
    let Json(body) = payload?;
    let request = ChatRequest::from_body(body)?;

    let response = weigh_options(&state.dispatcher, &request).await?;

    Ok(Json(response))
}

/// POST /api/parallax/draft
///
/// Drafts the message for a strategy previously returned by the chat route.
pub async fn handle_draft(
    State(state): State<AppState>,
    payload: Result<Json<DraftBody>, JsonRejection>,
) -> Result<Json<DraftResponse>, AppError> {
    let Json(body) = payload?;
    let request = DraftRequest::from_body(body)?;

    let response = draft_message(&state.dispatcher, &request).await?;

    Ok(Json(response))
}
