//! Parallax tasks — weighing strategy options and drafting a message.

use crate::dispatch::Dispatcher;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, with_json_contract};
use crate::parallax::models::{ChatBody, DraftBody, DraftResponse, ParallaxOption, ParallaxResponse};
use crate::parallax::prompts::{
    CHAT_SYSTEM_TEMPLATE, CHAT_USER_TEMPLATE, DEFAULT_DRAFT_RECEIVER, DRAFT_SYSTEM,
    DRAFT_USER_TEMPLATE, OPTION_COUNT,
};
use crate::validation::{clean_or_default, require_text, strip_markup, MAX_SITUATION_CHARS};

/// A validated chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub situation: String,
}

impl ChatRequest {
    pub fn from_body(body: ChatBody) -> Result<Self, AppError> {
        let situation = strip_markup(&body.message);
        require_text("Message", &situation, MAX_SITUATION_CHARS)?;
        Ok(Self { situation })
    }
}

/// A validated draft request.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRequest {
    pub situation: String,
    pub strategy: ParallaxOption,
    pub receiver: String,
}

impl DraftRequest {
    pub fn from_body(body: DraftBody) -> Result<Self, AppError> {
        let situation = strip_markup(&body.situation);
        require_text("Situation", &situation, MAX_SITUATION_CHARS)?;

        let strategy = body
            .strategy
            .ok_or_else(|| AppError::Validation("Strategy is required.".to_string()))?;

        Ok(Self {
            situation,
            strategy,
            receiver: clean_or_default(body.receiver.as_deref(), DEFAULT_DRAFT_RECEIVER),
        })
    }
}

pub fn build_chat_system_prompt() -> String {
    let option_count = OPTION_COUNT.to_string();
    with_json_contract(&fill_template(
        CHAT_SYSTEM_TEMPLATE,
        &[("option_count", option_count.as_str())],
    ))
}

pub fn build_chat_user_prompt(request: &ChatRequest) -> String {
    fill_template(CHAT_USER_TEMPLATE, &[("situation", request.situation.as_str())])
}

pub fn build_draft_user_prompt(request: &DraftRequest) -> Result<String, AppError> {
    let strategy = serde_json::to_string_pretty(&request.strategy)
        .map_err(|e| AppError::Internal(e.into()))?;

    Ok(fill_template(
        DRAFT_USER_TEMPLATE,
        &[
            ("situation", request.situation.as_str()),
            ("strategy", strategy.as_str()),
            ("receiver", request.receiver.as_str()),
        ],
    ))
}

pub async fn weigh_options(
    dispatcher: &Dispatcher,
    request: &ChatRequest,
) -> Result<ParallaxResponse, AppError> {
    let system = build_chat_system_prompt();
    let user = build_chat_user_prompt(request);

    let response: ParallaxResponse = dispatcher.dispatch(&user, &system).await?;
    Ok(response)
}

pub async fn draft_message(
    dispatcher: &Dispatcher,
    request: &DraftRequest,
) -> Result<DraftResponse, AppError> {
    let system = with_json_contract(DRAFT_SYSTEM);
    let user = build_draft_user_prompt(request)?;

    let response: DraftResponse = dispatcher.dispatch(&user, &system).await?;
    Ok(response)
}
