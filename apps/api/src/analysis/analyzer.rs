//! Analyze task — prompt composition, dispatch and rewrite suppression.

use crate::analysis::models::{AnalysisRequest, AnalysisResult};
use crate::analysis::prompts::{ANALYZE_SYSTEM_TEMPLATE, ANALYZE_USER_TEMPLATE};
use crate::dispatch::Dispatcher;
use crate::errors::AppError;
use crate::llm_client::prompts::{fill_template, with_json_contract};

/// Results scoring above this never carry a rewrite.
pub const REWRITE_SUPPRESSION_THRESHOLD: f64 = 85.0;

pub fn build_system_prompt(request: &AnalysisRequest) -> String {
    let task = fill_template(
        ANALYZE_SYSTEM_TEMPLATE,
        &[
            ("receiver", request.receiver.as_str()),
            ("tone", request.tone.as_str()),
            ("traits", request.traits.as_str()),
        ],
    );
    with_json_contract(&task)
}

pub fn build_user_prompt(request: &AnalysisRequest) -> String {
    fill_template(ANALYZE_USER_TEMPLATE, &[("text", request.text.as_str())])
}

/// Clamps the score into 0..=100 and clears both rewrite fields when the
/// score is above the threshold, whatever the model returned.
pub fn finalize(mut result: AnalysisResult) -> AnalysisResult {
    result.score = result.score.clamp(0.0, 100.0);
    if result.score > REWRITE_SUPPRESSION_THRESHOLD {
        result.rewritten_message = None;
        result.rewritten_score = None;
    }
    result
}

pub async fn analyze(
    dispatcher: &Dispatcher,
    request: &AnalysisRequest,
) -> Result<AnalysisResult, AppError> {
    let system = build_system_prompt(request);
    let user = build_user_prompt(request);

    let result: AnalysisResult = dispatcher.dispatch(&user, &system).await?;
    Ok(finalize(result))
}
