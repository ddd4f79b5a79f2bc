use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::validation::{clean_or_default, require_text, strip_markup, MAX_ANALYZE_CHARS};

const DEFAULT_RECEIVER: &str = "General Audience";
const DEFAULT_TONE: &str = "Neutral";
const DEFAULT_TRAITS: &str = "None";

/// Context the user picks alongside the message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisSettings {
    pub receiver_type: Option<String>,
    pub intended_tone: Option<String>,
    pub user_traits: Option<String>,
}

/// POST /api/analyze body as received.
#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub settings: AnalysisSettings,
}

/// A validated analyze request. Every field is markup-free and non-empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub text: String,
    pub receiver: String,
    pub tone: String,
    pub traits: String,
}

impl AnalysisRequest {
    pub fn from_body(body: AnalyzeBody) -> Result<Self, AppError> {
        let text = strip_markup(&body.text);
        require_text("Text", &text, MAX_ANALYZE_CHARS)?;

        let settings = body.settings;
        Ok(Self {
            text,
            receiver: clean_or_default(settings.receiver_type.as_deref(), DEFAULT_RECEIVER),
            tone: clean_or_default(settings.intended_tone.as_deref(), DEFAULT_TONE),
            traits: clean_or_default(settings.user_traits.as_deref(), DEFAULT_TRAITS),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudiencePerception {
    #[serde(default)]
    pub primary_receiver: String,
    #[serde(default)]
    pub neutral_observer: String,
}

/// One flagged phrase. Accepts both the `substring/severity/reason/better_alternative`
/// and the `text/type/suggestion` spellings models use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(alias = "substring")]
    pub text: String,
    #[serde(rename = "type", alias = "severity", default)]
    pub kind: String,
    #[serde(alias = "reason", default)]
    pub suggestion: String,
    #[serde(alias = "better_alternative", default)]
    pub alternative: Option<String>,
}

/// The critique returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub score: f64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub audience_perception: AudiencePerception,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
    #[serde(default)]
    pub rewritten_message: Option<String>,
    #[serde(default)]
    pub rewritten_score: Option<f64>,
}
