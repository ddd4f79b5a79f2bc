use serde::{de, Deserialize, Deserializer, Serialize};

/// How much a strategy could backfire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(alias = "low", alias = "LOW")]
    Low,
    #[serde(alias = "medium", alias = "MEDIUM")]
    Medium,
    #[serde(alias = "high", alias = "HIGH")]
    High,
}

/// One strategy the user can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxOption {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default)]
    pub dos: Vec<String>,
    #[serde(default)]
    pub donts: Vec<String>,
    #[serde(default)]
    pub recommended: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParallaxAnalysis {
    #[serde(default)]
    pub internal_monologue: String,
    #[serde(default)]
    pub panic_check: String,
}

/// Model output for the chat task, returned to the client as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxResponse {
    #[serde(default)]
    pub analysis: ParallaxAnalysis,
    #[serde(deserialize_with = "non_empty_options")]
    pub options: Vec<ParallaxOption>,
    #[serde(default)]
    pub advice: String,
}

/// POST /api/parallax/chat body.
#[derive(Debug, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub message: String,
}

/// POST /api/parallax/draft body.
#[derive(Debug, Deserialize)]
pub struct DraftBody {
    #[serde(default)]
    pub situation: String,
    #[serde(default)]
    pub strategy: Option<ParallaxOption>,
    #[serde(default)]
    pub receiver: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftResponse {
    pub draft: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

fn non_empty_options<'de, D>(deserializer: D) -> Result<Vec<ParallaxOption>, D::Error>
where
    D: Deserializer<'de>,
{
    let options = Vec::<ParallaxOption>::deserialize(deserializer)?;
    if options.is_empty() {
        return Err(de::Error::custom("options must not be empty"));
    }
    Ok(options)
}
