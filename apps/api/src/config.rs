use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::{gemini, groq};
use crate::rate_limit::RateLimitPolicy;

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];

/// Application configuration loaded from environment variables.
/// Provider keys are optional: a missing key disables that provider only.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub provider_timeout: Duration,
    pub allowed_origins: Vec<String>,
    pub analyze_rate_limit: RateLimitPolicy,
    pub parallax_rate_limit: RateLimitPolicy,
    /// Key rate limits on the proxy's `X-Forwarded-For` instead of the peer.
    pub trust_proxy: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3001,
            rust_log: "info".to_string(),
            groq_api_key: None,
            groq_model: groq::DEFAULT_MODEL.to_string(),
            groq_base_url: groq::DEFAULT_BASE_URL.to_string(),
            gemini_api_key: None,
            gemini_model: gemini::DEFAULT_MODEL.to_string(),
            gemini_base_url: gemini::DEFAULT_BASE_URL.to_string(),
            provider_timeout: Duration::from_secs(30),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
            analyze_rate_limit: RateLimitPolicy::new(10, Duration::from_secs(60)),
            parallax_rate_limit: RateLimitPolicy::new(100, Duration::from_secs(15 * 60)),
            trust_proxy: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let mut allowed_origins = match lookup("ALLOWED_ORIGINS") {
            Some(list) => parse_list(&list),
            None => defaults.allowed_origins,
        };
        if let Some(host) = lookup("VERCEL_URL").filter(|h| !h.trim().is_empty()) {
            allowed_origins.push(format!("https://{}", host.trim()));
        }

        Ok(Config {
            port: parse_or("PORT", &lookup, defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            groq_api_key: lookup("GROQ_API_KEY"),
            groq_model: lookup("GROQ_MODEL").unwrap_or(defaults.groq_model),
            groq_base_url: lookup("GROQ_BASE_URL").unwrap_or(defaults.groq_base_url),
            gemini_api_key: lookup("GEMINI_API_KEY").or_else(|| lookup("GOOGLE_API_KEY")),
            gemini_model: lookup("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            provider_timeout: Duration::from_secs(parse_or(
                "PROVIDER_TIMEOUT_SECS",
                &lookup,
                defaults.provider_timeout.as_secs(),
            )?),
            allowed_origins,
            analyze_rate_limit: policy_from(
                "ANALYZE_RATE_LIMIT",
                &lookup,
                defaults.analyze_rate_limit,
            )?,
            parallax_rate_limit: policy_from(
                "PARALLAX_RATE_LIMIT",
                &lookup,
                defaults.parallax_rate_limit,
            )?,
            trust_proxy: parse_flag("TRUST_PROXY", &lookup, defaults.trust_proxy)?,
        })
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

/// Reads `<PREFIX>_MAX` and `<PREFIX>_WINDOW_SECS`.
fn policy_from<F>(prefix: &str, lookup: &F, default: RateLimitPolicy) -> Result<RateLimitPolicy>
where
    F: Fn(&str) -> Option<String>,
{
    let max_requests = parse_or(&format!("{prefix}_MAX"), lookup, default.max_requests)?;
    let window_secs = parse_or(
        &format!("{prefix}_WINDOW_SECS"),
        lookup,
        default.window.as_secs(),
    )?;
    if window_secs == 0 {
        bail!("{prefix}_WINDOW_SECS must be at least 1 second");
    }
    Ok(RateLimitPolicy::new(
        max_requests,
        Duration::from_secs(window_secs),
    ))
}

fn parse_flag<F>(key: &str, lookup: &F, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => bail!("{key} must be true or false, got '{raw}'"),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3001);
        assert!(config.groq_api_key.is_none());
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.provider_timeout, Duration::from_secs(30));
        assert_eq!(config.analyze_rate_limit.max_requests, 10);
        assert_eq!(config.analyze_rate_limit.window, Duration::from_secs(60));
        assert_eq!(config.parallax_rate_limit.max_requests, 100);
        assert_eq!(config.parallax_rate_limit.window, Duration::from_secs(900));
        assert!(!config.trust_proxy);
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_rate_limits_are_configurable_per_route() {
        let config = config_from(&[
            ("ANALYZE_RATE_LIMIT_MAX", "3"),
            ("ANALYZE_RATE_LIMIT_WINDOW_SECS", "10"),
            ("PARALLAX_RATE_LIMIT_MAX", "7"),
        ])
        .unwrap();
        assert_eq!(config.analyze_rate_limit.max_requests, 3);
        assert_eq!(config.analyze_rate_limit.window, Duration::from_secs(10));
        assert_eq!(config.parallax_rate_limit.max_requests, 7);
        assert_eq!(config.parallax_rate_limit.window, Duration::from_secs(900));
    }

    #[test]
    fn test_google_key_is_gemini_fallback() {
        let config = config_from(&[("GOOGLE_API_KEY", "AIza-1")]).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("AIza-1"));

        let config =
            config_from(&[("GOOGLE_API_KEY", "AIza-1"), ("GEMINI_API_KEY", "AIza-2")]).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("AIza-2"));
    }

    #[test]
    fn test_origins_parsed_and_vercel_appended() {
        let config = config_from(&[
            ("ALLOWED_ORIGINS", " https://tact.app , ,https://m.tact.app"),
            ("VERCEL_URL", "tact-preview.vercel.app"),
        ])
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec![
                "https://tact.app",
                "https://m.tact.app",
                "https://tact-preview.vercel.app"
            ]
        );
    }

    #[test]
    fn test_invalid_number_is_startup_error() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        assert!(config_from(&[("ANALYZE_RATE_LIMIT_MAX", "-1")]).is_err());
    }

    #[test]
    fn test_zero_window_is_startup_error() {
        let err = config_from(&[("ANALYZE_RATE_LIMIT_WINDOW_SECS", "0")]).unwrap_err();
        assert!(err.to_string().contains("ANALYZE_RATE_LIMIT_WINDOW_SECS"));

        let err = config_from(&[("PARALLAX_RATE_LIMIT_WINDOW_SECS", "0")]).unwrap_err();
        assert!(err.to_string().contains("PARALLAX_RATE_LIMIT_WINDOW_SECS"));
    }

    #[test]
    fn test_trust_proxy_flag() {
        assert!(config_from(&[("TRUST_PROXY", "true")]).unwrap().trust_proxy);
        assert!(config_from(&[("TRUST_PROXY", "1")]).unwrap().trust_proxy);
        assert!(!config_from(&[("TRUST_PROXY", "false")]).unwrap().trust_proxy);

        let err = config_from(&[("TRUST_PROXY", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("TRUST_PROXY"));
    }
}
