use anyhow::{Context, Result};

pub const DEFAULT_MODEL_NAME: &str = "models/gemini-2.0-flash";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if `GOOGLE_AI_API_KEY` is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub google_ai_api_key: String,
    pub model_name: String,
    pub port: u16,
    pub rust_log: String,
    pub rate_limit_per_minute: u32,
    pub max_upload_bytes: usize,
    pub sample_resume_path: String,
    /// Honor `X-Forwarded-For` for rate limiting. Only safe behind a proxy
    /// that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            google_ai_api_key: require_env("GOOGLE_AI_API_KEY")?,
            model_name: std::env::var("MODEL_NAME")
                .unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string()),
            port: parse_env("PORT", 8000).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            rate_limit_per_minute: parse_env("RATE_LIMIT_PER_MINUTE", 5)
                .context("RATE_LIMIT_PER_MINUTE must be a positive integer")?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            sample_resume_path: std::env::var("SAMPLE_RESUME_PATH")
                .unwrap_or_else(|_| "data/resumes/john_smith_resume.txt".to_string()),
            trust_forwarded_for: parse_env("TRUST_FORWARDED_FOR", false)
                .context("TRUST_FORWARDED_FOR must be true or false")?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for '{key}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let port: u16 = parse_env("HRTECH_TEST_UNSET_PORT", 8000).unwrap();
        assert_eq!(port, 8000);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("HRTECH_TEST_BAD_LIMIT", "five");
        let result: Result<u32> = parse_env("HRTECH_TEST_BAD_LIMIT", 5);
        assert!(result.is_err());
    }

    #[test]
    fn test_trust_forwarded_for_defaults_off_and_parses_bool() {
        let trust: bool = parse_env("HRTECH_TEST_UNSET_TRUST", false).unwrap();
        assert!(!trust);

        std::env::set_var("HRTECH_TEST_TRUST", " true ");
        assert!(parse_env::<bool>("HRTECH_TEST_TRUST", false).unwrap());

        std::env::set_var("HRTECH_TEST_BAD_TRUST", "yes");
        assert!(parse_env::<bool>("HRTECH_TEST_BAD_TRUST", false).is_err());
    }

    #[test]
    fn test_require_env_rejects_blank() {
        std::env::set_var("HRTECH_TEST_BLANK_KEY", "   ");
        assert!(require_env("HRTECH_TEST_BLANK_KEY").is_err());
    }
}
