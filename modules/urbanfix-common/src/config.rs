use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::error::UrbanFixError;

pub const DEFAULT_AI_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_RADIUS_METERS: f64 = 100.0;
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
pub const DEFAULT_AI_CALL_TIMEOUT: Duration = Duration::from_secs(15);

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // AI provider
    pub anthropic_api_key: Option<String>,
    pub ai_model: String,
    pub ai_call_timeout: Duration,

    // Issue snapshot
    pub issues_path: Option<String>,

    // Grouping
    pub radius_meters: f64,
    pub max_concurrency: usize,

    // Web server
    pub api_host: String,
    pub api_port: u16,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, UrbanFixError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, UrbanFixError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let radius_meters: f64 = parse_or(&get, "GROUPING_RADIUS_METERS", DEFAULT_RADIUS_METERS)?;
        if !radius_meters.is_finite() || radius_meters < 0.0 {
            return Err(UrbanFixError::Config(format!(
                "GROUPING_RADIUS_METERS must be a non-negative number, got {radius_meters}"
            )));
        }

        let max_concurrency: usize =
            parse_or(&get, "GROUPING_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY)?;
        if max_concurrency == 0 {
            return Err(UrbanFixError::Config(
                "GROUPING_MAX_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        let timeout_secs: u64 = parse_or(
            &get,
            "AI_CALL_TIMEOUT_SECS",
            DEFAULT_AI_CALL_TIMEOUT.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(UrbanFixError::Config(
                "AI_CALL_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            ai_model: get("AI_MODEL").unwrap_or_else(|| DEFAULT_AI_MODEL.to_string()),
            ai_call_timeout: Duration::from_secs(timeout_secs),
            issues_path: get("ISSUES_PATH"),
            radius_meters,
            max_concurrency,
            api_host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port: parse_or(&get, "API_PORT", 3000)?,
        })
    }

    /// The snapshot path, required by the API binary.
    pub fn require_issues_path(&self) -> Result<&str, UrbanFixError> {
        self.issues_path
            .as_deref()
            .ok_or_else(|| UrbanFixError::Config("ISSUES_PATH environment variable is required".into()))
    }

    /// Log the effective configuration without secrets.
    pub fn log_redacted(&self) {
        info!(
            ai_enabled = self.anthropic_api_key.is_some(),
            ai_model = self.ai_model.as_str(),
            ai_call_timeout_secs = self.ai_call_timeout.as_secs(),
            issues_path = self.issues_path.as_deref().unwrap_or("<unset>"),
            radius_meters = self.radius_meters,
            max_concurrency = self.max_concurrency,
            api_host = self.api_host.as_str(),
            api_port = self.api_port,
            "Loaded config"
        );
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, UrbanFixError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| UrbanFixError::Config(format!("{key} is invalid ({raw:?}): {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.anthropic_api_key, None);
        assert_eq!(config.ai_model, DEFAULT_AI_MODEL);
        assert_eq!(config.radius_meters, 100.0);
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.ai_call_timeout, Duration::from_secs(15));
        assert_eq!(config.api_port, 3000);
        assert!(config.require_issues_path().is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
            ("ISSUES_PATH", "/tmp/issues.json"),
            ("GROUPING_RADIUS_METERS", "250"),
            ("GROUPING_MAX_CONCURRENCY", "2"),
            ("AI_CALL_TIMEOUT_SECS", "3"),
            ("API_PORT", "8080"),
        ]))
        .unwrap();
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-ant-test"));
        assert_eq!(config.require_issues_path().unwrap(), "/tmp/issues.json");
        assert_eq!(config.radius_meters, 250.0);
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.ai_call_timeout, Duration::from_secs(3));
        assert_eq!(config.api_port, 8080);
    }

    #[test]
    fn empty_key_counts_as_unset() {
        let config = Config::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "  ")])).unwrap();
        assert_eq!(config.anthropic_api_key, None);
    }

    #[test]
    fn invalid_numbers_are_config_errors() {
        let err = Config::from_lookup(lookup(&[("API_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, UrbanFixError::Config(_)));

        let err = Config::from_lookup(lookup(&[("GROUPING_MAX_CONCURRENCY", "0")])).unwrap_err();
        assert!(matches!(err, UrbanFixError::Config(_)));

        let err = Config::from_lookup(lookup(&[("GROUPING_RADIUS_METERS", "-5")])).unwrap_err();
        assert!(matches!(err, UrbanFixError::Config(_)));
    }

    #[test]
    fn zero_call_timeout_is_rejected() {
        let err = Config::from_lookup(lookup(&[("AI_CALL_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, UrbanFixError::Config(ref m) if m.contains("AI_CALL_TIMEOUT_SECS")));
    }
}
