// terminal-agent/crates/terminal-agent/src/config.rs

use anyhow::{Context, Result};
use std::env;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use tracing::info;

pub const DEFAULT_SYSTEM_PROMPT: &str = "you are a powerful assistant which helps me in coding. \
     answer me in only english language do not use any other language in output";
pub const DEFAULT_DB_PATH: &str = "chat_history.db";
pub const DEFAULT_TEMPERATURE: f32 = 1.0;
pub const DEFAULT_SEARCH_MAX_RESULTS: usize = 5;

/// Accepted sampling temperatures. NaN and infinities fall outside it.
pub const TEMPERATURE_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// Number of model slots offered by the selection menu.
pub const MODEL_SLOTS: usize = 3;

#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub api_key: String,
    pub models: [Option<String>; MODEL_SLOTS],
    pub default_temperature: f32,
    pub system_prompt: String,
    pub db_path: PathBuf,
    pub search_max_results: usize,
}

impl Config {
    /// Reads the process environment. The binary loads `.env` beforehand.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = non_empty("URL")
            .context("URL environment variable not set. Please set it in your .env file")?;
        let api_key = non_empty("API_KEY")
            .context("API_KEY environment variable not set. Please set it in your .env file")?;

        let models = [
            non_empty("MODEL_1"),
            non_empty("MODEL_2"),
            non_empty("MODEL_3"),
        ];
        if models.iter().all(Option::is_none) {
            return Err(anyhow::anyhow!(
                "No model configured. Set at least one of MODEL_1, MODEL_2 or MODEL_3"
            ));
        }

        let default_temperature = match non_empty("DEFAULT_TEMPERATURE") {
            Some(raw) => {
                let value = raw
                    .trim()
                    .parse::<f32>()
                    .with_context(|| format!("DEFAULT_TEMPERATURE is not a number: {}", raw))?;
                if !TEMPERATURE_RANGE.contains(&value) {
                    return Err(anyhow::anyhow!(
                        "DEFAULT_TEMPERATURE must be between {} and {}, got {}",
                        TEMPERATURE_RANGE.start(),
                        TEMPERATURE_RANGE.end(),
                        raw.trim()
                    ));
                }
                value
            }
            None => DEFAULT_TEMPERATURE,
        };

        let search_max_results = match non_empty("SEARCH_MAX_RESULTS") {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .with_context(|| format!("SEARCH_MAX_RESULTS is not a count: {}", raw))?,
            None => DEFAULT_SEARCH_MAX_RESULTS,
        };

        Ok(Self {
            url,
            api_key,
            models,
            default_temperature,
            system_prompt: non_empty("SYSTEM_PROMPT")
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            db_path: non_empty("CHAT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            search_max_results,
        })
    }

    /// Model behind a 1-based menu choice, if that slot is configured.
    pub fn model(&self, choice: usize) -> Option<&str> {
        choice
            .checked_sub(1)
            .and_then(|idx| self.models.get(idx))
            .and_then(|m| m.as_deref())
    }

    /// Model used by the workflow planner: `MODEL_1`, else the first configured slot.
    pub fn planner_model(&self) -> &str {
        self.models
            .iter()
            .flatten()
            .next()
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn print_config(&self) {
        info!("Current Configuration:");
        info!("- Endpoint: {}", self.url);
        info!("- API Key: {}", redact(&self.api_key));
        for (idx, model) in self.models.iter().enumerate() {
            info!(
                "- Model {}: {}",
                idx + 1,
                model.as_deref().unwrap_or("(not configured)")
            );
        }
        info!("- Default Temperature: {}", self.default_temperature);
        info!("- Transcript DB: {}", self.db_path.display());
        info!("- Search Results: {}", self.search_max_results);
    }
}

fn redact(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= 8 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(len - 4).collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("URL", "https://llm.example.com/v1/chat/completions"),
            ("API_KEY", "Bearer sk-test-123456789"),
            ("MODEL_1", "mistral-small"),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&minimal())).unwrap();

        assert_eq!(config.url, "https://llm.example.com/v1/chat/completions");
        assert_eq!(config.default_temperature, 1.0);
        assert_eq!(config.db_path, PathBuf::from("chat_history.db"));
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.search_max_results, 5);
    }

    #[test]
    fn test_missing_url_is_error() {
        let vars = [("API_KEY", "k"), ("MODEL_1", "m")];
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("URL"));
    }

    #[test]
    fn test_missing_api_key_is_error() {
        let vars = [("URL", "http://localhost"), ("MODEL_1", "m")];
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn test_requires_at_least_one_model() {
        let vars = [("URL", "http://localhost"), ("API_KEY", "k"), ("MODEL_2", "  ")];
        assert!(Config::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn test_bad_temperature_is_error() {
        let mut vars = minimal();
        vars.push(("DEFAULT_TEMPERATURE", "warm"));
        let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("DEFAULT_TEMPERATURE"));
    }

    #[test]
    fn test_temperature_outside_range_is_error() {
        for raw in ["NaN", "inf", "5", "-0.5"] {
            let mut vars = minimal();
            vars.push(("DEFAULT_TEMPERATURE", raw));
            let err = Config::from_lookup(lookup_from(&vars)).unwrap_err();
            assert!(
                err.to_string().contains("DEFAULT_TEMPERATURE"),
                "{} accepted",
                raw
            );
        }

        let mut vars = minimal();
        vars.push(("DEFAULT_TEMPERATURE", "2"));
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.default_temperature, 2.0);
    }

    #[test]
    fn test_model_slots() {
        let mut vars = minimal();
        vars.push(("MODEL_3", "kimi-k2"));
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();

        assert_eq!(config.model(1), Some("mistral-small"));
        assert_eq!(config.model(2), None);
        assert_eq!(config.model(3), Some("kimi-k2"));
        assert_eq!(config.model(0), None);
        assert_eq!(config.model(4), None);
    }

    #[test]
    fn test_planner_model_falls_back_to_first_configured() {
        let vars = [("URL", "u"), ("API_KEY", "k"), ("MODEL_2", "second")];
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.planner_model(), "second");
    }

    #[test]
    fn test_overrides() {
        let mut vars = minimal();
        vars.push(("CHAT_DB_PATH", "/tmp/agent/chats.db"));
        vars.push(("DEFAULT_TEMPERATURE", "0.3"));
        vars.push(("SYSTEM_PROMPT", "be terse"));
        vars.push(("SEARCH_MAX_RESULTS", "2"));
        let config = Config::from_lookup(lookup_from(&vars)).unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/agent/chats.db"));
        assert!((config.default_temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.system_prompt, "be terse");
        assert_eq!(config.search_max_results, 2);
    }

    #[test]
    fn test_redact_hides_short_and_long_keys() {
        assert_eq!(redact("abc"), "****");
        assert_eq!(redact("Bearer sk-test-123456789"), "****6789");
    }
}
