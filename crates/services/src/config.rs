use std::env;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::ai::{AiGateway, AiProvider, GeminiGateway, OpenAiGateway};
use crate::error::ConfigError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
pub const DEFAULT_DB_URL: &str = "sqlite://coach.sqlite3";
pub const DEFAULT_PACING_MS: u64 = 1000;

/// Credentials and endpoint for one vendor.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub base_url: Url,
    pub api_key: String,
    pub model: String,
}

/// Process configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// `None` when `AI_PROVIDER=none`.
    pub ai_provider: Option<AiProvider>,
    pub openai: Option<ProviderConfig>,
    pub gemini: Option<ProviderConfig>,
    pub db_url: String,
    pub pacing: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ai_provider: Some(AiProvider::OpenAi),
            openai: None,
            gemini: None,
            db_url: DEFAULT_DB_URL.to_string(),
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unknown provider, an unparsable base URL
    /// or pacing value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read configuration through `lookup`. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let ai_provider = match get("AI_PROVIDER").map(|v| v.to_ascii_lowercase()) {
            None => Some(AiProvider::OpenAi),
            Some(value) => match value.as_str() {
                "openai" => Some(AiProvider::OpenAi),
                "gemini" => Some(AiProvider::Gemini),
                "none" => None,
                _ => return Err(ConfigError::UnknownProvider(value)),
            },
        };

        let openai = provider_config(
            &get,
            "OPENAI_API_KEY",
            ("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            ("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
        )?;
        let gemini = provider_config(
            &get,
            "GEMINI_API_KEY",
            ("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            ("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
        )?;

        let db_url = get("COACH_DB_URL").unwrap_or_else(|| DEFAULT_DB_URL.to_string());

        let pacing = match get("LEVEL_TEST_PACING_MS") {
            None => Duration::from_millis(DEFAULT_PACING_MS),
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "LEVEL_TEST_PACING_MS",
                    raw,
                })?,
        };

        Ok(Self {
            ai_provider,
            openai,
            gemini,
            db_url,
            pacing,
        })
    }

    /// The selected vendor's gateway, if its key is present.
    #[must_use]
    pub fn gateway(&self) -> Option<Arc<dyn AiGateway>> {
        match self.ai_provider? {
            AiProvider::OpenAi => self
                .openai
                .clone()
                .map(|config| Arc::new(OpenAiGateway::new(config)) as Arc<dyn AiGateway>),
            AiProvider::Gemini => self
                .gemini
                .clone()
                .map(|config| Arc::new(GeminiGateway::new(config)) as Arc<dyn AiGateway>),
        }
    }
}

fn provider_config(
    get: &impl Fn(&str) -> Option<String>,
    key_var: &'static str,
    (url_var, default_url): (&'static str, &str),
    (model_var, default_model): (&'static str, &str),
) -> Result<Option<ProviderConfig>, ConfigError> {
    let Some(api_key) = get(key_var) else {
        return Ok(None);
    };
    let raw_url = get(url_var).unwrap_or_else(|| default_url.to_string());
    let base_url = Url::parse(&raw_url).map_err(|source| ConfigError::InvalidUrl {
        var: url_var,
        source,
    })?;
    let model = get(model_var).unwrap_or_else(|| default_model.to_string());
    Ok(Some(ProviderConfig {
        base_url,
        api_key,
        model,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.ai_provider, Some(AiProvider::OpenAi));
        assert!(cfg.openai.is_none());
        assert!(cfg.gemini.is_none());
        assert_eq!(cfg.db_url, DEFAULT_DB_URL);
        assert_eq!(cfg.pacing, Duration::from_millis(1000));
        assert!(cfg.gateway().is_none());
    }

    #[test]
    fn openai_key_enables_gateway_with_defaults() {
        let cfg = config(&[("OPENAI_API_KEY", "sk-test")]).unwrap();
        let openai = cfg.openai.as_ref().unwrap();
        assert_eq!(openai.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(openai.base_url.as_str(), "https://api.openai.com/v1");
        assert_eq!(cfg.gateway().unwrap().provider(), AiProvider::OpenAi);
    }

    #[test]
    fn selected_provider_without_key_has_no_gateway() {
        let cfg = config(&[("AI_PROVIDER", "Gemini"), ("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert_eq!(cfg.ai_provider, Some(AiProvider::Gemini));
        assert!(cfg.gateway().is_none());

        let cfg = config(&[("AI_PROVIDER", "gemini"), ("GEMINI_API_KEY", "g-key")]).unwrap();
        let gateway = cfg.gateway().unwrap();
        assert_eq!(gateway.provider(), AiProvider::Gemini);
        assert_eq!(cfg.gemini.unwrap().model, DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn provider_none_disables_gateway() {
        let cfg = config(&[("AI_PROVIDER", "none"), ("OPENAI_API_KEY", "sk-test")]).unwrap();
        assert!(cfg.ai_provider.is_none());
        assert!(cfg.gateway().is_none());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let cfg = config(&[("OPENAI_API_KEY", "   "), ("AI_PROVIDER", "")]).unwrap();
        assert!(cfg.openai.is_none());
        assert_eq!(cfg.ai_provider, Some(AiProvider::OpenAi));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = config(&[("AI_PROVIDER", "claude")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProvider(v) if v == "claude"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = config(&[("OPENAI_API_KEY", "k"), ("OPENAI_BASE_URL", "not a url")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidUrl {
                var: "OPENAI_BASE_URL",
                ..
            }
        ));
    }

    #[test]
    fn pacing_is_parsed_and_validated() {
        let cfg = config(&[("LEVEL_TEST_PACING_MS", "0")]).unwrap();
        assert_eq!(cfg.pacing, Duration::ZERO);

        let err = config(&[("LEVEL_TEST_PACING_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { raw, .. } if raw == "soon"));
    }

    #[test]
    fn overrides_are_respected() {
        let cfg = config(&[
            ("OPENAI_API_KEY", "k"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("COACH_DB_URL", "sqlite::memory:"),
        ])
        .unwrap();
        let openai = cfg.openai.unwrap();
        assert_eq!(openai.base_url.as_str(), "http://localhost:8080/v1/");
        assert_eq!(openai.model, "gpt-4o-mini");
        assert_eq!(cfg.db_url, "sqlite::memory:");
    }
}
