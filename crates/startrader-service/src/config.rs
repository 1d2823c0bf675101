use std::env;
use std::path::PathBuf;

use tracing::warn;
use trade_tools::{DEFAULT_CACHE_PREFIX, DEFAULT_TTL_SECS, MAX_TTL_SECS};
use uex_api::UexClient;

/// Settings for the chat relay
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Chat relay is disabled without a key
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub system_prompt_file: Option<PathBuf>,
    pub knowledge_base_url: Option<String>,
}

/// Service configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub uex_base_url: String,
    /// File-backed cache root; the cache lives in memory when unset
    pub cache_dir: Option<PathBuf>,
    pub cache_prefix: String,
    pub cache_ttl_secs: u64,
    pub sweep_on_write: bool,
    /// Bearer secret for the cleanup endpoint; cleanup is always refused when unset
    pub cron_secret: Option<String>,
    pub cors_origins: Vec<String>,
    pub llm: LlmConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parse configuration from any variable source
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let port = non_empty("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(3005);

        let uex_base_url =
            non_empty("UEX_BASE_URL").unwrap_or_else(|| UexClient::BASE_URL.to_string());

        let cache_dir = non_empty("CACHE_DIR").map(PathBuf::from);

        let cache_prefix =
            non_empty("CACHE_PREFIX").unwrap_or_else(|| DEFAULT_CACHE_PREFIX.to_string());

        let cache_ttl_secs = match non_empty("CACHE_TTL_SECS").map(|s| s.parse::<u64>()) {
            Some(Ok(secs)) if secs <= MAX_TTL_SECS => secs,
            Some(_) => {
                warn!(max = MAX_TTL_SECS, "Invalid CACHE_TTL_SECS, using default");
                DEFAULT_TTL_SECS
            }
            None => DEFAULT_TTL_SECS,
        };

        let sweep_on_write = non_empty("SWEEP_ON_WRITE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let cors_origins = non_empty("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]);

        let llm = LlmConfig {
            api_key: non_empty("OPENAI_API_KEY"),
            base_url: non_empty("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: non_empty("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o".to_string()),
            system_prompt_file: non_empty("SYSTEM_PROMPT_FILE").map(PathBuf::from),
            knowledge_base_url: non_empty("KNOWLEDGE_BASE_URL"),
        };

        Self {
            port,
            uex_base_url,
            cache_dir,
            cache_prefix,
            cache_ttl_secs,
            sweep_on_write,
            cron_secret: non_empty("CRON_SECRET"),
            cors_origins,
            llm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 3005);
        assert_eq!(config.uex_base_url, "https://api.uexcorp.space/2.0");
        assert_eq!(config.cache_dir, None);
        assert_eq!(config.cache_prefix, "cache/");
        assert_eq!(config.cache_ttl_secs, 3600);
        assert!(!config.sweep_on_write);
        assert_eq!(config.cron_secret, None);
        assert_eq!(config.llm.api_key, None);
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("CACHE_DIR", "/var/cache/startrader"),
            ("CACHE_TTL_SECS", "120"),
            ("SWEEP_ON_WRITE", "TRUE"),
            ("CRON_SECRET", "s3cret"),
            ("CORS_ORIGINS", "https://a.example, https://b.example"),
            ("OPENAI_API_KEY", "sk-test"),
            ("KNOWLEDGE_BASE_URL", "https://blob.example/kb.txt"),
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/var/cache/startrader")));
        assert_eq!(config.cache_ttl_secs, 120);
        assert!(config.sweep_on_write);
        assert_eq!(config.cron_secret.as_deref(), Some("s3cret"));
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(
            config.llm.knowledge_base_url.as_deref(),
            Some("https://blob.example/kb.txt")
        );
    }

    #[test]
    fn test_cache_ttl_bounds() {
        let at_max = MAX_TTL_SECS.to_string();
        assert_eq!(
            config_from(&[("CACHE_TTL_SECS", &at_max)]).cache_ttl_secs,
            MAX_TTL_SECS
        );

        let over_max = (MAX_TTL_SECS + 1).to_string();
        let u64_max = u64::MAX.to_string();
        for value in [over_max.as_str(), u64_max.as_str(), "-5", "1e14", "soon"] {
            let config = config_from(&[("CACHE_TTL_SECS", value)]);
            assert_eq!(config.cache_ttl_secs, DEFAULT_TTL_SECS, "{}", value);
        }
    }

    #[test]
    fn test_blank_and_invalid_values_fall_back() {
        let config = config_from(&[("PORT", "not-a-port"), ("CRON_SECRET", "  ")]);
        assert_eq!(config.port, 3005);
        assert_eq!(config.cron_secret, None);
    }
}
