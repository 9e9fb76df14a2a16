use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub explorer: ExplorerConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

// ============================================================
// Explorer Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct ExplorerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Never read from logs; usually supplied through `ETHERSCAN_API_KEY`.
    pub api_key: Option<String>,
    /// Sent as `chainid` unless `base_url` already carries one, which is how a
    /// V1 per-chain endpoint such as `https://api-sepolia.etherscan.io/api?chainid=11155111`
    /// keeps its own.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            chain_id: default_chain_id(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.etherscan.io/v2/api".to_string()
}

fn default_chain_id() -> u64 {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

// ============================================================
// API Config
// ============================================================

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
            default_page_size: 20,
        }
    }
}

fn default_api_port() -> u16 {
    3000
}

fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

fn default_page_size() -> usize {
    20
}

impl Config {
    /// Load the TOML file at `path` (or defaults when `required` is false and the
    /// file is absent), then overlay the process environment.
    pub fn load(path: &str, required: bool) -> eyre::Result<Self> {
        let mut config = if Path::new(path).exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| eyre::eyre!("Failed to read config file '{}': {}", path, e))?;
            toml::from_str(&content)
                .map_err(|e| eyre::eyre!("Failed to parse config file '{}': {}", path, e))?
        } else if required {
            return Err(eyre::eyre!("Config file '{}' not found", path));
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env<F>(&mut self, lookup: F) -> eyre::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("ETHERSCAN_API_KEY") {
            self.explorer.api_key = Some(key);
        }
        if let Some(url) = lookup("ETHERSCAN_BASE_URL") {
            self.explorer.base_url = url;
        }
        if let Some(chain_id) = lookup("ETHERSCAN_CHAIN_ID") {
            let chain_id = chain_id
                .parse()
                .map_err(|e| eyre::eyre!("Invalid ETHERSCAN_CHAIN_ID '{}': {}", chain_id, e))?;
            self.explorer.chain_id = chain_id;
        }
        if let Some(host) = lookup("HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.api.port = port
                .parse()
                .map_err(|e| eyre::eyre!("Invalid PORT '{}': {}", port, e))?;
        }
        Ok(())
    }

    fn validate(&self) -> eyre::Result<()> {
        let url = &self.explorer.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(eyre::eyre!("Invalid explorer base URL '{}'", url));
        }
        if self.explorer.timeout_secs == 0 {
            return Err(eyre::eyre!("explorer.timeout_secs must be greater than zero"));
        }
        if self.api.default_page_size == 0 {
            return Err(eyre::eyre!("api.default_page_size must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
[explorer]
base_url = "https://api-sepolia.etherscan.io/api"
chain_id = 11155111
timeout_secs = 10

[api]
port = 8080
"#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.explorer.base_url, "https://api-sepolia.etherscan.io/api");
        assert_eq!(config.explorer.chain_id, 11155111);
        assert_eq!(config.explorer.timeout_secs, 10);
        assert!(config.explorer.api_key.is_none());
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.host, "0.0.0.0"); // default
        assert_eq!(config.api.default_page_size, 20); // default
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.explorer.base_url, "https://api.etherscan.io/v2/api");
        assert_eq!(config.explorer.chain_id, 1);
        assert_eq!(config.explorer.timeout_secs, 30);
        assert_eq!(config.api.port, 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ETHERSCAN_API_KEY", "secret"),
            ("ETHERSCAN_BASE_URL", "http://localhost:9999/api"),
            ("ETHERSCAN_CHAIN_ID", "137"),
            ("PORT", "4000"),
            ("HOST", ""),
        ]);

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.explorer.api_key.as_deref(), Some("secret"));
        assert_eq!(config.explorer.base_url, "http://localhost:9999/api");
        assert_eq!(config.explorer.chain_id, 137);
        assert_eq!(config.api.port, 4000);
        assert_eq!(config.api.host, "0.0.0.0"); // empty value ignored
    }

    #[test]
    fn test_env_bad_port() {
        let mut config = Config::default();
        let result = config.apply_env(|key| (key == "PORT").then(|| "not-a-port".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_bad_base_url() {
        let mut config = Config::default();
        config.explorer.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_page_size() {
        let mut config = Config::default();
        config.api.default_page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_required_file() {
        assert!(Config::load("/nonexistent/ledger-dashboard.toml", true).is_err());
    }
}
