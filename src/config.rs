use serde::{Deserialize, Serialize};
use crate::backend::wallet::Chain;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub subgraph_url: String,
    pub ipfs_gateway: String,
    /// Networks the client supports. The first entry is the switch target
    /// offered when the wallet sits on an unsupported network.
    pub chains: Vec<Chain>,
    pub supported_languages: Vec<String>,
    pub default_language: String,
    pub store_path: String,
    pub refresh_interval_secs: u64,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subgraph_url: "https://api.thegraph.com/subgraphs/name/dxgovernance/guilds-gnosis"
                .to_string(),
            ipfs_gateway: "https://ipfs.io".to_string(),
            chains: vec![
                Chain { id: 1, name: "Ethereum".to_string() },
                Chain { id: 100, name: "Gnosis Chain".to_string() },
                Chain { id: 5, name: "Goerli".to_string() },
            ],
            supported_languages: vec![
                "en-US".to_string(),
                "es".to_string(),
                "fr".to_string(),
                "de".to_string(),
            ],
            default_language: "en-US".to_string(),
            store_path: "davi.db".to_string(),
            refresh_interval_secs: 15,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the file named by `DAVI_CONFIG` when set, then applies
    /// `DAVI_SUBGRAPH_URL` and `DAVI_LOG_LEVEL`. Falls back to defaults.
    pub fn load() -> Self {
        let mut config = Self::from_env_file().unwrap_or_else(|e| {
            tracing::warn!("ignoring config file: {}", e);
            Self::default()
        });

        if let Ok(url) = std::env::var("DAVI_SUBGRAPH_URL") {
            config.subgraph_url = url;
        }
        if let Ok(level) = std::env::var("DAVI_LOG_LEVEL") {
            config.log_level = level;
        }
        config
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn from_env_file() -> Result<Self> {
        match std::env::var("DAVI_CONFIG") {
            Ok(path) => {
                let json = std::fs::read_to_string(path)?;
                Self::from_json(&json)
            }
            Err(_) => Ok(Self::default()),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn from_env_file() -> Result<Self> {
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        if self.chains.is_empty() {
            return Err(Error::Config("at least one chain is required".to_string()));
        }
        if !self.supported_languages.contains(&self.default_language) {
            return Err(Error::Config(format!(
                "default language {} is not in supportedLanguages",
                self.default_language
            )));
        }
        Ok(())
    }

    pub fn default_chain_id(&self) -> u64 {
        self.chains.first().map(|c| c.id).unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(
            r#"{"subgraphUrl": "http://localhost:8000/subgraphs/name/guilds"}"#,
        )
        .expect("valid config");
        assert_eq!(config.subgraph_url, "http://localhost:8000/subgraphs/name/guilds");
        assert_eq!(config.default_language, "en-US");
        assert_eq!(config.default_chain_id(), 1);
    }

    #[test]
    fn test_rejects_unsupported_default_language() {
        let err = Config::from_json(r#"{"defaultLanguage": "it"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_empty_chains() {
        let err = Config::from_json(r#"{"chains": []}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
