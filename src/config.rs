//! Service configuration loaded from YAML with environment overrides.
//!
//! ```yaml
//! server:
//!   addr: 0.0.0.0:4242
//!   base_path: /api/1
//! chain:
//!   bitcoin_network: testnet
//!   ens_names:
//!     rotki.eth: "0x9531C059098e3d194fF87FebB587aB07B30B1306"
//! ```
//!
//! Without a `chain` block no connector is installed and the factory-built
//! resources answer 503 until one is.
//!
//! Overrides: `BRRTARGS_ADDR` replaces `server.addr`; `BRRTARGS_BITCOIN_NETWORK`
//! sets the network (creating the `chain` block if needed).

use crate::connector::{BitcoinNetwork, StaticConnector};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

fn default_addr() -> String {
    "127.0.0.1:4242".to_string()
}

fn default_base_path() -> String {
    "/api/1".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            base_path: default_base_path(),
        }
    }
}

/// Settings of the static chain connector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ChainConfig {
    #[serde(default)]
    pub bitcoin_network: BitcoinNetwork,
    /// ENS name -> Ethereum address
    #[serde(default)]
    pub ens_names: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chain: Option<ChainConfig>,
}

impl AppConfig {
    pub fn from_yaml_str(contents: &str) -> anyhow::Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).context("Failed to parse configuration YAML")
    }

    /// Read `path`, then apply environment overrides
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config = Self::from_yaml_str(&contents)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `BRRTARGS_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("BRRTARGS_ADDR").filter(|s| !s.trim().is_empty()) {
            self.server.addr = addr.trim().to_string();
        }
        if let Some(network) = lookup("BRRTARGS_BITCOIN_NETWORK") {
            let network: BitcoinNetwork = network
                .parse()
                .map_err(|e: String| anyhow!(e))
                .context("Invalid BRRTARGS_BITCOIN_NETWORK")?;
            self.chain.get_or_insert_with(ChainConfig::default).bitcoin_network = network;
        }
        Ok(())
    }

    /// Connector described by the `chain` block, if any
    pub fn build_connector(&self) -> anyhow::Result<Option<StaticConnector>> {
        let Some(chain) = &self.chain else {
            return Ok(None);
        };
        let mut connector = StaticConnector::new(chain.bitcoin_network);
        for (name, address) in &chain.ens_names {
            connector = connector
                .with_ens_name(name, address)
                .map_err(|e| anyhow!(e))
                .with_context(|| format!("Invalid ENS entry '{name}'"))?;
        }
        Ok(Some(connector))
    }
}
