//! # Chain Connector
//!
//! The runtime dependency consumed by schema factories. Address rules such as
//! "valid for *this* configured network" or "resolvable ENS name" cannot be
//! frozen at startup, so factories receive the connector active when the
//! request arrives.
//!
//! The process holds at most one active connector in a [`ConnectorSlot`]. Each
//! dispatch takes a snapshot; installing a new connector never affects a
//! request already in flight.

use crate::schema::domain_enum;
use alloy_primitives::Address;
use arc_swap::ArcSwapOption;
use bech32::{hrp, Hrp};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

domain_enum! {
    /// Blockchains whose accounts can be tracked
    Chain, SUPPORTED_BLOCKCHAIN {
        Eth => "ETH",
        Btc => "BTC",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BitcoinNetwork {
    #[default]
    Mainnet,
    Testnet,
}

impl BitcoinNetwork {
    /// Base58Check version bytes for P2PKH and P2SH
    fn base58_versions(self) -> [u8; 2] {
        match self {
            BitcoinNetwork::Mainnet => [0x00, 0x05],
            BitcoinNetwork::Testnet => [0x6f, 0xc4],
        }
    }

    fn bech32_hrp(self) -> Hrp {
        match self {
            BitcoinNetwork::Mainnet => hrp::BC,
            BitcoinNetwork::Testnet => hrp::TB,
        }
    }
}

impl fmt::Display for BitcoinNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitcoinNetwork::Mainnet => write!(f, "mainnet"),
            BitcoinNetwork::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for BitcoinNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "bitcoin" => Ok(BitcoinNetwork::Mainnet),
            "testnet" | "test" => Ok(BitcoinNetwork::Testnet),
            other => Err(format!("unknown bitcoin network '{other}'")),
        }
    }
}

/// Read-only view of the configured chain backends
pub trait ChainConnector: Send + Sync {
    fn bitcoin_network(&self) -> BitcoinNetwork;

    /// Validate `raw` as an address on `chain` and return its canonical form.
    ///
    /// The error string is surfaced verbatim to the caller.
    fn normalize_address(&self, chain: Chain, raw: &str) -> Result<String, String>;
}

/// Connector backed by configuration only: no network access.
///
/// ENS names resolve through a configured table.
#[derive(Debug, Clone, Default)]
pub struct StaticConnector {
    bitcoin_network: BitcoinNetwork,
    ens_names: HashMap<String, String>,
}

impl StaticConnector {
    #[must_use]
    pub fn new(bitcoin_network: BitcoinNetwork) -> Self {
        Self {
            bitcoin_network,
            ens_names: HashMap::new(),
        }
    }

    /// Register an ENS name. The target must itself be a valid Ethereum address.
    pub fn with_ens_name(mut self, name: &str, address: &str) -> Result<Self, String> {
        let normalized = normalize_eth_hex(address)?;
        self.ens_names.insert(name.trim().to_ascii_lowercase(), normalized);
        Ok(self)
    }

    fn normalize_eth(&self, raw: &str) -> Result<String, String> {
        let trimmed = raw.trim();
        if trimmed.to_ascii_lowercase().ends_with(".eth") {
            return self
                .ens_names
                .get(&trimmed.to_ascii_lowercase())
                .cloned()
                .ok_or_else(|| format!("Given ENS address {trimmed} could not be resolved"));
        }
        normalize_eth_hex(trimmed)
    }

    fn normalize_btc(&self, raw: &str) -> Result<String, String> {
        let trimmed = raw.trim();
        let network = self.bitcoin_network;
        let invalid = || format!("Given value {trimmed} is not a valid bitcoin address for {network}");

        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("bc1") || lower.starts_with("tb1") {
            // segwit decoding verifies the checksum and rejects mixed case
            let (found_hrp, _version, _program) =
                bech32::segwit::decode(trimmed).map_err(|_| invalid())?;
            if found_hrp != network.bech32_hrp() {
                return Err(invalid());
            }
            return Ok(lower);
        }

        let decoded = bs58::decode(trimmed).into_vec().map_err(|_| invalid())?;
        if decoded.len() != 25 || !network.base58_versions().contains(&decoded[0]) {
            return Err(invalid());
        }
        let (payload, checksum) = decoded.split_at(21);
        let first = Sha256::digest(payload);
        let second = Sha256::digest(first.as_slice());
        if &second.as_slice()[..4] != checksum {
            return Err(invalid());
        }
        Ok(trimmed.to_string())
    }
}

/// Parse a `0x` hex address into its EIP-55 checksummed form.
///
/// Single-case input carries no checksum and is accepted as is; mixed-case
/// input must match its checksum.
fn normalize_eth_hex(raw: &str) -> Result<String, String> {
    let not_address = || format!("Given value {raw} is not an ethereum address");
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(not_address)?;
    let address = Address::from_str(digits).map_err(|_| not_address())?;
    let checksummed = address.to_checksum(None);
    let single_case =
        digits == digits.to_ascii_lowercase() || digits == digits.to_ascii_uppercase();
    if !single_case && checksummed[2..] != *digits {
        return Err(format!("Given value {raw} has an invalid EIP-55 checksum"));
    }
    Ok(checksummed)
}

impl ChainConnector for StaticConnector {
    fn bitcoin_network(&self) -> BitcoinNetwork {
        self.bitcoin_network
    }

    fn normalize_address(&self, chain: Chain, raw: &str) -> Result<String, String> {
        match chain {
            Chain::Eth => self.normalize_eth(raw),
            Chain::Btc => self.normalize_btc(raw),
        }
    }
}

struct ActiveConnector(Arc<dyn ChainConnector>);

/// Process-wide holder of the active connector.
///
/// Reads are lock-free snapshots; installs swap the whole connector.
pub struct ConnectorSlot {
    active: ArcSwapOption<ActiveConnector>,
}

impl Default for ConnectorSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectorSlot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: ArcSwapOption::empty(),
        }
    }

    #[must_use]
    pub fn with_connector(connector: Arc<dyn ChainConnector>) -> Self {
        let slot = Self::new();
        slot.install(connector);
        slot
    }

    pub fn install(&self, connector: Arc<dyn ChainConnector>) {
        let network = connector.bitcoin_network();
        self.active.store(Some(Arc::new(ActiveConnector(connector))));
        info!(bitcoin_network = %network, "Chain connector installed");
    }

    pub fn clear(&self) {
        self.active.store(None);
        info!("Chain connector cleared");
    }

    /// Connector for the current request, if one is configured
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<dyn ChainConnector>> {
        self.active.load_full().map(|active| Arc::clone(&active.0))
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.active.load().is_some()
    }
}

impl fmt::Debug for ConnectorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorSlot")
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Genesis block coinbase address
    const GENESIS_P2PKH: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
    const ETH_ADDR: &str = "0x9531C059098e3d194fF87FebB587aB07B30B1306";

    #[test]
    fn eth_addresses_are_checksummed() {
        let c = StaticConnector::new(BitcoinNetwork::Mainnet);
        assert_eq!(c.normalize_address(Chain::Eth, ETH_ADDR).unwrap(), ETH_ADDR);
        let lower = ETH_ADDR.to_ascii_lowercase();
        assert_eq!(c.normalize_address(Chain::Eth, &lower).unwrap(), ETH_ADDR);
        let upper = format!("0x{}", ETH_ADDR[2..].to_ascii_uppercase());
        assert_eq!(c.normalize_address(Chain::Eth, &upper).unwrap(), ETH_ADDR);
    }

    #[test]
    fn eth_mixed_case_must_match_checksum() {
        let c = StaticConnector::default();
        // first letter case flipped
        let bad = "0x9531c059098e3d194fF87FebB587aB07B30B1306";
        let err = c.normalize_address(Chain::Eth, bad).unwrap_err();
        assert!(err.contains("checksum"), "{err}");
    }

    #[test]
    fn eth_rejects_short_and_non_hex() {
        let c = StaticConnector::default();
        assert!(c.normalize_address(Chain::Eth, "0xabc").is_err());
        assert!(c
            .normalize_address(Chain::Eth, "0xzz31C059098e3d194fF87FebB587aB07B30B1306")
            .is_err());
        assert!(c
            .normalize_address(Chain::Eth, "9531C059098e3d194fF87FebB587aB07B30B1306")
            .is_err());
    }

    #[test]
    fn ens_names_resolve_through_table() {
        let c = StaticConnector::new(BitcoinNetwork::Mainnet)
            .with_ens_name("Rotki.eth", ETH_ADDR)
            .unwrap();
        assert_eq!(c.normalize_address(Chain::Eth, "rotki.eth").unwrap(), ETH_ADDR);
        let err = c.normalize_address(Chain::Eth, "nobody.eth").unwrap_err();
        assert!(err.contains("could not be resolved"));
    }

    #[test]
    fn btc_base58_checks_network_and_checksum() {
        let mainnet = StaticConnector::new(BitcoinNetwork::Mainnet);
        assert_eq!(
            mainnet.normalize_address(Chain::Btc, GENESIS_P2PKH).unwrap(),
            GENESIS_P2PKH
        );
        // last character flipped breaks the checksum
        let tampered = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb";
        assert!(mainnet.normalize_address(Chain::Btc, tampered).is_err());

        let testnet = StaticConnector::new(BitcoinNetwork::Testnet);
        assert!(testnet.normalize_address(Chain::Btc, GENESIS_P2PKH).is_err());
    }

    #[test]
    fn btc_bech32_requires_network_hrp() {
        let addr = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";
        let mainnet = StaticConnector::new(BitcoinNetwork::Mainnet);
        assert_eq!(mainnet.normalize_address(Chain::Btc, addr).unwrap(), addr);
        assert_eq!(
            mainnet.normalize_address(Chain::Btc, &addr.to_ascii_uppercase()).unwrap(),
            addr
        );
        let testnet = StaticConnector::new(BitcoinNetwork::Testnet);
        assert!(testnet.normalize_address(Chain::Btc, addr).is_err());
        let testnet_addr = "tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sl5k7";
        assert_eq!(
            testnet.normalize_address(Chain::Btc, testnet_addr).unwrap(),
            testnet_addr
        );
    }

    #[test]
    fn btc_bech32_checksum_is_verified() {
        let mainnet = StaticConnector::new(BitcoinNetwork::Mainnet);
        // last character changed
        let tampered = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5";
        assert!(mainnet.normalize_address(Chain::Btc, tampered).is_err());
        let mixed = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kV8f3t4";
        assert!(mainnet.normalize_address(Chain::Btc, mixed).is_err());
    }

    #[test]
    fn slot_snapshots_survive_reinstall() {
        let slot = ConnectorSlot::new();
        assert!(slot.snapshot().is_none());
        slot.install(Arc::new(StaticConnector::new(BitcoinNetwork::Mainnet)));
        let before = slot.snapshot().unwrap();
        slot.install(Arc::new(StaticConnector::new(BitcoinNetwork::Testnet)));
        assert_eq!(before.bitcoin_network(), BitcoinNetwork::Mainnet);
        assert_eq!(
            slot.snapshot().unwrap().bitcoin_network(),
            BitcoinNetwork::Testnet
        );
        slot.clear();
        assert!(!slot.is_configured());
    }

    #[test]
    fn chain_symbols_parse_case_insensitively() {
        assert_eq!(Chain::from_symbol("eth"), Some(Chain::Eth));
        assert_eq!(Chain::from_symbol("BTC"), Some(Chain::Btc));
        assert_eq!(Chain::from_symbol("KSM"), None);
        assert_eq!(SUPPORTED_BLOCKCHAIN.resolve("btc"), Some("BTC"));
    }
}
