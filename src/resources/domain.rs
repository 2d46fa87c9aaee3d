//! Domain enums and newtypes shared by resource schemas and facade arguments.

use crate::schema::domain_enum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Epoch seconds
pub type Timestamp = u64;

domain_enum! {
    /// Where a trade, movement or ledger action happened
    Location, LOCATION {
        External => "EXTERNAL",
        Kraken => "KRAKEN",
        Poloniex => "POLONIEX",
        Bittrex => "BITTREX",
        Binance => "BINANCE",
        Bitmex => "BITMEX",
        Coinbase => "COINBASE",
        Banks => "BANKS",
        Blockchain => "BLOCKCHAIN",
        CoinbasePro => "COINBASEPRO",
        Gemini => "GEMINI",
        Bitstamp => "BITSTAMP",
        BinanceUs => "BINANCEUS",
        Bitfinex => "BITFINEX",
        Kucoin => "KUCOIN",
        Ftx => "FTX",
        Iconomi => "ICONOMI",
        Uniswap => "UNISWAP",
        Balancer => "BALANCER",
        Sushiswap => "SUSHISWAP",
    }
}

domain_enum! {
    /// Locations that are centralized exchanges with balances to query
    Exchange, SUPPORTED_EXCHANGE {
        Kraken => "KRAKEN",
        Poloniex => "POLONIEX",
        Bittrex => "BITTREX",
        Binance => "BINANCE",
        Bitmex => "BITMEX",
        Coinbase => "COINBASE",
        CoinbasePro => "COINBASEPRO",
        Gemini => "GEMINI",
        Bitstamp => "BITSTAMP",
        BinanceUs => "BINANCEUS",
        Bitfinex => "BITFINEX",
        Kucoin => "KUCOIN",
        Ftx => "FTX",
        Iconomi => "ICONOMI",
    }
}

domain_enum! {
    HistoricalPriceOracle, HISTORICAL_PRICE_ORACLE {
        Cryptocompare => "cryptocompare",
        Coingecko => "coingecko",
    }
}

domain_enum! {
    UserActionKind, USER_ACTION {
        Login => "login",
        Logout => "logout",
    }
}

domain_enum! {
    /// Answer to "may the remote premium DB replace the local one"
    SyncApproval, SYNC_APPROVAL {
        Yes => "yes",
        No => "no",
        Unknown => "unknown",
    }
}

/// Asset identifier as given by the caller (`BTC`, `ETH`, `_ceth_0x...`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Asset(pub String);

impl Asset {
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_canonical_spelling() {
        assert_eq!(serde_json::to_value(Location::Binance).unwrap(), "BINANCE");
        let oracle: HistoricalPriceOracle = serde_json::from_value("coingecko".into()).unwrap();
        assert_eq!(oracle, HistoricalPriceOracle::Coingecko);
        assert_eq!(LOCATION.resolve("binanceus"), Some("BINANCEUS"));
        assert_eq!(SyncApproval::from_symbol("YES"), Some(SyncApproval::Yes));
    }
}
