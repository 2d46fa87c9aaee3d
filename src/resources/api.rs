//! Facade boundary: typed keyword structs and the trait handlers call into.
//!
//! Field names of every struct match the descriptor bound for the operation,
//! so validated arguments unpack into them one to one.

use super::domain::{
    Asset, Exchange, HistoricalPriceOracle, Location, SyncApproval, Timestamp, UserActionKind,
};
use crate::connector::Chain;
use crate::dispatcher::HandlerResponse;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradesQuery {
    pub from_timestamp: Timestamp,
    pub to_timestamp: Timestamp,
    pub location: Option<Location>,
    pub async_query: bool,
    pub only_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerActionsQuery {
    pub from_timestamp: Timestamp,
    pub to_timestamp: Timestamp,
    pub location: Option<Location>,
    pub async_query: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRatesQuery {
    pub currencies: Vec<Asset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentPricesQuery {
    pub assets: Vec<Asset>,
    pub target_asset: Asset,
    pub ignore_cache: bool,
    pub async_query: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPricesQuery {
    pub assets_timestamp: Vec<(Asset, Timestamp)>,
    pub target_asset: Asset,
    pub async_query: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeBalancesQuery {
    pub name: Option<Exchange>,
    pub async_query: bool,
    pub ignore_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainBalancesQuery {
    pub blockchain: Option<Chain>,
    pub async_query: bool,
    pub ignore_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EthereumTransactionsQuery {
    pub address: Option<String>,
    pub from_timestamp: Timestamp,
    pub to_timestamp: Timestamp,
    pub only_cache: bool,
    pub async_query: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainAccountsQuery {
    pub blockchain: Chain,
}

/// One account entry of an add or edit request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountEntry {
    pub address: String,
    pub label: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainAccountsAdd {
    pub blockchain: Chain,
    pub accounts: Vec<AccountEntry>,
    pub async_query: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainAccountsEdit {
    pub blockchain: Chain,
    pub accounts: Vec<AccountEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockchainAccountsRemove {
    pub blockchain: Chain,
    pub accounts: Vec<String>,
    pub async_query: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleCacheQuery {
    pub oracle: HistoricalPriceOracle,
    pub async_query: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleCacheCreate {
    pub oracle: HistoricalPriceOracle,
    pub from_asset: Asset,
    pub to_asset: Asset,
    pub purge_old: bool,
    pub async_query: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleCacheDelete {
    pub oracle: HistoricalPriceOracle,
    pub from_asset: Asset,
    pub to_asset: Asset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetBalanceStatisticsQuery {
    pub asset: Asset,
    pub from_timestamp: Timestamp,
    pub to_timestamp: Timestamp,
}

/// Arguments of `PATCH /users/{name}`; split into login, logout or premium
/// credential update before reaching the facade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActionArgs {
    pub name: String,
    pub action: Option<UserActionKind>,
    pub password: Option<String>,
    pub sync_approval: SyncApproval,
    pub premium_api_key: String,
    pub premium_api_secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLogin {
    pub name: String,
    pub password: String,
    pub sync_approval: SyncApproval,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumCredentials {
    pub name: String,
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncTasksQuery {
    pub task_id: Option<i64>,
}

/// Business-logic facade. Every domain effect happens behind this trait.
pub trait RestApi: Send + Sync {
    fn query_trades(&self, args: TradesQuery) -> HandlerResponse;
    fn query_ledger_actions(&self, args: LedgerActionsQuery) -> HandlerResponse;
    fn get_exchange_rates(&self, args: ExchangeRatesQuery) -> HandlerResponse;
    fn get_current_assets_price(&self, args: CurrentPricesQuery) -> HandlerResponse;
    fn get_historical_assets_price(&self, args: HistoricalPricesQuery) -> HandlerResponse;
    fn query_exchange_balances(&self, args: ExchangeBalancesQuery) -> HandlerResponse;
    fn query_blockchain_balances(&self, args: BlockchainBalancesQuery) -> HandlerResponse;
    fn get_ethereum_transactions(&self, args: EthereumTransactionsQuery) -> HandlerResponse;
    fn get_blockchain_accounts(&self, args: BlockchainAccountsQuery) -> HandlerResponse;
    fn add_blockchain_accounts(&self, args: BlockchainAccountsAdd) -> HandlerResponse;
    fn edit_blockchain_accounts(&self, args: BlockchainAccountsEdit) -> HandlerResponse;
    fn remove_blockchain_accounts(&self, args: BlockchainAccountsRemove) -> HandlerResponse;
    fn get_oracle_cache(&self, args: OracleCacheQuery) -> HandlerResponse;
    fn create_oracle_cache(&self, args: OracleCacheCreate) -> HandlerResponse;
    fn delete_oracle_cache(&self, args: OracleCacheDelete) -> HandlerResponse;
    fn query_statistics_asset_balance(&self, args: AssetBalanceStatisticsQuery)
        -> HandlerResponse;
    fn user_login(&self, args: UserLogin) -> HandlerResponse;
    fn user_logout(&self, name: String) -> HandlerResponse;
    fn user_set_premium_credentials(&self, args: PremiumCredentials) -> HandlerResponse;
    fn query_tasks(&self, args: AsyncTasksQuery) -> HandlerResponse;
}
