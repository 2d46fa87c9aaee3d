use super::api::*;
use crate::dispatcher::HandlerResponse;
use serde::Serialize;
use serde_json::{json, Value};

/// Facade that performs nothing and answers with the operation it would have
/// run plus the typed arguments it received.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoApi;

fn echo<T: Serialize>(operation: &str, args: &T) -> HandlerResponse {
    let arguments = serde_json::to_value(args).unwrap_or(Value::Null);
    HandlerResponse::ok(json!({
        "operation": operation,
        "arguments": arguments,
    }))
}

impl RestApi for EchoApi {
    fn query_trades(&self, args: TradesQuery) -> HandlerResponse {
        echo("query_trades", &args)
    }

    fn query_ledger_actions(&self, args: LedgerActionsQuery) -> HandlerResponse {
        echo("query_ledger_actions", &args)
    }

    fn get_exchange_rates(&self, args: ExchangeRatesQuery) -> HandlerResponse {
        echo("get_exchange_rates", &args)
    }

    fn get_current_assets_price(&self, args: CurrentPricesQuery) -> HandlerResponse {
        echo("get_current_assets_price", &args)
    }

    fn get_historical_assets_price(&self, args: HistoricalPricesQuery) -> HandlerResponse {
        echo("get_historical_assets_price", &args)
    }

    fn query_exchange_balances(&self, args: ExchangeBalancesQuery) -> HandlerResponse {
        echo("query_exchange_balances", &args)
    }

    fn query_blockchain_balances(&self, args: BlockchainBalancesQuery) -> HandlerResponse {
        echo("query_blockchain_balances", &args)
    }

    fn get_ethereum_transactions(&self, args: EthereumTransactionsQuery) -> HandlerResponse {
        echo("get_ethereum_transactions", &args)
    }

    fn get_blockchain_accounts(&self, args: BlockchainAccountsQuery) -> HandlerResponse {
        echo("get_blockchain_accounts", &args)
    }

    fn add_blockchain_accounts(&self, args: BlockchainAccountsAdd) -> HandlerResponse {
        echo("add_blockchain_accounts", &args)
    }

    fn edit_blockchain_accounts(&self, args: BlockchainAccountsEdit) -> HandlerResponse {
        echo("edit_blockchain_accounts", &args)
    }

    fn remove_blockchain_accounts(&self, args: BlockchainAccountsRemove) -> HandlerResponse {
        echo("remove_blockchain_accounts", &args)
    }

    fn get_oracle_cache(&self, args: OracleCacheQuery) -> HandlerResponse {
        echo("get_oracle_cache", &args)
    }

    fn create_oracle_cache(&self, args: OracleCacheCreate) -> HandlerResponse {
        echo("create_oracle_cache", &args)
    }

    fn delete_oracle_cache(&self, args: OracleCacheDelete) -> HandlerResponse {
        echo("delete_oracle_cache", &args)
    }

    fn query_statistics_asset_balance(
        &self,
        args: AssetBalanceStatisticsQuery,
    ) -> HandlerResponse {
        echo("query_statistics_asset_balance", &args)
    }

    fn user_login(&self, args: UserLogin) -> HandlerResponse {
        echo("user_login", &args)
    }

    fn user_logout(&self, name: String) -> HandlerResponse {
        echo("user_logout", &json!({ "name": name }))
    }

    fn user_set_premium_credentials(&self, args: PremiumCredentials) -> HandlerResponse {
        echo("user_set_premium_credentials", &args)
    }

    fn query_tasks(&self, args: AsyncTasksQuery) -> HandlerResponse {
        echo("query_tasks", &args)
    }
}
