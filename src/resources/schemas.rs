//! Argument descriptors of the registered resources.
//!
//! Static descriptors are plain constructors called once at registration.
//! Descriptors whose address rules depend on the configured chain connector
//! are factories, built per request.

use super::domain::{
    HISTORICAL_PRICE_ORACLE, LOCATION, SUPPORTED_EXCHANGE, SYNC_APPROVAL, USER_ACTION,
};
use crate::connector::{Chain, ChainConnector, SUPPORTED_BLOCKCHAIN};
use crate::schema::{FieldRule, FieldSpec, FieldType, SchemaDescriptor, SchemaError};
use crate::validator::{FieldIssue, TypedValue};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn now() -> TypedValue {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    TypedValue::Timestamp(secs)
}

fn async_query() -> FieldSpec {
    FieldSpec::new("async_query", FieldType::Bool).default_value(false)
}

fn flag(name: &str) -> FieldSpec {
    FieldSpec::new(name, FieldType::Bool).default_value(false)
}

fn from_timestamp() -> FieldSpec {
    FieldSpec::new("from_timestamp", FieldType::Timestamp)
        .default_value(TypedValue::Timestamp(0))
}

fn to_timestamp() -> FieldSpec {
    FieldSpec::new("to_timestamp", FieldType::Timestamp).default_with(now)
}

fn check_timerange(values: &mut BTreeMap<String, TypedValue>) -> Result<(), Vec<FieldIssue>> {
    let from = values.get("from_timestamp").and_then(TypedValue::as_timestamp);
    let to = values.get("to_timestamp").and_then(TypedValue::as_timestamp);
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(vec![FieldIssue::new(
            "from_timestamp",
            "from_timestamp must be smaller than or equal to to_timestamp",
        )]),
        _ => Ok(()),
    }
}

fn asset_list(name: &str) -> FieldSpec {
    FieldSpec::new(name, FieldType::list_of(FieldType::Asset))
        .required()
        .delimited(',')
        .rule(FieldRule::NonEmpty)
}

pub fn trades_query() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("TimerangeLocationCacheQuery")
        .field(from_timestamp())
        .field(to_timestamp())
        .field(FieldSpec::new("location", FieldType::Enum(LOCATION)).nullable())
        .field(async_query())
        .field(flag("only_cache"))
        .check("timerange", check_timerange)
        .build()
}

pub fn ledger_actions_query() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("TimerangeLocationQuery")
        .field(from_timestamp())
        .field(to_timestamp())
        .field(FieldSpec::new("location", FieldType::Enum(LOCATION)).nullable())
        .field(async_query())
        .check("timerange", check_timerange)
        .build()
}

pub fn exchange_rates_query() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("ExchangeRates")
        .field(asset_list("currencies"))
        .build()
}

pub fn current_prices_query() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("CurrentAssetsPrice")
        .field(asset_list("assets"))
        .field(FieldSpec::new("target_asset", FieldType::Asset).required())
        .field(flag("ignore_cache"))
        .field(async_query())
        .build()
}

pub fn historical_prices_query() -> Result<SchemaDescriptor, SchemaError> {
    let pair = FieldType::Tuple(vec![FieldType::Asset, FieldType::Timestamp]);
    SchemaDescriptor::builder("HistoricalAssetsPrice")
        .field(
            FieldSpec::new("assets_timestamp", FieldType::list_of(pair))
                .required()
                .rule(FieldRule::NonEmpty),
        )
        .field(FieldSpec::new("target_asset", FieldType::Asset).required())
        .field(async_query())
        .build()
}

pub fn exchange_balances_query() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("ExchangeBalanceQuery")
        .field(FieldSpec::new("name", FieldType::Enum(SUPPORTED_EXCHANGE)).nullable())
        .field(async_query())
        .field(flag("ignore_cache"))
        .build()
}

pub fn blockchain_balances_query() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("BlockchainBalanceQuery")
        .field(FieldSpec::new("blockchain", FieldType::Enum(SUPPORTED_BLOCKCHAIN)).nullable())
        .field(async_query())
        .field(flag("ignore_cache"))
        .build()
}

pub fn blockchain_accounts_get() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("BlockchainAccountsGet")
        .field(FieldSpec::new("blockchain", FieldType::Enum(SUPPORTED_BLOCKCHAIN)).required())
        .build()
}

fn oracle() -> FieldSpec {
    FieldSpec::new("oracle", FieldType::Enum(HISTORICAL_PRICE_ORACLE)).required()
}

pub fn oracle_cache_get() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("NamedOracleCacheGet")
        .field(oracle())
        .field(async_query())
        .build()
}

pub fn oracle_cache_create() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("NamedOracleCacheCreate")
        .field(oracle())
        .field(FieldSpec::new("from_asset", FieldType::Asset).required())
        .field(FieldSpec::new("to_asset", FieldType::Asset).required())
        .field(flag("purge_old"))
        .field(async_query())
        .build()
}

pub fn oracle_cache_delete() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("NamedOracleCache")
        .field(oracle())
        .field(FieldSpec::new("from_asset", FieldType::Asset).required())
        .field(FieldSpec::new("to_asset", FieldType::Asset).required())
        .build()
}

pub fn statistics_asset_balance() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("StatisticsAssetBalance")
        .field(FieldSpec::new("asset", FieldType::Asset).required())
        .field(from_timestamp())
        .field(to_timestamp())
        .check("timerange", check_timerange)
        .build()
}

pub fn user_action() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("UserAction")
        .field(FieldSpec::new("name", FieldType::String).required().rule(FieldRule::NonEmpty))
        .field(FieldSpec::new("action", FieldType::Enum(USER_ACTION)).nullable())
        .field(FieldSpec::new("password", FieldType::String).nullable())
        .field(
            FieldSpec::new("sync_approval", FieldType::Enum(SYNC_APPROVAL))
                .default_value(TypedValue::Enum("unknown".to_string())),
        )
        .field(FieldSpec::new("premium_api_key", FieldType::String).default_value(""))
        .field(FieldSpec::new("premium_api_secret", FieldType::String).default_value(""))
        .check("user_action", check_user_action)
        .build()
}

fn check_user_action(values: &mut BTreeMap<String, TypedValue>) -> Result<(), Vec<FieldIssue>> {
    let action = values.get("action").and_then(TypedValue::as_str);
    let is_blank = |name: &str| {
        values
            .get(name)
            .and_then(TypedValue::as_str)
            .map_or(true, str::is_empty)
    };
    match action {
        Some("login") if values.get("password").map_or(true, TypedValue::is_null) => Err(vec![
            FieldIssue::new("password", "Missing password field for login"),
        ]),
        None if is_blank("premium_api_key") || is_blank("premium_api_secret") => {
            Err(vec![FieldIssue::new(
                "action",
                "Without an action premium api key and secret must be provided",
            )])
        }
        _ => Ok(()),
    }
}

pub fn async_tasks_query() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("AsyncTasksQuery")
        .field(
            FieldSpec::new("task_id", FieldType::Integer)
                .nullable()
                .rule(FieldRule::min(0.0)),
        )
        .build()
}

/// `GET /blockchains/ETH/transactions[/{address}]`: the optional address is
/// normalised by the active connector.
pub fn ethereum_transactions_query(
    connector: Arc<dyn ChainConnector>,
) -> Result<SchemaDescriptor, SchemaError> {
    let address_rule = FieldRule::custom("ethereum_address", move |value| match value {
        TypedValue::Address(raw) => connector
            .normalize_address(Chain::Eth, &raw)
            .map(TypedValue::Address),
        other => Ok(other),
    });
    SchemaDescriptor::builder("EthereumTransactionQuery")
        .field(
            FieldSpec::new("address", FieldType::Address)
                .nullable()
                .rule(address_rule),
        )
        .field(from_timestamp())
        .field(to_timestamp())
        .field(flag("only_cache"))
        .field(async_query())
        .check("timerange", check_timerange)
        .build()
}

fn account_entry() -> Result<SchemaDescriptor, SchemaError> {
    SchemaDescriptor::builder("BlockchainAccountData")
        .field(FieldSpec::new("address", FieldType::Address).required())
        .field(FieldSpec::new("label", FieldType::String).nullable())
        .field(FieldSpec::new("tags", FieldType::list_of(FieldType::String)).nullable())
        .build()
}

fn blockchain_path_field() -> FieldSpec {
    FieldSpec::new("blockchain", FieldType::Enum(SUPPORTED_BLOCKCHAIN)).required()
}

/// Normalise every account address for the chain named in `blockchain` and
/// reject duplicates. Entries are either objects with an `address` key or
/// bare addresses.
fn normalize_accounts(
    connector: &dyn ChainConnector,
    values: &mut BTreeMap<String, TypedValue>,
) -> Result<(), Vec<FieldIssue>> {
    let Some(chain) = values
        .get("blockchain")
        .and_then(TypedValue::as_str)
        .and_then(Chain::from_symbol)
    else {
        return Ok(());
    };
    let Some(TypedValue::List(accounts)) = values.get_mut("accounts") else {
        return Ok(());
    };

    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    for (i, entry) in accounts.iter_mut().enumerate() {
        let (slot, location) = match entry {
            TypedValue::Object(map) => match map.get_mut("address") {
                Some(slot) => (slot, format!("accounts[{i}].address")),
                None => continue,
            },
            other => (other, format!("accounts[{i}]")),
        };
        let Some(raw) = slot.as_str().map(str::to_string) else {
            continue;
        };
        match connector.normalize_address(chain, &raw) {
            Ok(normalized) => {
                if !seen.insert(normalized.clone()) {
                    issues.push(FieldIssue::at(
                        "accounts",
                        location,
                        format!("Address {raw} appears multiple times in the given accounts"),
                    ));
                }
                *slot = TypedValue::Address(normalized);
            }
            Err(message) => issues.push(FieldIssue::at("accounts", location, message)),
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn accounts_schema(
    name: &str,
    connector: Arc<dyn ChainConnector>,
    entries: FieldType,
    with_async_query: bool,
) -> Result<SchemaDescriptor, SchemaError> {
    let mut builder = SchemaDescriptor::builder(name)
        .field(blockchain_path_field())
        .field(
            FieldSpec::new("accounts", FieldType::list_of(entries))
                .required()
                .rule(FieldRule::NonEmpty),
        );
    if with_async_query {
        builder = builder.field(async_query());
    }
    builder
        .check("accounts_for_chain", move |values| {
            normalize_accounts(connector.as_ref(), values)
        })
        .build()
}

pub fn blockchain_accounts_put(
    connector: Arc<dyn ChainConnector>,
) -> Result<SchemaDescriptor, SchemaError> {
    let entry = FieldType::object(account_entry()?);
    accounts_schema("BlockchainAccountsPut", connector, entry, true)
}

pub fn blockchain_accounts_patch(
    connector: Arc<dyn ChainConnector>,
) -> Result<SchemaDescriptor, SchemaError> {
    let entry = FieldType::object(account_entry()?);
    accounts_schema("BlockchainAccountsPatch", connector, entry, false)
}

pub fn blockchain_accounts_delete(
    connector: Arc<dyn ChainConnector>,
) -> Result<SchemaDescriptor, SchemaError> {
    accounts_schema("BlockchainAccountsDelete", connector, FieldType::Address, true)
}
