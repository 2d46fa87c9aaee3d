//! # Resources Module
//!
//! The resource table: which path patterns belong to which resource, and for
//! each resource and verb the loader, descriptor and facade operation.
//!
//! Handlers here are declarative. Each one unpacks its validated arguments
//! into the facade's keyword struct and calls straight into [`RestApi`]; no
//! domain logic lives in this crate.

pub mod api;
pub mod domain;
mod echo;
pub mod schemas;

pub use api::RestApi;
pub use echo::EchoApi;

use crate::dispatcher::{Dispatcher, HandlerResponse};
use crate::loader::LoaderKind;
use crate::router::Router;
use crate::schema::SchemaSource;
use anyhow::{Context, Result};
use api::{PremiumCredentials, UserActionArgs, UserLogin};
use domain::UserActionKind;
use http::Method;
use std::sync::Arc;
use tracing::info;

/// `(pattern, resource)`; optional trailing segments are registered as two
/// patterns for the same resource.
pub const ROUTES: &[(&str, &str)] = &[
    ("/trades", "trades"),
    ("/ledgeractions", "ledger_actions"),
    ("/exchange_rates", "exchange_rates"),
    ("/assets/prices/current", "current_prices"),
    ("/assets/prices/historical", "historical_prices"),
    ("/exchanges/balances", "exchange_balances"),
    ("/exchanges/balances/{name}", "exchange_balances"),
    ("/balances/blockchains", "blockchain_balances"),
    ("/balances/blockchains/{blockchain}", "blockchain_balances"),
    ("/blockchains/ETH/transactions", "ethereum_transactions"),
    ("/blockchains/ETH/transactions/{address}", "ethereum_transactions"),
    ("/blockchains/{blockchain}", "blockchain_accounts"),
    ("/oracles/{oracle}/cache", "oracle_cache"),
    ("/statistics/balance/{asset}", "statistics_asset_balance"),
    ("/users/{name}", "user_by_name"),
    ("/tasks", "async_tasks"),
    ("/tasks/{task_id}", "async_tasks"),
];

macro_rules! bind_op {
    ($dispatcher:expr, $api:expr, $resource:literal, $method:ident, $loader:ident, $schema:expr, $op:ident) => {{
        let api = Arc::clone(&$api);
        $dispatcher.bind_typed(
            $resource,
            Method::$method,
            LoaderKind::$loader,
            $schema,
            move |args| api.$op(args),
        );
    }};
}

/// Register every route and binding against `api`.
pub fn register_all(
    dispatcher: &mut Dispatcher,
    router: &mut Router,
    api: Arc<dyn RestApi>,
) -> Result<()> {
    for (pattern, resource) in ROUTES {
        router
            .add_route(pattern, resource)
            .with_context(|| format!("failed to register route for {resource}"))?;
    }

    bind_op!(dispatcher, api, "trades", GET, BodyAndQuery, schemas::trades_query()?, query_trades);
    bind_op!(
        dispatcher, api, "ledger_actions", GET, BodyAndQuery,
        schemas::ledger_actions_query()?, query_ledger_actions
    );
    bind_op!(
        dispatcher, api, "exchange_rates", GET, BodyAndQuery,
        schemas::exchange_rates_query()?, get_exchange_rates
    );
    bind_op!(
        dispatcher, api, "current_prices", GET, BodyAndQuery,
        schemas::current_prices_query()?, get_current_assets_price
    );
    bind_op!(
        dispatcher, api, "historical_prices", POST, Body,
        schemas::historical_prices_query()?, get_historical_assets_price
    );
    bind_op!(
        dispatcher, api, "exchange_balances", GET, BodyQueryAndPath,
        schemas::exchange_balances_query()?, query_exchange_balances
    );
    bind_op!(
        dispatcher, api, "blockchain_balances", GET, BodyQueryAndPath,
        schemas::blockchain_balances_query()?, query_blockchain_balances
    );
    bind_op!(
        dispatcher, api, "ethereum_transactions", GET, BodyQueryAndPath,
        SchemaSource::factory(schemas::ethereum_transactions_query), get_ethereum_transactions
    );
    bind_op!(
        dispatcher, api, "blockchain_accounts", GET, Path,
        schemas::blockchain_accounts_get()?, get_blockchain_accounts
    );
    bind_op!(
        dispatcher, api, "blockchain_accounts", PUT, BodyAndPath,
        SchemaSource::factory(schemas::blockchain_accounts_put), add_blockchain_accounts
    );
    bind_op!(
        dispatcher, api, "blockchain_accounts", PATCH, BodyAndPath,
        SchemaSource::factory(schemas::blockchain_accounts_patch), edit_blockchain_accounts
    );
    bind_op!(
        dispatcher, api, "blockchain_accounts", DELETE, BodyAndPath,
        SchemaSource::factory(schemas::blockchain_accounts_delete), remove_blockchain_accounts
    );
    bind_op!(
        dispatcher, api, "oracle_cache", GET, BodyQueryAndPath,
        schemas::oracle_cache_get()?, get_oracle_cache
    );
    bind_op!(
        dispatcher, api, "oracle_cache", POST, BodyAndPath,
        schemas::oracle_cache_create()?, create_oracle_cache
    );
    bind_op!(
        dispatcher, api, "oracle_cache", DELETE, BodyAndPath,
        schemas::oracle_cache_delete()?, delete_oracle_cache
    );
    bind_op!(
        dispatcher, api, "statistics_asset_balance", GET, BodyQueryAndPath,
        schemas::statistics_asset_balance()?, query_statistics_asset_balance
    );
    bind_op!(
        dispatcher, api, "async_tasks", GET, Path,
        schemas::async_tasks_query()?, query_tasks
    );

    let user_api = Arc::clone(&api);
    dispatcher.bind_typed(
        "user_by_name",
        Method::PATCH,
        LoaderKind::BodyAndPath,
        schemas::user_action()?,
        move |args: UserActionArgs| user_action(user_api.as_ref(), args),
    );

    info!(
        routes_count = router.len(),
        bindings_count = dispatcher.len(),
        "Resources registered"
    );
    Ok(())
}

/// Split a user PATCH into login, logout or a premium credential update
fn user_action(api: &dyn RestApi, args: UserActionArgs) -> HandlerResponse {
    match (args.action, args.password) {
        (Some(UserActionKind::Login), Some(password)) => api.user_login(UserLogin {
            name: args.name,
            password,
            sync_approval: args.sync_approval,
        }),
        (Some(UserActionKind::Logout), _) => api.user_logout(args.name),
        (None, _) => api.user_set_premium_credentials(PremiumCredentials {
            name: args.name,
            api_key: args.premium_api_key,
            api_secret: args.premium_api_secret,
        }),
        (Some(UserActionKind::Login), None) => {
            HandlerResponse::error(400, "Missing password field for login")
        }
    }
}
