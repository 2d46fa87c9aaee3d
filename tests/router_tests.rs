use brrtargs::resources::ROUTES;
use brrtargs::router::{Router, RouterError};

fn resource_table() -> Router {
    let mut router = Router::new("/api/1/");
    for (pattern, resource) in ROUTES {
        router.add_route(pattern, resource).unwrap();
    }
    router
}

#[test]
fn test_resource_table_resolution() {
    let router = resource_table();
    let cases = [
        ("/api/1/trades", Some("trades")),
        ("/api/1/trades/", Some("trades")),
        ("/api/1/exchanges/balances/kraken", Some("exchange_balances")),
        ("/api/1/blockchains/ETH/transactions", Some("ethereum_transactions")),
        ("/api/1/blockchains/ETH/transactions/0xabc", Some("ethereum_transactions")),
        ("/api/1/blockchains/BTC", Some("blockchain_accounts")),
        ("/api/1/oracles/coingecko/cache", Some("oracle_cache")),
        ("/api/1/users/alice", Some("user_by_name")),
        ("/api/1/tasks/7", Some("async_tasks")),
        ("/api/1/does/not/exist", None),
        ("/trades", None),
        ("/api/10/trades", None),
    ];
    for (path, expected) in cases {
        let found = router.route(path).map(|m| m.resource.to_string());
        assert_eq!(found.as_deref(), expected, "{path}");
    }
}

#[test]
fn test_path_params_are_percent_decoded() {
    let router = resource_table();
    let m = router.route("/api/1/users/john%20doe").unwrap();
    assert_eq!(m.get_path_param("name"), Some("john doe"));
    assert_eq!(m.pattern.as_ref(), "/users/{name}");
    assert_eq!(m.path_params_map().get("name").map(String::as_str), Some("john doe"));
}

#[test]
fn test_duplicate_pattern_is_rejected() {
    let mut router = resource_table();
    let err = router.add_route("/trades", "other").unwrap_err();
    assert!(matches!(err, RouterError::DuplicatePattern { .. }));
    assert!(err.to_string().contains("/trades"));
}

#[test]
fn test_routes_listing_includes_base_path() {
    let router = resource_table();
    let routes = router.routes();
    assert_eq!(routes.len(), ROUTES.len());
    assert!(routes
        .iter()
        .any(|(p, r)| p == "/api/1/assets/prices/historical" && r == "historical_prices"));
}
