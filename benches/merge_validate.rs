use brrtargs::connector::{BitcoinNetwork, ConnectorSlot, StaticConnector};
use brrtargs::dispatcher::Dispatcher;
use brrtargs::loader::LoaderKind;
use brrtargs::payload::RawRequest;
use brrtargs::resources::{register_all, schemas, EchoApi};
use brrtargs::router::Router;
use brrtargs::validator::validate;
use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use serde_json::json;
use std::hint::black_box;
use std::sync::Arc;

fn bench_merge_validate(c: &mut Criterion) {
    let schema = schemas::trades_query().unwrap();
    let req = RawRequest::from_target(
        Method::GET,
        "/trades?from_timestamp=0&to_timestamp=100&location=binance",
    )
    .with_json_body(&json!({"only_cache": true}));

    c.bench_function("load_body_and_query", |b| {
        b.iter(|| black_box(LoaderKind::BodyAndQuery.load(black_box(&req), &schema)))
    });

    let merged = LoaderKind::BodyAndQuery.load(&req, &schema);
    c.bench_function("validate_trades", |b| {
        b.iter(|| black_box(validate(black_box(&merged), &schema)))
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let slot = Arc::new(ConnectorSlot::with_connector(Arc::new(StaticConnector::new(
        BitcoinNetwork::Mainnet,
    ))));
    let mut router = Router::new("/api/1");
    let mut dispatcher = Dispatcher::with_connector_slot(slot);
    register_all(&mut dispatcher, &mut router, Arc::new(EchoApi)).unwrap();

    let body = json!({
        "accounts": [
            {"address": "0x9531C059098e3d194fF87FebB587aB07B30B1306", "label": "main"},
            {"address": "0x2B888954421b424C5D3D9Ce9bB67c9bD47537d12", "tags": ["cold"]},
        ]
    });
    let route = router.route("/api/1/blockchains/ETH").unwrap();
    let req = RawRequest::new(Method::PUT, "/api/1/blockchains/ETH")
        .with_json_body(&body)
        .with_path_params(route.path_params.clone());

    c.bench_function("dispatch_accounts_factory", |b| {
        b.iter(|| black_box(dispatcher.dispatch(&route.resource, black_box(&req))))
    });
}

criterion_group!(benches, bench_merge_validate, bench_dispatch);
criterion_main!(benches);
