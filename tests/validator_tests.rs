use brrtargs::loader::LoaderKind;
use brrtargs::payload::{MergedPayload, RawRequest};
use brrtargs::resources::schemas;
use brrtargs::schema::{FieldRule, FieldSpec, FieldType, SchemaDescriptor};
use brrtargs::validator::{validate, TypedValue};
use http::Method;
use serde_json::{json, Value};

fn payload(value: Value) -> MergedPayload {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_query_only_timerange_scenario() {
    let schema = schemas::ledger_actions_query().unwrap();
    let req = RawRequest::from_target(
        Method::GET,
        "/ledgeractions?from_timestamp=0&to_timestamp=100&location=binance",
    )
    .with_body("{}");
    let merged = LoaderKind::BodyAndQuery.load(&req, &schema);
    let args = validate(&merged, &schema).unwrap();
    assert_eq!(
        args.to_json(),
        json!({
            "from_timestamp": 0,
            "to_timestamp": 100,
            "location": "BINANCE",
            "async_query": false,
        })
    );
}

#[test]
fn test_empty_body_equals_query_alone() {
    let schema = schemas::ledger_actions_query().unwrap();
    let target = "/ledgeractions?from_timestamp=3&to_timestamp=9&async_query=yes";
    let with_body = RawRequest::from_target(Method::GET, target).with_body("");
    let without_body = RawRequest::from_target(Method::GET, target);
    let a = validate(&LoaderKind::BodyAndQuery.load(&with_body, &schema), &schema).unwrap();
    let b = validate(&LoaderKind::Query.load(&without_body, &schema), &schema).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.get("async_query"), Some(&TypedValue::Bool(true)));
}

#[test]
fn test_validation_is_idempotent() {
    let schema = schemas::trades_query().unwrap();
    let req = RawRequest::from_target(Method::GET, "/trades?to_timestamp=50&only_cache=TRUE")
        .with_json_body(&json!({"from_timestamp": 10, "location": "kraken"}));
    let first = validate(&LoaderKind::BodyAndQuery.load(&req, &schema), &schema).unwrap();
    let second = validate(&LoaderKind::BodyAndQuery.load(&req, &schema), &schema).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_required_field_is_named() {
    let schema = schemas::current_prices_query().unwrap();
    let err = validate(&payload(json!({"assets": ["BTC"]})), &schema).unwrap_err();
    assert_eq!(err.fields(), vec!["target_asset"]);
    assert_eq!(
        err.issue_for("target_asset").map(|i| i.message.as_str()),
        Some("Missing data for required field.")
    );
}

#[test]
fn test_list_reports_failing_element_position() {
    let schema = SchemaDescriptor::builder("Numbers")
        .field(FieldSpec::new("values", FieldType::list_of(FieldType::Integer)).required())
        .build()
        .unwrap();
    let err = validate(&payload(json!({"values": [1, 2, "three", 4]})), &schema).unwrap_err();
    assert_eq!(err.issues.len(), 1);
    assert_eq!(err.issues[0].field, "values");
    assert_eq!(err.issues[0].location, "values[2]");
    assert_eq!(err.issues[0].message, "Not a valid integer.");
}

#[test]
fn test_historical_pairs_are_validated_element_wise() {
    let schema = schemas::historical_prices_query().unwrap();
    let ok = validate(
        &payload(json!({
            "assets_timestamp": [["BTC", 1_579_543_935], ["ETH", "1579543935"]],
            "target_asset": "EUR",
        })),
        &schema,
    )
    .unwrap();
    assert_eq!(
        ok.to_json()["assets_timestamp"],
        json!([["BTC", 1_579_543_935], ["ETH", 1_579_543_935]])
    );

    let err = validate(
        &payload(json!({
            "assets_timestamp": [["BTC", 1], ["ETH", "soon"]],
            "target_asset": "EUR",
        })),
        &schema,
    )
    .unwrap_err();
    assert!(err.issues[0].location.starts_with("assets_timestamp[1]"));
}

#[test]
fn test_unknown_fields_are_rejected() {
    let schema = schemas::exchange_rates_query().unwrap();
    let err = validate(
        &payload(json!({"currencies": "EUR,USD", "currency": "EUR"})),
        &schema,
    )
    .unwrap_err();
    assert_eq!(err.fields(), vec!["currency"]);
    assert_eq!(err.issues[0].message, "Unknown field.");
}

#[test]
fn test_issues_are_collected_across_fields() {
    let schema = schemas::oracle_cache_create().unwrap();
    let err = validate(
        &payload(json!({"oracle": "nope", "from_asset": "BTC", "purge_old": "maybe"})),
        &schema,
    )
    .unwrap_err();
    let mut fields = err.fields();
    fields.sort_unstable();
    assert_eq!(fields, vec!["oracle", "purge_old", "to_asset"]);
}

#[test]
fn test_boolean_tokens_are_case_insensitive() {
    let schema = SchemaDescriptor::builder("Flags")
        .field(FieldSpec::new("flag", FieldType::Bool).required())
        .build()
        .unwrap();
    for (raw, expected) in [("TRUE", true), ("Yes", true), ("on", true), ("0", false), ("False", false)] {
        let args = validate(&payload(json!({ "flag": raw })), &schema).unwrap();
        assert_eq!(args.get("flag"), Some(&TypedValue::Bool(expected)), "{raw}");
    }
    assert!(validate(&payload(json!({"flag": "perhaps"})), &schema).is_err());
}

#[test]
fn test_range_rule_and_null_handling() {
    let schema = schemas::async_tasks_query().unwrap();
    assert_eq!(
        validate(&payload(json!({"task_id": null})), &schema)
            .unwrap()
            .get("task_id"),
        Some(&TypedValue::Null)
    );
    assert_eq!(
        validate(&payload(json!({"task_id": "7"})), &schema)
            .unwrap()
            .get("task_id"),
        Some(&TypedValue::Int(7))
    );
    let err = validate(&payload(json!({"task_id": -1})), &schema).unwrap_err();
    assert_eq!(err.fields(), vec!["task_id"]);
}

#[test]
fn test_non_empty_rule_on_lists() {
    let schema = SchemaDescriptor::builder("Assets")
        .field(
            FieldSpec::new("assets", FieldType::list_of(FieldType::Asset))
                .required()
                .rule(FieldRule::NonEmpty),
        )
        .build()
        .unwrap();
    let err = validate(&payload(json!({"assets": []})), &schema).unwrap_err();
    assert_eq!(err.issues[0].message, "List should not be empty.");
}

#[test]
fn test_error_body_lists_every_issue() {
    let schema = schemas::current_prices_query().unwrap();
    let err = validate(&payload(json!({"bogus": 1})), &schema).unwrap_err();
    let body = err.to_json();
    assert_eq!(body["error"], "Request validation failed");
    assert_eq!(body["details"].as_array().map(Vec::len), Some(3));
}
