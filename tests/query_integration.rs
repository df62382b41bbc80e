//! Integration tests for quick filters and advanced search.
//!
//! These tests compile filters from a catalog loaded the way an application loads it
//! and check the final `where` object a list query would receive.

use pretty_assertions::assert_eq;
use serde_json::json;
use tabula::query::{
    AdvancedSearchComposer, Filter, FilterCompiler, FilterOptions, FilterValue, GlobalLogic,
    QueryParams, WhereInput, apply_advanced_search, compile_filters,
};
use tabula::schema::{EntitySchema, SchemaCatalog, TabulaConfig};

const CATALOG: &str = r#"
[[entities.orders.fields]]
key = "status"
kind = "select"

[[entities.orders.fields]]
key = "name"
kind = "text"

[[entities.orders.fields]]
key = "customer_id"
kind = "relation"
relation = { target_entity = "customers", display_field = "name" }

[[entities.orders.fields]]
key = "destination_location"
kind = "location"

[[entities.orders.fields]]
key = "completion"
kind = "number"

[[entities.orders.fields]]
key = "ordered_at"
kind = "date"

[[entities.orders.fields]]
key = "confirmed_at"
kind = "date"

[[entities.orders.fields]]
key = "shipped_at"
kind = "date"

[[entities.orders.fields]]
key = "delivered_at"
kind = "date"

[[entities.orders.filters]]
field = "status"
kind = "select"

[[entities.orders.filters]]
field = "customer_id"
kind = "select"

[[entities.orders.filters]]
field = "destination_location"
kind = "select"

[[entities.orders.filters]]
field = "completion"
kind = "select"

[[entities.orders.filters]]
field = "placed"
kind = "dateRange"
relatedFieldKeys = ["ordered_at", "confirmed_at"]

[[entities.orders.filters]]
field = "moved"
kind = "dateRange"
relatedFieldKeys = ["shipped_at", "delivered_at"]

[[entities.orders.search]]
field = "name"
kind = "text"

[[entities.orders.search]]
field = "customer_id"
kind = "select"

[[entities.customers.fields]]
key = "name"
kind = "text"
"#;

fn catalog() -> SchemaCatalog {
    SchemaCatalog::from_toml_str(CATALOG).expect("catalog should parse")
}

fn orders(catalog: &SchemaCatalog) -> &EntitySchema {
    catalog.get_entity("orders").expect("orders entity")
}

fn build_where(query: &str) -> WhereInput {
    let catalog = catalog();
    let params = QueryParams::from_query_string(query);
    let mut where_input = WhereInput::new();
    FilterCompiler::new(orders(&catalog)).apply(&mut where_input, &params);
    apply_advanced_search(&mut where_input, &catalog, "orders", &params).unwrap();
    where_input
}

#[test]
fn test_single_select_is_merged_without_and_wrapper() {
    let where_input = build_where("filter_status=active");
    assert_eq!(where_input.to_json(), json!({ "status": "active" }));
}

#[test]
fn test_related_date_fields_or_within_and_across() {
    let where_input = build_where(
        "filter_placed_from=2024-01-01&filter_moved_to=2024-01-31",
    );
    assert_eq!(
        where_input.to_json(),
        json!({ "AND": [
            { "OR": [
                { "ordered_at": { "gte": "2024-01-01T00:00:00.000" } },
                { "confirmed_at": { "gte": "2024-01-01T00:00:00.000" } },
            ] },
            { "OR": [
                { "shipped_at": { "lte": "2024-01-31T23:59:59.999" } },
                { "delivered_at": { "lte": "2024-01-31T23:59:59.999" } },
            ] },
        ] })
    );
}

#[test]
fn test_incomplete_sentinel_keeps_null_rows() {
    let where_input = build_where("filter_completion=incomplete");
    assert_eq!(
        where_input.to_json(),
        json!({ "OR": [{ "completion": { "not": 1 } }, { "completion": null }] })
    );

    let (sql, params) = where_input.into_filter().to_sql(0);
    assert_eq!(sql, "(completion != $1 OR completion IS NULL)");
    assert_eq!(params, vec![FilterValue::Int(1)]);
}

#[test]
fn test_quick_filter_plus_advanced_or() {
    let where_input = build_where("filter_status=active&advanced_name=Acme&advanced_logic=OR");
    assert_eq!(
        where_input.to_json(),
        json!({ "OR": [
            { "status": "active" },
            { "name": { "contains": "Acme", "mode": "insensitive" } },
        ] })
    );
}

#[test]
fn test_quick_filter_plus_advanced_and() {
    let where_input = build_where("filter_status=active&advanced_name=Acme");
    assert_eq!(
        where_input.to_json(),
        json!({
            "status": "active",
            "name": { "contains": "Acme", "mode": "insensitive" },
        })
    );
}

#[test]
fn test_malformed_relation_parameter_drops_only_that_filter() {
    let catalog = catalog();
    let params = QueryParams::from_query_string("filter_customer_id=abc&filter_status=active");
    let fragments = compile_filters(orders(&catalog), &params);
    assert_eq!(fragments, vec![Filter::equals("status", "active")]);
}

#[test]
fn test_location_override_in_filters() {
    let where_input = build_where("filter_destination_location=12");
    assert_eq!(where_input.to_json(), json!({ "location_id": 12 }));
}

#[test]
fn test_relation_search_with_registered_target() {
    let where_input = build_where("advanced_customer_id=5");
    assert_eq!(where_input.to_json(), json!({ "customer_id": 5 }));
}

#[test]
fn test_search_without_catalog_check() {
    let catalog = catalog();
    let params = QueryParams::from([("advanced_customer_id", "5"), ("advanced_name", "x")]);
    let filter = AdvancedSearchComposer::new(orders(&catalog))
        .compile(&params, GlobalLogic::Or)
        .unwrap();
    assert!(matches!(filter, Filter::Or(ref members) if members.len() == 2));
}

#[test]
fn test_configured_parameter_names() {
    let config = TabulaConfig::from_str(
        r#"
        [filters]
        filter_prefix = "f."
        advanced_prefix = "q."
        logic_param = "q.logic"
        "#,
    )
    .unwrap();
    let options = FilterOptions::from_config(&config);
    let catalog = catalog();
    let params = QueryParams::from([("f.status", "active"), ("q.name", "Acme"), ("q.logic", "or")]);

    let mut where_input = WhereInput::new();
    FilterCompiler::with_options(orders(&catalog), options.clone())
        .apply(&mut where_input, &params);
    AdvancedSearchComposer::with_options(orders(&catalog), options)
        .with_catalog(&catalog)
        .apply(&mut where_input, &params);

    assert_eq!(where_input.or.len(), 2);
}

#[test]
fn test_unknown_entity_is_an_error() {
    let catalog = catalog();
    let mut where_input = WhereInput::new();
    let result = apply_advanced_search(&mut where_input, &catalog, "invoices", &QueryParams::new());
    assert!(result.is_err());
    assert!(where_input.is_empty());
}
