use super::*;
use rp_core::{QueryId, DEFAULT_WAREHOUSE_PREDICATE};

fn vars() -> HashMap<String, serde_yaml::Value> {
    let mut vars = HashMap::new();
    vars.insert(
        "lookback_days".to_string(),
        serde_yaml::Value::Number(120u64.into()),
    );
    vars
}

fn query(filter: &str, use_warehouse: bool) -> QueryDefinition {
    QueryDefinition {
        id: QueryId::parse("q").unwrap(),
        output: None,
        endpoint: "/Stock.List".to_string(),
        order_by: "item asc".to_string(),
        take: 10,
        filter: filter.to_string(),
        use_warehouse,
        warehouse_predicate: DEFAULT_WAREHOUSE_PREDICATE.to_string(),
    }
}

fn code(s: &str) -> WarehouseCode {
    WarehouseCode::parse(s).unwrap()
}

#[test]
fn test_render_substitutes_vars() {
    let renderer = FilterRenderer::new(&vars());
    let out = renderer
        .render("q", "date > current_date - {{ lookback_days }}", None)
        .unwrap();
    assert_eq!(out, "date > current_date - 120");
}

#[test]
fn test_render_unknown_var_is_error() {
    let renderer = FilterRenderer::new(&vars());
    let err = renderer.render("q", "x = {{ nope }}", None).unwrap_err();
    assert!(matches!(err, RequestError::Template { .. }));
}

#[test]
fn test_references_warehouse() {
    let renderer = FilterRenderer::new(&vars());
    assert!(renderer
        .references_warehouse("q", "code = '{{ warehouse }}'")
        .unwrap());
    assert!(!renderer
        .references_warehouse("q", "days = {{ lookback_days }}")
        .unwrap());
}

#[test]
fn test_placeholder_is_substituted_once() {
    let renderer = FilterRenderer::new(&vars());
    let q = query("qty > 0 and code ilike '{{ warehouse }}'", true);
    let out = renderer.render_filter(&q, Some(&code("1145"))).unwrap();
    assert_eq!(out, "qty > 0 and code ilike '1145'");
    assert_eq!(out.matches("1145").count(), 1);
}

#[test]
fn test_predicate_appended_without_placeholder() {
    let renderer = FilterRenderer::new(&vars());
    let q = query("qty > 0", true);
    let out = renderer.render_filter(&q, Some(&code("1290"))).unwrap();
    assert_eq!(out, "qty > 0 and ctxn_warehouse_code ilike '1290'");
    assert_eq!(out.matches("1290").count(), 1);
}

#[test]
fn test_predicate_alone_when_filter_empty() {
    let renderer = FilterRenderer::new(&vars());
    let q = query("", true);
    let out = renderer.render_filter(&q, Some(&code("1290"))).unwrap();
    assert_eq!(out, "ctxn_warehouse_code ilike '1290'");
}

#[test]
fn test_non_warehouse_query_ignores_code() {
    let renderer = FilterRenderer::new(&vars());
    let q = query("qty > 0", false);
    let with = renderer.render_filter(&q, Some(&code("1145"))).unwrap();
    let without = renderer.render_filter(&q, None).unwrap();
    assert_eq!(with, without);
    assert!(!with.contains("1145"));
}

#[test]
fn test_warehouse_query_without_code_is_error() {
    let renderer = FilterRenderer::new(&vars());
    let q = query("qty > 0", true);
    let err = renderer.render_filter(&q, None).unwrap_err();
    assert!(matches!(err, RequestError::MissingWarehouse { .. }));
}

#[test]
fn test_placeholder_on_non_warehouse_query_rejected() {
    let renderer = FilterRenderer::new(&vars());
    let q = query("code = '{{ warehouse }}'", false);
    let err = renderer.render_filter(&q, None).unwrap_err();
    assert!(matches!(
        err,
        RequestError::WarehousePlaceholderNotAllowed { .. }
    ));
}

#[test]
fn test_validate_builtin_catalog() {
    let renderer = FilterRenderer::new(&vars());
    let catalog = QueryCatalog::builtin().unwrap();
    renderer.validate_catalog(&catalog).unwrap();
}

#[test]
fn test_validate_catalog_missing_var() {
    let renderer = FilterRenderer::new(&HashMap::new());
    let catalog = QueryCatalog::builtin().unwrap();
    let err = renderer.validate_catalog(&catalog).unwrap_err();
    assert!(err.to_string().contains("Consulta_1"));
}

#[test]
fn test_validate_catalog_predicate_without_placeholder() {
    let renderer = FilterRenderer::new(&vars());
    let mut q = query("qty > 0", true);
    q.warehouse_predicate = "site = 'fixed'".to_string();
    let catalog = QueryCatalog::new(vec![q]).unwrap();
    let err = renderer.validate_catalog(&catalog).unwrap_err();
    assert!(matches!(err, RequestError::PredicateWithoutPlaceholder { .. }));
}

#[test]
fn test_validate_catalog_syntax_error() {
    let renderer = FilterRenderer::new(&vars());
    let catalog = QueryCatalog::new(vec![query("qty > {{ ", false)]).unwrap();
    assert!(renderer.validate_catalog(&catalog).is_err());
}
