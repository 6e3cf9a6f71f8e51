use super::*;
use rp_core::{QueryId, DEFAULT_WAREHOUSE_PREDICATE};

const BASE: &str = "https://erp.example.com/api";

fn vars() -> HashMap<String, serde_yaml::Value> {
    let mut vars = HashMap::new();
    vars.insert(
        "lookback_days".to_string(),
        serde_yaml::Value::Number(120u64.into()),
    );
    vars
}

fn query(id: &str, filter: &str, use_warehouse: bool) -> QueryDefinition {
    QueryDefinition {
        id: QueryId::parse(id).unwrap(),
        output: None,
        endpoint: "/System.MaterialTransactions.List.View1".to_string(),
        order_by: "ctxn_transaction_date desc".to_string(),
        take: 30000,
        filter: filter.to_string(),
        use_warehouse,
        warehouse_predicate: DEFAULT_WAREHOUSE_PREDICATE.to_string(),
    }
}

fn code(s: &str) -> WarehouseCode {
    WarehouseCode::parse(s).unwrap()
}

fn where_param(url: &str) -> String {
    let encoded = url.split("&where=").nth(1).unwrap();
    urlencoding::decode(encoded).unwrap().into_owned()
}

#[test]
fn test_empty_base_url_rejected() {
    assert!(matches!(
        UrlBuilder::new("  ", &vars()),
        Err(RequestError::MissingBaseUrl)
    ));
    assert!(matches!(
        UrlBuilder::new("/", &vars()),
        Err(RequestError::MissingBaseUrl)
    ));
}

#[test]
fn test_parameter_order_and_encoding() {
    let builder = UrlBuilder::new(BASE, &vars()).unwrap();
    let q = query("a", "ctxn_movement_type ilike '261%'", false);
    let url = builder.build(&q, None).unwrap();
    assert_eq!(
        url,
        "https://erp.example.com/api/System.MaterialTransactions.List.View1\
         ?orderby=ctxn_transaction_date%20desc&take=30000\
         &where=ctxn_movement_type%20ilike%20%27261%25%27"
    );
}

#[test]
fn test_no_raw_spaces_or_quotes() {
    let builder = UrlBuilder::new(BASE, &vars()).unwrap();
    for q in &rp_core::QueryCatalog::builtin().unwrap() {
        let url = builder.build(q, None).unwrap();
        assert!(!url.contains(' '), "raw space in {}", url);
        assert!(!url.contains('\''), "raw quote in {}", url);
        assert!(url.contains("current_date%20-%20120"));
    }
}

#[test]
fn test_empty_filter_omits_where() {
    let builder = UrlBuilder::new(BASE, &vars()).unwrap();
    let url = builder.build(&query("a", "", false), None).unwrap();
    assert!(!url.contains("where="));
    assert!(url.ends_with("&take=30000"));
}

#[test]
fn test_slash_normalisation() {
    let with_slashes = UrlBuilder::new("https://erp.example.com/api/", &vars()).unwrap();
    let without = UrlBuilder::new(BASE, &vars()).unwrap();

    let mut relative = query("a", "", false);
    relative.endpoint = "Orders.List".to_string();
    let mut absolute = query("a", "", false);
    absolute.endpoint = "/Orders.List".to_string();

    let expected = "https://erp.example.com/api/Orders.List?orderby=ctxn_transaction_date%20desc&take=30000";
    assert_eq!(with_slashes.build(&absolute, None).unwrap(), expected);
    assert_eq!(without.build(&relative, None).unwrap(), expected);
}

#[test]
fn test_warehouse_code_appears_exactly_once() {
    let builder = UrlBuilder::new(BASE, &vars()).unwrap();
    let placeholder = query("a", "qty > 0 and ctxn_warehouse_code ilike '{{ warehouse }}'", true);
    let appended = query("b", "qty > 0", true);

    for q in [&placeholder, &appended] {
        let url = builder.build(q, Some(&code("1145"))).unwrap();
        let filter = where_param(&url);
        assert_eq!(filter.matches("1145").count(), 1, "filter: {}", filter);
        assert!(filter.contains("ctxn_warehouse_code ilike '1145'"));
    }
}

#[test]
fn test_non_warehouse_query_url_independent_of_code() {
    let builder = UrlBuilder::new(BASE, &vars()).unwrap();
    let q = query("a", "qty > 0", false);
    assert_eq!(
        builder.build(&q, Some(&code("1290"))).unwrap(),
        builder.build(&q, None).unwrap()
    );
}

#[test]
fn test_build_is_deterministic() {
    let builder = UrlBuilder::new(BASE, &vars()).unwrap();
    let q = query("a", "x = 1", true);
    let first = builder.build(&q, Some(&code("7"))).unwrap();
    let second = builder.build(&q, Some(&code("7"))).unwrap();
    assert_eq!(first, second);
}
