use super::*;
use rp_core::{FetchConfig, OutputFormat, PairingStatus, QueryId, DEFAULT_WAREHOUSE_PREDICATE};
use rp_http::{HttpResponse, HttpResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

const BASE: &str = "https://erp.example.com/api";

/// Answers every request with one row, except URLs matching configured
/// fragments, which get a fixed error status or an empty body.
struct FakeApi {
    failing: Vec<(Vec<String>, u16)>,
    empty: Vec<String>,
    calls: RefCell<Vec<String>>,
}

impl FakeApi {
    fn new() -> Self {
        Self {
            failing: Vec::new(),
            empty: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn failing(mut self, fragments: &[&str], status: u16) -> Self {
        let fragments = fragments.iter().map(|f| f.to_string()).collect();
        self.failing.push((fragments, status));
        self
    }

    fn empty(mut self, fragment: &str) -> Self {
        self.empty.push(fragment.to_string());
        self
    }

    fn calls_matching(&self, fragment: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }
}

impl Transport for FakeApi {
    fn get(&self, url: &str, _headers: &[(&str, &str)]) -> HttpResult<HttpResponse> {
        self.calls.borrow_mut().push(url.to_string());
        if let Some((_, status)) = self
            .failing
            .iter()
            .find(|(fragments, _)| fragments.iter().all(|f| url.contains(f.as_str())))
        {
            return Ok(HttpResponse::new(*status, "upstream error"));
        }
        if self.empty.iter().any(|f| url.contains(f.as_str())) {
            return Ok(HttpResponse::new(200, "[]"));
        }
        Ok(HttpResponse::new(200, r#"[{"item": "X1", "qty": 3}]"#))
    }

    fn transport_type(&self) -> &'static str {
        "fake"
    }
}

fn query(id: &str, endpoint: &str, use_warehouse: bool) -> QueryDefinition {
    QueryDefinition {
        id: QueryId::parse(id).unwrap(),
        output: None,
        endpoint: endpoint.to_string(),
        order_by: "item asc".to_string(),
        take: 100,
        filter: "qty > 0".to_string(),
        use_warehouse,
        warehouse_predicate: DEFAULT_WAREHOUSE_PREDICATE.to_string(),
    }
}

fn run_config(output_dir: &Path, warehouses: &[&str]) -> RunConfig {
    RunConfig {
        base_url: BASE.to_string(),
        token: Some("secret".to_string()),
        warehouses: warehouses
            .iter()
            .map(|w| WarehouseCode::parse(*w).unwrap())
            .collect(),
        output_dir: output_dir.to_path_buf(),
        format: OutputFormat::Json,
        fetch: FetchConfig {
            max_retries: 2,
            retry_delay_secs: 0,
            query_delay_secs: 30,
            ..FetchConfig::default()
        },
        vars: HashMap::new(),
    }
}

struct Harness {
    outcome: RunOutcome,
    pauses: Vec<Duration>,
    progress: Vec<String>,
}

fn run(config: &RunConfig, api: &FakeApi, queries: &[&QueryDefinition]) -> Result<Harness> {
    let urls = UrlBuilder::from_config(config).unwrap();
    let fetcher = Fetcher::new(api, "secret", &config.fetch);
    let persister = Persister::new(&config.output_dir, config.format);
    let ctx = RunContext {
        config,
        urls: &urls,
        fetcher: &fetcher,
        persister: &persister,
    };

    let mut pauses = Vec::new();
    let mut progress = Vec::new();
    let outcome = run_pairings(
        &ctx,
        queries,
        &mut |d: Duration| pauses.push(d),
        &mut |p: &PairingOutcome| progress.push(format!("{} {}", p.label(), p.status)),
    )?;
    Ok(Harness {
        outcome,
        pauses,
        progress,
    })
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_one_permanent_failure_in_two_by_two() {
    let tmp = tempfile::tempdir().unwrap();
    let config = run_config(tmp.path(), &["1145", "1290"]);
    let stock = query("stock", "/Stock.List", true);
    let moves = query("moves", "/Moves.List", true);
    // moves@1290 fails on every attempt
    let api = FakeApi::new().failing(&["/Moves.List?", "%271290%27"], 503);

    let harness = run(&config, &api, &[&stock, &moves]).unwrap();
    let outcome = harness.outcome;

    assert_eq!(outcome.pairings.len(), 4);
    assert_eq!(outcome.success_count(), 3);
    assert_eq!(outcome.failure_count(), 1);
    assert!(outcome.has_errors());
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(
        files_in(tmp.path()),
        vec![
            "moves_1145.json",
            "stock_1145.json",
            "stock_1290.json"
        ]
    );

    let failed = &outcome.pairings[3];
    assert_eq!(failed.label(), "moves@1290");
    assert_eq!(failed.status, PairingStatus::Error);
    assert!(failed.error.as_deref().unwrap().contains("3 attempt(s)"));
    assert_eq!(api.calls_matching("/Moves.List?"), 1 + 3);
    assert_eq!(api.calls_matching("/Stock.List?"), 2);
}

#[test]
fn test_inter_query_delay_only_between_queries() {
    let tmp = tempfile::tempdir().unwrap();
    let config = run_config(tmp.path(), &["1145", "1290"]);
    let a = query("a", "/A", true);
    let b = query("b", "/B", false);
    let c = query("c", "/C", true);
    let api = FakeApi::new();

    let harness = run(&config, &api, &[&a, &b, &c]).unwrap();

    assert_eq!(harness.pauses, vec![Duration::from_secs(30); 2]);
    assert_eq!(harness.outcome.pairings.len(), 5);
}

#[test]
fn test_no_delay_makes_no_pauses() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = run_config(tmp.path(), &[]);
    config.fetch.query_delay_secs = 0;
    let a = query("a", "/A", false);
    let b = query("b", "/B", false);

    let harness = run(&config, &FakeApi::new(), &[&a, &b]).unwrap();

    assert!(harness.pauses.is_empty());
}

#[test]
fn test_empty_warehouse_list_skips_without_error() {
    let tmp = tempfile::tempdir().unwrap();
    let config = run_config(tmp.path(), &[]);
    let stock = query("stock", "/Stock.List", true);
    let orders = query("orders", "/Orders.List", false);
    let api = FakeApi::new();

    let harness = run(&config, &api, &[&stock, &orders]).unwrap();
    let outcome = harness.outcome;

    assert_eq!(outcome.pairings[0].status, PairingStatus::Skipped);
    assert_eq!(outcome.pairings[1].status, PairingStatus::Success);
    assert!(!outcome.has_errors());
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(api.calls_matching("Stock.List"), 0);
    assert_eq!(files_in(tmp.path()), vec!["orders.json"]);
    assert_eq!(harness.progress, vec!["stock skipped", "orders success"]);
}

#[test]
fn test_empty_result_is_failure_without_file() {
    let tmp = tempfile::tempdir().unwrap();
    let config = run_config(tmp.path(), &[]);
    let a = query("a", "/A", false);
    let b = query("b", "/B", false);
    let api = FakeApi::new().empty("/B?");

    let outcome = run(&config, &api, &[&a, &b]).unwrap().outcome;

    assert_eq!(outcome.pairings[1].status, PairingStatus::Empty);
    assert!(outcome.has_errors());
    assert_eq!(api.calls_matching("/B?"), 1);
    assert_eq!(files_in(tmp.path()), vec!["a.json"]);
}

#[test]
fn test_written_records_are_annotated() {
    let tmp = tempfile::tempdir().unwrap();
    let config = run_config(tmp.path(), &["1145"]);
    let stock = query("stock", "/Stock.List", true);
    let mut fixed = query("orders", "/Orders.List", false);
    fixed.output = Some("Orders_Report.json".to_string());

    let outcome = run(&config, &FakeApi::new(), &[&stock, &fixed])
        .unwrap()
        .outcome;
    assert!(!outcome.has_errors());

    let stock_rows: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(tmp.path().join("stock_1145.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(stock_rows[0]["_query_id"], "stock");
    assert_eq!(stock_rows[0]["_warehouse"], "1145");
    assert!(stock_rows[0]["_load_timestamp"].is_string());

    let order_rows: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(tmp.path().join("Orders_Report.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(order_rows[0]["_query_id"], "orders");
    assert!(order_rows[0].get("_warehouse").is_none());
}

#[test]
fn test_bad_template_aborts_run() {
    let tmp = tempfile::tempdir().unwrap();
    let config = run_config(tmp.path(), &[]);
    let mut broken = query("broken", "/A", false);
    broken.filter = "x = {{ undefined_var }}".to_string();
    let api = FakeApi::new();

    let err = run(&config, &api, &[&broken]).err().unwrap();

    assert!(err.to_string().contains("broken"));
    assert_eq!(api.calls.borrow().len(), 0);
}

#[test]
fn test_no_pause_after_skipped_query() {
    let tmp = tempfile::tempdir().unwrap();
    let config = run_config(tmp.path(), &[]);
    let stock = query("stock", "/Stock.List", true);
    let orders = query("orders", "/Orders.List", false);
    let lines = query("lines", "/Lines.List", false);

    let harness = run(&config, &FakeApi::new(), &[&stock, &orders, &lines]).unwrap();

    assert_eq!(harness.pauses, vec![Duration::from_secs(30)]);
    assert_eq!(harness.outcome.pairings[0].status, PairingStatus::Skipped);
}

#[test]
fn test_colliding_output_names_abort_before_fetch() {
    let tmp = tempfile::tempdir().unwrap();
    let config = run_config(tmp.path(), &["B"]);
    let a = query("A", "/A", true);
    let a_b = query("A_B", "/AB", false);
    let api = FakeApi::new();

    let err = run(&config, &api, &[&a, &a_b]).err().unwrap();

    assert!(matches!(
        err.downcast_ref::<rp_core::CoreError>(),
        Some(rp_core::CoreError::DuplicateOutput { .. })
    ));
    assert_eq!(api.calls.borrow().len(), 0);
    assert!(files_in(tmp.path()).is_empty());
}

#[test]
fn test_persist_failure_is_recorded_and_run_continues() {
    let tmp = tempfile::tempdir().unwrap();
    let blocked = tmp.path().join("not_a_dir");
    std::fs::write(&blocked, "occupied").unwrap();
    let config = run_config(&blocked, &["1145"]);
    let stock = query("stock", "/Stock.List", true);
    let orders = query("orders", "/Orders.List", false);
    let api = FakeApi::new();

    let outcome = run(&config, &api, &[&stock, &orders]).unwrap().outcome;

    let statuses: Vec<PairingStatus> = outcome.pairings.iter().map(|p| p.status).collect();
    assert_eq!(statuses, vec![PairingStatus::Error, PairingStatus::Error]);
    assert!(outcome.pairings.iter().all(|p| p.error.is_some()));
    assert_eq!(api.calls_matching("/Orders.List?"), 1);
    assert!(outcome.has_errors());
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(
        std::fs::read_to_string(&blocked).unwrap(),
        "occupied"
    );
}
