//! End-to-end CLI tests
//!
//! Each test lays out a config, catalog snapshot and inputs in a temporary
//! directory and drives the commands through `run_command`.

use std::fs;
use std::path::PathBuf;

use serde_json::json;
use tempfile::{tempdir, TempDir};
use uuid::Uuid;

use idxadvisor::advisory::{AdvisoryRecord, AdvisorySink, JsonLinesSink};
use idxadvisor::cli::{run_command, Command};
use idxadvisor::scanner::{Expr, QueryTree};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self { dir: tempdir().unwrap() };
        let catalog = json!({
            "tables": [{
                "id": 100,
                "name": "orders",
                "row_count": 10000,
                "columns": [
                    { "id": 1, "name": "customer_id", "type_id": 23 },
                    { "id": 2, "name": "created_at", "type_id": 1114 },
                    { "id": 3, "name": "status", "type_id": 25 }
                ],
                "indexes": [{ "columns": [1] }]
            }]
        });
        fs::write(ws.path("catalog.json"), catalog.to_string()).unwrap();

        let config = json!({
            "catalog_path": ws.path("catalog.json"),
            "records_path": ws.path("advice.jsonl"),
            "log_level": "error"
        });
        fs::write(ws.config(), config.to_string()).unwrap();
        ws
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn config(&self) -> PathBuf {
        self.path("idxadvisor.json")
    }

    fn write_records(&self, rows: &[(Vec<i16>, u64, f64)]) {
        let session = Uuid::new_v4();
        let mut sink = JsonLinesSink::open(self.path("advice.jsonl")).unwrap();
        for (columns, size_kb, benefit) in rows {
            sink.record(&AdvisoryRecord::new(session, 100, columns.clone(), *size_kb, *benefit))
                .unwrap();
        }
    }

    fn recommend(&self, budget: Option<&str>, exact: bool) -> Result<String, String> {
        let output = self.path("indexes.sql");
        run_command(Command::Recommend {
            config: self.config(),
            budget: budget.map(str::to_string),
            output: Some(output.clone()),
            exact,
        })
        .map_err(|e| e.code_str().to_string())?;
        Ok(fs::read_to_string(output).unwrap())
    }
}

fn knapsack_rows() -> Vec<(Vec<i16>, u64, f64)> {
    vec![
        (vec![1], 1, 60.0),
        (vec![2], 2, 100.0),
        (vec![3], 3, 120.0),
    ]
}

// =============================================================================
// RECOMMEND
// =============================================================================

/// Test: Greedy selection writes statements in ranking order.
#[test]
fn test_recommend_greedy() {
    let ws = Workspace::new();
    ws.write_records(&knapsack_rows());

    let sql = ws.recommend(Some("5"), false).unwrap();
    assert_eq!(
        sql,
        "CREATE INDEX idx_orders_1 ON orders (customer_id);\n\
         CREATE INDEX idx_orders_2 ON orders (created_at);\n"
    );
}

/// Test: --exact finds the better combination.
#[test]
fn test_recommend_exact() {
    let ws = Workspace::new();
    ws.write_records(&knapsack_rows());

    let sql = ws.recommend(Some("5"), true).unwrap();
    assert_eq!(
        sql,
        "CREATE INDEX idx_orders_1 ON orders (created_at);\n\
         CREATE INDEX idx_orders_2 ON orders (status);\n"
    );
}

/// Test: Without a budget every recommendation is emitted.
#[test]
fn test_recommend_without_budget() {
    let ws = Workspace::new();
    ws.write_records(&knapsack_rows());

    let sql = ws.recommend(None, false).unwrap();
    assert_eq!(sql.lines().count(), 3);
}

/// Test: Composite columns keep their key order.
#[test]
fn test_recommend_composite() {
    let ws = Workspace::new();
    ws.write_records(&[(vec![3, 2], 16, 40.0), (vec![3, 2], 24, 10.0)]);

    let sql = ws.recommend(Some("1M"), false).unwrap();
    assert_eq!(sql, "CREATE INDEX idx_orders_1 ON orders (status, created_at);\n");
}

/// Test: A bad budget is rejected before any output is written.
#[test]
fn test_recommend_bad_budget() {
    let ws = Workspace::new();
    ws.write_records(&knapsack_rows());

    assert_eq!(ws.recommend(Some("0"), false).unwrap_err(), "ADV_BUDGET_INVALID");
    assert_eq!(ws.recommend(Some("lots"), true).unwrap_err(), "ADV_BUDGET_INVALID");
    assert!(!ws.path("indexes.sql").exists());
}

/// Test: A corrupt records file fails the command.
#[test]
fn test_recommend_malformed_records() {
    let ws = Workspace::new();
    fs::write(ws.path("advice.jsonl"), "{\"relation\": 100\n").unwrap();

    assert_eq!(ws.recommend(None, false).unwrap_err(), "ADV_CLI_IO_ERROR");
    assert!(!ws.path("indexes.sql").exists());
}

/// Test: A missing catalog is a configuration error.
#[test]
fn test_recommend_missing_catalog() {
    let ws = Workspace::new();
    ws.write_records(&knapsack_rows());
    fs::remove_file(ws.path("catalog.json")).unwrap();

    assert_eq!(ws.recommend(None, false).unwrap_err(), "ADV_CLI_CONFIG_ERROR");
}

// =============================================================================
// SCAN
// =============================================================================

/// Test: Scan accepts a workload array and a workload with one query per line.
#[test]
fn test_scan_workloads() {
    let ws = Workspace::new();
    let query = QueryTree::new().with_relation(100).with_filter(Expr::and(vec![
        Expr::eq(Expr::col(0, 1), Expr::param(1)),
        Expr::eq(Expr::col(0, 2), Expr::param(2)),
    ]));

    let array = ws.path("workload.json");
    fs::write(&array, serde_json::to_string(&vec![query.clone(), QueryTree::new()]).unwrap()).unwrap();
    run_command(Command::Scan {
        config: ws.config(),
        workload: array,
    })
    .unwrap();

    let lines = ws.path("workload.jsonl");
    let body = format!("{}\n\n{}\n", serde_json::to_string(&query).unwrap(), "{}");
    fs::write(&lines, body).unwrap();
    run_command(Command::Scan {
        config: ws.config(),
        workload: lines,
    })
    .unwrap();
}

/// Test: A workload that is not JSON is reported as such.
#[test]
fn test_scan_bad_workload() {
    let ws = Workspace::new();
    let path = ws.path("workload.json");
    fs::write(&path, "SELECT 1").unwrap();

    let err = run_command(Command::Scan {
        config: ws.config(),
        workload: path,
    })
    .unwrap_err();
    assert_eq!(err.code_str(), "ADV_CLI_WORKLOAD_ERROR");
}
