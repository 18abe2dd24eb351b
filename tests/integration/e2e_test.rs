//! End-to-end integration tests

use ama_harness::config::Config;
use ama_harness::data::{FieldValue, QuoteField, QuoteRow, QuoteTable, QuoteWriter};
use ama_harness::pipeline;
use chrono::{Duration, NaiveDate};
use rusqlite::Connection;
use tempfile::TempDir;

/// Five RB bars, the third missing its close
fn rb_fixture() -> QuoteTable {
    let start = NaiveDate::from_ymd_opt(2021, 1, 4)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap();
    let closes = [Some(4100.0), Some(4105.0), None, Some(4098.0), Some(4110.0)];

    let mut table = QuoteTable::new(vec![
        QuoteField::real("open"),
        QuoteField::real("close"),
        QuoteField::real("weight"),
        QuoteField::text("exchange"),
    ]);
    for (i, close) in closes.iter().enumerate() {
        table.push(QuoteRow {
            index: i as i64,
            datetime: Some(start + Duration::hours(i as i64)),
            symbol: Some("RB".to_string()),
            values: vec![
                Some(FieldValue::Real(4100.0)),
                close.map(FieldValue::Real),
                Some(FieldValue::Real(0.2)),
                Some(FieldValue::from("SHFE")),
            ],
        });
    }
    table
}

fn config_in(dir: &TempDir) -> Config {
    let quote_path = dir.path().join("access").join("future_weight_index_60min.parquet");
    QuoteWriter::new().write(&quote_path, &rb_fixture()).unwrap();

    let mut config = Config::default();
    config.data.quote_path = quote_path;
    config.data.shared_db = dir
        .path()
        .join("FullUri=file:mydb.sqlite?cache=shared")
        .to_string_lossy()
        .into_owned();
    config.search.result_db = dir.path().join("result.sqlite");
    config.value.result_db = dir.path().join("value_result.sqlite");
    config.report.output_dir = dir.path().join("output");
    config
}

#[test]
fn test_prepare_drops_incomplete_row() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let summary = pipeline::prepare_quotes(&config).unwrap();
    assert_eq!(summary.rows_read, 5);
    assert_eq!(summary.rows_dropped, 1);
    assert_eq!(summary.rows_written, 4);

    let conn = Connection::open(&config.data.shared_db).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM quote", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 4);

    let indices: Vec<i64> = conn
        .prepare("SELECT \"index\" FROM quote")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(indices, vec![0, 1, 3, 4]);
}

#[test]
fn test_prepare_absent_symbol_writes_empty_table() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.data.symbol = "CU".to_string();

    let summary = pipeline::prepare_quotes(&config).unwrap();
    assert_eq!(summary.rows_written, 0);

    let conn = Connection::open(&config.data.shared_db).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM quote", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn test_prepare_missing_file() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    config.data.quote_path = dir.path().join("missing.parquet");
    assert!(pipeline::prepare_quotes(&config).is_err());
}

#[cfg(unix)]
mod process {
    use super::*;
    use ama_harness::engine::ProcessLauncher;
    use std::os::unix::fs::PermissionsExt;

    fn fake_engine(dir: &TempDir, args_file: &std::path::Path) -> std::path::PathBuf {
        let path = dir.path().join("ama_params");
        let body = format!(
            "#!/bin/sh\necho \"argc = $#\"\necho \"$@\" > {}\necho 'thread finish.' >&2\n",
            args_file.display()
        );
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_search_with_process_engine() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        let args_file = dir.path().join("args.txt");
        config.engine.params_bin = fake_engine(&dir, &args_file);

        // results the real engine would have left behind
        let conn = Connection::open(&config.search.result_db).unwrap();
        conn.execute_batch(
            "CREATE TABLE params (ama_short REAL, ama_long REAL, ama_num REAL, ema_num REAL, final_pnl REAL);
             INSERT INTO params VALUES (1, 30, 2, 1, 5.0), (2, 30, 9, 4, 12.0), (6, 30, 40, 20, -3.0);",
        )
        .unwrap();
        drop(conn);

        let report = pipeline::run_search(&config, &ProcessLauncher::new(), false)
            .await
            .unwrap();

        let args = std::fs::read_to_string(&args_file).unwrap();
        assert_eq!(
            args.trim(),
            format!("{} 2020-01-01 2023-05-12", config.data.shared_db)
        );

        assert_eq!(report.total, 3);
        assert!(report.top.column_index("ama_long").is_none());
        assert_eq!(
            report.top.column_values("final_pnl").unwrap(),
            vec![Some(12.0), Some(5.0), Some(-3.0)]
        );

        // quotes were committed before the engine ran
        let conn = Connection::open(&config.data.shared_db).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM quote", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 4);
    }

    #[tokio::test]
    async fn test_engine_runs_in_working_dir() {
        let dir = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.engine.working_dir = Some(work.path().to_path_buf());
        config.engine.params_bin = "./ama_params".into();
        config.data.shared_db = "FullUri=file:mydb.sqlite?cache=shared".to_string();
        config.search.result_db = "result.sqlite".into();

        // the engine checks that the quotes are where it looks for them
        let engine = work.path().join("ama_params");
        std::fs::write(&engine, "#!/bin/sh\ntest -f \"$1\" && echo found > seen.txt\n").unwrap();
        std::fs::set_permissions(&engine, std::fs::Permissions::from_mode(0o755)).unwrap();

        let conn = Connection::open(work.path().join("result.sqlite")).unwrap();
        conn.execute_batch(
            "CREATE TABLE params (ama_short REAL, ama_long REAL, final_pnl REAL);
             INSERT INTO params VALUES (1, 30, 4.0), (2, 30, 9.0);",
        )
        .unwrap();
        drop(conn);

        let launcher = ProcessLauncher::new().with_working_dir(config.engine.working_dir.clone());
        let report = pipeline::run_search(&config, &launcher, false).await.unwrap();
        assert_eq!(report.total, 2);

        let seen = std::fs::read_to_string(work.path().join("seen.txt")).unwrap();
        assert_eq!(seen.trim(), "found");
    }

    #[tokio::test]
    async fn test_missing_engine_binary() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.engine.value_bin = dir.path().join("ama_value");

        let result = pipeline::run_value(&config, &ProcessLauncher::new(), false).await;
        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("failed to run"));
    }
}
