//! Integration tests for configuration

use ama_harness::config::Config;
use ama_harness::report::OutputFormat;

#[test]
fn test_config_example_loads() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.data.symbol, "RB");
    assert_eq!(config.data.quote_table, "quote");
    assert_eq!(config.value.params, [2.0, 30.0, 11.0, 3.0]);
    assert_eq!(config.search.drop_columns, vec!["ama_long"]);
    assert_eq!(config.report.format, OutputFormat::Table);
}

#[test]
fn test_config_load_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[data]\nsymbol = \"HC\"\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.data.symbol, "HC");
    assert_eq!(config.search.top_n, 100);
}
