//! Integration tests for configuration loading

use p2p_recorder::cli::open_store;
use p2p_recorder::config::{Config, StoreBackend, DEFAULT_CONFIG};
use p2p_recorder::quote::PublisherType;
use rust_decimal_macros::dec;
use std::io::Write;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_example_config_loads() {
    let config = assert_ok!(Config::parse(DEFAULT_CONFIG));

    assert_eq!(config.feed.fiat, "KES");
    assert_eq!(config.feed.asset, "USDT");
    assert_eq!(config.store.backend, StoreBackend::Http);

    let controller = config.controller_config();
    assert_eq!(controller.refresh_interval, Duration::from_secs(20));
    assert_eq!(controller.record_interval, Duration::from_secs(1800));
    assert_eq!(controller.filter.trans_amount, dec!(1000));
    assert_eq!(controller.filter.publisher_type, PublisherType::None);
    assert_eq!(
        controller.filter.pay_types,
        vec!["BANK", "MpesaKenya", "MpesaPaybill"]
    );
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [filter]
        trans_amount = 2500
        publisher_type = "merchant"

        [store]
        backend = "memory"
        "#
    )
    .unwrap();

    let config = assert_ok!(Config::load(file.path()));
    assert_eq!(config.filter.trans_amount, dec!(2500));
    assert_eq!(config.filter.publisher_type, PublisherType::Merchant);
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.schedule.record_interval_secs, 1800);
}

#[test]
fn test_invalid_config_rejected() {
    assert_err!(Config::parse("[schedule]\nrefresh_interval_secs = 0\n"));
    assert_err!(Config::parse("[filter]\ntrans_amount = -5\n"));
    assert_err!(Config::load("/nonexistent/p2p-recorder.toml"));
}

#[tokio::test]
async fn test_open_jsonl_store_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.store.backend = StoreBackend::Jsonl;
    config.store.path = dir.path().join("samples.jsonl");

    let store = assert_ok!(open_store(&config.store));
    assert!(store.list_all().await.unwrap().is_empty());
}
