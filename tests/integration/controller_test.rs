//! End-to-end tests for the sampling controller

use async_trait::async_trait;
use p2p_recorder::cache::{Provenance, Reconciler, ShadowSlot};
use p2p_recorder::controller::{ArmOutcome, ControllerConfig, SamplingController, TickOutcome};
use p2p_recorder::quote::{FetchError, Quote, QuoteFilter, QuoteSource, TradeType};
use p2p_recorder::store::{JsonlStore, MemoryStore, RecordStore};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

/// Fixed books for both sides
struct FixedSource {
    buy: Vec<Quote>,
    sell: Vec<Quote>,
}

impl FixedSource {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            buy: vec![quote(dec!(130.50), "alpha"), quote(dec!(130.10), "beta")],
            sell: vec![quote(dec!(128.25), "gamma")],
        })
    }
}

#[async_trait]
impl QuoteSource for FixedSource {
    async fn fetch(
        &self,
        trade_type: TradeType,
        _filter: &QuoteFilter,
    ) -> Result<Vec<Quote>, FetchError> {
        Ok(match trade_type {
            TradeType::Buy => self.buy.clone(),
            TradeType::Sell => self.sell.clone(),
        })
    }
}

fn quote(price: Decimal, advertiser: &str) -> Quote {
    Quote {
        price,
        asset: "USDT".to_string(),
        advertiser: advertiser.to_string(),
    }
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_recording_session_over_time() {
    let store = Arc::new(MemoryStore::new());
    let controller = SamplingController::new(
        ControllerConfig::default(),
        FixedSource::new(),
        store.clone(),
        ShadowSlot::disabled(),
    );

    controller.start().await;
    settle().await;
    assert_eq!(controller.buy_quotes().await.len(), 2);

    assert_eq!(controller.start_recording().await, ArmOutcome::Armed);
    settle().await;
    assert_eq!(store.len().await, 1);

    // Two more record periods
    tokio::time::advance(Duration::from_secs(1800)).await;
    settle().await;
    tokio::time::advance(Duration::from_secs(1800)).await;
    settle().await;

    let samples = store.list_all().await.unwrap();
    assert_eq!(samples.len(), 3);
    assert!(samples
        .iter()
        .all(|s| s.buy == dec!(130.50) && s.sell == dec!(128.25) && s.advertiser == "alpha"));
    assert_eq!(controller.samples().await.len(), 3);
    assert_eq!(controller.status().await.recorded, 3);

    // Reset stops recording and clears only the local view
    assert!(controller.reset().await);
    assert!(!controller.is_armed().await);
    assert!(controller.samples().await.is_empty());

    // The store keeps everything and the next refresh relists it
    tokio::time::advance(Duration::from_secs(3600)).await;
    settle().await;
    assert_eq!(store.len().await, 3);
    assert_eq!(controller.samples().await.len(), 3);
    assert!(controller.status().await.provenance.is_confirmed());

    assert_eq!(controller.purge_all().await.unwrap(), 3);
    assert!(store.is_empty().await);
    assert!(controller.samples().await.is_empty());

    controller.shutdown();
}

#[tokio::test]
async fn test_file_store_and_shadow_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("samples.jsonl");
    let shadow_path = dir.path().join("recorded_prices.json");

    let first = SamplingController::new(
        ControllerConfig::default(),
        FixedSource::new(),
        Arc::new(JsonlStore::new(&store_path)),
        ShadowSlot::new(&shadow_path),
    );
    assert!(first.refresh_once().await);
    assert!(matches!(first.record_tick().await, TickOutcome::Recorded(_)));
    assert!(matches!(first.record_tick().await, TickOutcome::Recorded(_)));
    assert_eq!(first.samples().await.len(), 2);
    first.shutdown();
    drop(first);

    assert!(tokio::fs::try_exists(&shadow_path).await.unwrap());

    // A new process restores the last view before the store answers
    let store: Arc<dyn RecordStore> = Arc::new(JsonlStore::new(&store_path));
    let reconciler = Reconciler::new(store, ShadowSlot::new(&shadow_path));
    assert!(reconciler.restore().await);
    let restored = reconciler.snapshot().await;
    assert_eq!(restored.len(), 2);
    assert_eq!(restored.provenance(), Provenance::Restored);

    assert_eq!(reconciler.list().await.unwrap().len(), 2);
    assert!(reconciler.snapshot().await.provenance().is_confirmed());

    // Starting a controller over the same files restores the same view
    let second = SamplingController::new(
        ControllerConfig::default(),
        FixedSource::new(),
        Arc::new(JsonlStore::new(&store_path)),
        ShadowSlot::new(&shadow_path),
    );
    second.start().await;
    assert_eq!(second.samples().await.len(), 2);
    second.shutdown();
}

#[tokio::test]
async fn test_record_tick_skips_without_listings() {
    let store = Arc::new(MemoryStore::new());
    let controller = SamplingController::new(
        ControllerConfig::default(),
        Arc::new(FixedSource {
            buy: vec![quote(dec!(130), "alpha")],
            sell: vec![],
        }),
        store.clone(),
        ShadowSlot::disabled(),
    );

    assert!(controller.refresh_once().await);
    assert_eq!(controller.record_tick().await, TickOutcome::Skipped);
    assert!(store.is_empty().await);
}
