//! Sampling controller implementation

use super::{ArmOutcome, ControllerConfig, ControllerState, ControllerStatus, TickOutcome};
use crate::cache::{Reconciler, ShadowSlot};
use crate::quote::{
    FilterError, LiveQuotes, PublisherType, Quote, QuoteFetcher, QuoteFilter, QuoteSource,
};
use crate::scheduler::{Job, Scheduler, TaskName};
use crate::store::{RecordStore, Sample, StoreError};
use crate::telemetry::names;
use futures_util::FutureExt;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Everything the periodic tasks need; shared with them by `Arc`
struct Shared {
    config: ControllerConfig,
    state: RwLock<ControllerState>,
    fetcher: QuoteFetcher,
    reconciler: Reconciler,
}

impl Shared {
    async fn refresh_once(&self) -> bool {
        let filter = self.state.read().await.filter.clone();
        let outcome = self.fetcher.refresh(&filter).await;
        let complete = outcome.is_complete();

        self.state.write().await.quotes.apply(outcome);

        if let Err(e) = self.reconciler.list().await {
            tracing::warn!(error = %e, "Failed to refresh recorded samples, keeping cached view");
        }

        complete
    }

    async fn record_tick(&self) -> TickOutcome {
        let sample = {
            let state = self.state.read().await;
            state
                .quotes
                .best_pair()
                .map(|(buy, sell)| Sample::now(buy.price, sell.price, buy.advertiser.clone()))
        };

        let Some(sample) = sample else {
            tracing::debug!("No listings on one side, skipping recording tick");
            metrics::counter!(names::RECORD_TICKS_SKIPPED_TOTAL).increment(1);
            return TickOutcome::Skipped;
        };

        let stored = match self.reconciler.store().insert(sample).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(error = %e, "Failed to record sample");
                metrics::counter!(names::STORE_ERRORS_TOTAL, "op" => "insert").increment(1);
                return TickOutcome::Failed;
            }
        };

        self.state.write().await.session.recorded += 1;
        metrics::counter!(names::SAMPLES_RECORDED_TOTAL).increment(1);
        tracing::info!(
            time = %stored.time,
            buy = %stored.buy,
            sell = %stored.sell,
            advertiser = %stored.advertiser,
            "Recorded sample"
        );

        if let Err(e) = self.reconciler.list().await {
            tracing::warn!(error = %e, "Failed to refresh recorded samples after insert");
        }

        TickOutcome::Recorded(stored)
    }
}

/// Owns the live quote state, the view cache and both periodic tasks
pub struct SamplingController {
    shared: Arc<Shared>,
    scheduler: Scheduler,
}

impl SamplingController {
    pub fn new(
        config: ControllerConfig,
        source: Arc<dyn QuoteSource>,
        store: Arc<dyn RecordStore>,
        shadow: ShadowSlot,
    ) -> Self {
        let state = ControllerState::new(config.filter.clone());
        Self {
            shared: Arc::new(Shared {
                config,
                state: RwLock::new(state),
                fetcher: QuoteFetcher::new(source),
                reconciler: Reconciler::new(store, shadow),
            }),
            scheduler: Scheduler::new(),
        }
    }

    fn refresh_job(&self) -> Job {
        let shared = Arc::clone(&self.shared);
        Arc::new(move || {
            let shared = Arc::clone(&shared);
            async move {
                shared.refresh_once().await;
            }
            .boxed()
        })
    }

    fn record_job(&self) -> Job {
        let shared = Arc::clone(&self.shared);
        Arc::new(move || {
            let shared = Arc::clone(&shared);
            async move {
                shared.record_tick().await;
            }
            .boxed()
        })
    }

    /// Restore the cached view, refresh once, then keep refreshing quotes.
    ///
    /// The first refresh completes before this returns, so recording armed
    /// right after `start` sees live quotes on its first tick.
    pub async fn start(&self) {
        self.shared.reconciler.restore().await;
        self.shared.refresh_once().await;
        self.scheduler.register_deferred(
            TaskName::Refresh,
            self.shared.config.refresh_interval,
            self.refresh_job(),
        );
        tracing::info!(
            period_secs = self.shared.config.refresh_interval.as_secs(),
            "Quote refresh started"
        );
    }

    /// Run one refresh now. Returns true if both sides refreshed.
    pub async fn refresh_once(&self) -> bool {
        self.shared.refresh_once().await
    }

    /// Run one recording tick now, independent of the armed state
    pub async fn record_tick(&self) -> TickOutcome {
        self.shared.record_tick().await
    }

    /// Arm recording: one tick now, then one per record period.
    ///
    /// Arming while already armed is ignored so only one recording task
    /// can ever exist.
    pub async fn start_recording(&self) -> ArmOutcome {
        let mut state = self.shared.state.write().await;
        if state.session.armed {
            tracing::warn!("Recording already armed, ignoring start request");
            return ArmOutcome::AlreadyArmed;
        }
        state.session.arm();
        drop(state);

        self.scheduler.register(
            TaskName::Record,
            self.shared.config.record_interval,
            self.record_job(),
        );
        tracing::info!(
            period_secs = self.shared.config.record_interval.as_secs(),
            "Recording armed"
        );
        ArmOutcome::Armed
    }

    /// Disarm recording and clear the local view. The store keeps its samples.
    ///
    /// Returns whether recording was armed.
    pub async fn reset(&self) -> bool {
        let was_armed = self.shared.state.write().await.session.disarm();
        self.scheduler.cancel(TaskName::Record);
        self.shared.reconciler.clear_local().await;
        tracing::info!(was_armed, "Recording reset");
        was_armed
    }

    /// Delete every stored sample, then clear the local view
    pub async fn purge_all(&self) -> Result<u64, StoreError> {
        self.shared.reconciler.purge_all().await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to delete recorded samples");
        })
    }

    /// Resync the view cache with the store
    pub async fn list(&self) -> Result<Vec<Sample>, StoreError> {
        self.shared.reconciler.list().await
    }

    /// Replace the filter and restart the refresh schedule
    pub async fn set_filter(&self, filter: QuoteFilter) -> Result<(), FilterError> {
        filter.validate()?;
        self.shared.state.write().await.filter = filter;
        self.restart_refresh();
        Ok(())
    }

    pub async fn set_trans_amount(&self, amount: Decimal) -> Result<(), FilterError> {
        self.shared
            .state
            .write()
            .await
            .filter
            .set_trans_amount(amount)?;
        self.restart_refresh();
        Ok(())
    }

    pub async fn set_publisher_type(&self, publisher_type: PublisherType) {
        self.shared.state.write().await.filter.publisher_type = publisher_type;
        self.restart_refresh();
    }

    /// Toggle a payment method. Returns true if it is now selected.
    pub async fn toggle_pay_type(&self, tag: &str) -> bool {
        let selected = self.shared.state.write().await.filter.toggle_pay_type(tag);
        self.restart_refresh();
        selected
    }

    /// Reschedule the refresh task from zero if it is running
    fn restart_refresh(&self) {
        if !self.scheduler.is_active(TaskName::Refresh) {
            return;
        }
        self.scheduler.register(
            TaskName::Refresh,
            self.shared.config.refresh_interval,
            self.refresh_job(),
        );
        tracing::info!("Filter changed, quote refresh restarted");
    }

    pub async fn filter(&self) -> QuoteFilter {
        self.shared.state.read().await.filter.clone()
    }

    pub async fn live_quotes(&self) -> LiveQuotes {
        self.shared.state.read().await.quotes.clone()
    }

    pub async fn buy_quotes(&self) -> Vec<Quote> {
        self.shared.state.read().await.quotes.buy.clone()
    }

    pub async fn sell_quotes(&self) -> Vec<Quote> {
        self.shared.state.read().await.quotes.sell.clone()
    }

    pub async fn is_armed(&self) -> bool {
        self.shared.state.read().await.session.armed
    }

    /// Samples in the view cache
    pub async fn samples(&self) -> Vec<Sample> {
        self.shared.reconciler.samples().await
    }

    pub async fn status(&self) -> ControllerStatus {
        let cache = self.shared.reconciler.snapshot().await;
        let state = self.shared.state.read().await;
        let last_refresh = match (state.quotes.buy_updated_at, state.quotes.sell_updated_at) {
            (Some(buy), Some(sell)) => Some(buy.max(sell)),
            (buy, sell) => buy.or(sell),
        };

        ControllerStatus {
            filter: state.filter.clone(),
            armed: state.session.armed,
            armed_at: state.session.armed_at,
            recorded: state.session.recorded,
            buy_count: state.quotes.buy.len(),
            sell_count: state.quotes.sell.len(),
            last_refresh,
            cached_samples: cache.len(),
            provenance: cache.provenance(),
            refreshing: self.scheduler.is_active(TaskName::Refresh),
        }
    }

    /// Stop both tasks
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
        tracing::info!("Sampling controller stopped");
    }
}
