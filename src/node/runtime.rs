//! Grader runtime.
//!
//! A long-running task that consumes ledger block events, runs the grading
//! pipeline at each confirmed height, appends the result to the chain, and
//! broadcasts graded-block events. The runtime is the chain's only writer;
//! readers go through [`RuntimeHandle`] and get value snapshots.
//!
//! Cancellation flows through the control channel. A block being graded when
//! the command arrives is finished (including its append) before the runtime
//! stops, so shutdown never leaves a partially appended chain.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::chain::{ChainError, OracleChain};
use crate::grading::graded_block::{BlockState, GradedBlock};
use crate::grading::rules::{
    format_difficulty, format_grade, rules_at, Network, OPR_CHAIN_TAG, PROTOCOL,
};
use crate::grading::{grade_block, validate_entry, DifficultyCache, GradingError, GradingMetrics};
use crate::node::backoff::ledger_backoff;
use crate::node::ledger::{chain_id_from_fields, LedgerClient};
use crate::pow::DifficultyOracle;
use crate::record::RawEntry;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub network: Network,
    /// Minute marker at which a height's record set is fetched and graded.
    pub grade_at_minute: u8,
    /// Capacity of the graded-block broadcast channel.
    pub event_capacity: usize,
    /// Capacity of the control and error channels.
    pub control_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            network: Network::MainNet,
            grade_at_minute: 1,
            event_capacity: 32,
            control_capacity: 8,
        }
    }
}

/// Commands accepted on the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeCommand {
    Shutdown,
}

/// Event published to subscribers after each graded height.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedBlockEvent {
    pub height: i32,
    pub state: BlockState,
    /// Winner payout addresses in rank order.
    pub winners: Vec<String>,
    pub canonical_prices: Vec<u64>,
    pub short_hashes: Vec<String>,
}

impl From<&GradedBlock> for GradedBlockEvent {
    fn from(block: &GradedBlock) -> Self {
        Self {
            height: block.height,
            state: block.state,
            winners: block
                .winners()
                .iter()
                .map(|winner| winner.payout_address.clone())
                .collect(),
            canonical_prices: block.canonical_prices.clone(),
            short_hashes: block.short_hashes.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("ledger fetch for height {height} failed: {message}")]
    Ledger { height: i32, message: String },

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Grading(#[from] GradingError),
}

/// Reader and control surface of a running grader.
pub struct RuntimeHandle {
    control: mpsc::Sender<RuntimeCommand>,
    events: broadcast::Sender<GradedBlockEvent>,
    errors: Option<mpsc::Receiver<RuntimeError>>,
    chain: Arc<RwLock<OracleChain>>,
}

impl RuntimeHandle {
    /// New subscription to graded-block events.
    pub fn subscribe(&self) -> broadcast::Receiver<GradedBlockEvent> {
        self.events.subscribe()
    }

    /// Takes the runtime error stream; only the first caller receives it.
    pub fn take_errors(&mut self) -> Option<mpsc::Receiver<RuntimeError>> {
        self.errors.take()
    }

    /// Asks the runtime to stop after the block in flight, if any.
    pub async fn shutdown(&self) {
        let _ = self.control.send(RuntimeCommand::Shutdown).await;
    }

    pub async fn head_height(&self) -> Option<i32> {
        self.chain.read().await.head().map(|block| block.height)
    }

    /// Value snapshot of one graded block.
    pub async fn graded_block(&self, height: i32) -> Option<GradedBlock> {
        self.chain.read().await.get(height).cloned()
    }

    /// Value snapshot of the blocks in `from..=to`.
    pub async fn snapshot_range(&self, from: i32, to: i32) -> Vec<GradedBlock> {
        self.chain.read().await.range(from, to)
    }
}

/// The grading task. Construct with [`GraderRuntime::new`], then drive with
/// [`GraderRuntime::run`] on a tokio task.
pub struct GraderRuntime<L> {
    config: RuntimeConfig,
    ledger: L,
    oracle: Arc<dyn DifficultyOracle>,
    chain: Arc<RwLock<OracleChain>>,
    chain_id: [u8; 32],
    cache: DifficultyCache,
    metrics: Arc<GradingMetrics>,
    control_rx: mpsc::Receiver<RuntimeCommand>,
    events_tx: broadcast::Sender<GradedBlockEvent>,
    errors_tx: mpsc::Sender<RuntimeError>,
}

impl<L: LedgerClient> GraderRuntime<L> {
    pub fn new(
        config: RuntimeConfig,
        ledger: L,
        oracle: Arc<dyn DifficultyOracle>,
        chain: OracleChain,
        metrics: Arc<GradingMetrics>,
    ) -> (Self, RuntimeHandle) {
        let (control_tx, control_rx) = mpsc::channel(config.control_capacity);
        let (errors_tx, errors_rx) = mpsc::channel(config.control_capacity);
        let (events_tx, _) = broadcast::channel(config.event_capacity);
        let chain = Arc::new(RwLock::new(chain));

        let chain_id = chain_id_from_fields(&[
            PROTOCOL.as_bytes(),
            config.network.name().as_bytes(),
            OPR_CHAIN_TAG.as_bytes(),
        ]);

        let handle = RuntimeHandle {
            control: control_tx,
            events: events_tx.clone(),
            errors: Some(errors_rx),
            chain: chain.clone(),
        };

        let runtime = Self {
            config,
            ledger,
            oracle,
            chain,
            chain_id,
            cache: DifficultyCache::default(),
            metrics,
            control_rx,
            events_tx,
            errors_tx,
        };

        (runtime, handle)
    }

    /// Consumes ledger events until shutdown or a fatal error.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        let mut events = self.ledger.subscribe_block_events().await;
        info!(network = %self.config.network, "grader runtime started");

        loop {
            tokio::select! {
                command = self.control_rx.recv() => {
                    // A closed control channel means every handle is gone.
                    match command {
                        Some(RuntimeCommand::Shutdown) | None => {
                            info!("grader runtime stopping");
                            return Ok(());
                        }
                    }
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        warn!("ledger event stream closed");
                        return Ok(());
                    };
                    if event.minute != self.config.grade_at_minute {
                        continue;
                    }

                    match self.process_height(event.height).await {
                        Ok(Some(graded)) => {
                            let _ = self.events_tx.send(graded);
                        }
                        Ok(None) => {}
                        Err(err @ RuntimeError::Ledger { .. }) => {
                            warn!(height = event.height, %err, "skipping height");
                            let _ = self.errors_tx.send(err).await;
                        }
                        Err(fatal) => {
                            error!(height = event.height, %fatal, "grader runtime stopping on fatal error");
                            return Err(fatal);
                        }
                    }
                }
            }
        }
    }

    /// One grading transaction: fetch, validate, grade, append.
    async fn process_height(
        &mut self,
        height: i32,
    ) -> Result<Option<GradedBlockEvent>, RuntimeError> {
        let rules = match rules_at(self.config.network, height) {
            Ok(rules) => rules,
            Err(GradingError::NetworkInactive { .. }) => {
                debug!(height, "height precedes network activation");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        // A re-announced height means the ledger reorganized underneath us;
        // truncate to the fork point and re-grade forward.
        {
            let mut chain = self.chain.write().await;
            if chain.head().map(|head| head.height >= height).unwrap_or(false) {
                warn!(height, "ledger re-announced a graded height, truncating");
                chain.truncate_to(height - 1).await?;
            }
        }

        let expected_winners = self.chain.read().await.expected_winners(height);
        let entries = self.fetch_entries(height).await?;

        let started = Instant::now();
        let mut candidates = Vec::with_capacity(entries.len());
        for entry in &entries {
            match validate_entry(entry, height, &expected_winners, &rules) {
                Ok(candidate) => {
                    self.metrics.increment_records_validated();
                    candidates.push(candidate);
                }
                Err(err) => {
                    self.metrics.increment_validation_failures(err.reason());
                    debug!(height, %err, "record rejected");
                }
            }
        }

        let block = grade_block(
            height,
            candidates,
            &rules,
            self.oracle.as_ref(),
            Some(&self.cache),
        );
        self.metrics
            .observe_grading_duration(started.elapsed().as_secs_f64());
        self.metrics.increment_blocks_graded(block.state.label());
        info!(
            height,
            state = block.state.label(),
            admitted = block.admitted,
            graded = block.graded_count,
            winners = block.winner_count,
            "block graded"
        );
        if let Some(best) = block.winners().first() {
            debug!(
                height,
                oprhash = %best.oprhash_hex(),
                grade = %format_grade(best.grade, 4),
                difficulty = %format_difficulty(best.self_reported_difficulty, 4),
                "rank 1 record"
            );
        }

        let graded_event = GradedBlockEvent::from(&block);
        self.chain.write().await.append(block).await?;
        Ok(Some(graded_event))
    }

    /// Entry fetch with the contract retry schedule.
    async fn fetch_entries(&self, height: i32) -> Result<Vec<RawEntry>, RuntimeError> {
        backoff::future::retry(ledger_backoff(), || async {
            self.ledger
                .get_entries(&self.chain_id, height)
                .await
                .map_err(|err| {
                    debug!(height, %err, "ledger fetch failed, backing off");
                    backoff::Error::transient(err)
                })
        })
        .await
        .map_err(|err| RuntimeError::Ledger {
            height,
            message: err.to_string(),
        })
    }
}
