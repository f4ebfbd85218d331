//! Bulk submission pipeline
//!
//! Operations are appended to an in-memory batch on the caller's thread.
//! Once a batch reaches the byte threshold (or on flush) it is handed to a
//! fixed pool of workers which perform the blocking bulk call. The caller
//! waits for a free worker, so at most one batch per worker is outstanding. Any failed
//! batch or operation sets a sticky flag reported by [`BulkProcessor::flush`].

use anyhow::{Context, Result};
use indexer_core::{BulkOperation, Submitter};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::bulk::{BulkBatch, BulkTransport};
use crate::config::ElasticConfig;
use crate::response::BulkResponse;

/// Aggregate failure surfaced at flush time
#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    #[error("Failed to perform all operations ({failed} failed in {batches} bulk request(s))")]
    Failed { failed: usize, batches: usize },
}

/// Count of batches handed to workers but not yet acknowledged, capped at
/// the number of workers
#[derive(Default)]
struct InFlight {
    count: Mutex<usize>,
    drained: Condvar,
}

impl InFlight {
    fn lock(&self) -> MutexGuard<'_, usize> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a slot, blocking while `limit` batches are outstanding
    fn begin(&self, limit: usize) {
        let mut count = self.lock();
        while *count >= limit {
            count = self.drained.wait(count).unwrap_or_else(PoisonError::into_inner);
        }
        *count += 1;
    }

    fn finish(&self) {
        let mut count = self.lock();
        *count = count.saturating_sub(1);
        self.drained.notify_all();
    }

    fn wait(&self) {
        let mut count = self.lock();
        while *count > 0 {
            count = self.drained.wait(count).unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Releases the in-flight slot even if the transport panics
struct InFlightGuard(Arc<InFlight>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Failure state shared by all workers
#[derive(Default)]
struct FailureState {
    failed: AtomicBool,
    failed_operations: AtomicUsize,
    failed_batches: AtomicUsize,
}

impl FailureState {
    /// Completion callback of one bulk call
    fn record(&self, execution_id: u64, sent: usize, result: Result<BulkResponse>) {
        match result {
            Err(err) => {
                self.failed.store(true, Ordering::SeqCst);
                self.failed_batches.fetch_add(1, Ordering::SeqCst);
                self.failed_operations.fetch_add(sent, Ordering::SeqCst);
                log::warn!("bulk request {}: error: {:#}", execution_id, err);
            }
            Ok(response) => {
                if !response.errors {
                    log::debug!("bulk request {}: {} operations acknowledged", execution_id, response.total());
                    return;
                }

                let num_failed = response.failed().len();
                if num_failed > 0 {
                    self.failed.store(true, Ordering::SeqCst);
                    self.failed_batches.fetch_add(1, Ordering::SeqCst);
                    self.failed_operations.fetch_add(num_failed, Ordering::SeqCst);
                    let total = num_failed + response.succeeded().len();
                    log::warn!(
                        "bulk request {}: failed to insert {}/{} documents",
                        execution_id,
                        num_failed,
                        total
                    );
                    for item in response.failed() {
                        log::debug!(
                            "bulk request {}: {} -> {} {}",
                            execution_id,
                            item.id.as_deref().unwrap_or("?"),
                            item.status,
                            item.error.as_ref().map(|e| e.to_string()).unwrap_or_default()
                        );
                    }
                }
            }
        }
    }
}

/// Batches bulk operations and ships them through a worker pool
pub struct BulkProcessor {
    index_name: String,
    max_bulk_size: usize,
    transport: Arc<dyn BulkTransport>,
    workers: rayon::ThreadPool,
    max_in_flight: usize,
    batch: Mutex<BulkBatch>,
    in_flight: Arc<InFlight>,
    failure: Arc<FailureState>,
    next_execution_id: AtomicU64,
}

impl BulkProcessor {
    /// Creates a processor with `workers` bulk workers and a byte threshold per batch
    pub fn new(
        transport: Arc<dyn BulkTransport>,
        index_name: impl Into<String>,
        max_bulk_size: usize,
        workers: usize,
    ) -> Result<Self> {
        let max_in_flight = workers.max(1);
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(max_in_flight)
            .thread_name(|i| format!("bulk-worker-{}", i))
            .build()
            .context("Failed to start bulk workers")?;

        Ok(Self {
            index_name: index_name.into(),
            max_bulk_size: max_bulk_size.max(1),
            transport,
            workers,
            max_in_flight,
            batch: Mutex::new(BulkBatch::new(1)),
            in_flight: Arc::new(InFlight::default()),
            failure: Arc::new(FailureState::default()),
            next_execution_id: AtomicU64::new(2),
        })
    }

    pub fn from_config(config: &ElasticConfig, transport: Arc<dyn BulkTransport>) -> Result<Self> {
        Self::new(transport, config.index_name.clone(), config.max_bulk_size, config.bulk_workers)
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Appends an operation; dispatches the batch once it reaches the threshold.
    /// Blocks while every worker is busy.
    pub fn enqueue(&self, operation: BulkOperation) -> Result<()> {
        let full = {
            let mut batch = self.lock_batch();
            batch.push(&operation, &self.index_name)?;
            if batch.size_bytes() >= self.max_bulk_size {
                Some(self.take_batch(&mut batch))
            } else {
                None
            }
        };

        if let Some(batch) = full {
            self.dispatch(batch);
        }
        Ok(())
    }

    /// Dispatches the pending batch, waits for every outstanding batch and
    /// reports the sticky failure flag
    pub fn flush(&self) -> Result<()> {
        let pending = {
            let mut batch = self.lock_batch();
            self.take_batch(&mut batch)
        };
        self.dispatch(pending);
        self.in_flight.wait();

        if self.has_failed() {
            return Err(BulkError::Failed {
                failed: self.failure.failed_operations.load(Ordering::SeqCst),
                batches: self.failure.failed_batches.load(Ordering::SeqCst),
            }
            .into());
        }
        Ok(())
    }

    /// Whether any batch or operation has failed so far. Never resets.
    pub fn has_failed(&self) -> bool {
        self.failure.failed.load(Ordering::SeqCst)
    }

    fn lock_batch(&self) -> MutexGuard<'_, BulkBatch> {
        self.batch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_batch(&self, batch: &mut BulkBatch) -> BulkBatch {
        let next = BulkBatch::new(self.next_execution_id.fetch_add(1, Ordering::SeqCst));
        std::mem::replace(batch, next)
    }

    fn dispatch(&self, batch: BulkBatch) {
        if batch.is_empty() {
            return;
        }

        log::debug!(
            "bulk request {}: dispatching {} operations ({} bytes)",
            batch.execution_id(),
            batch.len(),
            batch.size_bytes()
        );

        self.in_flight.begin(self.max_in_flight);
        let guard = InFlightGuard(Arc::clone(&self.in_flight));
        let transport = Arc::clone(&self.transport);
        let failure = Arc::clone(&self.failure);

        self.workers.spawn(move || {
            let _guard = guard;
            let result = transport.execute(&batch);
            failure.record(batch.execution_id(), batch.len(), result);
        });
    }
}

impl Submitter for BulkProcessor {
    fn submit(&self, operation: BulkOperation) -> Result<()> {
        self.enqueue(operation)
    }

    fn flush(&self) -> Result<()> {
        BulkProcessor::flush(self)
    }
}
