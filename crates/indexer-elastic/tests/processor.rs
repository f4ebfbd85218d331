//! Tests for the bulk submission pipeline against in-process transports

use anyhow::Result;
use indexer_core::{BulkOperation, OperationKind, Submitter};
use indexer_elastic::{BulkBatch, BulkError, BulkProcessor, BulkResponse, BulkResponseItem, BulkTransport};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── fake transports ──────────────────────────────────────────────────────────

/// Acknowledges everything except the ids it was told to reject
#[derive(Default)]
struct RecordingTransport {
    reject: HashSet<String>,
    delay: Option<Duration>,
    batches: Mutex<Vec<Vec<String>>>,
    acknowledged: AtomicUsize,
}

impl RecordingTransport {
    fn rejecting(ids: &[&str]) -> Self {
        Self {
            reject: ids.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    fn sent_ids(&self) -> Vec<String> {
        self.batches.lock().unwrap().iter().flatten().cloned().collect()
    }
}

impl BulkTransport for RecordingTransport {
    fn execute(&self, batch: &BulkBatch) -> Result<BulkResponse> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let items = batch
            .operations()
            .iter()
            .map(|op| {
                let item = if self.reject.contains(&op.id) {
                    BulkResponseItem::failure(op.id.clone(), 400, "mapper_parsing_exception")
                } else {
                    BulkResponseItem::ok(op.id.clone(), 201)
                };
                (op.kind, item)
            })
            .collect();

        self.batches
            .lock()
            .unwrap()
            .push(batch.operations().iter().map(|op| op.id.clone()).collect());
        self.acknowledged.fetch_add(batch.len(), Ordering::SeqCst);

        Ok(BulkResponse::from_items(items))
    }
}

/// Fails every call at the transport level
struct UnreachableTransport;

impl BulkTransport for UnreachableTransport {
    fn execute(&self, _batch: &BulkBatch) -> Result<BulkResponse> {
        anyhow::bail!("connection refused")
    }
}

fn delete(id: &str) -> BulkOperation {
    BulkOperation::delete(id, "project_667")
}

fn processor(transport: Arc<dyn BulkTransport>, max_bulk_size: usize) -> BulkProcessor {
    BulkProcessor::new(transport, "gitlab", max_bulk_size, 4).unwrap()
}

// ── flush outcome ────────────────────────────────────────────────────────────

#[test]
fn test_all_acknowledged_flush_succeeds() -> Result<()> {
    let transport = Arc::new(RecordingTransport::default());
    let bulk = processor(transport.clone(), 1024 * 1024);

    for id in ["667_a", "667_b", "667_c"] {
        bulk.enqueue(delete(id))?;
    }
    bulk.flush()?;

    assert_eq!(transport.acknowledged.load(Ordering::SeqCst), 3);
    assert_eq!(transport.batch_count(), 1);
    assert!(!bulk.has_failed());
    Ok(())
}

#[test]
fn test_partial_failure_fails_flush() -> Result<()> {
    let transport = Arc::new(RecordingTransport::rejecting(&["667_b"]));
    let bulk = processor(transport.clone(), 1024 * 1024);

    for id in ["667_a", "667_b", "667_c"] {
        bulk.enqueue(delete(id))?;
    }

    let err = bulk.flush().unwrap_err();
    assert!(err.to_string().contains("Failed to perform all operations"));
    match err.downcast_ref::<BulkError>() {
        Some(BulkError::Failed { failed, batches }) => {
            assert_eq!(*failed, 1);
            assert_eq!(*batches, 1);
        }
        None => panic!("expected BulkError, got {:#}", err),
    }

    // the other two still reached the engine
    assert_eq!(transport.acknowledged.load(Ordering::SeqCst), 3);
    Ok(())
}

#[test]
fn test_transport_error_fails_flush() -> Result<()> {
    let bulk = processor(Arc::new(UnreachableTransport), 1024 * 1024);
    bulk.enqueue(delete("667_a"))?;

    // enqueue never reports the failure itself
    bulk.enqueue(delete("667_b"))?;

    assert!(bulk.flush().is_err());
    assert!(bulk.has_failed());
    Ok(())
}

#[test]
fn test_failure_flag_is_sticky() -> Result<()> {
    let transport = Arc::new(RecordingTransport::rejecting(&["667_bad"]));
    let bulk = processor(transport.clone(), 1024 * 1024);

    bulk.enqueue(delete("667_bad"))?;
    assert!(bulk.flush().is_err());

    bulk.enqueue(delete("667_good"))?;
    assert!(bulk.flush().is_err());
    assert!(bulk.flush().is_err());
    Ok(())
}

#[test]
fn test_empty_flush_is_ok() -> Result<()> {
    let transport = Arc::new(RecordingTransport::default());
    let bulk = processor(transport.clone(), 1024 * 1024);

    bulk.flush()?;
    bulk.flush()?;
    assert_eq!(transport.batch_count(), 0);
    Ok(())
}

// ── batching ─────────────────────────────────────────────────────────────────

#[test]
fn test_threshold_splits_into_batches() -> Result<()> {
    let transport = Arc::new(RecordingTransport::default());
    // every delete action line is larger than this, so each op ships alone
    let bulk = processor(transport.clone(), 16);

    let ids: Vec<String> = (0..10).map(|i| format!("667_file{}", i)).collect();
    for id in &ids {
        bulk.enqueue(delete(id))?;
    }
    bulk.flush()?;

    assert_eq!(transport.batch_count(), 10);
    let mut sent = transport.sent_ids();
    sent.sort();
    let mut expected = ids.clone();
    expected.sort();
    assert_eq!(sent, expected);
    Ok(())
}

#[test]
fn test_flush_waits_for_in_flight_batches() -> Result<()> {
    let transport = Arc::new(RecordingTransport::slow(Duration::from_millis(50)));
    let bulk = processor(transport.clone(), 16);

    for i in 0..6 {
        bulk.enqueue(delete(&format!("667_{}", i)))?;
    }
    bulk.flush()?;

    assert_eq!(transport.acknowledged.load(Ordering::SeqCst), 6);
    Ok(())
}

#[test]
fn test_enqueue_waits_for_a_free_worker() -> Result<()> {
    let transport = Arc::new(RecordingTransport::slow(Duration::from_millis(30)));
    let bulk = BulkProcessor::new(transport.clone(), "gitlab", 1, 2)?;

    // every operation fills a batch; the eighth can only start once six are done
    for i in 0..8 {
        bulk.enqueue(delete(&format!("667_{}", i)))?;
    }
    assert!(
        transport.acknowledged.load(Ordering::SeqCst) >= 6,
        "more than 2 batches outstanding: {} acknowledged",
        transport.acknowledged.load(Ordering::SeqCst)
    );

    bulk.flush()?;
    assert_eq!(transport.batch_count(), 8);
    Ok(())
}

#[test]
fn test_submitter_trait_routes_to_processor() -> Result<()> {
    let transport = Arc::new(RecordingTransport::default());
    let bulk = processor(transport.clone(), 1024 * 1024);
    let submitter: &dyn Submitter = &bulk;

    submitter.enqueue_delete("667_x".to_string(), "project_667".to_string())?;
    submitter.flush()?;

    assert_eq!(transport.sent_ids(), vec!["667_x".to_string()]);
    Ok(())
}

#[test]
fn test_delete_of_unknown_id_is_not_a_failure() -> Result<()> {
    struct NotFoundTransport;

    impl BulkTransport for NotFoundTransport {
        fn execute(&self, batch: &BulkBatch) -> Result<BulkResponse> {
            let items = batch
                .operations()
                .iter()
                .map(|op| {
                    assert_eq!(op.kind, OperationKind::Delete);
                    (op.kind, BulkResponseItem::ok(op.id.clone(), 404))
                })
                .collect();
            Ok(BulkResponse::from_items(items))
        }
    }

    let bulk = processor(Arc::new(NotFoundTransport), 1024 * 1024);
    bulk.enqueue(delete("667_never_indexed"))?;
    bulk.flush()?;
    Ok(())
}
