use std::future::Future;

use futures_util::stream::{self, StreamExt};
use locator_core::{FetchError, FetchOutcome};
use locator_logging::locator_info;

/// What happens to a record whose enrichment failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Leave the record out of the output.
    Drop,
    /// Keep the original, un-enriched record.
    Retain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    /// Position of the record in the input batch.
    pub index: usize,
    pub reason: FetchError,
    pub attempts: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport<R> {
    pub records: Vec<R>,
    pub enriched: usize,
    pub skipped: usize,
    pub failures: Vec<RecordFailure>,
}

impl<R> BatchReport<R> {
    fn new(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            enriched: 0,
            skipped: 0,
            failures: Vec::new(),
        }
    }

    fn push(&mut self, index: usize, original: R, outcome: FetchOutcome<R>, policy: FailurePolicy) {
        match outcome {
            FetchOutcome::Success(enriched) => {
                self.enriched += 1;
                self.records.push(enriched);
            }
            FetchOutcome::Failure { reason, attempts } => {
                self.skipped += 1;
                self.failures.push(RecordFailure {
                    index,
                    reason,
                    attempts,
                });
                if policy == FailurePolicy::Retain {
                    self.records.push(original);
                }
            }
        }
    }
}

/// Enriches `records` one at a time. A failed record never stops the batch.
pub async fn enrich<R, F, Fut>(
    label: &str,
    records: Vec<R>,
    policy: FailurePolicy,
    mut fetch_one: F,
) -> BatchReport<R>
where
    R: Clone,
    F: FnMut(R) -> Fut,
    Fut: Future<Output = FetchOutcome<R>>,
{
    let mut report = BatchReport::new(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let outcome = fetch_one(record.clone()).await;
        report.push(index, record, outcome, policy);
    }
    log_summary(label, &report);
    report
}

/// Like [`enrich`], with up to `concurrency` records in flight. Each record
/// keeps its own retry timer; output order still follows input order.
pub async fn enrich_concurrent<R, F, Fut>(
    label: &str,
    records: Vec<R>,
    policy: FailurePolicy,
    concurrency: usize,
    mut fetch_one: F,
) -> BatchReport<R>
where
    R: Clone,
    F: FnMut(R) -> Fut,
    Fut: Future<Output = FetchOutcome<R>>,
{
    if concurrency <= 1 {
        return enrich(label, records, policy, fetch_one).await;
    }

    let total = records.len();
    let outcomes: Vec<(R, FetchOutcome<R>)> = stream::iter(records)
        .map(|record| {
            let pending = fetch_one(record.clone());
            async move { (record, pending.await) }
        })
        .buffered(concurrency)
        .collect()
        .await;

    let mut report = BatchReport::new(total);
    for (index, (record, outcome)) in outcomes.into_iter().enumerate() {
        report.push(index, record, outcome, policy);
    }
    log_summary(label, &report);
    report
}

fn log_summary<R>(label: &str, report: &BatchReport<R>) {
    locator_info!(
        "{label}: enriched {} record(s), skipped {}",
        report.enriched,
        report.skipped
    );
}
