use crate::error::{AppError, ItemError};
use crate::pool::{ItemOutcome, ItemReport};
use crate::store::{DuplicatePolicy, PendingDuplicate, StoreHandle};

/// Summary of one import batch, per item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub added: usize,
    pub overwritten: usize,
    pub skipped_duplicates: Vec<String>,
    pub pending: Vec<PendingDuplicate>,
    pub no_location: Vec<String>,
    pub failures: Vec<(String, ItemError)>,
    pub cancelled: usize,
}

impl IngestReport {
    pub fn new_locations(&self) -> usize {
        self.added + self.overwritten
    }
}

/// Single writer for a batch: drains fetched reports and applies every
/// located marker to the store as one undoable step.
pub fn start_ingesting(
    store: StoreHandle,
    reports_rx: crossbeam_channel::Receiver<ItemReport>,
    policy: DuplicatePolicy,
) -> Result<IngestReport, AppError> {
    log::info!("Starting marker ingestion");

    let mut report = IngestReport::default();
    let mut located = Vec::new();

    for item in reports_rx {
        let label = item.source.label();
        match item.outcome {
            ItemOutcome::Located(marker) => located.push(marker),
            ItemOutcome::NoLocation => report.no_location.push(label),
            ItemOutcome::Failed(e) => report.failures.push((label, e)),
            ItemOutcome::Cancelled => report.cancelled += 1,
        }
    }

    let batch = store.with(|store| store.add_batch(located, policy))?;
    report.added = batch.added;
    report.overwritten = batch.overwritten;
    report.skipped_duplicates = batch.skipped;
    report.pending = batch.pending;

    log::info!(
        "Ingestion finished: {} new, {} without location, {} failed",
        report.new_locations(),
        report.no_location.len(),
        report.failures.len()
    );
    Ok(report)
}
