use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::error::AppError;
use crate::ingest::{self, IngestReport};
use crate::input::Source;
use crate::pool::FetchPool;
use crate::store::{DuplicatePolicy, StoreHandle};

/// Fetch and extract `sources` on a worker pool while a single ingest
/// stage applies the results to `store`.
///
/// `build_pool` runs on a blocking thread, so pools holding blocking HTTP
/// clients are created and dropped outside the async runtime.
pub async fn import_batch<F>(
    build_pool: F,
    store: StoreHandle,
    sources: Vec<Source>,
    policy: DuplicatePolicy,
    cancel: Arc<AtomicBool>,
) -> Result<IngestReport, AppError>
where
    F: FnOnce() -> Result<FetchPool, AppError> + Send + 'static,
{
    log::info!("Starting import of {} items", sources.len());
    let (reports_tx, reports_rx) = crossbeam_channel::unbounded();

    let fetch_handle = tokio::task::spawn_blocking(move || -> Result<(), AppError> {
        let pool = build_pool()?;
        for report in pool.run(&sources, &cancel) {
            reports_tx.send(report)?;
        }
        Ok(())
    });

    let ingest_handle =
        tokio::task::spawn_blocking(move || ingest::start_ingesting(store, reports_rx, policy));

    let (fetched, ingested) = tokio::try_join!(fetch_handle, ingest_handle)?;
    fetched?;
    let report = ingested?;

    log::info!("Import finished with {} new locations", report.new_locations());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ItemError;
    use crate::fetcher::Fetcher;
    use crate::processor::fixtures::{dms, geotagged_jpeg};
    use crate::store::MarkerStore;
    use std::time::Duration;
    use url::Url;

    struct OneGoodUrl(Vec<u8>);

    impl Fetcher for OneGoodUrl {
        fn fetch(&self, url: &Url, _timeout: Duration) -> Result<Vec<u8>, ItemError> {
            if url.path() == "/good.jpg" {
                Ok(self.0.clone())
            } else {
                Err(ItemError::Network("timed out".to_string()))
            }
        }
    }

    fn sources() -> Vec<Source> {
        ["https://example.com/good.jpg", "https://example.com/slow.jpg"]
            .iter()
            .map(|u| Source::Remote(Url::parse(u).unwrap()))
            .collect()
    }

    fn build_pool() -> Result<FetchPool, AppError> {
        let photo = geotagged_jpeg(dms(51, 30, 26640), "N", dms(0, 7, 40080), "W");
        FetchPool::new(2, Arc::new(OneGoodUrl(photo)), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_import_batch_updates_store() {
        let store = StoreHandle::new(MarkerStore::new());
        let report = import_batch(
            build_pool,
            store.clone(),
            sources(),
            DuplicatePolicy::Skip,
            Arc::new(AtomicBool::new(false)),
        )
        .await
        .unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].1, ItemError::Network(_)));

        let markers = store.snapshot().unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].label, "https://example.com/good.jpg");
        assert!(markers[0].location.longitude < 0.0);
    }

    #[tokio::test]
    async fn test_second_import_with_overwrite() {
        let store = StoreHandle::new(MarkerStore::new());
        for _ in 0..2 {
            import_batch(
                build_pool,
                store.clone(),
                sources(),
                DuplicatePolicy::Overwrite,
                Arc::new(AtomicBool::new(false)),
            )
            .await
            .unwrap();
        }
        assert_eq!(store.snapshot().unwrap().len(), 1);
        assert!(store.with(|s| s.undo()).unwrap());
        assert_eq!(store.snapshot().unwrap().len(), 1);
    }
}
