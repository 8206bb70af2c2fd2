use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::clients::http::HttpFetcher;
use crate::config::AppConfig;
use crate::error::{AppError, ItemError};
use crate::fetcher::Fetcher;
use crate::input::Source;
use crate::metadata::Marker;
use crate::processor::extract_from_bytes;

/// Result of resolving one batch item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Located(Marker),
    NoLocation,
    Failed(ItemError),
    /// The batch was cancelled before this item started.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub source: Source,
    pub outcome: ItemOutcome,
}

/// Bounded worker pool that turns sources into per-item outcomes.
pub struct FetchPool {
    pool: ThreadPool,
    fetcher: Arc<dyn Fetcher>,
    timeout: Duration,
}

impl FetchPool {
    pub fn new(num_workers: usize, fetcher: Arc<dyn Fetcher>, timeout: Duration) -> Result<Self, AppError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .thread_name(|i| format!("fetch-worker-{}", i))
            .build()?;
        Ok(Self { pool, fetcher, timeout })
    }

    /// Pool sized from the configuration with a blocking HTTP fetcher.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let fetcher = HttpFetcher::new(&config.user_agent)?;
        Self::new(config.worker_count(), Arc::new(fetcher), config.fetch_timeout())
    }

    pub fn num_workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Resolve every source. The returned reports follow input order and
    /// there is exactly one per source; failures stay local to their item.
    pub fn run(&self, sources: &[Source], cancel: &AtomicBool) -> Vec<ItemReport> {
        log::info!(
            "Starting image processing of {} items with {} workers",
            sources.len(),
            self.num_workers()
        );

        let reports: Vec<ItemReport> = self.pool.install(|| {
            sources
                .par_iter()
                .map(|source| ItemReport {
                    source: source.clone(),
                    outcome: self.resolve(source, cancel),
                })
                .collect()
        });

        log::info!("All {} items processed.", reports.len());
        reports
    }

    fn resolve(&self, source: &Source, cancel: &AtomicBool) -> ItemOutcome {
        if cancel.load(Ordering::Relaxed) {
            log::debug!("Skipping {} after cancellation", source);
            return ItemOutcome::Cancelled;
        }

        log::info!("Processing image started for: {}", source);
        let outcome = match self.load_bytes(source) {
            Ok(bytes) => match extract_from_bytes(&bytes, &source.label(), source.is_remote()) {
                Ok(extraction) => match extraction.into_marker(source.label()) {
                    Some(marker) => ItemOutcome::Located(marker),
                    None => ItemOutcome::NoLocation,
                },
                Err(e) => ItemOutcome::Failed(e),
            },
            Err(e) => ItemOutcome::Failed(e),
        };

        match &outcome {
            ItemOutcome::Failed(e) => log::warn!("Failed to process image {}: {}", source, e),
            ItemOutcome::NoLocation => log::info!("No GPS data found for: {}", source),
            _ => log::info!("Processing image finished for: {}", source),
        }
        outcome
    }

    fn load_bytes(&self, source: &Source) -> Result<Vec<u8>, ItemError> {
        match source {
            Source::Remote(url) => self.fetcher.fetch(url, self.timeout),
            Source::Local(path) => std::fs::read(path).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ItemError::FileNotFound(path.clone()),
                _ => ItemError::Other(e.to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::fixtures::{dms, geotagged_jpeg, png_without_exif};
    use std::collections::HashMap;
    use url::Url;

    /// Serves canned bytes by URL; anything else is a network failure.
    struct StubFetcher {
        responses: HashMap<String, Vec<u8>>,
    }

    impl Fetcher for StubFetcher {
        fn fetch(&self, url: &Url, _timeout: Duration) -> Result<Vec<u8>, ItemError> {
            self.responses
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| ItemError::Network(format!("connection refused: {}", url)))
        }
    }

    fn remote(url: &str) -> Source {
        Source::Remote(Url::parse(url).unwrap())
    }

    fn pool(responses: HashMap<String, Vec<u8>>) -> FetchPool {
        FetchPool::new(2, Arc::new(StubFetcher { responses }), Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_middle_failure_keeps_order_and_other_items() {
        let photo = geotagged_jpeg(dms(48, 51, 23760), "N", dms(2, 21, 7920), "E");
        let mut responses = HashMap::new();
        responses.insert("https://example.com/1.jpg".to_string(), photo.clone());
        responses.insert("https://example.com/3.jpg".to_string(), photo);
        let sources = vec![
            remote("https://example.com/1.jpg"),
            remote("https://example.com/2.jpg"),
            remote("https://example.com/3.jpg"),
        ];

        let reports = pool(responses).run(&sources, &AtomicBool::new(false));

        assert_eq!(reports.len(), 3);
        for (report, source) in reports.iter().zip(&sources) {
            assert_eq!(&report.source, source);
        }
        match &reports[0].outcome {
            ItemOutcome::Located(marker) => assert_eq!(marker.label, "https://example.com/1.jpg"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(matches!(reports[1].outcome, ItemOutcome::Failed(ItemError::Network(_))));
        assert!(matches!(reports[2].outcome, ItemOutcome::Located(_)));
    }

    #[test]
    fn test_local_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let located = dir.path().join("located.jpg");
        let plain = dir.path().join("plain.png");
        let junk = dir.path().join("junk.jpg");
        std::fs::write(&located, geotagged_jpeg(dms(10, 0, 0), "S", dms(20, 0, 0), "W")).unwrap();
        std::fs::write(&plain, png_without_exif()).unwrap();
        std::fs::write(&junk, b"not an image").unwrap();
        let sources = vec![
            Source::Local(located.clone()),
            Source::Local(plain),
            Source::Local(junk),
            Source::Local(dir.path().join("deleted.jpg")),
        ];

        let reports = pool(HashMap::new()).run(&sources, &AtomicBool::new(false));

        match &reports[0].outcome {
            ItemOutcome::Located(marker) => {
                assert_eq!(marker.label, located.to_string_lossy());
                assert_eq!(marker.location.latitude, -10.0);
                assert_eq!(marker.location.longitude, -20.0);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(reports[1].outcome, ItemOutcome::NoLocation);
        assert!(matches!(reports[2].outcome, ItemOutcome::Failed(ItemError::InvalidImage(_))));
        assert!(matches!(reports[3].outcome, ItemOutcome::Failed(ItemError::FileNotFound(_))));
    }

    #[test]
    fn test_cancelled_batch_reports_every_item() {
        let sources = vec![remote("https://example.com/a.jpg"), remote("https://example.com/b.jpg")];
        let reports = pool(HashMap::new()).run(&sources, &AtomicBool::new(true));
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.outcome == ItemOutcome::Cancelled));
    }
}
