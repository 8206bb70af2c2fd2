use std::time::Duration;

use url::Url;

use crate::error::ItemError;

/// Fetches the raw bytes of a remote image.
///
/// Implementations must honour `timeout` and map any transport failure,
/// including the timeout itself, to [`ItemError::Network`].
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url, timeout: Duration) -> Result<Vec<u8>, ItemError>;
}
