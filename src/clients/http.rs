use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use url::Url;

use crate::error::{AppError, ItemError};
use crate::fetcher::Fetcher;

/// Blocking HTTP fetcher used from the fetch pool's worker threads.
///
/// Must be created and dropped outside of an async context.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> Result<Self, AppError> {
        log::debug!("Creating HTTP client with user agent: {}", user_agent);
        let client = Client::builder()
            .redirect(Policy::limited(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url, timeout: Duration) -> Result<Vec<u8>, ItemError> {
        log::debug!("Fetching {} (timeout {:?})", url, timeout);
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| ItemError::Network(e.to_string()))?;

        let bytes = response
            .bytes()
            .map_err(|e| ItemError::Network(e.to_string()))?;
        log::trace!("Fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Instant;

    fn local_url(listener: &TcpListener, path: &str) -> Url {
        let addr = listener.local_addr().unwrap();
        Url::parse(&format!("http://{}{}", addr, path)).unwrap()
    }

    #[test]
    fn test_stalled_server_times_out_as_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = local_url(&listener, "/slow.jpg");
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(3));
            drop(stream);
        });

        let fetcher = HttpFetcher::new("geomark-test").unwrap();
        let timeout = Duration::from_millis(300);
        let started = Instant::now();
        let result = fetcher.fetch(&url, timeout);
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(ItemError::Network(_))), "got {:?}", result);
        assert!(elapsed >= timeout, "returned after {:?}", elapsed);
        assert!(elapsed < timeout * 5, "returned after {:?}", elapsed);
        server.join().unwrap();
    }

    #[test]
    fn test_refused_connection_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = local_url(&listener, "/gone.jpg");
        drop(listener);

        let fetcher = HttpFetcher::new("geomark-test").unwrap();
        let result = fetcher.fetch(&url, Duration::from_secs(2));
        assert!(matches!(result, Err(ItemError::Network(_))), "got {:?}", result);
    }

    /// Serves one canned response, then closes.
    fn serve_once(listener: TcpListener, response: &'static [u8]) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request).unwrap();
            stream.write_all(response).unwrap();
        })
    }

    #[test]
    fn test_error_status_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = local_url(&listener, "/missing.jpg");
        let server = serve_once(
            listener,
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );

        let fetcher = HttpFetcher::new("geomark-test").unwrap();
        let result = fetcher.fetch(&url, Duration::from_secs(2));
        assert!(matches!(result, Err(ItemError::Network(_))), "got {:?}", result);
        server.join().unwrap();
    }

    #[test]
    fn test_body_is_returned() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = local_url(&listener, "/ok.jpg");
        let server = serve_once(
            listener,
            b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\nJPEG",
        );

        let fetcher = HttpFetcher::new("geomark-test").unwrap();
        let bytes = fetcher.fetch(&url, Duration::from_secs(2)).unwrap();
        assert_eq!(bytes, b"JPEG");
        server.join().unwrap();
    }
}
