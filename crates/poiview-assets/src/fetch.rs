//! Model fetching
//!
//! Retrieves raw model text over HTTP or from the local file system.

use std::future::Future;
use std::io::Read;
use std::path::PathBuf;

use crate::FetchError;

/// Source of raw model text
pub trait ModelFetcher: Send + Sync + 'static {
    /// Fetch the full text behind `url`
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// HTTP(S) fetcher backed by a blocking `ureq` agent on the tokio blocking pool
#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher with a default agent
    pub fn new() -> Self {
        Self::with_agent(ureq::AgentBuilder::new().build())
    }

    /// Create a fetcher with a preconfigured agent
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    fn fetch_blocking(agent: &ureq::Agent, url: &str) -> Result<String, FetchError> {
        match agent.get(url).call() {
            Ok(response) => {
                // `into_string` caps bodies at 10 MB, read the whole stream instead
                let mut text = String::new();
                response.into_reader().read_to_string(&mut text)?;
                Ok(text)
            }
            Err(ureq::Error::Status(code, response)) => Err(FetchError::Status {
                code,
                reason: response.status_text().to_string(),
            }),
            Err(ureq::Error::Transport(transport)) => {
                Err(FetchError::Transport(transport.to_string()))
            }
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let agent = self.agent.clone();
        let url = url.to_string();
        log::debug!("GET {}", url);

        tokio::task::spawn_blocking(move || Self::fetch_blocking(&agent, &url))
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
    }
}

/// Local file fetcher; accepts plain paths and `file://` URLs
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    fn path_of(url: &str) -> PathBuf {
        PathBuf::from(url.strip_prefix("file://").unwrap_or(url))
    }
}

impl ModelFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let path = Self::path_of(url);
        log::debug!("reading {}", path.display());
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}

/// Fetcher that picks HTTP or file access from the URL scheme
#[derive(Clone, Default)]
pub struct SourceFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

impl SourceFetcher {
    /// Create a new source fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a URL is fetched over the network
    pub fn is_remote(url: &str) -> bool {
        let lower = url.trim_start().to_ascii_lowercase();
        lower.starts_with("http://") || lower.starts_with("https://")
    }
}

impl ModelFetcher for SourceFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if Self::is_remote(url) {
            self.http.fetch(url).await
        } else {
            self.file.fetch(url).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;

    /// Serve a single canned HTTP response on a loopback port
    fn serve_once(response: impl Into<String>) -> String {
        let response = response.into();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            stream.write_all(response.as_bytes()).unwrap();
        });

        format!("http://{}/models/statue.obj", address)
    }

    #[tokio::test]
    async fn test_http_fetch_body() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 8\r\nConnection: close\r\n\r\nv 1 2 3\n",
        );
        let text = HttpFetcher::new().fetch(&url).await.unwrap();
        assert_eq!(text, "v 1 2 3\n");
    }

    #[tokio::test]
    async fn test_http_fetch_large_body() {
        let body = "v 1.000000 2.000000 3.000000\n".repeat(420_000);
        assert!(body.len() > 10 * 1024 * 1024);

        let url = serve_once(format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        ));
        let text = HttpFetcher::new().fetch(&url).await.unwrap();
        assert_eq!(text.len(), body.len());
        assert!(text.ends_with("3.000000\n"));
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let url = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let err = HttpFetcher::new().fetch(&url).await.unwrap_err();

        match &err {
            FetchError::Status { code, reason } => {
                assert_eq!(*code, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("Expected status error, got {:?}", other),
        }
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_file_fetch() {
        let path = std::env::temp_dir().join(format!("poiview-fetch-{}.obj", std::process::id()));
        std::fs::write(&path, "v 0 0 0\n").unwrap();

        let text = FileFetcher.fetch(path.to_str().unwrap()).await.unwrap();
        assert_eq!(text, "v 0 0 0\n");

        let url = format!("file://{}", path.display());
        assert_eq!(SourceFetcher::new().fetch(&url).await.unwrap(), "v 0 0 0\n");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = FileFetcher.fetch("/definitely/not/here.obj").await.unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }

    #[test]
    fn test_is_remote() {
        assert!(SourceFetcher::is_remote("https://cdn.example.com/a.obj"));
        assert!(SourceFetcher::is_remote("HTTP://example.com/a.obj"));
        assert!(!SourceFetcher::is_remote("models/a.obj"));
        assert!(!SourceFetcher::is_remote("file:///tmp/a.obj"));
    }
}
