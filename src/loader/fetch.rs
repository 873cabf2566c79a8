//! Retrieving model documents
//!
//! `http://` and `https://` URLs go through a blocking `ureq` agent; `file://`
//! URLs and plain paths are read from disk. Both paths enforce the same size
//! limit.

use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::ViewerConfig;
use crate::error::FetchError;

/// Source of model bytes. Implementations are called from worker threads.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Default fetcher for web URLs and local files
pub struct HttpFetcher {
    agent: ureq::Agent,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, max_bytes: u64) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            max_bytes,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.fetch_timeout, config.max_fetch_bytes)
    }

    fn read_limited(&self, url: &str, reader: impl Read) -> Result<Vec<u8>, FetchError> {
        let mut bytes = Vec::new();
        reader
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|source| FetchError::Io {
                url: url.to_string(),
                source,
            })?;

        if bytes.len() as u64 > self.max_bytes {
            return Err(FetchError::TooLarge {
                url: url.to_string(),
                limit: self.max_bytes,
            });
        }
        Ok(bytes)
    }

    fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.agent.get(url).call().map_err(|e| convert_error(url, e))?;
        self.read_limited(url, response.into_reader())
    }

    fn fetch_local(&self, url: &str, path: PathBuf) -> Result<Vec<u8>, FetchError> {
        let file = std::fs::File::open(&path).map_err(|source| FetchError::Io {
            url: url.to_string(),
            source,
        })?;
        self.read_limited(url, file)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::EmptyUrl);
        }

        log::info!("fetching {}", url);
        let bytes = match local_path(url) {
            Some(path) => self.fetch_local(url, path)?,
            None => self.fetch_remote(url)?,
        };
        log::debug!("fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes)
    }
}

/// Convert ureq error to FetchError
fn convert_error(url: &str, e: ureq::Error) -> FetchError {
    match e {
        ureq::Error::Status(status, _) => FetchError::Http {
            url: url.to_string(),
            status,
        },
        other => FetchError::Transport {
            url: url.to_string(),
            message: other.to_string(),
        },
    }
}

/// Filesystem path for `file://` URLs and scheme-less strings
fn local_path(url: &str) -> Option<PathBuf> {
    if let Some(path) = url.strip_prefix("file://") {
        return Some(PathBuf::from(path));
    }
    (!url.contains("://")).then(|| PathBuf::from(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fetcher(max_bytes: u64) -> HttpFetcher {
        HttpFetcher::new(Duration::from_secs(1), max_bytes)
    }

    #[test]
    fn test_local_path_detection() {
        assert_eq!(local_path("file:///tmp/a.glb"), Some(PathBuf::from("/tmp/a.glb")));
        assert_eq!(local_path("models/a.obj"), Some(PathBuf::from("models/a.obj")));
        assert_eq!(local_path("https://example.com/a.glb"), None);
    }

    #[test]
    fn test_reads_files_and_file_urls() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"v 0 0 0\n").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        assert_eq!(fetcher(1024).fetch(&path).unwrap(), b"v 0 0 0\n");
        let url = format!("file://{}", path);
        assert_eq!(fetcher(1024).fetch(&url).unwrap(), b"v 0 0 0\n");
    }

    #[test]
    fn test_size_limit_and_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 64]).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        assert!(matches!(
            fetcher(16).fetch(&path),
            Err(FetchError::TooLarge { limit: 16, .. })
        ));
        assert!(matches!(fetcher(16).fetch("   "), Err(FetchError::EmptyUrl)));
        assert!(matches!(
            fetcher(16).fetch("/definitely/not/here.glb"),
            Err(FetchError::Io { .. })
        ));
    }
}
