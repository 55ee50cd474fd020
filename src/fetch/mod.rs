//! Repository snapshot retrieval
//!
//! A validated [`RepoRequest`] is turned into zip bytes by an
//! [`ArchiveFetcher`]: over HTTP from a GitHub-style host, or from a zip file
//! already on disk.

pub mod archive;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub use archive::{read_zip_entries, ArchiveError, EntryBody, ZipEntries};

/// Input rejected before any fetch is attempted.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Repository URL cannot be empty")]
    EmptyUrl,

    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme { scheme: String },

    #[error("Branch or tag cannot be empty")]
    EmptyBranch,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read archive {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A repository URL and branch/tag that passed boundary validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRequest {
    repo_url: String,
    branch: String,
}

impl RepoRequest {
    pub fn new(repo_url: &str, branch: &str) -> Result<Self, RequestError> {
        let repo_url = repo_url.trim().trim_end_matches('/');
        if repo_url.is_empty() {
            return Err(RequestError::EmptyUrl);
        }

        let parsed = reqwest::Url::parse(repo_url).map_err(|err| RequestError::InvalidUrl {
            url: repo_url.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RequestError::UnsupportedScheme { scheme: parsed.scheme().to_string() });
        }

        let branch = branch.trim();
        if branch.is_empty() {
            return Err(RequestError::EmptyBranch);
        }

        Ok(Self { repo_url: repo_url.to_string(), branch: branch.to_string() })
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Zip download location for this branch.
    pub fn archive_url(&self) -> String {
        format!("{}/archive/refs/heads/{}.zip", self.repo_url, self.branch)
    }
}

/// Source of repository archive bytes.
pub trait ArchiveFetcher {
    /// Human-readable location the bytes come from, for progress messages.
    fn location(&self, request: &RepoRequest) -> String;

    fn fetch(&self, request: &RepoRequest) -> Result<Vec<u8>, FetchError>;
}

/// Downloads `{repo}/archive/refs/heads/{branch}.zip` with a blocking client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("repo2llm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn location(&self, request: &RepoRequest) -> String {
        request.archive_url()
    }

    fn fetch(&self, request: &RepoRequest) -> Result<Vec<u8>, FetchError> {
        let url = request.archive_url();
        info!(%url, "downloading repository archive");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| FetchError::Request { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status: status.as_u16() });
        }

        let bytes =
            response.bytes().map_err(|source| FetchError::Request { url: url.clone(), source })?;
        debug!(%url, bytes = bytes.len(), "archive downloaded");
        Ok(bytes.to_vec())
    }
}

/// Reads a previously downloaded archive from disk.
pub struct LocalArchiveFetcher {
    path: PathBuf,
}

impl LocalArchiveFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArchiveFetcher for LocalArchiveFetcher {
    fn location(&self, _request: &RepoRequest) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self, _request: &RepoRequest) -> Result<Vec<u8>, FetchError> {
        fs::read(&self.path).map_err(|source| FetchError::Io { path: self.path.clone(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::{SocketAddr, TcpListener};
    use std::thread;

    /// Serve one HTTP response on a local port, returning its address.
    fn serve_once(response: &'static [u8]) -> (SocketAddr, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut line = String::new();
            while reader.read_line(&mut line).expect("read request") > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            stream.write_all(response).expect("write response");
        });
        (addr, handle)
    }

    fn local_request(addr: SocketAddr) -> RepoRequest {
        RepoRequest::new(&format!("http://{addr}/acme/widgets"), "main").expect("valid")
    }

    fn fetcher() -> HttpFetcher {
        // Loopback traffic must not go through a proxy from the environment.
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(5))
            .no_proxy()
            .build()
            .expect("client");
        HttpFetcher { client }
    }

    #[test]
    fn http_fetcher_returns_body_on_success() {
        let (addr, server) =
            serve_once(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\nPK\x03\x04");
        let bytes = fetcher().fetch(&local_request(addr)).expect("download");
        server.join().expect("server thread");
        assert_eq!(bytes, b"PK\x03\x04");
    }

    #[test]
    fn http_fetcher_maps_error_status() {
        let (addr, server) = serve_once(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let request = local_request(addr);
        let err = fetcher().fetch(&request).expect_err("missing branch");
        server.join().expect("server thread");

        match err {
            FetchError::Status { url, status } => {
                assert_eq!(status, 404);
                assert_eq!(url, request.archive_url());
            }
            other => panic!("expected status error, got {other}"),
        }
    }

    #[test]
    fn http_fetcher_reports_unreachable_host() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .expect("free port");
        let err = fetcher().fetch(&local_request(addr)).expect_err("nothing listening");
        assert!(matches!(err, FetchError::Request { .. }), "unexpected error {err}");
    }

    #[test]
    fn archive_url_follows_github_layout() {
        let request = RepoRequest::new("https://github.com/acme/widgets/", "main").expect("valid");
        assert_eq!(request.repo_url(), "https://github.com/acme/widgets");
        assert_eq!(
            request.archive_url(),
            "https://github.com/acme/widgets/archive/refs/heads/main.zip"
        );
    }

    #[test]
    fn rejects_empty_and_invalid_input() {
        assert_eq!(RepoRequest::new("   ", "main"), Err(RequestError::EmptyUrl));
        assert!(matches!(
            RepoRequest::new("not a url", "main"),
            Err(RequestError::InvalidUrl { .. })
        ));
        assert_eq!(
            RepoRequest::new("ftp://example.com/repo", "main"),
            Err(RequestError::UnsupportedScheme { scheme: "ftp".to_string() })
        );
        assert_eq!(
            RepoRequest::new("https://github.com/acme/widgets", " "),
            Err(RequestError::EmptyBranch)
        );
    }

    #[test]
    fn local_fetcher_reports_missing_file() {
        let request = RepoRequest::new("https://github.com/acme/widgets", "main").expect("valid");
        let fetcher = LocalArchiveFetcher::new("/definitely/not/here.zip");
        let err = fetcher.fetch(&request).expect_err("missing file");
        assert!(matches!(err, FetchError::Io { .. }));
    }
}
