use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING};
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::core::config::Resource;
use crate::core::error::{LauncherError, LauncherResult};

const APP_USER_AGENT: &str = concat!("haven-launch/", env!("CARGO_PKG_VERSION"));

/// Fetches launch resources into a local cache, checking their validators.
pub struct Downloader {
    client: Client,
    cache_dir: PathBuf,
    /// Maximum number of parallel downloads.
    concurrency: usize,
}

impl Downloader {
    pub fn new(cache_dir: impl Into<PathBuf>) -> LauncherResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .default_headers(default_headers)
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
            concurrency: 8,
        })
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Local cache location for a remote URI: `<cache>/<host>[_port]/<path>`.
    ///
    /// A query adds a `q-<digest>` directory after the host so that URIs
    /// differing only in their query never share a file.
    pub fn cache_path(&self, uri: &Url) -> PathBuf {
        let mut host = uri.host_str().unwrap_or("local").to_string();
        if let Some(port) = uri.port() {
            host = format!("{host}_{port}");
        }
        let mut path = self.cache_dir.join(host);
        if let Some(query) = uri.query() {
            let digest = hex::encode(Sha1::digest(query.as_bytes()));
            path.push(format!("q-{}", &digest[..16]));
        }
        let segments: Vec<&str> = uri
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty() && *seg != "..").collect())
            .unwrap_or_default();
        for seg in &segments {
            path.push(seg);
        }
        if segments.is_empty() || uri.path().ends_with('/') {
            path.push("index");
        }
        path
    }

    // ── Single resource ─────────────────────────────────

    /// Make `res` available locally and return its path.
    ///
    /// `file:` resources are used in place. Remote resources are downloaded
    /// unless a cached copy exists and passes the resource's validators.
    pub async fn fetch(&self, res: &Resource) -> LauncherResult<PathBuf> {
        match res.uri.scheme() {
            "file" => {
                let path = res.uri.to_file_path().map_err(|_| {
                    LauncherError::Other(format!("not a local file path: {}", res.uri))
                })?;
                let bytes = read_file(&path).await?;
                validate(res, &bytes)?;
                Ok(path)
            }
            "http" | "https" => {
                let dest = self.cache_path(&res.uri);
                if !res.validators.is_empty() && dest.exists() {
                    let cached = read_file(&dest).await?;
                    if validate(res, &cached).is_ok() {
                        debug!("Cache hit: {} -> {:?}", res.uri, dest);
                        return Ok(dest);
                    }
                }
                self.download(res, &dest).await?;
                Ok(dest)
            }
            other => Err(LauncherError::UnsupportedScheme(format!("{other} ({})", res.uri))),
        }
    }

    async fn download(&self, res: &Resource, dest: &Path) -> LauncherResult<()> {
        let response = self.client.get(res.uri.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: res.uri.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        validate(res, &bytes)?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| LauncherError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }
        // Drop the handle before anyone reopens the file.
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|source| LauncherError::Io {
                    path: dest.to_path_buf(),
                    source,
                })?;
            file.write_all(&bytes)
                .await
                .map_err(|source| LauncherError::Io {
                    path: dest.to_path_buf(),
                    source,
                })?;
            file.flush().await.map_err(|source| LauncherError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
        }

        info!("Downloaded {} ({} bytes)", res.uri, bytes.len());
        Ok(())
    }

    // ── Batch fetch ─────────────────────────────────────

    /// Fetch many resources concurrently. Paths come back in input order;
    /// the first failure aborts the batch.
    pub async fn fetch_all(&self, resources: &[Resource]) -> LauncherResult<Vec<PathBuf>> {
        debug!(
            "Fetching {} resources, concurrency={}",
            resources.len(),
            self.concurrency
        );
        stream::iter(resources)
            .map(|res| self.fetch(res))
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}

fn validate(res: &Resource, bytes: &[u8]) -> LauncherResult<()> {
    for validator in res.validators.iter() {
        validator.check(res.uri.as_str(), bytes)?;
    }
    Ok(())
}

async fn read_file(path: &Path) -> LauncherResult<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|source| LauncherError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validate::Validator;
    use std::sync::Arc;

    const HELLO_SHA1: &str = "sha1:aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d";

    fn local(path: &Path, validators: Vec<Validator>) -> Resource {
        Resource::new(Url::from_file_path(path).unwrap(), Arc::from(validators))
    }

    fn hello_validator() -> Validator {
        Validator::parse(HELLO_SHA1).unwrap().unwrap()
    }

    #[test]
    fn cache_path_mirrors_host_and_path() {
        let dl = Downloader::new("/cache").unwrap();
        let uri = Url::parse("https://example.com:8443/game/lib/a.jar").unwrap();
        assert_eq!(
            dl.cache_path(&uri),
            PathBuf::from("/cache/example.com_8443/game/lib/a.jar")
        );
        let dir = Url::parse("https://example.com/game/").unwrap();
        assert_eq!(dl.cache_path(&dir), PathBuf::from("/cache/example.com/game/index"));
    }

    #[test]
    fn cache_path_keeps_queries_apart() {
        let dl = Downloader::new("/cache").unwrap();
        let a = dl.cache_path(&Url::parse("https://example.com/get?f=a.jar").unwrap());
        let b = dl.cache_path(&Url::parse("https://example.com/get?f=b.jar").unwrap());
        let plain = dl.cache_path(&Url::parse("https://example.com/get").unwrap());
        assert_ne!(a, b);
        assert_ne!(a, plain);
        assert!(a.starts_with("/cache/example.com"));
        assert!(a.ends_with("get"));
    }

    #[tokio::test]
    async fn local_files_are_used_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "hello").unwrap();

        let dl = Downloader::new(dir.path().join("cache")).unwrap();
        let fetched = dl.fetch(&local(&path, vec![hello_validator()])).await.unwrap();
        assert_eq!(fetched, path);
    }

    #[tokio::test]
    async fn local_files_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, "tampered").unwrap();

        let dl = Downloader::new(dir.path().join("cache")).unwrap();
        let err = dl
            .fetch(&local(&path, vec![hello_validator()]))
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn missing_local_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let dl = Downloader::new(dir.path().join("cache")).unwrap();
        let err = dl
            .fetch(&local(&dir.path().join("absent"), vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, LauncherError::Io { .. }));
    }

    #[tokio::test]
    async fn valid_cached_copy_skips_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let dl = Downloader::new(dir.path()).unwrap();
        // Port 9 on localhost is never contacted when the cache is valid.
        let res = Resource::new(
            Url::parse("http://127.0.0.1:9/hello.txt").unwrap(),
            Arc::from(vec![hello_validator()]),
        );
        let cached = dl.cache_path(&res.uri);
        std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
        std::fs::write(&cached, "hello").unwrap();

        assert_eq!(dl.fetch(&res).await.unwrap(), cached);
    }

    #[tokio::test]
    async fn unsupported_schemes_are_rejected() {
        let dl = Downloader::new("/nonexistent").unwrap();
        let res = Resource::new(Url::parse("ftp://example.com/a.jar").unwrap(), Arc::from(vec![]));
        assert!(matches!(
            dl.fetch(&res).await,
            Err(LauncherError::UnsupportedScheme(_))
        ));
    }

    #[tokio::test]
    async fn fetch_all_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut resources = Vec::new();
        let mut expected = Vec::new();
        for name in ["c.jar", "a.jar", "b.jar"] {
            let path = dir.path().join(name);
            std::fs::write(&path, name).unwrap();
            resources.push(local(&path, vec![]));
            expected.push(path);
        }

        let dl = Downloader::new(dir.path().join("cache"))
            .unwrap()
            .with_concurrency(2);
        assert_eq!(dl.fetch_all(&resources).await.unwrap(), expected);
    }
}
