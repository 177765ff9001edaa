//! Content-addressed download cache for remote datasets.
//!
//! A remote resource is stored under a name derived from the SHA-256 of its URL.
//! When a known content hash is supplied the cached bytes are verified against it
//! and refreshed on mismatch.
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use sha2::{Digest, Sha256};

use crate::error::{Result, TrainedMlError};

static GLOBAL_CACHE: OnceLock<FetchCache> = OnceLock::new();

/// Platform cache directory for trainedml, falling back to `./.trainedml-cache`.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("trainedml"))
        .unwrap_or_else(|| PathBuf::from(".trainedml-cache"))
}

/// Initialize the process-wide cache. Re-initializing with the same directory is a no-op.
pub fn init_global<P: AsRef<Path>>(dir: P) -> Result<&'static FetchCache> {
    let dir = dir.as_ref().to_path_buf();
    if GLOBAL_CACHE.get().is_none() {
        let cache = FetchCache::new(&dir)?;
        if GLOBAL_CACHE.set(cache).is_err() {
            log::debug!("Cache initialized concurrently; checking its directory");
        }
    }
    let existing = GLOBAL_CACHE.get().ok_or(TrainedMlError::CacheNotInitialized)?;
    if existing.dir() != dir {
        return Err(TrainedMlError::invalid(
            "cache_dir",
            format!(
                "cache already initialized at {}",
                existing.dir().display()
            ),
        ));
    }
    Ok(existing)
}

/// The process-wide cache; fails until [`init_global`] has been called.
pub fn global() -> Result<&'static FetchCache> {
    GLOBAL_CACHE.get().ok_or(TrainedMlError::CacheNotInitialized)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[derive(Debug, Clone)]
pub struct FetchCache {
    dir: PathBuf,
}

impl FetchCache {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location a URL is cached at, whether or not it has been fetched yet.
    pub fn cached_path(&self, url: &str) -> PathBuf {
        let digest = sha256_hex(url.as_bytes());
        let basename = url
            .split(['?', '#'])
            .next()
            .and_then(|u| u.rsplit('/').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("download");
        let basename: String = basename
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}-{}", &digest[..16], basename))
    }

    /// Return the bytes for `url`, downloading only when no valid cached copy exists.
    pub fn fetch(&self, url: &str, known_hash: Option<&str>) -> Result<Vec<u8>> {
        let path = self.cached_path(url);
        if path.exists() {
            let bytes = fs::read(&path)?;
            match known_hash {
                Some(expected) if !hash_matches(&bytes, expected) => {
                    log::warn!(
                        "Cached copy of {} does not match the expected hash; downloading again",
                        url
                    );
                }
                _ => {
                    log::debug!("Using cached {} at {}", url, path.display());
                    return Ok(bytes);
                }
            }
        }

        log::info!("Downloading {}", url);
        let bytes = download(url)?;
        if let Some(expected) = known_hash {
            if !hash_matches(&bytes, expected) {
                return Err(TrainedMlError::Fetch {
                    location: url.to_string(),
                    message: format!(
                        "content hash {} does not match expected {}",
                        sha256_hex(&bytes),
                        expected
                    ),
                });
            }
        }

        let partial = path.with_extension("part");
        fs::write(&partial, &bytes)?;
        fs::rename(&partial, &path)?;
        log::debug!("Cached {} ({} bytes) at {}", url, bytes.len(), path.display());
        Ok(bytes)
    }
}

fn hash_matches(bytes: &[u8], expected: &str) -> bool {
    let expected = expected.trim().trim_start_matches("sha256:").to_lowercase();
    sha256_hex(bytes) == expected
}

fn download(url: &str) -> Result<Vec<u8>> {
    let fetch_err = |e: ureq::Error| TrainedMlError::Fetch {
        location: url.to_string(),
        message: e.to_string(),
    };
    let mut response = ureq::get(url).call().map_err(fetch_err)?;
    response.body_mut().read_to_vec().map_err(fetch_err)
}
