//! Interface to the asynchronous resource fetcher.
//!
//! The engine never waits on a download. It files requests and polls for
//! results once per maintenance cycle.

use std::time::SystemTime;

use bytes::Bytes;

/// Key under which texture pack zips are fetched.
pub const TEXTURE_PACK: &str = "texturePack";
/// Key under which single terrain images are fetched.
pub const TERRAIN: &str = "terrain";

/// A fetch request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Result slot the outcome is filed under.
    pub key: String,
    /// Resource location.
    pub url: String,
    /// Cached copy's modification time, for conditional requests.
    pub last_modified: Option<SystemTime>,
    /// Cached copy's entity tag, for conditional requests.
    pub etag: Option<String>,
}

impl DownloadRequest {
    /// Unconditional request for `url` under `key`.
    #[must_use]
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
            last_modified: None,
            etag: None,
        }
    }
}

/// Result of a finished fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The body was fetched.
    Completed(Bytes),
    /// The fetch failed. `status` is the HTTP status, if one was received.
    Failed {
        /// HTTP status code.
        status: Option<u16>,
    },
}

impl DownloadOutcome {
    /// Failures worth telling the user about. Missing statuses and
    /// `304 Not Modified` are silent.
    #[must_use]
    pub fn reportable_status(&self) -> Option<u16> {
        match self {
            Self::Failed {
                status: Some(status),
            } if *status != 0 && *status != 304 => Some(*status),
            _ => None,
        }
    }
}

/// Asynchronous fetcher polled by the engine.
pub trait Downloader {
    /// File a fetch request.
    fn request(&mut self, request: DownloadRequest);

    /// Take the outcome for `key` if it has finished.
    fn try_take(&mut self, key: &str) -> Option<DownloadOutcome>;
}

/// Downloader that accepts requests and never completes them.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDownloads;

impl Downloader for NoDownloads {
    fn request(&mut self, request: DownloadRequest) {
        tracing::debug!(key = %request.key, url = %request.url, "no downloader configured; dropping request");
    }

    fn try_take(&mut self, _key: &str) -> Option<DownloadOutcome> { None }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::no_status(None, None)]
    #[case::zero(Some(0), None)]
    #[case::not_modified(Some(304), None)]
    #[case::not_found(Some(404), Some(404))]
    fn only_real_failures_are_reported(#[case] status: Option<u16>, #[case] expected: Option<u16>) {
        assert_eq!(DownloadOutcome::Failed { status }.reportable_status(), expected);
    }
}
