//! Texture pack requests and completion polling.

mod common;

use classicwire::{
    ConnectionBuilder,
    TraceCodec,
    download::{self, DownloadOutcome},
};
use classicwire_testing::FakeDownloader;
use common::{Harness, TICK};
use rstest::rstest;

#[rstest]
#[case::zip("http://example.com/pack.ZIP", download::TEXTURE_PACK)]
#[case::png("http://example.com/terrain.png", download::TERRAIN)]
fn request_key_depends_on_extension(#[case] url: &str, #[case] key: &str) {
    let downloads = FakeDownloader::new();
    let mut h = Harness::active(ConnectionBuilder::new(TraceCodec::new()).downloader(downloads.clone()));
    h.connection.download_texture_pack(url, None, Some("etag-1".to_owned()));

    let requests = downloads.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].key, key);
    assert_eq!(requests[0].url, url);
    assert_eq!(requests[0].etag.as_deref(), Some("etag-1"));
}

#[rstest]
#[case::not_found(Some(404), 1)]
#[case::not_modified(Some(304), 0)]
#[case::no_response(None, 0)]
fn failed_download_warns_for_real_statuses(#[case] status: Option<u16>, #[case] warnings: usize) {
    let downloads = FakeDownloader::new();
    let mut h = Harness::active(ConnectionBuilder::new(TraceCodec::new()).downloader(downloads.clone()));
    downloads.finish(download::TEXTURE_PACK, DownloadOutcome::Failed { status });
    h.connection.tick(TICK);

    let seen = h.events.warnings();
    assert_eq!(seen.len(), warnings);
    if let Some(message) = seen.first() {
        assert_eq!(message, "404 error when trying to download texture pack");
    }
}

#[test]
fn outcomes_are_polled_only_on_maintenance_ticks() {
    let downloads = FakeDownloader::new();
    let mut h = Harness::active(ConnectionBuilder::new(TraceCodec::new()).downloader(downloads.clone()));
    h.connection.tick(TICK);
    downloads.finish(download::TERRAIN, DownloadOutcome::Failed { status: Some(500) });

    h.connection.tick(TICK);
    h.connection.tick(TICK);
    assert!(h.events.warnings().is_empty());
    h.connection.tick(TICK);
    assert_eq!(h.events.warnings().len(), 1);
}
