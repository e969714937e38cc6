use std::{cell::RefCell, collections::HashMap, rc::Rc};

use classicwire::download::{DownloadOutcome, DownloadRequest, Downloader};

#[derive(Debug, Default)]
struct Shelf {
    requests: Vec<DownloadRequest>,
    finished: HashMap<String, DownloadOutcome>,
}

/// Downloader whose results are supplied by the test.
///
/// Clones share state.
#[derive(Clone, Debug, Default)]
pub struct FakeDownloader {
    shelf: Rc<RefCell<Shelf>>,
}

impl FakeDownloader {
    /// Create a downloader with no requests.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Requests filed so far.
    #[must_use]
    pub fn requests(&self) -> Vec<DownloadRequest> { self.shelf.borrow().requests.clone() }

    /// Make `outcome` available for `key` on the next poll.
    pub fn finish(&self, key: &str, outcome: DownloadOutcome) {
        self.shelf.borrow_mut().finished.insert(key.to_owned(), outcome);
    }
}

impl Downloader for FakeDownloader {
    fn request(&mut self, request: DownloadRequest) { self.shelf.borrow_mut().requests.push(request); }

    fn try_take(&mut self, key: &str) -> Option<DownloadOutcome> {
        self.shelf.borrow_mut().finished.remove(key)
    }
}
