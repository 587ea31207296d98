pub mod types;
pub mod error;
pub mod config;
pub mod auth;
pub mod storage;
pub mod attachments;
pub mod books;
pub mod responses;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::sync::Arc;

use books::BookService;

/// Shared application state
pub struct AppState {
    pub books: BookService,
}

impl AppState {
    pub fn new(books: BookService) -> Arc<Self> {
        Arc::new(Self { books })
    }
}
