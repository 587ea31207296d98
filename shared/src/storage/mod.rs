//! Storage accessor for book records.
//!
//! Records live in a single table keyed by `(userId, bookId)` with a
//! secondary index on `(userId, normalizedAuthor)` for author search.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Book, BookUpdate};

pub mod dynamo;

pub use dynamo::DynamoBookStore;

/// Persistence operations used by the business layer.
///
/// Each call maps onto a single managed-store request, so the only
/// consistency guarantee is per-item atomicity.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Records whose normalized author equals `normalized_author`.
    async fn find_by_author(&self, user_id: &str, normalized_author: &str) -> Result<Vec<Book>>;

    async fn list_all(&self, user_id: &str) -> Result<Vec<Book>>;

    async fn get(&self, user_id: &str, book_id: &str) -> Result<Option<Book>>;

    async fn create(&self, book: Book) -> Result<Book>;

    /// Overwrite the mutable fields. Fails with `NotFound` instead of
    /// creating the record when the key does not exist.
    async fn update(&self, user_id: &str, book_id: &str, update: BookUpdate) -> Result<()>;

    async fn delete(&self, user_id: &str, book_id: &str) -> Result<()>;
}
