//! In-memory stores for tests and local runs.
//!
//! These mirror the managed-store semantics closely enough for the
//! business logic and handlers to be exercised without AWS.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use tokio::sync::RwLock;

use crate::attachments::{public_object_url, AttachmentStore};
use crate::error::{BookError, Result};
use crate::storage::BookStore;
use crate::types::{Book, BookUpdate};

/// Book table held in a map keyed by `(userId, bookId)`.
#[derive(Default)]
pub struct MemoryBookStore {
    books: RwLock<BTreeMap<(String, String), Book>>,
    fail: RwLock<bool>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a storage error.
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }

    async fn check(&self) -> Result<()> {
        if *self.fail.read().await {
            return Err(BookError::Storage("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_by_author(&self, user_id: &str, normalized_author: &str) -> Result<Vec<Book>> {
        self.check().await?;
        Ok(self
            .books
            .read()
            .await
            .values()
            .filter(|b| b.user_id == user_id && b.normalized_author == normalized_author)
            .cloned()
            .collect())
    }

    async fn list_all(&self, user_id: &str) -> Result<Vec<Book>> {
        self.check().await?;
        Ok(self
            .books
            .read()
            .await
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get(&self, user_id: &str, book_id: &str) -> Result<Option<Book>> {
        self.check().await?;
        let key = (user_id.to_string(), book_id.to_string());
        Ok(self.books.read().await.get(&key).cloned())
    }

    async fn create(&self, book: Book) -> Result<Book> {
        self.check().await?;
        let key = (book.user_id.clone(), book.book_id.clone());
        self.books.write().await.insert(key, book.clone());
        Ok(book)
    }

    async fn update(&self, user_id: &str, book_id: &str, update: BookUpdate) -> Result<()> {
        self.check().await?;
        let key = (user_id.to_string(), book_id.to_string());
        let mut books = self.books.write().await;
        let book = books
            .get_mut(&key)
            .ok_or_else(|| BookError::NotFound(book_id.to_string()))?;
        book.author = update.author;
        book.due_date = update.due_date;
        book.done = update.done;
        Ok(())
    }

    async fn delete(&self, user_id: &str, book_id: &str) -> Result<()> {
        self.check().await?;
        let key = (user_id.to_string(), book_id.to_string());
        self.books.write().await.remove(&key);
        Ok(())
    }
}

/// Attachment store that hands out unsigned, deterministic upload URLs.
pub struct MemoryAttachmentStore {
    bucket_name: String,
    expiration: Duration,
}

impl MemoryAttachmentStore {
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            expiration: Duration::from_secs(300),
        }
    }
}

#[async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    fn attachment_url(&self, book_id: &str) -> String {
        public_object_url(&self.bucket_name, book_id)
    }

    async fn upload_url(&self, book_id: &str) -> Result<String> {
        Ok(format!(
            "https://{}.s3.amazonaws.com/{}?X-Amz-Expires={}&X-Amz-Signature=test",
            self.bucket_name,
            book_id,
            self.expiration.as_secs()
        ))
    }
}

/// `Authorization` header value carrying an unsigned token for `user_id`.
pub fn bearer_for(user_id: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({ "sub": user_id }).to_string());
    format!("Bearer {}.{}.signature", header, payload)
}
