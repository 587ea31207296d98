use std::sync::Arc;

use chrono::{SecondsFormat, Utc};

use crate::attachments::AttachmentStore;
use crate::error::{BookError, Result};
use crate::storage::BookStore;
use crate::types::{Book, BookUpdate, CreateBookRequest, UpdateBookRequest};

/// Search key for an author: lowercase with all whitespace removed.
pub fn normalize_author(author: &str) -> String {
    author
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Book operations on behalf of a single caller.
#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn BookStore>,
    attachments: Arc<dyn AttachmentStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn BookStore>, attachments: Arc<dyn AttachmentStore>) -> Self {
        Self { store, attachments }
    }

    pub async fn create_book(&self, request: CreateBookRequest, user_id: &str) -> Result<Book> {
        request.validate()?;

        let book_id = uuid::Uuid::new_v4().to_string();
        let book = Book {
            user_id: user_id.to_string(),
            attachment_url: Some(self.attachments.attachment_url(&book_id)),
            book_id,
            normalized_author: normalize_author(&request.author),
            author: request.author,
            due_date: request.due_date,
            done: false,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };

        tracing::info!(user_id = %user_id, book_id = %book.book_id, "Creating book");
        self.store.create(book).await
    }

    pub async fn list_books(&self, user_id: &str) -> Result<Vec<Book>> {
        self.store.list_all(user_id).await
    }

    /// Case- and whitespace-insensitive exact match on the author.
    pub async fn search_books(&self, user_id: &str, author: &str) -> Result<Vec<Book>> {
        let key = normalize_author(author);
        if key.is_empty() {
            return Err(BookError::InvalidRequest(
                "author search term must not be empty".to_string(),
            ));
        }
        self.store.find_by_author(user_id, &key).await
    }

    pub async fn get_book(&self, user_id: &str, book_id: &str) -> Result<Book> {
        self.store
            .get(user_id, book_id)
            .await?
            .ok_or_else(|| BookError::NotFound(book_id.to_string()))
    }

    /// Overwrite author, due date and done flag. The search key keeps the
    /// author the book was created with.
    pub async fn update_book(
        &self,
        book_id: &str,
        request: UpdateBookRequest,
        user_id: &str,
    ) -> Result<()> {
        request.validate()?;

        let existing = self.get_book(user_id, book_id).await?;
        let update = BookUpdate {
            author: request.author,
            due_date: request.due_date,
            done: request.done,
        };

        tracing::info!(user_id = %user_id, book_id = %book_id, done = update.done, "Updating book");
        self.store
            .update(&existing.user_id, &existing.book_id, update)
            .await
    }

    pub async fn delete_book(&self, user_id: &str, book_id: &str) -> Result<()> {
        tracing::info!(user_id = %user_id, book_id = %book_id, "Deleting book");
        self.store.delete(user_id, book_id).await
    }

    /// Signed upload URL for the caller's own book.
    pub async fn create_attachment_url(&self, user_id: &str, book_id: &str) -> Result<String> {
        let book = self.get_book(user_id, book_id).await?;
        self.attachments.upload_url(&book.book_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemoryAttachmentStore, MemoryBookStore};

    fn service() -> BookService {
        BookService::new(
            Arc::new(MemoryBookStore::new()),
            Arc::new(MemoryAttachmentStore::new("covers")),
        )
    }

    fn create_request(author: &str) -> CreateBookRequest {
        CreateBookRequest {
            author: author.to_string(),
            due_date: "2024-06-08".to_string(),
        }
    }

    #[test]
    fn test_normalize_author() {
        assert_eq!(normalize_author("Jane Doe"), "janedoe");
        assert_eq!(normalize_author("  JANE\tdoe \n"), "janedoe");
        assert_eq!(normalize_author("Émile Zola"), "émilezola");
        assert_eq!(normalize_author("   "), "");
    }

    #[tokio::test]
    async fn test_created_book_is_listed_with_defaults() {
        let service = service();
        let created = service
            .create_book(create_request("Jane Doe"), "user-1")
            .await
            .unwrap();

        assert!(!created.done);
        assert_eq!(created.normalized_author, "janedoe");
        assert_eq!(
            created.attachment_url.as_deref(),
            Some(format!("http://covers.s3.amazonaws.com/{}", created.book_id).as_str())
        );

        let books = service.list_books("user-1").await.unwrap();
        assert_eq!(books, vec![created]);
    }

    #[tokio::test]
    async fn test_created_ids_are_unique() {
        let service = service();
        let a = service.create_book(create_request("A"), "user-1").await.unwrap();
        let b = service.create_book(create_request("A"), "user-1").await.unwrap();
        assert_ne!(a.book_id, b.book_id);
    }

    #[tokio::test]
    async fn test_search_ignores_case_and_spaces() {
        let service = service();
        let created = service
            .create_book(create_request("jane doe"), "user-1")
            .await
            .unwrap();
        service
            .create_book(create_request("John Roe"), "user-1")
            .await
            .unwrap();

        let found = service.search_books("user-1", "Jane Doe").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].book_id, created.book_id);

        let found = service.search_books("user-1", "JANEDOE").await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_search_is_rejected() {
        let service = service();
        let err = service.search_books("user-1", "  ").await.unwrap_err();
        assert!(matches!(err, BookError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_update_changes_only_mutable_fields() {
        let service = service();
        let created = service
            .create_book(create_request("Jane Doe"), "user-1")
            .await
            .unwrap();

        service
            .update_book(
                &created.book_id,
                UpdateBookRequest {
                    author: "Mary Shelley".to_string(),
                    due_date: "2024-07-01".to_string(),
                    done: true,
                },
                "user-1",
            )
            .await
            .unwrap();

        let updated = service.get_book("user-1", &created.book_id).await.unwrap();
        assert_eq!(updated.author, "Mary Shelley");
        assert_eq!(updated.due_date, "2024-07-01");
        assert!(updated.done);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.attachment_url, created.attachment_url);
        assert_eq!(updated.normalized_author, "janedoe");

        // search key still follows the author given at creation
        let found = service.search_books("user-1", "jane doe").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].author, "Mary Shelley");
        assert!(service
            .search_books("user-1", "mary shelley")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_book_fails() {
        let service = service();
        let err = service
            .update_book(
                "missing",
                UpdateBookRequest {
                    author: "Anyone".to_string(),
                    due_date: "2024-07-01".to_string(),
                    done: false,
                },
                "user-1",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookError::NotFound(_)));
        assert!(service.list_books("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_book() {
        let service = service();
        let created = service
            .create_book(create_request("Jane Doe"), "user-1")
            .await
            .unwrap();

        service.delete_book("user-1", &created.book_id).await.unwrap();
        assert!(service.list_books("user-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let service = service();
        let mine = service
            .create_book(create_request("Jane Doe"), "user-1")
            .await
            .unwrap();
        service
            .create_book(create_request("Jane Doe"), "user-2")
            .await
            .unwrap();

        let listed = service.list_books("user-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].book_id, mine.book_id);

        let found = service.search_books("user-2", "jane doe").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].user_id, "user-2");

        // another user cannot touch the record
        let err = service
            .update_book(
                &mine.book_id,
                UpdateBookRequest {
                    author: "Hijack".to_string(),
                    due_date: "2024-07-01".to_string(),
                    done: true,
                },
                "user-2",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BookError::NotFound(_)));

        service.delete_book("user-2", &mine.book_id).await.unwrap();
        assert_eq!(service.list_books("user-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_attachment_url_requires_owned_book() {
        let service = service();
        let created = service
            .create_book(create_request("Jane Doe"), "user-1")
            .await
            .unwrap();

        let url = service
            .create_attachment_url("user-1", &created.book_id)
            .await
            .unwrap();
        assert!(url.contains(&created.book_id));

        let err = service
            .create_attachment_url("user-2", &created.book_id)
            .await
            .unwrap_err();
        assert!(matches!(err, BookError::NotFound(_)));
    }
}
