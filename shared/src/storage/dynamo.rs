//! DynamoDB BookStore implementation.
//!
//! Table schema:
//! - `userId` (String, partition key)
//! - `bookId` (String, sort key)
//! - secondary index: `userId` + `normalizedAuthor`

use std::collections::HashMap;
use std::future::Future;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::query::builders::QueryFluentBuilder;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use tracing::{debug, info};

use crate::error::{BookError, Result};
use crate::storage::BookStore;
use crate::types::{Book, BookUpdate};

type Item = HashMap<String, AttributeValue>;

/// One query page: its items and the key to resume from.
type Page = (Vec<Item>, Option<Item>);

pub struct DynamoBookStore {
    client: DynamoClient,
    table_name: String,
    search_index: String,
}

impl DynamoBookStore {
    pub fn new(
        client: DynamoClient,
        table_name: impl Into<String>,
        search_index: impl Into<String>,
    ) -> Self {
        let table_name = table_name.into();
        let search_index = search_index.into();
        info!(table = %table_name, index = %search_index, "Using DynamoDB for books");
        Self {
            client,
            table_name,
            search_index,
        }
    }

    /// Run a query to completion, following `LastEvaluatedKey` across pages.
    async fn collect_query(&self, query: QueryFluentBuilder) -> Result<Vec<Book>> {
        collect_pages(|start_key| {
            let request = query.clone().set_exclusive_start_key(start_key);
            async move {
                let output = request.send().await.map_err(|e| {
                    BookError::Storage(format!(
                        "DynamoDB query failed: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;
                let page: Page = (output.items.unwrap_or_default(), output.last_evaluated_key);
                Ok::<_, BookError>(page)
            }
        })
        .await
    }
}

/// Keep fetching while the previous page handed back a non-empty resume key.
async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Vec<Book>>
where
    F: FnMut(Option<Item>) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    let mut books = Vec::new();
    let mut start_key = None;

    loop {
        let (items, last_key) = fetch(start_key.take()).await?;
        for item in &items {
            books.push(Book::from_item(item)?);
        }

        match last_key {
            Some(key) if !key.is_empty() => start_key = Some(key),
            _ => break,
        }
    }

    Ok(books)
}

/// A failed `attribute_exists(bookId)` condition means the book is absent.
fn update_error(
    book_id: &str,
    service_error: Option<&UpdateItemError>,
    context: String,
) -> BookError {
    let missing = service_error
        .map(|se| se.is_conditional_check_failed_exception())
        .unwrap_or(false);
    if missing {
        BookError::NotFound(book_id.to_string())
    } else {
        BookError::Storage(format!("DynamoDB update_item failed: {}", context))
    }
}

#[async_trait]
impl BookStore for DynamoBookStore {
    async fn find_by_author(&self, user_id: &str, normalized_author: &str) -> Result<Vec<Book>> {
        let query = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(&self.search_index)
            .key_condition_expression("userId = :userId AND normalizedAuthor = :author")
            .expression_attribute_values(":userId", AttributeValue::S(user_id.to_string()))
            .expression_attribute_values(
                ":author",
                AttributeValue::S(normalized_author.to_string()),
            );

        let books = self.collect_query(query).await?;
        debug!(user_id = %user_id, author = %normalized_author, count = books.len(), "Searched books by author");
        Ok(books)
    }

    async fn list_all(&self, user_id: &str) -> Result<Vec<Book>> {
        let query = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("userId = :userId")
            .expression_attribute_values(":userId", AttributeValue::S(user_id.to_string()));

        let books = self.collect_query(query).await?;
        debug!(user_id = %user_id, count = books.len(), "Listed books");
        Ok(books)
    }

    async fn get(&self, user_id: &str, book_id: &str) -> Result<Option<Book>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .key("bookId", AttributeValue::S(book_id.to_string()))
            .send()
            .await
            .map_err(|e| {
                BookError::Storage(format!(
                    "DynamoDB get_item failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        result.item().map(Book::from_item).transpose()
    }

    async fn create(&self, book: Book) -> Result<Book> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(book.to_item()))
            .send()
            .await
            .map_err(|e| {
                BookError::Storage(format!(
                    "DynamoDB put_item failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!(user_id = %book.user_id, book_id = %book.book_id, "Stored book");
        Ok(book)
    }

    async fn update(&self, user_id: &str, book_id: &str, update: BookUpdate) -> Result<()> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .key("bookId", AttributeValue::S(book_id.to_string()))
            .condition_expression("attribute_exists(bookId)")
            .update_expression("SET #author = :author, dueDate = :dueDate, done = :done")
            .expression_attribute_names("#author", "author")
            .expression_attribute_values(":author", AttributeValue::S(update.author))
            .expression_attribute_values(":dueDate", AttributeValue::S(update.due_date))
            .expression_attribute_values(":done", AttributeValue::Bool(update.done))
            .send()
            .await
            .map_err(|e| {
                update_error(
                    book_id,
                    e.as_service_error(),
                    DisplayErrorContext(&e).to_string(),
                )
            })?;

        debug!(user_id = %user_id, book_id = %book_id, "Updated book");
        Ok(())
    }

    async fn delete(&self, user_id: &str, book_id: &str) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("userId", AttributeValue::S(user_id.to_string()))
            .key("bookId", AttributeValue::S(book_id.to_string()))
            .send()
            .await
            .map_err(|e| {
                BookError::Storage(format!(
                    "DynamoDB delete_item failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!(user_id = %user_id, book_id = %book_id, "Deleted book");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::error::{
        ConditionalCheckFailedException, ResourceNotFoundException,
    };

    fn item(book_id: &str) -> Item {
        Book {
            user_id: "user-1".to_string(),
            book_id: book_id.to_string(),
            author: "Jane Doe".to_string(),
            due_date: "2024-01-08".to_string(),
            done: false,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            normalized_author: "janedoe".to_string(),
            attachment_url: None,
        }
        .to_item()
    }

    fn resume_key(book_id: &str) -> Item {
        HashMap::from([
            ("userId".to_string(), AttributeValue::S("user-1".to_string())),
            ("bookId".to_string(), AttributeValue::S(book_id.to_string())),
        ])
    }

    #[tokio::test]
    async fn test_pages_are_followed_until_last_key_is_missing() {
        let mut pages = vec![
            (vec![item("b1"), item("b2")], Some(resume_key("b2"))),
            (vec![item("b3")], Some(resume_key("b3"))),
            (vec![item("b4")], None),
        ]
        .into_iter();
        let mut seen_keys = Vec::new();

        let books = collect_pages(|start_key| {
            seen_keys.push(start_key);
            std::future::ready(Ok(pages.next().unwrap()))
        })
        .await
        .unwrap();

        let ids: Vec<_> = books.iter().map(|b| b.book_id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2", "b3", "b4"]);
        assert_eq!(
            seen_keys,
            vec![None, Some(resume_key("b2")), Some(resume_key("b3"))]
        );
    }

    #[tokio::test]
    async fn test_empty_last_key_ends_paging() {
        let mut calls = 0;
        let books = collect_pages(|_| {
            calls += 1;
            std::future::ready(Ok((vec![item("b1")], Some(HashMap::new()))))
        })
        .await
        .unwrap();

        assert_eq!(books.len(), 1);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_page_error_stops_paging() {
        let mut calls = 0;
        let result = collect_pages(|_| {
            calls += 1;
            std::future::ready(if calls == 1 {
                Ok((vec![item("b1")], Some(resume_key("b1"))))
            } else {
                Err(BookError::Storage("throttled".to_string()))
            })
        })
        .await;

        assert!(matches!(result, Err(BookError::Storage(_))));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_failed_condition_maps_to_not_found() {
        let err = UpdateItemError::ConditionalCheckFailedException(
            ConditionalCheckFailedException::builder().build(),
        );
        let mapped = update_error("book-1", Some(&err), "condition failed".to_string());
        assert!(matches!(mapped, BookError::NotFound(id) if id == "book-1"));
    }

    #[test]
    fn test_other_update_failures_map_to_storage() {
        let err = UpdateItemError::ResourceNotFoundException(
            ResourceNotFoundException::builder().build(),
        );
        let mapped = update_error("book-1", Some(&err), "no table".to_string());
        assert!(matches!(mapped, BookError::Storage(msg) if msg.contains("no table")));

        let mapped = update_error("book-1", None, "timeout".to_string());
        assert!(matches!(mapped, BookError::Storage(_)));
    }
}
