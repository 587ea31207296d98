use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};

use crate::error::BookError;

// ========== BOOK ==========
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub user_id: String,
    pub book_id: String,
    pub author: String,
    pub due_date: String,
    pub done: bool,
    pub created_at: String,
    pub normalized_author: String, // secondary index sort key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

impl Book {
    /// Build a book from a DynamoDB item. Key attributes are required,
    /// everything else falls back to a default.
    pub fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Self, BookError> {
        Ok(Self {
            user_id: required_string(item, "userId")?,
            book_id: required_string(item, "bookId")?,
            author: optional_string(item, "author").unwrap_or_default(),
            due_date: optional_string(item, "dueDate").unwrap_or_default(),
            done: item
                .get("done")
                .and_then(|v| v.as_bool().ok())
                .copied()
                .unwrap_or(false),
            created_at: optional_string(item, "createdAt").unwrap_or_default(),
            normalized_author: optional_string(item, "normalizedAuthor").unwrap_or_default(),
            attachment_url: optional_string(item, "attachmentUrl"),
        })
    }

    pub fn to_item(&self) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert("userId".to_string(), AttributeValue::S(self.user_id.clone()));
        item.insert("bookId".to_string(), AttributeValue::S(self.book_id.clone()));
        item.insert("author".to_string(), AttributeValue::S(self.author.clone()));
        item.insert("dueDate".to_string(), AttributeValue::S(self.due_date.clone()));
        item.insert("done".to_string(), AttributeValue::Bool(self.done));
        item.insert("createdAt".to_string(), AttributeValue::S(self.created_at.clone()));
        item.insert(
            "normalizedAuthor".to_string(),
            AttributeValue::S(self.normalized_author.clone()),
        );
        if let Some(url) = &self.attachment_url {
            item.insert("attachmentUrl".to_string(), AttributeValue::S(url.clone()));
        }
        item
    }
}

fn required_string(item: &HashMap<String, AttributeValue>, key: &str) -> Result<String, BookError> {
    optional_string(item, key)
        .ok_or_else(|| BookError::Storage(format!("Missing required attribute: {}", key)))
}

fn optional_string(item: &HashMap<String, AttributeValue>, key: &str) -> Option<String> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub author: String,
    pub due_date: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub author: String,
    pub due_date: String,
    pub done: bool,
}

/// The mutable subset of a book as written by the storage layer.
/// `normalized_author` is fixed at creation and not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct BookUpdate {
    pub author: String,
    pub due_date: String,
    pub done: bool,
}

impl CreateBookRequest {
    pub fn validate(&self) -> Result<(), BookError> {
        validate_fields(&self.author, &self.due_date)
    }
}

impl UpdateBookRequest {
    pub fn validate(&self) -> Result<(), BookError> {
        validate_fields(&self.author, &self.due_date)
    }
}

fn validate_fields(author: &str, due_date: &str) -> Result<(), BookError> {
    if author.trim().is_empty() {
        return Err(BookError::InvalidRequest("author must not be empty".to_string()));
    }
    if due_date.trim().is_empty() {
        return Err(BookError::InvalidRequest("dueDate must not be empty".to_string()));
    }
    Ok(())
}

// ========== RESPONSE ENVELOPES ==========
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemResponse {
    pub item: Book,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<Book>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
