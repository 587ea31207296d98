use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub user_id: String,
    pub book_id: String,
    pub created_at: String,
    pub author: String,
    pub due_date: String,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookRequest {
    pub author: String,
    pub due_date: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookRequest {
    pub author: String,
    pub due_date: String,
    pub done: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemEnvelope {
    pub item: Book,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ItemsEnvelope {
    pub items: Vec<Book>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadUrlEnvelope {
    pub upload_url: String,
}
