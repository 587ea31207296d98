use async_trait::async_trait;

use crate::error::{ClientError, Result};
use crate::types::{
    Book, CreateBookRequest, ItemEnvelope, ItemsEnvelope, UpdateBookRequest, UploadUrlEnvelope,
};

/// Calls the books API on behalf of the signed-in user.
#[async_trait]
pub trait BooksApi: Send + Sync {
    async fn get_books(&self, id_token: &str) -> Result<Vec<Book>>;

    async fn search_books(&self, id_token: &str, author: &str) -> Result<Vec<Book>>;

    async fn create_book(&self, id_token: &str, request: &CreateBookRequest) -> Result<Book>;

    async fn patch_book(
        &self,
        id_token: &str,
        book_id: &str,
        request: &UpdateBookRequest,
    ) -> Result<()>;

    async fn delete_book(&self, id_token: &str, book_id: &str) -> Result<()>;

    async fn get_upload_url(&self, id_token: &str, book_id: &str) -> Result<String>;

    /// `PUT` the file straight to object storage through a signed URL.
    async fn upload_file(&self, upload_url: &str, file: Vec<u8>) -> Result<()>;
}

pub struct HttpBooksApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpBooksApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn search_endpoint(&self, author: &str) -> String {
        self.endpoint(&format!("/books/search/{}", urlencoding::encode(author)))
    }
}

fn bearer(id_token: &str) -> String {
    format!("Bearer {}", id_token)
}

#[async_trait]
impl BooksApi for HttpBooksApi {
    async fn get_books(&self, id_token: &str) -> Result<Vec<Book>> {
        tracing::debug!("Fetching books");
        let envelope: ItemsEnvelope = self
            .http
            .get(self.endpoint("/books"))
            .header("Authorization", bearer(id_token))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(envelope.items)
    }

    async fn search_books(&self, id_token: &str, author: &str) -> Result<Vec<Book>> {
        let envelope: ItemsEnvelope = self
            .http
            .get(self.search_endpoint(author))
            .header("Authorization", bearer(id_token))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(envelope.items)
    }

    async fn create_book(&self, id_token: &str, request: &CreateBookRequest) -> Result<Book> {
        let envelope: ItemEnvelope = self
            .http
            .post(self.endpoint("/books"))
            .header("Authorization", bearer(id_token))
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(envelope.item)
    }

    async fn patch_book(
        &self,
        id_token: &str,
        book_id: &str,
        request: &UpdateBookRequest,
    ) -> Result<()> {
        self.http
            .patch(self.endpoint(&format!("/books/{}", book_id)))
            .header("Authorization", bearer(id_token))
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_book(&self, id_token: &str, book_id: &str) -> Result<()> {
        self.http
            .delete(self.endpoint(&format!("/books/{}", book_id)))
            .header("Authorization", bearer(id_token))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn get_upload_url(&self, id_token: &str, book_id: &str) -> Result<String> {
        let envelope: UploadUrlEnvelope = self
            .http
            .post(self.endpoint(&format!("/books/{}/attachment", book_id)))
            .header("Authorization", bearer(id_token))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(envelope.upload_url)
    }

    async fn upload_file(&self, upload_url: &str, file: Vec<u8>) -> Result<()> {
        let status = self.http.put(upload_url).body(file).send().await?.status();
        if !status.is_success() {
            return Err(ClientError::Response(format!(
                "upload rejected with status {}",
                status
            )));
        }
        Ok(())
    }
}
