//! In-process stand-in for the books API.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::BooksApi;
use crate::error::{ClientError, Result};
use crate::types::{Book, CreateBookRequest, UpdateBookRequest};

#[derive(Default)]
pub(crate) struct FakeBooksApi {
    books: Mutex<Vec<Book>>,
    patches: Mutex<Vec<(String, UpdateBookRequest)>>,
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
    next_id: AtomicUsize,
    fail: AtomicBool,
}

impl FakeBooksApi {
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: Mutex::new(books),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        let api = Self::default();
        api.set_fail(true);
        api
    }

    pub fn book(book_id: &str, author: &str) -> Book {
        Book {
            user_id: "user-1".to_string(),
            book_id: book_id.to_string(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            author: author.to_string(),
            due_date: "2024-01-08".to_string(),
            done: false,
            attachment_url: None,
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn patches(&self) -> Vec<(String, UpdateBookRequest)> {
        self.patches.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ClientError::Response("500 Internal Server Error".to_string()));
        }
        Ok(())
    }
}

fn search_key(author: &str) -> String {
    author
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[async_trait]
impl BooksApi for FakeBooksApi {
    async fn get_books(&self, _id_token: &str) -> Result<Vec<Book>> {
        self.check()?;
        Ok(self.books.lock().unwrap().clone())
    }

    async fn search_books(&self, _id_token: &str, author: &str) -> Result<Vec<Book>> {
        self.check()?;
        let key = search_key(author);
        Ok(self
            .books
            .lock()
            .unwrap()
            .iter()
            .filter(|b| search_key(&b.author) == key)
            .cloned()
            .collect())
    }

    async fn create_book(&self, _id_token: &str, request: &CreateBookRequest) -> Result<Book> {
        self.check()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut book = Self::book(&format!("new-{}", id), &request.author);
        book.due_date = request.due_date.clone();
        self.books.lock().unwrap().push(book.clone());
        Ok(book)
    }

    async fn patch_book(
        &self,
        _id_token: &str,
        book_id: &str,
        request: &UpdateBookRequest,
    ) -> Result<()> {
        self.check()?;
        self.patches
            .lock()
            .unwrap()
            .push((book_id.to_string(), request.clone()));
        Ok(())
    }

    async fn delete_book(&self, _id_token: &str, book_id: &str) -> Result<()> {
        self.check()?;
        self.books.lock().unwrap().retain(|b| b.book_id != book_id);
        Ok(())
    }

    async fn get_upload_url(&self, _id_token: &str, book_id: &str) -> Result<String> {
        self.check()?;
        Ok(format!("https://covers.s3.amazonaws.com/{}?X-Amz-Signature=test", book_id))
    }

    async fn upload_file(&self, upload_url: &str, file: Vec<u8>) -> Result<()> {
        self.check()?;
        self.uploads
            .lock()
            .unwrap()
            .push((upload_url.to_string(), file));
        Ok(())
    }
}
