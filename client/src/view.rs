use chrono::{Days, Local, NaiveDate};

use crate::api::BooksApi;
use crate::types::{Book, CreateBookRequest, UpdateBookRequest};

/// Due date for a new book: one week after `today`, as `yyyy-mm-dd`.
pub fn calculate_due_date(today: NaiveDate) -> String {
    let due = today.checked_add_days(Days::new(7)).unwrap_or(today);
    due.format("%Y-%m-%d").to_string()
}

/// Everything the books page renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct BooksState {
    pub books: Vec<Book>,
    pub new_author_name: String,
    pub loading_books: bool,
    pub delete_modal_open: bool,
    pub pending_delete_id: Option<String>,
    pub search_author: String,
    /// Message for the blocking alert, if one is showing.
    pub alert: Option<String>,
}

impl Default for BooksState {
    fn default() -> Self {
        Self {
            books: Vec::new(),
            new_author_name: String::new(),
            loading_books: true,
            delete_modal_open: false,
            pending_delete_id: None,
            search_author: String::new(),
            alert: None,
        }
    }
}

/// The books list page. Requests run one at a time from user actions and
/// failures only raise an alert.
pub struct BooksView<A: BooksApi> {
    api: A,
    id_token: String,
    state: BooksState,
}

impl<A: BooksApi> BooksView<A> {
    pub fn new(api: A, id_token: impl Into<String>) -> Self {
        Self {
            api,
            id_token: id_token.into(),
            state: BooksState::default(),
        }
    }

    pub fn state(&self) -> &BooksState {
        &self.state
    }

    pub fn set_new_author_name(&mut self, name: impl Into<String>) {
        self.state.new_author_name = name.into();
    }

    pub fn set_search_author(&mut self, author: impl Into<String>) {
        self.state.search_author = author.into();
    }

    pub fn dismiss_alert(&mut self) {
        self.state.alert = None;
    }

    /// Initial load of the caller's books.
    pub async fn mount(&mut self) {
        match self.api.get_books(&self.id_token).await {
            Ok(books) => {
                self.state.books = books;
                self.state.loading_books = false;
            }
            Err(e) => self.alert(format!("Failed to fetch books: {}", e)),
        }
    }

    /// Empty search text reloads everything, anything else searches by author.
    pub async fn search(&mut self) {
        self.state.loading_books = true;

        let result = if self.state.search_author.trim().is_empty() {
            self.api.get_books(&self.id_token).await
        } else {
            self.api
                .search_books(&self.id_token, &self.state.search_author)
                .await
        };

        self.state.loading_books = false;
        match result {
            Ok(books) => self.state.books = books,
            Err(e) => {
                tracing::warn!("Book search failed: {}", e);
                self.alert("Book search failed");
            }
        }
    }

    pub async fn create(&mut self) {
        self.create_on(Local::now().date_naive()).await
    }

    /// Create a book due a week after `today` and append it locally.
    pub async fn create_on(&mut self, today: NaiveDate) {
        let request = CreateBookRequest {
            author: self.state.new_author_name.clone(),
            due_date: calculate_due_date(today),
        };

        match self.api.create_book(&self.id_token, &request).await {
            Ok(book) => {
                self.state.books.push(book);
                self.state.new_author_name.clear();
            }
            Err(e) => {
                tracing::warn!("Book creation failed: {}", e);
                self.alert("Book creation failed");
            }
        }
    }

    /// Flip the done flag of the book at `pos`. Local state is patched
    /// without re-reading the record from the server.
    pub async fn toggle_done(&mut self, pos: usize) {
        let Some(book) = self.state.books.get(pos) else {
            return;
        };
        let book_id = book.book_id.clone();
        let request = UpdateBookRequest {
            author: book.author.clone(),
            due_date: book.due_date.clone(),
            done: !book.done,
        };

        match self.api.patch_book(&self.id_token, &book_id, &request).await {
            Ok(()) => {
                if let Some(book) = self.state.books.get_mut(pos) {
                    book.done = request.done;
                }
            }
            Err(e) => {
                tracing::warn!("Book update failed: {}", e);
                self.alert("Book update failed");
            }
        }
    }

    /// Open the confirmation modal for `book_id`.
    pub fn request_delete(&mut self, book_id: impl Into<String>) {
        self.state.pending_delete_id = Some(book_id.into());
        self.state.delete_modal_open = true;
    }

    pub fn cancel_delete(&mut self) {
        self.state.delete_modal_open = false;
        self.state.pending_delete_id = None;
    }

    /// Text of the confirmation modal, if one is pending.
    pub fn delete_prompt(&self) -> Option<String> {
        let pending = self.state.pending_delete_id.as_deref()?;
        let author = self
            .state
            .books
            .iter()
            .find(|b| b.book_id == pending)
            .map(|b| b.author.as_str())
            .unwrap_or("");
        Some(format!("Delete book {} ?", author))
    }

    pub async fn confirm_delete(&mut self) {
        let Some(book_id) = self.state.pending_delete_id.clone() else {
            self.state.delete_modal_open = false;
            return;
        };

        match self.api.delete_book(&self.id_token, &book_id).await {
            Ok(()) => {
                self.state.books.retain(|b| b.book_id != book_id);
                self.cancel_delete();
            }
            Err(e) => {
                tracing::warn!("Book deletion failed: {}", e);
                self.alert("Book deletion failed");
            }
        }
    }

    fn alert(&mut self, message: impl Into<String>) {
        self.state.alert = Some(message.into());
    }
}
