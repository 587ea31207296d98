//! Client side of the book tracker: a typed HTTP client for the books API
//! and the view models driving the books list and the edit page.

pub mod types;
pub mod error;
pub mod api;
pub mod view;
pub mod edit;

pub use api::{BooksApi, HttpBooksApi};
pub use edit::{EditBook, UploadState};
pub use error::ClientError;
pub use view::{calculate_due_date, BooksState, BooksView};

#[cfg(test)]
mod testing;
