use book_tracker_shared::auth;
use book_tracker_shared::error::BookError;
use book_tracker_shared::responses::{
    empty_response, error_response, json_response, method_not_allowed, not_found, preflight,
};
use book_tracker_shared::types::{
    CreateBookRequest, ItemResponse, ItemsResponse, UpdateBookRequest, UploadUrlResponse,
};
use book_tracker_shared::AppState;
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use std::sync::Arc;

/// Main Lambda handler - routes `/books` requests to the book operations
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    tracing::info!("Books API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == Method::OPTIONS {
        return preflight();
    }

    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if parts.first() != Some(&"books") {
        tracing::warn!("No route matched - Method: {} Path: {}", method, path);
        return not_found();
    }

    let user_id = match auth::user_id_from_request(&event) {
        Ok(user_id) => user_id,
        Err(e) => return error_response(&e),
    };

    match (method, parts.as_slice()) {
        // POST /books - create book
        (&Method::POST, ["books"]) => create_book(&state, &user_id, body).await,
        // GET /books - list caller's books
        (&Method::GET, ["books"]) => list_books(&state, &user_id).await,
        // GET /books/search/{author} - search by author
        (&Method::GET, ["books", "search", author]) => {
            search_books(&state, &user_id, author).await
        }
        // GET /books/{id} - get book
        (&Method::GET, ["books", book_id]) => get_book(&state, &user_id, book_id).await,
        // PATCH /books/{id} - update book
        (&Method::PATCH, ["books", book_id]) => {
            update_book(&state, &user_id, book_id, body).await
        }
        // DELETE /books/{id} - delete book
        (&Method::DELETE, ["books", book_id]) => delete_book(&state, &user_id, book_id).await,
        // POST /books/{id}/attachment - issue upload URL
        (&Method::POST, ["books", book_id, "attachment"]) => {
            create_attachment_url(&state, &user_id, book_id).await
        }
        (_, ["books"]) | (_, ["books", _]) | (_, ["books", _, "attachment"]) => {
            method_not_allowed()
        }
        _ => not_found(),
    }
}

async fn create_book(
    state: &AppState,
    user_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let request: CreateBookRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => return error_response(&BookError::from(e)),
    };

    match state.books.create_book(request, user_id).await {
        Ok(item) => json_response(StatusCode::CREATED, &ItemResponse { item }),
        Err(e) => error_response(&e),
    }
}

async fn list_books(state: &AppState, user_id: &str) -> Result<Response<Body>, Error> {
    match state.books.list_books(user_id).await {
        Ok(items) => json_response(StatusCode::OK, &ItemsResponse { items }),
        Err(e) => error_response(&e),
    }
}

async fn search_books(
    state: &AppState,
    user_id: &str,
    raw_author: &str,
) -> Result<Response<Body>, Error> {
    let author = match urlencoding::decode(raw_author) {
        Ok(author) => author,
        Err(e) => {
            return error_response(&BookError::InvalidRequest(format!(
                "Invalid author in path: {}",
                e
            )))
        }
    };

    match state.books.search_books(user_id, &author).await {
        Ok(items) => json_response(StatusCode::OK, &ItemsResponse { items }),
        Err(e) => error_response(&e),
    }
}

async fn get_book(state: &AppState, user_id: &str, book_id: &str) -> Result<Response<Body>, Error> {
    match state.books.get_book(user_id, book_id).await {
        Ok(item) => json_response(StatusCode::OK, &ItemResponse { item }),
        Err(e) => error_response(&e),
    }
}

async fn update_book(
    state: &AppState,
    user_id: &str,
    book_id: &str,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let request: UpdateBookRequest = match serde_json::from_slice(body) {
        Ok(request) => request,
        Err(e) => return error_response(&BookError::from(e)),
    };

    match state.books.update_book(book_id, request, user_id).await {
        Ok(()) => empty_response(StatusCode::NO_CONTENT),
        Err(e) => error_response(&e),
    }
}

async fn delete_book(
    state: &AppState,
    user_id: &str,
    book_id: &str,
) -> Result<Response<Body>, Error> {
    match state.books.delete_book(user_id, book_id).await {
        Ok(()) => empty_response(StatusCode::NO_CONTENT),
        Err(e) => error_response(&e),
    }
}

async fn create_attachment_url(
    state: &AppState,
    user_id: &str,
    book_id: &str,
) -> Result<Response<Body>, Error> {
    match state.books.create_attachment_url(user_id, book_id).await {
        Ok(upload_url) => json_response(StatusCode::CREATED, &UploadUrlResponse { upload_url }),
        Err(e) => error_response(&e),
    }
}
