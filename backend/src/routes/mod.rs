//! HTTP route handlers

mod books;
mod health;
mod items;
mod presigned;

use axum::routing::get;
use axum::Router;

/// Creates the router with all handler routes
pub fn handler() -> Router {
    Router::new()
        .route("/health", get(health::handler))
        .route("/books", get(books::list_books))
        .route("/books/{book_id}/items", get(items::list_book_items))
        .route("/items", get(items::find_items))
        .route("/presigned", get(presigned::create_upload_url))
}
