//! Price book backend service
//!
//! Read API over the ingested catalog: paginated book and item queries plus
//! the presigned-upload issuer for new book files.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Presigned S3 uploads for book files
pub mod book_uploads;

/// Response formatting for single-item and paginated shapes
pub mod response;

/// Route handlers
pub mod routes;

/// Server startup
pub mod server;

/// Environment and error types
pub mod types;

/// Client-facing record views
pub mod views;
