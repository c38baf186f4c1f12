//! Catalog storage for the price book service
//!
//! This crate provides the single-table DynamoDB layer shared between the
//! backend and the ingest worker: the Book/Item record model, the composite
//! key and cursor codec, and the query shapes the read API is built on.

pub mod catalog;
pub mod cursor;
pub mod record;
