//! Price book ingest worker
//!
//! Polls an SQS queue for S3 "object created" notifications and streams each
//! uploaded CSV price book into the catalog table.

pub mod events;
pub mod health;
pub mod pipeline;
pub mod row;
pub mod types;
pub mod worker;
