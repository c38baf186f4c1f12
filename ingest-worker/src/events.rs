//! S3 event notification payloads
//!
//! The books bucket publishes "object created" notifications to the ingest
//! queue; message bodies carry the standard S3 event JSON. Only the fields
//! the pipeline needs are modeled.

use serde::Deserialize;

/// One S3 event notification message
#[derive(Debug, Clone, Deserialize)]
pub struct S3EventNotification {
    /// Event records; a notification usually carries exactly one
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

/// One record of an S3 event notification
#[derive(Debug, Clone, Deserialize)]
pub struct S3EventRecord {
    /// Name of the event, e.g. `ObjectCreated:Put`
    #[serde(rename = "eventName", default)]
    pub event_name: String,
    /// The S3 entity the event refers to
    pub s3: S3Entity,
}

/// Bucket and object of an S3 event record
#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    /// Bucket the object was created in
    pub bucket: S3Bucket,
    /// The created object
    pub object: S3Object,
}

/// Bucket reference within an S3 event
#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    /// Bucket name
    pub name: String,
}

/// Object reference within an S3 event
#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// Object key
    pub key: String,
    /// Object size in bytes
    #[serde(default)]
    pub size: i64,
}

/// Whether an object key names a CSV book file
///
/// The upload trigger is filtered to `.csv` suffixes, case-insensitive.
#[must_use]
pub fn is_csv_key(key: &str) -> bool {
    key.to_ascii_lowercase().ends_with(".csv")
}
