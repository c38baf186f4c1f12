//! Error types for catalog storage operations

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::{
    batch_write_item::BatchWriteItemError, put_item::PutItemError, query::QueryError,
};
use thiserror::Error;

use crate::cursor::CursorError;

/// Result type for catalog storage operations
pub type CatalogStorageResult<T> = Result<T, CatalogStorageError>;

/// Errors that can occur during catalog storage operations
#[derive(Error, Debug)]
pub enum CatalogStorageError {
    /// Failed to query the catalog table or one of its indexes
    #[error("Failed to query DynamoDB: {0}")]
    DynamoDbQueryError(#[from] SdkError<QueryError>),

    /// Failed to batch-write items into the catalog table
    #[error("Failed to batch-write items into DynamoDB: {0}")]
    DynamoDbBatchWriteError(#[from] SdkError<BatchWriteItemError>),

    /// Failed to put the Book summary record
    #[error("Failed to put item into DynamoDB: {0}")]
    DynamoDbPutError(#[from] SdkError<PutItemError>),

    /// Failed to build a DynamoDB request type
    #[error("Failed to build DynamoDB request: {0}")]
    BuildError(#[from] aws_sdk_dynamodb::error::BuildError),

    /// Serialization error for `serde_dynamo`
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A pagination cursor could not be decoded for this query shape
    #[error("Invalid pagination cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    /// `LastEvaluatedKey` was missing an attribute the cursor shape requires
    #[error("Malformed LastEvaluatedKey, missing or non-string attribute: {0}")]
    MalformedLastEvaluatedKey(String),

    /// A row deserialized into the wrong record kind for this query
    #[error("Unexpected record type, expected {expected}")]
    UnexpectedRecordType {
        /// The record kind the query shape expects
        expected: &'static str,
    },

    /// More put requests than a single batch write accepts
    #[error("Batch of {count} items exceeds the maximum of {max}")]
    BatchTooLarge {
        /// Number of items requested
        count: usize,
        /// Store-imposed batch write ceiling
        max: usize,
    },
}
