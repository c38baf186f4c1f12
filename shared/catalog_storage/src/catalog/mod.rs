//! Catalog table integration using Dynamo DB
//!
//! One storage client covers both record kinds of the single-table design:
//! Book summaries listed through the `ByType` index, and Items queried by
//! primary key, item code or UPC. Every query shape returns one page plus an
//! opaque continuation cursor whose field order is fixed per shape.

mod error;

use std::collections::HashMap;
use std::sync::Arc;

use aws_sdk_dynamodb::{
    types::{AttributeValue, PutRequest, WriteRequest},
    Client as DynamoDbClient,
};
use serde::{Deserialize, Serialize};

pub use error::{CatalogStorageError, CatalogStorageResult};

use crate::cursor;
use crate::record::{
    book_partition_key, BookRecord, CatalogAttribute, CatalogRecord, ItemRecord, BOOK_KEY_PREFIX,
    ITEM_KEY_PREFIX,
};

/// GSI keyed by `Type`, sorted by `Sk`; used to list Books by recency
pub const BY_TYPE_INDEX: &str = "ByType";
/// GSI keyed by `ItemCode`, sorted by `Sk`; item-code lookup across runs
pub const BY_ITEM_CODE_INDEX: &str = "ByItemCode";
/// GSI keyed by `Upc`, sorted by `Sk`; UPC lookup across runs
pub const BY_UPC_INDEX: &str = "ByUpc";

/// Maximum number of put requests a single batch write accepts
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

/// `Type` attribute value for Book rows
const BOOK_RECORD_TYPE: &str = "BOOK";

/// Cursor field order for primary-key item queries
const PRIMARY_CURSOR_FIELDS: &[CatalogAttribute] = &[CatalogAttribute::Pk, CatalogAttribute::Sk];
/// Cursor field order for the book listing on `ByType`
const BOOK_CURSOR_FIELDS: &[CatalogAttribute] = &[
    CatalogAttribute::Pk,
    CatalogAttribute::Sk,
    CatalogAttribute::Type,
];
/// Cursor field order for `ByItemCode` queries
const ITEM_CODE_CURSOR_FIELDS: &[CatalogAttribute] = &[
    CatalogAttribute::Pk,
    CatalogAttribute::Sk,
    CatalogAttribute::ItemCode,
];
/// Cursor field order for `ByUpc` queries
const UPC_CURSOR_FIELDS: &[CatalogAttribute] = &[
    CatalogAttribute::Pk,
    CatalogAttribute::Sk,
    CatalogAttribute::Upc,
];

/// Scan direction for paginated queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending sort-key order
    Asc,
    /// Descending sort-key order (newest first for date-prefixed keys)
    Desc,
}

impl SortOrder {
    const fn scan_index_forward(self) -> bool {
        matches!(self, Self::Asc)
    }
}

/// Pagination parameters common to every query shape
#[derive(Debug, Clone)]
pub struct PageRequest {
    /// Maximum number of rows to fetch for this page
    pub limit: i32,
    /// Scan direction
    pub sort: SortOrder,
    /// Continuation cursor from a previous page, if any
    pub cursor: Option<String>,
}

impl PageRequest {
    /// Creates a page request with the given defaults applied
    #[must_use]
    pub fn new(limit: Option<i32>, sort: Option<SortOrder>, cursor: Option<String>) -> Self {
        Self {
            limit: limit.unwrap_or(10),
            sort: sort.unwrap_or(SortOrder::Asc),
            cursor,
        }
    }
}

/// One page of query results plus an opaque continuation cursor
///
/// `next_cursor` reflects the store's continuation state for the fetched
/// page, independent of any in-memory post-filtering: a filtered-empty page
/// can still carry a cursor, and callers must keep paging.
#[derive(Debug, Clone)]
pub struct QueryPage<T> {
    /// Records on this page
    pub records: Vec<T>,
    /// Cursor for the next page, absent on the final page
    pub next_cursor: Option<String>,
}

/// Catalog storage client for Dynamo DB operations
pub struct CatalogStorage {
    dynamodb_client: Arc<DynamoDbClient>,
    table_name: String,
}

impl CatalogStorage {
    /// Creates a new catalog storage client
    ///
    /// # Arguments
    ///
    /// * `dynamodb_client` - Pre-configured Dynamo DB client
    /// * `table_name` - Dynamo DB table name for the catalog
    #[must_use]
    pub const fn new(dynamodb_client: Arc<DynamoDbClient>, table_name: String) -> Self {
        Self {
            dynamodb_client,
            table_name,
        }
    }

    /// Lists Book summary records through the `ByType` index
    ///
    /// Without a run date this pages through all Books; with one it narrows
    /// to the exact `BOOK#<runDate>` sort key.
    ///
    /// # Errors
    ///
    /// Returns `CatalogStorageError` if the query fails, the cursor does not
    /// match this shape, or a row is not a Book record
    pub async fn list_books(
        &self,
        run_date: Option<&str>,
        page: &PageRequest,
    ) -> CatalogStorageResult<QueryPage<BookRecord>> {
        let sk_prefix = run_date.map_or_else(
            || BOOK_KEY_PREFIX.trim_end_matches('#').to_string(),
            book_partition_key,
        );

        let mut query = self
            .dynamodb_client
            .query()
            .table_name(&self.table_name)
            .index_name(BY_TYPE_INDEX)
            .key_condition_expression("#Type = :Type and begins_with(#Sk, :Sk)")
            .expression_attribute_names("#Type", CatalogAttribute::Type.to_string())
            .expression_attribute_names("#Sk", CatalogAttribute::Sk.to_string())
            .expression_attribute_values(":Type", AttributeValue::S(BOOK_RECORD_TYPE.to_string()))
            .expression_attribute_values(":Sk", AttributeValue::S(sk_prefix))
            .limit(page.limit)
            .scan_index_forward(page.sort.scan_index_forward());

        if let Some(token) = &page.cursor {
            query = query.set_exclusive_start_key(Some(exclusive_start_key(
                token,
                BOOK_CURSOR_FIELDS,
            )?));
        }

        let output = query.send().await?;
        let next_cursor = next_cursor(output.last_evaluated_key(), BOOK_CURSOR_FIELDS)?;

        let records = output
            .items()
            .iter()
            .map(|item| match parse_record(item)? {
                CatalogRecord::Book(book) => Ok(book),
                CatalogRecord::Item(_) => {
                    Err(CatalogStorageError::UnexpectedRecordType { expected: "BOOK" })
                }
            })
            .collect::<CatalogStorageResult<Vec<_>>>()?;

        Ok(QueryPage {
            records,
            next_cursor,
        })
    }

    /// Queries Items of one run whose sort key starts with the class description
    ///
    /// # Errors
    ///
    /// Returns `CatalogStorageError` if the query fails or the cursor does
    /// not match this shape
    pub async fn query_items_by_class_desc(
        &self,
        run_date: &str,
        class_desc: &str,
        page: &PageRequest,
    ) -> CatalogStorageResult<QueryPage<ItemRecord>> {
        self.query_items_by_sk_prefix(run_date, &format!("{ITEM_KEY_PREFIX}{class_desc}"), page)
            .await
    }

    /// Queries all Items of one run
    ///
    /// # Errors
    ///
    /// Returns `CatalogStorageError` if the query fails or the cursor does
    /// not match this shape
    pub async fn query_items_by_run(
        &self,
        run_date: &str,
        page: &PageRequest,
    ) -> CatalogStorageResult<QueryPage<ItemRecord>> {
        self.query_items_by_sk_prefix(run_date, ITEM_KEY_PREFIX, page)
            .await
    }

    /// Queries Items by item code through the `ByItemCode` index
    ///
    /// With a run date the fetched page is post-filtered in memory on the
    /// stored `RunDate`; the continuation cursor is computed from the
    /// unfiltered page, so a filtered-empty page may still report more pages.
    ///
    /// # Errors
    ///
    /// Returns `CatalogStorageError` if the query fails or the cursor does
    /// not match this shape
    pub async fn query_items_by_item_code(
        &self,
        item_code: &str,
        run_date: Option<&str>,
        page: &PageRequest,
    ) -> CatalogStorageResult<QueryPage<ItemRecord>> {
        self.query_items_by_index(
            BY_ITEM_CODE_INDEX,
            CatalogAttribute::ItemCode,
            item_code,
            ITEM_CODE_CURSOR_FIELDS,
            run_date,
            page,
        )
        .await
    }

    /// Queries Items by UPC through the `ByUpc` index
    ///
    /// Identical shape to the item-code lookup, including the run-date
    /// post-filter semantics.
    ///
    /// # Errors
    ///
    /// Returns `CatalogStorageError` if the query fails or the cursor does
    /// not match this shape
    pub async fn query_items_by_upc(
        &self,
        upc: &str,
        run_date: Option<&str>,
        page: &PageRequest,
    ) -> CatalogStorageResult<QueryPage<ItemRecord>> {
        self.query_items_by_index(
            BY_UPC_INDEX,
            CatalogAttribute::Upc,
            upc,
            UPC_CURSOR_FIELDS,
            run_date,
            page,
        )
        .await
    }

    /// Writes one batch of Item records
    ///
    /// The caller owns batch splitting; a slice larger than
    /// [`MAX_BATCH_WRITE_ITEMS`] is rejected rather than split here.
    ///
    /// # Errors
    ///
    /// Returns `CatalogStorageError` if the batch is too large, an item fails
    /// to serialize, or the batch write fails
    pub async fn batch_put_items(&self, items: &[ItemRecord]) -> CatalogStorageResult<()> {
        if items.len() > MAX_BATCH_WRITE_ITEMS {
            return Err(CatalogStorageError::BatchTooLarge {
                count: items.len(),
                max: MAX_BATCH_WRITE_ITEMS,
            });
        }

        let mut requests = Vec::with_capacity(items.len());
        for record in items {
            let item = serde_dynamo::to_item(CatalogRecord::Item(record.clone()))
                .map_err(|e| CatalogStorageError::SerializationError(e.to_string()))?;
            requests.push(
                WriteRequest::builder()
                    .put_request(PutRequest::builder().set_item(Some(item)).build()?)
                    .build(),
            );
        }

        let output = self
            .dynamodb_client
            .batch_write_item()
            .request_items(&self.table_name, requests)
            .send()
            .await?;

        if let Some(unprocessed) = output.unprocessed_items() {
            if !unprocessed.is_empty() {
                tracing::warn!(
                    table = %self.table_name,
                    unprocessed = unprocessed.values().map(Vec::len).sum::<usize>(),
                    "batch write returned unprocessed items"
                );
            }
        }

        Ok(())
    }

    /// Writes the Book summary record for a run, overwriting any previous one
    ///
    /// # Errors
    ///
    /// Returns `CatalogStorageError` if serialization or the put fails
    pub async fn put_book(&self, book: &BookRecord) -> CatalogStorageResult<()> {
        let item = serde_dynamo::to_item(CatalogRecord::Book(book.clone()))
            .map_err(|e| CatalogStorageError::SerializationError(e.to_string()))?;

        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await?;

        Ok(())
    }

    /// Primary-key item query: `Pk = BOOK#<runDate>`, `begins_with(Sk, <prefix>)`
    async fn query_items_by_sk_prefix(
        &self,
        run_date: &str,
        sk_prefix: &str,
        page: &PageRequest,
    ) -> CatalogStorageResult<QueryPage<ItemRecord>> {
        let mut query = self
            .dynamodb_client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("#Pk = :Pk and begins_with(#Sk, :Sk)")
            .expression_attribute_names("#Pk", CatalogAttribute::Pk.to_string())
            .expression_attribute_names("#Sk", CatalogAttribute::Sk.to_string())
            .expression_attribute_values(":Pk", AttributeValue::S(book_partition_key(run_date)))
            .expression_attribute_values(":Sk", AttributeValue::S(sk_prefix.to_string()))
            .limit(page.limit)
            .scan_index_forward(page.sort.scan_index_forward());

        if let Some(token) = &page.cursor {
            query = query.set_exclusive_start_key(Some(exclusive_start_key(
                token,
                PRIMARY_CURSOR_FIELDS,
            )?));
        }

        let output = query.send().await?;
        let next_cursor = next_cursor(output.last_evaluated_key(), PRIMARY_CURSOR_FIELDS)?;
        let records = parse_item_records(output.items())?;

        Ok(QueryPage {
            records,
            next_cursor,
        })
    }

    /// GSI item query with the optional in-memory run-date post-filter
    async fn query_items_by_index(
        &self,
        index_name: &str,
        key_attribute: CatalogAttribute,
        key_value: &str,
        cursor_fields: &[CatalogAttribute],
        run_date: Option<&str>,
        page: &PageRequest,
    ) -> CatalogStorageResult<QueryPage<ItemRecord>> {
        let mut query = self
            .dynamodb_client
            .query()
            .table_name(&self.table_name)
            .index_name(index_name)
            .key_condition_expression("#Key = :Key")
            .expression_attribute_names("#Key", key_attribute.to_string())
            .expression_attribute_values(":Key", AttributeValue::S(key_value.to_string()))
            .limit(page.limit)
            .scan_index_forward(page.sort.scan_index_forward());

        if let Some(token) = &page.cursor {
            query =
                query.set_exclusive_start_key(Some(exclusive_start_key(token, cursor_fields)?));
        }

        let output = query.send().await?;
        let next_cursor = next_cursor(output.last_evaluated_key(), cursor_fields)?;
        let mut records = parse_item_records(output.items())?;

        // Post-filter after the page fetch: the page may shrink to zero while
        // the cursor still points at further matching rows.
        if let Some(run_date) = run_date {
            records.retain(|record| record.run_date == run_date);
        }

        Ok(QueryPage {
            records,
            next_cursor,
        })
    }
}

/// Deserializes one raw row into the tagged record union
fn parse_record(item: &HashMap<String, AttributeValue>) -> CatalogStorageResult<CatalogRecord> {
    serde_dynamo::from_item(item.clone())
        .map_err(|e| CatalogStorageError::SerializationError(e.to_string()))
}

/// Deserializes a page of rows that must all be Item records
fn parse_item_records(
    items: &[HashMap<String, AttributeValue>],
) -> CatalogStorageResult<Vec<ItemRecord>> {
    items
        .iter()
        .map(|item| match parse_record(item)? {
            CatalogRecord::Item(record) => Ok(record),
            CatalogRecord::Book(_) => {
                Err(CatalogStorageError::UnexpectedRecordType { expected: "ITEM" })
            }
        })
        .collect()
}

/// Rebuilds an `ExclusiveStartKey` from a cursor and the shape's field order
fn exclusive_start_key(
    token: &str,
    fields: &[CatalogAttribute],
) -> CatalogStorageResult<HashMap<String, AttributeValue>> {
    let values = cursor::decode_cursor(token, fields.len())?;
    Ok(fields
        .iter()
        .zip(values)
        .map(|(field, value)| (field.to_string(), AttributeValue::S(value)))
        .collect())
}

/// Encodes `LastEvaluatedKey` into the shape's continuation cursor
fn next_cursor(
    last_evaluated_key: Option<&HashMap<String, AttributeValue>>,
    fields: &[CatalogAttribute],
) -> CatalogStorageResult<Option<String>> {
    let Some(key) = last_evaluated_key else {
        return Ok(None);
    };

    let mut values = Vec::with_capacity(fields.len());
    for field in fields {
        let value = key
            .get(&field.to_string())
            .and_then(|attr| attr.as_s().ok())
            .ok_or_else(|| CatalogStorageError::MalformedLastEvaluatedKey(field.to_string()))?;
        values.push(value.clone());
    }

    Ok(Some(cursor::encode_cursor(values)))
}
