use std::sync::Arc;

use axum::extract::{OriginalUri, Path, Query};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use serde::Deserialize;
use tracing::instrument;

use catalog_storage::catalog::{CatalogStorage, PageRequest, QueryPage, SortOrder};
use catalog_storage::cursor::decode_record_id;
use catalog_storage::record::{run_date_from_partition_key, ItemRecord};

use crate::response::{paginated_response, single_item_response};
use crate::types::AppError;
use crate::views::ItemView;

const DEFAULT_CLASS_DESC_PAGE_SIZE: i32 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookItemsParams {
    class_desc: Option<String>,
    item_code: Option<String>,
    upc: Option<String>,
    limit: Option<i32>,
    sort: Option<SortOrder>,
    cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindItemsParams {
    item_code: Option<String>,
    upc: Option<String>,
    run_date: Option<String>,
    limit: Option<i32>,
    sort: Option<SortOrder>,
    cursor: Option<String>,
}

/// Lists or looks up Items within one Book
///
/// Filters are applied in precedence order: `classDesc`, then `itemCode`,
/// then `upc`, then the bare run listing. `itemCode` and `upc` are point
/// lookups returning a single object; the caller's `limit`, `sort` and
/// `cursor` still apply to the underlying page, since the cross-run index
/// page may need to be advanced past rows belonging to other runs.
#[instrument(skip(catalog_storage))]
pub async fn list_book_items(
    Extension(catalog_storage): Extension<Arc<CatalogStorage>>,
    OriginalUri(uri): OriginalUri,
    Path(book_id): Path<String>,
    Query(params): Query<BookItemsParams>,
) -> Result<Response, AppError> {
    let run_date = book_run_date(&book_id)?;

    if let Some(class_desc) = &params.class_desc {
        let page = PageRequest::new(
            Some(params.limit.unwrap_or(DEFAULT_CLASS_DESC_PAGE_SIZE)),
            params.sort,
            params.cursor,
        );
        let items = catalog_storage
            .query_items_by_class_desc(&run_date, class_desc, &page)
            .await?;
        return Ok(paginated_response::<_, ItemView>(items, &uri));
    }

    if let Some(item_code) = &params.item_code {
        let page = PageRequest::new(params.limit, params.sort, params.cursor);
        let items = catalog_storage
            .query_items_by_item_code(item_code, Some(&run_date), &page)
            .await?;
        return Ok(single_item_response::<_, ItemView>(items)?.into_response());
    }

    if let Some(upc) = &params.upc {
        let page = PageRequest::new(params.limit, params.sort, params.cursor);
        let items = catalog_storage
            .query_items_by_upc(upc, Some(&run_date), &page)
            .await?;
        return Ok(single_item_response::<_, ItemView>(items)?.into_response());
    }

    let page = PageRequest::new(params.limit, params.sort, params.cursor);
    let items = catalog_storage.query_items_by_run(&run_date, &page).await?;
    Ok(paginated_response::<_, ItemView>(items, &uri))
}

/// Finds Items across all Books by item code or UPC
#[instrument(skip(catalog_storage))]
pub async fn find_items(
    Extension(catalog_storage): Extension<Arc<CatalogStorage>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<FindItemsParams>,
) -> Result<Response, AppError> {
    let page = PageRequest::new(params.limit, params.sort, params.cursor);
    let run_date = params.run_date.as_deref();

    let items: QueryPage<ItemRecord> = if let Some(item_code) = &params.item_code {
        catalog_storage
            .query_items_by_item_code(item_code, run_date, &page)
            .await?
    } else if let Some(upc) = &params.upc {
        catalog_storage.query_items_by_upc(upc, run_date, &page).await?
    } else {
        return Err(AppError::validation(
            "ItemCode or Upc query parameter is required",
            "ItemCode and Upc query parameters were both not provided",
        ));
    };

    Ok(paginated_response::<_, ItemView>(items, &uri))
}

/// Recovers the run date from an opaque book id
fn book_run_date(book_id: &str) -> Result<String, AppError> {
    let (pk, _sk) = decode_record_id(book_id)?;
    run_date_from_partition_key(&pk)
        .map(ToString::to_string)
        .ok_or_else(|| {
            AppError::validation(
                "bookId path parameter is not a valid book id",
                "bookId did not decode to a Book record id",
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_storage::cursor::encode_record_id;

    #[test]
    fn book_run_date_round_trips_through_record_id() {
        let id = encode_record_id("BOOK#2024-03-14", "BOOK#2024-03-14");
        assert_eq!(book_run_date(&id).unwrap(), "2024-03-14");
    }

    #[test]
    fn book_run_date_rejects_non_book_keys() {
        let id = encode_record_id("USER#42", "USER#42");
        assert!(book_run_date(&id).is_err());
    }

    #[test]
    fn book_run_date_rejects_garbage_tokens() {
        assert!(book_run_date("not-base64!").is_err());
    }
}
