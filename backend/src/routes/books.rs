use std::sync::Arc;

use axum::extract::{OriginalUri, Query};
use axum::response::Response;
use axum::Extension;
use serde::Deserialize;
use tracing::instrument;

use catalog_storage::catalog::{CatalogStorage, PageRequest, SortOrder};

use crate::response::paginated_response;
use crate::types::AppError;
use crate::views::BookView;

const DEFAULT_BOOKS_PAGE_SIZE: i32 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBooksParams {
    run_date: Option<String>,
    limit: Option<i32>,
    sort: Option<SortOrder>,
    cursor: Option<String>,
}

/// Lists Book summaries, newest run first by default
#[instrument(skip(catalog_storage))]
pub async fn list_books(
    Extension(catalog_storage): Extension<Arc<CatalogStorage>>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ListBooksParams>,
) -> Result<Response, AppError> {
    let page = PageRequest::new(
        Some(params.limit.unwrap_or(DEFAULT_BOOKS_PAGE_SIZE)),
        Some(params.sort.unwrap_or(SortOrder::Desc)),
        params.cursor,
    );

    let books = catalog_storage
        .list_books(params.run_date.as_deref(), &page)
        .await?;

    Ok(paginated_response::<_, BookView>(books, &uri))
}
