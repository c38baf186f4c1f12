//! Response builders for catalog read endpoints

use axum::http::header;
use axum::http::uri::Uri;
use axum::response::{IntoResponse, Json, Response};

use catalog_storage::catalog::QueryPage;

use crate::types::AppError;

/// Renders the first record of a page as a single JSON object.
///
/// The store returns point lookups as a page of at most one record; an
/// empty page means the record does not exist.
///
/// # Errors
///
/// Returns `AppError::NotFound` when the page is empty.
pub fn single_item_response<R, V>(page: QueryPage<R>) -> Result<Json<V>, AppError>
where
    V: From<R>,
{
    page.records
        .into_iter()
        .next()
        .map(|record| Json(V::from(record)))
        .ok_or(AppError::NotFound)
}

/// Renders a page of records as a JSON array, advertising the next page
/// through a `Link: <...>; rel="next"` header when one exists.
pub fn paginated_response<R, V>(page: QueryPage<R>, request_uri: &Uri) -> Response
where
    V: From<R> + serde::Serialize,
{
    let views: Vec<V> = page.records.into_iter().map(V::from).collect();
    match page.next_cursor {
        Some(cursor) => {
            let link = next_link(request_uri, &cursor);
            ([(header::LINK, link)], Json(views)).into_response()
        }
        None => Json(views).into_response(),
    }
}

/// Builds the `Link` header value for the next page, preserving the
/// caller's query parameters and replacing any previous `cursor`.
fn next_link(request_uri: &Uri, cursor: &str) -> String {
    let path = request_uri.path();
    let retained: Vec<&str> = request_uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty() && !pair.starts_with("cursor="))
        .collect();

    let mut query = retained.join("&");
    if !query.is_empty() {
        query.push('&');
    }
    format!("<{path}?{query}cursor={cursor}>; rel=\"next\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_link_appends_cursor_to_existing_params() {
        let uri: Uri = "/items?itemCode=123&limit=5".parse().unwrap();
        assert_eq!(
            next_link(&uri, "abc"),
            "</items?itemCode=123&limit=5&cursor=abc>; rel=\"next\""
        );
    }

    #[test]
    fn next_link_replaces_previous_cursor() {
        let uri: Uri = "/books?cursor=old&limit=2".parse().unwrap();
        assert_eq!(
            next_link(&uri, "new"),
            "</books?limit=2&cursor=new>; rel=\"next\""
        );
    }

    #[test]
    fn next_link_handles_bare_path() {
        let uri: Uri = "/books".parse().unwrap();
        assert_eq!(next_link(&uri, "abc"), "</books?cursor=abc>; rel=\"next\"");
    }
}
