use std::sync::Arc;

use axum::extract::Query;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::book_uploads::BookUploads;
use crate::types::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlParams {
    file_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    url: String,
}

/// Issues a presigned PUT URL for uploading a price book file
#[instrument(skip(book_uploads))]
pub async fn create_upload_url(
    Extension(book_uploads): Extension<Arc<BookUploads>>,
    Query(params): Query<UploadUrlParams>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let Some(file_name) = params.file_name.filter(|name| !name.is_empty()) else {
        return Err(AppError::validation(
            "fileName query parameter was not provided.",
            "fileName query parameter is required.",
        ));
    };

    let url = book_uploads.presigned_put_url(&file_name).await?;

    Ok(Json(UploadUrlResponse { url }))
}
