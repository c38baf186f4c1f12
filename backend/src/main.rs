use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use tracing_subscriber::{fmt, EnvFilter};

use backend::{book_uploads::BookUploads, server, types::Environment};
use catalog_storage::catalog::CatalogStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // JSON format for staging/production log collection, regular format for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    let aws_config = environment.aws_config().await;
    let dynamodb_client = Arc::new(DynamoDbClient::new(&aws_config));
    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));

    let catalog_storage = Arc::new(CatalogStorage::new(
        dynamodb_client,
        environment.table_name(),
    ));
    let book_uploads = Arc::new(BookUploads::new(
        s3_client,
        environment.books_bucket(),
        environment.presigned_url_expiry_secs(),
    ));

    server::start(catalog_storage, book_uploads).await
}
