use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sqs::Client as SqsClient;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use catalog_storage::catalog::CatalogStorage;
use ingest_worker::health;
use ingest_worker::pipeline::IngestPipeline;
use ingest_worker::types::Environment;
use ingest_worker::worker::IngestWorker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // JSON log format for staging/production, regular format for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    info!("Starting price book ingest worker in {environment:?} environment");

    let aws_config = environment.aws_config().await;
    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let sqs_client = Arc::new(SqsClient::new(&aws_config));
    let dynamodb_client = Arc::new(DynamoDbClient::new(&aws_config));

    let storage = Arc::new(CatalogStorage::new(
        dynamodb_client,
        environment.table_name(),
    ));
    let pipeline = IngestPipeline::new(s3_client, storage, environment.books_bucket());
    let worker = IngestWorker::new(sqs_client, environment.ingest_queue_url(), pipeline);

    let shutdown_token = worker.shutdown_token();

    // Health check server beside the poll loop
    let health_shutdown = shutdown_token.clone();
    tokio::spawn(async move {
        if let Err(e) = health::start_health_server(health_shutdown).await {
            error!("Health server error: {e}");
        }
    });

    // Signal handler
    let signal_shutdown = shutdown_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating graceful shutdown...");
                signal_shutdown.cancel();
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {e}");
            }
        }
    });

    worker.run().await?;

    info!("Ingest worker stopped");
    Ok(())
}
