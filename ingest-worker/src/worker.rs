//! SQS poll loop driving the ingestion pipeline
//!
//! Each message carries an S3 event notification for the books bucket. The
//! trigger is fire-and-forget: a message is acknowledged whether or not its
//! ingestion run succeeded, and failures surface only through logs.

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_sqs::Client as SqsClient;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::events::{self, S3EventNotification};
use crate::pipeline::IngestPipeline;

/// Long-poll wait per receive call
const POLL_WAIT_TIME_SECONDS: i32 = 20;
/// Messages fetched per poll; runs within a poll execute sequentially
const MAX_MESSAGES_PER_POLL: i32 = 5;
/// Backoff after a failed poll
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Worker that polls the ingest queue and runs the pipeline per upload
pub struct IngestWorker {
    sqs_client: Arc<SqsClient>,
    queue_url: String,
    pipeline: IngestPipeline,
    shutdown_token: CancellationToken,
}

impl IngestWorker {
    /// Creates a new ingest worker
    #[must_use]
    pub fn new(sqs_client: Arc<SqsClient>, queue_url: String, pipeline: IngestPipeline) -> Self {
        Self {
            sqs_client,
            queue_url,
            pipeline,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Returns a clone of the shutdown token for external control
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs the poll loop until the shutdown token is cancelled
    ///
    /// # Errors
    ///
    /// Currently never returns an error; poll failures are logged and
    /// retried after a backoff
    pub async fn run(&self) -> anyhow::Result<()> {
        info!(queue_url = %self.queue_url, "ingest worker started");

        loop {
            tokio::select! {
                () = self.shutdown_token.cancelled() => {
                    info!("shutdown signal received, stopping ingest worker");
                    return Ok(());
                }
                result = self.poll_once() => {
                    if let Err(error) = result {
                        error!(%error, "queue poll failed");
                        tokio::select! {
                            () = self.shutdown_token.cancelled() => return Ok(()),
                            () = sleep(POLL_ERROR_BACKOFF) => {}
                        }
                    }
                }
            }
        }
    }

    /// Receives one batch of messages and processes them sequentially
    async fn poll_once(&self) -> anyhow::Result<()> {
        let output = self
            .sqs_client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(MAX_MESSAGES_PER_POLL)
            .wait_time_seconds(POLL_WAIT_TIME_SECONDS)
            .send()
            .await?;

        for message in output.messages() {
            if let Some(body) = message.body() {
                self.process_notification(body).await;
            }

            // Fire-and-forget: the message is consumed even when the run
            // failed, matching the asynchronous trigger contract.
            if let Some(receipt_handle) = message.receipt_handle() {
                if let Err(error) = self
                    .sqs_client
                    .delete_message()
                    .queue_url(&self.queue_url)
                    .receipt_handle(receipt_handle)
                    .send()
                    .await
                {
                    warn!(%error, "failed to delete processed message");
                }
            }
        }

        Ok(())
    }

    /// Parses one notification body and ingests every CSV object it names
    async fn process_notification(&self, body: &str) {
        let event: S3EventNotification = match serde_json::from_str(body) {
            Ok(event) => event,
            Err(error) => {
                warn!(%error, "discarding undecodable queue message");
                return;
            }
        };

        for record in &event.records {
            let key = &record.s3.object.key;
            if !events::is_csv_key(key) {
                debug!(key, "skipping non-CSV object");
                continue;
            }

            match self
                .pipeline
                .ingest_object(key, record.s3.object.size)
                .await
            {
                Ok(summary) => info!(
                    key,
                    run_date = %summary.run_date,
                    item_count = summary.item_count,
                    row_count = summary.row_count,
                    "ingestion run succeeded"
                ),
                Err(error) => error!(key, %error, "ingestion run failed"),
            }
        }
    }
}
