//! Streaming CSV ingestion pipeline
//!
//! One run streams a single uploaded book file from S3 into the catalog
//! table: rows are parsed on a blocking reader task, handed over a bounded
//! channel, deduplicated by composite sort key, batch-written in accumulation
//! order, and summarized by exactly one Book record at the end. A failed
//! batch write terminates the run without the Book record; previously
//! committed batches stay.

use std::collections::{BTreeSet, HashSet};
use std::io::BufRead;
use std::sync::Arc;
use std::time::Instant;

use aws_sdk_s3::{error::SdkError, operation::get_object::GetObjectError, Client as S3Client};
use csv::StringRecord;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::io::SyncIoBridge;

use catalog_storage::catalog::{CatalogStorage, CatalogStorageError, MAX_BATCH_WRITE_ITEMS};
use catalog_storage::record::{BookRecord, ItemRecord};

use crate::row::{self, HEADER_LINES};

/// Bounded capacity between the reader task and the write loop
const ROW_CHANNEL_CAPACITY: usize = 256;

/// Errors that terminate an ingestion run
#[derive(Error, Debug)]
pub enum IngestError {
    /// Failed to fetch the uploaded object from S3
    #[error("Failed to get object from S3: {0}")]
    S3GetError(#[from] SdkError<GetObjectError>),

    /// A catalog write failed
    #[error(transparent)]
    StorageError(#[from] CatalogStorageError),

    /// The CSV stream could not be read
    #[error("Failed to read CSV stream: {0}")]
    ReadError(#[from] std::io::Error),

    /// The first data row's `RunDate` did not parse as a calendar date
    #[error("First row has an unparseable RunDate: {0:?}")]
    InvalidRunDate(String),

    /// The file had no data rows to derive a run date from
    #[error("File contains no data rows")]
    EmptyFile,

    /// The blocking reader task panicked or was cancelled
    #[error("CSV reader task failed: {0}")]
    ReaderTaskError(String),
}

/// Summary of one completed ingestion run
#[derive(Debug)]
pub struct RunSummary {
    /// Normalized run date the file resolved to
    pub run_date: String,
    /// Rows parsed from the file, duplicates included
    pub row_count: usize,
    /// Distinct items written
    pub item_count: u32,
}

/// Per-run dedup and batching state
///
/// Instantiated for one ingestion invocation and discarded with it; never
/// shared across runs. First occurrence of a sort key wins, later duplicates
/// are dropped silently.
#[derive(Debug, Default)]
pub struct RunAccumulator {
    seen: HashSet<String>,
    class_descs: BTreeSet<String>,
    pending: Vec<ItemRecord>,
    duplicate_rows: usize,
}

impl RunAccumulator {
    /// Creates an empty accumulator for a new run
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers one normalized record; returns a full batch when 25 accumulate
    ///
    /// Duplicates (by sort key) are dropped and never counted.
    pub fn push(&mut self, record: ItemRecord) -> Option<Vec<ItemRecord>> {
        if !self.seen.insert(record.sk.clone()) {
            self.duplicate_rows += 1;
            return None;
        }

        self.class_descs.insert(record.class_desc.clone());
        self.pending.push(record);

        (self.pending.len() == MAX_BATCH_WRITE_ITEMS).then(|| std::mem::take(&mut self.pending))
    }

    /// Takes the final partial batch, leaving the accumulator empty
    pub fn take_pending(&mut self) -> Vec<ItemRecord> {
        std::mem::take(&mut self.pending)
    }

    /// Number of distinct items accepted so far
    ///
    /// This is the exact count written to the Book record: duplicates never
    /// contribute, and nothing is added on top of the distinct set.
    #[must_use]
    pub fn distinct_count(&self) -> u32 {
        u32::try_from(self.seen.len()).unwrap_or(u32::MAX)
    }

    /// Rows dropped as duplicates
    #[must_use]
    pub const fn duplicate_rows(&self) -> usize {
        self.duplicate_rows
    }

    /// Distinct class descriptions seen, in stable order
    #[must_use]
    pub fn class_descs(&self) -> Vec<String> {
        self.class_descs.iter().cloned().collect()
    }
}

/// Ingestion pipeline bound to one bucket and one catalog table
pub struct IngestPipeline {
    s3_client: Arc<S3Client>,
    storage: Arc<CatalogStorage>,
    bucket_name: String,
}

impl IngestPipeline {
    /// Creates a new ingestion pipeline
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `storage` - Catalog storage client
    /// * `bucket_name` - Bucket holding uploaded book files
    #[must_use]
    pub const fn new(
        s3_client: Arc<S3Client>,
        storage: Arc<CatalogStorage>,
        bucket_name: String,
    ) -> Self {
        Self {
            s3_client,
            storage,
            bucket_name,
        }
    }

    /// Ingests one uploaded book file
    ///
    /// Streams the object in a single forward pass; the whole file is never
    /// held in memory. The run is retryable at the file level: re-ingesting
    /// produces the same keys and overwrites the same rows.
    ///
    /// # Errors
    ///
    /// Returns `IngestError` when the run terminates early; Items from
    /// batches committed before the failure remain in the table and no Book
    /// record is written.
    pub async fn ingest_object(&self, key: &str, size_bytes: i64) -> Result<RunSummary, IngestError> {
        let started = Instant::now();
        tracing::info!(key, size_bytes, "starting ingestion run");

        let object = self
            .s3_client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await?;

        let reader = SyncIoBridge::new(tokio::io::BufReader::new(object.body.into_async_read()));
        let (row_tx, mut row_rx) = mpsc::channel::<StringRecord>(ROW_CHANNEL_CAPACITY);
        let reader_task = tokio::task::spawn_blocking(move || read_rows(reader, &row_tx));

        let mut accumulator = RunAccumulator::new();
        let mut run_date: Option<String> = None;
        let mut row_count: usize = 0;

        while let Some(csv_row) = row_rx.recv().await {
            row_count += 1;

            // The first row fixes the run date for the whole file.
            if run_date.is_none() {
                let raw = row::raw_run_date(&csv_row);
                let normalized =
                    row::normalize_run_date(&raw).ok_or(IngestError::InvalidRunDate(raw))?;
                tracing::info!(run_date = %normalized, "run date derived from first row");
                run_date = Some(normalized);
            }
            let date = run_date.as_deref().unwrap_or_default();

            let record = row::item_record(&csv_row, date);
            if let Some(batch) = accumulator.push(record) {
                self.write_batch(&batch).await?;
            }
        }

        match reader_task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(IngestError::ReadError(e)),
            Err(e) => return Err(IngestError::ReaderTaskError(e.to_string())),
        }

        let run_date = run_date.ok_or(IngestError::EmptyFile)?;

        let final_batch = accumulator.take_pending();
        if !final_batch.is_empty() {
            self.write_batch(&final_batch).await?;
        }

        let item_count = accumulator.distinct_count();
        #[allow(clippy::cast_precision_loss)]
        let file_size_kb = (size_bytes as f64 / 10_485.76).round() / 100.0;

        let book = BookRecord::new(
            run_date.clone(),
            key.to_string(),
            file_size_kb,
            item_count,
            accumulator.class_descs(),
        );
        self.storage.put_book(&book).await?;

        tracing::info!(
            run_date = %run_date,
            item_count,
            row_count,
            duplicate_rows = accumulator.duplicate_rows(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "ingestion run complete"
        );

        Ok(RunSummary {
            run_date,
            row_count,
            item_count,
        })
    }

    /// Writes one batch, logging its contents on failure before aborting
    async fn write_batch(&self, batch: &[ItemRecord]) -> Result<(), IngestError> {
        if let Err(error) = self.storage.batch_put_items(batch).await {
            tracing::error!(
                %error,
                batch_size = batch.len(),
                payload = %serde_json::to_string(batch).unwrap_or_default(),
                "batch write failed, terminating run"
            );
            return Err(error.into());
        }
        Ok(())
    }
}

/// Blocking reader: skips the header lines, then streams relaxed CSV rows
///
/// Malformed lines are logged and skipped; only I/O failures terminate the
/// reader. Returns once the stream ends or the receiving side hangs up.
fn read_rows(
    mut reader: impl BufRead,
    row_tx: &mpsc::Sender<StringRecord>,
) -> Result<(), std::io::Error> {
    let mut line = String::new();
    for _ in 0..HEADER_LINES {
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        line.clear();
    }

    let csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    for result in csv_reader.into_records() {
        match result {
            Ok(record) => {
                if row_tx.blocking_send(record).is_err() {
                    // Receiver dropped: the run already aborted.
                    return Ok(());
                }
            }
            Err(error) => tracing::warn!(%error, "skipping malformed CSV line"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(sk_suffix: &str, class_desc: &str, cost: &str) -> ItemRecord {
        ItemRecord {
            sk: format!("ITEM#{sk_suffix}"),
            class_desc: class_desc.to_string(),
            cost: cost.to_string(),
            ..ItemRecord::default()
        }
    }

    #[test]
    fn splits_53_items_into_batches_of_25_25_3() {
        let mut accumulator = RunAccumulator::new();
        let mut flushed = Vec::new();

        for i in 0..53 {
            if let Some(batch) = accumulator.push(record(&format!("{i}"), "DAIRY", "1.00")) {
                flushed.push(batch.len());
            }
        }
        let final_batch = accumulator.take_pending();

        assert_eq!(flushed, vec![25, 25]);
        assert_eq!(final_batch.len(), 3);
    }

    #[test]
    fn first_occurrence_wins_on_duplicate_sort_keys() {
        let mut accumulator = RunAccumulator::new();

        assert!(accumulator.push(record("same", "DAIRY", "1.00")).is_none());
        assert!(accumulator.push(record("same", "DAIRY", "9.99")).is_none());

        let pending = accumulator.take_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].cost, "1.00");
        assert_eq!(accumulator.duplicate_rows(), 1);
    }

    #[test]
    fn distinct_count_excludes_duplicates() {
        // The stored count is exactly the distinct set, with no offset.
        let mut accumulator = RunAccumulator::new();
        accumulator.push(record("a", "DAIRY", "1.00"));
        accumulator.push(record("b", "BAKERY", "2.00"));
        accumulator.push(record("a", "DAIRY", "3.00"));

        assert_eq!(accumulator.distinct_count(), 2);
    }

    #[test]
    fn collects_distinct_class_descs() {
        let mut accumulator = RunAccumulator::new();
        accumulator.push(record("a", "DAIRY", "1.00"));
        accumulator.push(record("b", "DAIRY", "1.00"));
        accumulator.push(record("c", "BAKERY", "1.00"));

        assert_eq!(accumulator.class_descs(), vec!["BAKERY", "DAIRY"]);
    }

    #[test]
    fn reader_skips_header_lines_and_trims_fields() {
        let input = "PRICE BOOK EXPORT\nGENERATED 3/14/2024\n\n42, 3/14/2024 ,3/15/2024\n43,3/14/2024,3/16/2024\n";
        let (tx, mut rx) = mpsc::channel(16);
        read_rows(std::io::Cursor::new(input), &tx).unwrap();
        drop(tx);

        let mut rows = Vec::new();
        while let Ok(row) = rx.try_recv() {
            rows.push(row);
        }

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(0), Some("42"));
        assert_eq!(rows[0].get(1), Some("3/14/2024"));
    }

    #[test]
    fn reader_tolerates_file_shorter_than_header() {
        let (tx, _rx) = mpsc::channel(4);
        read_rows(std::io::Cursor::new("only one line\n"), &tx).unwrap();
    }
}
