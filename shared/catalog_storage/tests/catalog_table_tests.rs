use std::collections::HashSet;
use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use catalog_storage::catalog::{CatalogStorage, PageRequest, SortOrder};
use catalog_storage::record::{book_partition_key, item_sort_key, BookRecord, ItemRecord};

/// Test configuration for LocalStack
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";
const TEST_REGION: &str = "us-east-1";

/// Test context that automatically cleans up the table on drop
struct TestContext {
    storage: CatalogStorage,
    table_name: String,
    dynamodb_client: Arc<DynamoDbClient>,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let client = self.dynamodb_client.clone();
        let table = self.table_name.clone();

        let handle = tokio::runtime::Handle::try_current();
        if let Ok(handle) = handle {
            handle.spawn(async move {
                let _ = client.delete_table().table_name(&table).send().await;
            });
        }
    }
}

fn string_attribute(name: &str) -> AttributeDefinition {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .unwrap()
}

fn key_schema(hash: &str, range: &str) -> Vec<KeySchemaElement> {
    vec![
        KeySchemaElement::builder()
            .attribute_name(hash)
            .key_type(KeyType::Hash)
            .build()
            .unwrap(),
        KeySchemaElement::builder()
            .attribute_name(range)
            .key_type(KeyType::Range)
            .build()
            .unwrap(),
    ]
}

fn secondary_index(name: &str, hash: &str) -> GlobalSecondaryIndex {
    GlobalSecondaryIndex::builder()
        .index_name(name)
        .set_key_schema(Some(key_schema(hash, "Sk")))
        .projection(
            Projection::builder()
                .projection_type(ProjectionType::All)
                .build(),
        )
        .build()
        .unwrap()
}

/// Creates a test setup with a unique catalog table and its three GSIs
async fn setup_test() -> TestContext {
    let table_name = format!("test-catalog-{}", Uuid::new_v4());

    let credentials = Credentials::from_keys("test", "test", None);
    let config = aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .region(Region::new(TEST_REGION))
        .credentials_provider(credentials)
        .load()
        .await;

    let dynamodb_client = Arc::new(DynamoDbClient::new(&config));

    dynamodb_client
        .create_table()
        .table_name(&table_name)
        .set_attribute_definitions(Some(vec![
            string_attribute("Pk"),
            string_attribute("Sk"),
            string_attribute("Type"),
            string_attribute("ItemCode"),
            string_attribute("Upc"),
        ]))
        .set_key_schema(Some(key_schema("Pk", "Sk")))
        .global_secondary_indexes(secondary_index("ByType", "Type"))
        .global_secondary_indexes(secondary_index("ByItemCode", "ItemCode"))
        .global_secondary_indexes(secondary_index("ByUpc", "Upc"))
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await
        .expect("Failed to create test table");

    let storage = CatalogStorage::new(dynamodb_client.clone(), table_name.clone());

    TestContext {
        storage,
        table_name,
        dynamodb_client,
    }
}

/// Builds an Item record with the identity columns set and everything else empty
fn test_item(
    run_date: &str,
    class_desc: &str,
    brand: &str,
    description: &str,
    item_code: &str,
    upc: &str,
) -> ItemRecord {
    ItemRecord {
        pk: book_partition_key(run_date),
        sk: item_sort_key(class_desc, brand, description, "12 OZ", "24", item_code),
        run_date: run_date.to_string(),
        class_desc: class_desc.to_string(),
        brand: brand.to_string(),
        description: description.to_string(),
        size: "12 OZ".to_string(),
        pack: "24".to_string(),
        item_code: item_code.to_string(),
        upc: upc.to_string(),
        ..ItemRecord::default()
    }
}

fn page(limit: i32, sort: SortOrder, cursor: Option<String>) -> PageRequest {
    PageRequest {
        limit,
        sort,
        cursor,
    }
}

#[tokio::test]
async fn batch_writes_are_idempotent_by_sort_key() {
    let ctx = setup_test().await;

    let items = vec![
        test_item("2024-03-14", "DAIRY", "ACME", "MILK", "100", "0001"),
        test_item("2024-03-14", "DAIRY", "ACME", "CREAM", "101", "0002"),
        test_item("2024-03-14", "BAKERY", "ACME", "BREAD", "102", "0003"),
    ];

    // Writing the same records twice must leave the same rows behind.
    ctx.storage.batch_put_items(&items).await.unwrap();
    ctx.storage.batch_put_items(&items).await.unwrap();

    let result = ctx
        .storage
        .query_items_by_run("2024-03-14", &page(50, SortOrder::Asc, None))
        .await
        .unwrap();

    assert_eq!(result.records.len(), 3);
    assert!(result.next_cursor.is_none());
}

#[tokio::test]
async fn class_desc_query_matches_sort_key_prefix() {
    let ctx = setup_test().await;

    let items = vec![
        test_item("2024-03-14", "DAIRY", "ACME", "MILK", "100", "0001"),
        test_item("2024-03-14", "DAIRY", "BETA", "YOGURT", "101", "0002"),
        test_item("2024-03-14", "BAKERY", "ACME", "BREAD", "102", "0003"),
    ];
    ctx.storage.batch_put_items(&items).await.unwrap();

    let result = ctx
        .storage
        .query_items_by_class_desc("2024-03-14", "DAIRY", &page(50, SortOrder::Asc, None))
        .await
        .unwrap();

    assert_eq!(result.records.len(), 2);
    assert!(result.records.iter().all(|r| r.class_desc == "DAIRY"));
}

#[tokio::test]
async fn pagination_terminates_and_unions_to_full_result_set() {
    let ctx = setup_test().await;

    let items: Vec<ItemRecord> = (0..7)
        .map(|i| {
            test_item(
                "2024-03-14",
                "DAIRY",
                "ACME",
                &format!("PRODUCT {i}"),
                &format!("10{i}"),
                &format!("000{i}"),
            )
        })
        .collect();
    ctx.storage.batch_put_items(&items).await.unwrap();

    let mut seen: HashSet<String> = HashSet::new();
    let mut cursor = None;
    let mut pages = 0;

    loop {
        let result = ctx
            .storage
            .query_items_by_run("2024-03-14", &page(3, SortOrder::Asc, cursor))
            .await
            .unwrap();

        for record in &result.records {
            // No duplicates across pages.
            assert!(seen.insert(record.sk.clone()));
        }

        pages += 1;
        assert!(pages <= 7, "pagination did not terminate");

        match result.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    assert_eq!(seen.len(), items.len());
}

#[tokio::test]
async fn item_code_query_spans_runs_and_post_filters_by_run_date() {
    let ctx = setup_test().await;

    ctx.storage
        .batch_put_items(&[
            test_item("2024-02-01", "DAIRY", "ACME", "MILK", "ABC123", "0001"),
            test_item("2024-03-14", "DAIRY", "ACME", "MILK", "ABC123", "0001"),
        ])
        .await
        .unwrap();

    let unfiltered = ctx
        .storage
        .query_items_by_item_code("ABC123", None, &page(10, SortOrder::Asc, None))
        .await
        .unwrap();
    assert_eq!(unfiltered.records.len(), 2);

    let filtered = ctx
        .storage
        .query_items_by_item_code("ABC123", Some("2024-03-14"), &page(10, SortOrder::Asc, None))
        .await
        .unwrap();
    assert_eq!(filtered.records.len(), 1);
    assert_eq!(filtered.records[0].run_date, "2024-03-14");
}

#[tokio::test]
async fn filtered_empty_page_still_reports_continuation() {
    let ctx = setup_test().await;

    // Two rows under one item code; with limit 1 and a run-date filter that
    // only the second row matches, the first page comes back empty but must
    // still carry a cursor.
    ctx.storage
        .batch_put_items(&[
            test_item("2024-02-01", "BAKERY", "ACME", "BREAD", "ABC123", "0001"),
            test_item("2024-03-14", "DAIRY", "ACME", "MILK", "ABC123", "0001"),
        ])
        .await
        .unwrap();

    let first = ctx
        .storage
        .query_items_by_item_code("ABC123", Some("2024-03-14"), &page(1, SortOrder::Asc, None))
        .await
        .unwrap();

    assert!(first.records.is_empty());
    let cursor = first.next_cursor.expect("continuation cursor expected");

    let second = ctx
        .storage
        .query_items_by_item_code(
            "ABC123",
            Some("2024-03-14"),
            &page(1, SortOrder::Asc, Some(cursor)),
        )
        .await
        .unwrap();
    assert_eq!(second.records.len(), 1);
    assert_eq!(second.records[0].run_date, "2024-03-14");
}

#[tokio::test]
async fn upc_query_matches_index_key() {
    let ctx = setup_test().await;

    ctx.storage
        .batch_put_items(&[
            test_item("2024-03-14", "DAIRY", "ACME", "MILK", "100", "0001"),
            test_item("2024-03-14", "DAIRY", "ACME", "CREAM", "101", "0002"),
        ])
        .await
        .unwrap();

    let result = ctx
        .storage
        .query_items_by_upc("0002", None, &page(10, SortOrder::Asc, None))
        .await
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].description, "CREAM");
}

#[tokio::test]
async fn book_listing_defaults_to_newest_first() {
    let ctx = setup_test().await;

    for run_date in ["2024-02-01", "2024-03-14", "2024-01-05"] {
        let book = BookRecord::new(
            run_date.to_string(),
            format!("book-{run_date}.csv"),
            10.5,
            3,
            vec!["DAIRY".to_string()],
        );
        ctx.storage.put_book(&book).await.unwrap();
    }

    let result = ctx
        .storage
        .list_books(None, &page(10, SortOrder::Desc, None))
        .await
        .unwrap();

    let dates: Vec<&str> = result.records.iter().map(|b| b.run_date.as_str()).collect();
    assert_eq!(dates, vec!["2024-03-14", "2024-02-01", "2024-01-05"]);
}

#[tokio::test]
async fn book_listing_narrows_to_exact_run_date() {
    let ctx = setup_test().await;

    for run_date in ["2024-02-01", "2024-03-14"] {
        let book = BookRecord::new(run_date.to_string(), "b.csv".to_string(), 1.0, 0, vec![]);
        ctx.storage.put_book(&book).await.unwrap();
    }

    let result = ctx
        .storage
        .list_books(Some("2024-03-14"), &page(10, SortOrder::Desc, None))
        .await
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].run_date, "2024-03-14");
    assert_eq!(result.records[0].item_count, 0);
}

#[tokio::test]
async fn put_book_overwrites_same_run_date() {
    let ctx = setup_test().await;

    let first = BookRecord::new(
        "2024-03-14".to_string(),
        "book.csv".to_string(),
        10.5,
        3,
        vec!["DAIRY".to_string()],
    );
    ctx.storage.put_book(&first).await.unwrap();

    let second = BookRecord::new(
        "2024-03-14".to_string(),
        "book.csv".to_string(),
        10.5,
        5,
        vec!["DAIRY".to_string(), "BAKERY".to_string()],
    );
    ctx.storage.put_book(&second).await.unwrap();

    let result = ctx
        .storage
        .list_books(Some("2024-03-14"), &page(10, SortOrder::Desc, None))
        .await
        .unwrap();

    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].item_count, 5);
}

#[tokio::test]
async fn oversized_batch_is_rejected() {
    let ctx = setup_test().await;

    let items: Vec<ItemRecord> = (0..26)
        .map(|i| {
            test_item(
                "2024-03-14",
                "DAIRY",
                "ACME",
                &format!("P{i}"),
                &format!("{i}"),
                &format!("{i}"),
            )
        })
        .collect();

    let err = ctx.storage.batch_put_items(&items).await.unwrap_err();
    assert!(err.to_string().contains("26"));
}
