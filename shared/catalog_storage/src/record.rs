//! Record model for the single catalog table
//!
//! Books and Items share one physical keyspace. At the application layer the
//! two kinds are a tagged union discriminated by the `Type` attribute, so a
//! raw row read from the table always deserializes into a [`CatalogRecord`]
//! before anything downstream touches it.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Prefix shared by every partition key and by Book sort keys
pub const BOOK_KEY_PREFIX: &str = "BOOK#";

/// Prefix of every Item sort key
pub const ITEM_KEY_PREFIX: &str = "ITEM#";

/// Attribute names for the catalog table
///
/// Covers the primary key, the type discriminant and the GSI key attributes.
/// The ~60 passthrough columns are handled by serde renames on the record
/// structs and never referenced in key expressions.
#[derive(Debug, Clone, Copy, Display)]
#[strum(serialize_all = "PascalCase")]
pub enum CatalogAttribute {
    /// Partition key, `BOOK#<runDate>`
    Pk,
    /// Sort key, `BOOK#<runDate>` for Books or `ITEM#<...>` for Items
    Sk,
    /// Record kind discriminant, `BOOK` or `ITEM` (also the `ByType` GSI hash key)
    Type,
    /// `ByItemCode` GSI hash key
    ItemCode,
    /// `ByUpc` GSI hash key
    Upc,
    /// Normalized run date, used by the in-memory post-filter
    RunDate,
}

/// Builds the partition key for a run date
#[must_use]
pub fn book_partition_key(run_date: &str) -> String {
    format!("{BOOK_KEY_PREFIX}{run_date}")
}

/// Builds the composite Item sort key
///
/// The six identity columns joined in this exact order are the deduplication
/// key within a run; two rows composing the same sort key are the same item.
#[must_use]
pub fn item_sort_key(
    class_desc: &str,
    brand: &str,
    description: &str,
    size: &str,
    pack: &str,
    item_code: &str,
) -> String {
    format!("{ITEM_KEY_PREFIX}{class_desc}#{brand}#{description}#{size}#{pack}#{item_code}")
}

/// Extracts the run date from a partition key by stripping the `BOOK#` prefix
#[must_use]
pub fn run_date_from_partition_key(pk: &str) -> Option<&str> {
    pk.strip_prefix(BOOK_KEY_PREFIX)
}

/// A raw table row, tagged by the `Type` attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum CatalogRecord {
    /// Summary record for one ingested file
    #[serde(rename = "BOOK")]
    Book(BookRecord),
    /// One catalog line of an ingested file
    #[serde(rename = "ITEM")]
    Item(ItemRecord),
}

/// Summary record for one ingestion run, written after all Items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BookRecord {
    /// Partition key, `BOOK#<runDate>`
    pub pk: String,
    /// Sort key, equal to the partition key for Book rows
    pub sk: String,
    /// Normalized run date, `YYYY-MM-DD`
    pub run_date: String,
    /// Object key of the ingested file
    pub file_name: String,
    /// File size in KB, rounded to 2 decimals
    pub file_size: f64,
    /// Number of distinct items written for this run
    pub item_count: u32,
    /// Distinct class descriptions seen in the file
    pub class_descs: Vec<String>,
}

impl BookRecord {
    /// Creates a Book record with its keys derived from the run date
    #[must_use]
    pub fn new(
        run_date: String,
        file_name: String,
        file_size: f64,
        item_count: u32,
        class_descs: Vec<String>,
    ) -> Self {
        let pk = book_partition_key(&run_date);
        Self {
            sk: pk.clone(),
            pk,
            run_date,
            file_name,
            file_size,
            item_count,
            class_descs,
        }
    }
}

/// One catalog line for a run
///
/// Every source column is stored verbatim as a string attribute, except
/// `RunDate` which carries the run's normalized date. The keys are derived
/// from the run date and the six identity columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemRecord {
    /// Partition key, `BOOK#<runDate>`
    pub pk: String,
    /// Composite sort key, see [`item_sort_key`]
    pub sk: String,
    /// Normalized run date, `YYYY-MM-DD`
    pub run_date: String,

    // Passthrough columns, in source file order.
    pub cust_nbr: String,
    pub eff_date: String,
    pub zone: String,
    pub prod_code: String,
    pub brand: String,
    pub description: String,
    pub pack: String,
    pub size: String,
    pub cus_prd: String,
    pub poa_ident: String,
    pub item_code: String,
    pub restrict_pf_ind: String,
    pub deal_pack_ind: String,
    pub crip_poa: String,
    pub slow_mover: String,
    pub full_case_ind: String,
    pub dsd_ind: String,
    pub thirteen_wk: String,
    pub aka_type: String,
    pub upc: String,
    pub allow: String,
    pub allow_ind: String,
    pub allow_end_date: String,
    pub cost: String,
    pub cost_ind: String,
    pub net_cost: String,
    pub unit_cost: String,
    pub net_unit_cost: String,
    pub zone_nbr: String,
    pub base_zone_mult: String,
    pub base_zone_srp: String,
    pub base_zone_ind: String,
    pub base_zone_pct: String,
    pub base_zone_pct_ind: String,
    pub rdcd_zone_mult: String,
    pub rdcd_zone_srp: String,
    pub rdcd_zone_ind: String,
    pub rdcd_zone_pct: String,
    pub rdcd_zone_pct_ind: String,
    pub base_crip_mult: String,
    pub base_crip_srp: String,
    pub base_crip_srp_ind: String,
    pub base_crip_pct: String,
    pub base_crip_pct_ind: String,
    pub rdcd_crip_mult: String,
    pub rdcd_crip_srp: String,
    pub rdcd_crip_srp_ind: String,
    pub rdcd_crip_pct: String,
    pub rdcd_crip_pct_ind: String,
    pub rdcd_srp_ind: String,
    pub end_date: String,
    pub pallet_qty: String,
    pub item_auth: String,
    pub item_status: String,
    pub category_class: String,
    pub category_class_description: String,
    pub class_id: String,
    pub class_desc: String,
    pub sub_class_id: String,
    pub sub_class_description: String,
    pub variety_id: String,
    pub variety_desc: String,
}

impl ItemRecord {
    /// Recomputes the composite sort key from the identity columns
    #[must_use]
    pub fn sort_key(&self) -> String {
        item_sort_key(
            &self.class_desc,
            &self.brand,
            &self.description,
            &self.size,
            &self.pack,
            &self.item_code,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_partition_key_has_prefix() {
        assert_eq!(book_partition_key("2024-03-14"), "BOOK#2024-03-14");
    }

    #[test]
    fn item_sort_key_joins_identity_columns_in_order() {
        let sk = item_sort_key("DAIRY", "ACME", "MILK 2%", "1 GAL", "4", "123456");
        assert_eq!(sk, "ITEM#DAIRY#ACME#MILK 2%#1 GAL#4#123456");
    }

    #[test]
    fn run_date_round_trips_through_partition_key() {
        let pk = book_partition_key("2024-03-14");
        assert_eq!(run_date_from_partition_key(&pk), Some("2024-03-14"));
        assert_eq!(run_date_from_partition_key("ITEM#x"), None);
    }

    #[test]
    fn book_record_keys_are_equal() {
        let book = BookRecord::new(
            "2024-03-14".to_string(),
            "book.csv".to_string(),
            12.34,
            2,
            vec!["DAIRY".to_string()],
        );
        assert_eq!(book.pk, "BOOK#2024-03-14");
        assert_eq!(book.pk, book.sk);
    }

    #[test]
    fn catalog_record_tags_by_type() {
        let book = BookRecord::new("2024-03-14".to_string(), "b.csv".to_string(), 1.0, 0, vec![]);
        let json = serde_json::to_value(CatalogRecord::Book(book)).unwrap();
        assert_eq!(json["Type"], "BOOK");
        assert_eq!(json["Pk"], "BOOK#2024-03-14");
    }
}
