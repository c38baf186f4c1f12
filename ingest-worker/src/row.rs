//! Row normalization for price book CSV files
//!
//! A book file carries 3 header/metadata lines followed by data rows with a
//! fixed, ordered set of columns. Parsing is positional and relaxed: a row
//! shorter than the declared column list backfills the missing trailing
//! columns with empty strings instead of failing the run.

use catalog_storage::record::{book_partition_key, item_sort_key, ItemRecord};
use chrono::NaiveDate;
use csv::StringRecord;

/// Header/metadata lines to skip before the first data row
pub const HEADER_LINES: usize = 3;

/// Source columns in file order
///
/// The discriminant is the column's position in a data row; this enum is the
/// single authoritative column table, replacing name-keyed access.
#[derive(Debug, Clone, Copy)]
#[repr(usize)]
pub enum Column {
    CustNbr,
    RunDate,
    EffDate,
    Zone,
    ProdCode,
    Brand,
    Description,
    Pack,
    Size,
    CusPrd,
    PoaIdent,
    ItemCode,
    RestrictPfInd,
    DealPackInd,
    CripPoa,
    SlowMover,
    FullCaseInd,
    DsdInd,
    ThirteenWk,
    AkaType,
    Upc,
    Allow,
    AllowInd,
    AllowEndDate,
    Cost,
    CostInd,
    NetCost,
    UnitCost,
    NetUnitCost,
    ZoneNbr,
    BaseZoneMult,
    BaseZoneSrp,
    BaseZoneInd,
    BaseZonePct,
    BaseZonePctInd,
    RdcdZoneMult,
    RdcdZoneSrp,
    RdcdZoneInd,
    RdcdZonePct,
    RdcdZonePctInd,
    BaseCripMult,
    BaseCripSrp,
    BaseCripSrpInd,
    BaseCripPct,
    BaseCripPctInd,
    RdcdCripMult,
    RdcdCripSrp,
    RdcdCripSrpInd,
    RdcdCripPct,
    RdcdCripPctInd,
    RdcdSrpInd,
    EndDate,
    PalletQty,
    ItemAuth,
    ItemStatus,
    CategoryClass,
    CategoryClassDescription,
    ClassId,
    ClassDesc,
    SubClassId,
    SubClassDescription,
    VarietyId,
    VarietyDesc,
}

/// Reads one column of a row, backfilling missing trailing columns
fn column(row: &StringRecord, col: Column) -> String {
    row.get(col as usize).unwrap_or("").to_string()
}

/// Reads the raw `RunDate` column of a row
#[must_use]
pub fn raw_run_date(row: &StringRecord) -> String {
    column(row, Column::RunDate)
}

/// Normalizes a raw run date to `YYYY-MM-DD`
///
/// Accepts the source file's locale format (`3/14/2024`) as well as an
/// already ISO-formatted date.
#[must_use]
pub fn normalize_run_date(raw: &str) -> Option<String> {
    const FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d", "%m-%d-%Y"];

    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Converts a data row into a canonical Item record
///
/// `run_date` is the run's normalized date; it replaces the row's own
/// `RunDate` value and drives key derivation. All other columns are copied
/// verbatim.
#[must_use]
pub fn item_record(row: &StringRecord, run_date: &str) -> ItemRecord {
    let col = |c: Column| column(row, c);

    let class_desc = col(Column::ClassDesc);
    let brand = col(Column::Brand);
    let description = col(Column::Description);
    let size = col(Column::Size);
    let pack = col(Column::Pack);
    let item_code = col(Column::ItemCode);

    ItemRecord {
        pk: book_partition_key(run_date),
        sk: item_sort_key(&class_desc, &brand, &description, &size, &pack, &item_code),
        run_date: run_date.to_string(),
        cust_nbr: col(Column::CustNbr),
        eff_date: col(Column::EffDate),
        zone: col(Column::Zone),
        prod_code: col(Column::ProdCode),
        brand,
        description,
        pack,
        size,
        cus_prd: col(Column::CusPrd),
        poa_ident: col(Column::PoaIdent),
        item_code,
        restrict_pf_ind: col(Column::RestrictPfInd),
        deal_pack_ind: col(Column::DealPackInd),
        crip_poa: col(Column::CripPoa),
        slow_mover: col(Column::SlowMover),
        full_case_ind: col(Column::FullCaseInd),
        dsd_ind: col(Column::DsdInd),
        thirteen_wk: col(Column::ThirteenWk),
        aka_type: col(Column::AkaType),
        upc: col(Column::Upc),
        allow: col(Column::Allow),
        allow_ind: col(Column::AllowInd),
        allow_end_date: col(Column::AllowEndDate),
        cost: col(Column::Cost),
        cost_ind: col(Column::CostInd),
        net_cost: col(Column::NetCost),
        unit_cost: col(Column::UnitCost),
        net_unit_cost: col(Column::NetUnitCost),
        zone_nbr: col(Column::ZoneNbr),
        base_zone_mult: col(Column::BaseZoneMult),
        base_zone_srp: col(Column::BaseZoneSrp),
        base_zone_ind: col(Column::BaseZoneInd),
        base_zone_pct: col(Column::BaseZonePct),
        base_zone_pct_ind: col(Column::BaseZonePctInd),
        rdcd_zone_mult: col(Column::RdcdZoneMult),
        rdcd_zone_srp: col(Column::RdcdZoneSrp),
        rdcd_zone_ind: col(Column::RdcdZoneInd),
        rdcd_zone_pct: col(Column::RdcdZonePct),
        rdcd_zone_pct_ind: col(Column::RdcdZonePctInd),
        base_crip_mult: col(Column::BaseCripMult),
        base_crip_srp: col(Column::BaseCripSrp),
        base_crip_srp_ind: col(Column::BaseCripSrpInd),
        base_crip_pct: col(Column::BaseCripPct),
        base_crip_pct_ind: col(Column::BaseCripPctInd),
        rdcd_crip_mult: col(Column::RdcdCripMult),
        rdcd_crip_srp: col(Column::RdcdCripSrp),
        rdcd_crip_srp_ind: col(Column::RdcdCripSrpInd),
        rdcd_crip_pct: col(Column::RdcdCripPct),
        rdcd_crip_pct_ind: col(Column::RdcdCripPctInd),
        rdcd_srp_ind: col(Column::RdcdSrpInd),
        end_date: col(Column::EndDate),
        pallet_qty: col(Column::PalletQty),
        item_auth: col(Column::ItemAuth),
        item_status: col(Column::ItemStatus),
        category_class: col(Column::CategoryClass),
        category_class_description: col(Column::CategoryClassDescription),
        class_id: col(Column::ClassId),
        class_desc,
        sub_class_id: col(Column::SubClassId),
        sub_class_description: col(Column::SubClassDescription),
        variety_id: col(Column::VarietyId),
        variety_desc: col(Column::VarietyDesc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_with(values: &[(Column, &str)]) -> StringRecord {
        let mut fields = vec![String::new(); Column::VarietyDesc as usize + 1];
        for (col, value) in values {
            fields[*col as usize] = (*value).to_string();
        }
        StringRecord::from(fields)
    }

    #[test]
    fn normalizes_locale_run_date() {
        assert_eq!(normalize_run_date("3/14/2024").as_deref(), Some("2024-03-14"));
        assert_eq!(normalize_run_date("12/01/2024").as_deref(), Some("2024-12-01"));
        assert_eq!(normalize_run_date(" 3/14/2024 ").as_deref(), Some("2024-03-14"));
    }

    #[test]
    fn accepts_iso_run_date() {
        assert_eq!(normalize_run_date("2024-03-14").as_deref(), Some("2024-03-14"));
    }

    #[test]
    fn rejects_garbage_run_date() {
        assert!(normalize_run_date("not a date").is_none());
        assert!(normalize_run_date("").is_none());
    }

    #[test]
    fn derives_keys_from_identity_columns() {
        let row = row_with(&[
            (Column::ClassDesc, "DAIRY"),
            (Column::Brand, "ACME"),
            (Column::Description, "MILK 2%"),
            (Column::Size, "1 GAL"),
            (Column::Pack, "4"),
            (Column::ItemCode, "123456"),
            (Column::RunDate, "3/14/2024"),
        ]);

        let record = item_record(&row, "2024-03-14");
        assert_eq!(record.pk, "BOOK#2024-03-14");
        assert_eq!(record.sk, "ITEM#DAIRY#ACME#MILK 2%#1 GAL#4#123456");
        // The stored RunDate is the run's date, not the row's raw value.
        assert_eq!(record.run_date, "2024-03-14");
    }

    #[test]
    fn short_rows_backfill_missing_columns() {
        // Only the first three columns present.
        let row = StringRecord::from(vec!["42", "3/14/2024", "3/15/2024"]);
        let record = item_record(&row, "2024-03-14");

        assert_eq!(record.cust_nbr, "42");
        assert_eq!(record.eff_date, "3/15/2024");
        assert_eq!(record.variety_desc, "");
        assert_eq!(record.sk, "ITEM######");
    }

    #[test]
    fn copies_passthrough_columns_verbatim() {
        let row = row_with(&[
            (Column::Upc, "0001234567890"),
            (Column::Cost, "12.34"),
            (Column::VarietyDesc, "ORGANIC"),
        ]);

        let record = item_record(&row, "2024-03-14");
        assert_eq!(record.upc, "0001234567890");
        assert_eq!(record.cost, "12.34");
        assert_eq!(record.variety_desc, "ORGANIC");
    }
}
