//! Client-facing views of stored records
//!
//! Each view enumerates its fields explicitly, giving an auditable mapping
//! from the stored PascalCase attributes to the client-facing camelCase
//! names instead of converting casings at runtime. Internal key fields
//! (`Pk`, `Sk`, `Type`) are never exposed; clients get only the opaque `id`.

use serde::Serialize;

use catalog_storage::cursor::encode_record_id;
use catalog_storage::record::{BookRecord, ItemRecord};

/// Client-facing Book summary
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    id: String,
    run_date: String,
    file_name: String,
    file_size: f64,
    item_count: u32,
    class_descs: Vec<String>,
}

impl From<BookRecord> for BookView {
    fn from(record: BookRecord) -> Self {
        Self {
            id: encode_record_id(&record.pk, &record.sk),
            run_date: record.run_date,
            file_name: record.file_name,
            file_size: record.file_size,
            item_count: record.item_count,
            class_descs: record.class_descs,
        }
    }
}

/// Client-facing catalog item
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    id: String,
    run_date: String,
    cust_nbr: String,
    eff_date: String,
    zone: String,
    prod_code: String,
    brand: String,
    description: String,
    pack: String,
    size: String,
    cus_prd: String,
    poa_ident: String,
    item_code: String,
    restrict_pf_ind: String,
    deal_pack_ind: String,
    crip_poa: String,
    slow_mover: String,
    full_case_ind: String,
    dsd_ind: String,
    thirteen_wk: String,
    aka_type: String,
    upc: String,
    allow: String,
    allow_ind: String,
    allow_end_date: String,
    cost: String,
    cost_ind: String,
    net_cost: String,
    unit_cost: String,
    net_unit_cost: String,
    zone_nbr: String,
    base_zone_mult: String,
    base_zone_srp: String,
    base_zone_ind: String,
    base_zone_pct: String,
    base_zone_pct_ind: String,
    rdcd_zone_mult: String,
    rdcd_zone_srp: String,
    rdcd_zone_ind: String,
    rdcd_zone_pct: String,
    rdcd_zone_pct_ind: String,
    base_crip_mult: String,
    base_crip_srp: String,
    base_crip_srp_ind: String,
    base_crip_pct: String,
    base_crip_pct_ind: String,
    rdcd_crip_mult: String,
    rdcd_crip_srp: String,
    rdcd_crip_srp_ind: String,
    rdcd_crip_pct: String,
    rdcd_crip_pct_ind: String,
    rdcd_srp_ind: String,
    end_date: String,
    pallet_qty: String,
    item_auth: String,
    item_status: String,
    category_class: String,
    category_class_description: String,
    class_id: String,
    class_desc: String,
    sub_class_id: String,
    sub_class_description: String,
    variety_id: String,
    variety_desc: String,
}

impl From<ItemRecord> for ItemView {
    fn from(record: ItemRecord) -> Self {
        Self {
            id: encode_record_id(&record.pk, &record.sk),
            run_date: record.run_date,
            cust_nbr: record.cust_nbr,
            eff_date: record.eff_date,
            zone: record.zone,
            prod_code: record.prod_code,
            brand: record.brand,
            description: record.description,
            pack: record.pack,
            size: record.size,
            cus_prd: record.cus_prd,
            poa_ident: record.poa_ident,
            item_code: record.item_code,
            restrict_pf_ind: record.restrict_pf_ind,
            deal_pack_ind: record.deal_pack_ind,
            crip_poa: record.crip_poa,
            slow_mover: record.slow_mover,
            full_case_ind: record.full_case_ind,
            dsd_ind: record.dsd_ind,
            thirteen_wk: record.thirteen_wk,
            aka_type: record.aka_type,
            upc: record.upc,
            allow: record.allow,
            allow_ind: record.allow_ind,
            allow_end_date: record.allow_end_date,
            cost: record.cost,
            cost_ind: record.cost_ind,
            net_cost: record.net_cost,
            unit_cost: record.unit_cost,
            net_unit_cost: record.net_unit_cost,
            zone_nbr: record.zone_nbr,
            base_zone_mult: record.base_zone_mult,
            base_zone_srp: record.base_zone_srp,
            base_zone_ind: record.base_zone_ind,
            base_zone_pct: record.base_zone_pct,
            base_zone_pct_ind: record.base_zone_pct_ind,
            rdcd_zone_mult: record.rdcd_zone_mult,
            rdcd_zone_srp: record.rdcd_zone_srp,
            rdcd_zone_ind: record.rdcd_zone_ind,
            rdcd_zone_pct: record.rdcd_zone_pct,
            rdcd_zone_pct_ind: record.rdcd_zone_pct_ind,
            base_crip_mult: record.base_crip_mult,
            base_crip_srp: record.base_crip_srp,
            base_crip_srp_ind: record.base_crip_srp_ind,
            base_crip_pct: record.base_crip_pct,
            base_crip_pct_ind: record.base_crip_pct_ind,
            rdcd_crip_mult: record.rdcd_crip_mult,
            rdcd_crip_srp: record.rdcd_crip_srp,
            rdcd_crip_srp_ind: record.rdcd_crip_srp_ind,
            rdcd_crip_pct: record.rdcd_crip_pct,
            rdcd_crip_pct_ind: record.rdcd_crip_pct_ind,
            rdcd_srp_ind: record.rdcd_srp_ind,
            end_date: record.end_date,
            pallet_qty: record.pallet_qty,
            item_auth: record.item_auth,
            item_status: record.item_status,
            category_class: record.category_class,
            category_class_description: record.category_class_description,
            class_id: record.class_id,
            class_desc: record.class_desc,
            sub_class_id: record.sub_class_id,
            sub_class_description: record.sub_class_description,
            variety_id: record.variety_id,
            variety_desc: record.variety_desc,
        }
    }
}
