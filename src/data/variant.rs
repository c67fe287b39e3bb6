use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::error::{CatalogError, Result};
use super::loader::{load_table, read_csv};
use super::model::RawTable;
use crate::config::CoercionPolicy;

pub const VARIANT_COLUMNS: [&str; 6] = [
    "Legacy Mutation ID",
    "gene_name",
    "resno",
    "org_res",
    "mut_res",
    "Count",
];

/// One individually observed mutation event.
///
/// Serde names match the source columns so exported rows read back with the
/// same header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    #[serde(rename = "Legacy Mutation ID")]
    pub legacy_id: String,
    pub gene_name: String,
    pub resno: i64,
    pub org_res: String,
    pub mut_res: String,
    #[serde(rename = "Count")]
    pub count: u64,
}

/// Immutable table of variants, indexed by (gene, residue number).
#[derive(Debug, Clone, Default)]
pub struct VariantCatalog {
    records: Vec<VariantRecord>,
    /// gene → residue number → record indices in load order
    by_residue: HashMap<String, BTreeMap<i64, Vec<usize>>>,
}

impl VariantCatalog {
    pub fn load(path: &Path, policy: CoercionPolicy) -> Result<Self> {
        let table = load_table(path)?;
        Self::from_table(&table, policy)
    }

    pub fn from_csv_reader<R: Read>(
        reader: R,
        source_name: &str,
        policy: CoercionPolicy,
    ) -> Result<Self> {
        let table = read_csv(reader, source_name)?;
        Self::from_table(&table, policy)
    }

    pub fn from_table(table: &RawTable, policy: CoercionPolicy) -> Result<Self> {
        let [legacy_id, gene, resno, org_res, mut_res, count] = table.require(VARIANT_COLUMNS)?;

        let records = table
            .readers(policy)
            .map(|row| -> Result<VariantRecord> {
                Ok(VariantRecord {
                    legacy_id: row.text(legacy_id)?,
                    gene_name: row.text(gene)?,
                    resno: row.integer(resno)?,
                    org_res: row.text(org_res)?,
                    mut_res: row.text(mut_res)?,
                    count: row.count(count)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let catalog = Self::from_records_named(records, &table.source_name)?;
        info!(
            "variant catalog {}: {} variants",
            table.source_name,
            catalog.len()
        );
        Ok(catalog)
    }

    /// Build from typed records; a repeated legacy mutation ID is a schema error.
    pub fn from_records(records: Vec<VariantRecord>) -> Result<Self> {
        Self::from_records_named(records, "<records>")
    }

    fn from_records_named(records: Vec<VariantRecord>, source_name: &str) -> Result<Self> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
        let mut by_residue: HashMap<String, BTreeMap<i64, Vec<usize>>> = HashMap::new();
        for (idx, rec) in records.iter().enumerate() {
            if !seen.insert(&rec.legacy_id) {
                return Err(CatalogError::schema(
                    source_name,
                    format!("duplicate Legacy Mutation ID '{}'", rec.legacy_id),
                ));
            }
            by_residue
                .entry(rec.gene_name.clone())
                .or_default()
                .entry(rec.resno)
                .or_default()
                .push(idx);
        }
        Ok(VariantCatalog { records, by_residue })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[VariantRecord] {
        &self.records
    }

    /// Variants observed at (gene, residue), in load order.
    pub fn filter(&self, gene: &str, resno: i64) -> Vec<&VariantRecord> {
        self.by_residue
            .get(gene)
            .and_then(|residues| residues.get(&resno))
            .map(|indices| indices.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }

    /// Distinct (gene, residue) pairs with at least one variant.
    pub fn residue_keys(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.by_residue.iter().flat_map(|(gene, residues)| {
            residues.keys().map(move |&resno| (gene.as_str(), resno))
        })
    }
}
