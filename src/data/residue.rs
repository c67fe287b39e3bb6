use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use log::info;

use super::error::{CatalogError, Result};
use super::loader::{load_table, read_csv};
use super::model::RawTable;
use crate::config::CoercionPolicy;

/// Columns a residue source must carry. Extra columns are ignored.
pub const RESIDUE_COLUMNS: [&str; 17] = [
    "gene_name",
    "resno_y",
    "org_res",
    "Count",
    "Gain-of-function",
    "Inconclusive",
    "Likely Gain-of-function",
    "Likely Loss-of-function",
    "Likely Neutral",
    "Loss-of-function",
    "Neutral",
    "cluster_labels",
    "model_no",
    "x",
    "y",
    "z",
    "residue_position_id",
];

// ---------------------------------------------------------------------------
// EffectCounts
// ---------------------------------------------------------------------------

/// Mutation-effect tallies observed at one residue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectCounts {
    pub gain_of_function: u64,
    pub inconclusive: u64,
    pub likely_gain_of_function: u64,
    pub likely_loss_of_function: u64,
    pub likely_neutral: u64,
    pub loss_of_function: u64,
    pub neutral: u64,
}

impl EffectCounts {
    /// `(category label, count)` in source column order.
    pub fn entries(&self) -> [(&'static str, u64); 7] {
        [
            ("Gain-of-function", self.gain_of_function),
            ("Inconclusive", self.inconclusive),
            ("Likely Gain-of-function", self.likely_gain_of_function),
            ("Likely Loss-of-function", self.likely_loss_of_function),
            ("Likely Neutral", self.likely_neutral),
            ("Loss-of-function", self.loss_of_function),
            ("Neutral", self.neutral),
        ]
    }

    pub fn total(&self) -> u64 {
        self.entries().iter().map(|(_, n)| n).sum()
    }
}

// ---------------------------------------------------------------------------
// ResidueRecord
// ---------------------------------------------------------------------------

/// One residue of one gene as resolved in one structural model.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueRecord {
    pub position_id: String,
    pub gene_name: String,
    pub resno: i64,
    pub model_no: i64,
    /// Original (wild-type) residue letter.
    pub org_res: String,
    /// Total observations at this residue.
    pub count: u64,
    pub effects: EffectCounts,
    pub cluster_label: String,
    /// `None` only when coordinates were coerced away at load.
    pub coords: Option<[f64; 3]>,
}

// ---------------------------------------------------------------------------
// ResidueCatalog
// ---------------------------------------------------------------------------

type ModelIndex = BTreeMap<i64, usize>;

/// Immutable table of residue records with lookups by id and by
/// (gene, residue number, model).
#[derive(Debug, Clone, Default)]
pub struct ResidueCatalog {
    records: Vec<ResidueRecord>,
    by_id: HashMap<String, usize>,
    /// gene → residue number → model number → record index
    by_gene: HashMap<String, BTreeMap<i64, ModelIndex>>,
    /// Genes in order of first appearance.
    genes: Vec<String>,
}

impl ResidueCatalog {
    /// Load a residue source file (`.csv`, `.json` or `.parquet`).
    pub fn load(path: &Path, policy: CoercionPolicy) -> Result<Self> {
        let table = load_table(path)?;
        Self::from_table(&table, policy)
    }

    /// Load residue CSV text from an in-memory reader.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        source_name: &str,
        policy: CoercionPolicy,
    ) -> Result<Self> {
        let table = read_csv(reader, source_name)?;
        Self::from_table(&table, policy)
    }

    /// Validate a raw table into typed records. Nothing is returned unless
    /// every row is valid.
    pub fn from_table(table: &RawTable, policy: CoercionPolicy) -> Result<Self> {
        let [gene, resno, org_res, count, gof, inconclusive, lgof, llof, lneutral, lof, neutral, cluster, model, x, y, z, id] =
            table.require(RESIDUE_COLUMNS)?;

        let mut records = Vec::with_capacity(table.len());
        for row in table.readers(policy) {
            let coords = match (row.coordinate(x)?, row.coordinate(y)?, row.coordinate(z)?) {
                (Some(x), Some(y), Some(z)) => Some([x, y, z]),
                _ => None,
            };
            records.push(ResidueRecord {
                position_id: row.text(id)?,
                gene_name: row.text(gene)?,
                resno: row.integer(resno)?,
                model_no: row.integer(model)?,
                org_res: row.text(org_res)?,
                count: row.count(count)?,
                effects: EffectCounts {
                    gain_of_function: row.count(gof)?,
                    inconclusive: row.count(inconclusive)?,
                    likely_gain_of_function: row.count(lgof)?,
                    likely_loss_of_function: row.count(llof)?,
                    likely_neutral: row.count(lneutral)?,
                    loss_of_function: row.count(lof)?,
                    neutral: row.count(neutral)?,
                },
                cluster_label: row.text(cluster)?,
                coords,
            });
        }

        let catalog = Self::from_records_named(records, &table.source_name)?;
        info!(
            "residue catalog {}: {} residues across {} genes",
            table.source_name,
            catalog.len(),
            catalog.genes.len()
        );
        Ok(catalog)
    }

    /// Build a catalog from already-typed records.
    ///
    /// Fails with a schema error if a `position_id` or a
    /// (gene, residue, model) triple occurs twice.
    pub fn from_records(records: Vec<ResidueRecord>) -> Result<Self> {
        Self::from_records_named(records, "<records>")
    }

    fn from_records_named(records: Vec<ResidueRecord>, source_name: &str) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut by_gene: HashMap<String, BTreeMap<i64, ModelIndex>> = HashMap::new();
        let mut genes = Vec::new();

        for (idx, rec) in records.iter().enumerate() {
            if by_id.insert(rec.position_id.clone(), idx).is_some() {
                return Err(CatalogError::schema(
                    source_name,
                    format!("duplicate residue_position_id '{}'", rec.position_id),
                ));
            }

            if !by_gene.contains_key(&rec.gene_name) {
                genes.push(rec.gene_name.clone());
            }
            let models = by_gene
                .entry(rec.gene_name.clone())
                .or_default()
                .entry(rec.resno)
                .or_default();
            if let Some(&prev) = models.get(&rec.model_no) {
                return Err(CatalogError::schema(
                    source_name,
                    format!(
                        "{} residue {} model {} appears as both '{}' and '{}'",
                        rec.gene_name, rec.resno, rec.model_no, records[prev].position_id, rec.position_id
                    ),
                ));
            }
            models.insert(rec.model_no, idx);
        }

        Ok(ResidueCatalog {
            records,
            by_id,
            by_gene,
            genes,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in load order.
    pub fn records(&self) -> &[ResidueRecord] {
        &self.records
    }

    /// Load-order index of a record.
    pub fn position(&self, position_id: &str) -> Option<usize> {
        self.by_id.get(position_id).copied()
    }

    pub fn get(&self, position_id: &str) -> Option<&ResidueRecord> {
        self.position(position_id).map(|i| &self.records[i])
    }

    /// Distinct gene names, in order of first appearance.
    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    /// Distinct residue numbers recorded for `gene`, ascending.
    pub fn lookup_by_gene(&self, gene: &str) -> Vec<i64> {
        self.by_gene
            .get(gene)
            .map(|residues| residues.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Structural models available at (gene, residue), ascending.
    pub fn models(&self, gene: &str, resno: i64) -> Vec<i64> {
        self.model_index(gene, resno)
            .map(|models| models.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, gene: &str, resno: i64) -> bool {
        self.model_index(gene, resno).is_some()
    }

    /// Resolve (gene, residue, model) to one record. Without a model the
    /// lowest model number present at that residue is used.
    pub fn lookup_exact(&self, gene: &str, resno: i64, model: Option<i64>) -> Option<&ResidueRecord> {
        let models = self.model_index(gene, resno)?;
        let idx = match model {
            Some(m) => models.get(&m).copied()?,
            None => models.values().next().copied()?,
        };
        Some(&self.records[idx])
    }

    pub fn resolve_position_id(&self, gene: &str, resno: i64, model: Option<i64>) -> Result<&str> {
        self.lookup_exact(gene, resno, model)
            .map(|rec| rec.position_id.as_str())
            .ok_or_else(|| {
                let model = model.map(|m| format!(" model {m}")).unwrap_or_default();
                CatalogError::not_found(format!("no residue {gene} {resno}{model}"))
            })
    }

    fn model_index(&self, gene: &str, resno: i64) -> Option<&ModelIndex> {
        self.by_gene.get(gene)?.get(&resno)
    }
}
