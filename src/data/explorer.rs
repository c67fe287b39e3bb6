use log::{info, warn};

use super::error::Result;
use super::proximity::{self, Neighbor};
use super::residue::{ResidueCatalog, ResidueRecord};
use super::variant::{VariantCatalog, VariantRecord};
use crate::config::ExplorerConfig;

/// Both catalogs, loaded once and read-only afterwards. Share it behind an
/// `Arc` when several views or threads query it.
#[derive(Debug, Clone)]
pub struct MutationExplorer {
    residues: ResidueCatalog,
    variants: VariantCatalog,
    default_cutoff: f64,
    orphan_variants: usize,
}

impl MutationExplorer {
    /// Load both sources named in `config`. Either failing is fatal.
    pub fn load(config: &ExplorerConfig) -> Result<Self> {
        config.validate()?;
        let residues = ResidueCatalog::load(&config.residue_source, config.coercion)?;
        let variants = VariantCatalog::load(&config.variant_source, config.coercion)?;
        Ok(Self::from_catalogs(residues, variants).with_default_cutoff(config.default_cutoff))
    }

    pub fn from_catalogs(residues: ResidueCatalog, variants: VariantCatalog) -> Self {
        let orphan_variants = variants
            .residue_keys()
            .filter(|&(gene, resno)| !residues.contains(gene, resno))
            .count();
        if orphan_variants > 0 {
            warn!("{orphan_variants} variant residue(s) have no match in the residue catalog");
        }
        info!(
            "explorer ready: {} residues, {} variants",
            residues.len(),
            variants.len()
        );
        MutationExplorer {
            residues,
            variants,
            default_cutoff: proximity::DEFAULT_CUTOFF,
            orphan_variants,
        }
    }

    pub fn with_default_cutoff(mut self, cutoff: f64) -> Self {
        self.default_cutoff = cutoff;
        self
    }

    pub fn default_cutoff(&self) -> f64 {
        self.default_cutoff
    }

    pub fn residues(&self) -> &ResidueCatalog {
        &self.residues
    }

    pub fn variants(&self) -> &VariantCatalog {
        &self.variants
    }

    /// Number of (gene, residue) pairs in the variant catalog that the
    /// residue catalog does not know.
    pub fn orphan_variant_count(&self) -> usize {
        self.orphan_variants
    }

    pub fn list_genes(&self) -> &[String] {
        self.residues.genes()
    }

    pub fn list_residue_numbers(&self, gene: &str) -> Vec<i64> {
        self.residues.lookup_by_gene(gene)
    }

    pub fn list_models(&self, gene: &str, resno: i64) -> Vec<i64> {
        self.residues.models(gene, resno)
    }

    pub fn get_mutation_summary(&self, gene: &str, resno: i64, model: Option<i64>) -> Option<&ResidueRecord> {
        self.residues.lookup_exact(gene, resno, model)
    }

    /// Neighbours of (gene, residue, model); `cutoff` falls back to the
    /// configured default.
    pub fn find_nearby(
        &self,
        gene: &str,
        resno: i64,
        model: Option<i64>,
        cutoff: Option<f64>,
    ) -> Result<Vec<Neighbor>> {
        let target = self.residues.resolve_position_id(gene, resno, model)?;
        proximity::find_nearby(&self.residues, target, cutoff.unwrap_or(self.default_cutoff))
    }

    pub fn get_variants(&self, gene: &str, resno: i64) -> Vec<&VariantRecord> {
        self.variants.filter(gene, resno)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::residue::tests::residue;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn explorer_can_be_shared_across_threads() {
        assert_send_sync::<MutationExplorer>();
        assert_send_sync::<std::sync::Arc<MutationExplorer>>();
    }

    fn variant(id: &str, gene: &str, resno: i64) -> VariantRecord {
        VariantRecord {
            legacy_id: id.into(),
            gene_name: gene.into(),
            resno,
            org_res: "V".into(),
            mut_res: "E".into(),
            count: 1,
        }
    }

    fn explorer() -> MutationExplorer {
        let residues = ResidueCatalog::from_records(vec![
            residue("BRAF_600_1", "BRAF", 600, 1, [0.0, 0.0, 0.0]),
            residue("BRAF_600_2", "BRAF", 600, 2, [50.0, 0.0, 0.0]),
            residue("BRAF_601_1", "BRAF", 601, 1, [2.0, 0.0, 0.0]),
            residue("BRAF_601_2", "BRAF", 601, 2, [50.0, 4.0, 0.0]),
        ])
        .unwrap();
        let variants = VariantCatalog::from_records(vec![
            variant("v1", "BRAF", 600),
            variant("v2", "BRAF", 601),
            variant("v3", "BRAF", 600),
            variant("v4", "KIT", 816),
        ])
        .unwrap();
        MutationExplorer::from_catalogs(residues, variants)
    }

    #[test]
    fn counts_orphan_variant_residues() {
        assert_eq!(explorer().orphan_variant_count(), 1);
    }

    #[test]
    fn model_selects_the_structure_queried() {
        let ex = explorer();
        let m1 = ex.find_nearby("BRAF", 600, None, None).unwrap();
        assert_eq!(m1.len(), 1);
        assert_eq!(m1[0].position_id, "BRAF_601_1");

        assert!(ex.find_nearby("BRAF", 600, Some(2), None).unwrap().is_empty());
        let m2 = ex.find_nearby("BRAF", 600, Some(2), Some(4.0)).unwrap();
        assert_eq!(m2[0].position_id, "BRAF_601_2");
    }

    #[test]
    fn default_cutoff_is_configurable() {
        let ex = explorer().with_default_cutoff(1.0);
        assert!(ex.find_nearby("BRAF", 600, None, None).unwrap().is_empty());
    }

    #[test]
    fn unknown_residue_is_not_found_not_empty() {
        let ex = explorer();
        assert!(ex.find_nearby("BRAF", 599, None, None).unwrap_err().is_not_found());
        assert!(ex.find_nearby("BRAF", 600, Some(9), None).unwrap_err().is_not_found());
    }

    #[test]
    fn summary_and_variants_are_independent_lookups() {
        let ex = explorer();
        assert_eq!(
            ex.get_mutation_summary("BRAF", 601, Some(2)).map(|r| r.position_id.as_str()),
            Some("BRAF_601_2")
        );
        assert!(ex.get_mutation_summary("KIT", 816, None).is_none());

        let ids: Vec<&str> = ex.get_variants("BRAF", 600).iter().map(|v| v.legacy_id.as_str()).collect();
        assert_eq!(ids, ["v1", "v3"]);
        assert_eq!(ex.get_variants("KIT", 816).len(), 1);
    }

    #[test]
    fn listings_follow_catalog() {
        let ex = explorer();
        assert_eq!(ex.list_genes(), ["BRAF"]);
        assert_eq!(ex.list_residue_numbers("BRAF"), vec![600, 601]);
        assert_eq!(ex.list_models("BRAF", 601), vec![1, 2]);
    }
}
