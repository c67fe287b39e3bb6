use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info};

use kinase_explorer::data::export;
use kinase_explorer::{MutationExplorer, Neighbor, ResidueRecord, VariantRecord};

use crate::color::ClusterColors;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Both catalogs, loaded once at startup.
    pub explorer: Arc<MutationExplorer>,

    /// Optional banner image shown above the selectors.
    pub banner: Option<PathBuf>,

    pub selected_gene: Option<String>,
    pub selected_residue: Option<i64>,
    pub selected_model: Option<i64>,
    pub cutoff: f64,

    /// Query results for the current selection (cached).
    pub summary: Option<ResidueRecord>,
    pub neighbors: Vec<Neighbor>,
    pub variants: Vec<VariantRecord>,
    /// Set when the neighbour query fails for the current selection.
    pub query_error: Option<String>,

    pub cluster_colors: ClusterColors,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    /// Build the state and select the first kinase, if any.
    pub fn new(explorer: Arc<MutationExplorer>, banner: Option<PathBuf>) -> Self {
        let cluster_colors = ClusterColors::new(
            explorer
                .residues()
                .records()
                .iter()
                .map(|r| r.cluster_label.as_str()),
        );
        let first_gene = explorer.list_genes().first().cloned();
        let mut state = Self {
            cutoff: explorer.default_cutoff(),
            explorer,
            banner,
            selected_gene: None,
            selected_residue: None,
            selected_model: None,
            summary: None,
            neighbors: Vec::new(),
            variants: Vec::new(),
            query_error: None,
            cluster_colors,
            status_message: None,
        };
        if let Some(gene) = first_gene {
            state.select_gene(gene);
        }
        state
    }

    /// Choose a kinase; the residue resets to its first position.
    pub fn select_gene(&mut self, gene: String) {
        let first = self.explorer.list_residue_numbers(&gene).first().copied();
        self.selected_gene = Some(gene);
        match first {
            Some(resno) => self.select_residue(resno),
            None => {
                self.selected_residue = None;
                self.selected_model = None;
                self.refresh();
            }
        }
    }

    /// Choose a residue; the model resets to the lowest available.
    pub fn select_residue(&mut self, resno: i64) {
        self.selected_residue = Some(resno);
        self.selected_model = self
            .selected_gene
            .as_deref()
            .and_then(|gene| self.explorer.list_models(gene, resno).first().copied());
        self.refresh();
    }

    pub fn select_model(&mut self, model: i64) {
        self.selected_model = Some(model);
        self.refresh();
    }

    pub fn set_cutoff(&mut self, cutoff: f64) {
        self.cutoff = cutoff;
        self.refresh();
    }

    /// Recompute the three views after a selection change.
    pub fn refresh(&mut self) {
        self.summary = None;
        self.neighbors.clear();
        self.variants.clear();
        self.query_error = None;

        let (Some(gene), Some(resno)) = (self.selected_gene.as_deref(), self.selected_residue) else {
            return;
        };

        self.summary = self
            .explorer
            .get_mutation_summary(gene, resno, self.selected_model)
            .cloned();
        match self
            .explorer
            .find_nearby(gene, resno, self.selected_model, Some(self.cutoff))
        {
            Ok(neighbors) => self.neighbors = neighbors,
            Err(e) => self.query_error = Some(e.to_string()),
        }
        self.variants = self
            .explorer
            .get_variants(gene, resno)
            .into_iter()
            .cloned()
            .collect();
        debug!(
            "selection {gene} {resno} model {:?}: {} neighbours, {} variants",
            self.selected_model,
            self.neighbors.len(),
            self.variants.len()
        );
    }

    pub fn export_neighbors(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        export::write_neighbors(file, &self.neighbors).context("writing nearby residues")?;
        info!("exported {} neighbours to {}", self.neighbors.len(), path.display());
        Ok(())
    }

    pub fn export_variants(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        export::write_variants(file, &self.variants).context("writing variants")?;
        info!("exported {} variants to {}", self.variants.len(), path.display());
        Ok(())
    }
}
