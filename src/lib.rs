//! Kinase mutation explorer core.
//!
//! Loads a residue catalog (per-residue mutation-effect tallies with 3D
//! coordinates) and a variant catalog (individual observed mutations), and
//! answers the queries the explorer front-end needs: gene/residue listings,
//! per-residue summaries, spatial neighbours within a cutoff, and the
//! variants observed at a residue.

pub mod config;
pub mod data;

pub use config::{CoercionPolicy, ExplorerConfig};
pub use data::error::{CatalogError, Result};
pub use data::explorer::MutationExplorer;
pub use data::proximity::{find_nearby, Neighbor, DEFAULT_CUTOFF};
pub use data::residue::{ResidueCatalog, ResidueRecord};
pub use data::variant::{VariantCatalog, VariantRecord};
