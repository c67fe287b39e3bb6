use log::debug;
use serde::{Deserialize, Serialize};

use super::error::{CatalogError, Result};
use super::residue::{ResidueCatalog, ResidueRecord};

/// Default neighbour cutoff, in the catalog's coordinate units (Å).
pub const DEFAULT_CUTOFF: f64 = 3.0;

/// A residue within the cutoff of a query target.
///
/// Field order and serde names give the delimited export its header:
/// `gene_name,resno_y,org_res,Distance,Count,cluster_labels,residue_position_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub gene_name: String,
    #[serde(rename = "resno_y")]
    pub resno: i64,
    pub org_res: String,
    #[serde(rename = "Distance")]
    pub distance: f64,
    #[serde(rename = "Count")]
    pub count: u64,
    #[serde(rename = "cluster_labels")]
    pub cluster_label: String,
    #[serde(rename = "residue_position_id")]
    pub position_id: String,
}

impl Neighbor {
    fn from_record(rec: &ResidueRecord, distance: f64) -> Self {
        Neighbor {
            gene_name: rec.gene_name.clone(),
            resno: rec.resno,
            org_res: rec.org_res.clone(),
            distance,
            count: rec.count,
            cluster_label: rec.cluster_label.clone(),
            position_id: rec.position_id.clone(),
        }
    }
}

/// Straight-line distance between two points.
#[inline]
pub fn euclidean(p: [f64; 3], q: [f64; 3]) -> f64 {
    p.iter()
        .zip(q.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum::<f64>()
        .sqrt()
}

pub fn validate_cutoff(cutoff: f64) -> Result<()> {
    if cutoff.is_finite() && cutoff >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::invalid_argument(format!(
            "cutoff must be a finite non-negative number, got {cutoff}"
        )))
    }
}

/// All residues other than `target_id` lying within `cutoff` of it, nearest
/// first. Equal distances keep catalog load order.
///
/// Residues without coordinates are never neighbours. The catalog is only
/// read; distances live in the returned vector.
pub fn find_nearby(catalog: &ResidueCatalog, target_id: &str, cutoff: f64) -> Result<Vec<Neighbor>> {
    validate_cutoff(cutoff)?;

    let target_idx = catalog
        .position(target_id)
        .ok_or_else(|| CatalogError::not_found(format!("residue_position_id '{target_id}'")))?;
    let records = catalog.records();
    let origin = records[target_idx].coords.ok_or_else(|| {
        CatalogError::invalid_argument(format!("residue '{target_id}' has no coordinates"))
    })?;

    let mut neighbors: Vec<Neighbor> = records
        .iter()
        .enumerate()
        .filter(|&(idx, _)| idx != target_idx)
        .filter_map(|(_, rec)| {
            let distance = euclidean(origin, rec.coords?);
            (distance <= cutoff).then(|| Neighbor::from_record(rec, distance))
        })
        .collect();
    // stable: ties stay in load order
    neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    debug!(
        "{target_id}: {} neighbours within {cutoff} of {} residues",
        neighbors.len(),
        records.len()
    );
    Ok(neighbors)
}
