//! End-to-end checks: source files on disk → explorer → queries → export.

use std::fs;
use std::path::{Path, PathBuf};

use kinase_explorer::data::export::{neighbors_to_csv, parse_neighbors, variants_to_csv};
use kinase_explorer::{
    CatalogError, CoercionPolicy, ExplorerConfig, MutationExplorer, ResidueCatalog, VariantCatalog,
};
use tempfile::TempDir;

const RESIDUE_HEADER: &str = "gene_name,resno_y,org_res,Count,Gain-of-function,Inconclusive,\
Likely Gain-of-function,Likely Loss-of-function,Likely Neutral,Loss-of-function,Neutral,\
cluster_labels,model_no,x,y,z,residue_position_id";

/// A(0,0,0), B(1,0,0), C(10,0,0) plus BRAF 600 in model 1 only.
fn residue_rows() -> Vec<String> {
    vec![
        "KIT,1,A,2,1,0,0,0,0,1,0,3,1,0,0,0,A".to_string(),
        "KIT,2,B,1,0,1,0,0,0,0,0,3,1,1,0,0,B".to_string(),
        "KIT,3,C,5,0,0,0,0,5,0,0,7,1,10,0,0,C".to_string(),
        "BRAF,600,V,9,6,0,1,0,0,2,0,1,1,30.5,12.25,-4.0,BRAF_600_1".to_string(),
        "BRAF,601,K,1,0,0,0,0,0,1,0,1,1,31.5,12.25,-4.0,BRAF_601_1".to_string(),
    ]
}

const VARIANTS: &str = "Legacy Mutation ID,gene_name,resno,org_res,mut_res,Count\n\
COSM476,BRAF,600,V,E,120\n\
COSM18443,KIT,2,B,Q,4\n\
COSM473,BRAF,600,V,K,9\n\
COSM1133,BRAF,601,K,E,3\n\
COSM475,BRAF,600,V,D,2\n";

struct Fixture {
    _dir: TempDir,
    residues: PathBuf,
    variants: PathBuf,
}

fn write_fixture(residue_rows: &[String]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let residues = dir.path().join("HC_clust_output.csv");
    let variants = dir.path().join("combined-individual-mutations.csv");
    let mut text = format!("{RESIDUE_HEADER}\n");
    for row in residue_rows {
        text.push_str(row);
        text.push('\n');
    }
    fs::write(&residues, text).unwrap();
    fs::write(&variants, VARIANTS).unwrap();
    Fixture {
        _dir: dir,
        residues,
        variants,
    }
}

fn config_for(fixture: &Fixture) -> ExplorerConfig {
    ExplorerConfig {
        residue_source: fixture.residues.clone(),
        variant_source: fixture.variants.clone(),
        banner_image: None,
        ..ExplorerConfig::default()
    }
}

fn explorer(fixture: &Fixture) -> MutationExplorer {
    MutationExplorer::load(&config_for(fixture)).unwrap()
}

#[test]
fn nearby_example_returns_only_b() {
    let fixture = write_fixture(&residue_rows());
    let ex = explorer(&fixture);

    let hits = ex.find_nearby("KIT", 1, None, Some(3.0)).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].position_id, "B");
    assert_eq!(hits[0].gene_name, "KIT");
    assert_eq!(hits[0].resno, 2);
    assert_eq!(hits[0].org_res, "B");
    assert_eq!(hits[0].distance, 1.0);
    assert_eq!(hits[0].count, 1);
    assert_eq!(hits[0].cluster_label, "3");
}

#[test]
fn default_cutoff_is_three() {
    let fixture = write_fixture(&residue_rows());
    let ex = explorer(&fixture);
    assert_eq!(ex.default_cutoff(), 3.0);
    assert_eq!(ex.find_nearby("KIT", 1, None, None).unwrap().len(), 1);
}

#[test]
fn variants_for_braf_600_in_file_order() {
    let fixture = write_fixture(&residue_rows());
    let ex = explorer(&fixture);
    let ids: Vec<&str> = ex
        .get_variants("BRAF", 600)
        .iter()
        .map(|v| v.legacy_id.as_str())
        .collect();
    assert_eq!(ids, ["COSM476", "COSM473", "COSM475"]);
    assert!(ex.get_variants("BRAF", 602).is_empty());
    assert_eq!(ex.list_models("BRAF", 600), vec![1]);
}

#[test]
fn summary_view_carries_effect_breakdown() {
    let fixture = write_fixture(&residue_rows());
    let ex = explorer(&fixture);
    let rec = ex.get_mutation_summary("BRAF", 600, None).unwrap();
    assert_eq!(rec.count, 9);
    assert_eq!(rec.effects.gain_of_function, 6);
    assert_eq!(rec.effects.likely_gain_of_function, 1);
    assert_eq!(rec.effects.loss_of_function, 2);
    assert_eq!(rec.coords, Some([30.5, 12.25, -4.0]));
    assert!(ex.get_mutation_summary("BRAF", 600, Some(2)).is_none());
}

#[test]
fn listings_for_selection_widgets() {
    let fixture = write_fixture(&residue_rows());
    let ex = explorer(&fixture);
    assert_eq!(ex.list_genes(), ["KIT", "BRAF"]);
    assert_eq!(ex.list_residue_numbers("KIT"), vec![1, 2, 3]);
    assert!(ex.list_residue_numbers("EGFR").is_empty());
    assert_eq!(ex.orphan_variant_count(), 0);
}

#[test]
fn neighbour_export_round_trips_through_a_file() {
    let fixture = write_fixture(&residue_rows());
    let ex = explorer(&fixture);
    // BRAF 601 at 1.0, then C, B, A at roughly 24, 32 and 33
    let hits = ex.find_nearby("BRAF", 600, None, Some(40.0)).unwrap();
    assert_eq!(hits.len(), 4);

    let path = fixture.residues.with_file_name("nearby_residues.csv");
    fs::write(&path, neighbors_to_csv(&hits).unwrap()).unwrap();
    let parsed = parse_neighbors(fs::File::open(&path).unwrap()).unwrap();

    let key = |n: &kinase_explorer::Neighbor| (n.gene_name.clone(), n.resno, n.distance.to_bits());
    assert_eq!(
        parsed.iter().map(key).collect::<Vec<_>>(),
        hits.iter().map(key).collect::<Vec<_>>()
    );
}

#[test]
fn variant_export_has_source_header() {
    let fixture = write_fixture(&residue_rows());
    let ex = explorer(&fixture);
    let text = String::from_utf8(variants_to_csv(ex.get_variants("BRAF", 601)).unwrap()).unwrap();
    assert_eq!(
        text,
        "Legacy Mutation ID,gene_name,resno,org_res,mut_res,Count\nCOSM1133,BRAF,601,K,E,3\n"
    );
}

#[test]
fn unknown_target_and_bad_cutoff_are_distinct_errors() {
    let fixture = write_fixture(&residue_rows());
    let ex = explorer(&fixture);
    assert!(matches!(
        ex.find_nearby("BRAF", 9999, None, None),
        Err(CatalogError::NotFound(_))
    ));
    assert!(matches!(
        ex.find_nearby("BRAF", 600, None, Some(-1.0)),
        Err(CatalogError::InvalidArgument(_))
    ));
    assert!(ex.find_nearby("KIT", 3, None, None).unwrap().is_empty());
}

#[test]
fn duplicated_position_id_fails_the_load() {
    let mut rows = residue_rows();
    rows.push("KIT,4,D,1,1,0,0,0,0,0,0,3,1,2,0,0,A".to_string());
    let fixture = write_fixture(&rows);
    let err = MutationExplorer::load(&config_for(&fixture)).unwrap_err();
    assert!(matches!(err, CatalogError::Schema { .. }), "{err}");
}

#[test]
fn malformed_number_fails_strict_but_loads_coerced() {
    let mut rows = residue_rows();
    rows.push("KIT,4,D,1,1,0,0,0,0,0,0,3,1,,0,0,D".to_string());
    let fixture = write_fixture(&rows);

    let strict = MutationExplorer::load(&config_for(&fixture)).unwrap_err();
    assert!(matches!(strict, CatalogError::MalformedRow { row: 6, .. }), "{strict}");

    let config = ExplorerConfig {
        coercion: CoercionPolicy::Coerce,
        ..config_for(&fixture)
    };
    let ex = MutationExplorer::load(&config).unwrap();
    assert_eq!(ex.list_residue_numbers("KIT"), vec![1, 2, 3, 4]);
    let near_a: Vec<String> = ex
        .find_nearby("KIT", 1, None, Some(100.0))
        .unwrap()
        .into_iter()
        .map(|n| n.position_id)
        .collect();
    assert!(!near_a.contains(&"D".to_string()));
}

#[test]
fn missing_source_file_is_an_io_error() {
    let config = ExplorerConfig {
        residue_source: PathBuf::from("/nonexistent/residues.csv"),
        ..ExplorerConfig::default()
    };
    assert!(matches!(
        MutationExplorer::load(&config),
        Err(CatalogError::Io(_))
    ));
}

fn residues_as_json(path: &Path) -> String {
    let catalog = ResidueCatalog::load(path, CoercionPolicy::Strict).unwrap();
    let records: Vec<serde_json::Value> = catalog
        .records()
        .iter()
        .map(|r| {
            let [x, y, z] = r.coords.unwrap();
            serde_json::json!({
                "gene_name": r.gene_name,
                "resno_y": r.resno as f64,
                "org_res": r.org_res,
                "Count": r.count,
                "Gain-of-function": r.effects.gain_of_function,
                "Inconclusive": r.effects.inconclusive,
                "Likely Gain-of-function": r.effects.likely_gain_of_function,
                "Likely Loss-of-function": r.effects.likely_loss_of_function,
                "Likely Neutral": r.effects.likely_neutral,
                "Loss-of-function": r.effects.loss_of_function,
                "Neutral": r.effects.neutral,
                "cluster_labels": r.cluster_label,
                "model_no": r.model_no,
                "x": x, "y": y, "z": z,
                "residue_position_id": r.position_id,
            })
        })
        .collect();
    serde_json::to_string(&records).unwrap()
}

#[test]
fn json_source_loads_the_same_catalog() {
    let fixture = write_fixture(&residue_rows());
    let json_path = fixture.residues.with_extension("json");
    fs::write(&json_path, residues_as_json(&fixture.residues)).unwrap();

    let from_csv = ResidueCatalog::load(&fixture.residues, CoercionPolicy::Strict).unwrap();
    let from_json = ResidueCatalog::load(&json_path, CoercionPolicy::Strict).unwrap();
    assert_eq!(from_csv.records(), from_json.records());
}

#[test]
fn empty_sources_give_an_empty_explorer() {
    let dir = tempfile::tempdir().unwrap();
    let residues = dir.path().join("r.csv");
    let variants = dir.path().join("v.json");
    fs::write(&residues, format!("{RESIDUE_HEADER}\n")).unwrap();
    fs::write(&variants, "[]").unwrap();

    let ex = MutationExplorer::from_catalogs(
        ResidueCatalog::load(&residues, CoercionPolicy::Strict).unwrap(),
        VariantCatalog::load(&variants, CoercionPolicy::Strict).unwrap(),
    );
    assert!(ex.list_genes().is_empty());
    assert!(ex.get_variants("BRAF", 600).is_empty());
    assert!(ex.find_nearby("BRAF", 600, None, None).unwrap_err().is_not_found());
}
