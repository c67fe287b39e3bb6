use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use kinase_explorer::{Neighbor, ResidueRecord, VariantRecord};

use crate::color::ClusterColors;

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 20.0;
const MAX_TABLE_HEIGHT: f32 = 260.0;

fn table<'a>(ui: &'a mut Ui, n_columns: usize) -> TableBuilder<'a> {
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(MAX_TABLE_HEIGHT)
        .columns(Column::auto().at_least(56.0), n_columns)
}

// ---------------------------------------------------------------------------
// Mutation details
// ---------------------------------------------------------------------------

/// One-row table of the selected residue record.
pub fn summary_table(ui: &mut Ui, rec: &ResidueRecord) {
    let mut columns: Vec<(&str, String)> = vec![
        ("gene_name", rec.gene_name.clone()),
        ("resno_y", rec.resno.to_string()),
        ("org_res", rec.org_res.clone()),
        ("Count", rec.count.to_string()),
    ];
    columns.extend(
        rec.effects
            .entries()
            .iter()
            .map(|(name, n)| (*name, n.to_string())),
    );
    columns.push(("cluster_labels", rec.cluster_label.clone()));
    columns.push(("model_no", rec.model_no.to_string()));
    let coords = rec
        .coords
        .map(|[x, y, z]| format!("{x:.3}, {y:.3}, {z:.3}"))
        .unwrap_or_else(|| "–".to_string());
    columns.push(("x, y, z", coords));
    columns.push(("residue_position_id", rec.position_id.clone()));

    ui.push_id("summary_table", |ui: &mut Ui| {
        table(ui, columns.len())
            .header(HEADER_HEIGHT, |mut header| {
                for (title, _) in &columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*title);
                    });
                }
            })
            .body(|mut body| {
                body.row(ROW_HEIGHT, |mut row| {
                    for (_, value) in &columns {
                        row.col(|ui: &mut Ui| {
                            ui.label(value.as_str());
                        });
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Nearby residues
// ---------------------------------------------------------------------------

pub fn neighbor_table(ui: &mut Ui, neighbors: &[Neighbor], colors: &ClusterColors) {
    const TITLES: [&str; 6] = ["gene_name", "resno_y", "org_res", "Distance", "Count", "cluster_labels"];

    ui.push_id("neighbor_table", |ui: &mut Ui| {
        table(ui, TITLES.len())
            .header(HEADER_HEIGHT, |mut header| {
                for title in TITLES {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, neighbors.len(), |mut row| {
                    let n = &neighbors[row.index()];
                    row.col(|ui: &mut Ui| {
                        ui.label(n.gene_name.as_str());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(n.resno.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(n.org_res.as_str());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.3}", n.distance));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(n.count.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        let color = colors.color_for(&n.cluster_label);
                        ui.label(RichText::new(n.cluster_label.as_str()).color(color).strong());
                    });
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Variant-level information
// ---------------------------------------------------------------------------

pub fn variant_table(ui: &mut Ui, variants: &[VariantRecord]) {
    ui.push_id("variant_table", |ui: &mut Ui| {
        table(ui, kinase_explorer::data::variant::VARIANT_COLUMNS.len())
            .header(HEADER_HEIGHT, |mut header| {
                for title in kinase_explorer::data::variant::VARIANT_COLUMNS {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, variants.len(), |mut row| {
                    let v = &variants[row.index()];
                    row.col(|ui: &mut Ui| {
                        ui.label(v.legacy_id.as_str());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(v.gene_name.as_str());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(v.resno.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(v.org_res.as_str());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(v.mut_res.as_str());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(v.count.to_string());
                    });
                });
            });
    });
}
