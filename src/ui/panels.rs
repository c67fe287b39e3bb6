use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use kinase_explorer::data::export::{NEIGHBORS_FILE_NAME, VARIANTS_FILE_NAME};

use crate::state::AppState;
use crate::ui::{plot, tables};

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    // ---- Banner (centered) ----
    if let Some(path) = &state.banner {
        let uri = format!("file://{}", path.display());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                egui::Image::new(uri)
                    .max_width(ui.available_width() * 0.9)
                    .max_height(140.0)
                    .corner_radius(4.0),
            );
        });
        ui.add_space(4.0);
    }

    ui.heading("Selection");
    ui.separator();

    // Own handle so the catalogs can be read while `state` is mutated.
    let explorer = Arc::clone(&state.explorer);

    if explorer.list_genes().is_empty() {
        ui.label("Residue catalog is empty.");
        return;
    }

    // ---- Kinase ----
    ui.strong("Select Kinase Name");
    let current_gene = state.selected_gene.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("kinase")
        .selected_text(current_gene.as_str())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for gene in explorer.list_genes() {
                if ui.selectable_label(current_gene == *gene, gene.as_str()).clicked() {
                    state.select_gene(gene.clone());
                }
            }
        });
    ui.add_space(6.0);

    // ---- Residue (filtered by kinase) ----
    ui.strong("Select Residue Position");
    let residues = state
        .selected_gene
        .as_deref()
        .map(|gene| explorer.list_residue_numbers(gene))
        .unwrap_or_default();
    let current_residue = state.selected_residue;
    egui::ComboBox::from_id_salt("residue")
        .selected_text(current_residue.map(|r| r.to_string()).unwrap_or_default())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ScrollArea::vertical().max_height(320.0).show(ui, |ui: &mut Ui| {
                for resno in residues {
                    if ui
                        .selectable_label(current_residue == Some(resno), resno.to_string())
                        .clicked()
                    {
                        state.select_residue(resno);
                    }
                }
            });
        });
    ui.add_space(6.0);

    // ---- Structural model ----
    let models = match (state.selected_gene.as_deref(), state.selected_residue) {
        (Some(gene), Some(resno)) => explorer.list_models(gene, resno),
        _ => Vec::new(),
    };
    ui.strong("Structural Model");
    let current_model = state.selected_model;
    ui.add_enabled_ui(models.len() > 1, |ui: &mut Ui| {
        egui::ComboBox::from_id_salt("model")
            .selected_text(current_model.map(|m| m.to_string()).unwrap_or_default())
            .width(ui.available_width())
            .show_ui(ui, |ui: &mut Ui| {
                for model in models {
                    if ui
                        .selectable_label(current_model == Some(model), model.to_string())
                        .clicked()
                    {
                        state.select_model(model);
                    }
                }
            });
    });
    ui.add_space(6.0);

    // ---- Cutoff ----
    ui.strong("Distance cutoff");
    let mut cutoff = state.cutoff;
    let response = ui.add(
        egui::DragValue::new(&mut cutoff)
            .speed(0.1)
            .range(0.0..=100.0)
            .suffix(" Å"),
    );
    if response.changed() {
        state.set_cutoff(cutoff);
    }
}

// ---------------------------------------------------------------------------
// Central panel – the three result sections
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Section 1: mutation details ----
            ui.heading("Mutation Details");
            match &state.summary {
                Some(rec) => {
                    tables::summary_table(ui, rec);
                    ui.add_space(4.0);
                    plot::effect_chart(ui, rec);
                }
                None => {
                    ui.label("No residue selected.");
                }
            }
            ui.separator();

            // ---- Section 2: nearby residues ----
            ui.heading("Find Nearby Residue Positions with Mutations");
            if let Some(err) = &state.query_error {
                ui.label(RichText::new(err).color(Color32::RED));
            } else if state.neighbors.is_empty() {
                ui.label(format!("No residues within {} Å.", state.cutoff));
            } else {
                tables::neighbor_table(ui, &state.neighbors, &state.cluster_colors);
            }
            if ui.button("Download Nearby Residues as CSV").clicked() {
                save_dialog(state, NEIGHBORS_FILE_NAME, AppState::export_neighbors);
            }
            ui.separator();

            // ---- Section 3: variant-level information ----
            ui.heading("Variant-Level Information");
            if state.variants.is_empty() {
                ui.label("No variants recorded at this residue.");
            } else {
                tables::variant_table(ui, &state.variants);
            }
            if ui.button("Download Variant Data as CSV").clicked() {
                save_dialog(state, VARIANTS_FILE_NAME, AppState::export_variants);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export nearby residues…").clicked() {
                save_dialog(state, NEIGHBORS_FILE_NAME, AppState::export_neighbors);
                ui.close_menu();
            }
            if ui.button("Export variants…").clicked() {
                save_dialog(state, VARIANTS_FILE_NAME, AppState::export_variants);
                ui.close_menu();
            }
        });

        ui.separator();

        let explorer = &state.explorer;
        ui.label(format!(
            "{} residues across {} kinases, {} clusters, {} variants",
            explorer.residues().len(),
            explorer.list_genes().len(),
            state.cluster_colors.len(),
            explorer.variants().len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Save dialog
// ---------------------------------------------------------------------------

fn save_dialog<F>(state: &mut AppState, default_name: &str, export: F)
where
    F: Fn(&AppState, &std::path::Path) -> anyhow::Result<()>,
{
    let file = rfd::FileDialog::new()
        .set_title("Save as CSV")
        .set_file_name(default_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export(state, &path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
