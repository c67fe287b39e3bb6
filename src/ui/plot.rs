use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Plot};

use kinase_explorer::ResidueRecord;

use crate::color::generate_palette;

// ---------------------------------------------------------------------------
// Mutation-effect chart (Mutation Details section)
// ---------------------------------------------------------------------------

/// Bar chart of the seven effect categories at the selected residue, one
/// coloured series per category so the legend names them.
pub fn effect_chart(ui: &mut Ui, rec: &ResidueRecord) {
    let entries = rec.effects.entries();
    let colors = generate_palette(entries.len());

    Plot::new("effect_chart")
        .legend(Legend::default())
        .height(180.0)
        .y_axis_label("Observations")
        .show_x(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for (i, ((name, count), color)) in entries.iter().zip(colors).enumerate() {
                let bar = Bar::new(i as f64, *count as f64).name(*name).width(0.7);
                let chart = BarChart::new(vec![bar]).name(*name).color(color);
                plot_ui.bar_chart(chart);
            }
        });
}
