use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use icefeed::series::DisplayAttributes;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Extent plot (central panel)
// ---------------------------------------------------------------------------

pub fn to_color32(display: &DisplayAttributes) -> Color32 {
    let [r, g, b] = display.color;
    Color32::from_rgb(r, g, b)
}

/// Render the live feed if one exists, the static table otherwise.
pub fn series_plot(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to chart sea-ice extent  (File → Open…)");
        });
        return;
    }

    Plot::new("extent_plot")
        .legend(Legend::default())
        .x_axis_label(state.config.key_column.clone())
        .y_axis_label("Extent (million km²)")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if let Some(live) = &state.live {
                for handle in &live.handles {
                    let points: PlotPoints = handle.points.lock().iter().copied().collect();
                    plot_ui.line(
                        Line::new(points)
                            .name(&handle.name)
                            .color(to_color32(&handle.display))
                            .width(handle.display.thickness),
                    );
                }
            } else if let Some(table) = &state.table {
                for series in &table.series {
                    let points: PlotPoints = series
                        .keys
                        .iter()
                        .zip(&series.values)
                        .map(|(&k, &v)| [k, v])
                        .collect();
                    plot_ui.line(
                        Line::new(points)
                            .name(series.name())
                            .color(to_color32(&series.spec.display))
                            .width(series.spec.display.thickness),
                    );
                }
            }
        });
}
