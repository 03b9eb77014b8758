use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use icefeed::config::ValidationMode;

use crate::state::AppState;
use crate::ui::plot::to_color32;

// ---------------------------------------------------------------------------
// Left side panel – series and diagnostics
// ---------------------------------------------------------------------------

/// Render the left panel: series list and build/feed diagnostics.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Series");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // Live counts when feeding, static lengths otherwise.
            if let Some(live) = &state.live {
                for handle in &live.handles {
                    series_row(ui, &handle.name, to_color32(&handle.display), handle.len());
                }
            } else if let Some(table) = &state.table {
                for series in &table.series {
                    series_row(
                        ui,
                        series.name(),
                        to_color32(&series.spec.display),
                        series.len(),
                    );
                }
                ui.label(format!(
                    "{} of {} rows kept",
                    table.rows_kept, table.rows_total
                ));
            }

            ui.separator();
            ui.strong("Diagnostics");
            diagnostics_table(ui, state);
        });
}

fn series_row(ui: &mut Ui, name: &str, color: Color32, points: usize) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new("━━").color(color).strong());
        ui.label(name);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(points.to_string());
        });
    });
}

fn diagnostics_table(ui: &mut Ui, state: &AppState) {
    let mut entries: Vec<(String, String)> = Vec::new();
    if let Some(table) = &state.table {
        for w in &table.warnings {
            entries.push((w.series().unwrap_or("-").to_string(), w.to_string()));
        }
    }
    if let Some(Ok(report)) = state.live.as_ref().and_then(|l| l.outcome.as_ref()) {
        for lane in report.lanes.iter().filter(|l| l.invalid > 0) {
            entries.push((
                lane.name.clone(),
                format!("{} invalid points skipped", lane.invalid),
            ));
        }
        for e in &report.errors {
            entries.push((e.series().unwrap_or("-").to_string(), e.to_string()));
        }
    }

    if entries.is_empty() {
        ui.weak("No problems found.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Series");
            });
            header.col(|ui| {
                ui.strong("Issue");
            });
        })
        .body(|mut body| {
            for (series, issue) in &entries {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(series);
                    });
                    row.col(|ui| {
                        ui.label(issue);
                    });
                });
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
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let source = state
                .source
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!("{source}: {} rows", ds.len()));
        }

        ui.separator();

        let mode = state.config.mode;
        if ui
            .selectable_label(mode == ValidationMode::Strict, "Complete rows only")
            .clicked()
        {
            state.set_mode(match mode {
                ValidationMode::Strict => ValidationMode::Tolerant,
                ValidationMode::Tolerant => ValidationMode::Strict,
            });
        }

        ui.label("Pacing");
        ui.add(
            egui::DragValue::new(&mut state.config.pacing_ms)
                .range(0..=1000)
                .suffix(" ms"),
        );

        ui.separator();

        if state.is_live_running() {
            if ui.button("Stop").clicked() {
                state.stop_live();
            }
        } else if state.dataset.is_some() {
            if ui.button("Start live feed").clicked() {
                let ctx = ui.ctx().clone();
                state.start_live(&ctx);
            }
            if state.live.is_some() && ui.button("Show table").clicked() {
                state.clear_live();
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sea-ice data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
