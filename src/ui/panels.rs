use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::metrics::{format_count, format_currency};
use crate::state::{AppState, ExportFormat};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Cheap Arc clone so the state can be mutated while the table is read.
    let (Some(table), Some(params)) = (state.table.clone(), state.filters.clone()) else {
        ui.label("No sales records loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            ui.strong("Date Range");
            let mut start = params.date_start;
            let mut end = params.date_end;
            let start_changed = ui
                .horizontal(|ui: &mut Ui| {
                    ui.label("From");
                    ui.add(DatePickerButton::new(&mut start).id_salt("date_start"))
                        .changed()
                })
                .inner;
            let end_changed = ui
                .horizontal(|ui: &mut Ui| {
                    ui.label("To");
                    ui.add(DatePickerButton::new(&mut end).id_salt("date_end"))
                        .changed()
                })
                .inner;
            if start_changed || end_changed {
                state.set_date_range(start, end);
            }
            ui.separator();

            // ---- Product (exactly one) ----
            ui.strong("Product");
            egui::ComboBox::from_id_salt("product")
                .selected_text(&params.product)
                .width(ui.available_width())
                .show_ui(ui, |ui: &mut Ui| {
                    for product in &table.products {
                        if ui
                            .selectable_label(params.product == *product, product)
                            .clicked()
                        {
                            state.set_product(product);
                        }
                    }
                });
            ui.separator();

            // ---- Countries (multi-select) ----
            let n_selected = params.countries.len();
            let n_total = table.countries.len();
            egui::CollapsingHeader::new(
                RichText::new(format!("Country  ({n_selected}/{n_total})")).strong(),
            )
            .id_salt("countries")
            .default_open(true)
            .show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    if ui.small_button("All").clicked() {
                        state.select_all_countries();
                    }
                    if ui.small_button("None").clicked() {
                        state.select_no_countries();
                    }
                });

                for country in &table.countries {
                    let mut checked = params.countries.contains(country);
                    let text = RichText::new(country).color(state.country_colors.color_for(country));
                    if ui.checkbox(&mut checked, text).changed() {
                        state.toggle_country(country);
                    }
                }
            });
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
            ui.separator();
            if ui.button("Export filtered rows as CSV…").clicked() {
                export_file_dialog(state, ExportFormat::Csv);
                ui.close_menu();
            }
            if ui.button("Export filtered rows as JSON…").clicked() {
                export_file_dialog(state, ExportFormat::Json);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            if table.is_empty() {
                ui.label("File has no sales records");
            } else {
                ui.label(format!(
                    "{} records loaded, {} visible, {} sales people",
                    format_count(table.len() as u64),
                    format_count(state.visible_indices.len() as u64),
                    format_count(table.sales_people.len() as u64)
                ));
            }
        }
        if let Some(source) = &state.source {
            ui.separator();
            ui.weak(source.display().to_string());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

/// The four headline numbers above the charts.
pub fn metric_cards(ui: &mut Ui, state: &AppState) {
    let m = &state.summary.metrics;
    let cards = [
        ("Sales People", format_count(m.people as u64)),
        ("Countries", format_count(m.countries as u64)),
        ("Sales", format_currency(m.sales_total)),
        ("Boxes Shipped", format_count(m.boxes_total)),
    ];
    ui.columns(cards.len(), |columns: &mut [Ui]| {
        for (ui, (title, value)) in columns.iter_mut().zip(cards) {
            ui.group(|ui: &mut Ui| {
                ui.set_min_width(ui.available_width());
                ui.label(title);
                ui.heading(RichText::new(value).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState, format: ExportFormat) {
    let (name, ext) = match format {
        ExportFormat::Csv => ("filtered_sales.csv", "csv"),
        ExportFormat::Json => ("filtered_sales.json", "json"),
    };
    let file = rfd::FileDialog::new()
        .set_title("Export filtered rows")
        .set_file_name(name)
        .add_filter(ext.to_uppercase(), &[ext])
        .save_file();

    if let Some(path) = file {
        match state.export(&path, format) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
