use eframe::egui::{Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::metrics::{format_count, format_currency};
use crate::data::model::DATE_FORMAT;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;
const HEADERS: [&str; 6] = [
    "Date",
    "Sales Person",
    "Country",
    "Product",
    "Amount",
    "Boxes Shipped",
];

/// Filtered rows, newest first.
pub fn filtered_table(ui: &mut Ui, state: &AppState) {
    ui.heading("Filtered Data Frame");

    let Some(table) = &state.table else {
        return;
    };
    let rows = &state.summary.rows_desc;
    if rows.is_empty() {
        ui.label("No records match the current filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .column(Column::auto().at_least(40.0))
        .column(Column::auto().at_least(90.0))
        .columns(Column::auto().at_least(80.0), 3)
        .column(Column::auto().at_least(90.0))
        .column(Column::remainder().at_least(90.0))
        .max_scroll_height(400.0)
        .header(ROW_HEIGHT + 4.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for title in HEADERS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let idx = rows[row.index()];
                let rec = &table.records[idx];
                row.col(|ui| {
                    ui.label(idx.to_string());
                });
                row.col(|ui| {
                    ui.label(rec.date.format(DATE_FORMAT).to_string());
                });
                row.col(|ui| {
                    ui.label(&rec.sales_person);
                });
                row.col(|ui| {
                    ui.label(&rec.country);
                });
                row.col(|ui| {
                    ui.label(&rec.product);
                });
                row.col(|ui| {
                    ui.label(format_currency(rec.amount));
                });
                row.col(|ui| {
                    ui.label(format_count(rec.boxes_shipped));
                });
            });
        });
}
