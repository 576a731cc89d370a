use crate::table::{Column, Table};
use eframe::egui;
use egui_extras::{Column as TableColumn, TableBuilder};
use std::hash::Hash;

const HEADER_HEIGHT: f32 = 22.0;
const ROW_HEIGHT: f32 = 18.0;

/// Renders every row of `table` as a grid. Callers pass a small table (the
/// head of an upload).
pub fn render_table(ui: &mut egui::Ui, id_salt: impl Hash, table: &Table) {
    if table.width() == 0 {
        ui.weak("No columns");
        return;
    }

    let renderers: Vec<_> = table.columns().iter().map(Column::renderer).collect();

    ui.push_id(id_salt, |ui| {
        egui::ScrollArea::horizontal().show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(false)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(TableColumn::auto().at_least(60.0), table.width())
                .header(HEADER_HEIGHT, |mut header| {
                    for column in table.columns() {
                        header.col(|ui| {
                            ui.strong(column.name()).on_hover_text(format!(
                                "{} · {} missing",
                                column.kind().as_str(),
                                column.null_count()
                            ));
                        });
                    }
                })
                .body(|mut body| {
                    for row in 0..table.height() {
                        body.row(ROW_HEIGHT, |mut cells| {
                            for renderer in &renderers {
                                cells.col(|ui| {
                                    let text = renderer.render(row);
                                    if text.is_empty() {
                                        ui.weak("—");
                                    } else {
                                        ui.label(text);
                                    }
                                });
                            }
                        });
                    }
                });
        });
    });
}
