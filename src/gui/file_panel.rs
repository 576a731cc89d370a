//! The card shown for each uploaded file: metadata, head preview, cleaning,
//! column selection, chart and conversion.

use super::{FileEntry, plots, preview, transfer};
use crate::cleaning::CleaningStep;
use crate::config::Settings;
use crate::io::{Export, FileFormat};
use crate::session::{FileSettings, FileView, UploadedFile, export_view};
use crate::theme;
use eframe::egui;
use egui::RichText;

/// Draws one file card. Returns `true` when the user asked to remove it.
pub fn show(ui: &mut egui::Ui, entry: &mut FileEntry, config: &Settings) -> bool {
    let mut remove = false;

    theme::card_frame(ui).show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("📄 File Name: {}", entry.upload.name)).strong());
            ui.label(format!("📏 File Size: {:.2} KB", entry.upload.size_kb()));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✖ Remove").clicked() {
                    remove = true;
                }
            });
        });

        if let Err(err) = &entry.loaded {
            ui.colored_label(theme::ERROR_COLOR, format!("❌ {err}"));
            return;
        }

        entry.refresh_view(config);
        let before = entry.settings.clone();

        let FileEntry {
            id,
            upload,
            settings,
            cache,
            export,
            status,
            ..
        } = entry;
        let Some(cached) = cache.as_ref() else {
            return;
        };
        let view = &cached.view;

        render_preview(ui, *id, view);
        render_cleaning(ui, &upload.name, settings, view);
        render_column_selection(ui, &upload.name, settings, view);
        render_visualization(ui, *id, &upload.name, settings, view, config);
        render_conversion(ui, upload, settings, view, export, status);

        if !same_selections(&before, settings) {
            log::debug!("Selections changed for {}", upload.name);
            entry.invalidate_export();
            ui.ctx().request_repaint();
        }
    });

    remove
}

/// Compares everything but the conversion request.
fn same_selections(a: &FileSettings, b: &FileSettings) -> bool {
    FileSettings {
        convert: false,
        ..a.clone()
    } == FileSettings {
        convert: false,
        ..b.clone()
    }
}

fn render_preview(ui: &mut egui::Ui, id: u64, view: &FileView) {
    ui.add_space(theme::SPACING_SMALL);
    ui.label(RichText::new("🔍 Preview the Head of the Dataframe").strong());
    preview::render_table(ui, ("preview", id), &view.preview);
}

fn render_cleaning(ui: &mut egui::Ui, name: &str, settings: &mut FileSettings, view: &FileView) {
    theme::section_heading(ui, "🛠 Data Cleaning Options");
    ui.checkbox(&mut settings.clean, format!("Clean Data for {name}"));
    if !settings.clean {
        return;
    }

    ui.horizontal(|ui| {
        if ui.button(format!("Remove Duplicates from {name}")).clicked() {
            settings.steps.push(CleaningStep::DropDuplicates);
        }
        if ui.button(format!("Fill Missing Values for {name}")).clicked() {
            settings.steps.push(CleaningStep::FillMissing);
        }
        if !settings.steps.is_empty() && ui.button("↺ Undo cleaning").clicked() {
            settings.steps.clear();
        }
    });

    for message in &view.messages {
        ui.colored_label(theme::SUCCESS_COLOR, format!("✔ {message}"));
    }
}

fn render_column_selection(
    ui: &mut egui::Ui,
    name: &str,
    settings: &mut FileSettings,
    view: &FileView,
) {
    theme::section_heading(ui, "🎯 Select Columns to Convert");
    ui.horizontal(|ui| {
        ui.label(format!("Choose Columns for {name}"));
        if ui.small_button("All").clicked() {
            settings.select_all();
        }
        if ui.small_button("None").clicked() {
            settings.select_none();
        }
    });

    ui.horizontal_wrapped(|ui| {
        for column in &view.available_columns {
            let mut selected = settings.is_selected(column);
            if ui.checkbox(&mut selected, column.as_str()).changed() {
                settings.toggle_column(column, &view.available_columns);
            }
        }
    });

    if settings.columns.is_some() {
        let chosen = settings.selection(&view.available_columns);
        if chosen.is_empty() {
            ui.weak("No columns selected");
        } else {
            ui.weak(format!("Order: {}", chosen.join(", ")));
        }
    }
}

fn render_visualization(
    ui: &mut egui::Ui,
    id: u64,
    name: &str,
    settings: &mut FileSettings,
    view: &FileView,
    config: &Settings,
) {
    theme::section_heading(ui, "📊 Data Visualization");
    ui.checkbox(&mut settings.show_chart, format!("Show Visualization for {name}"));
    if !settings.show_chart {
        return;
    }
    // The chart arrives with the next view after the box is ticked.
    if let Some(chart) = &view.chart {
        plots::render_bar_chart(ui, ("chart", id), chart, config.chart_height);
    }
}

fn render_conversion(
    ui: &mut egui::Ui,
    upload: &UploadedFile,
    settings: &mut FileSettings,
    view: &FileView,
    export: &mut Option<Result<Export, String>>,
    status: &mut Option<String>,
) {
    let name = &upload.name;
    theme::section_heading(ui, "🔄 Conversion Options");
    ui.horizontal(|ui| {
        ui.label(format!("Convert {name} to:"));
        for format in FileFormat::ALL {
            ui.radio_value(&mut settings.convert_to, format, format.label());
        }
    });
    ui.weak(format!(
        "{} rows × {} columns",
        view.table.height(),
        view.table.width()
    ));

    if ui.button(format!("Convert {name}")).clicked() {
        settings.convert = true;
        *status = None;
        *export = Some(export_view(view, name, settings.convert_to).map_err(|err| {
            log::error!("Conversion of {name} failed: {err}");
            err.to_string()
        }));
    }

    match export {
        Some(Ok(download)) => {
            let label = format!("⬇ Download {name} as {}", download.format.label());
            if ui
                .add(theme::download_button(label))
                .on_hover_text(format!("{} ({})", download.file_name, download.mime_type))
                .clicked()
            {
                *status = match transfer::offer_download(download) {
                    Ok(message) => message,
                    Err(err) => Some(format!("❌ {err}")),
                };
            }
        }
        Some(Err(message)) => {
            ui.colored_label(theme::ERROR_COLOR, format!("❌ {message}"));
        }
        None => {}
    }

    if let Some(message) = status {
        ui.label(message.as_str());
    }
}
