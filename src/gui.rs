use crate::config::Settings;
use crate::error::SweeperError;
use crate::io::{Export, FileFormat};
use crate::session::{FileSettings, FileView, UploadedFile, derive_view, load_upload};
use crate::table::Table;
use crate::theme;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;

mod file_panel;
mod plots;
mod preview;
mod transfer;

/// The view computed for a set of selections, kept until they change.
pub(crate) struct CachedView {
    settings: FileSettings,
    config: Settings,
    pub(crate) view: FileView,
}

/// One uploaded file and everything the UI remembers about it.
pub struct FileEntry {
    pub(crate) id: u64,
    pub(crate) upload: UploadedFile,
    pub(crate) loaded: Result<Table, SweeperError>,
    pub(crate) settings: FileSettings,
    pub(crate) cache: Option<CachedView>,
    pub(crate) export: Option<Result<Export, String>>,
    pub(crate) status: Option<String>,
}

impl FileEntry {
    pub fn new(id: u64, upload: UploadedFile, default_format: FileFormat) -> Self {
        let loaded = load_upload(&upload);
        if let Err(err) = &loaded {
            log::warn!("Could not load {}: {err}", upload.name);
        }
        Self {
            id,
            upload,
            loaded,
            settings: FileSettings::new(default_format),
            cache: None,
            export: None,
            status: None,
        }
    }

    /// Recomputes the view when the selections or preferences changed since
    /// the last frame. Asking for the conversion does not count as a change.
    pub fn refresh_view(&mut self, config: &Settings) {
        let Ok(loaded) = &self.loaded else {
            self.cache = None;
            return;
        };

        let key = FileSettings {
            convert: false,
            ..self.settings.clone()
        };
        let fresh = self
            .cache
            .as_ref()
            .is_some_and(|cached| cached.settings == key && cached.config == *config);
        if !fresh {
            let view = derive_view(loaded, &key, config);
            self.cache = Some(CachedView {
                settings: key,
                config: config.clone(),
                view,
            });
        }
    }

    /// Drops a conversion made for earlier selections.
    pub fn invalidate_export(&mut self) {
        self.settings.convert = false;
        self.export = None;
        self.status = None;
    }
}

pub struct SweeperApp {
    settings: Settings,
    files: Vec<FileEntry>,
    next_id: u64,
    upload_tx: Sender<Vec<UploadedFile>>,
    upload_rx: Receiver<Vec<UploadedFile>>,
    show_settings: bool,
}

impl Default for SweeperApp {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl SweeperApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        theme::apply_sweeper_theme(&cc.egui_ctx);

        // Load previous preferences (if any).
        let settings = cc
            .storage
            .and_then(|storage| eframe::get_value::<Settings>(storage, eframe::APP_KEY))
            .filter(|settings| match settings.validate() {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Ignoring stored settings: {err}");
                    false
                }
            })
            .unwrap_or_default();

        Self::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Self {
        let (upload_tx, upload_rx) = crossbeam_channel::unbounded();
        Self {
            settings,
            files: Vec::new(),
            next_id: 0,
            upload_tx,
            upload_rx,
            show_settings: false,
        }
    }

    /// Appends a batch of uploads in the order given.
    pub fn add_uploads(&mut self, uploads: Vec<UploadedFile>) {
        for upload in uploads {
            let entry = FileEntry::new(self.next_id, upload, self.settings.default_format);
            self.next_id += 1;
            self.files.push(entry);
        }
    }

    fn receive_uploads(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            let uploads = dropped.iter().filter_map(transfer::from_dropped).collect();
            self.add_uploads(uploads);
        }

        while let Ok(uploads) = self.upload_rx.try_recv() {
            self.add_uploads(uploads);
        }
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(theme::SPACING_SMALL);
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new("📀 Advanced Data Sweeper")
                        .heading()
                        .strong()
                        .color(theme::HEADING_COLOR),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙ Settings").clicked() {
                        self.show_settings = !self.show_settings;
                    }
                });
            });
            ui.label(
                "Transform your files between CSV and Excel formats with built-in data cleaning and visualization!",
            );

            ui.add_space(theme::SPACING_SMALL);
            ui.horizontal(|ui| {
                if ui.button("📂 Upload your files (CSV or Excel)…").clicked() {
                    transfer::pick_files(&self.upload_tx, ctx);
                }
                ui.weak("or drop them onto this window");
                if !self.files.is_empty() && ui.button("Clear all").clicked() {
                    log::info!("Cleared {} uploaded files", self.files.len());
                    self.files.clear();
                }
            });
            ui.add_space(theme::SPACING_SMALL);
        });
    }

    fn render_settings_window(&mut self, ctx: &egui::Context) {
        egui::Window::new("⚙ Settings")
            .open(&mut self.show_settings)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([40.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Preview rows:");
                        ui.add(egui::DragValue::new(&mut self.settings.preview_rows).range(1..=100));
                        ui.end_row();

                        ui.label("Chart height:");
                        ui.add(egui::Slider::new(&mut self.settings.chart_height, 120.0..=600.0));
                        ui.end_row();

                        ui.label("Convert new files to:");
                        ui.horizontal(|ui| {
                            for format in FileFormat::ALL {
                                ui.radio_value(
                                    &mut self.settings.default_format,
                                    format,
                                    format.label(),
                                );
                            }
                        });
                        ui.end_row();
                    });

                ui.add_space(theme::SPACING_SMALL);
                if ui.button("Reset to defaults").clicked() {
                    self.settings = Settings::default();
                }
            });
    }

    fn render_files(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    if self.files.is_empty() {
                        ui.add_space(theme::SPACING_LARGE);
                        ui.vertical_centered(|ui| {
                            ui.weak("No files uploaded yet.");
                        });
                        return;
                    }

                    let mut removed = Vec::new();
                    for entry in &mut self.files {
                        if file_panel::show(ui, entry, &self.settings) {
                            removed.push(entry.id);
                        }
                        ui.add_space(theme::SPACING_LARGE);
                    }
                    if !removed.is_empty() {
                        self.files.retain(|entry| !removed.contains(&entry.id));
                    }

                    render_summary(ui, &self.files);
                });
        });
    }
}

impl eframe::App for SweeperApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_uploads(ctx);

        render_footer(ctx);
        self.render_header(ctx);
        self.render_settings_window(ctx);
        self.render_files(ctx);

        preview_files_being_dropped(ctx);
    }

    // Only the preferences survive a restart; uploads do not.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }
}

fn render_summary(ui: &mut egui::Ui, files: &[FileEntry]) {
    if files.is_empty() {
        return;
    }
    let failed = files.iter().filter(|entry| entry.loaded.is_err()).count();
    if failed == 0 {
        ui.colored_label(theme::SUCCESS_COLOR, "🎉 All files processed successfully!");
    } else {
        ui.colored_label(
            theme::ERROR_COLOR,
            format!(
                "⚠ {} of {} files processed, {failed} skipped",
                files.len() - failed,
                files.len()
            ),
        );
    }
}

fn render_footer(ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 3.0;
            ui.label("Powered by ");
            ui.hyperlink_to("egui", "https://github.com/emilk/egui");
            ui.label(" and ");
            ui.hyperlink_to(
                "eframe",
                "https://github.com/emilk/egui/tree/master/crates/eframe",
            );
            ui.label(".");
        });
    });
}

/// Dims the window while files hover over it.
fn preview_files_being_dropped(ctx: &egui::Context) {
    use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

    if ctx.input(|i| i.raw.hovered_files.is_empty()) {
        return;
    }

    let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
    let screen_rect = ctx.screen_rect();
    painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
    painter.text(
        screen_rect.center(),
        Align2::CENTER_CENTER,
        "Drop CSV or Excel files to upload",
        TextStyle::Heading.resolve(&ctx.style()),
        Color32::WHITE,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::CleaningStep;

    fn view(entry: &FileEntry) -> Option<&FileView> {
        entry.cache.as_ref().map(|cached| &cached.view)
    }

    const KV: &[u8] = b"k,v\na,1\na,1\nb,\n";

    #[test]
    fn test_entries_keep_upload_order() {
        let mut app = SweeperApp::default();
        app.add_uploads(vec![
            UploadedFile::new("b.csv", KV),
            UploadedFile::new("a.txt", "x"),
            UploadedFile::new("c.csv", KV),
        ]);

        let names: Vec<&str> = app.files.iter().map(|e| e.upload.name.as_str()).collect();
        assert_eq!(names, vec!["b.csv", "a.txt", "c.csv"]);
        assert!(app.files[1].loaded.is_err());
        assert_eq!(app.files[2].id, 2);
    }

    #[test]
    fn test_new_entries_use_default_format() {
        let mut app = SweeperApp::with_settings(Settings {
            default_format: FileFormat::Excel,
            ..Default::default()
        });
        app.add_uploads(vec![UploadedFile::new("kv.csv", KV)]);
        assert_eq!(app.files[0].settings.convert_to, FileFormat::Excel);
    }

    #[test]
    fn test_view_follows_settings() {
        let config = Settings::default();
        let mut entry = FileEntry::new(0, UploadedFile::new("kv.csv", KV), FileFormat::Csv);

        entry.refresh_view(&config);
        assert_eq!(view(&entry).map(|v| v.table.height()), Some(3));

        entry.settings.clean = true;
        entry.settings.steps.push(CleaningStep::DropDuplicates);
        entry.refresh_view(&config);
        assert_eq!(view(&entry).map(|v| v.table.height()), Some(2));
    }

    #[test]
    fn test_convert_flag_does_not_recompute() {
        let config = Settings::default();
        let mut entry = FileEntry::new(0, UploadedFile::new("kv.csv", KV), FileFormat::Csv);
        entry.refresh_view(&config);

        entry.settings.convert = true;
        let before = view(&entry).map(|v| v as *const FileView);
        entry.refresh_view(&config);
        assert_eq!(view(&entry).map(|v| v as *const FileView), before);

        entry.invalidate_export();
        assert!(!entry.settings.convert);
        assert!(entry.export.is_none());
    }

    #[test]
    fn test_failed_load_has_no_view() {
        let mut entry = FileEntry::new(0, UploadedFile::new("data.txt", KV), FileFormat::Csv);
        entry.refresh_view(&Settings::default());
        assert!(view(&entry).is_none());
        assert!(matches!(
            entry.loaded,
            Err(SweeperError::UnsupportedExtension { .. })
        ));
    }
}
