//! The processing pipeline for uploaded files.
//!
//! Every interaction is modelled as a pure function from the uploaded files
//! and the current per-file widget selections to what is shown and offered
//! for download:
//!
//! ```text
//! UploadedFile ──load_upload──▶ Table ──derive_view(FileSettings)──▶ FileView
//!                                                                       │
//!                                              export_view(FileFormat) ─┘──▶ Export
//! ```
//!
//! [`process_batch`] runs that pipeline for a whole upload batch, one file at
//! a time in upload order. A file that fails (for example an unsupported
//! extension) is reported in its [`FileOutcome`] and the rest of the batch
//! carries on.

use crate::chart::ChartData;
use crate::cleaning::{CleaningStep, apply_step};
use crate::config::Settings;
use crate::error::Result;
use crate::io::{Export, FileFormat, read_table};
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// An uploaded file: its declared name and raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn size_kb(&self) -> f64 {
        self.bytes.len() as f64 / 1024.0
    }
}

/// Widget selections for one uploaded file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileSettings {
    /// "Clean data" checkbox. Steps only apply while this is on.
    pub clean: bool,
    /// Cleaning steps in the order the user requested them.
    pub steps: Vec<CleaningStep>,
    /// Chosen columns in chosen order; `None` means every column.
    pub columns: Option<Vec<String>>,
    pub show_chart: bool,
    pub convert_to: FileFormat,
    /// Set once the user asked for the conversion.
    pub convert: bool,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self::new(FileFormat::default())
    }
}

impl FileSettings {
    pub fn new(convert_to: FileFormat) -> Self {
        Self {
            clean: false,
            steps: Vec::new(),
            columns: None,
            show_chart: false,
            convert_to,
            convert: false,
        }
    }

    /// The effective selection given the columns on offer.
    pub fn selection(&self, available: &[String]) -> Vec<String> {
        self.columns
            .clone()
            .unwrap_or_else(|| available.to_vec())
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.columns
            .as_ref()
            .is_none_or(|columns| columns.iter().any(|c| c == name))
    }

    /// Adds `name` to the end of the selection, or removes it.
    pub fn toggle_column(&mut self, name: &str, available: &[String]) {
        let mut selection = self.selection(available);
        if let Some(pos) = selection.iter().position(|c| c == name) {
            selection.remove(pos);
        } else {
            selection.push(name.to_owned());
        }
        self.columns = Some(selection);
    }

    pub fn select_all(&mut self) {
        self.columns = None;
    }

    pub fn select_none(&mut self) {
        self.columns = Some(Vec::new());
    }
}

/// Everything shown for one file.
#[derive(Clone, Debug, PartialEq)]
pub struct FileView {
    /// The table after cleaning and column selection.
    pub table: Table,
    /// Head of the table as loaded.
    pub preview: Table,
    /// Columns offered by the column selector, in original order.
    pub available_columns: Vec<String>,
    /// Present when the chart is switched on.
    pub chart: Option<ChartData>,
    /// One line per applied cleaning step.
    pub messages: Vec<String>,
}

/// Dispatches on the file extension and parses the upload.
///
/// # Errors
///
/// [`crate::error::SweeperError::UnsupportedExtension`] for anything but
/// `.csv`/`.xlsx`, or the reader's error for malformed content.
pub fn load_upload(upload: &UploadedFile) -> Result<Table> {
    let format = FileFormat::from_file_name(&upload.name)?;
    let table = read_table(&upload.bytes, format)?;
    log::info!(
        "Loaded {} ({:.1} KB): {} rows x {} columns",
        upload.name,
        upload.size_kb(),
        table.height(),
        table.width()
    );
    Ok(table)
}

/// Applies the enabled cleaning steps, then the column selection, and builds
/// the preview and chart. `loaded` is not modified.
pub fn derive_view(loaded: &Table, settings: &FileSettings, config: &Settings) -> FileView {
    let preview = loaded.head(config.preview_rows);
    let mut table = loaded.clone();

    let messages: Vec<String> = if settings.clean {
        settings
            .steps
            .iter()
            .map(|step| apply_step(&mut table, *step).message())
            .collect()
    } else {
        Vec::new()
    };

    let available_columns: Vec<String> =
        table.column_names().into_iter().map(str::to_owned).collect();
    if let Some(columns) = &settings.columns {
        table.select(columns);
    }

    let chart = settings.show_chart.then(|| ChartData::from_table(&table));

    log::debug!(
        "Derived view: {} rows x {} columns, {} cleaning messages",
        table.height(),
        table.width(),
        messages.len()
    );

    FileView {
        table,
        preview,
        available_columns,
        chart,
        messages,
    }
}

/// Converts the view's table for download.
///
/// # Errors
///
/// See [`Export::new`].
pub fn export_view(view: &FileView, source_name: &str, format: FileFormat) -> Result<Export> {
    Export::new(&view.table, source_name, format)
}

/// One uploaded file together with its widget selections.
#[derive(Clone, Debug)]
pub struct FileSession {
    pub upload: UploadedFile,
    pub settings: FileSettings,
}

#[derive(Debug)]
pub struct ProcessedFile {
    pub view: FileView,
    /// Present when the user asked for the conversion.
    pub download: Option<Export>,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub name: String,
    pub size: usize,
    pub result: Result<ProcessedFile>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs the whole pipeline for one file.
///
/// # Errors
///
/// Loading or conversion failures for this file.
pub fn process_file(session: &FileSession, config: &Settings) -> Result<ProcessedFile> {
    let loaded = load_upload(&session.upload)?;
    let view = derive_view(&loaded, &session.settings, config);
    let download = if session.settings.convert {
        Some(export_view(
            &view,
            &session.upload.name,
            session.settings.convert_to,
        )?)
    } else {
        None
    };
    Ok(ProcessedFile { view, download })
}

/// Processes files one after another in upload order. Failures are kept per
/// file and do not stop the batch.
pub fn process_batch(sessions: &[FileSession], config: &Settings) -> Vec<FileOutcome> {
    sessions
        .iter()
        .map(|session| {
            let result = process_file(session, config);
            if let Err(err) = &result {
                log::warn!("Skipping {}: {err}", session.upload.name);
            }
            FileOutcome {
                name: session.upload.name.clone(),
                size: session.upload.size(),
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SweeperError;
    use crate::table::{ColumnData, Value};

    const KV: &[u8] = b"k,v\na,1\na,1\nb,\n";

    fn names(view: &FileView) -> Vec<&str> {
        view.table.column_names()
    }

    #[test]
    fn test_default_settings_are_identity() -> Result<()> {
        let loaded = load_upload(&UploadedFile::new("kv.csv", KV))?;
        let view = derive_view(&loaded, &FileSettings::default(), &Settings::default());
        assert_eq!(view.table, loaded);
        assert!(view.chart.is_none());
        assert!(view.messages.is_empty());
        Ok(())
    }

    #[test]
    fn test_steps_need_clean_enabled() -> Result<()> {
        let loaded = load_upload(&UploadedFile::new("kv.csv", KV))?;
        let mut settings = FileSettings {
            steps: vec![CleaningStep::DropDuplicates],
            ..Default::default()
        };

        let view = derive_view(&loaded, &settings, &Settings::default());
        assert_eq!(view.table.height(), 3);

        settings.clean = true;
        let view = derive_view(&loaded, &settings, &Settings::default());
        assert_eq!(view.table.height(), 2);
        assert_eq!(view.table.row(1), Some(vec![Value::Text("b"), Value::Missing]));
        assert_eq!(view.messages.len(), 1);
        Ok(())
    }

    #[test]
    fn test_steps_apply_in_order() -> Result<()> {
        let loaded = load_upload(&UploadedFile::new("kv.csv", KV))?;
        let settings = FileSettings {
            clean: true,
            steps: vec![CleaningStep::DropDuplicates, CleaningStep::FillMissing],
            ..Default::default()
        };
        let view = derive_view(&loaded, &settings, &Settings::default());
        assert_eq!(
            view.table.column("v").map(|c| c.data().clone()),
            Some(ColumnData::Numeric(vec![Some(1.0), Some(1.0)]))
        );
        Ok(())
    }

    #[test]
    fn test_column_toggling_keeps_order() {
        let available = vec!["a".to_owned(), "b".to_owned(), "c".to_owned()];
        let mut settings = FileSettings::default();
        assert!(settings.is_selected("b"));

        settings.toggle_column("a", &available);
        assert_eq!(settings.selection(&available), vec!["b", "c"]);
        settings.toggle_column("a", &available);
        assert_eq!(settings.selection(&available), vec!["b", "c", "a"]);

        settings.select_none();
        assert!(!settings.is_selected("a"));
        settings.select_all();
        assert_eq!(settings.selection(&available), available);
    }

    #[test]
    fn test_selection_and_chart() -> Result<()> {
        let loaded = load_upload(&UploadedFile::new(
            "m.csv",
            "name,x,y,z\np,1,2,3\nq,4,5,6\n",
        ))?;
        let settings = FileSettings {
            columns: Some(vec!["z".to_owned(), "name".to_owned(), "x".to_owned()]),
            show_chart: true,
            ..Default::default()
        };
        let view = derive_view(&loaded, &settings, &Settings::default());

        assert_eq!(names(&view), vec!["z", "name", "x"]);
        assert_eq!(view.available_columns, vec!["name", "x", "y", "z"]);
        let chart = view.chart.expect("chart requested");
        let series: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(series, vec!["z", "x"]);
        Ok(())
    }

    #[test]
    fn test_preview_is_head_of_loaded() -> Result<()> {
        let body: String = (0..20).map(|i| format!("{i}\n")).collect();
        let loaded = load_upload(&UploadedFile::new("n.csv", format!("n\n{body}")))?;
        let config = Settings {
            preview_rows: 3,
            ..Default::default()
        };
        let view = derive_view(&loaded, &FileSettings::default(), &config);
        assert_eq!(view.preview.height(), 3);
        assert_eq!(view.table.height(), 20);
        Ok(())
    }

    #[test]
    fn test_batch_skips_unsupported_and_continues() {
        let sessions = vec![
            FileSession {
                upload: UploadedFile::new("data.txt", "k,v\na,1\n"),
                settings: FileSettings::default(),
            },
            FileSession {
                upload: UploadedFile::new("good.csv", KV),
                settings: FileSettings {
                    convert: true,
                    ..Default::default()
                },
            },
        ];

        let outcomes = process_batch(&sessions, &Settings::default());
        assert_eq!(outcomes.len(), 2);

        assert!(matches!(
            outcomes[0].result,
            Err(SweeperError::UnsupportedExtension { .. })
        ));

        let processed = outcomes[1].result.as_ref().expect("csv is processed");
        let download = processed.download.as_ref().expect("conversion requested");
        assert_eq!(download.file_name, "good.csv");
        assert_eq!(download.mime_type, "text/csv");
    }
}
