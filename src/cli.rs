use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use data_sweeper::cleaning::CleaningStep;
use data_sweeper::config::Settings;
use data_sweeper::io::FileFormat;
use data_sweeper::session::{FileSession, FileSettings, UploadedFile, load_upload, process_batch};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "data-sweeper",
    version,
    about = "Convert CSV and Excel files with light cleaning. Opens the GUI when no command is given."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TargetFormat {
    Csv,
    #[value(alias = "xlsx")]
    Excel,
}

impl From<TargetFormat> for FileFormat {
    fn from(target: TargetFormat) -> Self {
        match target {
            TargetFormat::Csv => Self::Csv,
            TargetFormat::Excel => Self::Excel,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean and convert files
    Convert {
        /// Files to convert (.csv or .xlsx)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        to: TargetFormat,

        /// Remove duplicate rows
        #[arg(long)]
        dedup: bool,

        /// Fill missing numeric values with the column mean (after --dedup)
        #[arg(long)]
        fill_missing: bool,

        /// Columns to keep, comma-separated, in output order
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Output directory. Defaults to each input file's directory.
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Path to a JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show the columns and first rows of a file
    Inspect {
        /// File to inspect (.csv or .xlsx)
        file: PathBuf,

        /// Rows to print. Defaults to the configured preview size.
        #[arg(short, long)]
        rows: Option<usize>,

        /// Path to a JSON settings file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Convert {
            files,
            to,
            dedup,
            fill_missing,
            columns,
            out_dir,
            config,
        } => {
            let settings = load_settings(config.as_deref())?;
            let mut steps = Vec::new();
            if dedup {
                steps.push(CleaningStep::DropDuplicates);
            }
            if fill_missing {
                steps.push(CleaningStep::FillMissing);
            }
            let file_settings = FileSettings {
                clean: !steps.is_empty(),
                steps,
                columns,
                show_chart: false,
                convert_to: to.into(),
                convert: true,
            };
            convert_files(&files, &file_settings, out_dir.as_deref(), &settings)
        }
        Commands::Inspect { file, rows, config } => {
            let settings = load_settings(config.as_deref())?;
            inspect_file(&file, rows.unwrap_or(settings.preview_rows))
        }
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Ok(Settings::load(path)?),
        None => Ok(Settings::default()),
    }
}

fn read_upload(path: &Path) -> Result<UploadedFile> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(UploadedFile::new(name, bytes))
}

/// Absolute form of `path` for comparing destinations, or `path` itself when
/// it does not exist yet.
fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_err| path.to_path_buf())
}

/// Converts every readable file and writes the results. A destination that
/// is one of the inputs, or was already written in this run, is refused.
/// Returns an error naming the failure count if any file could not be
/// converted.
fn convert_files(
    files: &[PathBuf],
    file_settings: &FileSettings,
    out_dir: Option<&Path>,
    settings: &Settings,
) -> Result<()> {
    let mut failures = 0;
    let mut sessions = Vec::with_capacity(files.len());
    let mut sources = Vec::with_capacity(files.len());

    for path in files {
        match read_upload(path) {
            Ok(upload) => {
                sessions.push(FileSession {
                    upload,
                    settings: file_settings.clone(),
                });
                sources.push(path.as_path());
            }
            Err(err) => {
                println!("✖ {}: {err:#}", path.display());
                failures += 1;
            }
        }
    }

    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let inputs: HashSet<PathBuf> = files.iter().map(|path| resolve(path)).collect();
    let mut written_paths: HashSet<PathBuf> = HashSet::new();

    for (outcome, source) in process_batch(&sessions, settings).into_iter().zip(sources) {
        let written = outcome
            .result
            .map_err(anyhow::Error::from)
            .and_then(|processed| {
                let download = processed
                    .download
                    .context("No conversion was produced")?;
                let dir = out_dir
                    .or_else(|| source.parent())
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .unwrap_or_else(|| Path::new("."));
                let destination = dir.join(&download.file_name);
                let key = resolve(dir).join(&download.file_name);
                if inputs.contains(&key) {
                    bail!(
                        "{} would overwrite an input file; pass --out-dir",
                        destination.display()
                    );
                }
                if !written_paths.insert(key) {
                    bail!(
                        "{} was already written by an earlier file",
                        destination.display()
                    );
                }
                std::fs::write(&destination, &download.bytes)
                    .with_context(|| format!("Failed to write {}", destination.display()))?;
                Ok((destination, processed.view.table.height()))
            });

        match written {
            Ok((destination, rows)) => {
                println!("✔ {} -> {} ({rows} rows)", outcome.name, destination.display());
            }
            Err(err) => {
                println!("✖ {}: {err:#}", outcome.name);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} files could not be converted", files.len());
    }
    println!("🎉 All files processed successfully!");
    Ok(())
}

fn inspect_file(path: &Path, rows: usize) -> Result<()> {
    let upload = read_upload(path)?;
    let table = load_upload(&upload)?;

    println!(
        "{}: {} rows x {} columns ({:.2} KB)",
        upload.name,
        table.height(),
        table.width(),
        upload.size_kb()
    );
    for column in table.columns() {
        println!(
            "  {:<24} {:<9} {} missing",
            column.name(),
            column.kind().as_str(),
            column.null_count()
        );
    }

    let head = table.head(rows);
    let renderers: Vec<_> = head.columns().iter().map(|c| c.renderer()).collect();
    println!();
    println!("{}", head.column_names().join(" | "));
    for row in 0..head.height() {
        let cells: Vec<String> = renderers.iter().map(|r| r.render(row)).collect();
        println!("{}", cells.join(" | "));
    }
    Ok(())
}
