//! # Data Sweeper - CSV and Excel conversion with light cleaning
//!
//! Data Sweeper loads uploaded CSV or Excel (`.xlsx`) files into an in-memory
//! table, lets the user clean them (drop duplicate rows, fill missing numbers
//! with the column mean), pick and reorder columns, chart the first numeric
//! columns, and converts the result to CSV or Excel for download.
//!
//! ## Quick Start
//!
//! ```no_run
//! use data_sweeper::config::Settings;
//! use data_sweeper::io::FileFormat;
//! use data_sweeper::session::{FileSettings, UploadedFile, derive_view, export_view, load_upload};
//!
//! # fn example() -> data_sweeper::error::Result<()> {
//! let upload = UploadedFile::new("report.csv", std::fs::read("report.csv")?);
//! let table = load_upload(&upload)?;
//!
//! let view = derive_view(&table, &FileSettings::default(), &Settings::default());
//! let export = export_view(&view, &upload.name, FileFormat::Excel)?;
//! assert_eq!(export.file_name, "report.xlsx");
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`table`]: The typed column table and type inference
//! - [`io`]: CSV and Excel readers/writers, export naming and MIME types
//! - [`cleaning`]: Duplicate removal and mean filling
//! - [`chart`]: Bar chart data for the first numeric columns
//! - [`session`]: The per-file pipeline from upload to download
//! - [`config`]: User preferences
//! - [`error`]: Error types and handling utilities
//! - [`logging`]: Logger setup for native and web builds
//!
//! The egui front end is exported as [`SweeperApp`].

#![warn(clippy::all, rust_2018_idioms)]

pub mod chart;
pub mod cleaning;
pub mod config;
pub mod error;
mod gui;
pub mod io;
pub mod logging;
pub mod session;
pub mod table;
mod theme;

pub use gui::SweeperApp;
