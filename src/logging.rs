//! Logging setup.
//!
//! The library logs through the `log` facade. Natively the records go to
//! stderr via `env_logger` (default level `info`, override with `RUST_LOG`);
//! in the browser they go to the developer console via `eframe::WebLogger`.
//!
//! ```no_run
//! data_sweeper::logging::init().expect("logger already set");
//! log::info!("App started");
//! ```

/// Installs the logger. Call once at startup.
///
/// # Errors
///
/// Returns an error if a logger was already installed.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init()
}

/// Installs the logger. Call once at startup.
///
/// # Errors
///
/// Returns an error if a logger was already installed.
#[cfg(target_arch = "wasm32")]
pub fn init() -> Result<(), log::SetLoggerError> {
    eframe::WebLogger::init(log::LevelFilter::Debug)
}
