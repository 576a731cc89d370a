//! # Data Sweeper Entry Point
//!
//! Runs a CLI command when one is given, otherwise opens the GUI.
//!
//! ```text
//! main()
//!   │
//!   ├─> Parse CLI arguments (clap)
//!   │
//!   ├─> If command provided:
//!   │   └─> Execute CLI command
//!   │
//!   └─> Otherwise:
//!       └─> Launch the eframe window
//! ```
//!
//! ```bash
//! data-sweeper convert report.csv --to excel --dedup
//! data-sweeper
//! ```
//!
//! The web build has no CLI and starts the app on the page's canvas.

#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(target_arch = "wasm32"), expect(clippy::print_stdout))] // Allow println! in the CLI
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

#[cfg(not(target_arch = "wasm32"))]
mod cli;

// When compiling natively:
#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser as _;

    // Set RUST_LOG=debug to see detailed logs
    data_sweeper::logging::init()?;

    let cli = cli::Cli::parse();
    if let Some(command) = cli.command {
        return cli::run_command(command);
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Advanced Data Sweeper")
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([480.0, 360.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Advanced Data Sweeper",
        native_options,
        Box::new(|cc| Ok(Box::new(data_sweeper::SweeperApp::new(cc)))),
    )
    .map_err(|err| anyhow::anyhow!("Failed to start the GUI: {err}"))
}

// When compiling to web using trunk:
#[cfg(target_arch = "wasm32")]
fn main() {
    use eframe::wasm_bindgen::JsCast as _;

    // Redirect `log` message to `console.log` and friends:
    data_sweeper::logging::init().ok();

    let web_options = eframe::WebOptions::default();

    wasm_bindgen_futures::spawn_local(async {
        let document = web_sys::window()
            .expect("No window")
            .document()
            .expect("No document");

        let canvas = document
            .get_element_by_id("the_canvas_id")
            .expect("Failed to find the_canvas_id")
            .dyn_into::<web_sys::HtmlCanvasElement>()
            .expect("the_canvas_id was not a HtmlCanvasElement");

        let start_result = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(data_sweeper::SweeperApp::new(cc)))),
            )
            .await;

        // Remove the loading text and spinner:
        if let Some(loading_text) = document.get_element_by_id("loading_text") {
            match start_result {
                Ok(_) => {
                    loading_text.remove();
                }
                Err(e) => {
                    loading_text.set_inner_html(
                        "<p> The app has crashed. See the developer console for details. </p>",
                    );
                    panic!("Failed to start eframe: {e:?}");
                }
            }
        }
    });
}
