//! Getting files in and out of the app: file dialogs and drag-and-drop on
//! the way in, a save dialog (native) or a browser download (web) on the way
//! out.

use crate::error::Result;
use crate::io::Export;
use crate::session::UploadedFile;
use crossbeam_channel::Sender;
use eframe::egui;

const FILTER_NAME: &str = "CSV or Excel";
const FILTER_EXTENSIONS: [&str; 2] = ["csv", "xlsx"];

/// How long a download's object URL stays alive after the click.
#[cfg(target_arch = "wasm32")]
const REVOKE_DELAY_MS: i32 = 60_000;

/// Turns a file dropped onto the window into an upload. On the web the bytes
/// come with the event; natively only the path does.
pub fn from_dropped(file: &egui::DroppedFile) -> Option<UploadedFile> {
    let name = if file.name.is_empty() {
        file.path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        file.name.clone()
    };

    if let Some(bytes) = &file.bytes {
        return Some(UploadedFile::new(name, bytes.to_vec()));
    }

    let path = file.path.as_ref()?;
    match std::fs::read(path) {
        Ok(bytes) => Some(UploadedFile::new(name, bytes)),
        Err(err) => {
            log::error!("Failed to read dropped file {}: {err}", path.display());
            None
        }
    }
}

/// Opens a multi-file picker and sends the chosen files down `tx`.
#[cfg(not(target_arch = "wasm32"))]
pub fn pick_files(tx: &Sender<Vec<UploadedFile>>, ctx: &egui::Context) {
    let Some(paths) = rfd::FileDialog::new()
        .add_filter(FILTER_NAME, &FILTER_EXTENSIONS)
        .pick_files()
    else {
        return;
    };

    let uploads = paths
        .iter()
        .filter_map(|path| {
            let name = path.file_name()?.to_string_lossy().into_owned();
            match std::fs::read(path) {
                Ok(bytes) => Some(UploadedFile::new(name, bytes)),
                Err(err) => {
                    log::error!("Failed to read {}: {err}", path.display());
                    None
                }
            }
        })
        .collect();

    if tx.send(uploads).is_err() {
        log::warn!("Upload receiver dropped");
    }
    ctx.request_repaint();
}

/// Opens a multi-file picker and sends the chosen files down `tx` once the
/// browser has read them.
#[cfg(target_arch = "wasm32")]
pub fn pick_files(tx: &Sender<Vec<UploadedFile>>, ctx: &egui::Context) {
    let tx = tx.clone();
    let ctx = ctx.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let Some(handles) = rfd::AsyncFileDialog::new()
            .add_filter(FILTER_NAME, &FILTER_EXTENSIONS)
            .pick_files()
            .await
        else {
            return;
        };

        let mut uploads = Vec::with_capacity(handles.len());
        for handle in handles {
            let bytes = handle.read().await;
            uploads.push(UploadedFile::new(handle.file_name(), bytes));
        }

        if tx.send(uploads).is_err() {
            log::warn!("Upload receiver dropped");
        }
        ctx.request_repaint();
    });
}

/// Asks where to save the converted file and writes it there. Returns a
/// status line, or `None` when the dialog was cancelled.
///
/// # Errors
///
/// The file could not be written.
#[cfg(not(target_arch = "wasm32"))]
pub fn offer_download(export: &Export) -> Result<Option<String>> {
    use crate::error::ResultExt as _;

    let Some(path) = rfd::FileDialog::new()
        .set_file_name(&export.file_name)
        .add_filter(export.format.label(), &[export.format.extension()])
        .save_file()
    else {
        return Ok(None);
    };

    std::fs::write(&path, &export.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Saved {} bytes to {}", export.len(), path.display());
    Ok(Some(format!("✔ Saved to {}", path.display())))
}

/// Hands the converted file to the browser as a download.
///
/// # Errors
///
/// [`crate::error::SweeperError::Transfer`] when the DOM calls fail.
#[cfg(target_arch = "wasm32")]
pub fn offer_download(export: &Export) -> Result<Option<String>> {
    use crate::error::SweeperError;
    use eframe::wasm_bindgen::closure::Closure;
    use eframe::wasm_bindgen::{JsCast as _, JsValue};

    let js_err = |err: JsValue| SweeperError::Transfer(format!("{err:?}"));

    let window =
        web_sys::window().ok_or_else(|| SweeperError::Transfer("No window available".to_owned()))?;
    let document = window
        .document()
        .ok_or_else(|| SweeperError::Transfer("No document available".to_owned()))?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(export.bytes.as_slice()));
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(export.mime_type);
    let blob =
        web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_err)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let anchor = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_element| SweeperError::Transfer("Could not create a link".to_owned()))?;
    anchor.set_href(&url);
    anchor.set_download(&export.file_name);
    anchor.click();

    // Revoking straight after the click can cancel the download.
    let revoke = Closure::once_into_js(move || {
        if let Err(err) = web_sys::Url::revoke_object_url(&url) {
            log::warn!("Failed to revoke download URL: {err:?}");
        }
    });
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            revoke.unchecked_ref(),
            REVOKE_DELAY_MS,
        )
        .map_err(js_err)?;

    log::info!("Offered {} ({} bytes) for download", export.file_name, export.len());
    Ok(Some(format!("✔ Downloading {}", export.file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_dropped_bytes_are_used() {
        let dropped = egui::DroppedFile {
            name: "web.csv".to_owned(),
            bytes: Some(Arc::from(&b"a\n1\n"[..])),
            ..Default::default()
        };
        let upload = from_dropped(&dropped).expect("bytes present");
        assert_eq!(upload.name, "web.csv");
        assert_eq!(upload.bytes, b"a\n1\n");
    }

    #[test]
    fn test_dropped_path_is_read() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("local.csv");
        std::fs::write(&path, "a\n1\n")?;

        let dropped = egui::DroppedFile {
            path: Some(path),
            ..Default::default()
        };
        let upload = from_dropped(&dropped).expect("file readable");
        assert_eq!(upload.name, "local.csv");
        assert_eq!(upload.size(), 4);
        Ok(())
    }

    #[test]
    fn test_unreadable_drop_is_skipped() {
        let dropped = egui::DroppedFile {
            path: Some("/definitely/not/here.csv".into()),
            ..Default::default()
        };
        assert!(from_dropped(&dropped).is_none());
    }
}
