//! Request pipeline: file bytes in, user-visible outcome out.
//!
//! This is the seam between the chat adapter and the core. The adapter hands
//! over raw bytes and a file name; it gets back either a PDF to deliver or a
//! ready-to-send error message. Nothing adapter-specific lives below this
//! point, which is what makes the whole pipeline testable without a chat
//! platform.
//!
//! ## Workspace lifetime
//!
//! On success the [`Workspace`] travels inside the returned [`Outcome`], so
//! the scratch directory stays alive exactly until the adapter has consumed
//! the PDF, then drop disposes it. Disposing any earlier would delete the
//! file before it can be delivered; any later would leak it. On failure the
//! workspace is dropped here, after the error detail has been extracted.

use crate::config::ConvertConfig;
use crate::convert;
use crate::error::ConvertError;
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Extensions the converter is invoked for; everything else is rejected
/// before the engine ever runs.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["docx", "pptx"];

/// What the adapter should send back to the user.
#[derive(Debug)]
pub enum Outcome {
    /// Deliver the PDF at `path` with `caption`.
    ///
    /// The workspace owning `path` rides along so the file survives until
    /// this outcome is dropped.
    Document {
        path: PathBuf,
        caption: String,
        workspace: Workspace,
    },
    /// Deliver a plain text message (rejection or classified failure).
    Text(String),
}

/// Handle one inbound document end to end.
///
/// Validates the extension, allocates a workspace, writes the bytes, runs the
/// conversion engine, and maps every failure to a distinct message. Never
/// panics across this boundary; the caller always gets an [`Outcome`].
pub async fn handle_document(bytes: &[u8], file_name: &str, config: &ConvertConfig) -> Outcome {
    if let Err(e) = check_extension(file_name) {
        info!("rejected '{file_name}': {e}");
        return Outcome::Text(e.to_string());
    }

    let workspace = match Workspace::acquire(config.scratch_root.as_deref()) {
        Ok(ws) => ws,
        Err(e) => {
            warn!("workspace allocation failed: {e}");
            return Outcome::Text(e.to_string());
        }
    };

    // Adapter-supplied names may carry path components; only the final one is
    // trusted.
    let safe_name = Path::new(file_name)
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "document".into());
    let input_path = workspace.path().join(safe_name);

    if let Err(e) = tokio::fs::write(&input_path, bytes).await {
        warn!("failed to stage '{file_name}': {e}");
        return Outcome::Text(ConvertError::Environment { source: e }.to_string());
    }

    match convert::convert(&input_path, workspace.path(), config).await {
        Ok(path) => {
            info!("'{file_name}' converted to {}", path.display());
            Outcome::Document {
                path,
                caption: "Here is your PDF ✅".to_string(),
                workspace,
            }
        }
        Err(e) => {
            info!("'{file_name}' failed: {e}");
            // `workspace` drops here, after the error text is final.
            Outcome::Text(e.to_string())
        }
    }
}

/// Case-insensitive extension check against [`SUPPORTED_EXTENSIONS`].
pub fn check_extension(file_name: &str) -> Result<(), ConvertError> {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(ConvertError::UnsupportedExtension {
            ext: if ext.is_empty() {
                "no extension".to_string()
            } else {
                format!(".{ext}")
            },
        })
    }
}
