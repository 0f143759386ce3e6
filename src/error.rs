//! Error types for the office2pdf library.
//!
//! Every way a conversion request can go wrong has its own variant, and every
//! variant's `Display` text is the message shown to the chat user. Callers
//! pattern-match on [`ConvertError`] rather than catching exceptions; the
//! engine never lets an ambiguous state (zero exit, no output file) pass as
//! success.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the conversion pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The file's extension is not in the supported set.
    #[error("This file type ({ext}) is not supported. Please send a .docx or .pptx file.")]
    UnsupportedExtension { ext: String },

    // ── Converter errors ──────────────────────────────────────────────────
    /// The converter binary could not be found on the system.
    #[error("The document converter is not installed or misconfigured on this server.")]
    ToolMissing,

    /// The converter ran but exited with a non-zero status.
    ///
    /// `detail` is the converter's stderr, falling back to stdout when stderr
    /// is empty — LibreOffice reports some failures only on stdout.
    #[error("Conversion failed: {detail}")]
    ConversionFailed { detail: String },

    /// The converter exceeded the wall-clock timeout and was killed.
    #[error("Conversion timed out after {secs}s. The document may be too large or the converter is wedged.")]
    Timeout { secs: u64 },

    /// The converter exited zero but the expected PDF never appeared.
    #[error("Conversion reported success but no output was produced (expected '{}').", .expected.display())]
    OutputMissing { expected: PathBuf },

    // ── Environment errors ────────────────────────────────────────────────
    /// Could not create the per-request scratch directory.
    #[error("Could not allocate a scratch directory: {source}")]
    Environment {
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected failure during invocation.
    #[error("Unexpected error during conversion: {0}")]
    Unknown(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
