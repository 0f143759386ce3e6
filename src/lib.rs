//! # office2pdf
//!
//! Convert Office documents (`.docx`, `.pptx`) to PDF with LibreOffice,
//! packaged as a Telegram bot plus a reusable library.
//!
//! ## Why shell out to LibreOffice?
//!
//! No pure-Rust renderer comes close to LibreOffice's fidelity on real-world
//! Word and PowerPoint files. The price is that `soffice` is a stateful,
//! single-instance background process that can wedge or crash on its own
//! schedule — so every invocation here runs in an isolated scratch directory
//! under a hard timeout, and every outcome (including the ambiguous "exited
//! zero, wrote nothing") is classified into a distinct, user-visible result.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document bytes + name
//!  │
//!  ├─ 1. Validate   extension must be .docx/.pptx (case-insensitive)
//!  ├─ 2. Workspace  fresh scratch directory, disposed on every exit path
//!  ├─ 3. Convert    soffice --headless … under a 90 s wall-clock timeout
//!  ├─ 4. Classify   Ok(pdf) | ToolMissing | ConversionFailed | Timeout | …
//!  └─ 5. Deliver    PDF + caption, or one descriptive error message
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use office2pdf::{handle_document, ConvertConfig, Outcome};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ConvertConfig::default();
//!     let bytes = std::fs::read("report.docx").unwrap();
//!     match handle_document(&bytes, "report.docx", &config).await {
//!         Outcome::Document { path, .. } => println!("PDF at {}", path.display()),
//!         Outcome::Text(msg) => eprintln!("{msg}"),
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `office2pdf-bot` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod handler;
pub mod telegram;
pub mod workspace;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{BotConfig, ConvertConfig, ConvertConfigBuilder};
pub use convert::convert;
pub use error::ConvertError;
pub use handler::{handle_document, Outcome, SUPPORTED_EXTENSIONS};
pub use workspace::Workspace;
