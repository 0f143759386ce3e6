//! Conversion engine: drive one `soffice` invocation and classify its outcome.
//!
//! ## Why an external process at all?
//!
//! LibreOffice is the only converter that renders real-world `.docx`/`.pptx`
//! faithfully, and it only exposes that through its command line. It is also a
//! single-instance, stateful background process that can wedge or crash
//! independently of any request, so every invocation here runs under a hard
//! wall-clock timeout and ends in exactly one terminal, classified result —
//! an ambiguous state (zero exit, no output file) is an error, not a success.
//!
//! Each call is independent and stateless; concurrent calls are fine as long
//! as each one gets its own output directory (the caller's workspace).

use crate::config::ConvertConfig;
use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// Convert one document to PDF.
///
/// `input_path` must already have a supported extension — validation is the
/// caller's responsibility, not this function's.
///
/// # Returns
/// The path of the produced PDF inside `output_dir`:
/// `<output_dir>/<stem of input_path>.pdf`.
///
/// # Errors
/// * [`ConvertError::ToolMissing`] — converter binary not found
/// * [`ConvertError::ConversionFailed`] — non-zero exit
/// * [`ConvertError::Timeout`] — wall clock exceeded; the child is killed
/// * [`ConvertError::OutputMissing`] — zero exit but no PDF appeared
/// * [`ConvertError::Unknown`] — anything else
pub async fn convert(
    input_path: &Path,
    output_dir: &Path,
    config: &ConvertConfig,
) -> Result<PathBuf, ConvertError> {
    let start = Instant::now();
    debug!(
        "invoking {} on {}",
        config.converter_bin.display(),
        input_path.display()
    );

    let mut child = Command::new(&config.converter_bin)
        .arg("--headless")
        .arg("--nologo")
        .arg("--nofirststartwindow")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(output_dir)
        .arg(input_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConvertError::ToolMissing,
            _ => ConvertError::Unknown(format!("failed to spawn converter: {e}")),
        })?;

    // Drain both pipes concurrently with the wait so a chatty converter can
    // never deadlock on a full pipe buffer.
    let stdout_task = tokio::spawn(slurp(child.stdout.take()));
    let stderr_task = tokio::spawn(slurp(child.stderr.take()));

    let status = match timeout(Duration::from_secs(config.timeout_secs), child.wait()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) => {
            return Err(ConvertError::Unknown(format!(
                "failed waiting for converter: {e}"
            )));
        }
        Err(_elapsed) => {
            // A wedged soffice must not be left running: kill and reap it so
            // the next request gets a clean slate.
            warn!(
                "converter exceeded {}s on {}; killing",
                config.timeout_secs,
                input_path.display()
            );
            child.kill().await.ok();
            child.wait().await.ok();
            return Err(ConvertError::Timeout {
                secs: config.timeout_secs,
            });
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    if !status.success() {
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        debug!("converter exit {:?}; stdout: {stdout}; stderr: {stderr}", status.code());
        return Err(ConvertError::ConversionFailed { detail });
    }

    let pdf_path = expected_output(input_path, output_dir);
    if !pdf_path.exists() {
        warn!(
            "converter exited 0 but produced no file at {}",
            pdf_path.display()
        );
        return Err(ConvertError::OutputMissing { expected: pdf_path });
    }

    info!(
        "converted {} in {:?}",
        input_path.display(),
        start.elapsed()
    );
    Ok(pdf_path)
}

/// The output path soffice is expected to write: same base name as the input,
/// `.pdf` extension, inside `output_dir`.
pub fn expected_output(input_path: &Path, output_dir: &Path) -> PathBuf {
    let mut name = input_path
        .file_stem()
        .unwrap_or_else(|| input_path.as_os_str())
        .to_os_string();
    // Not `with_extension`: a stem like "q3.report" must stay intact.
    name.push(".pdf");
    output_dir.join(name)
}

/// Read an optional child pipe to the end, lossily decoded.
async fn slurp<R: AsyncRead + Unpin>(pipe: Option<R>) -> String {
    let Some(mut pipe) = pipe else {
        return String::new();
    };
    let mut buf = Vec::new();
    if pipe.read_to_end(&mut buf).await.is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buf).into_owned()
}
