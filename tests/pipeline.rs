//! Integration tests for the conversion pipeline.
//!
//! The real LibreOffice is too heavy and too slow for CI, so these tests use
//! small shell-script stand-ins that accept the exact soffice invocation
//! shape (`--headless --nologo --nofirststartwindow --convert-to pdf
//! --outdir <dir> <input>`) and exercise each outcome branch: success,
//! non-zero exit, silent zero exit, a stall that must be killed, and an
//! absent binary.

#![cfg(unix)]

use office2pdf::{convert, handle_document, ConvertConfig, ConvertError, Outcome};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// ── Stand-in converters ──────────────────────────────────────────────────

/// Write an executable `/bin/sh` script and return its path.
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Stand-in that behaves like a healthy soffice: writes `<stem>.pdf` into the
/// `--outdir` argument and exits zero.
fn ok_converter(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "soffice-ok",
        r#"outdir="$7"
input="$8"
base=$(basename "$input")
stem="${base%.*}"
printf '%%PDF-1.4 stub' > "$outdir/$stem.pdf"
exit 0"#,
    )
}

fn config_with(bin: &Path, timeout_secs: u64) -> ConvertConfig {
    ConvertConfig::builder()
        .converter_bin(bin)
        .timeout_secs(timeout_secs)
        .build()
        .unwrap()
}

fn stage_input(dir: &Path, name: &str) -> PathBuf {
    let input = dir.join(name);
    std::fs::write(&input, b"not a real office document").unwrap();
    input
}

// ── Success ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn convert_produces_pdf_with_matching_base_name() {
    let tools = tempfile::tempdir().unwrap();
    let config = config_with(&ok_converter(tools.path()), 10);

    for name in ["report.docx", "slides.pptx"] {
        let ws = tempfile::tempdir().unwrap();
        let input = stage_input(ws.path(), name);

        let pdf = convert(&input, ws.path(), &config).await.unwrap();
        assert_eq!(pdf.extension().and_then(|e| e.to_str()), Some("pdf"));
        assert_eq!(
            pdf.file_stem(),
            input.file_stem(),
            "output base name must match the input's"
        );
        assert!(pdf.exists());
        assert_eq!(pdf.parent(), Some(ws.path()));
    }
}

#[tokio::test]
async fn convert_is_idempotent_across_fresh_workspaces() {
    let tools = tempfile::tempdir().unwrap();
    let config = config_with(&ok_converter(tools.path()), 10);

    let mut produced = Vec::new();
    let mut workspaces = Vec::new();
    for _ in 0..2 {
        let ws = tempfile::tempdir().unwrap();
        let input = stage_input(ws.path(), "sample.docx");
        let pdf = convert(&input, ws.path(), &config).await.unwrap();
        assert!(pdf.exists());
        produced.push(pdf);
        workspaces.push(ws);
    }

    // Same relative naming, distinct directories, no cross-contamination.
    assert_eq!(produced[0].file_name(), produced[1].file_name());
    assert_ne!(produced[0], produced[1]);
    for pdf in &produced {
        let siblings: Vec<_> = std::fs::read_dir(pdf.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(siblings.len(), 2, "only input + output expected: {siblings:?}");
    }
}

// ── Failure classification ───────────────────────────────────────────────

#[tokio::test]
async fn nonzero_exit_surfaces_stderr_detail() {
    let tools = tempfile::tempdir().unwrap();
    let bin = write_script(
        tools.path(),
        "soffice-fail",
        r#"echo "source file could not be loaded" >&2
exit 1"#,
    );
    let config = config_with(&bin, 10);

    let ws = tempfile::tempdir().unwrap();
    let input = stage_input(ws.path(), "broken.docx");
    let err = convert(&input, ws.path(), &config).await.unwrap_err();
    match err {
        ConvertError::ConversionFailed { detail } => {
            assert!(detail.contains("could not be loaded"), "got: {detail}")
        }
        other => panic!("expected ConversionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn nonzero_exit_falls_back_to_stdout_when_stderr_is_empty() {
    let tools = tempfile::tempdir().unwrap();
    let bin = write_script(
        tools.path(),
        "soffice-fail-stdout",
        r#"echo "loader error reported on stdout"
exit 3"#,
    );
    let config = config_with(&bin, 10);

    let ws = tempfile::tempdir().unwrap();
    let input = stage_input(ws.path(), "broken.pptx");
    let err = convert(&input, ws.path(), &config).await.unwrap_err();
    match err {
        ConvertError::ConversionFailed { detail } => {
            assert!(detail.contains("stdout"), "got: {detail}")
        }
        other => panic!("expected ConversionFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn zero_exit_without_output_is_output_missing() {
    let tools = tempfile::tempdir().unwrap();
    let bin = write_script(tools.path(), "soffice-silent", "exit 0");
    let config = config_with(&bin, 10);

    let ws = tempfile::tempdir().unwrap();
    let input = stage_input(ws.path(), "ghost.docx");
    let err = convert(&input, ws.path(), &config).await.unwrap_err();
    match err {
        ConvertError::OutputMissing { expected } => {
            assert_eq!(expected, ws.path().join("ghost.pdf"))
        }
        other => panic!("expected OutputMissing, got {other:?}"),
    }
}

#[tokio::test]
async fn absent_binary_is_tool_missing_regardless_of_input() {
    let config = config_with(Path::new("/definitely/not/installed/soffice"), 10);
    for name in ["a.docx", "b.pptx"] {
        let ws = tempfile::tempdir().unwrap();
        let input = stage_input(ws.path(), name);
        let err = convert(&input, ws.path(), &config).await.unwrap_err();
        assert!(matches!(err, ConvertError::ToolMissing));
    }
}

// ── Timeout ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn stalled_converter_times_out_and_is_terminated() {
    let tools = tempfile::tempdir().unwrap();
    // Writes its own PID into the outdir, then becomes a long sleep via exec
    // so the recorded PID is the process the engine must kill.
    let bin = write_script(
        tools.path(),
        "soffice-stall",
        r#"echo $$ > "$7/stall.pid"
exec sleep 30"#,
    );
    let config = config_with(&bin, 1);

    let ws = tempfile::tempdir().unwrap();
    let input = stage_input(ws.path(), "huge.docx");

    let started = Instant::now();
    let err = convert(&input, ws.path(), &config).await.unwrap_err();
    assert!(matches!(err, ConvertError::Timeout { secs: 1 }));
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "timeout must fire well before the stall finishes"
    );

    let pid: i32 = std::fs::read_to_string(ws.path().join("stall.pid"))
        .unwrap()
        .trim()
        .parse()
        .unwrap();

    // The engine kills and reaps the child, so its /proc entry must vanish.
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        if !Path::new(&format!("/proc/{pid}")).exists() {
            break;
        }
        assert!(
            Instant::now() < deadline,
            "stalled converter (pid {pid}) still alive after timeout"
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

// ── Handler + workspace lifecycle ────────────────────────────────────────

#[tokio::test]
async fn handler_success_keeps_pdf_until_outcome_is_dropped() {
    let tools = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let config = ConvertConfig::builder()
        .converter_bin(ok_converter(tools.path()))
        .timeout_secs(10)
        .scratch_root(scratch.path())
        .build()
        .unwrap();

    let outcome = handle_document(b"bytes", "minutes.docx", &config).await;
    let pdf_path = match outcome {
        Outcome::Document {
            ref path,
            ref caption,
            ..
        } => {
            assert!(path.exists(), "PDF must survive while the outcome lives");
            assert!(!caption.is_empty());
            path.clone()
        }
        Outcome::Text(msg) => panic!("expected a document, got: {msg}"),
    };

    drop(outcome);
    assert!(!pdf_path.exists(), "drop must dispose the workspace");
    assert_eq!(
        std::fs::read_dir(scratch.path()).unwrap().count(),
        0,
        "scratch root must be empty after the request"
    );
}

#[tokio::test]
async fn handler_disposes_workspace_on_every_failure_branch() {
    let tools = tempfile::tempdir().unwrap();
    let fail = write_script(tools.path(), "soffice-fail", "echo boom >&2\nexit 1");
    let silent = write_script(tools.path(), "soffice-silent", "exit 0");
    let missing = PathBuf::from("/definitely/not/installed/soffice");
    let stall = write_script(tools.path(), "soffice-stall", "exec sleep 30");

    for bin in [fail, silent, missing, stall] {
        let scratch = tempfile::tempdir().unwrap();
        let config = ConvertConfig::builder()
            .converter_bin(&bin)
            .timeout_secs(1)
            .scratch_root(scratch.path())
            .build()
            .unwrap();

        let outcome = handle_document(b"bytes", "doc.docx", &config).await;
        assert!(
            matches!(outcome, Outcome::Text(_)),
            "branch {bin:?} must yield an error message"
        );
        assert_eq!(
            std::fs::read_dir(scratch.path()).unwrap().count(),
            0,
            "branch {bin:?} must dispose its workspace"
        );
    }
}

#[tokio::test]
async fn handler_rejects_unsupported_extension_without_invoking_converter() {
    let tools = tempfile::tempdir().unwrap();
    let marker = tools.path().join("invoked.marker");
    let bin = write_script(
        tools.path(),
        "soffice-marker",
        &format!("touch '{}'\nexit 0", marker.display()),
    );
    let config = config_with(&bin, 10);

    for name in ["data.xlsx", "photo.jpg", "notes.txt", "archive.docx.zip"] {
        let outcome = handle_document(b"bytes", name, &config).await;
        match outcome {
            Outcome::Text(msg) => {
                let ext = format!(".{}", name.rsplit('.').next().unwrap());
                assert!(msg.contains(&ext), "message must name {ext}: {msg}");
            }
            other => panic!("expected rejection for {name}, got {other:?}"),
        }
    }
    assert!(
        !marker.exists(),
        "the converter must never run for rejected files"
    );
}

#[tokio::test]
async fn handler_strips_path_components_from_file_names() {
    let tools = tempfile::tempdir().unwrap();
    let config = config_with(&ok_converter(tools.path()), 10);

    let outcome = handle_document(b"bytes", "../../etc/evil.docx", &config).await;
    match outcome {
        Outcome::Document { path, .. } => {
            assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("evil.pdf"));
        }
        Outcome::Text(msg) => panic!("expected success, got: {msg}"),
    }
}
