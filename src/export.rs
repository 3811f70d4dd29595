//! Report document writers
//!
//! Renders a computed audit report as a human-readable text document and as
//! the equivalent JSON document, both under a configurable directory with
//! timestamped filenames. Write failures never invalidate the in-memory
//! report; the caller decides how to surface them.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::engine::report::{AuditReport, BaselineSummary};

/// Paths of the two documents written for one report.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPaths {
    pub text: PathBuf,
    pub json: PathBuf,
}

/// Write both document forms for a report.
pub fn write_report_documents(report: &AuditReport, dir: &Path) -> std::io::Result<DocumentPaths> {
    std::fs::create_dir_all(dir)?;

    let stamp = report.generated_at.format("%Y%m%dT%H%M%SZ");
    let text_path = dir.join(format!("audit_{}_{}.txt", stamp, report.report_id));
    let json_path = dir.join(format!("audit_{}_{}.json", stamp, report.report_id));

    let mut text_file = std::fs::File::create(&text_path)?;
    text_file.write_all(render_text(report).as_bytes())?;

    let mut json_file = std::fs::File::create(&json_path)?;
    json_file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

    Ok(DocumentPaths {
        text: text_path,
        json: json_path,
    })
}

/// Human-readable rendering: header, baseline summary, one block per item.
fn render_text(report: &AuditReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "STRUCTURAL AUDIT REPORT");
    let _ = writeln!(out, "version: {}", report.version);
    let _ = writeln!(out, "report id: {}", report.report_id);
    let _ = writeln!(out, "generated: {}", report.generated_at.to_rfc3339());
    let _ = writeln!(out, "sensitivity: {}", report.sensitivity);
    if let Some(t) = report.annotation_threshold {
        let _ = writeln!(out, "annotation threshold: {}", t);
    }

    match &report.baseline {
        BaselineSummary::Empirical(b) => {
            let _ = writeln!(
                out,
                "baseline: empirical mean={:.6} stdev={:.6} min={:.6} max={:.6} n={}",
                b.mean, b.stdev, b.min, b.max, b.sample_count
            );
        }
        BaselineSummary::Calibrated {
            bit_length_floor,
            deviation_coefficient,
        } => {
            let _ = writeln!(
                out,
                "baseline: calibrated bit-length floor={} deviation coefficient={}",
                bit_length_floor, deviation_coefficient
            );
        }
    }

    let _ = writeln!(out);
    for (index, item) in report.results.iter().enumerate() {
        let _ = writeln!(out, "[{}] number: {}", index + 1, item.number);
        let _ = writeln!(out, "    bit length: {}", item.bit_length);
        match (item.trace, item.score) {
            (Some(trace), Some(score)) => {
                let _ = writeln!(out, "    trace: {:.6}", trace);
                let _ = writeln!(out, "    score: {:.6}", score);
            }
            _ => {
                let _ = writeln!(out, "    rejected: {}", item.reasons.join(", "));
            }
        }
        let _ = writeln!(out, "    label: {}", item.label.as_str());
        let _ = writeln!(out, "    {}", item.summary);
        let _ = writeln!(out);
    }

    out
}
