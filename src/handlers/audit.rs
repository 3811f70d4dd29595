//! Audit handlers
//!
//! Thin transport over the audit engine: request validation, integer
//! parsing, and report-document persistence. All semantics live in the
//! engine.

use axum::{extract::State, Json};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::engine::report::{AuditOptions, AuditReport};
use crate::engine::Computation;
use crate::export::{self, DocumentPaths};
use crate::{AppError, AppResult, AppState};

/// JSON numbers cannot carry arbitrary precision, so integers are accepted
/// either as plain numbers or as decimal strings. Serialize is required by
/// the length validator, which echoes the offending value into error params.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Int(u64),
    Text(String),
}

impl NumberInput {
    fn to_biguint(&self) -> Result<BigUint, AppError> {
        match self {
            NumberInput::Int(v) => Ok(BigUint::from(*v)),
            NumberInput::Text(s) => BigUint::parse_bytes(s.trim().as_bytes(), 10).ok_or_else(|| {
                AppError::ValidationError(format!("'{}' is not a positive integer", s))
            }),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AuditRequest {
    #[validate(length(min = 1, max = 10, message = "batch must hold 1 to 10 integers"))]
    pub numbers: Vec<NumberInput>,

    #[validate(range(min = 0.1, max = 5.0))]
    pub sensitivity: Option<f64>,

    /// Echoed into the report; does not change classification.
    pub threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ComputeRequest {
    pub number: NumberInput,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub report: AuditReport,
    pub document: Option<DocumentPaths>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Single-integer diagnostic evaluation
pub async fn compute(
    State(state): State<AppState>,
    Json(req): Json<ComputeRequest>,
) -> AppResult<Json<Computation>> {
    let n = req.number.to_biguint()?;
    let computation = state.engine.compute(&n)?;
    Ok(Json(computation))
}

/// Batch audit
pub async fn run(
    State(state): State<AppState>,
    Json(req): Json<AuditRequest>,
) -> AppResult<Json<AuditReport>> {
    let report = run_audit(&state, req)?;
    Ok(Json(report))
}

/// Batch audit plus on-disk report documents. A write failure is logged and
/// surfaced as a warning; the computed report is returned either way.
pub async fn document(
    State(state): State<AppState>,
    Json(req): Json<AuditRequest>,
) -> AppResult<Json<DocumentResponse>> {
    let report = run_audit(&state, req)?;

    let (document, warning) = match export::write_report_documents(&report, &state.config.report_dir)
    {
        Ok(paths) => {
            tracing::info!("Report {} written to {}", report.report_id, paths.text.display());
            (Some(paths), None)
        }
        Err(e) => {
            tracing::error!("Failed to persist report {}: {}", report.report_id, e);
            (None, Some(format!("report document could not be written: {}", e)))
        }
    };

    Ok(Json(DocumentResponse {
        report,
        document,
        warning,
    }))
}

fn run_audit(state: &AppState, req: AuditRequest) -> Result<AuditReport, AppError> {
    req.validate()?;

    let numbers = req
        .numbers
        .iter()
        .map(|n| n.to_biguint())
        .collect::<Result<Vec<_>, _>>()?;

    let options = AuditOptions {
        sensitivity: req.sensitivity.unwrap_or(1.0),
        annotation_threshold: req.threshold,
    };

    let report = state.engine.audit(&numbers, &options)?;
    tracing::info!(
        "Audited {} integers, report {}",
        report.results.len(),
        report.report_id
    );
    Ok(report)
}
