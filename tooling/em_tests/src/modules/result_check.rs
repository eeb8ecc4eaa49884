use std::fmt;

use bytes::Bytes;
use ovmrex_common::utils::encode_hex;
use ovmrex_em::{
    call_frame::CallFrame,
    errors::{ExecutionOutcome, Status},
};

/// First difference between an expected step tree and what the engine did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Operation kinds from the root to the offending node, e.g. `ovmCALL[0] > ovmSLOAD[0]`.
    pub path: String,
    pub kind: MismatchKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MismatchKind {
    Status { expected: bool, actual: Status },
    Value { expected: Bytes, actual: Bytes },
    Operation { expected: String, actual: String },
    NotExecuted,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MismatchKind::Status { expected, actual } => {
                let actual = match actual {
                    Status::Succeeded => "succeeded".to_string(),
                    Status::Reverted(reason) => format!("reverted ({reason})"),
                };
                let expected = if *expected { "success" } else { "revert" };
                write!(f, "{}: expected {expected}, but the step {actual}", self.path)
            }
            MismatchKind::Value { expected, actual } => write!(
                f,
                "{}: expected return value {}, got {}",
                self.path,
                encode_hex(expected),
                encode_hex(actual)
            ),
            MismatchKind::Operation { expected, actual } => write!(
                f,
                "{}: expected {expected} to run, but {actual} ran",
                self.path
            ),
            MismatchKind::NotExecuted => write!(f, "{}: step was never executed", self.path),
        }
    }
}

/// Walks `expected` and `outcome` in lockstep and returns the first mismatch
/// of a depth-first walk.
pub fn check_outcome(
    expected: &CallFrame,
    outcome: &ExecutionOutcome,
    index: usize,
    parent_path: Option<&str>,
) -> Result<(), Mismatch> {
    let label = format!("{}[{index}]", expected.kind());
    let path = match parent_path {
        Some(parent) => format!("{parent} > {label}"),
        None => label,
    };

    if outcome.kind != expected.kind() {
        return Err(Mismatch {
            path,
            kind: MismatchKind::Operation {
                expected: expected.kind().to_string(),
                actual: outcome.kind.to_string(),
            },
        });
    }

    if let Some(expectation) = &expected.expected {
        if expectation.status != outcome.is_success() {
            return Err(Mismatch {
                path,
                kind: MismatchKind::Status {
                    expected: expectation.status,
                    actual: outcome.status.clone(),
                },
            });
        }
        if let Some(value) = &expectation.value {
            if *value != outcome.value {
                return Err(Mismatch {
                    path,
                    kind: MismatchKind::Value {
                        expected: value.clone(),
                        actual: outcome.value.clone(),
                    },
                });
            }
        }
    }

    for (child_index, child) in expected.sub_steps.iter().enumerate() {
        match outcome.children.get(child_index) {
            Some(child_outcome) => {
                check_outcome(child, child_outcome, child_index, Some(&path))?
            }
            None => {
                return Err(Mismatch {
                    path: format!("{path} > {}[{child_index}]", child.kind()),
                    kind: MismatchKind::NotExecuted,
                });
            }
        }
    }
    Ok(())
}
