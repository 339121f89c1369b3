// src/error.rs
use serde::Serialize;
use thiserror::Error;

use crate::validation::ValidationError;

/// Body printed when a run fails.
#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub failed: bool,
    pub msg: String,
    pub error: &'static str,
    /// True when some mutation was applied before the failure.
    pub changed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applied: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ZoneError {
    #[error("invalid zone request: {0}")]
    Validation(#[from] ValidationError),

    #[error("zone {0} does not exist")]
    NotFound(String),

    #[error("{reason}")]
    NotEligible { zone: String, reason: String },

    #[error("zone {zone} has serial {actual}, expected {expected}")]
    PreconditionFailed {
        zone: String,
        expected: u32,
        actual: u32,
    },

    #[error("PowerDNS API error: {0:#}")]
    Transport(#[source] anyhow::Error),

    #[error("{mutation} failed: {source:#}")]
    Mutation {
        mutation: String,
        applied: Vec<String>,
        #[source]
        source: anyhow::Error,
    },
}

impl ZoneError {
    pub fn not_eligible(zone: impl Into<String>, reason: impl Into<String>) -> Self {
        ZoneError::NotEligible {
            zone: zone.into(),
            reason: reason.into(),
        }
    }

    /// Whether the remote side was modified before this error surfaced.
    pub fn changed(&self) -> bool {
        matches!(self, ZoneError::Mutation { applied, .. } if !applied.is_empty())
    }

    /// Stable tag for machine consumers.
    pub fn kind(&self) -> &'static str {
        match self {
            ZoneError::Validation(_) => "validation",
            ZoneError::NotFound(_) => "not_found",
            ZoneError::NotEligible { .. } => "not_eligible",
            ZoneError::PreconditionFailed { .. } => "precondition_failed",
            ZoneError::Transport(_) => "transport",
            ZoneError::Mutation { .. } => "mutation",
        }
    }

    pub fn to_report(&self) -> FailureReport {
        let applied = match self {
            ZoneError::Mutation { applied, .. } => applied.clone(),
            _ => Vec::new(),
        };
        FailureReport {
            failed: true,
            msg: self.to_string(),
            error: self.kind(),
            changed: self.changed(),
            applied,
        }
    }
}
