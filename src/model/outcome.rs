//! Write outcomes and the outcome kinds they map to in the status table.

use crate::error::ErrorMessage;
use serde::{Deserialize, Serialize};

/// Result of a mutating repository call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Number of rows written.
    Applied(u64),
    NotFound,
    /// Unique-constraint violation reported by the store.
    Conflict,
    /// Rejected by a business rule before reaching the store.
    Invalid(Vec<ErrorMessage>),
}

impl WriteOutcome {
    pub fn from_rows(rows: u64) -> Self {
        if rows == 0 {
            WriteOutcome::NotFound
        } else {
            WriteOutcome::Applied(rows)
        }
    }
}

/// Keys of the status table. Every terminal response resolves to exactly one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Created,
    DecodeError,
    ValidationError,
    IdentityMismatch,
    BadRequest,
    NotFound,
    Conflict,
    Error,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 9] = [
        OutcomeKind::Success,
        OutcomeKind::Created,
        OutcomeKind::DecodeError,
        OutcomeKind::ValidationError,
        OutcomeKind::IdentityMismatch,
        OutcomeKind::BadRequest,
        OutcomeKind::NotFound,
        OutcomeKind::Conflict,
        OutcomeKind::Error,
    ];

    /// Stable discriminator used in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Created => "created",
            OutcomeKind::DecodeError => "decode_error",
            OutcomeKind::ValidationError => "validation_error",
            OutcomeKind::IdentityMismatch => "identity_mismatch",
            OutcomeKind::BadRequest => "bad_request",
            OutcomeKind::NotFound => "not_found",
            OutcomeKind::Conflict => "conflict",
            OutcomeKind::Error => "internal_error",
        }
    }
}
