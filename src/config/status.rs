//! Outcome-to-status table. Handlers never hard-code status codes; they look them up here.

use crate::error::ConfigError;
use crate::model::OutcomeKind;
use axum::http::StatusCode;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct StatusTable {
    codes: HashMap<OutcomeKind, StatusCode>,
}

impl Default for StatusTable {
    fn default() -> Self {
        let codes = OutcomeKind::ALL
            .iter()
            .map(|k| {
                let code = match k {
                    OutcomeKind::Success => StatusCode::OK,
                    OutcomeKind::Created => StatusCode::CREATED,
                    OutcomeKind::DecodeError
                    | OutcomeKind::ValidationError
                    | OutcomeKind::IdentityMismatch
                    | OutcomeKind::BadRequest => StatusCode::BAD_REQUEST,
                    OutcomeKind::NotFound => StatusCode::NOT_FOUND,
                    OutcomeKind::Conflict => StatusCode::CONFLICT,
                    OutcomeKind::Error => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (*k, code)
            })
            .collect();
        StatusTable { codes }
    }
}

impl StatusTable {
    /// Copy of this table with `overrides` applied. Codes must be valid HTTP statuses.
    pub fn with_overrides(&self, overrides: &HashMap<OutcomeKind, u16>) -> Result<Self, ConfigError> {
        let mut codes = self.codes.clone();
        for (kind, code) in overrides {
            let status = StatusCode::from_u16(*code)
                .map_err(|_| ConfigError::Validation(format!("invalid status {} for {}", code, kind.code())))?;
            codes.insert(*kind, status);
        }
        Ok(StatusTable { codes })
    }

    pub fn status(&self, kind: OutcomeKind) -> StatusCode {
        self.codes
            .get(&kind)
            .copied()
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let t = StatusTable::default();
        assert_eq!(t.status(OutcomeKind::Created), StatusCode::CREATED);
        assert_eq!(t.status(OutcomeKind::IdentityMismatch), StatusCode::BAD_REQUEST);
        assert_eq!(t.status(OutcomeKind::Conflict), StatusCode::CONFLICT);
        assert_eq!(t.status(OutcomeKind::Error), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn overrides_replace_single_entries() {
        let overrides = HashMap::from([(OutcomeKind::Conflict, 422)]);
        let t = StatusTable::default().with_overrides(&overrides).unwrap();
        assert_eq!(t.status(OutcomeKind::Conflict), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(t.status(OutcomeKind::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn rejects_invalid_codes() {
        let overrides = HashMap::from([(OutcomeKind::Success, 42)]);
        assert!(StatusTable::default().with_overrides(&overrides).is_err());
    }
}
