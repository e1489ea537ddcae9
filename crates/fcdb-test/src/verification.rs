//! Verification helpers for analyzed projects
//!
//! Provides assertion helpers over the alerts attached to entities and the
//! project exit status.

use fcdb_core::{AlertCode, AlertRecord, Entity, EntityRef, ExitStatus, Project};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Entity '{entity}' not found")]
    EntityNotFound { entity: String },

    #[error("Expected {code} on '{entity}', found [{found}]")]
    AlertMissing {
        entity: String,
        code: AlertCode,
        found: String,
    },

    #[error("Unexpected {code} on '{entity}'")]
    UnexpectedAlert { entity: String, code: AlertCode },

    #[error("Expected {expected} {code} alerts on '{entity}', found {actual}")]
    AlertCountMismatch {
        entity: String,
        code: AlertCode,
        expected: usize,
        actual: usize,
    },

    #[error("Expected exit status {expected:?}, got {actual:?}")]
    StatusMismatch {
        expected: ExitStatus,
        actual: ExitStatus,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Alert verification helper
pub struct AlertVerifier<'a> {
    project: &'a Project,
}

impl<'a> AlertVerifier<'a> {
    pub fn new(project: &'a Project) -> Self {
        Self { project }
    }

    /// Alerts attached to `id`.
    pub fn alerts(&self, id: &EntityRef) -> VerifyResult<&'a [AlertRecord]> {
        self.project
            .entity(id)
            .map(|e| e.alerts())
            .ok_or_else(|| VerificationError::EntityNotFound {
                entity: id.to_string(),
            })
    }

    /// Alerts of `code` attached to `id`.
    pub fn alerts_with_code(
        &self,
        id: &EntityRef,
        code: AlertCode,
    ) -> VerifyResult<Vec<&'a AlertRecord>> {
        Ok(self.alerts(id)?.iter().filter(|a| a.code == code).collect())
    }

    /// Verify that `id` carries at least one `code` alert
    pub fn assert_alert(&self, id: &EntityRef, code: AlertCode) -> VerifyResult<&'a AlertRecord> {
        let alerts = self.alerts(id)?;
        alerts
            .iter()
            .find(|a| a.code == code)
            .ok_or_else(|| VerificationError::AlertMissing {
                entity: id.to_string(),
                code,
                found: alerts
                    .iter()
                    .map(|a| a.code.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Verify that `id` carries a `code` alert about `member`
    pub fn assert_member_alert(
        &self,
        id: &EntityRef,
        code: AlertCode,
        member: &str,
    ) -> VerifyResult<&'a AlertRecord> {
        let alerts = self.alerts(id)?;
        alerts
            .iter()
            .find(|a| a.code == code && a.member() == Some(member))
            .ok_or_else(|| VerificationError::AlertMissing {
                entity: id.to_string(),
                code,
                found: alerts
                    .iter()
                    .map(|a| format!("{}({})", a.code, a.member().unwrap_or("")))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Verify that `id` carries no `code` alert
    pub fn assert_no_alert(&self, id: &EntityRef, code: AlertCode) -> VerifyResult<()> {
        if self.alerts(id)?.iter().any(|a| a.code == code) {
            return Err(VerificationError::UnexpectedAlert {
                entity: id.to_string(),
                code,
            });
        }
        Ok(())
    }

    /// Verify the number of `code` alerts on `id`
    pub fn assert_alert_count(
        &self,
        id: &EntityRef,
        code: AlertCode,
        expected: usize,
    ) -> VerifyResult<()> {
        let actual = self.alerts_with_code(id, code)?.len();
        if actual != expected {
            return Err(VerificationError::AlertCountMismatch {
                entity: id.to_string(),
                code,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Number of `code` alerts anywhere in the project.
    pub fn count_in_project(&self, code: AlertCode) -> usize {
        self.project
            .all_alerts()
            .iter()
            .filter(|(_, a)| a.code == code)
            .count()
    }

    /// Verify the project exit status
    pub fn assert_status(&self, expected: ExitStatus) -> VerifyResult<()> {
        let actual = self.project.exit_status();
        if actual != expected {
            return Err(VerificationError::StatusMismatch { expected, actual });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{empty_project, wwns::FABRIC_A};
    use fcdb_core::AlertParams;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_alert_lists_found_codes() {
        let mut project = empty_project("verify");
        project.add_fabric(FABRIC_A).add_zone("z");
        let zone = EntityRef::zone(FABRIC_A, "z");
        project
            .add_alert(&zone, AlertCode::ZoneOneMember, AlertParams::new())
            .unwrap();

        let verifier = AlertVerifier::new(&project);
        assert!(verifier.assert_alert(&zone, AlertCode::ZoneOneMember).is_ok());
        let err = verifier
            .assert_alert(&zone, AlertCode::ZoneNoMembers)
            .unwrap_err();
        assert_eq!(
            err,
            VerificationError::AlertMissing {
                entity: zone.to_string(),
                code: AlertCode::ZoneNoMembers,
                found: "ZONE_ONE_MEMBER".to_string(),
            }
        );
        assert!(verifier.assert_alert_count(&zone, AlertCode::ZoneOneMember, 1).is_ok());
        assert!(verifier.assert_status(ExitStatus::Ok).is_ok());
    }

    #[test]
    fn test_unknown_entity() {
        let project = empty_project("verify");
        let verifier = AlertVerifier::new(&project);
        assert!(matches!(
            verifier.alerts(&EntityRef::zone(FABRIC_A, "z")),
            Err(VerificationError::EntityNotFound { .. })
        ));
    }
}
