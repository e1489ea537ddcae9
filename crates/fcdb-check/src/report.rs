//! JSON alert report written by `analyze`.

use chrono::{DateTime, Utc};
use fcdb_core::{AlertCode, ExitStatus, Project, Severity};
use serde::{Deserialize, Serialize};

/// One alert with the entity it is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub entity: String,
    pub kind: String,
    pub code: AlertCode,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p0: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p1: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertReport {
    pub project: String,
    pub generated: DateTime<Utc>,
    pub exit_status: ExitStatus,
    pub exit_code: u8,
    pub status_message: String,
    pub errors: usize,
    pub warnings: usize,
    pub alerts: Vec<ReportEntry>,
}

impl AlertReport {
    pub fn from_project(project: &Project) -> Self {
        let alerts: Vec<ReportEntry> = project
            .all_alerts()
            .into_iter()
            .map(|(id, alert)| ReportEntry {
                entity: id.to_string(),
                kind: id.kind().to_string(),
                code: alert.code,
                severity: alert.severity,
                message: alert.message.clone(),
                key: alert.key.clone(),
                p0: alert.p0.clone(),
                p1: alert.p1.clone(),
            })
            .collect();
        let status = project.exit_status();
        Self {
            project: project.name().to_string(),
            generated: Utc::now(),
            exit_status: status,
            exit_code: status.code(),
            status_message: status.message().to_string(),
            errors: alerts.iter().filter(|a| a.severity == Severity::Error).count(),
            warnings: alerts.iter().filter(|a| a.severity == Severity::Warn).count(),
            alerts,
        }
    }
}
