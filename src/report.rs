use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ProjectSettings;
use crate::error_log::ErrorLog;
use crate::migration::{ExecutionOutcome, Extraction, IdentifierMap, TestCaseOutcome};

#[derive(Debug, Serialize)]
pub struct MigrationReport {
    pub project: String,
    pub project_key: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source_total: u64,
    pub extracted: usize,
    pub extraction_aborted: bool,
    pub test_cases: TestCaseCounts,
    pub steps: StepCounts,
    pub executions: ExecutionCounts,
    pub error_log: String,
    pub error_log_entries: usize,
    pub identifiers: IdentifierMap,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestCaseCounts {
    pub created: usize,
    pub duplicates: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepCounts {
    pub pushed: usize,
    pub without_steps: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionCounts {
    pub plans: usize,
    pub plans_query_failed: bool,
    pub cycles_created: usize,
    pub cycles_failed: usize,
    pub created: usize,
    pub failed: usize,
    pub unresolved: usize,
}

impl MigrationReport {
    pub(crate) fn new(
        project: &ProjectSettings,
        started_at: DateTime<Utc>,
        source_total: u64,
        extraction: &Extraction,
        test_cases: TestCaseOutcome,
        executions: &ExecutionOutcome,
        error_log: &ErrorLog,
    ) -> Self {
        Self {
            project: project.name.clone(),
            project_key: project.key.clone(),
            started_at,
            finished_at: Utc::now(),
            source_total,
            extracted: extraction.tests.len(),
            extraction_aborted: extraction.aborted,
            test_cases: TestCaseCounts {
                created: test_cases.created,
                duplicates: test_cases.duplicates,
                failed: test_cases.failed,
            },
            steps: StepCounts {
                pushed: test_cases.steps_pushed,
                without_steps: test_cases.steps_benign,
                failed: test_cases.steps_failed,
            },
            executions: ExecutionCounts {
                plans: executions.plans,
                plans_query_failed: executions.plans_query_failed,
                cycles_created: executions.cycles_created,
                cycles_failed: executions.cycles_failed,
                created: executions.executions_created,
                failed: executions.executions_failed,
                unresolved: executions.unresolved,
            },
            error_log: error_log.path().display().to_string(),
            error_log_entries: error_log.entries(),
            identifiers: test_cases.identifiers,
        }
    }

    /// Total number of failures across all stages.
    pub fn failures(&self) -> usize {
        self.test_cases.failed
            + self.steps.failed
            + self.executions.cycles_failed
            + self.executions.failed
            + usize::from(self.extraction_aborted)
            + usize::from(self.executions.plans_query_failed)
    }
}
