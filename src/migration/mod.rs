mod executions;
mod extract;
mod model;
mod test_cases;
#[cfg(test)]
pub(crate) mod test_support;

use chrono::Utc;
use log::{info, warn};

use crate::config::{ProjectSettings, Settings};
use crate::error::Result;
use crate::error_log::ErrorLog;
use crate::output::PhaseProgress;
use crate::providers::{XrayClient, ZephyrClient};
use crate::report::MigrationReport;

pub use executions::ExecutionOutcome;
pub use extract::Extraction;
pub use model::IdentifierMap;
pub use test_cases::TestCaseOutcome;

/// One XRAY → Zephyr Scale migration run.
///
/// Stages run strictly in order and hand their results to the next:
/// 1. count the project's tests
/// 2. page through them
/// 3. create test cases and push their steps, producing the identifier map
/// 4. recreate test plans as test cycles with executions
pub struct Migration {
    xray: XrayClient,
    zephyr: ZephyrClient,
    project: ProjectSettings,
    page_size: usize,
    error_log: ErrorLog,
}

impl Migration {
    /// Build the API clients and truncate the error log.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured URL is invalid or the error log cannot
    /// be written.
    pub fn new(settings: &Settings) -> Result<Self> {
        let xray = XrayClient::new(settings)?;
        let zephyr = ZephyrClient::new(
            &settings.zephyr_base_url,
            settings.scale_bearer_token.clone(),
        )?;
        let error_log = ErrorLog::create(&settings.error_log)?;

        Ok(Self {
            xray,
            zephyr,
            project: settings.project.clone(),
            page_size: settings.page_size,
            error_log,
        })
    }

    /// Run all four stages once.
    ///
    /// Only the test count is fatal; every later failure is recorded in the
    /// error log and counted in the returned report.
    ///
    /// # Errors
    ///
    /// Returns an error if the source test count cannot be determined or the
    /// error log cannot be written.
    pub async fn run(mut self) -> Result<MigrationReport> {
        let started_at = Utc::now();
        info!(
            "Starting migration of project {} into {}",
            self.project.name, self.project.key
        );

        let progress = PhaseProgress::start("Counting source tests");
        let total = match self.count_source_tests().await {
            Ok(total) => total,
            Err(err) => {
                progress.fail("Could not count source tests");
                return Err(err);
            }
        };

        let progress = progress.advance(
            &format!("Found {total} source tests"),
            "Extracting tests from XRAY",
        );
        let extraction = self.extract_tests(total).await?;
        if extraction.aborted {
            warn!("Extraction stopped early; migrating the tests fetched so far");
        }

        let progress = progress.advance(
            &format!("Extracted {} tests", extraction.tests.len()),
            "Creating test cases and steps",
        );
        let test_cases = self.migrate_test_cases(&extraction.tests).await?;
        info!(
            "Identifier map holds {} source tests",
            test_cases.identifiers.len()
        );

        let progress = progress.advance(
            &format!("Created {} test cases", test_cases.created),
            "Creating test cycles and executions",
        );
        let executions = self.migrate_executions(&test_cases.identifiers).await?;

        progress.finish(&format!(
            "Created {} test cycles and {} executions",
            executions.cycles_created, executions.executions_created
        ));

        if self.error_log.entries() > 0 {
            warn!(
                "{} failures recorded - review {}",
                self.error_log.entries(),
                self.error_log.path().display()
            );
        }

        Ok(MigrationReport::new(
            &self.project,
            started_at,
            total,
            &extraction,
            test_cases,
            &executions,
            &self.error_log,
        ))
    }
}
