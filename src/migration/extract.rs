use log::{info, warn};

use super::model::SourceTest;
use super::Migration;
use crate::error::Result;

/// Tests read from XRAY, and whether paging stopped early.
#[derive(Debug, Default)]
pub struct Extraction {
    pub tests: Vec<SourceTest>,
    pub aborted: bool,
}

impl Migration {
    /// Count the project's tests.
    ///
    /// A failure here is fatal: without a total there is no bound for paging.
    /// It is written to the error log before being returned.
    pub(super) async fn count_source_tests(&mut self) -> Result<u64> {
        match self.xray.count_tests(&self.project.name).await {
            Ok(total) => {
                info!("Project {} has {total} tests", self.project.name);
                Ok(total)
            }
            Err(err) => {
                self.error_log.record("count source tests", &err)?;
                Err(err)
            }
        }
    }

    /// Page through `GetTests` until `total` tests have been requested.
    ///
    /// The first failed page ends extraction; pages fetched before it are kept.
    pub(super) async fn extract_tests(&mut self, total: u64) -> Result<Extraction> {
        let mut extraction = Extraction::default();
        let mut start: u64 = 0;

        while start < total {
            #[allow(clippy::cast_possible_truncation)]
            let page = self
                .xray
                .fetch_tests_page(
                    &self.project.name,
                    &self.project.id,
                    self.page_size,
                    start as usize,
                )
                .await;

            match page {
                Ok(tests) => {
                    info!("Fetched {} tests at offset {start}", tests.len());
                    extraction
                        .tests
                        .extend(tests.into_iter().map(SourceTest::from));
                }
                Err(err) => {
                    warn!("Aborting extraction at offset {start}");
                    self.error_log
                        .record(&format!("fetch tests at offset {start}"), &err)?;
                    extraction.aborted = true;
                    break;
                }
            }

            start += self.page_size as u64;
        }

        info!("Extracted {} tests", extraction.tests.len());
        Ok(extraction)
    }
}
