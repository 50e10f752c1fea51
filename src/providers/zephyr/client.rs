use log::debug;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use url::Url;

use super::types::{CreatedResource, NewTestCase, NewTestCycle, NewTestExecution, StepBatch};
use crate::auth::Token;
use crate::error::{MigrateError, Result};
use crate::providers::with_trailing_slash;

/// Write access to the Zephyr Scale Cloud REST API.
pub struct ZephyrClient {
    client: Client,
    api_url: Url,
    token: Token,
}

impl ZephyrClient {
    pub fn new(base_url: &str, token: Token) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("xray-migrate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MigrateError::Config(format!("Failed to create HTTP client: {e}")))?;

        let api_url = Url::parse(&with_trailing_slash(base_url))
            .map_err(|e| MigrateError::Config(format!("Invalid Zephyr Scale base URL: {e}")))?;

        Ok(Self {
            client,
            api_url,
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_url
            .join(path)
            .map_err(|e| MigrateError::Config(format!("Invalid Zephyr Scale URL: {e}")))
    }

    /// POST a JSON body and require `201 Created`.
    async fn post_created(&self, url: Url, body: &impl Serialize) -> Result<reqwest::Response> {
        debug!("POST {url}");

        let response = self
            .client
            .post(url)
            .bearer_auth(self.token.as_str())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(MigrateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Create a test case and return its key.
    pub async fn create_test_case(&self, test_case: &NewTestCase) -> Result<String> {
        let url = self.endpoint("testcases")?;
        let created: CreatedResource = self.post_created(url, test_case).await?.json().await?;
        Ok(created.key)
    }

    /// Replace the steps of a test case.
    pub async fn overwrite_test_steps(&self, test_case_key: &str, steps: &StepBatch) -> Result<()> {
        let url = self.endpoint(&format!(
            "testcases/{}/teststeps",
            urlencoding::encode(test_case_key)
        ))?;
        self.post_created(url, steps).await?;
        Ok(())
    }

    /// Create a test cycle and return its key.
    pub async fn create_test_cycle(&self, cycle: &NewTestCycle) -> Result<String> {
        let url = self.endpoint("testcycles")?;
        let created: CreatedResource = self.post_created(url, cycle).await?.json().await?;
        Ok(created.key)
    }

    pub async fn create_test_execution(&self, execution: &NewTestExecution) -> Result<()> {
        let url = self.endpoint("testexecutions")?;
        self.post_created(url, execution).await?;
        Ok(())
    }
}
