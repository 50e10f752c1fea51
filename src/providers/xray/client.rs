use graphql_client::{QueryBody, Response as GraphQLResponse};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::types::{
    results_of, GetTestPlansData, GetTestsData, GetTestsVariables, SearchResponse, XrayTest,
    XrayTestPlan,
};
use crate::auth::Token;
use crate::config::Settings;
use crate::error::{MigrateError, Result};
use crate::providers::with_trailing_slash;

const GET_TESTS_QUERY: &str = include_str!("queries/get_tests.graphql");
const GET_TEST_PLANS_QUERY: &str = include_str!("queries/get_test_plans.graphql");

/// Read-only access to the source side: Jira search for counts and the XRAY
/// GraphQL API for tests and execution history.
pub struct XrayClient {
    client: Client,
    search_url: Url,
    graphql_url: Url,
    email: String,
    jira_token: Token,
    token: Token,
}

impl XrayClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("xray-migrate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MigrateError::Config(format!("Failed to create HTTP client: {e}")))?;

        let search_url = Url::parse(&with_trailing_slash(&settings.jira_base_url))
            .map_err(|e| MigrateError::Config(format!("Invalid Jira base URL: {e}")))?
            .join("rest/api/3/search")
            .map_err(|e| MigrateError::Config(format!("Invalid Jira search URL: {e}")))?;

        let graphql_url = Url::parse(&settings.xray_graphql_url)
            .map_err(|e| MigrateError::Config(format!("Invalid XRAY GraphQL URL: {e}")))?;

        Ok(Self {
            client,
            search_url,
            graphql_url,
            email: settings.email.clone(),
            jira_token: settings.jira_api_token.clone(),
            token: settings.xray_bearer_token.clone(),
        })
    }

    /// Count the `Test` issues of a project through Jira search.
    ///
    /// # Errors
    ///
    /// Returns `MigrateError::Api` on a non-success status and
    /// `MigrateError::MissingTotal` when the body carries no `total`.
    pub async fn count_tests(&self, project: &str) -> Result<u64> {
        let jql = format!("project={project} and issuetype=Test");
        debug!("Counting tests with JQL: {jql}");

        let response = self
            .client
            .get(self.search_url.clone())
            .basic_auth(&self.email, Some(self.jira_token.as_str()))
            .query(&[("jql", jql.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(MigrateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        body.total.ok_or(MigrateError::MissingTotal)
    }

    /// Fetch one page of tests with their steps and preconditions.
    pub async fn fetch_tests_page(
        &self,
        project: &str,
        project_id: &str,
        limit: usize,
        start: usize,
    ) -> Result<Vec<XrayTest>> {
        #[allow(clippy::cast_possible_wrap)]
        let variables = GetTestsVariables {
            jql: format!("project = {project}"),
            project_id: project_id.to_string(),
            test_type: None,
            limit: limit as i64,
            start: start as i64,
        };

        let request_body = QueryBody {
            variables,
            query: GET_TESTS_QUERY,
            operation_name: "GetTests",
        };

        let data: GetTestsData = self.execute_graphql_request(&request_body).await?;
        Ok(results_of(data.get_tests))
    }

    /// Fetch test plans with their executions and runs.
    pub async fn fetch_test_plans(&self) -> Result<Vec<XrayTestPlan>> {
        let request_body = QueryBody {
            variables: serde_json::Map::new(),
            query: GET_TEST_PLANS_QUERY,
            operation_name: "GetTestPlans",
        };

        let data: GetTestPlansData = self.execute_graphql_request(&request_body).await?;
        Ok(results_of(data.get_test_plans))
    }

    /// Execute a GraphQL request and return its data after checking for errors.
    async fn execute_graphql_request<V, T>(&self, request_body: &QueryBody<V>) -> Result<T>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.graphql_url.clone())
            .bearer_auth(self.token.as_str())
            .json(request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(MigrateError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response_body: GraphQLResponse<T> = response.json().await?;

        if let Some(errors) = response_body.errors.filter(|errors| !errors.is_empty()) {
            return Err(MigrateError::GraphQL {
                operation: request_body.operation_name.to_string(),
                errors: errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        response_body.data.ok_or(MigrateError::NoResponseData)
    }
}
