use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of the Jira issue search endpoint; only the match count is used.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub total: Option<u64>,
}

/// Variables for the `GetTests` query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTestsVariables {
    /// JQL filter restricting results to one project
    pub jql: String,
    pub project_id: String,
    /// Always null; every test type is migrated
    pub test_type: Option<String>,
    pub limit: i64,
    pub start: i64,
}

/// XRAY paginated result wrapper (`{ total, results }`).
#[derive(Debug, Deserialize)]
pub struct Connection<T> {
    pub results: Option<Vec<T>>,
}

impl<T> Connection<T> {
    pub fn into_results(self) -> Vec<T> {
        self.results.unwrap_or_default()
    }
}

/// Flattens an optional connection into its results.
pub fn results_of<T>(connection: Option<Connection<T>>) -> Vec<T> {
    connection.map(Connection::into_results).unwrap_or_default()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTestsData {
    pub get_tests: Option<Connection<XrayTest>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTestPlansData {
    pub get_test_plans: Option<Connection<XrayTestPlan>>,
}

/// Jira fields XRAY embeds under `jira(fields: [...])`.
///
/// Either field may be null. Rich-text values that are not plain strings are
/// kept as their compact JSON text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JiraFields {
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

/// A test as returned by `GetTests`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayTest {
    pub issue_id: String,
    #[serde(default)]
    pub jira: JiraFields,
    pub steps: Option<Vec<XrayStep>>,
    pub preconditions: Option<Connection<XrayPrecondition>>,
}

#[derive(Debug, Deserialize)]
pub struct XrayStep {
    pub data: Option<String>,
    pub action: Option<String>,
    pub result: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayPrecondition {
    pub issue_id: String,
    #[serde(default)]
    pub jira: JiraFields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayTestPlan {
    #[serde(default)]
    pub jira: JiraFields,
    pub test_executions: Option<Connection<XrayTestExecution>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayTestExecution {
    pub test_runs: Option<Connection<XrayTestRun>>,
}

#[derive(Debug, Deserialize)]
pub struct XrayTestRun {
    pub id: Option<String>,
    pub status: Option<XrayRunStatus>,
    pub test: Option<XrayRunTest>,
}

#[derive(Debug, Deserialize)]
pub struct XrayRunStatus {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayRunTest {
    pub issue_id: String,
}
