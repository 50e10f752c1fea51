use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::providers::xray::types::{results_of, XrayTest, XrayTestPlan};

/// A test step as read from XRAY, with absent fields already defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStep {
    pub data: String,
    pub action: String,
    pub result: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourcePrecondition {
    pub source_id: String,
    pub summary: String,
    pub description: String,
}

/// A test extracted from XRAY.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTest {
    pub source_id: String,
    pub summary: String,
    pub description: String,
    pub steps: Vec<SourceStep>,
    pub preconditions: Vec<SourcePrecondition>,
}

impl From<XrayTest> for SourceTest {
    fn from(test: XrayTest) -> Self {
        let steps = test
            .steps
            .unwrap_or_default()
            .into_iter()
            .map(|step| SourceStep {
                data: step.data.unwrap_or_default(),
                action: step.action.unwrap_or_default(),
                result: step.result.unwrap_or_default(),
            })
            .collect();

        let preconditions = results_of(test.preconditions)
            .into_iter()
            .map(|precondition| SourcePrecondition {
                source_id: precondition.issue_id,
                summary: precondition.jira.summary.unwrap_or_default(),
                description: precondition.jira.description.unwrap_or_default(),
            })
            .collect();

        Self {
            source_id: test.issue_id,
            summary: test.jira.summary.unwrap_or_default(),
            description: test.jira.description.unwrap_or_default(),
            steps,
            preconditions,
        }
    }
}

/// One recorded run of a test inside a test execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRun {
    pub status_name: String,
    pub status_description: Option<String>,
    pub source_test_id: String,
}

/// A test plan with the runs of all its executions, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePlan {
    pub name: String,
    pub runs: Vec<ExecutionRun>,
}

impl From<XrayTestPlan> for SourcePlan {
    fn from(plan: XrayTestPlan) -> Self {
        let name = plan.jira.summary.unwrap_or_default();

        let runs = results_of(plan.test_executions)
            .into_iter()
            .flat_map(|execution| results_of(execution.test_runs))
            .filter_map(|run| match (run.status, run.test) {
                (Some(status), Some(test)) => Some(ExecutionRun {
                    status_name: status.name,
                    status_description: status.description,
                    source_test_id: test.issue_id,
                }),
                _ => {
                    debug!(
                        "Skipping run {} in plan '{name}': missing status or test",
                        run.id.as_deref().unwrap_or("<unknown>")
                    );
                    None
                }
            })
            .collect();

        Self { name, runs }
    }
}

/// Source test id → Zephyr Scale test case key, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdentifierMap(IndexMap<String, String>);

impl IdentifierMap {
    pub fn insert(&mut self, source_id: impl Into<String>, key: impl Into<String>) {
        self.0.insert(source_id.into(), key.into());
    }

    pub fn get(&self, source_id: &str) -> Option<&str> {
        self.0.get(source_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, key)| (id.as_str(), key.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_test_defaults_missing_fields() {
        let xray: XrayTest = serde_json::from_value(json!({
            "issueId": "10001",
            "jira": { "summary": "Search", "description": null },
            "steps": [
                { "data": null, "action": "Type query", "result": null },
                { "data": "q=rust", "action": null, "result": "Results listed" }
            ],
            "preconditions": { "results": [
                { "issueId": "20001", "jira": { "summary": "Logged in", "description": "As admin" } }
            ] }
        }))
        .unwrap();

        let test = SourceTest::from(xray);

        assert_eq!(test.source_id, "10001");
        assert_eq!(test.description, "");
        assert_eq!(
            test.steps,
            vec![
                SourceStep {
                    data: String::new(),
                    action: "Type query".to_string(),
                    result: String::new(),
                },
                SourceStep {
                    data: "q=rust".to_string(),
                    action: String::new(),
                    result: "Results listed".to_string(),
                },
            ]
        );
        assert_eq!(test.preconditions[0].source_id, "20001");
        assert_eq!(test.preconditions[0].description, "As admin");
    }

    #[test]
    fn test_source_plan_flattens_executions_and_skips_incomplete_runs() {
        let xray: XrayTestPlan = serde_json::from_value(json!({
            "issueId": "30001",
            "jira": { "summary": "Regression" },
            "testExecutions": { "results": [
                { "issueId": "40001", "testRuns": { "results": [
                    { "id": "r1", "status": { "name": "PASSED", "description": "ok" }, "test": { "issueId": "10001" } },
                    { "id": "r2", "status": null, "test": { "issueId": "10002" } }
                ] } },
                { "issueId": "40002", "testRuns": { "results": [
                    { "id": "r3", "status": { "name": "FAILED", "description": null }, "test": { "issueId": "10002" } }
                ] } }
            ] }
        }))
        .unwrap();

        let plan = SourcePlan::from(xray);

        assert_eq!(plan.name, "Regression");
        assert_eq!(plan.runs.len(), 2);
        assert_eq!(plan.runs[0].source_test_id, "10001");
        assert_eq!(plan.runs[1].status_name, "FAILED");
        assert_eq!(plan.runs[1].status_description, None);
    }

    #[test]
    fn test_identifier_map_keeps_insertion_order() {
        let mut ids = IdentifierMap::default();
        ids.insert("10002", "DEMO-T1");
        ids.insert("10001", "DEMO-T2");

        assert_eq!(ids.get("10001"), Some("DEMO-T2"));
        assert_eq!(ids.get("10003"), None);
        assert_eq!(
            ids.iter().collect::<Vec<_>>(),
            vec![("10002", "DEMO-T1"), ("10001", "DEMO-T2")]
        );
        assert_eq!(
            serde_json::to_value(&ids).unwrap(),
            json!({ "10002": "DEMO-T1", "10001": "DEMO-T2" })
        );
    }
}
