use serde::{Deserialize, Serialize};

/// Payload for `POST /testcases`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestCase {
    pub project_key: String,
    pub name: String,
    pub objective: String,
    pub precondition: String,
}

/// How a step batch is applied to the existing steps of a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepMode {
    /// Replace every existing step
    Overwrite,
}

/// Payload for `POST /testcases/{key}/teststeps`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepBatch {
    pub mode: StepMode,
    pub items: Vec<StepItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepItem {
    pub inline: InlineStep,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineStep {
    pub test_data: String,
    pub description: String,
    pub expected_result: String,
}

/// Payload for `POST /testcycles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestCycle {
    pub project_key: String,
    pub name: String,
}

/// Payload for `POST /testexecutions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestExecution {
    pub project_key: String,
    pub test_case_key: String,
    pub test_cycle_key: String,
    pub status_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Body returned when Zephyr Scale creates a resource.
#[derive(Debug, Deserialize)]
pub struct CreatedResource {
    pub key: String,
}

/// Body Zephyr Scale sends with validation failures.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Extract the `message` field of an error response body, if it has one.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .map(|message| message.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_step_batch_wire_format() {
        let batch = StepBatch {
            mode: StepMode::Overwrite,
            items: vec![StepItem {
                inline: InlineStep {
                    test_data: "user=bob".to_string(),
                    description: "Log in".to_string(),
                    expected_result: "Dashboard".to_string(),
                },
            }],
        };

        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            json!({
                "mode": "OVERWRITE",
                "items": [{ "inline": {
                    "testData": "user=bob",
                    "description": "Log in",
                    "expectedResult": "Dashboard"
                } }]
            })
        );
    }

    #[test]
    fn test_execution_without_comment_omits_field() {
        let execution = NewTestExecution {
            project_key: "DEMO".to_string(),
            test_case_key: "DEMO-T1".to_string(),
            test_cycle_key: "DEMO-R1".to_string(),
            status_name: "PASS".to_string(),
            comment: None,
        };

        let value = serde_json::to_value(&execution).unwrap();
        assert_eq!(value["testCaseKey"], "DEMO-T1");
        assert!(value.get("comment").is_none());
    }

    #[test]
    fn test_error_message_parsing() {
        assert_eq!(
            error_message(r#"{"errorCode": 400, "message": " Should contain at least 1 step and no more than 100 "}"#),
            Some("Should contain at least 1 step and no more than 100".to_string())
        );
        assert_eq!(error_message("<html>Bad Gateway</html>"), None);
        assert_eq!(error_message(r#"{"errorCode": 500}"#), None);
    }
}
