use std::collections::HashSet;

use log::{debug, info};

use super::model::{IdentifierMap, SourcePrecondition, SourceStep, SourceTest};
use super::Migration;
use crate::error::{MigrateError, Result};
use crate::providers::zephyr::types::{
    error_message, InlineStep, NewTestCase, StepBatch, StepItem, StepMode,
};

/// Step-push rejections Zephyr Scale sends for tests that simply have no
/// usable steps. Matched as substrings of the response `message`.
///
/// This list is provisional: it covers the messages seen so far, and any
/// other rejection is treated as a real failure.
pub const BENIGN_STEP_MESSAGES: &[&str] = &[
    "Test Data, Description and Expected Result are empty",
    "Should contain at least 1 step and no more than 100",
];

/// What happened to the tests handed to the test case stage.
#[derive(Debug, Default)]
pub struct TestCaseOutcome {
    pub identifiers: IdentifierMap,
    pub created: usize,
    pub duplicates: usize,
    pub failed: usize,
    pub steps_pushed: usize,
    pub steps_benign: usize,
    pub steps_failed: usize,
}

/// Remove every parenthesis, then surrounding whitespace.
pub fn sanitize_text(text: &str) -> String {
    text.replace(['(', ')'], "").trim().to_string()
}

/// Render preconditions as `"summary: description"` pairs joined by `"; "`.
pub fn flatten_preconditions(preconditions: &[SourcePrecondition]) -> String {
    preconditions
        .iter()
        .map(|p| format!("{}: {}", p.summary, p.description))
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn to_test_case(test: &SourceTest, project_key: &str) -> NewTestCase {
    NewTestCase {
        project_key: project_key.to_string(),
        name: sanitize_text(&test.summary),
        objective: sanitize_text(&test.description),
        precondition: flatten_preconditions(&test.preconditions),
    }
}

pub fn to_step_batch(steps: &[SourceStep]) -> StepBatch {
    StepBatch {
        mode: StepMode::Overwrite,
        items: steps
            .iter()
            .map(|step| StepItem {
                inline: InlineStep {
                    test_data: step.data.clone(),
                    description: step.action.clone(),
                    expected_result: step.result.clone(),
                },
            })
            .collect(),
    }
}

/// Whether a failed step push is one of the known harmless rejections.
pub fn is_benign_step_rejection(err: &MigrateError) -> bool {
    let MigrateError::Api { message, .. } = err else {
        return false;
    };

    error_message(message).is_some_and(|message| {
        BENIGN_STEP_MESSAGES
            .iter()
            .any(|benign| message.contains(benign))
    })
}

impl Migration {
    /// Create one Zephyr Scale test case per distinct source test, then push
    /// the steps of every created test case.
    ///
    /// Individual failures are logged and skipped. Only an error log write
    /// failure is returned.
    pub(super) async fn migrate_test_cases(&mut self, tests: &[SourceTest]) -> Result<TestCaseOutcome> {
        let mut outcome = TestCaseOutcome::default();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut created: Vec<(String, &SourceTest)> = Vec::new();

        for test in tests {
            if !seen.insert(test.source_id.as_str()) {
                debug!("Skipping duplicate source test {}", test.source_id);
                outcome.duplicates += 1;
                continue;
            }

            let payload = to_test_case(test, &self.project.key);
            match self.zephyr.create_test_case(&payload).await {
                Ok(key) => {
                    debug!("Created test case {key} for source test {}", test.source_id);
                    self.error_log.set_test_case_key(&key);
                    outcome.identifiers.insert(test.source_id.as_str(), key.as_str());
                    outcome.created += 1;
                    created.push((key, test));
                }
                Err(err) => {
                    outcome.failed += 1;
                    self.error_log.record(
                        &format!("create test case for source test {}", test.source_id),
                        &err,
                    )?;
                }
            }
        }

        info!(
            "Created {} test cases ({} duplicates skipped, {} failed)",
            outcome.created, outcome.duplicates, outcome.failed
        );

        for (key, test) in created {
            let batch = to_step_batch(&test.steps);
            match self.zephyr.overwrite_test_steps(&key, &batch).await {
                Ok(()) => outcome.steps_pushed += 1,
                Err(err) if is_benign_step_rejection(&err) => {
                    debug!("Test case {key} has no usable steps");
                    outcome.steps_benign += 1;
                }
                Err(err) => {
                    outcome.steps_failed += 1;
                    self.error_log.set_test_case_key(&key);
                    self.error_log
                        .record(&format!("push steps for test case {key}"), &err)?;
                }
            }
        }

        info!(
            "Pushed steps for {} test cases ({} without steps, {} failed)",
            outcome.steps_pushed, outcome.steps_benign, outcome.steps_failed
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::test_support::migration_for;
    use mockito::Matcher;
    use serde_json::json;

    fn precondition(summary: &str, description: &str) -> SourcePrecondition {
        SourcePrecondition {
            source_id: format!("P-{summary}"),
            summary: summary.to_string(),
            description: description.to_string(),
        }
    }

    fn source_test(id: &str, summary: &str) -> SourceTest {
        SourceTest {
            source_id: id.to_string(),
            summary: summary.to_string(),
            ..SourceTest::default()
        }
    }

    #[test]
    fn test_sanitize_strips_parentheses_and_whitespace() {
        assert_eq!(sanitize_text("  Login (happy path)  "), "Login happy path");
        assert_eq!(sanitize_text("(a)(b)"), "ab");
        assert_eq!(sanitize_text(" ( padded ) "), "padded");
        assert_eq!(sanitize_text(""), "");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for input in ["  Login (happy path)  ", "( x )", "((()))", "plain", " ( ) a ( ) "] {
            let once = sanitize_text(input);
            assert_eq!(sanitize_text(&once), once);
            assert!(!once.contains('(') && !once.contains(')'));
            assert_eq!(once.trim(), once);
        }
    }

    #[test]
    fn test_flatten_preconditions() {
        assert_eq!(flatten_preconditions(&[]), "");
        assert_eq!(flatten_preconditions(&[precondition("A", "B")]), "A: B");
        assert_eq!(
            flatten_preconditions(&[precondition("A", "B"), precondition("C", "D")]),
            "A: B; C: D"
        );
    }

    #[test]
    fn test_to_test_case_maps_fields() {
        let test = SourceTest {
            source_id: "10001".to_string(),
            summary: "Checkout (guest)".to_string(),
            description: " Pays with card (visa) ".to_string(),
            steps: vec![],
            preconditions: vec![precondition("Cart (full)", "Has items")],
        };

        let payload = to_test_case(&test, "SHOP");

        assert_eq!(payload.project_key, "SHOP");
        assert_eq!(payload.name, "Checkout guest");
        assert_eq!(payload.objective, "Pays with card visa");
        assert_eq!(payload.precondition, "Cart (full): Has items");
    }

    #[test]
    fn test_step_batch_preserves_order_and_mapping() {
        let steps = vec![
            SourceStep {
                data: "d1".to_string(),
                action: "a1".to_string(),
                result: "r1".to_string(),
            },
            SourceStep {
                data: String::new(),
                action: "a2".to_string(),
                result: String::new(),
            },
        ];

        let batch = to_step_batch(&steps);

        assert_eq!(batch.mode, StepMode::Overwrite);
        assert_eq!(batch.items.len(), 2);
        assert_eq!(batch.items[0].inline.test_data, "d1");
        assert_eq!(batch.items[0].inline.description, "a1");
        assert_eq!(batch.items[0].inline.expected_result, "r1");
        assert_eq!(batch.items[1].inline.description, "a2");
        assert_eq!(batch.items[1].inline.test_data, "");
    }

    #[test]
    fn test_benign_rejection_matching() {
        let empty = MigrateError::Api {
            status: 400,
            message: r#"{"message": "Test Data, Description and Expected Result are empty"}"#
                .to_string(),
        };
        let range = MigrateError::Api {
            status: 400,
            message: r#"{"message": "Should contain at least 1 step and no more than 100"}"#
                .to_string(),
        };
        let other = MigrateError::Api {
            status: 400,
            message: r#"{"message": "Test case not found"}"#.to_string(),
        };
        let not_json = MigrateError::Api {
            status: 502,
            message: "Bad Gateway".to_string(),
        };

        assert!(is_benign_step_rejection(&empty));
        assert!(is_benign_step_rejection(&range));
        assert!(!is_benign_step_rejection(&other));
        assert!(!is_benign_step_rejection(&not_json));
        assert!(!is_benign_step_rejection(&MigrateError::NoResponseData));
    }

    #[tokio::test]
    async fn test_duplicates_are_created_once() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/v2/testcases")
            .with_status(201)
            .with_body(r#"{"key": "DEMO-T1"}"#)
            .expect(1)
            .create_async()
            .await;
        server
            .mock("POST", "/v2/testcases/DEMO-T1/teststeps")
            .with_status(201)
            .expect(1)
            .create_async()
            .await;

        let (mut migration, _dir) = migration_for(&server, 100);
        let tests = vec![source_test("10001", "First"), source_test("10001", "Again")];
        let outcome = migration.migrate_test_cases(&tests).await.unwrap();

        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(outcome.identifiers.get("10001"), Some("DEMO-T1"));
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_creation_failure_does_not_stop_batch() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/testcases")
            .match_body(Matcher::PartialJson(json!({ "name": "Broken" })))
            .with_status(400)
            .with_body(r#"{"message": "Invalid name"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v2/testcases")
            .match_body(Matcher::PartialJson(json!({ "name": "Fine" })))
            .with_status(201)
            .with_body(r#"{"key": "DEMO-T2"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v2/testcases/DEMO-T2/teststeps")
            .with_status(201)
            .create_async()
            .await;

        let (mut migration, dir) = migration_for(&server, 100);
        let tests = vec![source_test("1", "Broken"), source_test("2", "Fine")];
        let outcome = migration.migrate_test_cases(&tests).await.unwrap();

        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.identifiers.get("1"), None);
        assert_eq!(outcome.identifiers.get("2"), Some("DEMO-T2"));

        let log = std::fs::read_to_string(dir.path().join("error.txt")).unwrap();
        assert!(log.contains("create test case for source test 1"));
        assert!(log.contains("Invalid name"));
    }

    #[tokio::test]
    async fn test_benign_step_rejection_is_not_logged() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/testcases")
            .with_status(201)
            .with_body(r#"{"key": "DEMO-T1"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v2/testcases/DEMO-T1/teststeps")
            .with_status(400)
            .with_body(
                r#"{"errorCode": 400, "message": "Test Data, Description and Expected Result are empty"}"#,
            )
            .create_async()
            .await;

        let (mut migration, dir) = migration_for(&server, 100);
        let outcome = migration
            .migrate_test_cases(&[source_test("1", "No steps")])
            .await
            .unwrap();

        assert_eq!(outcome.steps_benign, 1);
        assert_eq!(outcome.steps_failed, 0);
        assert_eq!(migration.error_log.entries(), 0);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("error.txt")).unwrap(),
            ""
        );
    }

    #[tokio::test]
    async fn test_other_step_rejection_is_logged_and_test_case_kept() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v2/testcases")
            .with_status(201)
            .with_body(r#"{"key": "DEMO-T1"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v2/testcases/DEMO-T1/teststeps")
            .with_status(403)
            .with_body(r#"{"message": "Forbidden"}"#)
            .create_async()
            .await;

        let (mut migration, dir) = migration_for(&server, 100);
        let outcome = migration
            .migrate_test_cases(&[source_test("1", "Steps")])
            .await
            .unwrap();

        assert_eq!(outcome.steps_failed, 1);
        assert_eq!(outcome.identifiers.get("1"), Some("DEMO-T1"));

        let log = std::fs::read_to_string(dir.path().join("error.txt")).unwrap();
        assert!(log.contains("push steps for test case DEMO-T1"));
        assert!(log.contains("Last Test Case Key: DEMO-T1"));
        assert!(log.contains("Forbidden"));
    }
}
