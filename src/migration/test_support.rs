use serde_json::{json, Value};
use tempfile::TempDir;

use super::Migration;
use crate::auth::Token;
use crate::config::{ProjectSettings, Settings};

/// Settings pointing every endpoint at local mock servers.
pub(crate) fn settings_for(source_url: &str, destination_url: &str) -> Settings {
    Settings {
        jira_base_url: source_url.to_string(),
        email: "qa@example.com".to_string(),
        jira_api_token: Token::from("jira-token"),
        xray_bearer_token: Token::from("xray-token"),
        xray_graphql_url: format!("{source_url}/api/v2/graphql"),
        scale_bearer_token: Token::from("scale-token"),
        zephyr_base_url: format!("{destination_url}/v2/"),
        project: ProjectSettings {
            name: "DEMO".to_string(),
            key: "DEMO".to_string(),
            id: "10000".to_string(),
        },
        page_size: 100,
        error_log: "error.txt".into(),
    }
}

/// A migration against one mock server, logging into a fresh temp dir.
pub(crate) fn migration_for(server: &mockito::ServerGuard, page_size: usize) -> (Migration, TempDir) {
    let dir = TempDir::new().unwrap();
    let mut settings = settings_for(&server.url(), &server.url());
    settings.page_size = page_size;
    settings.error_log = dir.path().join("error.txt");

    (Migration::new(&settings).unwrap(), dir)
}

/// A `GetTests` result entry with numbered steps and preconditions.
pub(crate) fn test_json(id: &str, summary: &str, steps: usize, preconditions: usize) -> Value {
    json!({
        "issueId": id,
        "jira": { "summary": summary, "description": format!("Description of {id}") },
        "steps": (1..=steps).map(|n| json!({
            "data": format!("Data {n} of {id}"),
            "action": format!("Action {n} of {id}"),
            "result": format!("Result {n} of {id}")
        })).collect::<Vec<_>>(),
        "preconditions": { "total": preconditions, "results": (1..=preconditions).map(|n| json!({
            "issueId": format!("{id}-P{n}"),
            "jira": { "summary": format!("Precondition {n} of {id}"), "description": format!("Setup {n}") }
        })).collect::<Vec<_>>() }
    })
}
