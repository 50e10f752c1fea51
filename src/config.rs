use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::error::MigrateError;

/// Configuration file structure for xray-migrate.
///
/// Holds the credentials and project identifiers a migration run needs.
/// Configuration files are loaded from the current directory or specified path,
/// and every value can be overridden from the command line or environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Jira Cloud access used for the test count query
    #[serde(default)]
    pub jira: JiraConfig,

    /// XRAY GraphQL access
    #[serde(default)]
    pub xray: XrayConfig,

    /// Zephyr Scale REST access
    #[serde(default)]
    pub zephyr: ZephyrConfig,

    /// Project being migrated
    #[serde(default)]
    pub project: ProjectConfig,

    /// Run parameters
    #[serde(default)]
    pub migration: MigrationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JiraConfig {
    /// Jira Cloud site URL (e.g., 'https://acme.atlassian.net')
    pub base_url: Option<String>,

    /// Account email paired with the API token for basic auth
    pub email: Option<String>,

    /// Jira API token
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct XrayConfig {
    /// Bearer token obtained from the XRAY authenticate endpoint
    pub bearer_token: Option<String>,

    /// XRAY GraphQL endpoint
    #[serde(default = "default_xray_graphql_url")]
    pub graphql_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ZephyrConfig {
    /// Zephyr Scale API access token
    pub bearer_token: Option<String>,

    /// Zephyr Scale REST API base URL
    #[serde(default = "default_zephyr_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProjectConfig {
    /// Jira project name used in JQL filters
    pub name: Option<String>,

    /// Zephyr Scale project key (e.g., 'DEMO')
    pub key: Option<String>,

    /// Jira numeric project id used by XRAY
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MigrationConfig {
    /// Number of tests requested per GraphQL page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// File receiving failed responses; truncated at the start of each run
    #[serde(default = "default_error_log")]
    pub error_log: PathBuf,
}

impl Default for XrayConfig {
    fn default() -> Self {
        Self {
            bearer_token: None,
            graphql_url: default_xray_graphql_url(),
        }
    }
}

impl Default for ZephyrConfig {
    fn default() -> Self {
        Self {
            bearer_token: None,
            base_url: default_zephyr_base_url(),
        }
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            error_log: default_error_log(),
        }
    }
}

fn default_xray_graphql_url() -> String {
    "https://xray.cloud.getxray.app/api/v2/graphql".to_string()
}

fn default_zephyr_base_url() -> String {
    "https://api.zephyrscale.smartbear.com/v2/".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_error_log() -> PathBuf {
    PathBuf::from("error.txt")
}

/// Values supplied on the command line or through the environment.
///
/// Anything set here wins over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub jira_base_url: Option<String>,
    pub email: Option<String>,
    pub jira_api_token: Option<String>,
    pub xray_bearer_token: Option<String>,
    pub scale_bearer_token: Option<String>,
    pub project: Option<String>,
    pub project_key: Option<String>,
    pub project_id: Option<String>,
    pub page_size: Option<usize>,
    pub error_log: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./xray-migrate.toml
    /// 3. ./xray-migrate.json
    /// 4. ./xray-migrate.yaml
    /// 5. ./xray-migrate.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if path.exists() {
                return Self::load_from_path(path);
            }
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let candidates = [
            "xray-migrate.toml",
            "xray-migrate.json",
            "xray-migrate.yaml",
            "xray-migrate.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("yaml" | "yml") => serde_yaml::to_string(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// A configuration with placeholder values for every required setting.
    pub fn template() -> Self {
        Self {
            jira: JiraConfig {
                base_url: Some("https://your-site.atlassian.net".to_string()),
                email: Some("you@example.com".to_string()),
                api_token: Some("<jira api token>".to_string()),
            },
            xray: XrayConfig {
                bearer_token: Some("<xray bearer token>".to_string()),
                ..XrayConfig::default()
            },
            zephyr: ZephyrConfig {
                bearer_token: Some("<zephyr scale bearer token>".to_string()),
                ..ZephyrConfig::default()
            },
            project: ProjectConfig {
                name: Some("DEMO".to_string()),
                key: Some("DEMO".to_string()),
                id: Some("10000".to_string()),
            },
            migration: MigrationConfig::default(),
        }
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut self.jira.base_url, overrides.jira_base_url);
        set(&mut self.jira.email, overrides.email);
        set(&mut self.jira.api_token, overrides.jira_api_token);
        set(&mut self.xray.bearer_token, overrides.xray_bearer_token);
        set(&mut self.zephyr.bearer_token, overrides.scale_bearer_token);
        set(&mut self.project.name, overrides.project);
        set(&mut self.project.key, overrides.project_key);
        set(&mut self.project.id, overrides.project_id);

        if let Some(page_size) = overrides.page_size {
            self.migration.page_size = page_size;
        }
        if let Some(error_log) = overrides.error_log {
            self.migration.error_log = error_log;
        }
    }
}

/// Project identifiers shared by every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    pub name: String,
    pub key: String,
    pub id: String,
}

/// Fully resolved settings for one migration run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub jira_base_url: String,
    pub email: String,
    pub jira_api_token: Token,
    pub xray_bearer_token: Token,
    pub xray_graphql_url: String,
    pub scale_bearer_token: Token,
    pub zephyr_base_url: String,
    pub project: ProjectSettings,
    pub page_size: usize,
    pub error_log: PathBuf,
}

impl TryFrom<Config> for Settings {
    type Error = MigrateError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        let mut require = |value: Option<String>, name: &'static str| {
            let value = value.filter(|v| !v.trim().is_empty());
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let jira_base_url = require(config.jira.base_url, "jira.base-url");
        let email = require(config.jira.email, "jira.email");
        let jira_api_token = require(config.jira.api_token, "jira.api-token");
        let xray_bearer_token = require(config.xray.bearer_token, "xray.bearer-token");
        let scale_bearer_token = require(config.zephyr.bearer_token, "zephyr.bearer-token");
        let name = require(config.project.name, "project.name");
        let key = require(config.project.key, "project.key");
        let id = require(config.project.id, "project.id");

        if !missing.is_empty() {
            return Err(MigrateError::Config(format!(
                "missing required values: {}",
                missing.join(", ")
            )));
        }

        if config.migration.page_size == 0 {
            return Err(MigrateError::Config(
                "migration.page-size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            jira_base_url,
            email,
            jira_api_token: Token::from(jira_api_token),
            xray_bearer_token: Token::from(xray_bearer_token),
            xray_graphql_url: config.xray.graphql_url,
            scale_bearer_token: Token::from(scale_bearer_token),
            zephyr_base_url: config.zephyr.base_url,
            project: ProjectSettings { name, key, id },
            page_size: config.migration.page_size,
            error_log: config.migration.error_log,
        })
    }
}
