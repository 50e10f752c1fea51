use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use crate::config::{Config, Overrides, Settings};
use crate::migration::Migration;
use crate::output::print_summary;

#[derive(Parser)]
#[command(name = "xray-migrate")]
#[command(author, version, about = "Migrate XRAY tests and executions to Zephyr Scale", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./xray-migrate.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write the run report as JSON to this file instead of printing a summary
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy test cases, steps, test cycles and executions into Zephyr Scale
    Migrate(MigrateArgs),

    /// Write a configuration template
    Init {
        #[arg(default_value = "xray-migrate.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct MigrateArgs {
    #[arg(long, env = "JIRA_BASE_URL")]
    jira_base_url: Option<String>,

    #[arg(short, long, env = "JIRA_EMAIL")]
    email: Option<String>,

    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    jira_api_token: Option<String>,

    #[arg(long, env = "XRAY_BEARER_TOKEN", hide_env_values = true)]
    xray_bearer_token: Option<String>,

    #[arg(long, env = "SCALE_BEARER_TOKEN", hide_env_values = true)]
    scale_bearer_token: Option<String>,

    /// Jira project name used in JQL filters
    #[arg(short = 'P', long)]
    project: Option<String>,

    /// Zephyr Scale project key
    #[arg(short = 'k', long)]
    project_key: Option<String>,

    /// Jira numeric project id
    #[arg(long)]
    project_id: Option<String>,

    #[arg(long)]
    page_size: Option<usize>,

    #[arg(long)]
    error_log: Option<PathBuf>,
}

impl From<MigrateArgs> for Overrides {
    fn from(args: MigrateArgs) -> Self {
        Self {
            jira_base_url: args.jira_base_url,
            email: args.email,
            jira_api_token: args.jira_api_token,
            xray_bearer_token: args.xray_bearer_token,
            scale_bearer_token: args.scale_bearer_token,
            project: args.project,
            project_key: args.project_key,
            project_id: args.project_id,
            page_size: args.page_size,
            error_log: args.error_log,
        }
    }
}

impl Cli {
    async fn execute_migrate(&self, args: MigrateArgs) -> Result<()> {
        let mut config = Config::load(self.config.as_deref())?;
        config.apply_overrides(args.into());
        let settings = Settings::try_from(config)?;

        info!(
            "Migrating project {} into Zephyr Scale project {}",
            settings.project.name, settings.project.key
        );

        let report = Migration::new(&settings)?
            .run()
            .await
            .context("Migration run failed")?;

        if let Some(output_path) = &self.output {
            let json_output = if self.pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            std::fs::write(output_path, json_output)?;
            info!("Report written to: {}", output_path.display());
        } else {
            print_summary(&report);
        }

        Ok(())
    }

    fn execute_init(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists; pass --force to overwrite it",
                path.display()
            );
        }

        Config::template().save(path)?;
        eprintln!("Configuration template written to {}", path.display());
        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Migrate(args) => self.execute_migrate(args.clone()).await,
            Commands::Init { path, force } => Self::execute_init(path, *force),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_migrate_flags_become_overrides() {
        let cli = Cli::parse_from([
            "xray-migrate",
            "--pretty",
            "migrate",
            "-P",
            "Shop",
            "-k",
            "SHOP",
            "--project-id",
            "10042",
            "--page-size",
            "50",
        ]);

        assert!(cli.pretty);
        let Commands::Migrate(args) = cli.command else {
            panic!("expected migrate command");
        };
        let overrides = Overrides::from(args);
        assert_eq!(overrides.project.as_deref(), Some("Shop"));
        assert_eq!(overrides.project_key.as_deref(), Some("SHOP"));
        assert_eq!(overrides.project_id.as_deref(), Some("10042"));
        assert_eq!(overrides.page_size, Some(50));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("xray-migrate.toml");
        std::fs::write(&path, "# keep me").unwrap();

        assert!(Cli::execute_init(&path, false).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# keep me");

        Cli::execute_init(&path, true).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.project.key.as_deref(), Some("DEMO"));
    }
}
