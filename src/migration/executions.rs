use indexmap::IndexMap;
use log::{debug, info};

use super::model::{ExecutionRun, IdentifierMap, SourcePlan};
use super::Migration;
use crate::error::Result;
use crate::providers::zephyr::types::{NewTestCycle, NewTestExecution};

/// Plan name whose group keeps only the most recent run status.
pub const SINGLE_RUN_PLAN: &str = "Multiplan";

/// A run status waiting to be submitted, with its resolved test case key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedStatus {
    pub status_name: String,
    pub status_description: Option<String>,
    pub source_test_id: String,
    pub test_case_key: Option<String>,
}

impl From<ExecutionRun> for GroupedStatus {
    fn from(run: ExecutionRun) -> Self {
        Self {
            status_name: run.status_name,
            status_description: run.status_description,
            source_test_id: run.source_test_id,
            test_case_key: None,
        }
    }
}

/// All run statuses that will land in one Zephyr Scale test cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanGroup {
    pub name: String,
    pub statuses: Vec<GroupedStatus>,
}

#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    pub plans: usize,
    pub plans_query_failed: bool,
    pub cycles_created: usize,
    pub cycles_failed: usize,
    pub executions_created: usize,
    pub executions_failed: usize,
    pub unresolved: usize,
}

/// Group run statuses by plan name, in first-seen plan order.
///
/// Plans sharing a name are merged. The `Multiplan` group keeps only the last
/// status it sees; every other group keeps all of them in encounter order.
pub fn group_runs(plans: Vec<SourcePlan>) -> Vec<PlanGroup> {
    let mut groups: IndexMap<String, Vec<GroupedStatus>> = IndexMap::new();

    for plan in plans {
        let statuses = groups.entry(plan.name.clone()).or_default();
        for run in plan.runs {
            if plan.name == SINGLE_RUN_PLAN {
                statuses.clear();
            }
            statuses.push(GroupedStatus::from(run));
        }
    }

    groups
        .into_iter()
        .map(|(name, statuses)| PlanGroup { name, statuses })
        .collect()
}

/// Attach the Zephyr Scale test case key to every status whose test was migrated.
pub fn resolve_keys(groups: &mut [PlanGroup], identifiers: &IdentifierMap) {
    for status in groups.iter_mut().flat_map(|group| group.statuses.iter_mut()) {
        status.test_case_key = identifiers.get(&status.source_test_id).map(str::to_string);
    }
}

/// Build execution payloads for the resolved statuses of one group.
pub fn execution_payloads(
    group: &PlanGroup,
    project_key: &str,
    cycle_key: &str,
) -> Vec<NewTestExecution> {
    group
        .statuses
        .iter()
        .filter_map(|status| {
            let test_case_key = status.test_case_key.as_ref()?;
            Some(NewTestExecution {
                project_key: project_key.to_string(),
                test_case_key: test_case_key.clone(),
                test_cycle_key: cycle_key.to_string(),
                status_name: status.status_name.clone(),
                comment: status.status_description.clone(),
            })
        })
        .collect()
}

impl Migration {
    /// Recreate XRAY test plans as Zephyr Scale test cycles with one execution
    /// per resolved run status.
    pub(super) async fn migrate_executions(
        &mut self,
        identifiers: &IdentifierMap,
    ) -> Result<ExecutionOutcome> {
        let mut outcome = ExecutionOutcome::default();

        let plans = match self.xray.fetch_test_plans().await {
            Ok(plans) => plans,
            Err(err) => {
                outcome.plans_query_failed = true;
                self.error_log.record("fetch test plans", &err)?;
                return Ok(outcome);
            }
        };

        let mut groups = group_runs(plans.into_iter().map(SourcePlan::from).collect());
        resolve_keys(&mut groups, identifiers);
        outcome.plans = groups.len();
        info!("Grouped runs into {} test plans", groups.len());

        for group in &groups {
            let unresolved = group
                .statuses
                .iter()
                .filter(|status| status.test_case_key.is_none())
                .count();
            outcome.unresolved += unresolved;

            let cycle = NewTestCycle {
                project_key: self.project.key.clone(),
                name: group.name.clone(),
            };

            let cycle_key = match self.zephyr.create_test_cycle(&cycle).await {
                Ok(key) => key,
                Err(err) => {
                    outcome.cycles_failed += 1;
                    self.error_log
                        .record(&format!("create test cycle '{}'", group.name), &err)?;
                    continue;
                }
            };

            debug!("Created test cycle {cycle_key} for plan '{}'", group.name);
            self.error_log.set_cycle_key(&cycle_key);
            outcome.cycles_created += 1;

            for execution in execution_payloads(group, &self.project.key, &cycle_key) {
                match self.zephyr.create_test_execution(&execution).await {
                    Ok(()) => outcome.executions_created += 1,
                    Err(err) => {
                        outcome.executions_failed += 1;
                        self.error_log.set_test_case_key(&execution.test_case_key);
                        self.error_log.record(
                            &format!(
                                "create execution of {} in cycle {cycle_key}",
                                execution.test_case_key
                            ),
                            &err,
                        )?;
                    }
                }
            }
        }

        info!(
            "Created {} test cycles and {} executions ({} runs without a migrated test case)",
            outcome.cycles_created, outcome.executions_created, outcome.unresolved
        );

        Ok(outcome)
    }
}
