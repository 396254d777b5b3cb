use crate::core::context::{TaskContext, XComStore};
use crate::core::dag::Dag;
use crate::domain::model::{RunContext, TaskState};
use crate::utils::error::{EtlError, Result};
use crate::utils::monitor::SystemMonitor;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Outcome of one task within a run.
#[derive(Debug)]
pub struct TaskInstance {
    pub task_id: String,
    pub state: TaskState,
    pub duration: Duration,
    pub error: Option<EtlError>,
}

#[derive(Debug)]
pub struct DagRunResult {
    pub run: RunContext,
    pub task_instances: Vec<TaskInstance>,
    pub xcom: XComStore,
}

impl DagRunResult {
    pub fn is_success(&self) -> bool {
        self.task_instances
            .iter()
            .all(|ti| ti.state == TaskState::Success)
    }

    pub fn state(&self) -> TaskState {
        if self.is_success() {
            TaskState::Success
        } else {
            TaskState::Failed
        }
    }

    /// The task that actually failed, as opposed to ones skipped after it.
    pub fn failed_task(&self) -> Option<&TaskInstance> {
        self.task_instances
            .iter()
            .find(|ti| ti.state == TaskState::Failed)
    }

    pub fn task(&self, task_id: &str) -> Option<&TaskInstance> {
        self.task_instances.iter().find(|ti| ti.task_id == task_id)
    }
}

/// Runs every task of a DAG once, in dependency order.
pub struct EtlEngine {
    dag: Dag,
    monitor: SystemMonitor,
}

impl EtlEngine {
    pub fn new(dag: Dag) -> Self {
        Self::new_with_monitoring(dag, false)
    }

    pub fn new_with_monitoring(dag: Dag, monitor_enabled: bool) -> Self {
        Self {
            dag,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self, run: RunContext) -> Result<DagRunResult> {
        let order = self.dag.topological_order()?;

        tracing::info!(
            "🚀 Starting DAG run {} ({}), execution date {}",
            run.run_id,
            self.dag.dag_id,
            run.execution_date
        );
        if self.monitor.is_enabled() {
            self.monitor.log_stats("DAG run started");
        }

        let mut xcom = XComStore::new();
        let mut states: HashMap<String, TaskState> = HashMap::new();
        let mut task_instances = Vec::with_capacity(order.len());

        for task in order {
            let task_id = task.task_id();

            let blocked = self
                .dag
                .upstream_of(task_id)
                .into_iter()
                .any(|up| states.get(up) != Some(&TaskState::Success));
            if blocked {
                tracing::warn!("⏭️ Skipping {}: upstream task did not succeed", task_id);
                states.insert(task_id.to_string(), TaskState::UpstreamFailed);
                task_instances.push(TaskInstance {
                    task_id: task_id.to_string(),
                    state: TaskState::UpstreamFailed,
                    duration: Duration::ZERO,
                    error: None,
                });
                continue;
            }

            tracing::info!("▶️ Running task {}", task_id);
            let start = Instant::now();
            let outcome = {
                let ctx = TaskContext::new(&run, &xcom);
                task.execute(&ctx).await
            };
            let duration = start.elapsed();

            let instance = match outcome {
                Ok(value) => {
                    if let Some(value) = value {
                        xcom.push(task_id, value);
                    }
                    tracing::info!("✅ Task {} succeeded in {:?}", task_id, duration);
                    TaskInstance {
                        task_id: task_id.to_string(),
                        state: TaskState::Success,
                        duration,
                        error: None,
                    }
                }
                Err(e) => {
                    tracing::error!("❌ Task {} failed after {:?}: {}", task_id, duration, e);
                    TaskInstance {
                        task_id: task_id.to_string(),
                        state: TaskState::Failed,
                        duration,
                        error: Some(e),
                    }
                }
            };

            states.insert(task_id.to_string(), instance.state);
            task_instances.push(instance);

            if self.monitor.is_enabled() {
                self.monitor.log_stats(task_id);
            }
        }

        let result = DagRunResult {
            run,
            task_instances,
            xcom,
        };

        let total: Duration = result.task_instances.iter().map(|ti| ti.duration).sum();
        tracing::info!(
            "🏁 DAG run {} finished: {} in {:?}",
            result.run.run_id,
            result.state(),
            total
        );
        if self.monitor.is_enabled() {
            self.monitor.log_final_stats();
        }

        Ok(result)
    }
}
