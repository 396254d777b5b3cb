use crate::core::schedule::Schedule;
use crate::domain::ports::Task;
use crate::utils::error::{EtlError, Result};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};

/// A set of tasks plus the dependency edges between them.
pub struct Dag {
    pub dag_id: String,
    pub description: String,
    pub schedule: Schedule,
    pub start_date: DateTime<Utc>,
    pub catchup: bool,
    tasks: Vec<Box<dyn Task>>,
    // (upstream, downstream)
    edges: Vec<(String, String)>,
}

impl Dag {
    pub fn new(
        dag_id: impl Into<String>,
        description: impl Into<String>,
        schedule: Schedule,
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            dag_id: dag_id.into(),
            description: description.into(),
            schedule,
            start_date,
            catchup: false,
            tasks: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn with_catchup(mut self, catchup: bool) -> Self {
        self.catchup = catchup;
        self
    }

    pub fn add_task(&mut self, task: Box<dyn Task>) -> Result<()> {
        if self.index_of(task.task_id()).is_some() {
            return Err(EtlError::DagError {
                message: format!("Duplicate task id: {}", task.task_id()),
            });
        }
        self.tasks.push(task);
        Ok(())
    }

    pub fn set_downstream(&mut self, upstream: &str, downstream: &str) -> Result<()> {
        for id in [upstream, downstream] {
            if self.index_of(id).is_none() {
                return Err(EtlError::DagError {
                    message: format!("Unknown task id: {}", id),
                });
            }
        }
        if upstream == downstream {
            return Err(EtlError::DagError {
                message: format!("Task {} cannot depend on itself", upstream),
            });
        }

        let edge = (upstream.to_string(), downstream.to_string());
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
        Ok(())
    }

    /// `chain(&["a", "b", "c"])` is `a >> b >> c`.
    pub fn chain(&mut self, task_ids: &[&str]) -> Result<()> {
        for pair in task_ids.windows(2) {
            self.set_downstream(pair[0], pair[1])?;
        }
        Ok(())
    }

    pub fn task_ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.task_id()).collect()
    }

    pub fn upstream_of(&self, task_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, down)| down == task_id)
            .map(|(up, _)| up.as_str())
            .collect()
    }

    pub fn downstream_of(&self, task_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(up, _)| up == task_id)
            .map(|(_, down)| down.as_str())
            .collect()
    }

    /// Kahn's algorithm; ready tasks are taken in insertion order.
    pub fn topological_order(&self) -> Result<Vec<&dyn Task>> {
        let mut in_degree: HashMap<&str, usize> =
            self.tasks.iter().map(|t| (t.task_id(), 0)).collect();
        for (_, down) in &self.edges {
            if let Some(d) = in_degree.get_mut(down.as_str()) {
                *d += 1;
            }
        }

        let mut ready: VecDeque<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| in_degree[t.task_id()] == 0)
            .map(|(i, _)| i)
            .collect();

        let mut order = Vec::with_capacity(self.tasks.len());
        while let Some(idx) = ready.pop_front() {
            let task = self.tasks[idx].as_ref();
            order.push(task);

            for down in self.downstream_of(task.task_id()) {
                if let Some(d) = in_degree.get_mut(down) {
                    *d -= 1;
                    if *d == 0 {
                        if let Some(i) = self.index_of(down) {
                            ready.push_back(i);
                        }
                    }
                }
            }
        }

        if order.len() != self.tasks.len() {
            let stuck: Vec<&str> = in_degree
                .iter()
                .filter(|(_, d)| **d > 0)
                .map(|(id, _)| *id)
                .collect();
            return Err(EtlError::DagError {
                message: format!("Cycle detected between tasks: {:?}", stuck),
            });
        }

        Ok(order)
    }

    fn index_of(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.task_id() == task_id)
    }
}

impl std::fmt::Debug for Dag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dag")
            .field("dag_id", &self.dag_id)
            .field("schedule", &self.schedule)
            .field("start_date", &self.start_date)
            .field("catchup", &self.catchup)
            .field("tasks", &self.task_ids())
            .field("edges", &self.edges)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::context::TaskContext;
    use chrono::TimeZone;

    struct NoopTask(&'static str);

    #[async_trait::async_trait]
    impl Task for NoopTask {
        fn task_id(&self) -> &str {
            self.0
        }

        async fn execute(&self, _ctx: &TaskContext<'_>) -> Result<Option<serde_json::Value>> {
            Ok(None)
        }
    }

    fn dag_with(ids: &[&'static str]) -> Dag {
        let mut dag = Dag::new(
            "test_dag",
            "test",
            Schedule::Hourly,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        );
        for id in ids {
            dag.add_task(Box::new(NoopTask(*id))).unwrap();
        }
        dag
    }

    fn order(dag: &Dag) -> Vec<String> {
        dag.topological_order()
            .unwrap()
            .iter()
            .map(|t| t.task_id().to_string())
            .collect()
    }

    #[test]
    fn test_chain_orders_tasks() {
        let mut dag = dag_with(&["summary", "transform", "validate", "extract"]);
        dag.chain(&["extract", "validate", "transform", "summary"]).unwrap();

        assert_eq!(order(&dag), vec!["extract", "validate", "transform", "summary"]);
        assert_eq!(dag.upstream_of("transform"), vec!["validate"]);
        assert_eq!(dag.downstream_of("transform"), vec!["summary"]);
        assert!(dag.upstream_of("extract").is_empty());
    }

    #[test]
    fn test_independent_tasks_keep_insertion_order() {
        let dag = dag_with(&["b", "a", "c"]);
        assert_eq!(order(&dag), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_task_rejected() {
        let mut dag = dag_with(&["extract"]);
        let err = dag.add_task(Box::new(NoopTask("extract"))).unwrap_err();
        assert!(err.to_string().contains("Duplicate task id"));
    }

    #[test]
    fn test_unknown_and_self_edges_rejected() {
        let mut dag = dag_with(&["extract"]);
        assert!(dag.set_downstream("extract", "missing").is_err());
        assert!(dag.set_downstream("extract", "extract").is_err());
    }

    #[test]
    fn test_cycle_detected() {
        let mut dag = dag_with(&["a", "b", "c"]);
        dag.chain(&["a", "b", "c", "a"]).unwrap();

        let Err(err) = dag.topological_order() else {
            panic!("expected a cycle");
        };
        assert!(err.to_string().contains("Cycle detected"));
    }
}
