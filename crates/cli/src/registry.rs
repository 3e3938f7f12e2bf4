use crate::config::AppConfig;
use crate::report::RunReport;
use crate::tasks::{ProjectRecommendTask, UserRecommendTask};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A batch task reachable by name from the command line.
#[async_trait]
pub trait DataTask: Send + Sync {
    fn name(&self) -> &'static str;

    /// Roles of the input files, in the order they must be passed.
    fn input_roles(&self) -> &'static [&'static str];

    fn min_inputs(&self) -> usize {
        self.input_roles().len()
    }

    async fn run(&self, inputs: &[PathBuf], output: &Path, arg: Option<&str>) -> Result<RunReport>;
}

/// Name -> task lookup, filled once at start-up.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<String, Arc<dyn DataTask>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `UserRecommend` and `ProjectRecommend`.
    pub fn with_builtin(config: &AppConfig, workers: usize) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(UserRecommendTask::new(config.user, workers)))?;
        registry.register(Arc::new(ProjectRecommendTask::new(config.project, workers)))?;
        Ok(registry)
    }

    pub fn register(&mut self, task: Arc<dyn DataTask>) -> Result<()> {
        let name = task.name();
        if self.tasks.contains_key(name) {
            bail!("Task {name} is already registered");
        }
        self.tasks.insert(name.to_string(), task);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn DataTask>> {
        self.tasks.get(name).cloned().ok_or_else(|| {
            anyhow!(
                "Unknown task {name:?} (available: {})",
                self.names().join("|")
            )
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.tasks.keys().map(String::as_str).collect()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Arc<dyn DataTask>> {
        self.tasks.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_tasks_are_registered_once() {
        let registry = TaskRegistry::with_builtin(&AppConfig::default(), 1).unwrap();
        assert_eq!(registry.names(), vec!["ProjectRecommend", "UserRecommend"]);
        assert_eq!(registry.resolve("UserRecommend").unwrap().min_inputs(), 5);
        assert_eq!(registry.resolve("ProjectRecommend").unwrap().min_inputs(), 4);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let config = AppConfig::default();
        let mut registry = TaskRegistry::with_builtin(&config, 1).unwrap();
        let err = registry
            .register(Arc::new(UserRecommendTask::new(config.user, 1)))
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn unknown_task_lists_the_known_ones() {
        let registry = TaskRegistry::with_builtin(&AppConfig::default(), 1).unwrap();
        let err = match registry.resolve("Nope") {
            Ok(_) => panic!("expected unknown task"),
            Err(err) => err.to_string(),
        };
        assert!(err.contains("Nope"));
        assert!(err.contains("ProjectRecommend|UserRecommend"));
    }
}
