// Fri Oct 16 2026 - Alex

use crate::config::Config;
use crate::engine::barrier::WaitGroup;
use crate::engine::error::CombinatorError;
use crate::engine::result::{Outcome, Settlement};
use crate::engine::slot::WinnerSlot;
use crate::engine::task::Task;
use crate::utils::logging::ScopedTimer;
use std::sync::Arc;

/// Runs groups of tasks concurrently and combines their outcomes.
///
/// `all` and `all_settled` wait for every task. `any` and `race` return as
/// soon as their result is decided; the remaining tasks keep running in the
/// background and their outcomes stay observable on the task handles.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: Config,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Every value in input order, or the failure of the lowest-indexed
    /// failing task.
    pub fn all<T>(&self, tasks: &[Task<T>]) -> Result<Vec<T>, CombinatorError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let _timer = ScopedTimer::new("all");
        self.launch_and_wait(tasks);

        let mut values = Vec::with_capacity(tasks.len());
        for (index, task) in tasks.iter().enumerate() {
            match task.wait() {
                Ok(value) => values.push(value.clone()),
                Err(e) => {
                    log::debug!("all: task {} rejected, {} tasks total", index, tasks.len());
                    return Err(CombinatorError::rejected(index, e.clone()));
                }
            }
        }

        Ok(values)
    }

    pub fn all_settled<T>(&self, tasks: &[Task<T>]) -> Vec<Settlement>
    where
        T: Send + Sync + 'static,
    {
        let _timer = ScopedTimer::new("all_settled");
        self.launch_and_wait(tasks);

        tasks.iter()
            .map(|task| Settlement::of(task.wait()))
            .collect()
    }

    pub fn all_settled_outcomes<T>(&self, tasks: &[Task<T>]) -> Vec<Outcome<T>>
    where
        T: Clone + Send + Sync + 'static,
    {
        let _timer = ScopedTimer::new("all_settled_outcomes");
        self.launch_and_wait(tasks);

        tasks.iter()
            .map(|task| task.wait().clone())
            .collect()
    }

    /// Value of the first task to succeed. Fails only once every task failed.
    pub fn any<T>(&self, tasks: &[Task<T>]) -> Result<T, CombinatorError>
    where
        T: Clone + Send + Sync + 'static,
    {
        if tasks.is_empty() {
            return Err(CombinatorError::AllFailed(0));
        }

        let _timer = ScopedTimer::new("any");
        let slot = Arc::new(WinnerSlot::new(tasks.len()));

        for task in tasks {
            let slot = slot.clone();
            task.on_settle(move |outcome| match outcome {
                Ok(value) => {
                    // skip the clone once a winner exists
                    if !slot.is_claimed() {
                        slot.post(Ok(value.clone()));
                    }
                }
                Err(_) => {
                    slot.fail();
                }
            });
            task.execute_with(&self.config);
        }

        slot.wait()
            .unwrap_or(Err(CombinatorError::AllFailed(tasks.len())))
    }

    /// Result of the first task to settle, success or failure.
    pub fn race<T>(&self, tasks: &[Task<T>]) -> Result<T, CombinatorError>
    where
        T: Clone + Send + Sync + 'static,
    {
        if tasks.is_empty() {
            return Err(CombinatorError::Empty);
        }

        let _timer = ScopedTimer::new("race");
        let slot = Arc::new(WinnerSlot::new(tasks.len()));

        for (index, task) in tasks.iter().enumerate() {
            let slot = slot.clone();
            task.on_settle(move |outcome| {
                // skip the clone once a winner exists
                if slot.is_claimed() {
                    return;
                }
                let result = match outcome {
                    Ok(value) => Ok(value.clone()),
                    Err(e) => Err(CombinatorError::rejected(index, e.clone())),
                };
                if slot.post(result) {
                    log::debug!("race: task {} settled first", index);
                }
            });
            task.execute_with(&self.config);
        }

        slot.wait()
            .unwrap_or(Err(CombinatorError::Empty))
    }

    fn launch_and_wait<T>(&self, tasks: &[Task<T>])
    where
        T: Send + Sync + 'static,
    {
        let group = WaitGroup::new();

        for task in tasks {
            task.execute_in_with(&group, &self.config);
        }

        log::debug!("Waiting on {} tasks", tasks.len());
        group.wait();
    }
}
