// Fri Oct 16 2026 - Alex

pub mod barrier;
pub mod core;
pub mod error;
pub mod result;
pub(crate) mod slot;
pub mod task;

pub use self::core::Engine;
pub use barrier::WaitGroup;
pub use error::{CombinatorError, TaskError};
pub use result::{Outcome, SettledSummary, Settlement};
pub use task::Task;

pub fn all<T>(tasks: &[Task<T>]) -> Result<Vec<T>, CombinatorError>
where
    T: Clone + Send + Sync + 'static,
{
    Engine::default().all(tasks)
}

pub fn all_settled<T>(tasks: &[Task<T>]) -> Vec<Settlement>
where
    T: Send + Sync + 'static,
{
    Engine::default().all_settled(tasks)
}

pub fn all_settled_outcomes<T>(tasks: &[Task<T>]) -> Vec<Outcome<T>>
where
    T: Clone + Send + Sync + 'static,
{
    Engine::default().all_settled_outcomes(tasks)
}

pub fn any<T>(tasks: &[Task<T>]) -> Result<T, CombinatorError>
where
    T: Clone + Send + Sync + 'static,
{
    Engine::default().any(tasks)
}

pub fn race<T>(tasks: &[Task<T>]) -> Result<T, CombinatorError>
where
    T: Clone + Send + Sync + 'static,
{
    Engine::default().race(tasks)
}
