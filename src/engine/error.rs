// Fri Oct 16 2026 - Alex

use thiserror::Error;

/// Failure of a single task's computation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("Task panicked: {0}")]
    Panicked(String),
    #[error("Task failed: {0}")]
    Failed(String),
    #[error("Failed to spawn task thread: {0}")]
    Spawn(String),
}

impl TaskError {
    pub fn message(&self) -> &str {
        match self {
            TaskError::Panicked(msg) => msg,
            TaskError::Failed(msg) => msg,
            TaskError::Spawn(msg) => msg,
        }
    }
}

/// Failure of a combinator as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CombinatorError {
    #[error("Task {index} rejected: {source}")]
    Rejected {
        index: usize,
        #[source]
        source: TaskError,
    },
    #[error("All {0} tasks failed")]
    AllFailed(usize),
    #[error("Cannot race an empty set of tasks")]
    Empty,
}

impl CombinatorError {
    pub fn rejected(index: usize, source: TaskError) -> Self {
        CombinatorError::Rejected { index, source }
    }

    /// Position of the task that caused the failure, if a single one did.
    pub fn index(&self) -> Option<usize> {
        match self {
            CombinatorError::Rejected { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn task_error(&self) -> Option<&TaskError> {
        match self {
            CombinatorError::Rejected { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_rejected_display_and_source() {
        let err = CombinatorError::rejected(1, TaskError::Panicked("boom".to_string()));

        assert_eq!(err.to_string(), "Task 1 rejected: Task panicked: boom");
        assert_eq!(err.index(), Some(1));
        assert!(err.source().is_some());
        assert_eq!(err.task_error().map(|e| e.message()), Some("boom"));
    }

    #[test]
    fn test_all_failed_has_no_index() {
        let err = CombinatorError::AllFailed(3);

        assert_eq!(err.to_string(), "All 3 tasks failed");
        assert_eq!(err.index(), None);
        assert!(err.task_error().is_none());
    }
}
