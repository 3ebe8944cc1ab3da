// Fri Oct 16 2026 - Alex

use crate::engine::error::TaskError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal state of a task.
pub type Outcome<T> = Result<T, TaskError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Settlement {
    Fulfilled,
    Rejected,
}

impl Settlement {
    pub fn of<T>(outcome: &Outcome<T>) -> Self {
        match outcome {
            Ok(_) => Settlement::Fulfilled,
            Err(_) => Settlement::Rejected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Settlement::Fulfilled => "fulfilled",
            Settlement::Rejected => "rejected",
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Settlement::Fulfilled)
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Settlement::Rejected)
    }
}

impl fmt::Display for Settlement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for Settlement {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

pub struct SettledSummary {
    pub fulfilled: usize,
    pub rejected: usize,
}

impl SettledSummary {
    pub fn from_settlements(settlements: &[Settlement]) -> Self {
        let fulfilled = settlements.iter().filter(|s| s.is_fulfilled()).count();

        Self {
            fulfilled,
            rejected: settlements.len() - fulfilled,
        }
    }

    pub fn total(&self) -> usize {
        self.fulfilled + self.rejected
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.fulfilled as f64 / self.total() as f64
        }
    }
}
