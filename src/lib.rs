// Fri Oct 16 2026 - Alex

//! Thread-backed promise combinators.
//!
//! Build [`Task`]s from closures, then combine them with [`all`],
//! [`all_settled`], [`any`] or [`race`]. Each task runs on its own thread and
//! a panic inside it settles the task as rejected instead of unwinding into
//! the caller.
//!
//! ```
//! use thread_promise::{race, Task};
//! use std::{thread, time::Duration};
//!
//! let slow = Task::new(|| { thread::sleep(Duration::from_millis(100)); "hello" });
//! let fast = Task::new(|| { thread::sleep(Duration::from_millis(10)); "world" });
//!
//! assert_eq!(race(&[slow, fast]), Ok("world"));
//! ```

pub mod config;
pub mod engine;
pub mod utils;

pub use config::{Config, ConfigError};
pub use engine::{
    all, all_settled, all_settled_outcomes, any, race,
    CombinatorError, Engine, Outcome, Settlement, Task, TaskError, WaitGroup,
};
