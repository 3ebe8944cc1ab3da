// Fri Oct 16 2026 - Alex

use crate::config::Config;
use crate::engine::barrier::WaitGroup;
use crate::engine::error::TaskError;
use crate::engine::result::{Outcome, Settlement};
use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

type Job<T> = Box<dyn FnOnce() -> Outcome<T> + Send + 'static>;
type Listener<T> = Box<dyn FnOnce(&Outcome<T>) + Send + 'static>;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct TaskInner<T> {
    id: u64,
    name: Option<String>,
    job: Mutex<Option<Job<T>>>,
    outcome: OnceCell<Outcome<T>>,
    listeners: Mutex<Vec<Listener<T>>>,
    settled: Condvar,
}

/// A computation that runs once on its own thread and settles to an [`Outcome`].
///
/// `Task` is a handle: clones share the same computation and outcome. A panic
/// raised by the computation is caught on the task thread and stored as
/// [`TaskError::Panicked`].
pub struct Task<T> {
    inner: Arc<TaskInner<T>>,
}

impl<T: Send + Sync + 'static> Task<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self::from_job(None, Box::new(move || Ok(f())))
    }

    pub fn named<F>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        Self::from_job(Some(name.into()), Box::new(move || Ok(f())))
    }

    /// Builds a task whose computation reports failure through `Err`.
    pub fn fallible<F, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        E: fmt::Display,
    {
        Self::from_job(None, Box::new(move || f().map_err(|e| TaskError::Failed(e.to_string()))))
    }

    fn from_job(name: Option<String>, job: Job<T>) -> Self {
        Self {
            inner: Arc::new(TaskInner {
                id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
                name,
                job: Mutex::new(Some(job)),
                outcome: OnceCell::new(),
                listeners: Mutex::new(Vec::new()),
                settled: Condvar::new(),
            }),
        }
    }

    pub fn execute(&self) -> bool {
        self.execute_with(&Config::default())
    }

    /// Launches the computation on a new thread without blocking.
    ///
    /// Returns `false` if the task was already launched; the computation
    /// never runs twice.
    pub fn execute_with(&self, config: &Config) -> bool {
        let job = match self.inner.job.lock().take() {
            Some(job) => job,
            None => return false,
        };

        let mut builder = thread::Builder::new()
            .name(config.thread_name(self.inner.id, self.inner.name.as_deref()));

        if let Some(size) = config.stack_size {
            builder = builder.stack_size(size);
        }

        log::debug!("Launching task {}", self.label());

        let inner = self.inner.clone();
        let log_panics = config.log_panics;

        let spawned = builder.spawn(move || {
            let outcome = run_guarded(job);

            if log_panics {
                if let Err(TaskError::Panicked(msg)) = &outcome {
                    log::warn!("Task {} panicked: {}", inner.label(), msg);
                }
            }

            inner.settle(outcome);
        });

        if let Err(e) = spawned {
            log::warn!("Failed to spawn thread for task {}: {}", self.label(), e);
            self.inner.settle(Err(TaskError::Spawn(e.to_string())));
        }

        true
    }

    pub fn execute_in(&self, group: &WaitGroup) -> bool {
        self.execute_in_with(group, &Config::default())
    }

    /// Launches the task holding one unit of `group`, released once settled.
    pub fn execute_in_with(&self, group: &WaitGroup, config: &Config) -> bool {
        let unit = group.clone();
        self.on_settle(move |_| drop(unit));
        self.execute_with(config)
    }

    /// Runs `f` exactly once with the outcome.
    ///
    /// If the task has already settled, `f` runs immediately on the calling
    /// thread. Otherwise it runs on the task thread right after settling.
    pub fn on_settle<F>(&self, f: F)
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        {
            let mut listeners = self.inner.listeners.lock();
            if self.inner.outcome.get().is_none() {
                listeners.push(Box::new(f));
                return;
            }
        }

        if let Some(outcome) = self.inner.outcome.get() {
            notify(&self.label(), Box::new(f), outcome);
        }
    }
}

impl<T> Task<T> {
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn is_started(&self) -> bool {
        self.inner.job.lock().is_none()
    }

    pub fn is_settled(&self) -> bool {
        self.inner.outcome.get().is_some()
    }

    pub fn outcome(&self) -> Option<&Outcome<T>> {
        self.inner.outcome.get()
    }

    pub fn value(&self) -> Option<&T> {
        self.outcome().and_then(|o| o.as_ref().ok())
    }

    pub fn error(&self) -> Option<&TaskError> {
        self.outcome().and_then(|o| o.as_ref().err())
    }

    pub fn settlement(&self) -> Option<Settlement> {
        self.outcome().map(Settlement::of)
    }

    /// Blocks until the task settles. Never returns for a task that is not
    /// executed by someone.
    pub fn wait(&self) -> &Outcome<T> {
        if let Some(outcome) = self.inner.outcome.get() {
            return outcome;
        }

        let mut guard = self.inner.listeners.lock();
        loop {
            if let Some(outcome) = self.inner.outcome.get() {
                return outcome;
            }
            self.inner.settled.wait(&mut guard);
        }
    }

    fn label(&self) -> String {
        self.inner.label()
    }
}

impl<T> TaskInner<T> {
    fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("#{} ({})", self.id, name),
            None => format!("#{}", self.id),
        }
    }

    fn settle(&self, outcome: Outcome<T>) {
        if self.outcome.set(outcome).is_err() {
            return;
        }

        log::trace!("Task {} settled", self.label());

        let listeners = {
            let mut guard = self.listeners.lock();
            self.settled.notify_all();
            std::mem::take(&mut *guard)
        };

        if let Some(outcome) = self.outcome.get() {
            let label = self.label();
            for listener in listeners {
                notify(&label, listener, outcome);
            }
        }
    }
}

impl<T> Clone for Task<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("started", &self.is_started())
            .field("settlement", &self.settlement())
            .finish()
    }
}

fn run_guarded<T>(job: Job<T>) -> Outcome<T> {
    match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(outcome) => outcome,
        Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
    }
}

// A panicking listener must not keep the others from running.
fn notify<T>(label: &str, listener: Listener<T>, outcome: &Outcome<T>) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || listener(outcome))) {
        log::warn!("Settle listener for task {} panicked: {}", label, panic_message(payload.as_ref()));
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(err) = payload.downcast_ref::<TaskError>() {
        err.message().to_string()
    } else if let Some(err) = payload.downcast_ref::<Box<dyn std::error::Error + Send + Sync>>() {
        err.to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn quiet() -> Config {
        Config::new().with_log_panics(false)
    }

    #[test]
    fn test_task_returns_value() {
        let task = Task::new(|| true);
        assert!(task.execute());

        assert_eq!(task.wait(), &Ok(true));
        assert_eq!(task.value(), Some(&true));
        assert_eq!(task.settlement(), Some(Settlement::Fulfilled));
    }

    #[test]
    fn test_panic_becomes_failure() {
        let task: Task<i32> = Task::new(|| panic!("Promise rejected"));
        task.execute_with(&quiet());

        assert_eq!(task.wait(), &Err(TaskError::Panicked("Promise rejected".to_string())));
        assert_eq!(task.settlement(), Some(Settlement::Rejected));
    }

    #[test]
    fn test_formatted_panic_message() {
        let task: Task<()> = Task::new(|| panic!("code {}", 7));
        task.execute_with(&quiet());

        assert_eq!(task.wait().as_ref().unwrap_err().message(), "code 7");
    }

    #[test]
    fn test_panic_with_task_error_payload() {
        let task: Task<()> = Task::new(|| {
            std::panic::panic_any(TaskError::Failed("Promise rejected".to_string()))
        });
        task.execute_with(&quiet());

        assert_eq!(task.wait().as_ref().unwrap_err().message(), "Promise rejected");
    }

    #[test]
    fn test_panic_with_boxed_error_payload() {
        let task: Task<()> = Task::new(|| {
            let err: Box<dyn std::error::Error + Send + Sync> = "Promise rejected".into();
            std::panic::panic_any(err)
        });
        task.execute_with(&quiet());

        assert_eq!(task.wait(), &Err(TaskError::Panicked("Promise rejected".to_string())));
    }

    #[test]
    fn test_unknown_payload() {
        let task: Task<()> = Task::new(|| std::panic::panic_any(42u8));
        task.execute_with(&quiet());

        assert_eq!(task.wait(), &Err(TaskError::Panicked("unknown panic payload".to_string())));
    }

    #[test]
    fn test_fallible_task_error() {
        let task: Task<u32> = Task::fallible(|| "x".parse::<u32>());
        task.execute();

        assert!(matches!(task.wait(), Err(TaskError::Failed(_))));
    }

    #[test]
    fn test_execute_runs_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let task = Task::new(move || counter.fetch_add(1, Ordering::SeqCst));

        assert!(task.execute());
        assert!(!task.execute());
        assert!(!task.clone().execute());
        task.wait();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(task.is_started());
    }

    #[test]
    fn test_execute_does_not_block() {
        let task = Task::new(|| {
            thread::sleep(Duration::from_millis(100));
            1
        });

        task.execute();
        assert!(!task.is_settled());
        assert_eq!(task.wait(), &Ok(1));
    }

    #[test]
    fn test_outcome_is_stable() {
        let task = Task::new(|| String::from("hello"));
        task.execute();

        let first = task.wait().clone();
        for _ in 0..3 {
            assert_eq!(task.wait(), &first);
            assert_eq!(task.outcome(), Some(&first));
        }
    }

    #[test]
    fn test_on_settle_before_and_after() {
        let calls = Arc::new(AtomicUsize::new(0));
        let task = Task::new(|| {
            thread::sleep(Duration::from_millis(20));
            5
        });

        let before = calls.clone();
        task.on_settle(move |outcome| {
            assert_eq!(outcome, &Ok(5));
            before.fetch_add(1, Ordering::SeqCst);
        });

        task.execute();
        task.wait();

        let after = calls.clone();
        task.on_settle(move |_| {
            after.fetch_add(1, Ordering::SeqCst);
        });

        // the first listener runs on the task thread after the outcome is stored
        for _ in 0..100 {
            if calls.load(Ordering::SeqCst) == 2 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_execute_in_signals_group() {
        let group = WaitGroup::new();
        let tasks: Vec<Task<usize>> = (0..3)
            .map(|i| Task::new(move || {
                thread::sleep(Duration::from_millis(10 * i as u64));
                i
            }))
            .collect();

        for task in &tasks {
            task.execute_in(&group);
        }
        group.wait();

        assert!(tasks.iter().all(|t| t.is_settled()));
    }

    #[test]
    fn test_spawn_failure_settles_as_rejected() {
        let task = Task::new(|| 1);
        let config = quiet().with_stack_size(usize::MAX / 2);

        assert!(task.execute_with(&config));
        assert!(task.is_settled());
        assert!(matches!(task.wait(), Err(TaskError::Spawn(_))));
    }

    #[test]
    fn test_panicking_listener_does_not_skip_others() {
        let calls = Arc::new(AtomicUsize::new(0));
        let task = Task::new(|| {
            thread::sleep(Duration::from_millis(20));
            3
        });

        task.on_settle(|_| panic!("listener bug"));
        let counter = calls.clone();
        task.on_settle(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        task.execute_with(&quiet());
        task.wait();

        for _ in 0..100 {
            if calls.load(Ordering::SeqCst) == 1 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // already settled: runs on this thread, and the panic stays contained
        task.on_settle(|_| panic!("late listener bug"));
        assert_eq!(task.wait(), &Ok(3));
    }

    #[test]
    fn test_named_task_thread() {
        let task = Task::named("fetch", || thread::current().name().map(str::to_string));
        task.execute_with(&Config::new().with_thread_name_prefix("pool"));

        assert_eq!(task.name(), Some("fetch"));
        assert_eq!(task.wait(), &Ok(Some("pool-fetch".to_string())));
    }
}
