// Fri Oct 16 2026 - Alex

use crate::engine::error::CombinatorError;
use parking_lot::{Condvar, Mutex};

enum SlotState<T> {
    Empty,
    Filled(Result<T, CombinatorError>),
    Taken,
}

struct Tally<T> {
    state: SlotState<T>,
    failures: usize,
}

/// Single-assignment slot claimed by the first task to report.
///
/// Later posts are ignored. The coordinator blocks in [`WinnerSlot::wait`]
/// until a result is posted, or until every expected task has failed.
pub struct WinnerSlot<T> {
    tally: Mutex<Tally<T>>,
    cvar: Condvar,
    expected: usize,
}

impl<T> WinnerSlot<T> {
    pub fn new(expected: usize) -> Self {
        Self {
            tally: Mutex::new(Tally {
                state: SlotState::Empty,
                failures: 0,
            }),
            cvar: Condvar::new(),
            expected,
        }
    }

    /// Offers a result. Returns `true` if it claimed the slot.
    pub fn post(&self, result: Result<T, CombinatorError>) -> bool {
        let mut tally = self.tally.lock();

        if !matches!(tally.state, SlotState::Empty) {
            return false;
        }

        tally.state = SlotState::Filled(result);
        self.cvar.notify_all();
        true
    }

    /// Counts a failed task. Once every expected task has failed and nothing
    /// claimed the slot, fills it with [`CombinatorError::AllFailed`].
    pub fn fail(&self) -> bool {
        let mut tally = self.tally.lock();
        tally.failures += 1;

        if tally.failures < self.expected || !matches!(tally.state, SlotState::Empty) {
            return false;
        }

        tally.state = SlotState::Filled(Err(CombinatorError::AllFailed(self.expected)));
        self.cvar.notify_all();
        true
    }

    pub fn is_claimed(&self) -> bool {
        !matches!(self.tally.lock().state, SlotState::Empty)
    }

    /// Blocks until the slot is filled and takes the result.
    ///
    /// Returns `None` if another caller already took it.
    pub fn wait(&self) -> Option<Result<T, CombinatorError>> {
        let mut tally = self.tally.lock();

        loop {
            match std::mem::replace(&mut tally.state, SlotState::Taken) {
                SlotState::Empty => {
                    tally.state = SlotState::Empty;
                    self.cvar.wait(&mut tally);
                }
                SlotState::Filled(result) => return Some(result),
                SlotState::Taken => return None,
            }
        }
    }
}
