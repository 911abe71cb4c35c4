//! Door state machine.
//!
//! The door re-reports its status periodically, so most responses repeat
//! what the host already knows. [`DoorStateMachine::observe`] filters those
//! out: it yields a new [`DoorState`] only when the reported state differs
//! from the one currently held, so consumers see each change exactly once.
//!
//! There are no forbidden transitions. The door is authoritative and any
//! reported state replaces the held one, even if the jump looks unusual
//! (for example `Locked` straight to `Open` after a missed byte).
//!
//! # Examples
//!
//! ```
//! use doorlink_protocol::{DoorState, DoorStateMachine, ResponseCode};
//!
//! let mut machine = DoorStateMachine::new();
//! assert_eq!(machine.current(), DoorState::Unknown);
//!
//! assert_eq!(machine.observe(ResponseCode::Open), Some(DoorState::Open));
//! assert_eq!(machine.observe(ResponseCode::Open), None); // duplicate
//! assert_eq!(machine.observe(ResponseCode::Closed), Some(DoorState::Closed));
//!
//! machine.reset();
//! assert_eq!(machine.current(), DoorState::Unknown);
//! ```
//!
//! # Concurrency
//!
//! The machine is a plain value with no interior locking. A session owns
//! it inside its read loop and is the only code that mutates it.

use crate::{DoorState, ResponseCode};

/// Tracks the door state reported over one session.
#[derive(Debug, Clone, Default)]
pub struct DoorStateMachine {
    current: DoorState,
    changes: u64,
    duplicates: u64,
}

impl DoorStateMachine {
    /// Create a machine in [`DoorState::Unknown`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one decoded response.
    ///
    /// Returns the new state if it differs from the held one, `None` for a
    /// repeat of the current state.
    pub fn observe(&mut self, code: ResponseCode) -> Option<DoorState> {
        let next = DoorState::from(code);
        if next == self.current {
            self.duplicates += 1;
            return None;
        }

        self.current = next;
        self.changes += 1;
        Some(next)
    }

    /// Forget everything, back to [`DoorState::Unknown`].
    pub fn reset(&mut self) {
        self.current = DoorState::Unknown;
        self.changes = 0;
        self.duplicates = 0;
    }

    /// Currently held state.
    #[must_use]
    pub fn current(&self) -> DoorState {
        self.current
    }

    /// Number of state changes since creation or the last reset.
    #[must_use]
    pub fn change_count(&self) -> u64 {
        self.changes
    }

    /// Number of responses suppressed as duplicates.
    #[must_use]
    pub fn duplicate_count(&self) -> u64 {
        self.duplicates
    }
}
