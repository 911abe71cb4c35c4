//! Host-side belief about the door.
//!
//! [`DoorState`] is only ever as current as the last response the door
//! sent. Writing a command does not change it; the door reports the result
//! and the state follows.
//!
//! # Controls
//!
//! The controller front end offers three controls whose availability
//! depends on the reported state:
//!
//! | State       | Timed open | Hold / close      | Lock / unlock    |
//! |-------------|------------|-------------------|------------------|
//! | Unknown     | yes        | HoldOpen          | Lock             |
//! | Timed       | -          | -                 | -                |
//! | Open        | -          | Close             | -                |
//! | Closed      | yes        | HoldOpen          | Lock             |
//! | Locked      | -          | -                 | Unlock           |
//! | Unlocked    | yes        | HoldOpen          | Lock             |
//!
//! This is advisory. Nothing in the link refuses a command because of it.

use crate::{Command, ResponseCode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the door is currently doing, as far as the host knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    /// Nothing reported since the session started.
    #[default]
    Unknown,
    /// Timed open cycle running.
    Timed,
    /// Held open.
    Open,
    /// Closed.
    Closed,
    /// Locked.
    Locked,
    /// Unlocked.
    Unlocked,
}

impl DoorState {
    /// Commands a front end should offer in this state.
    #[must_use]
    pub fn available_commands(self) -> &'static [Command] {
        match self {
            DoorState::Timed => &[],
            DoorState::Open => &[Command::Close],
            DoorState::Locked => &[Command::Unlock],
            DoorState::Unknown | DoorState::Closed | DoorState::Unlocked => {
                &[Command::TimedOpen, Command::HoldOpen, Command::Lock]
            }
        }
    }

    /// Returns `true` if `command` is offered in this state.
    #[must_use]
    pub fn allows(self, command: Command) -> bool {
        self.available_commands().contains(&command)
    }

    /// Command behind the hold/close toggle.
    #[must_use]
    pub fn hold_toggle(self) -> Command {
        match self {
            DoorState::Open => Command::Close,
            _ => Command::HoldOpen,
        }
    }

    /// Command behind the lock/unlock toggle.
    #[must_use]
    pub fn lock_toggle(self) -> Command {
        match self {
            DoorState::Locked => Command::Unlock,
            _ => Command::Lock,
        }
    }

    /// Returns `true` until the door has reported anything.
    #[inline]
    #[must_use]
    pub fn is_unknown(self) -> bool {
        matches!(self, DoorState::Unknown)
    }
}

impl From<ResponseCode> for DoorState {
    fn from(code: ResponseCode) -> Self {
        match code {
            ResponseCode::Timed => DoorState::Timed,
            ResponseCode::Open => DoorState::Open,
            ResponseCode::Closed => DoorState::Closed,
            ResponseCode::Locked => DoorState::Locked,
            ResponseCode::Unlocked => DoorState::Unlocked,
        }
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DoorState::Unknown => "Unknown",
            DoorState::Timed => "Timed",
            DoorState::Open => "Open",
            DoorState::Closed => "Closed",
            DoorState::Locked => "Locked",
            DoorState::Unlocked => "Unlocked",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_is_unknown() {
        assert_eq!(DoorState::default(), DoorState::Unknown);
        assert!(DoorState::default().is_unknown());
    }

    #[rstest]
    #[case(ResponseCode::Timed, DoorState::Timed)]
    #[case(ResponseCode::Open, DoorState::Open)]
    #[case(ResponseCode::Closed, DoorState::Closed)]
    #[case(ResponseCode::Locked, DoorState::Locked)]
    #[case(ResponseCode::Unlocked, DoorState::Unlocked)]
    fn test_from_response(#[case] code: ResponseCode, #[case] expected: DoorState) {
        assert_eq!(DoorState::from(code), expected);
    }

    #[test]
    fn test_no_response_maps_to_unknown() {
        for code in ResponseCode::ALL {
            assert_ne!(DoorState::from(code), DoorState::Unknown);
        }
    }

    #[test]
    fn test_timed_offers_nothing() {
        assert!(DoorState::Timed.available_commands().is_empty());
        for command in Command::ALL {
            assert!(!DoorState::Timed.allows(command));
        }
    }

    #[test]
    fn test_open_only_closes() {
        assert_eq!(DoorState::Open.available_commands(), &[Command::Close]);
        assert_eq!(DoorState::Open.hold_toggle(), Command::Close);
    }

    #[test]
    fn test_locked_only_unlocks() {
        assert_eq!(DoorState::Locked.available_commands(), &[Command::Unlock]);
        assert_eq!(DoorState::Locked.lock_toggle(), Command::Unlock);
    }

    #[rstest]
    #[case(DoorState::Unknown)]
    #[case(DoorState::Closed)]
    #[case(DoorState::Unlocked)]
    fn test_idle_states_offer_full_controls(#[case] state: DoorState) {
        assert!(state.allows(Command::TimedOpen));
        assert!(state.allows(Command::HoldOpen));
        assert!(state.allows(Command::Lock));
        assert!(!state.allows(Command::Unlock));
        assert_eq!(state.hold_toggle(), Command::HoldOpen);
        assert_eq!(state.lock_toggle(), Command::Lock);
    }
}
