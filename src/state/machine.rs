// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lifecycle classification and command preconditions.
//!
//! Lifecycle states fall into three categories, plus one for states the
//! library cannot judge:
//!
//! | Category | States |
//! |----------|--------|
//! | [`IdleLike`](StateCategory::IdleLike) | `Idle`, `Home`, `Paused` |
//! | [`Transitional`](StateCategory::Transitional) | `Starting`, `LeavingHome`, `SearchingHome`, `SearchingBorder`, `FenceEscape`, `FollowingBorder*` |
//! | [`ActiveRecovery`](StateCategory::ActiveRecovery) | `Cutting`, `*Recovery` |
//! | [`Indeterminate`](StateCategory::Indeterminate) | `Unknown(_)`, never reported |
//!
//! Preconditions are checked locally before a command reaches the transport.

use serde::{Deserialize, Serialize};

use crate::command::CommandKind;
use crate::error::Error;
use crate::types::LifecycleState;

use super::DeviceSnapshot;

/// Coarse category of a lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateCategory {
    /// Not moving: idle, docked or paused.
    IdleLike,
    /// Moving between activities.
    Transitional,
    /// Mowing or recovering from an incident.
    ActiveRecovery,
    /// Unknown status code, or no status reported yet.
    Indeterminate,
}

impl StateCategory {
    /// Returns the category of an optional state.
    #[must_use]
    pub const fn of(state: Option<LifecycleState>) -> Self {
        match state {
            Some(state) => state.category(),
            None => Self::Indeterminate,
        }
    }
}

impl LifecycleState {
    /// Returns the category of this state.
    #[must_use]
    pub const fn category(&self) -> StateCategory {
        match self {
            Self::Idle | Self::Home | Self::Paused => StateCategory::IdleLike,
            Self::Starting
            | Self::LeavingHome
            | Self::SearchingHome
            | Self::SearchingBorder
            | Self::FenceEscape
            | Self::FollowingBorderHome
            | Self::FollowingBorderTraining
            | Self::FollowingBorderCut
            | Self::FollowingBorderAreaSearch => StateCategory::Transitional,
            Self::Cutting
            | Self::LiftedRecovery
            | Self::TrappedRecovery
            | Self::BladeBlockedRecovery => StateCategory::ActiveRecovery,
            Self::Unknown(_) => StateCategory::Indeterminate,
        }
    }
}

/// What to do with a command that passed its precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Forward the command to the transport.
    Send,
    /// The device is already where the command would take it.
    AlreadySatisfied,
}

/// Checks whether `command` may be issued in the snapshot's current state.
///
/// # Errors
///
/// Returns `Error::InvalidStateTransition` when the precondition fails.
///
/// # Examples
///
/// ```
/// use landroid_lib::command::CommandKind;
/// use landroid_lib::state::{DeviceSnapshot, PartialUpdate, Precondition, check_command, merge};
/// use landroid_lib::types::DeviceId;
///
/// let docked = merge(
///     &DeviceSnapshot::new(DeviceId::new("SN1")),
///     &PartialUpdate::builder().status(1).build(),
/// )
/// .snapshot;
///
/// assert_eq!(check_command(CommandKind::Start, &docked).unwrap(), Precondition::Send);
/// assert_eq!(
///     check_command(CommandKind::Home, &docked).unwrap(),
///     Precondition::AlreadySatisfied
/// );
/// assert!(check_command(CommandKind::Pause, &docked).is_err());
/// ```
pub fn check_command(command: CommandKind, snapshot: &DeviceSnapshot) -> Result<Precondition, Error> {
    let state = snapshot.lifecycle_state();
    let category = StateCategory::of(state);

    let allowed = match command {
        CommandKind::Start => matches!(
            category,
            StateCategory::IdleLike | StateCategory::Indeterminate
        ),
        CommandKind::Pause | CommandKind::PauseOverWire => matches!(
            category,
            StateCategory::Transitional
                | StateCategory::ActiveRecovery
                | StateCategory::Indeterminate
        ),
        CommandKind::Home | CommandKind::SafeHome => {
            if state == Some(LifecycleState::Home) {
                return Ok(Precondition::AlreadySatisfied);
            }
            true
        }
        CommandKind::ZoneTraining | CommandKind::OneTimeSchedule => matches!(
            state,
            Some(LifecycleState::Idle | LifecycleState::Home)
        ),
        CommandKind::SetZone => {
            snapshot.schedule_enabled() != Some(true) || category == StateCategory::IdleLike
        }
        CommandKind::Refresh
        | CommandKind::Lock
        | CommandKind::Unlock
        | CommandKind::Restart
        | CommandKind::SetRainDelay
        | CommandKind::SetSchedule
        | CommandKind::SetPartyMode
        | CommandKind::Raw => true,
    };

    if allowed {
        Ok(Precondition::Send)
    } else {
        Err(Error::InvalidStateTransition { command, state })
    }
}

/// How plausible a lifecycle transition is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionKind {
    /// A normal progression.
    Expected,
    /// Physically implausible, such as a docked mower reporting a recovery.
    Anomalous,
    /// The new state decoded from an unknown status code.
    ProtocolDrift,
}

/// Classifies a lifecycle transition.
///
/// Classification is informational. Every transition is merged regardless.
#[must_use]
pub const fn classify_transition(from: Option<LifecycleState>, to: LifecycleState) -> TransitionKind {
    if to.is_unknown() {
        return TransitionKind::ProtocolDrift;
    }
    match from {
        Some(LifecycleState::Home) if to.is_recovery() => TransitionKind::Anomalous,
        _ => TransitionKind::Expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeviceId;

    fn snapshot_in(state: Option<LifecycleState>) -> DeviceSnapshot {
        let mut snapshot = DeviceSnapshot::new(DeviceId::new("SN1"));
        snapshot.lifecycle_state = state;
        snapshot
    }

    const ALL_STATES: [LifecycleState; 17] = [
        LifecycleState::Idle,
        LifecycleState::Home,
        LifecycleState::Starting,
        LifecycleState::LeavingHome,
        LifecycleState::SearchingHome,
        LifecycleState::SearchingBorder,
        LifecycleState::Cutting,
        LifecycleState::LiftedRecovery,
        LifecycleState::TrappedRecovery,
        LifecycleState::BladeBlockedRecovery,
        LifecycleState::FenceEscape,
        LifecycleState::FollowingBorderHome,
        LifecycleState::FollowingBorderTraining,
        LifecycleState::FollowingBorderCut,
        LifecycleState::FollowingBorderAreaSearch,
        LifecycleState::Paused,
        LifecycleState::Unknown(99),
    ];

    #[test]
    fn categories() {
        assert_eq!(LifecycleState::Paused.category(), StateCategory::IdleLike);
        assert_eq!(
            LifecycleState::FollowingBorderCut.category(),
            StateCategory::Transitional
        );
        assert_eq!(
            LifecycleState::BladeBlockedRecovery.category(),
            StateCategory::ActiveRecovery
        );
        assert_eq!(
            LifecycleState::Unknown(4).category(),
            StateCategory::Indeterminate
        );
        assert_eq!(StateCategory::of(None), StateCategory::Indeterminate);
    }

    #[test]
    fn start_only_from_idle_like() {
        for state in ALL_STATES {
            let result = check_command(CommandKind::Start, &snapshot_in(Some(state)));
            match state.category() {
                StateCategory::IdleLike | StateCategory::Indeterminate => {
                    assert_eq!(result.unwrap(), Precondition::Send, "{state}");
                }
                _ => assert!(
                    matches!(result, Err(Error::InvalidStateTransition { .. })),
                    "{state}"
                ),
            }
        }
    }

    #[test]
    fn pause_only_while_moving() {
        assert!(check_command(CommandKind::Pause, &snapshot_in(Some(LifecycleState::Cutting))).is_ok());
        assert!(check_command(CommandKind::Pause, &snapshot_in(Some(LifecycleState::LeavingHome))).is_ok());
        assert!(check_command(CommandKind::Pause, &snapshot_in(Some(LifecycleState::Paused))).is_err());
        assert!(check_command(CommandKind::Pause, &snapshot_in(Some(LifecycleState::Home))).is_err());
    }

    #[test]
    fn home_is_noop_when_home() {
        for state in ALL_STATES {
            let result = check_command(CommandKind::Home, &snapshot_in(Some(state))).unwrap();
            if state == LifecycleState::Home {
                assert_eq!(result, Precondition::AlreadySatisfied);
            } else {
                assert_eq!(result, Precondition::Send, "{state}");
            }
        }
    }

    #[test]
    fn zone_training_requires_idle_or_home() {
        for state in ALL_STATES {
            let result = check_command(CommandKind::ZoneTraining, &snapshot_in(Some(state)));
            let expected_ok = matches!(state, LifecycleState::Idle | LifecycleState::Home);
            assert_eq!(result.is_ok(), expected_ok, "{state}");
        }
        assert!(check_command(CommandKind::OneTimeSchedule, &snapshot_in(None)).is_err());
    }

    #[test]
    fn zone_training_rejected_while_cutting() {
        let err = check_command(
            CommandKind::ZoneTraining,
            &snapshot_in(Some(LifecycleState::Cutting)),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidStateTransition {
                command: CommandKind::ZoneTraining,
                state: Some(LifecycleState::Cutting)
            }
        ));
    }

    #[test]
    fn set_zone_blocked_by_running_schedule() {
        let mut snapshot = snapshot_in(Some(LifecycleState::Cutting));
        snapshot.schedule_enabled = Some(true);
        assert!(check_command(CommandKind::SetZone, &snapshot).is_err());

        snapshot.schedule_enabled = Some(false);
        assert!(check_command(CommandKind::SetZone, &snapshot).is_ok());

        snapshot.schedule_enabled = Some(true);
        snapshot.lifecycle_state = Some(LifecycleState::Home);
        assert!(check_command(CommandKind::SetZone, &snapshot).is_ok());
    }

    #[test]
    fn unrestricted_commands() {
        let snapshot = snapshot_in(Some(LifecycleState::TrappedRecovery));
        for kind in [
            CommandKind::Refresh,
            CommandKind::Lock,
            CommandKind::Unlock,
            CommandKind::Restart,
            CommandKind::SetRainDelay,
            CommandKind::SetSchedule,
            CommandKind::SetPartyMode,
            CommandKind::Raw,
        ] {
            assert_eq!(check_command(kind, &snapshot).unwrap(), Precondition::Send);
        }
    }

    #[test]
    fn transition_classification() {
        assert_eq!(
            classify_transition(Some(LifecycleState::Idle), LifecycleState::Cutting),
            TransitionKind::Expected
        );
        assert_eq!(
            classify_transition(Some(LifecycleState::Home), LifecycleState::LiftedRecovery),
            TransitionKind::Anomalous
        );
        assert_eq!(
            classify_transition(Some(LifecycleState::Cutting), LifecycleState::Unknown(99)),
            TransitionKind::ProtocolDrift
        );
        assert_eq!(
            classify_transition(None, LifecycleState::Home),
            TransitionKind::Expected
        );
    }
}
