// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mower lifecycle states decoded from vendor status codes.
//!
//! The vendor protocol is unversioned and new codes appear without notice,
//! so decoding is total: any code missing from the table resolves to
//! [`LifecycleState::Unknown`] carrying the raw value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status codes with a published meaning.
///
/// Gaps in the numbering (4, 11, 12, 14-29) are codes whose meaning has not
/// been identified. They decode to [`LifecycleState::Unknown`].
pub const KNOWN_STATUS_CODES: [i32; 16] = [0, 1, 2, 3, 5, 6, 7, 8, 9, 10, 13, 30, 31, 32, 33, 34];

/// Normalized mower activity phase.
///
/// # Examples
///
/// ```
/// use landroid_lib::types::{LifecycleState, resolve_status};
///
/// assert_eq!(resolve_status(7), LifecycleState::Cutting);
/// assert_eq!(resolve_status(34), LifecycleState::Paused);
/// assert_eq!(resolve_status(99), LifecycleState::Unknown(99));
/// assert_eq!(LifecycleState::Cutting.code(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Stopped in the field (manual stop).
    Idle,
    /// Docked in the charging station.
    Home,
    /// Start sequence running.
    Starting,
    /// Driving out of the charging station.
    LeavingHome,
    /// Searching the border wire to go home.
    SearchingHome,
    /// Searching the border wire.
    SearchingBorder,
    /// Mowing.
    Cutting,
    /// Recovering after being lifted.
    LiftedRecovery,
    /// Recovering after being trapped.
    TrappedRecovery,
    /// Recovering after the blades were blocked.
    BladeBlockedRecovery,
    /// Driving back inside a digital fence.
    FenceEscape,
    /// Following the border wire home.
    FollowingBorderHome,
    /// Following the border wire during zone training.
    FollowingBorderTraining,
    /// Cutting along the border wire.
    FollowingBorderCut,
    /// Following the border wire to a zone starting point.
    FollowingBorderAreaSearch,
    /// Paused by the user.
    Paused,
    /// A status code with no published meaning.
    Unknown(i32),
}

impl LifecycleState {
    /// Returns the vendor status code for this state.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::Idle => 0,
            Self::Home => 1,
            Self::Starting => 2,
            Self::LeavingHome => 3,
            Self::SearchingHome => 5,
            Self::SearchingBorder => 6,
            Self::Cutting => 7,
            Self::LiftedRecovery => 8,
            Self::TrappedRecovery => 9,
            Self::BladeBlockedRecovery => 10,
            Self::FenceEscape => 13,
            Self::FollowingBorderHome => 30,
            Self::FollowingBorderTraining => 31,
            Self::FollowingBorderCut => 32,
            Self::FollowingBorderAreaSearch => 33,
            Self::Paused => 34,
            Self::Unknown(code) => *code,
        }
    }

    /// Returns the short lowercase label used in logs and messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Home => "home",
            Self::Starting => "starting",
            Self::LeavingHome => "leaving home",
            Self::SearchingHome => "searching home",
            Self::SearchingBorder => "searching border",
            Self::Cutting => "cutting",
            Self::LiftedRecovery => "lifted recovery",
            Self::TrappedRecovery => "trapped recovery",
            Self::BladeBlockedRecovery => "blade blocked recovery",
            Self::FenceEscape => "fence escape",
            Self::FollowingBorderHome => "following border home",
            Self::FollowingBorderTraining => "zone training",
            Self::FollowingBorderCut => "cutting border",
            Self::FollowingBorderAreaSearch => "following border to zone",
            Self::Paused => "paused",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Returns a human readable description of the state.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Idle => "Manual stop",
            Self::Home => "Home",
            Self::Starting => "Starting",
            Self::LeavingHome => "Leaving home",
            Self::SearchingHome => "Searching border, going home",
            Self::SearchingBorder => "Searching border",
            Self::Cutting => "Mowing",
            Self::LiftedRecovery => "Recovering from being lifted",
            Self::TrappedRecovery => "Recovering from being trapped",
            Self::BladeBlockedRecovery => "Recovering after blocked blades",
            Self::FenceEscape => "Outside digital fence",
            Self::FollowingBorderHome => "Going home",
            Self::FollowingBorderTraining => "Zone training",
            Self::FollowingBorderCut => "Mowing along border",
            Self::FollowingBorderAreaSearch => "Following border to zone start",
            Self::Paused => "Paused",
            Self::Unknown(_) => "Unknown status",
        }
    }

    /// Returns `true` if the code had no published meaning.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Returns `true` for the `FollowingBorder*` family.
    #[must_use]
    pub const fn is_following_border(&self) -> bool {
        matches!(
            self,
            Self::FollowingBorderHome
                | Self::FollowingBorderTraining
                | Self::FollowingBorderCut
                | Self::FollowingBorderAreaSearch
        )
    }

    /// Returns `true` for the `*Recovery` family.
    #[must_use]
    pub const fn is_recovery(&self) -> bool {
        matches!(
            self,
            Self::LiftedRecovery | Self::TrappedRecovery | Self::BladeBlockedRecovery
        )
    }
}

/// Resolves a vendor status code to a [`LifecycleState`].
///
/// Never fails: unmapped codes resolve to [`LifecycleState::Unknown`].
#[must_use]
pub const fn resolve_status(code: i32) -> LifecycleState {
    match code {
        0 => LifecycleState::Idle,
        1 => LifecycleState::Home,
        2 => LifecycleState::Starting,
        3 => LifecycleState::LeavingHome,
        5 => LifecycleState::SearchingHome,
        6 => LifecycleState::SearchingBorder,
        7 => LifecycleState::Cutting,
        8 => LifecycleState::LiftedRecovery,
        9 => LifecycleState::TrappedRecovery,
        10 => LifecycleState::BladeBlockedRecovery,
        13 => LifecycleState::FenceEscape,
        30 => LifecycleState::FollowingBorderHome,
        31 => LifecycleState::FollowingBorderTraining,
        32 => LifecycleState::FollowingBorderCut,
        33 => LifecycleState::FollowingBorderAreaSearch,
        34 => LifecycleState::Paused,
        other => LifecycleState::Unknown(other),
    }
}

impl From<i32> for LifecycleState {
    fn from(code: i32) -> Self {
        resolve_status(code)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "unknown ({code})"),
            other => f.write_str(other.as_str()),
        }
    }
}
