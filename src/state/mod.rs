// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.
//!
//! A [`DeviceSnapshot`] is the library's best knowledge of one mower. Push
//! messages arrive as [`PartialUpdate`]s carrying only some fields, and
//! [`merge`] folds them into a new snapshot while reporting what changed.
//! [`StateCategory`] classifies lifecycle states, and [`check_command`]
//! guards commands against states in which they make no sense.
//!
//! # Examples
//!
//! ```
//! use landroid_lib::state::{DeviceSnapshot, FieldChange, PartialUpdate, merge};
//! use landroid_lib::types::{DeviceId, ErrorCondition};
//!
//! let snapshot = DeviceSnapshot::new(DeviceId::new("SN1"));
//! let outcome = merge(&snapshot, &PartialUpdate::builder().error(2).build());
//!
//! assert_eq!(outcome.changes, vec![FieldChange::Error(ErrorCondition::Lifted)]);
//! assert!(outcome.transition.is_none());
//! ```

mod field_change;
mod machine;
mod merge;
mod snapshot;
mod update;

pub use field_change::FieldChange;
pub use machine::{Precondition, StateCategory, TransitionKind, check_command, classify_transition};
pub use merge::{MergeOutcome, StateTransition, merge};
pub use snapshot::DeviceSnapshot;
pub use update::{FieldGroup, PartialUpdate, PartialUpdateBuilder};
