// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Zone selection.
//!
//! The mower walks a sequence of zone numbers (`mzv`) and keeps an index
//! into it. Selecting a zone for the next task means rotating the sequence
//! until the requested zone sits at the current index.

use crate::error::ValueError;

/// Number of zone starting points a mower supports.
pub(crate) const MAX_ZONES: u8 = 4;

/// Rotates `sequence` left until `sequence[index] == zone`.
///
/// Zones other than zone 0 must have a non-zero starting point in `starts`;
/// zone 0 always starts at the charging station.
///
/// # Errors
///
/// - `ValueError::OutOfRange` if `zone` is not 0-3
/// - `ValueError::UndefinedZone` if the zone has no starting point or never
///   appears in the sequence
///
/// # Examples
///
/// ```
/// use landroid_lib::command::rotate_zone_sequence;
///
/// let sequence = [0, 0, 1, 1, 0, 0, 1, 1, 0, 0];
/// let rotated = rotate_zone_sequence(&sequence, &[0, 40, 0, 0], 0, 1).unwrap();
/// assert_eq!(rotated[0], 1);
/// ```
pub fn rotate_zone_sequence(
    sequence: &[u8],
    starts: &[u16],
    index: u8,
    zone: u8,
) -> Result<Vec<u8>, ValueError> {
    if zone >= MAX_ZONES {
        return Err(ValueError::OutOfRange {
            min: 0,
            max: i64::from(MAX_ZONES - 1),
            actual: i64::from(zone),
        });
    }

    if zone > 0 && starts.get(usize::from(zone)).copied().unwrap_or(0) == 0 {
        return Err(ValueError::UndefinedZone(zone));
    }

    let index = usize::from(index);
    if index >= sequence.len() {
        return Err(ValueError::OutOfRange {
            min: 0,
            max: i64::try_from(sequence.len()).unwrap_or(i64::MAX) - 1,
            actual: i64::try_from(index).unwrap_or(i64::MAX),
        });
    }

    let mut rotated = sequence.to_vec();
    for _ in 0..sequence.len() {
        if rotated[index] == zone {
            return Ok(rotated);
        }
        rotated.rotate_left(1);
    }

    Err(ValueError::UndefinedZone(zone))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEQUENCE: [u8; 10] = [0, 0, 1, 1, 2, 2, 0, 0, 1, 1];
    const STARTS: [u16; 4] = [0, 35, 80, 0];

    #[test]
    fn already_in_place_is_unchanged() {
        let rotated = rotate_zone_sequence(&SEQUENCE, &STARTS, 2, 1).unwrap();
        assert_eq!(rotated, SEQUENCE.to_vec());
    }

    #[test]
    fn rotates_until_zone_at_index() {
        let rotated = rotate_zone_sequence(&SEQUENCE, &STARTS, 0, 2).unwrap();
        assert_eq!(rotated, vec![2, 2, 0, 0, 1, 1, 0, 0, 1, 1]);
    }

    #[test]
    fn zone_without_start_is_rejected() {
        assert_eq!(
            rotate_zone_sequence(&SEQUENCE, &STARTS, 0, 3),
            Err(ValueError::UndefinedZone(3))
        );
    }

    #[test]
    fn zone_missing_from_sequence_is_rejected() {
        let starts = [0, 35, 80, 120];
        assert_eq!(
            rotate_zone_sequence(&SEQUENCE, &starts, 0, 3),
            Err(ValueError::UndefinedZone(3))
        );
    }

    #[test]
    fn zone_out_of_range() {
        assert!(matches!(
            rotate_zone_sequence(&SEQUENCE, &STARTS, 0, 4),
            Err(ValueError::OutOfRange { actual: 4, .. })
        ));
    }

    #[test]
    fn index_out_of_range() {
        assert!(matches!(
            rotate_zone_sequence(&SEQUENCE, &STARTS, 10, 0),
            Err(ValueError::OutOfRange { actual: 10, .. })
        ));
    }
}
