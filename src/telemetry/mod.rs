// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoding of mower push messages.
//!
//! Mowers push a JSON document with two blocks:
//!
//! - `cfg` - configuration (schedule, rain delay, zones, serial number)
//! - `dat` - live data (status, error, battery, signal, rain sensor)
//!
//! Either block may be missing, and so may any field inside them. Decoding
//! keeps whatever is readable. A field that is present but has the wrong type
//! or an impossible value is skipped and listed in
//! [`PartialUpdate::rejected_fields`], so one bad field never discards the
//! whole message.
//!
//! | Field | Update |
//! |-------|--------|
//! | `dat.ls` | status code |
//! | `dat.le` | error code |
//! | `dat.lz` | zone index |
//! | `dat.lk` | lock flag |
//! | `dat.bt.p` / `dat.bt.c` | battery level / charging state |
//! | `dat.rsi` | Wi-Fi RSSI |
//! | `dat.rain.s` / `dat.rain.cnt` | rain sensor / remaining delay |
//! | `cfg.sc.m` | schedule (1, 2) and party mode (2) |
//! | `cfg.rd` | rain delay |
//! | `cfg.mz` / `cfg.mzv` | zone starts / zone sequence |
//! | `cfg.sc.ots`, `cfg.sc.distm`, `cfg.tq` | capabilities |
//!
//! # Examples
//!
//! ```
//! use landroid_lib::telemetry::parse_payload;
//!
//! let update = parse_payload(r#"{"dat":{"ls":7,"le":0,"bt":{"p":88,"c":0}}}"#).unwrap();
//! assert_eq!(update.status(), Some(7));
//! assert_eq!(update.battery_percent().map(|b| b.value()), Some(88));
//! ```

mod payload;

use serde_json::Value;

use crate::error::ParseError;
use crate::state::PartialUpdate;

/// Parses a push document into a partial update.
///
/// # Errors
///
/// Returns `ParseError::Json` if the payload is not valid JSON, or
/// `ParseError::UnexpectedFormat` if it is not a JSON object.
pub fn parse_payload(payload: &str) -> Result<PartialUpdate, ParseError> {
    let value: Value = serde_json::from_str(payload)?;
    parse_value(value)
}

/// Decodes an already parsed push document.
///
/// # Errors
///
/// Returns `ParseError::UnexpectedFormat` if `value` is not a JSON object.
pub fn parse_value(value: Value) -> Result<PartialUpdate, ParseError> {
    let Value::Object(doc) = &value else {
        return Err(ParseError::UnexpectedFormat(format!(
            "expected a JSON object, got {}",
            kind_of(&value)
        )));
    };

    let mut decoder = payload::Decoder::new();
    if let Some(dat) = doc.get("dat") {
        decoder.decode_dat(dat);
    }
    if let Some(cfg) = doc.get("cfg") {
        decoder.decode_cfg(cfg);
    }

    let update = decoder.finish(value);
    tracing::trace!(
        serial_number = ?update.serial_number(),
        rejected = update.rejected_fields().len(),
        "Decoded push payload"
    );
    Ok(update)
}

impl PartialUpdate {
    /// Parses a push document. See [`parse_payload`].
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the payload is not a JSON object.
    pub fn from_payload(payload: &str) -> Result<Self, ParseError> {
        parse_payload(payload)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChargingState, DeviceId, GpsPosition};

    const FULL_PAYLOAD: &str = r#"{
        "cfg": {
            "sn": "201923011234567",
            "dt": "19/05/2026",
            "tm": "14:02:11",
            "rd": 180,
            "sc": {"m": 2, "distm": 0, "ots": {"bc": 0, "wtm": 0}, "p": 20},
            "mz": [0, 35, 0, 0],
            "mzv": [0, 0, 1, 1, 0, 0, 1, 1, 0, 0],
            "tq": -10
        },
        "dat": {
            "ls": 1,
            "le": 0,
            "lz": 3,
            "lk": 1,
            "rsi": -62,
            "bt": {"t": 21.3, "v": 19.8, "p": 100, "nr": 412, "c": 1, "m": 0},
            "rain": {"s": 0, "cnt": 0},
            "dmp": [2.1, -0.4, 348.0],
            "modules": {"4G": {"gps": {"coo": [48.1374, 11.5755]}}}
        }
    }"#;

    #[test]
    fn full_document() {
        let update = parse_payload(FULL_PAYLOAD).unwrap();

        assert_eq!(update.status(), Some(1));
        assert_eq!(update.error(), Some(0));
        assert_eq!(update.zone_index(), Some(3));
        assert_eq!(update.locked(), Some(true));
        assert_eq!(update.rssi(), Some(-62));
        assert_eq!(update.battery_percent().map(|b| b.value()), Some(100));
        assert_eq!(update.battery_charging(), Some(ChargingState::Charging));
        assert_eq!(update.battery_temperature(), Some(21.3));
        assert_eq!(update.battery_voltage(), Some(19.8));
        assert_eq!(update.battery_charge_cycles(), Some(412));
        assert_eq!(update.torque(), Some(-10));
        assert_eq!(update.time_extension(), Some(20));
        assert_eq!(update.orientation().map(|o| o.yaw), Some(348.0));
        assert_eq!(
            update.position(),
            Some(GpsPosition::new(48.1374, 11.5755).unwrap())
        );
        assert_eq!(update.rain_sensor_triggered(), Some(false));
        assert_eq!(update.rain_delay_remaining(), Some(0));
        assert_eq!(update.rain_delay_minutes(), Some(180));
        assert_eq!(update.schedule_enabled(), Some(true));
        assert_eq!(update.party_mode_enabled(), Some(true));
        assert_eq!(update.zone_starts(), Some(&[0, 35, 0, 0][..]));
        assert_eq!(update.zone_sequence().map(<[u8]>::len), Some(10));
        assert_eq!(
            update.serial_number(),
            Some(&DeviceId::new("201923011234567"))
        );
        assert!(update.rejected_fields().is_empty());

        let caps = update.capabilities().unwrap();
        assert!(caps.one_time_schedule);
        assert!(caps.edge_cut);
        assert!(caps.party_mode);
        assert!(caps.torque);
        assert!(update.raw().is_some());
    }

    #[test]
    fn status_only() {
        let update = parse_payload(r#"{"dat":{"ls":7}}"#).unwrap();
        assert_eq!(update.status(), Some(7));
        assert_eq!(update.error(), None);
        assert_eq!(update.capabilities(), None);
    }

    #[test]
    fn schedule_modes() {
        let off = parse_payload(r#"{"cfg":{"sc":{"m":0}}}"#).unwrap();
        assert_eq!(off.schedule_enabled(), Some(false));
        assert_eq!(off.party_mode_enabled(), Some(false));

        let on = parse_payload(r#"{"cfg":{"sc":{"m":"1"}}}"#).unwrap();
        assert_eq!(on.schedule_enabled(), Some(true));
        assert_eq!(on.party_mode_enabled(), Some(false));
    }

    #[test]
    fn mistyped_field_is_skipped() {
        let update = parse_payload(r#"{"dat":{"ls":"cutting","le":2,"lk":"maybe"}}"#).unwrap();
        assert_eq!(update.status(), None);
        assert_eq!(update.error(), Some(2));
        assert_eq!(update.locked(), None);
        assert_eq!(
            update.rejected_fields(),
            &["dat.ls".to_string(), "dat.lk".to_string()]
        );
    }

    #[test]
    fn mistyped_block_is_skipped() {
        let update = parse_payload(r#"{"dat":[1,2,3],"cfg":{"rd":30}}"#).unwrap();
        assert_eq!(update.status(), None);
        assert_eq!(update.rain_delay_minutes(), Some(30));
        assert_eq!(update.rejected_fields(), &["dat".to_string()]);
    }

    #[test]
    fn invalid_json() {
        assert!(matches!(
            parse_payload("{not json"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn non_object_document() {
        let err = parse_payload("[1,2]").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedFormat(_)));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn empty_document() {
        let update = PartialUpdate::from_payload("{}").unwrap();
        assert!(update.is_empty());
    }
}
