// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field-level decoding of push documents.

use serde_json::{Map, Value};

use crate::Capabilities;
use crate::state::PartialUpdate;
use crate::types::{BatteryPercent, ChargingState, DeviceId, GpsPosition, Orientation};

type Object = Map<String, Value>;

/// Walks a push document and fills a [`PartialUpdate`].
///
/// Every present field that cannot be read as the expected type is recorded
/// as rejected and left out of the update.
pub(super) struct Decoder {
    update: PartialUpdate,
}

impl Decoder {
    pub(super) fn new() -> Self {
        Self {
            update: PartialUpdate::builder().build(),
        }
    }

    pub(super) fn finish(mut self, raw: Value) -> PartialUpdate {
        self.update.raw = Some(raw);
        self.update
    }

    pub(super) fn decode_dat(&mut self, dat: &Value) {
        let Some(dat) = self.object(dat, "dat") else {
            return;
        };

        self.update.status = self.int(dat, "ls", "dat.ls");
        self.update.error = self.int(dat, "le", "dat.le");
        self.update.zone_index = self.int(dat, "lz", "dat.lz");
        self.update.locked = self.flag(dat, "lk", "dat.lk");
        self.update.rssi = self.int(dat, "rsi", "dat.rsi");

        if let Some(bt) = dat.get("bt").and_then(|v| self.object(v, "dat.bt")) {
            self.update.battery_percent = self
                .bounded(bt, "p", "dat.bt.p", 0, i64::MAX)
                .map(|p| BatteryPercent::clamped(u8::try_from(p.min(100)).unwrap_or(100)));
            self.update.battery_charging = self
                .int::<i32>(bt, "c", "dat.bt.c")
                .map(ChargingState::from);
            self.update.battery_temperature = self.float(bt, "t", "dat.bt.t");
            self.update.battery_voltage = self.float(bt, "v", "dat.bt.v");
            self.update.battery_charge_cycles = self.int(bt, "nr", "dat.bt.nr");
        }

        self.update.orientation = self
            .float_list(dat, "dmp", "dat.dmp", 3)
            .map(|v| Orientation::new(v[0], v[1], v[2]));

        if let Some(gps) = dat
            .get("modules")
            .and_then(|v| self.object(v, "dat.modules"))
            .and_then(|m| m.get("4G"))
            .and_then(|v| self.object(v, "dat.modules.4G"))
            .and_then(|m| m.get("gps"))
            .and_then(|v| self.object(v, "dat.modules.4G.gps"))
        {
            self.update.position = self.position(gps, "coo", "dat.modules.4G.gps.coo");
        }

        if let Some(rain) = dat.get("rain").and_then(|v| self.object(v, "dat.rain")) {
            self.update.rain_sensor_triggered = self.flag(rain, "s", "dat.rain.s");
            self.update.rain_delay_remaining = self.int(rain, "cnt", "dat.rain.cnt");
        }
    }

    pub(super) fn decode_cfg(&mut self, cfg: &Value) {
        let Some(cfg) = self.object(cfg, "cfg") else {
            return;
        };

        if let Some(Value::String(sn)) = cfg.get("sn") {
            self.update.serial_number = Some(DeviceId::new(sn.as_str()));
        }

        self.update.rain_delay_minutes = self.int(cfg, "rd", "cfg.rd");
        self.update.zone_starts = self.int_list(cfg, "mz", "cfg.mz");
        self.update.zone_sequence = self.int_list(cfg, "mzv", "cfg.mzv");

        let mut capabilities = Capabilities::default();
        if cfg.contains_key("tq") {
            capabilities.torque = true;
            self.update.torque = self.bounded(cfg, "tq", "cfg.tq", -50, 50).map(narrow);
        }

        if let Some(sc) = cfg.get("sc").and_then(|v| self.object(v, "cfg.sc")) {
            if let Some(mode) = self.bounded(sc, "m", "cfg.sc.m", 0, 2) {
                self.update.schedule_enabled = Some(mode == 1 || mode == 2);
                self.update.party_mode_enabled = Some(mode == 2);
            }
            self.update.time_extension = self.bounded(sc, "p", "cfg.sc.p", -100, 100).map(narrow);
            if sc.contains_key("ots") {
                capabilities.one_time_schedule = true;
                capabilities.edge_cut = true;
            }
            if sc.contains_key("distm") {
                capabilities.party_mode = true;
            }
        }

        if !capabilities.is_empty() {
            self.update.capabilities = Some(capabilities);
        }
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Object> {
        match value {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                self.reject(path, other);
                None
            }
        }
    }

    fn int<T: TryFrom<i64>>(&mut self, obj: &Object, key: &str, path: &str) -> Option<T> {
        let value = present(obj, key)?;
        match as_int(value).and_then(|n| T::try_from(n).ok()) {
            Some(n) => Some(n),
            None => {
                self.reject(path, value);
                None
            }
        }
    }

    fn bounded(&mut self, obj: &Object, key: &str, path: &str, min: i64, max: i64) -> Option<i64> {
        let value = present(obj, key)?;
        match as_int(value).filter(|n| (min..=max).contains(n)) {
            Some(n) => Some(n),
            None => {
                self.reject(path, value);
                None
            }
        }
    }

    fn float(&mut self, obj: &Object, key: &str, path: &str) -> Option<f64> {
        let value = present(obj, key)?;
        let float = as_float(value);
        if float.is_none() {
            self.reject(path, value);
        }
        float
    }

    fn float_list(&mut self, obj: &Object, key: &str, path: &str, len: usize) -> Option<Vec<f64>> {
        let value = present(obj, key)?;
        let list = value
            .as_array()
            .filter(|items| items.len() == len)
            .and_then(|items| items.iter().map(as_float).collect::<Option<Vec<f64>>>());
        if list.is_none() {
            self.reject(path, value);
        }
        list
    }

    /// Reads `[latitude, longitude]`. A zero coordinate means the module has
    /// no fix yet and leaves the position absent.
    fn position(&mut self, obj: &Object, key: &str, path: &str) -> Option<GpsPosition> {
        let value = present(obj, key)?;
        let coords = self.float_list(obj, key, path, 2)?;
        if coords.contains(&0.0) {
            return None;
        }
        match GpsPosition::new(coords[0], coords[1]) {
            Ok(position) => Some(position),
            Err(_) => {
                self.reject(path, value);
                None
            }
        }
    }

    fn flag(&mut self, obj: &Object, key: &str, path: &str) -> Option<bool> {
        let value = present(obj, key)?;
        let flag = match value {
            Value::Bool(b) => Some(*b),
            other => match as_int(other) {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
        };
        if flag.is_none() {
            self.reject(path, value);
        }
        flag
    }

    fn int_list<T: TryFrom<i64>>(&mut self, obj: &Object, key: &str, path: &str) -> Option<Vec<T>> {
        let value = present(obj, key)?;
        let list = value.as_array().and_then(|items| {
            items
                .iter()
                .map(|item| as_int(item).and_then(|n| T::try_from(n).ok()))
                .collect::<Option<Vec<T>>>()
        });
        if list.is_none() {
            self.reject(path, value);
        }
        list
    }

    fn reject(&mut self, path: &str, value: &Value) {
        tracing::warn!(field = path, %value, "Ignoring malformed payload field");
        self.update.rejected_fields.push(path.to_string());
    }
}

fn present<'v>(obj: &'v Object, key: &str) -> Option<&'v Value> {
    obj.get(key).filter(|v| !v.is_null())
}

/// Reads an integer, accepting numeric strings as some firmwares send them.
fn as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a finite float, accepting numeric strings.
fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
}

/// Narrows a value already checked against a small range.
fn narrow(value: i64) -> i32 {
    i32::try_from(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_strings_are_accepted() {
        assert_eq!(as_int(&json!("7")), Some(7));
        assert_eq!(as_int(&json!(" 12 ")), Some(12));
        assert_eq!(as_int(&json!(3.5)), None);
        assert_eq!(as_int(&json!("seven")), None);
        assert_eq!(as_int(&json!(true)), None);
    }

    #[test]
    fn null_fields_are_absent() {
        let mut decoder = Decoder::new();
        decoder.decode_dat(&json!({"ls": null, "le": 0}));
        let update = decoder.finish(Value::Null);
        assert_eq!(update.status(), None);
        assert_eq!(update.error(), Some(0));
        assert!(update.rejected_fields().is_empty());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut decoder = Decoder::new();
        decoder.decode_dat(&json!({"lz": 300, "bt": {"p": -4}}));
        decoder.decode_cfg(&json!({"sc": {"m": 5}}));
        let update = decoder.finish(Value::Null);
        assert_eq!(update.zone_index(), None);
        assert_eq!(update.battery_percent(), None);
        assert_eq!(update.schedule_enabled(), None);
        assert_eq!(
            update.rejected_fields(),
            &["dat.lz".to_string(), "dat.bt.p".to_string(), "cfg.sc.m".to_string()]
        );
    }

    #[test]
    fn floats_accept_strings_but_not_garbage() {
        assert_eq!(as_float(&json!(21.3)), Some(21.3));
        assert_eq!(as_float(&json!(20)), Some(20.0));
        assert_eq!(as_float(&json!("19.8")), Some(19.8));
        assert_eq!(as_float(&json!("NaN")), None);
        assert_eq!(as_float(&json!([1.0])), None);
    }

    #[test]
    fn gps_and_orientation() {
        let mut decoder = Decoder::new();
        decoder.decode_dat(&json!({
            "dmp": [1.5, -0.8, 271.0],
            "modules": {"4G": {"gps": {"coo": [55.6761, 12.5683]}}}
        }));
        let update = decoder.finish(Value::Null);
        assert_eq!(update.orientation(), Some(Orientation::new(1.5, -0.8, 271.0)));
        let fix = update.position().unwrap();
        assert_eq!(fix.latitude(), 55.6761);
        assert_eq!(fix.longitude(), 12.5683);
        assert!(update.rejected_fields().is_empty());
    }

    #[test]
    fn gps_without_fix_is_absent() {
        let mut decoder = Decoder::new();
        decoder.decode_dat(&json!({"modules": {"4G": {"gps": {"coo": [0, 0]}}, "US": {}}}));
        let update = decoder.finish(Value::Null);
        assert_eq!(update.position(), None);
        assert!(update.rejected_fields().is_empty());
        assert!(update.is_empty());
    }

    #[test]
    fn malformed_sensor_fields_are_rejected() {
        let mut decoder = Decoder::new();
        decoder.decode_dat(&json!({
            "dmp": [1.0, 2.0],
            "modules": {"4G": {"gps": {"coo": [95.0, 10.0]}}},
            "bt": {"t": "warm", "v": 19.8, "nr": -1}
        }));
        decoder.decode_cfg(&json!({"tq": 80, "sc": {"p": "x"}}));
        let update = decoder.finish(Value::Null);
        assert_eq!(update.orientation(), None);
        assert_eq!(update.position(), None);
        assert_eq!(update.battery_voltage(), Some(19.8));
        assert_eq!(update.torque(), None);
        assert_eq!(update.time_extension(), None);
        // tq is still there, so the mower supports torque
        assert!(update.capabilities().is_some_and(|c| c.torque));
        assert_eq!(
            update.rejected_fields(),
            &[
                "dat.bt.t".to_string(),
                "dat.bt.nr".to_string(),
                "dat.dmp".to_string(),
                "dat.modules.4G.gps.coo".to_string(),
                "cfg.tq".to_string(),
                "cfg.sc.p".to_string(),
            ]
        );
    }

    #[test]
    fn battery_above_full_is_clamped() {
        let mut decoder = Decoder::new();
        decoder.decode_dat(&json!({"bt": {"p": 104}}));
        let update = decoder.finish(Value::Null);
        assert_eq!(update.battery_percent(), Some(BatteryPercent::FULL));
    }
}
