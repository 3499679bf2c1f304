// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Option bags with a fallback store for undeclared keys.
//!
//! Every node accepts configuration as a JSON object. Keys that name a
//! declared field of the node's kind are assigned to that field. Any other
//! key is kept verbatim in the node's [`Extras`] and can be read back with
//! [`Extensible::property_value`]. An extra never shadows a declared field:
//! lookups consult the declared fields first, and declared keys are never
//! written to the extras.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;

use serde_json::{Map, Value};

use crate::error::SceneError;

/// Options that resolve against other options and are applied last.
const DEFERRED_KEYS: &[&str] = &["currentState"];

/// User-defined properties attached to a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extras {
    values: BTreeMap<String, Value>,
}

impl Extras {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Stores `value` under `key`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Returns the number of stored properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over stored properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// An object whose declared fields can be set from an option bag.
pub trait Extensible {
    /// Returns the declared field named `key` as JSON, or `None` if `key` is
    /// not a declared field. Declared fields without a value report
    /// [`Value::Null`].
    fn declared_value(&self, key: &str) -> Option<Value>;

    /// Assigns `value` to the declared field named `key`.
    ///
    /// Returns `Ok(false)` if `key` is not declared.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::InvalidConfiguration`] if `value` has the wrong
    /// type for the field, or any error the field's setter reports.
    fn assign_declared(&mut self, key: &str, value: &Value) -> Result<bool, SceneError>;

    /// Returns the fallback store.
    fn extras(&self) -> &Extras;

    /// Returns the fallback store for mutation.
    fn extras_mut(&mut self) -> &mut Extras;

    /// Applies every option: declared keys to their fields, the rest to
    /// [`extras`](Self::extras).
    ///
    /// Stops at the first declared key whose value cannot be applied.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`assign_declared`](Self::assign_declared).
    fn set_options(&mut self, options: &Map<String, Value>) -> Result<(), SceneError> {
        let immediate = options
            .iter()
            .filter(|(key, _)| !DEFERRED_KEYS.contains(&key.as_str()));
        let deferred = options
            .iter()
            .filter(|(key, _)| DEFERRED_KEYS.contains(&key.as_str()));
        for (key, value) in immediate.chain(deferred) {
            if !self.assign_declared(key, value)? {
                self.extras_mut().insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    /// Returns the declared field named `key`, else the extra stored under
    /// it, else `None`.
    fn property_value(&self, key: &str) -> Option<Value> {
        self.declared_value(key)
            .or_else(|| self.extras().get(key).cloned())
    }
}

// -- Value coercion helpers --

pub(crate) fn expect_bool(key: &str, value: &Value) -> Result<bool, SceneError> {
    value.as_bool().ok_or_else(|| mismatch(key, "a boolean"))
}

pub(crate) fn expect_f64(key: &str, value: &Value) -> Result<f64, SceneError> {
    value.as_f64().ok_or_else(|| mismatch(key, "a number"))
}

pub(crate) fn expect_str<'a>(key: &str, value: &'a Value) -> Result<&'a str, SceneError> {
    value.as_str().ok_or_else(|| mismatch(key, "a string"))
}

pub(crate) fn expect_u32(key: &str, value: &Value) -> Result<u32, SceneError> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| mismatch(key, "a non-negative 32-bit integer"))
}

fn mismatch(key: &str, expected: &str) -> SceneError {
    SceneError::InvalidConfiguration(format!("option `{key}` expects {expected}"))
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use serde_json::json;

    use super::*;

    /// A minimal declared-field object: `"speed"` plus extras.
    #[derive(Default)]
    struct Probe {
        speed: f64,
        extras: Extras,
        applied: Vec<String>,
    }

    impl Extensible for Probe {
        fn declared_value(&self, key: &str) -> Option<Value> {
            (key == "speed").then(|| Value::from(self.speed))
        }

        fn assign_declared(&mut self, key: &str, value: &Value) -> Result<bool, SceneError> {
            self.applied.push(key.into());
            match key {
                "speed" => self.speed = expect_f64(key, value)?,
                "currentState" => {}
                _ => return Ok(false),
            }
            Ok(true)
        }

        fn extras(&self) -> &Extras {
            &self.extras
        }

        fn extras_mut(&mut self) -> &mut Extras {
            &mut self.extras
        }
    }

    fn options(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test options are objects"),
        }
    }

    #[test]
    fn declared_keys_assign_fields_and_others_become_extras() {
        let mut probe = Probe::default();
        probe
            .set_options(&options(json!({ "speed": 2.5, "team": "red" })))
            .unwrap();
        assert_eq!(probe.speed, 2.5);
        assert_eq!(probe.extras.get("team"), Some(&json!("red")));
        assert!(probe.extras.get("speed").is_none());
    }

    #[test]
    fn property_value_prefers_declared_fields() {
        let mut probe = Probe::default();
        probe.extras.insert("speed", json!("shadow"));
        probe.speed = 4.0;
        assert_eq!(probe.property_value("speed"), Some(json!(4.0)));
        assert_eq!(probe.property_value("missing"), None);
    }

    #[test]
    fn wrong_type_for_declared_key_is_rejected() {
        let mut probe = Probe::default();
        let err = probe
            .set_options(&options(json!({ "speed": "fast" })))
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidConfiguration(_)));
        assert!(probe.extras.is_empty());
    }

    #[test]
    fn deferred_keys_apply_last() {
        let mut probe = Probe::default();
        probe
            .set_options(&options(json!({ "currentState": "walk", "speed": 1.0 })))
            .unwrap();
        assert_eq!(probe.applied, ["speed", "currentState"]);
    }

    #[test]
    fn integer_coercion_rejects_out_of_range() {
        assert_eq!(expect_u32("n", &json!(7)).unwrap(), 7);
        assert!(expect_u32("n", &json!(-1)).is_err());
        assert!(expect_u32("n", &json!(1.5)).is_err());
        assert!(expect_u32("n", &json!(u64::MAX)).is_err());
    }
}
