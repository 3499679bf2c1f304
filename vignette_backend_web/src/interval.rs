// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setInterval` tick source.
//!
//! [`IntervalTimer`] implements [`Timer`] with the browser's `setInterval`.
//! Each registration owns its JS closure. Cancelling clears the interval and
//! drops the closure.

use alloc::boxed::Box;
use alloc::format;
use core::time::Duration;

use vignette_core::SceneError;
use vignette_core::timer::{Timer, TimerHandle};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

// Direct global bindings instead of `web_sys::Window` methods, so the timer
// also works inside workers.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_name = "setInterval")]
    fn set_interval(handler: &JsValue, timeout: i32) -> Result<i32, JsValue>;

    #[wasm_bindgen(js_name = "clearInterval")]
    fn clear_interval(id: i32);
}

/// A [`Timer`] backed by `setInterval`.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntervalTimer;

impl IntervalTimer {
    /// Creates the timer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Timer for IntervalTimer {
    type Handle = IntervalHandle;

    fn schedule_repeating(
        &mut self,
        interval: Duration,
        on_tick: Box<dyn FnMut()>,
    ) -> Result<IntervalHandle, SceneError> {
        let millis = interval_millis(interval)?;
        let closure = Closure::wrap(on_tick);
        let id = set_interval(closure.as_ref().unchecked_ref(), millis)
            .map_err(|err| SceneError::TimerUnavailable(format!("setInterval failed: {err:?}")))?;
        log::debug!("setInterval {id} every {millis}ms");
        Ok(IntervalHandle {
            id,
            closure: Some(closure),
        })
    }
}

/// A live `setInterval` registration. Cancels on drop.
pub struct IntervalHandle {
    id: i32,
    closure: Option<Closure<dyn FnMut()>>,
}

impl core::fmt::Debug for IntervalHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IntervalHandle")
            .field("id", &self.id)
            .field("active", &self.closure.is_some())
            .finish()
    }
}

impl TimerHandle for IntervalHandle {
    fn cancel(&mut self) {
        if let Some(closure) = self.closure.take() {
            clear_interval(self.id);
            drop(closure);
        }
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Converts `interval` to whole `setInterval` milliseconds, at least 1.
fn interval_millis(interval: Duration) -> Result<i32, SceneError> {
    if interval.is_zero() {
        return Err(SceneError::InvalidConfiguration(
            "timer interval must be positive".into(),
        ));
    }
    i32::try_from(interval.as_millis().max(1)).map_err(|_| {
        SceneError::InvalidConfiguration(format!("timer interval {interval:?} is too long"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_millis_truncates_and_floors_at_one() {
        assert_eq!(interval_millis(Duration::from_secs(1) / 30).unwrap(), 33);
        assert_eq!(interval_millis(Duration::from_micros(10)).unwrap(), 1);
        assert!(interval_millis(Duration::ZERO).is_err());
        assert!(interval_millis(Duration::from_secs(u64::MAX)).is_err());
    }
}
