// Copyright 2026 the Vignette Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Repeating tick sources.
//!
//! A [`Timer`] invokes a callback at a fixed interval until the returned
//! [`TimerHandle`] is cancelled. Platform backends provide the real thing
//! (e.g. `setInterval` in a browser). [`ManualTimer`] is a deterministic
//! virtual clock for tests and headless runs: time only moves when
//! [`advance`](ManualTimer::advance) is called.

use alloc::boxed::Box;
use alloc::format;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::time::Duration;

use crate::error::SceneError;

/// A source of repeating ticks.
pub trait Timer {
    /// The cancellation handle for one registration.
    type Handle: TimerHandle + 'static;

    /// Calls `on_tick` every `interval` until the handle is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::TimerUnavailable`] if the platform cannot
    /// schedule timers, or [`SceneError::InvalidConfiguration`] for an
    /// interval the timer cannot honor.
    fn schedule_repeating(
        &mut self,
        interval: Duration,
        on_tick: Box<dyn FnMut()>,
    ) -> Result<Self::Handle, SceneError>;
}

/// Cancels a repeating registration.
pub trait TimerHandle {
    /// Stops further ticks. Cancelling twice is a no-op.
    fn cancel(&mut self);
}

type Callback = Box<dyn FnMut()>;

struct Entry {
    id: u64,
    interval: Duration,
    next_due: Duration,
    /// `None` while the callback is running.
    callback: Option<Callback>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry>,
}

impl ManualState {
    /// Returns the id of the earliest registration due at or before
    /// `target`, lowest id first on ties.
    fn next_due(&self, target: Duration) -> Option<(u64, Duration)> {
        self.entries
            .iter()
            .filter(|e| e.callback.is_some() && e.next_due <= target)
            .map(|e| (e.id, e.next_due))
            .min_by_key(|&(id, due)| (due, id))
    }
}

/// A virtual-time [`Timer`].
///
/// Clones share the same clock and registrations.
#[derive(Clone, Default)]
pub struct ManualTimer {
    state: Rc<RefCell<ManualState>>,
}

impl ManualTimer {
    /// Creates a timer at virtual time zero with no registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Returns the number of live registrations.
    #[must_use]
    pub fn active(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Moves virtual time forward by `elapsed`, firing every tick that falls
    /// due in order, and returns how many callbacks ran.
    ///
    /// Callbacks may cancel registrations, including their own.
    pub fn advance(&self, elapsed: Duration) -> usize {
        let target = self.state.borrow().now + elapsed;
        let mut fired = 0;
        loop {
            let (id, due, mut callback) = {
                let mut state = self.state.borrow_mut();
                let Some((id, due)) = state.next_due(target) else {
                    break;
                };
                state.now = due;
                let entry = state.entries.iter_mut().find(|e| e.id == id);
                let Some(callback) = entry.and_then(|e| e.callback.take()) else {
                    break;
                };
                (id, due, callback)
            };

            callback();
            fired += 1;

            let mut state = self.state.borrow_mut();
            if let Some(entry) = state.entries.iter_mut().find(|e| e.id == id) {
                entry.callback = Some(callback);
                entry.next_due = due + entry.interval;
            }
        }
        self.state.borrow_mut().now = target;
        fired
    }
}

impl core::fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualTimer")
            .field("now", &state.now)
            .field("active", &state.entries.len())
            .finish()
    }
}

impl Timer for ManualTimer {
    type Handle = ManualHandle;

    fn schedule_repeating(
        &mut self,
        interval: Duration,
        on_tick: Box<dyn FnMut()>,
    ) -> Result<ManualHandle, SceneError> {
        if interval.is_zero() {
            return Err(SceneError::InvalidConfiguration(format!(
                "timer interval must be positive, got {interval:?}"
            )));
        }
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let next_due = state.now + interval;
        state.entries.push(Entry {
            id,
            interval,
            next_due,
            callback: Some(on_tick),
        });
        log::debug!("scheduled manual timer {id} every {interval:?}");
        Ok(ManualHandle {
            state: Rc::downgrade(&self.state),
            id,
            cancelled: false,
        })
    }
}

/// Handle returned by [`ManualTimer`]. Cancels on drop.
#[derive(Debug)]
pub struct ManualHandle {
    state: Weak<RefCell<ManualState>>,
    id: u64,
    cancelled: bool,
}

impl TimerHandle for ManualHandle {
    fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().entries.retain(|e| e.id != self.id);
            log::debug!("cancelled manual timer {}", self.id);
        }
    }
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use core::cell::Cell;

    use super::*;

    fn counter() -> (Rc<Cell<u32>>, Box<dyn FnMut()>) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, Box::new(move || inner.set(inner.get() + 1)))
    }

    #[test]
    fn fires_once_per_elapsed_interval() {
        let mut timer = ManualTimer::new();
        let (count, cb) = counter();
        let _handle = timer
            .schedule_repeating(Duration::from_millis(10), cb)
            .unwrap();

        assert_eq!(timer.advance(Duration::from_millis(9)), 0);
        assert_eq!(timer.advance(Duration::from_millis(1)), 1);
        assert_eq!(timer.advance(Duration::from_millis(35)), 3);
        assert_eq!(count.get(), 4);
        assert_eq!(timer.now(), Duration::from_millis(45));
    }

    #[test]
    fn cancel_stops_ticks_and_is_idempotent() {
        let mut timer = ManualTimer::new();
        let (count, cb) = counter();
        let mut handle = timer
            .schedule_repeating(Duration::from_millis(5), cb)
            .unwrap();
        timer.advance(Duration::from_millis(5));
        handle.cancel();
        handle.cancel();
        assert_eq!(timer.active(), 0);
        assert_eq!(timer.advance(Duration::from_millis(50)), 0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn dropping_handle_cancels() {
        let mut timer = ManualTimer::new();
        let (_count, cb) = counter();
        let handle = timer
            .schedule_repeating(Duration::from_millis(5), cb)
            .unwrap();
        assert_eq!(timer.active(), 1);
        drop(handle);
        assert_eq!(timer.active(), 0);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut timer = ManualTimer::new();
        let (_count, cb) = counter();
        assert!(matches!(
            timer.schedule_repeating(Duration::ZERO, cb),
            Err(SceneError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn ties_fire_in_registration_order() {
        let mut timer = ManualTimer::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut handles = Vec::new();
        for (tag, ms) in [(1, 10), (2, 5), (3, 10)] {
            let order = Rc::clone(&order);
            handles.push(
                timer
                    .schedule_repeating(
                        Duration::from_millis(ms),
                        Box::new(move || order.borrow_mut().push(tag)),
                    )
                    .unwrap(),
            );
        }
        timer.advance(Duration::from_millis(10));
        assert_eq!(*order.borrow(), vec![2, 1, 2, 3]);
    }

    #[test]
    fn callback_may_cancel_itself() {
        let mut timer = ManualTimer::new();
        let slot: Rc<RefCell<Option<ManualHandle>>> = Rc::new(RefCell::new(None));
        let fired = Rc::new(Cell::new(0));
        let handle = {
            let slot = Rc::clone(&slot);
            let fired = Rc::clone(&fired);
            timer
                .schedule_repeating(
                    Duration::from_millis(1),
                    Box::new(move || {
                        fired.set(fired.get() + 1);
                        if let Some(mut handle) = slot.borrow_mut().take() {
                            handle.cancel();
                        }
                    }),
                )
                .unwrap()
        };
        *slot.borrow_mut() = Some(handle);
        assert_eq!(timer.advance(Duration::from_millis(10)), 1);
        assert_eq!(fired.get(), 1);
        assert_eq!(timer.active(), 0);
    }
}
