//! Debouncer: timer-reset coalescing of bursty triggers
//!
//! Every `trigger()` cancels the pending timer (if any) and schedules a new
//! one, so only the last trigger inside the window fires. The owner calls
//! `fire()` from its timer callback and runs the deferred work when it
//! returns true.

use crate::dom::{DomError, Timer};

pub struct Debouncer<T: Timer> {
    timer: T,
    delay_ms: u32,
    pending: Option<T::Handle>,
    /// Triggers received since creation
    trigger_count: u64,
    /// Deferred runs that actually fired
    fire_count: u64,
}

impl<T: Timer> Debouncer<T> {
    pub fn new(timer: T, delay_ms: u32) -> Self {
        Self {
            timer,
            delay_ms,
            pending: None,
            trigger_count: 0,
            fire_count: 0,
        }
    }

    /// Reset the window: cancel the pending run and schedule a new one
    pub fn trigger(&mut self) -> Result<(), DomError> {
        self.trigger_count += 1;
        if let Some(handle) = self.pending.take() {
            self.timer.cancel(handle);
        }
        self.pending = Some(self.timer.schedule(self.delay_ms)?);
        Ok(())
    }

    /// Timer elapsed. Returns false if nothing was pending.
    pub fn fire(&mut self) -> bool {
        if self.pending.take().is_some() {
            self.fire_count += 1;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    pub fn trigger_count(&self) -> u64 {
        self.trigger_count
    }

    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ManualTimer;

    /// Advance the timer and fire the debouncer for each elapsed handle
    fn advance(debouncer: &mut Debouncer<ManualTimer>, ms: u64) -> usize {
        let fired = debouncer.timer_mut().advance(ms);
        fired.iter().filter(|_| debouncer.fire()).count()
    }

    #[test]
    fn test_single_trigger_fires_after_delay() {
        let mut debouncer = Debouncer::new(ManualTimer::new(), 300);
        debouncer.trigger().unwrap();

        assert_eq!(advance(&mut debouncer, 299), 0);
        assert!(debouncer.is_pending());
        assert_eq!(advance(&mut debouncer, 1), 1);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_burst_collapses_to_one_run() {
        let mut debouncer = Debouncer::new(ManualTimer::new(), 300);
        debouncer.trigger().unwrap();
        assert_eq!(advance(&mut debouncer, 100), 0);
        debouncer.trigger().unwrap();
        assert_eq!(advance(&mut debouncer, 100), 0);
        debouncer.trigger().unwrap();

        // 300ms after the *last* trigger
        assert_eq!(advance(&mut debouncer, 299), 0);
        assert_eq!(advance(&mut debouncer, 1), 1);
        assert_eq!(advance(&mut debouncer, 1000), 0);

        assert_eq!(debouncer.trigger_count(), 3);
        assert_eq!(debouncer.fire_count(), 1);
        assert_eq!(debouncer.timer().cancelled(), 2);
    }

    #[test]
    fn test_separate_windows_fire_separately() {
        let mut debouncer = Debouncer::new(ManualTimer::new(), 50);
        debouncer.trigger().unwrap();
        assert_eq!(advance(&mut debouncer, 50), 1);
        debouncer.trigger().unwrap();
        assert_eq!(advance(&mut debouncer, 50), 1);
        assert_eq!(debouncer.fire_count(), 2);
    }

    #[test]
    fn test_fire_without_pending_is_noop() {
        let mut debouncer = Debouncer::new(ManualTimer::new(), 10);
        assert!(!debouncer.fire());
        assert_eq!(debouncer.fire_count(), 0);
    }
}
