//! Change signalling between request handlers and background loops.
//!
//! [`ChangeNotifier`] pairs a generation counter with a shutdown flag under
//! one mutex and condition variable. Writers bump the generation; waiters
//! remember the last generation they acted on and block until it moves, a
//! timeout passes, or the notifier shuts down. The lock is only held while
//! waiting on the condition variable, never across other work.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct Signal {
    generation: u64,
    shutdown: bool,
}

/// Wakes background loops when shared state changes.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use guardian_live::ChangeNotifier;
///
/// let notifier = ChangeNotifier::new();
/// let seen = notifier.generation();
/// notifier.notify();
/// assert_eq!(notifier.wait_for_change(seen, Duration::ZERO), Some(seen + 1));
/// notifier.shutdown();
/// assert_eq!(notifier.wait_for_change(seen, Duration::from_secs(5)), None);
/// assert!(!notifier.sleep(Duration::from_secs(5)));
/// ```
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    signal: Mutex<Signal>,
    changed: Condvar,
}

impl ChangeNotifier {
    /// Create a notifier at generation zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Signal> {
        self.signal.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Whether [`ChangeNotifier::shutdown`] has been called.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.lock().shutdown
    }

    /// Record a change and wake every waiter.
    pub fn notify(&self) {
        let mut signal = self.lock();
        signal.generation = signal.generation.wrapping_add(1);
        drop(signal);
        self.changed.notify_all();
    }

    /// Stop all waiters for good.
    pub fn shutdown(&self) {
        self.lock().shutdown = true;
        self.changed.notify_all();
    }

    /// Block until the generation differs from `seen` or `timeout` passes.
    ///
    /// Returns the generation observed on wake-up, or `None` once the
    /// notifier has shut down.
    #[must_use]
    pub fn wait_for_change(&self, seen: u64, timeout: Duration) -> Option<u64> {
        let guard = self.lock();
        let (signal, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |signal| {
                signal.generation == seen && !signal.shutdown
            })
            .unwrap_or_else(PoisonError::into_inner);
        (!signal.shutdown).then_some(signal.generation)
    }

    /// Sleep for `timeout` unless shut down first.
    ///
    /// Returns `false` when the sleep ended because of shutdown.
    #[must_use]
    pub fn sleep(&self, timeout: Duration) -> bool {
        let guard = self.lock();
        let (signal, _) = self
            .changed
            .wait_timeout_while(guard, timeout, |signal| !signal.shutdown)
            .unwrap_or_else(PoisonError::into_inner);
        !signal.shutdown
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for change notification.

    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn wait_times_out_without_changes() {
        let notifier = ChangeNotifier::new();
        let started = Instant::now();
        assert_eq!(
            notifier.wait_for_change(0, Duration::from_millis(20)),
            Some(0)
        );
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[rstest]
    fn notify_wakes_a_blocked_waiter() {
        let notifier = Arc::new(ChangeNotifier::new());
        let waiter = {
            let notifier = Arc::clone(&notifier);
            thread::spawn(move || notifier.wait_for_change(0, Duration::from_secs(10)))
        };
        thread::sleep(Duration::from_millis(20));
        notifier.notify();
        assert_eq!(waiter.join().expect("waiter panicked"), Some(1));
    }

    #[rstest]
    fn shutdown_interrupts_sleep() {
        let notifier = Arc::new(ChangeNotifier::new());
        let sleeper = {
            let notifier = Arc::clone(&notifier);
            thread::spawn(move || notifier.sleep(Duration::from_secs(10)))
        };
        thread::sleep(Duration::from_millis(20));
        notifier.shutdown();
        assert!(!sleeper.join().expect("sleeper panicked"));
        assert!(notifier.is_shut_down());
    }

    #[rstest]
    fn notifications_do_not_interrupt_sleep() {
        let notifier = ChangeNotifier::new();
        notifier.notify();
        assert!(notifier.sleep(Duration::from_millis(5)));
    }
}
