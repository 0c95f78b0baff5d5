//! Wall-clock access for expiry and history timestamps.
//!
//! Incident visibility is evaluated against "now" on every read, so the store
//! and the delay statistics take their clock as a dependency. Production code
//! uses [`SystemClock`]; tests substitute a settable clock.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch.
pub type Timestamp = i64;

/// Source of the current time in epoch seconds.
///
/// Implementations must be `Send + Sync` because the store and statistics
/// are shared between request threads and background tasks.
///
/// # Examples
///
/// ```
/// use guardian_core::{Clock, Timestamp};
///
/// #[derive(Debug)]
/// struct Frozen(Timestamp);
///
/// impl Clock for Frozen {
///     fn now(&self) -> Timestamp {
///         self.0
///     }
/// }
///
/// assert_eq!(Frozen(42).now(), 42);
/// ```
pub trait Clock: Debug + Send + Sync {
    /// Return the current time in epoch seconds.
    fn now(&self) -> Timestamp;
}

/// Clock backed by [`SystemTime`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| {
                Timestamp::try_from(elapsed.as_secs()).unwrap_or(Timestamp::MAX)
            })
    }
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
