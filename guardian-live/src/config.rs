//! Tunables for the background tasks and simulation defaults.

use std::time::Duration;

/// Default period of the expiry sweeper, monitor loop and broadcasters.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of unchanged broadcast cycles between heartbeats.
pub const DEFAULT_HEARTBEAT_EVERY: u32 = 5;

/// Default wait before a simulated incident becomes visible.
pub const DEFAULT_SIMULATE_MIN_DELAY: Duration = Duration::from_millis(100);

/// Default lifetime of a simulated incident in seconds.
pub const DEFAULT_INCIDENT_DURATION_SECS: i64 = 60;

/// Configuration for [`GuardianService`](crate::GuardianService).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use guardian_live::ServiceConfig;
///
/// let config = ServiceConfig::default()
///     .with_broadcast_interval(Duration::from_millis(50))
///     .with_heartbeat_every(3);
/// assert_eq!(config.sweep_interval, Duration::from_secs(2));
/// assert_eq!(config.heartbeat_every, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Period of the expired-incident sweep.
    pub sweep_interval: Duration,
    /// Period of monitor evaluation.
    pub monitor_interval: Duration,
    /// Longest a subscriber waits for a change before re-checking.
    pub broadcast_interval: Duration,
    /// Unchanged cycles between heartbeats; `0` disables heartbeats.
    pub heartbeat_every: u32,
    /// Wait applied to simulated incidents that ask for no delay.
    pub simulate_min_delay: Duration,
    /// Lifetime of simulated incidents that do not specify one.
    pub default_incident_duration_secs: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_INTERVAL,
            monitor_interval: DEFAULT_INTERVAL,
            broadcast_interval: DEFAULT_INTERVAL,
            heartbeat_every: DEFAULT_HEARTBEAT_EVERY,
            simulate_min_delay: DEFAULT_SIMULATE_MIN_DELAY,
            default_incident_duration_secs: DEFAULT_INCIDENT_DURATION_SECS,
        }
    }
}

impl ServiceConfig {
    /// Set the sweep period.
    #[must_use]
    pub const fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the monitor evaluation period.
    #[must_use]
    pub const fn with_monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval = interval;
        self
    }

    /// Set the subscriber wake-up timeout.
    #[must_use]
    pub const fn with_broadcast_interval(mut self, interval: Duration) -> Self {
        self.broadcast_interval = interval;
        self
    }

    /// Set the heartbeat cadence.
    #[must_use]
    pub const fn with_heartbeat_every(mut self, cycles: u32) -> Self {
        self.heartbeat_every = cycles;
        self
    }

    /// Set the minimum simulation delay.
    #[must_use]
    pub const fn with_simulate_min_delay(mut self, delay: Duration) -> Self {
        self.simulate_min_delay = delay;
        self
    }

    /// Set the default simulated incident lifetime.
    #[must_use]
    pub const fn with_default_incident_duration_secs(mut self, seconds: i64) -> Self {
        self.default_incident_duration_secs = seconds;
        self
    }
}
