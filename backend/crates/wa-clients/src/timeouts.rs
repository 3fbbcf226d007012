//! Named timeout policy. Each backend endpoint is assigned one of these
//! categories at design time (§4.2); the client builds a fresh
//! per-request timeout from it rather than relying on a single global
//! client timeout.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Quick, cheap calls: cancel, mark-read acknowledgements.
    Short,
    /// Most calls: batch insert, community resolution, history fetch-older.
    Default,
    /// Media upload/download.
    Media,
    /// Health probes.
    Health,
}

impl Timeout {
    pub fn duration(self, policy: &TimeoutPolicy) -> Duration {
        match self {
            Timeout::Short => policy.short,
            Timeout::Default => policy.default,
            Timeout::Media => policy.media,
            Timeout::Health => policy.health,
        }
    }
}

/// Configured durations for each timeout category (§6 configuration keys).
#[derive(Debug, Clone, Copy)]
pub struct TimeoutPolicy {
    pub short: Duration,
    pub default: Duration,
    pub media: Duration,
    pub health: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(10),
            default: Duration::from_secs(30),
            media: Duration::from_secs(60),
            health: Duration::from_secs(5),
        }
    }
}
