//! Delays and intervals used across the launch sequence.

use std::time::Duration;

use serde::Deserialize;

/// Timing knobs for launch, health probing and supervision.
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Wait after spawning a backend service before checking it is still alive (milliseconds).
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
    /// Pause between consecutive backend launches (milliseconds).
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,
    /// Wait after all launches before the health pass (milliseconds).
    #[serde(default = "default_warmup_ms")]
    pub warmup_ms: u64,
    /// Per-request health probe timeout (milliseconds).
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,
    /// Supervisor poll interval (milliseconds).
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_grace_ms() -> u64 {
    1000
}

fn default_stagger_ms() -> u64 {
    500
}

fn default_warmup_ms() -> u64 {
    3000
}

fn default_health_timeout_ms() -> u64 {
    2000
}

fn default_tick_ms() -> u64 {
    5000
}

impl TimingConfig {
    #[must_use]
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    #[must_use]
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    #[must_use]
    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }

    #[must_use]
    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            grace_ms: default_grace_ms(),
            stagger_ms: default_stagger_ms(),
            warmup_ms: default_warmup_ms(),
            health_timeout_ms: default_health_timeout_ms(),
            tick_ms: default_tick_ms(),
        }
    }
}
