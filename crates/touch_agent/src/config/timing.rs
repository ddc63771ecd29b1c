//! Timing configuration for touch discovery, injection and monitoring

use lazy_static::lazy_static;
use std::env;
use std::time::Duration;

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Timing for the `getevent -lp` introspection call
#[derive(Debug, Clone)]
pub struct DiscoveryTimingConfig {
    /// Seconds to wait for the introspection dump before falling back
    pub getevent_timeout: f64,
}

impl Default for DiscoveryTimingConfig {
    fn default() -> Self {
        Self {
            getevent_timeout: env_or("TOUCH_AGENT_GETEVENT_TIMEOUT", 10.0),
        }
    }
}

/// Timing and paths used while injecting a tap
#[derive(Debug, Clone)]
pub struct InjectionTimingConfig {
    /// Pause after each pair of `sendevent` commands, in milliseconds
    pub event_pair_delay_ms: u64,
    /// Directory on the device used for temporary event buffers
    pub device_tmp_dir: String,
}

impl InjectionTimingConfig {
    pub fn event_pair_delay(&self) -> Duration {
        Duration::from_millis(self.event_pair_delay_ms)
    }
}

impl Default for InjectionTimingConfig {
    fn default() -> Self {
        Self {
            event_pair_delay_ms: env_or("TOUCH_AGENT_EVENT_PAIR_DELAY_MS", 50),
            device_tmp_dir: env_or(
                "TOUCH_AGENT_DEVICE_TMP_DIR",
                "/data/local/tmp".to_string(),
            ),
        }
    }
}

/// Timing for the event monitor
#[derive(Debug, Clone)]
pub struct MonitorTimingConfig {
    /// Default capture duration in seconds
    pub default_duration: u64,
    /// Extra seconds granted to the device-side `timeout` before the local kill
    pub kill_grace: f64,
}

impl Default for MonitorTimingConfig {
    fn default() -> Self {
        Self {
            default_duration: env_or("TOUCH_AGENT_MONITOR_DURATION", 10),
            kill_grace: env_or("TOUCH_AGENT_MONITOR_KILL_GRACE", 2.0),
        }
    }
}

/// Master timing configuration
#[derive(Debug, Clone, Default)]
pub struct TimingConfig {
    pub discovery: DiscoveryTimingConfig,
    pub injection: InjectionTimingConfig,
    pub monitor: MonitorTimingConfig,
}

lazy_static! {
    /// Global timing configuration instance
    pub static ref TIMING_CONFIG: TimingConfig = TimingConfig::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("TOUCH_AGENT_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("TOUCH_AGENT_TEST_GARBAGE", 7u64), 7);
        env::set_var("TOUCH_AGENT_TEST_GARBAGE", "25");
        assert_eq!(env_or("TOUCH_AGENT_TEST_GARBAGE", 7u64), 25);
    }

    #[test]
    fn test_event_pair_delay_is_short() {
        let config = InjectionTimingConfig {
            event_pair_delay_ms: 50,
            device_tmp_dir: "/data/local/tmp".to_string(),
        };
        assert_eq!(config.event_pair_delay(), Duration::from_millis(50));
    }
}
