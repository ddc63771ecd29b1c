//! Configuration module for touch_agent
//!
//! This module contains:
//! - `timing`: Timing and device path configuration for touch operations

mod timing;

pub use timing::{
    DiscoveryTimingConfig, InjectionTimingConfig, MonitorTimingConfig, TimingConfig,
    TIMING_CONFIG,
};
