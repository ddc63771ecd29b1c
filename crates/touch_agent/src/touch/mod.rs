//! Touchscreen discovery and synthetic touch injection
//!
//! This module provides:
//! - `parser`: splits `getevent -lp` dumps into per-device blocks
//! - `scorer`: ranks candidate devices by touchscreen evidence
//! - `discovery`: axis ranges and the discovery fallback chain
//! - `translate`: screen to device coordinate mapping
//! - `codec`: raw `input_event` records and the tap sequence
//! - `inject`: the three tap injection strategies
//! - `monitor`: streaming `getevent` capture

pub mod codec;
pub mod discovery;
pub mod inject;
pub mod monitor;
pub mod parser;
pub mod scorer;
pub mod translate;

pub use codec::{decode, encode, tap_sequence, InputEvent, INPUT_EVENT_SIZE, TAP_EVENT_COUNT};
pub use discovery::{
    discover_touch_device, discover_with_source, resolve_from_dump, DiscoverySource,
    TouchDeviceInfo, DEFAULT_AXIS_MAX,
};
pub use inject::{
    resolve_screen_size, tap, InjectionStrategy, InlineBinaryInjector, PushFileInjector,
    SendEventInjector, TapReport, TouchInjector,
};
pub use monitor::{monitor_events, EventMonitor, MonitorEvent};
pub use parser::{parse_dump, DeviceCandidate, ParsedDump};
pub use scorer::{explain_with, rank, score, score_with, select_best, ScoreRule, TOUCH_RULES};
pub use translate::{translate, ScreenSize};
