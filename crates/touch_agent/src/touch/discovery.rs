//! Touchscreen discovery with layered fallbacks
//!
//! Discovery never fails: a scored candidate is preferred, then a device
//! path pattern-matched from emulator hints, then a hardcoded default.

use super::parser::{
    device_id, parse_dump, DeviceCandidate, ADD_DEVICE_RE, BARE_HEADER_RE, DEVICE_PATH_RE,
};
use super::scorer::{contains_word, select_best};
use crate::adb::DeviceChannel;
use crate::config::TIMING_CONFIG;
use crate::error::{Result, TouchError};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Axis maximum assumed when a device reports no usable range
pub const DEFAULT_AXIS_MAX: i32 = 32767;

const FALLBACK_HINTS: &[&str] = &["bluestacks", "virtual touch"];

lazy_static! {
    static ref RANGE_RE: Regex = Regex::new(r"min\s+(-?\d+),?\s+max\s+(-?\d+)").unwrap();
}

/// The resolved touchscreen and its native axis ranges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchDeviceInfo {
    pub id: String,
    pub path: String,
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl TouchDeviceInfo {
    /// A device with `[0, 32767]` on both axes
    pub fn with_default_ranges(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            min_x: 0,
            max_x: DEFAULT_AXIS_MAX,
            min_y: 0,
            max_y: DEFAULT_AXIS_MAX,
        }
    }

    /// Used when the dump names no usable device
    pub fn fallback_default() -> Self {
        Self::with_default_ranges("4", "/dev/input/event4")
    }

    /// Used when the device could not be queried at all
    pub fn channel_failure_default() -> Self {
        Self::with_default_ranges("1", "/dev/input/event1")
    }
}

/// How a `TouchDeviceInfo` was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscoverySource {
    Scored { score: i32 },
    PatternFallback,
    Default,
    ChannelFailure,
}

/// First `(min, max)` with a non-zero max on a line accepted by `matches`
fn find_range(lines: &[String], matches: impl Fn(&str) -> bool) -> Option<(i32, i32)> {
    lines
        .iter()
        .filter(|line| matches(line.as_str()))
        .filter_map(|line| {
            let caps = RANGE_RE.captures(line)?;
            Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
        })
        .find(|&(_, max)| max != 0)
}

fn axis_range(lines: &[String], mt_marker: &str, st_marker: &str) -> (i32, i32) {
    let range = find_range(lines, |line| line.contains(mt_marker))
        .or_else(|| find_range(lines, |line| contains_word(line, st_marker)));

    match range {
        Some((min, max)) if min < max => (min, max),
        _ => (0, DEFAULT_AXIS_MAX),
    }
}

impl From<&DeviceCandidate> for TouchDeviceInfo {
    fn from(candidate: &DeviceCandidate) -> Self {
        let lines = &candidate.property_lines;
        let (min_x, max_x) = axis_range(lines, "ABS_MT_POSITION_X", "ABS_X");
        let (min_y, max_y) = axis_range(lines, "ABS_MT_POSITION_Y", "ABS_Y");

        Self {
            id: candidate.device_id().unwrap_or_else(|| "4".to_string()),
            path: candidate.device_path.clone(),
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}

/// Device path hinted at by emulator-specific lines
fn pattern_fallback(lines: &[String]) -> Option<TouchDeviceInfo> {
    lines
        .iter()
        .filter(|line| {
            let lower = line.to_lowercase();
            FALLBACK_HINTS.iter().any(|hint| lower.contains(hint))
        })
        .find_map(|line| {
            let path = ADD_DEVICE_RE
                .captures(line)
                .or_else(|| BARE_HEADER_RE.captures(line))
                .map(|caps| caps[1].to_string())
                .or_else(|| DEVICE_PATH_RE.find(line).map(|m| m.as_str().to_string()))?;

            debug!("Fallback hint line matched {}: {}", path, line.trim());
            let id = device_id(&path).unwrap_or_else(|| "4".to_string());
            Some(TouchDeviceInfo::with_default_ranges(id, path))
        })
}

/// Resolve the touchscreen from `getevent -lp` output
pub fn resolve_from_dump(text: &str) -> (TouchDeviceInfo, DiscoverySource) {
    let parsed = parse_dump(text);

    if let Some(best) = select_best(parsed.candidates) {
        return (
            TouchDeviceInfo::from(&best),
            DiscoverySource::Scored { score: best.score },
        );
    }

    if let Some(info) = pattern_fallback(&parsed.lines) {
        return (info, DiscoverySource::PatternFallback);
    }

    (TouchDeviceInfo::fallback_default(), DiscoverySource::Default)
}

/// Run `getevent -lp` within the configured bound. A non-zero exit counts
/// as a failed call, as `adb` reports an offline device that way.
async fn fetch_dump<C>(channel: &C) -> Result<String>
where
    C: DeviceChannel + ?Sized,
{
    let timeout = Duration::from_secs_f64(TIMING_CONFIG.discovery.getevent_timeout);

    let output = tokio::time::timeout(timeout, channel.shell(&["getevent", "-lp"]))
        .await
        .map_err(|_| TouchError::Timeout(format!("getevent -lp after {:?}", timeout)))??;

    Ok(output.check("getevent")?.stdout)
}

/// Discover the touchscreen and report which fallback level produced it
pub async fn discover_with_source<C>(channel: &C) -> (TouchDeviceInfo, DiscoverySource)
where
    C: DeviceChannel + ?Sized,
{
    let dump = match fetch_dump(channel).await {
        Ok(dump) => dump,
        Err(e) => {
            warn!("getevent failed, assuming default touch device: {}", e);
            return (
                TouchDeviceInfo::channel_failure_default(),
                DiscoverySource::ChannelFailure,
            );
        }
    };

    let (info, source) = resolve_from_dump(&dump);
    info!(
        "Touch device {} [{}..{}]x[{}..{}] via {:?}",
        info.path, info.min_x, info.max_x, info.min_y, info.max_y, source
    );
    (info, source)
}

/// Discover the touchscreen on the device behind `channel`
pub async fn discover_touch_device<C>(channel: &C) -> TouchDeviceInfo
where
    C: DeviceChannel + ?Sized,
{
    discover_with_source(channel).await.0
}
