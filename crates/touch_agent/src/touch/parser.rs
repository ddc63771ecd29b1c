//! Parser for `getevent -lp` device and property dumps

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `/dev/input/event3: Touch Panel`
    pub(crate) static ref BARE_HEADER_RE: Regex =
        Regex::new(r"^\s*(/dev/input/event\d+):(.*)$").unwrap();
    /// `add device 2: /dev/input/event3`
    pub(crate) static ref ADD_DEVICE_RE: Regex =
        Regex::new(r"add device \d+:\s*(/dev/input/event\d+)").unwrap();
    pub(crate) static ref DEVICE_PATH_RE: Regex = Regex::new(r"/dev/input/event(\d+)").unwrap();
    static ref NAME_LINE_RE: Regex = Regex::new(r#"^\s*name:\s*"(.*)"\s*$"#).unwrap();
}

/// An input device node considered as the touchscreen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCandidate {
    pub device_path: String,
    pub name: String,
    pub property_lines: Vec<String>,
    pub score: i32,
}

impl DeviceCandidate {
    fn new(device_path: &str, name: &str) -> Self {
        Self {
            device_path: device_path.to_string(),
            name: name.trim().to_string(),
            property_lines: Vec::new(),
            score: 0,
        }
    }

    /// Numeric suffix of the device node path
    pub fn device_id(&self) -> Option<String> {
        device_id(&self.device_path)
    }
}

/// Candidates in dump order plus every raw line for fallback scanning
#[derive(Debug, Clone, Default)]
pub struct ParsedDump {
    pub candidates: Vec<DeviceCandidate>,
    pub lines: Vec<String>,
}

/// Extract `N` from `/dev/input/eventN`
pub fn device_id(path: &str) -> Option<String> {
    DEVICE_PATH_RE
        .captures(path)
        .map(|caps| caps[1].to_string())
}

/// Match a header line, returning the device path and declared name
fn match_header(line: &str) -> Option<(&str, &str)> {
    if let Some(caps) = BARE_HEADER_RE.captures(line) {
        let path = caps.get(1)?.as_str();
        let name = caps.get(2).map_or("", |m| m.as_str());
        return Some((path, name));
    }

    let caps = ADD_DEVICE_RE.captures(line)?;
    // Only the announcement itself, not a line that merely mentions it
    if !line.trim_start().starts_with("add device") {
        return None;
    }
    Some((caps.get(1)?.as_str(), ""))
}

/// Split an introspection dump into per-device property blocks
pub fn parse_dump(text: &str) -> ParsedDump {
    let mut candidates: Vec<DeviceCandidate> = Vec::new();
    let lines: Vec<String> = text.lines().map(str::to_string).collect();

    for line in &lines {
        if let Some((path, name)) = match_header(line) {
            candidates.push(DeviceCandidate::new(path, name));
            continue;
        }

        let Some(current) = candidates.last_mut() else {
            continue;
        };

        if current.name.is_empty() {
            if let Some(caps) = NAME_LINE_RE.captures(line) {
                current.name = caps[1].trim().to_string();
            }
        }
        current.property_lines.push(line.clone());
    }

    ParsedDump { candidates, lines }
}
