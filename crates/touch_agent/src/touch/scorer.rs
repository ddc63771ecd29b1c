//! Heuristic touchscreen scoring over parsed device blocks

use super::parser::DeviceCandidate;
use tracing::debug;

/// What a rule looks for
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// A property line contains any of the markers
    LineAny(&'static [&'static str]),
    /// A property line contains every marker as a whole word
    LineAllWords(&'static [&'static str]),
    /// The lower-cased device name contains any of the substrings
    NameAny(&'static [&'static str]),
    /// The lower-cased device name contains every substring
    NameAll(&'static [&'static str]),
}

/// One weighted piece of evidence
#[derive(Debug, Clone, Copy)]
pub struct ScoreRule {
    pub label: &'static str,
    pub matcher: Matcher,
    pub delta: i32,
}

pub const fn rule(label: &'static str, matcher: Matcher, delta: i32) -> ScoreRule {
    ScoreRule {
        label,
        matcher,
        delta,
    }
}

/// Evidence that a device is the touchscreen. Line rules apply once per
/// matching property line, name rules once per device.
pub const TOUCH_RULES: &[ScoreRule] = &[
    rule("direct input", Matcher::LineAny(&["INPUT_PROP_DIRECT"]), 100),
    rule("mt x", Matcher::LineAny(&["ABS_MT_POSITION_X"]), 70),
    rule("mt y", Matcher::LineAny(&["ABS_MT_POSITION_Y"]), 70),
    rule(
        "mt contact",
        Matcher::LineAny(&["ABS_MT_PRESSURE", "ABS_MT_TOUCH_MAJOR"]),
        30,
    ),
    rule("mt tracking", Matcher::LineAny(&["ABS_MT_TRACKING_ID"]), 30),
    rule("st x+y", Matcher::LineAllWords(&["ABS_X", "ABS_Y"]), 20),
    rule(
        "hardware keys",
        Matcher::LineAny(&["KEY_POWER", "KEY_VOLUMEUP", "KEY_VOLUMEDOWN"]),
        -40,
    ),
    rule("name touch", Matcher::NameAny(&["touch"]), 40),
    rule("name screen", Matcher::NameAny(&["screen"]), 15),
    rule("name ts", Matcher::NameAny(&["ts", "touchscreen"]), 20),
    rule("name virtual touch", Matcher::NameAll(&["virtual", "touch"]), 50),
    rule("name button", Matcher::NameAny(&["button", "key"]), -30),
];

/// `word` occurs in `line` delimited by non-identifier characters
pub(crate) fn contains_word(line: &str, word: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    line.match_indices(word).any(|(start, _)| {
        let before = line[..start].chars().next_back();
        let after = line[start + word.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

fn rule_score(rule: &ScoreRule, name: &str, lines: &[String]) -> i32 {
    let hits = match rule.matcher {
        Matcher::LineAny(markers) => lines
            .iter()
            .filter(|line| markers.iter().any(|m| line.contains(m)))
            .count(),
        Matcher::LineAllWords(words) => lines
            .iter()
            .filter(|line| words.iter().all(|w| contains_word(line, w)))
            .count(),
        Matcher::NameAny(parts) => usize::from(parts.iter().any(|p| name.contains(p))),
        Matcher::NameAll(parts) => usize::from(parts.iter().all(|p| name.contains(p))),
    };
    rule.delta * hits as i32
}

/// Non-zero contributions of each rule in `rules`, by label
pub fn explain_with(
    rules: &[ScoreRule],
    candidate: &DeviceCandidate,
) -> Vec<(&'static str, i32)> {
    let name = candidate.name.to_lowercase();
    rules
        .iter()
        .map(|rule| (rule.label, rule_score(rule, &name, &candidate.property_lines)))
        .filter(|&(_, delta)| delta != 0)
        .collect()
}

/// Score a candidate against an arbitrary rule table
pub fn score_with(rules: &[ScoreRule], candidate: &DeviceCandidate) -> i32 {
    explain_with(rules, candidate)
        .iter()
        .map(|&(_, delta)| delta)
        .sum()
}

/// Score a candidate against [`TOUCH_RULES`]
pub fn score(candidate: &DeviceCandidate) -> i32 {
    score_with(TOUCH_RULES, candidate)
}

/// Score every candidate and keep the positive ones, best first.
/// Equal scores keep dump order.
pub fn rank(candidates: Vec<DeviceCandidate>) -> Vec<DeviceCandidate> {
    let mut ranked: Vec<DeviceCandidate> = candidates
        .into_iter()
        .map(|mut candidate| {
            let fired = explain_with(TOUCH_RULES, &candidate);
            candidate.score = fired.iter().map(|&(_, delta)| delta).sum();
            debug!(
                "Touch candidate {} ({:?}) scored {} {:?}",
                candidate.device_path, candidate.name, candidate.score, fired
            );
            candidate
        })
        .filter(|candidate| candidate.score > 0)
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// The highest-scoring eligible candidate, if any scored above zero
pub fn select_best(candidates: Vec<DeviceCandidate>) -> Option<DeviceCandidate> {
    rank(candidates).into_iter().next()
}
