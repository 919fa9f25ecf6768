//! Duration token parsing.
//!
//! Exercise data encodes per-set durations as free text ("45 sec", "2 min",
//! "5m"). Anything unrecognised falls back to a fixed default rather than
//! failing, since exercise data quality is outside the engine's control.

use crate::types::DEFAULT_EXERCISE_SECS;

/// Parse a duration token into whole seconds, falling back to 45
pub fn parse_duration(token: Option<&str>) -> u32 {
    parse_duration_or(token, DEFAULT_EXERCISE_SECS)
}

/// Parse a duration token into whole seconds with an explicit fallback
///
/// Finds the first `<integer><optional whitespace><unit>` in the token, where
/// unit is one of `sec`, `s`, `min`, `m` (case-insensitive).
pub fn parse_duration_or(token: Option<&str>, fallback: u32) -> u32 {
    let Some(token) = token else {
        return fallback;
    };

    match find_duration(&token.to_ascii_lowercase()) {
        Some(seconds) => seconds,
        None => {
            tracing::trace!("No duration in {:?}, using {}s", token, fallback);
            fallback
        }
    }
}

fn find_duration(token: &str) -> Option<u32> {
    let bytes = token.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }

        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let digits = &token[start..i];

        let rest = token[i..].trim_start_matches([' ', '\t']);
        if let Some(multiplier) = unit_multiplier(rest) {
            if let Some(seconds) = digits
                .parse::<u32>()
                .ok()
                .and_then(|v| v.checked_mul(multiplier))
            {
                return Some(seconds);
            }
        }
    }

    None
}

/// "min"/"m" and "sec"/"s" share their first letter, so one byte decides
fn unit_multiplier(rest: &str) -> Option<u32> {
    match rest.as_bytes().first() {
        Some(b'm') => Some(60),
        Some(b's') => Some(1),
        _ => None,
    }
}
