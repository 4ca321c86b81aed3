//! Tolerant keyframe scanner for gradient configuration payloads.
//!
//! The payload is scanned, not validated. Each occurrence of the quoted key
//! `"r"` anchors one keyframe. From that anchor the `"r"`, `"g"`, `"b"` and
//! `"duration"` keys are searched independently, so fields may appear in any
//! order, and the first match after the anchor wins even if it belongs to a
//! later object. Scanning rules:
//!
//! - after a key, the value starts past the next `:` and any ASCII
//!   whitespace or `"` characters;
//! - integer values are a run of ASCII digits, saturating at 255;
//! - duration values are a run of ASCII digits with at most one `.`;
//! - a missing key, missing `:` or empty numeral reads as zero.
//!
//! Nothing is ever rejected. Surrounding punctuation, extra fields and
//! whitespace are ignored.

use crate::types::{Keyframe, Keyframes, MAX_KEYFRAMES, MIN_KEYFRAME_DURATION_SECS, ParsedKeyframes};
use palette::Srgb;

const RED_KEY: &[u8] = b"\"r\"";
const GREEN_KEY: &[u8] = b"\"g\"";
const BLUE_KEY: &[u8] = b"\"b\"";
const DURATION_KEY: &[u8] = b"\"duration\"";

/// Extracts up to [`MAX_KEYFRAMES`] keyframes from `payload`, in order.
pub fn parse_keyframes(payload: &[u8]) -> ParsedKeyframes {
    let mut keyframes = Keyframes::new();
    let mut truncated = false;
    let mut pos = 0;

    while let Some(anchor) = find(payload, RED_KEY, pos) {
        let color = Srgb::new(
            int_field(payload, RED_KEY, anchor),
            int_field(payload, GREEN_KEY, anchor),
            int_field(payload, BLUE_KEY, anchor),
        );
        let duration = float_field(payload, DURATION_KEY, anchor);
        if duration < MIN_KEYFRAME_DURATION_SECS {
            warn!(
                "keyframe {}: duration {} clamped to {}",
                keyframes.len(),
                duration,
                MIN_KEYFRAME_DURATION_SECS
            );
        }

        if keyframes.push(Keyframe::new(color, duration)).is_err() {
            truncated = true;
            break;
        }

        debug!(
            "keyframe {}: r={} g={} b={} duration={}s",
            keyframes.len(),
            color.red,
            color.green,
            color.blue,
            duration
        );
        pos = anchor + 1;
    }

    if truncated {
        warn!("payload holds more than {} keyframes, extra entries ignored", MAX_KEYFRAMES);
    }
    info!("{} keyframes parsed", keyframes.len());

    ParsedKeyframes {
        keyframes,
        truncated,
    }
}

/// Position of the first `needle` at or after `from`.
fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| offset + from)
}

/// The text following `key`'s colon, with leading whitespace and quotes skipped.
fn value_after<'a>(payload: &'a [u8], key: &[u8], from: usize) -> Option<&'a [u8]> {
    let key_at = find(payload, key, from)?;
    let colon = find(payload, b":", key_at + key.len())?;
    let value = &payload[colon + 1..];
    let skip = value
        .iter()
        .take_while(|&&byte| byte.is_ascii_whitespace() || byte == b'"')
        .count();
    Some(&value[skip..])
}

fn int_field(payload: &[u8], key: &[u8], from: usize) -> u8 {
    let Some(value) = value_after(payload, key, from) else {
        return 0;
    };
    let number = value
        .iter()
        .take_while(|byte| byte.is_ascii_digit())
        .fold(0u32, |acc, &digit| {
            acc.saturating_mul(10).saturating_add(u32::from(digit - b'0'))
        });
    u8::try_from(number).unwrap_or(u8::MAX)
}

fn float_field(payload: &[u8], key: &[u8], from: usize) -> f32 {
    let Some(value) = value_after(payload, key, from) else {
        return 0.0;
    };

    let mut seen_point = false;
    let len = value
        .iter()
        .take_while(|&&byte| match byte {
            b'0'..=b'9' => true,
            b'.' if !seen_point => {
                seen_point = true;
                true
            }
            _ => false,
        })
        .count();

    core::str::from_utf8(&value[..len])
        .ok()
        .and_then(|numeral| numeral.parse::<f32>().ok())
        .unwrap_or(0.0)
}
