//! Topic naming and the plain-text payload format shared by telemetry and commands.

/// Joins a prefix and a sensor name into a topic, collapsing every run of
/// separators and dropping a leading one.
pub fn build_topic(prefix: &str, name: &str) -> String {
    let joined = format!("{}/{}", prefix, name);
    let mut topic = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '/' && (topic.is_empty() || topic.ends_with('/')) {
            continue;
        }
        topic.push(c);
    }
    topic
}

/// Renders a sensor value the way it goes on the wire: integral values have no
/// fractional part and negative zero prints as `0`. Magnitudes from `1e21` up
/// and below `1e-6` use exponent form with an explicit sign (`1e+21`, `1e-7`).
pub fn encode_value(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if value.is_finite() && (magnitude >= 1e21 || magnitude < 1e-6) {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }
    value.to_string()
}

/// Reads the leading integer of a command payload.
///
/// Leading whitespace and one sign are accepted, parsing stops at the first
/// non-digit. Digit runs too long for an integer type still parse, rounded to
/// the nearest `f64`. `None` when no digit is found or the payload is not UTF-8.
pub fn parse_command(payload: &[u8]) -> Option<f64> {
    let text = std::str::from_utf8(payload).ok()?.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: f64 = digits[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
