//! Numeric literals as accepted on the command line
//!
//! Numbers follow the C `strtoul(s, &end, 0)` convention: leading
//! whitespace and one `+` or `-` sign are allowed, a `0x`/`0X` prefix
//! selects hexadecimal, a leading `0` selects octal and anything else is
//! decimal. A minus sign negates modulo 2^64, so `-1` comes out as
//! `u64::MAX` and fails any later range check.

fn is_c_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t'..=b'\r')
}

/// Parse a numeric literal at the start of `s`
///
/// Returns the value together with the unconsumed rest of the string.
/// If no digit can be consumed the value is 0 and the rest is `s`,
/// including any whitespace or sign. Values that do not fit in a `u64`
/// saturate to `u64::MAX`, whatever the sign.
pub fn parse_prefix(s: &str) -> (u64, &str) {
    let bytes = s.as_bytes();

    let mut pos = bytes.iter().take_while(|&&b| is_c_space(b)).count();
    let negative = match bytes.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    // "0x" only counts as a prefix when a hex digit follows, otherwise the
    // leading "0" is an octal literal and "x..." is left over
    let (radix, start) = match &bytes[pos..] {
        [b'0', b'x' | b'X', d, ..] if d.is_ascii_hexdigit() => (16, pos + 2),
        [b'0', ..] => (8, pos),
        _ => (10, pos),
    };

    let mut value: u64 = 0;
    let mut overflow = false;
    let mut end = start;
    for &b in &bytes[start..] {
        let Some(digit) = (b as char).to_digit(radix) else {
            break;
        };
        match value
            .checked_mul(u64::from(radix))
            .and_then(|v| v.checked_add(u64::from(digit)))
        {
            Some(v) => value = v,
            None => overflow = true,
        }
        end += 1;
    }

    if end == start {
        return (0, s);
    }

    let value = if overflow {
        u64::MAX
    } else if negative {
        value.wrapping_neg()
    } else {
        value
    };

    (value, &s[end..])
}

/// Parse a string that must consist of exactly one numeric literal
///
/// Returns `None` for empty strings and for trailing garbage.
pub fn parse_exact(s: &str) -> Option<u64> {
    if s.is_empty() {
        return None;
    }
    match parse_prefix(s) {
        (value, "") => Some(value),
        _ => None,
    }
}
