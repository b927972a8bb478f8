/// Decode one base-36 digit. `0-9` map to 0..=9, `a-z` (either case) to 10..=35.
///
/// Returns `None` for any other character.
pub fn decode_digit(c: char) -> Option<u32> {
    c.to_digit(36)
}

/// Decode a multi-character base-36 identifier such as a tempo id (`01`, `zz`).
pub fn decode_id(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }
    s.chars().try_fold(0u32, |acc, c| {
        let digit = decode_digit(c)?;
        acc.checked_mul(36)?.checked_add(digit)
    })
}
