//! Target color parsing.

use image::Rgb;

/// Recolor target used whenever a color string cannot be parsed.
pub const DEFAULT_TARGET_COLOR: Rgb<u8> = Rgb([217, 0, 0]);

/// Parse a 6-digit hex color such as `"#d90000"` (case-insensitive).
///
/// The leading `#` is optional. Short (`#rgb`), 8-digit and named colors are
/// not recognized: anything that does not parse yields
/// [`DEFAULT_TARGET_COLOR`] instead of an error.
#[must_use]
pub fn parse_hex_color(input: &str) -> Rgb<u8> {
    try_parse_hex_color(input).unwrap_or(DEFAULT_TARGET_COLOR)
}

fn try_parse_hex_color(input: &str) -> Option<Rgb<u8>> {
    let hex = input.strip_prefix('#').unwrap_or(input);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let channel = |start: usize| u8::from_str_radix(&hex[start..start + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_seal_red() {
        assert_eq!(parse_hex_color("#d90000"), Rgb([217, 0, 0]));
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(parse_hex_color("#1A2b3C"), Rgb([0x1a, 0x2b, 0x3c]));
    }

    #[test]
    fn hash_prefix_is_optional() {
        assert_eq!(parse_hex_color("00ff7f"), Rgb([0, 255, 127]));
    }

    #[test]
    fn malformed_input_falls_back_to_default() {
        for input in ["bad-input", "", "#", "#fff", "#ff000080", "red", "#gg0000", "##d90000"] {
            assert_eq!(
                parse_hex_color(input),
                DEFAULT_TARGET_COLOR,
                "{input:?} should fall back to the default color"
            );
        }
    }

    #[test]
    fn non_ascii_input_does_not_panic() {
        // Six bytes, but not six hex digits.
        assert_eq!(parse_hex_color("#ééé"), DEFAULT_TARGET_COLOR);
    }
}
