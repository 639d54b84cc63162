//! Packed-ARGB color parsing for layer tints and color-typed properties.

/// Sentinel returned for color strings the decoder cannot resolve.
///
/// Unresolvable colors are recoverable: an author referencing an
/// engine-specific palette name gets opaque magenta instead of a failed map.
pub const UNKNOWN_COLOR: u32 = 0xFF_FF_00_FF;

/// Opaque white, the default layer tint.
pub const WHITE: u32 = 0xFF_FF_FF_FF;

/// Parses `#RRGGBB`, `#AARRGGBB` or a basic named color into packed ARGB.
///
/// Six-digit hex is forced opaque. Anything unrecognized yields
/// [`UNKNOWN_COLOR`].
pub fn parse_color(raw: &str) -> u32 {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix('#') {
        return match (hex.len(), u32::from_str_radix(hex, 16)) {
            (6, Ok(rgb)) => 0xFF_00_00_00 | rgb,
            (8, Ok(argb)) => argb,
            _ => UNKNOWN_COLOR,
        };
    }
    named_color(raw).unwrap_or(UNKNOWN_COLOR)
}

/// The CSS basic color keywords, plus `transparent`.
fn named_color(name: &str) -> Option<u32> {
    let argb = match name.to_ascii_lowercase().as_str() {
        "transparent" => 0x00_00_00_00,
        "black" => 0xFF_00_00_00,
        "silver" => 0xFF_C0_C0_C0,
        "gray" | "grey" => 0xFF_80_80_80,
        "white" => WHITE,
        "maroon" => 0xFF_80_00_00,
        "red" => 0xFF_FF_00_00,
        "purple" => 0xFF_80_00_80,
        "fuchsia" | "magenta" => 0xFF_FF_00_FF,
        "green" => 0xFF_00_80_00,
        "lime" => 0xFF_00_FF_00,
        "olive" => 0xFF_80_80_00,
        "yellow" => 0xFF_FF_FF_00,
        "navy" => 0xFF_00_00_80,
        "blue" => 0xFF_00_00_FF,
        "teal" => 0xFF_00_80_80,
        "aqua" | "cyan" => 0xFF_00_FF_FF,
        "orange" => 0xFF_FF_A5_00,
        _ => return None,
    };
    Some(argb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_digit_hex_is_opaque() {
        assert_eq!(parse_color("#ff0000"), 0xFF_FF_00_00);
        assert_eq!(parse_color("#ffffff"), WHITE);
    }

    #[test]
    fn eight_digit_hex_keeps_alpha() {
        assert_eq!(parse_color("#80FF0000"), 0x80_FF_00_00);
    }

    #[test]
    fn named_colors_resolve_case_insensitively() {
        assert_eq!(parse_color("Blue"), 0xFF_00_00_FF);
        assert_eq!(parse_color("transparent"), 0);
    }

    #[test]
    fn unknown_colors_fall_back_to_the_sentinel() {
        assert_eq!(parse_color("engine-palette-3"), UNKNOWN_COLOR);
        assert_eq!(parse_color("#12"), UNKNOWN_COLOR);
        assert_eq!(parse_color("#zzzzzz"), UNKNOWN_COLOR);
    }
}
