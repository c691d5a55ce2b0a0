// File: src/color_utils.rs

/// 8-bit RGB triple.
pub type Rgb = (u8, u8, u8);

/// Parses `#rrggbb` (leading `#` optional).
pub fn parse_hex(hex: &str) -> Option<Rgb> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Terminals have no alpha channel, so opacity is approximated by blending
/// towards the background colour.
pub fn fade(color: Rgb, background: Rgb, opacity: f64) -> Rgb {
    let a = opacity.clamp(0.0, 1.0);
    let mix = |fg: u8, bg: u8| (bg as f64 + (fg as f64 - bg as f64) * a).round() as u8;
    (
        mix(color.0, background.0),
        mix(color.1, background.1),
        mix(color.2, background.2),
    )
}

/// Determines if text on top of this color should be white.
pub fn is_dark((r, g, b): Rgb) -> bool {
    let brightness = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
    brightness < 128.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_palette_entries() {
        assert_eq!(parse_hex("#ef4444"), Some((0xef, 0x44, 0x44)));
        assert_eq!(parse_hex("fbbf24"), Some((0xfb, 0xbf, 0x24)));
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn fade_blends_towards_background() {
        let red = (200, 0, 0);
        assert_eq!(fade(red, (0, 0, 0), 1.0), red);
        assert_eq!(fade(red, (0, 0, 0), 0.0), (0, 0, 0));
        assert_eq!(fade(red, (0, 0, 0), 0.5), (100, 0, 0));
        assert_eq!(fade(red, (0, 0, 0), 3.0), red);
    }

    #[test]
    fn dark_detection() {
        assert!(!is_dark((0xfb, 0xbf, 0x24)));
        assert!(is_dark((0, 0, 0)));
        assert!(!is_dark((255, 255, 255)));
    }
}
