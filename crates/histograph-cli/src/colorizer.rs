//! Terminal colorization for summary output
//!
//! Reuses the canvas palette so a relationship prints in the same colour as
//! its edge stroke, and a node kind in its minimap colour.

use crossterm::style::{Color, Stylize};
use histograph::canvas::adapter::{minimap_color, stroke_color};
use histograph::{NodeKind, RelationshipKind};

/// Parse a `#rrggbb` colour
pub fn parse_hex(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(Color::Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

fn paint(hex: &str, text: &str) -> String {
    match parse_hex(hex) {
        Some(color) => format!("{}", text.with(color)),
        None => text.to_string(),
    }
}

/// Colour text with the stroke colour of a relationship
pub fn paint_relationship(kind: &RelationshipKind, text: &str) -> String {
    paint(stroke_color(kind), text)
}

/// Colour text with the minimap colour of a node kind
pub fn paint_kind(kind: NodeKind, text: &str) -> String {
    paint(minimap_color(kind), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(
            parse_hex("#ef4444"),
            Some(Color::Rgb {
                r: 0xef,
                g: 0x44,
                b: 0x44
            })
        );
        assert_eq!(parse_hex("ef4444"), None);
        assert_eq!(parse_hex("#fff"), None);
        assert_eq!(parse_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_paint_relationship_uses_stroke_colour() {
        let output = paint_relationship(&RelationshipKind::Causes, "causes");
        // 24-bit foreground escape for #ef4444
        assert!(output.contains("38;2;239;68;68"));
        assert!(output.contains("causes"));
    }

    #[test]
    fn test_custom_relationship_gets_default_colour() {
        let output = paint_relationship(&RelationshipKind::from("opposed-to"), "x");
        assert!(output.contains("38;2;100;116;139"));
    }

    #[test]
    fn test_paint_kind() {
        let output = paint_kind(NodeKind::Person, "person");
        assert!(output.contains("38;2;59;130;246"));
    }
}
