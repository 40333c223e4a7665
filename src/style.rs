//! Presentation overrides parsed from a widget's `style` payload
//!
//! The payload is a stylesheet fragment such as
//! `background-color: #fff8dc; color: rgb(40, 40, 40); font-size: 18px`,
//! optionally wrapped in a `selector { ... }` block. Declarations that do
//! not parse are ignored; an empty payload gives the default look.

use tracing::debug;

use crate::constants::presentation;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetStyle {
    /// ARGB
    pub background: u32,
    /// ARGB
    pub foreground: u32,
    /// Body text size in pixels
    pub font_size: f32,
}

impl Default for WidgetStyle {
    fn default() -> Self {
        Self {
            background: presentation::BACKGROUND,
            foreground: presentation::FOREGROUND,
            font_size: presentation::FONT_SIZE,
        }
    }
}

impl WidgetStyle {
    pub fn parse(raw: &str) -> Self {
        let mut style = Self::default();
        let body = match (raw.find('{'), raw.rfind('}')) {
            (Some(open), Some(close)) if open < close => &raw[open + 1..close],
            _ => raw,
        };

        for declaration in body.split(';') {
            let Some((key, value)) = declaration.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            let applied = match key.as_str() {
                "background-color" | "background" => parse_color(value).map(|c| style.background = c),
                "color" => parse_color(value).map(|c| style.foreground = c),
                "font-size" => parse_font_size(value).map(|size| style.font_size = size),
                _ => None,
            };
            if applied.is_none() {
                debug!(key = %key, value = %value, "Ignoring style declaration");
            }
        }
        style
    }
}

/// `#rgb`, `#rrggbb`, `#aarrggbb`, `rgb(r, g, b)`, `rgba(r, g, b, a)` or a basic name
pub fn parse_color(value: &str) -> Option<u32> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(args) = value.strip_prefix("rgba(").and_then(|v| v.strip_suffix(')')) {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return None;
        }
        let alpha = match parts[3].parse::<f32>() {
            // CSS alpha is 0..1, stylesheet alpha 0..255
            Ok(a) if parts[3].contains('.') || a <= 1.0 => (a.clamp(0.0, 1.0) * 255.0).round() as u32,
            Ok(a) => a.clamp(0.0, 255.0) as u32,
            Err(_) => return None,
        };
        let [r, g, b] = channels(&parts[..3])?;
        return Some(alpha << 24 | r << 16 | g << 8 | b);
    }
    if let Some(args) = value.strip_prefix("rgb(").and_then(|v| v.strip_suffix(')')) {
        let parts: Vec<&str> = args.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return None;
        }
        let [r, g, b] = channels(&parts)?;
        return Some(0xFF00_0000 | r << 16 | g << 8 | b);
    }
    match value.as_str() {
        "black" => Some(0xFF00_0000),
        "white" => Some(0xFFFF_FFFF),
        "red" => Some(0xFFFF_0000),
        "green" => Some(0xFF00_8000),
        "blue" => Some(0xFF00_00FF),
        "yellow" => Some(0xFFFF_FF00),
        "gray" | "grey" => Some(0xFF80_8080),
        "transparent" => Some(0x0000_0000),
        _ => None,
    }
}

fn channels(parts: &[&str]) -> Option<[u32; 3]> {
    let mut out = [0u32; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse::<u8>().ok()? as u32;
    }
    Some(out)
}

fn parse_hex(hex: &str) -> Option<u32> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let v = u32::from_str_radix(hex, 16).ok()?;
            let (r, g, b) = ((v >> 8) & 0xF, (v >> 4) & 0xF, v & 0xF);
            Some(0xFF00_0000 | (r * 0x11) << 16 | (g * 0x11) << 8 | b * 0x11)
        }
        6 => Some(0xFF00_0000 | u32::from_str_radix(hex, 16).ok()?),
        8 => u32::from_str_radix(hex, 16).ok(),
        _ => None,
    }
}

fn parse_font_size(value: &str) -> Option<f32> {
    let value = value.trim().to_ascii_lowercase();
    let size = if let Some(n) = value.strip_suffix("px") {
        n.trim().parse::<f32>().ok()?
    } else if let Some(n) = value.strip_suffix("pt") {
        n.trim().parse::<f32>().ok()? * 4.0 / 3.0
    } else {
        value.parse::<f32>().ok()?
    };
    (size.is_finite() && size > 0.0).then_some(size.clamp(6.0, 200.0))
}
