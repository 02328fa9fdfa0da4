use crate::config::DEFAULT_COLOR;

/// Renderer-ready color string. Absent or empty input becomes the default
/// gray and a string without a leading `#` gets one. Everything else is
/// returned as given, whitespace included.
pub fn normalize_color(color: Option<&str>) -> String {
    normalize_color_or(color, DEFAULT_COLOR)
}

pub fn normalize_color_or(color: Option<&str>, fallback: &str) -> String {
    match color {
        None | Some("") => fallback.to_string(),
        Some(c) if c.starts_with('#') => c.to_string(),
        Some(c) => format!("#{c}"),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const GRAY: Rgb = Rgb {
        r: 0xcc,
        g: 0xcc,
        b: 0xcc,
    };

    /// Parse `#rgb` or `#rrggbb` (leading `#` optional).
    pub fn parse(s: &str) -> Option<Rgb> {
        let hex = s.trim().trim_start_matches('#');
        let digit = |i: usize, w: usize| u8::from_str_radix(hex.get(i..i + w)?, 16).ok();
        match hex.len() {
            3 => Some(Rgb {
                r: digit(0, 1)? * 17,
                g: digit(1, 1)? * 17,
                b: digit(2, 1)? * 17,
            }),
            6 => Some(Rgb {
                r: digit(0, 2)?,
                g: digit(2, 2)?,
                b: digit(4, 2)?,
            }),
            _ => None,
        }
    }

    /// Scale each channel by a light intensity, saturating at white.
    pub fn shade(self, intensity: f64) -> Rgb {
        let f = |c: u8| (c as f64 * intensity).round().clamp(0.0, 255.0) as u8;
        Rgb {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
