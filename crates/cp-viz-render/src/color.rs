use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// `#rrggbb`; malformed strings read as black.
    pub fn hex(s: &str) -> Self {
        Self::parse_hex(s).unwrap_or(Self::BLACK)
    }

    fn parse_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#')?;
        if !matches!(s.len(), 6 | 8) || !s.is_ascii() {
            return None;
        }
        let c = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        let rgb = Self::rgb(c(0)?, c(2)?, c(4)?);
        match s.len() {
            8 => Some(rgb.with_alpha(c(6)? as f64 / 255.0)),
            _ => Some(rgb),
        }
    }

    /// `#rrggbb[aa]`, a ROOT color index (`"55"`) or a basic color name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.starts_with('#') {
            return Self::parse_hex(s);
        }
        if let Ok(index) = s.parse::<u32>() {
            return root_color(index);
        }
        match s.to_ascii_lowercase().as_str() {
            "k" | "black" => Some(Self::BLACK),
            "w" | "white" => Some(Self::WHITE),
            "r" | "red" => Some(Self::rgb(255, 0, 0)),
            "g" | "green" => Some(Self::rgb(0, 128, 0)),
            "b" | "blue" => Some(Self::rgb(0, 0, 255)),
            "orange" => Some(Self::rgb(255, 165, 0)),
            "gray" | "grey" => Some(Self::rgb(128, 128, 128)),
            _ => None,
        }
    }

    pub const fn with_alpha(mut self, a: f64) -> Self {
        self.a = a;
        self
    }

    pub fn to_svg_fill(&self) -> String {
        if (self.a - 1.0).abs() < 1e-6 {
            self.to_hex()
        } else {
            format!("rgba({},{},{},{:.3})", self.r, self.g, self.b, self.a)
        }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance in `[0, 1]`, for picking readable text colors.
    pub fn luminance(&self) -> f64 {
        (0.2126 * self.r as f64 + 0.7152 * self.g as f64 + 0.0722 * self.b as f64) / 255.0
    }

    pub fn lerp(a: Color, b: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f64 * (1.0 - t) + y as f64 * t).round() as u8;
        Color { r: mix(a.r, b.r), g: mix(a.g, b.g), b: mix(a.b, b.b), a: a.a * (1.0 - t) + b.a * t }
    }

    fn from_hsv(h: f64, s: f64, v: f64) -> Color {
        let h = h.rem_euclid(360.0) / 60.0;
        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = v - c;
        let to8 = |u: f64| ((u + m) * 255.0).round() as u8;
        Color::rgb(to8(r), to8(g), to8(b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_svg_fill())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("unknown color '{s}'")))
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if (self.a - 1.0).abs() < 1e-6 {
            serializer.serialize_str(&self.to_hex())
        } else {
            let alpha = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
            serializer.serialize_str(&format!("{}{alpha:02x}", self.to_hex()))
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// ROOT's indexed colors: the basic colors 0-9 and the violet-to-red
/// spectrum 51-100.
pub fn root_color(index: u32) -> Option<Color> {
    let c = match index {
        0 => Color::WHITE,
        1 => Color::BLACK,
        2 => Color::rgb(255, 0, 0),
        3 => Color::rgb(0, 255, 0),
        4 => Color::rgb(0, 0, 255),
        5 => Color::rgb(255, 255, 0),
        6 => Color::rgb(255, 0, 255),
        7 => Color::rgb(0, 255, 255),
        8 => Color::rgb(89, 212, 84),
        9 => Color::rgb(89, 84, 217),
        51..=100 => Color::from_hsv(280.0 * (100 - index) as f64 / 49.0, 1.0, 1.0),
        _ => return None,
    };
    Some(c)
}

// --- Palettes ---

pub const CLAS12: &[&str] =
    &["#000000", "#d62728", "#1f77b4", "#2ca02c", "#ff7f0e", "#9467bd", "#8c564b", "#17becf"];

pub const TABLEAU10: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ab",
];

pub fn palette_colors(name: &str) -> Vec<Color> {
    let strs = match name {
        "tableau10" => TABLEAU10,
        _ => CLAS12,
    };
    strs.iter().map(|s| Color::hex(s)).collect()
}

// --- Sequential colormaps for 2-D panels ---

/// ROOT's default `kBird` palette.
const BIRD: [(f64, f64, f64); 9] = [
    (0.2082, 0.1664, 0.5293),
    (0.0592, 0.3599, 0.8684),
    (0.0780, 0.5041, 0.8385),
    (0.0232, 0.6419, 0.7914),
    (0.1802, 0.7178, 0.6425),
    (0.5301, 0.7492, 0.4662),
    (0.8186, 0.7328, 0.3499),
    (0.9956, 0.7862, 0.1968),
    (0.9764, 0.9832, 0.0539),
];

const VIRIDIS: [&str; 9] =
    ["#440154", "#472d7b", "#3b528b", "#2c728e", "#21918c", "#28ae80", "#5ec962", "#addc30", "#fde725"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    Bird,
    Viridis,
    Grays,
}

impl Colormap {
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "viridis" => Self::Viridis,
            "grays" | "greys" => Self::Grays,
            _ => Self::Bird,
        }
    }

    /// Color at `t ∈ [0, 1]`.
    pub fn eval(self, t: f64) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Self::Bird => {
                let stops: Vec<Color> = BIRD
                    .iter()
                    .map(|&(r, g, b)| {
                        Color::rgb((r * 255.0).round() as u8, (g * 255.0).round() as u8, (b * 255.0).round() as u8)
                    })
                    .collect();
                interpolate(&stops, t)
            }
            Self::Viridis => {
                let stops: Vec<Color> = VIRIDIS.iter().map(|s| Color::hex(s)).collect();
                interpolate(&stops, t)
            }
            Self::Grays => Color::lerp(Color::rgb(240, 240, 240), Color::rgb(20, 20, 20), t),
        }
    }
}

fn interpolate(stops: &[Color], t: f64) -> Color {
    let pos = t * (stops.len() - 1) as f64;
    let i = (pos.floor() as usize).min(stops.len() - 2);
    Color::lerp(stops[i], stops[i + 1], pos - i as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        let c = Color::hex("#1D4ED8");
        assert_eq!((c.r, c.g, c.b), (0x1D, 0x4E, 0xD8));
        assert!((c.a - 1.0).abs() < 1e-9);
        assert_eq!(Color::parse("#12345"), None);
        let translucent = Color::parse("#ff000080").unwrap();
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-9);
    }

    #[test]
    fn svg_fill_alpha() {
        let c = Color::rgb(29, 78, 216).with_alpha(0.5);
        assert_eq!(c.to_svg_fill(), "rgba(29,78,216,0.500)");
        assert_eq!(Color::rgb(29, 78, 216).to_svg_fill(), "#1d4ed8");
    }

    #[test]
    fn root_indices() {
        assert_eq!(Color::parse("1"), Some(Color::BLACK));
        assert_eq!(Color::parse("2"), Some(Color::rgb(255, 0, 0)));
        // 99 is at the red end of the spectrum, 55 at the blue-violet end.
        let red = root_color(99).unwrap();
        assert!(red.r > 200 && red.b < 60);
        let blue = root_color(55).unwrap();
        assert!(blue.b > 200 && blue.g < 60);
        assert_eq!(root_color(100), Some(Color::rgb(255, 0, 0)));
        assert_eq!(root_color(42), None);
    }

    #[test]
    fn named_colors() {
        assert_eq!(Color::parse("red"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("k"), Some(Color::BLACK));
        assert_eq!(Color::parse("chartreuse-ish"), None);
    }

    #[test]
    fn colormap_ends() {
        let lo = Colormap::Bird.eval(0.0);
        let hi = Colormap::Bird.eval(1.0);
        assert!(lo.b > lo.r);
        assert!(hi.r > hi.b);
        assert_eq!(Colormap::Viridis.eval(1.0), Color::hex("#fde725"));
        assert_eq!(Colormap::Viridis.eval(f64::NAN), Color::hex("#440154"));
        assert_eq!(Colormap::parse("VIRIDIS"), Colormap::Viridis);
    }
}
