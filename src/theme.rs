//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use columnstui::Jewel;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Jewel and UI colours, One Dark by default.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Jewel colours indexed by `Jewel::color_index`: red, orange, yellow, green, blue, purple,
    /// white, golden.
    pub jewels: [Color; 8],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, phase).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text and the hidden rows.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

const ONEDARK_JEWELS: [Color; 8] = [
    rgb(0xE06C75), // red
    rgb(0xD19A66), // orange
    rgb(0xE5C07B), // yellow
    rgb(0x98C379), // green
    rgb(0x61AFEF), // blue
    rgb(0xC678DD), // purple
    rgb(0xDCDFE4), // white
    rgb(0xFFD700), // golden
];

impl Theme {
    /// Hardcoded One Dark defaults.
    pub fn onedark_default() -> Self {
        Self {
            jewels: ONEDARK_JEWELS,
            bg: rgb(0x31353F),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xE5C07B),
            inactive_fg: rgb(0x5C6370),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map)?;
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override jewel colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => {
                self.jewels = [
                    rgb(0xFF0000),
                    rgb(0xFF8800),
                    rgb(0xFFFF00),
                    rgb(0x00FF00),
                    rgb(0x0088FF),
                    rgb(0xFF00FF),
                    rgb(0xFFFFFF),
                    rgb(0xFFD700),
                ];
            }
            crate::Palette::Colorblind => {
                // Okabe–Ito
                self.jewels = [
                    rgb(0xD55E00), // vermillion
                    rgb(0xE69F00), // orange
                    rgb(0xF0E442), // yellow
                    rgb(0x009E73), // bluish green
                    rgb(0x0072B2), // blue
                    rgb(0xCC79A7), // reddish purple
                    rgb(0xFFFFFF),
                    rgb(0x56B4E9), // sky blue, so gold stands apart from yellow
                ];
            }
        }
    }

    /// Theme from parsed keys. `jewel_<name>` keys win over the btop keys; a present but
    /// malformed colour is an error.
    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let get = |keys: &[&str], fallback: Color| -> Result<Color, ThemeError> {
            match keys.iter().find_map(|k| map.get(*k)) {
                Some(v) => parse_hex(v),
                None => Ok(fallback),
            }
        };
        let d = Self::onedark_default();
        Ok(Self {
            jewels: [
                get(&["jewel_red", "cpu_end", "temp_end"], d.jewels[0])?,
                get(&["jewel_orange", "temp_mid"], d.jewels[1])?,
                get(&["jewel_yellow", "title", "cpu_mid"], d.jewels[2])?,
                get(&["jewel_green", "mem_box", "cpu_start"], d.jewels[3])?,
                get(&["jewel_blue", "cpu_box"], d.jewels[4])?,
                get(&["jewel_purple", "net_box"], d.jewels[5])?,
                get(&["jewel_white", "hi_fg"], d.jewels[6])?,
                get(&["jewel_golden"], d.jewels[7])?,
            ],
            bg: get(&["meter_bg"], d.bg)?,
            div_line: get(&["div_line"], d.div_line)?,
            main_fg: get(&["main_fg"], d.main_fg)?,
            title: get(&["title"], d.title)?,
            inactive_fg: get(&["inactive_fg"], d.inactive_fg)?,
        })
    }

    #[inline]
    pub fn jewel_color(&self, jewel: Jewel) -> Color {
        self.jewels[jewel.color_index() as usize % self.jewels.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    match s.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}
