//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use samegametui::board::MAX_COLORS;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const TILE_COUNT: usize = MAX_COLORS as usize;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Tile colours by colour index: red, green, blue, grey, magenta, yellow, cyan, white.
    pub tiles: [Color; TILE_COUNT],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, timer).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (descriptions, hints).
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

const ONEDARK_TILES: [Color; TILE_COUNT] = [
    Color::Rgb(0xE0, 0x6C, 0x75), // red
    Color::Rgb(0x98, 0xC3, 0x79), // green
    Color::Rgb(0x61, 0xAF, 0xEF), // blue
    Color::Rgb(0x82, 0x89, 0x97), // grey
    Color::Rgb(0xC6, 0x78, 0xDD), // magenta
    Color::Rgb(0xE5, 0xC0, 0x7B), // yellow
    Color::Rgb(0x56, 0xB6, 0xC2), // cyan
    Color::Rgb(0xDC, 0xDF, 0xE4), // white
];

const HIGH_CONTRAST_TILES: [Color; TILE_COUNT] = [
    Color::Rgb(0xFF, 0x00, 0x00),
    Color::Rgb(0x00, 0xFF, 0x00),
    Color::Rgb(0x00, 0x88, 0xFF),
    Color::Rgb(0x99, 0x99, 0x99),
    Color::Rgb(0xFF, 0x00, 0xFF),
    Color::Rgb(0xFF, 0xFF, 0x00),
    Color::Rgb(0x00, 0xFF, 0xFF),
    Color::Rgb(0xFF, 0xFF, 0xFF),
];

/// Paul Tol's bright/vibrant picks; avoids relying on red vs green.
const COLORBLIND_TILES: [Color; TILE_COUNT] = [
    Color::Rgb(0x00, 0x77, 0xBB),
    Color::Rgb(0xEE, 0x77, 0x33),
    Color::Rgb(0x00, 0x99, 0x88),
    Color::Rgb(0xBB, 0xBB, 0xBB),
    Color::Rgb(0xEE, 0x33, 0x77),
    Color::Rgb(0xBB, 0xBB, 0x00),
    Color::Rgb(0x33, 0xBB, 0xEE),
    Color::Rgb(0xCC, 0x33, 0x11),
];

/// btop theme keys tried for each tile colour, in order.
const TILE_KEYS: [&[&str]; TILE_COUNT] = [
    &["cpu_end", "temp_end"],
    &["mem_box", "cpu_start"],
    &["cpu_box"],
    &["inactive_fg", "graph_text"],
    &["net_box"],
    &["title", "cpu_mid"],
    &["hi_fg", "proc_misc"],
    &["main_fg"],
];

impl Theme {
    /// Hardcoded One Dark defaults.
    pub fn onedark_default() -> Self {
        Self {
            tiles: ONEDARK_TILES,
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or missing.
    /// `palette` selects colour variant: Normal (theme), HighContrast, or Colorblind.
    pub fn load(path: Option<&Path>, palette: crate::Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: crate::Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override tile colours for high-contrast or colorblind.
    pub fn apply_palette(&mut self, palette: crate::Palette) {
        match palette {
            crate::Palette::Normal => {}
            crate::Palette::HighContrast => self.tiles = HIGH_CONTRAST_TILES,
            crate::Palette::Colorblind => self.tiles = COLORBLIND_TILES,
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let defaults = Self::onedark_default();
        let mut tiles = defaults.tiles;
        for (tile, keys) in tiles.iter_mut().zip(TILE_KEYS) {
            if let Some(c) = keys.iter().find_map(|k| get(*k)) {
                *tile = c;
            }
        }
        Self {
            tiles,
            bg: get("meter_bg").unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
        }
    }

    /// Tile colour for colour index.
    #[inline]
    pub fn tile_color(&self, index: u8) -> Color {
        self.tiles[(index as usize) % TILE_COUNT]
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
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&s[range], 16).map_err(|_| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = if s.len() == 6 && s.is_ascii() {
        (channel(0..2)?, channel(2..4)?, channel(4..6)?)
    } else if s.len() == 3 && s.is_ascii() {
        (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17)
    } else {
        return Err(ThemeError::InvalidHex(s.to_string()));
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_tiles() {
        let map = parse_theme_file(
            "# comment\ntheme[cpu_end]=\"#FF0000\"\ntheme[net_box]='#00f'\n",
        );
        let t = Theme::from_map(&map);
        assert_eq!(t.tile_color(0), Color::Rgb(255, 0, 0));
        assert_eq!(t.tile_color(4), Color::Rgb(0, 0, 255));
        assert_eq!(t.tile_color(1), ONEDARK_TILES[1]);
    }

    #[test]
    fn test_palettes_cover_every_colour() {
        let mut t = Theme::default();
        t.apply_palette(crate::Palette::Colorblind);
        assert_eq!(t.tile_color(8), t.tile_color(0));
        let distinct: std::collections::HashSet<_> = t.tiles.iter().collect();
        assert_eq!(distinct.len(), TILE_COUNT);
    }
}
