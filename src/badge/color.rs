//! RGB colors and the named color catalog

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    const fn from_rgb(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    pub const GREEN: Color = Color::from_rgb(0x008000);
    pub const RED: Color = Color::from_rgb(0xFF0000);
    pub const BLACK: Color = Color::from_rgb(0x000000);
    pub const LIGHT_GREY: Color = Color::from_rgb(0xD3D3D3);
    pub const DARK_SLATE_GRAY: Color = Color::from_rgb(0x2F4F4F);

    /// Parses exactly six hex digits, optionally prefixed with `#`
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }

        let component = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Self::new(component(0..2)?, component(2..4)?, component(4..6)?))
    }

    /// Looks up a catalog color, ignoring case and `_`, `-`, ` ` separators
    pub fn from_name(name: &str) -> Option<Self> {
        CATALOG.get(normalize_name(name).as_str()).copied()
    }

    /// Hex first, then the name catalog
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_hex(value).or_else(|| Self::from_name(value))
    }

    /// Lowercase six-digit hex without prefix
    pub fn to_hex(&self) -> String {
        format!("{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// `#rrggbb`, as used in SVG attributes
    pub fn to_rgb_hex(&self) -> String {
        format!("#{}", self.to_hex())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rgb_hex())
    }
}

fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

static CATALOG: LazyLock<HashMap<String, Color>> = LazyLock::new(|| {
    NAMED_COLORS
        .iter()
        .map(|(name, rgb)| (normalize_name(name), Color::from_rgb(*rgb)))
        .collect()
});

const NAMED_COLORS: &[(&str, u32)] = &[
    ("alice_blue", 0xF0F8FF),
    ("antique_white", 0xFAEBD7),
    ("aqua", 0x00FFFF),
    ("aqua_marine", 0x7FFFD4),
    ("azure", 0xF0FFFF),
    ("beige", 0xF5F5DC),
    ("bisque", 0xFFE4C4),
    ("black", 0x000000),
    ("blanched_almond", 0xFFEBCD),
    ("blue", 0x0000FF),
    ("blue_violet", 0x8A2BE2),
    ("brown", 0xA52A2A),
    ("burly_wood", 0xDEB887),
    ("cadet_blue", 0x5F9EA0),
    ("chartreuse", 0x7FFF00),
    ("chocolate", 0xD2691E),
    ("coral", 0xFF7F50),
    ("cornflower_blue", 0x6495ED),
    ("cornsilk", 0xFFF8DC),
    ("crimson", 0xDC143C),
    ("cyan", 0x00FFFF),
    ("dark_blue", 0x00008B),
    ("dark_cyan", 0x008B8B),
    ("dark_golden_rod", 0xB8860B),
    ("dark_gray", 0xA9A9A9),
    ("dark_green", 0x006400),
    ("dark_khaki", 0xBDB76B),
    ("dark_magenta", 0x8B008B),
    ("dark_olive_green", 0x556B2F),
    ("dark_orange", 0xFF8C00),
    ("dark_orchid", 0x9932CC),
    ("dark_red", 0x8B0000),
    ("dark_salmon", 0xE9967A),
    ("dark_sea_green", 0x8FBC8F),
    ("dark_slate_blue", 0x483D8B),
    ("dark_slate_gray", 0x2F4F4F),
    ("dark_turquoise", 0x00CED1),
    ("dark_violet", 0x9400D3),
    ("deep_pink", 0xFF1493),
    ("deep_sky_blue", 0x00BFFF),
    ("dim_gray", 0x696969),
    ("dodger_blue", 0x1E90FF),
    ("firebrick", 0xB22222),
    ("floral_white", 0xFFFAF0),
    ("forest_green", 0x228B22),
    ("fuchsia", 0xFF00FF),
    ("gainsboro", 0xDCDCDC),
    ("ghost_white", 0xF8F8FF),
    ("gold", 0xFFD700),
    ("golden_rod", 0xDAA520),
    ("gray", 0x7F7F7F),
    ("green", 0x008000),
    ("green_yellow", 0xADFF2F),
    ("honeydew", 0xF0FFF0),
    ("hot_pink", 0xFF69B4),
    ("indian_red", 0xCD5C5C),
    ("indigo", 0x4B0082),
    ("ivory", 0xFFFFF0),
    ("khaki", 0xF0E68C),
    ("lavender", 0xE6E6FA),
    ("lavender_blush", 0xFFF0F5),
    ("lawn_green", 0x7CFC00),
    ("lemon_chiffon", 0xFFFACD),
    ("light_blue", 0xADD8E6),
    ("light_coral", 0xF08080),
    ("light_cyan", 0xE0FFFF),
    ("light_golden_rod_yellow", 0xFAFAD2),
    ("light_green", 0x90EE90),
    ("light_grey", 0xD3D3D3),
    ("light_pink", 0xFFB6C1),
    ("light_salmon", 0xFFA07A),
    ("light_sea_green", 0x20B2AA),
    ("light_sky_blue", 0x87CEFA),
    ("light_slate_gray", 0x778899),
    ("light_steel_blue", 0xB0C4DE),
    ("light_yellow", 0xFFFFE0),
    ("lime", 0x00FF00),
    ("lime_green", 0x32CD32),
    ("linen", 0xFAF0E6),
    ("magenta", 0xFF00FF),
    ("maroon", 0x800000),
    ("medium_aquamarine", 0x66CDAA),
    ("medium_blue", 0x0000CD),
    ("medium_orchid", 0xBA55D3),
    ("medium_purple", 0x9370DB),
    ("medium_sea_green", 0x3CB371),
    ("medium_slate_blue", 0x7B68EE),
    ("medium_spring_green", 0x00FA9A),
    ("medium_turquoise", 0x48D1CC),
    ("medium_violet_red", 0xC71585),
    ("midnight_blue", 0x191970),
    ("mint_cream", 0xF5FFFA),
    ("misty_rose", 0xFFE4E1),
    ("moccasin", 0xFFE4B5),
    ("navajo_white", 0xFFDEAD),
    ("navy", 0x000080),
    ("navy_blue", 0x9FAFDF),
    ("oldlace", 0xFDF5E6),
    ("olive", 0x808000),
    ("olive_drab", 0x6B8E23),
    ("orange", 0xFFA500),
    ("orange_red", 0xFF4500),
    ("orchid", 0xDA70D6),
    ("pale_golden_rod", 0xEEE8AA),
    ("pale_green", 0x98FB98),
    ("pale_turquoise", 0xAFEEEE),
    ("pale_violet_red", 0xDB7093),
    ("papaya_whip", 0xFFEFD5),
    ("peach_puff", 0xFFDAB9),
    ("peru", 0xCD853F),
    ("pink", 0xFFC0CB),
    ("plum", 0xDDA0DD),
    ("powder_blue", 0xB0E0E6),
    ("purple", 0x800080),
    ("red", 0xFF0000),
    ("rosy_brown", 0xBC8F8F),
    ("royal_blue", 0x4169E1),
    ("saddle_brown", 0x8B4513),
    ("salmon", 0xFA8072),
    ("sandy_brown", 0xF4A460),
    ("sea_green", 0x2E8B57),
    ("seashell", 0xFFF5EE),
    ("sienna", 0xA0522D),
    ("silver", 0xC0C0C0),
    ("sky_blue", 0x87CEEB),
    ("slate_blue", 0x6A5ACD),
    ("slate_gray", 0x708090),
    ("snow", 0xFFFAFA),
    ("spring_green", 0x00FF7F),
    ("steel_blue", 0x4682B4),
    ("tan", 0xD2B48C),
    ("teal", 0x008080),
    ("thistle", 0xD8BFD8),
    ("tomato", 0xFF6347),
    ("turquoise", 0x40E0D0),
    ("violet", 0xEE82EE),
    ("wheat", 0xF5DEB3),
    ("white", 0xFFFFFF),
    ("white_smoke", 0xF5F5F5),
    ("yellow", 0xFFFF00),
    ("yellow_green", 0x9ACD32),
];
