//! Logo catalog
//!
//! Glyphs are small 24x24 SVG fragments, filled with the icon color when
//! rendered and embedded in the badge as a base64 data URL.

use std::collections::HashMap;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::badge::color::Color;

/// Brand color of the package registry logo
pub const REGISTRY_LOGO_COLOR: Color = Color::new(0x00, 0x46, 0x81);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    name: &'static str,
    glyph: &'static str,
    color: Color,
}

impl Icon {
    /// Looks up a catalog logo by case-insensitive name
    pub fn named(name: &str, color: Color) -> Option<Self> {
        let (&name, &glyph) = GLYPHS.get_key_value(name.to_lowercase().as_str())?;
        Some(Self {
            name,
            glyph,
            color,
        })
    }

    /// The fixed package registry logo
    pub fn registry() -> Self {
        Self {
            name: "nuget",
            glyph: NUGET_GLYPH,
            color: REGISTRY_LOGO_COLOR,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn to_svg(&self) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><g fill="{}">{}</g></svg>"#,
            self.color.to_rgb_hex(),
            self.glyph
        )
    }

    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/svg+xml;base64,{}",
            BASE64_STANDARD.encode(self.to_svg())
        )
    }
}

const NUGET_GLYPH: &str = r##"<circle cx="5" cy="5" r="3"/><rect x="9" y="9" width="13" height="13" rx="4"/><circle cx="13" cy="13" r="1.5" fill="#fff"/><circle cx="18" cy="18" r="2.5" fill="#fff"/>"##;

static GLYPHS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("nuget", NUGET_GLYPH),
        ("check", r#"<path d="M9 16.2 4.8 12l-1.4 1.4L9 19 21 7l-1.4-1.4z"/>"#),
        ("cross", r#"<path d="M19 6.4 17.6 5 12 10.6 6.4 5 5 6.4 10.6 12 5 17.6 6.4 19 12 13.4 17.6 19 19 17.6 13.4 12z"/>"#),
        ("info", r#"<path d="M12 2a10 10 0 1 0 0 20 10 10 0 0 0 0-20zm1 15h-2v-6h2zm0-8h-2V7h2z"/>"#),
        ("star", r#"<path d="M12 17.3 18.2 21l-1.6-7L22 9.2l-7.2-.6L12 2 9.2 8.6 2 9.2 7.5 14l-1.7 7z"/>"#),
        ("heart", r#"<path d="M12 21.4 10.6 20C5.4 15.4 2 12.3 2 8.5 2 5.4 4.4 3 7.5 3c1.7 0 3.4.8 4.5 2.1C13.1 3.8 14.8 3 16.5 3 19.6 3 22 5.4 22 8.5c0 3.8-3.4 6.9-8.6 11.5z"/>"#),
        ("package", r#"<path d="M12 2 3 7v10l9 5 9-5V7zm0 2.3L18.7 8 12 11.7 5.3 8zM5 9.7l6 3.3v6.6l-6-3.3zm8 9.9V13l6-3.3v6.6z"/>"#),
        ("download", r#"<path d="M5 20h14v-2H5zM19 9h-4V3H9v6H5l7 7z"/>"#),
        ("tag", r#"<path d="M21.4 11.6 12.4 2.6C12 2.2 11.5 2 11 2H4c-1.1 0-2 .9-2 2v7c0 .6.2 1.1.6 1.4l9 9c.4.4.9.6 1.4.6s1-.2 1.4-.6l7-7c.4-.4.6-.9.6-1.4s-.2-1.1-.6-1.4zM5.5 7C4.7 7 4 6.3 4 5.5S4.7 4 5.5 4 7 4.7 7 5.5 6.3 7 5.5 7z"/>"#),
    ])
});
