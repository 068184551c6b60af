//! Badge markup generation

use std::str::FromStr;

use quick_xml::escape::escape;

use crate::badge::color::Color;
use crate::badge::content::BadgeContent;

/// Content type of rendered badges
pub const BADGE_CONTENT_TYPE: &str = "image/svg+xml";

const DEFAULT_LABEL_COLOR: Color = Color::new(0x55, 0x55, 0x55);
const CHAR_WIDTH: usize = 7;
const HORIZONTAL_PADDING: usize = 10;
const LOGO_SIZE: usize = 14;
const LOGO_GAP: usize = 3;

/// Rendering style hint taken from the request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BadgeStyle {
    #[default]
    Flat,
    FlatSquare,
    Plastic,
    ForTheBadge,
}

impl BadgeStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeStyle::Flat => "flat",
            BadgeStyle::FlatSquare => "flat-square",
            BadgeStyle::Plastic => "plastic",
            BadgeStyle::ForTheBadge => "for-the-badge",
        }
    }

    fn corner_radius(&self) -> usize {
        match self {
            BadgeStyle::Flat => 3,
            BadgeStyle::Plastic => 4,
            BadgeStyle::FlatSquare | BadgeStyle::ForTheBadge => 0,
        }
    }

    fn height(&self) -> usize {
        match self {
            BadgeStyle::ForTheBadge => 28,
            _ => 20,
        }
    }
}

impl FromStr for BadgeStyle {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Ok(BadgeStyle::Flat),
            "flat-square" => Ok(BadgeStyle::FlatSquare),
            "plastic" => Ok(BadgeStyle::Plastic),
            "for-the-badge" => Ok(BadgeStyle::ForTheBadge),
            _ => Err(()),
        }
    }
}

/// Converts resolved badge content into final markup
pub trait BadgeRenderer: Send + Sync {
    fn render(&self, content: &BadgeContent, style: BadgeStyle) -> String;

    fn content_type(&self) -> &'static str {
        BADGE_CONTENT_TYPE
    }
}

/// Two-segment SVG badge renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    fn text_width(text: &str) -> usize {
        text.chars().count() * CHAR_WIDTH + HORIZONTAL_PADDING
    }
}

impl BadgeRenderer for SvgRenderer {
    fn render(&self, content: &BadgeContent, style: BadgeStyle) -> String {
        let (label, text) = match style {
            BadgeStyle::ForTheBadge => (content.label.to_uppercase(), content.text.to_uppercase()),
            _ => (content.label.clone(), content.text.clone()),
        };

        let logo_width = if content.icon.is_some() {
            LOGO_SIZE + LOGO_GAP
        } else {
            0
        };
        let label_width = Self::text_width(&label) + logo_width;
        let text_width = Self::text_width(&text);
        let width = label_width + text_width;
        let height = style.height();
        let radius = style.corner_radius();
        let label_color = content.label_color.unwrap_or(DEFAULT_LABEL_COLOR);
        let text_y = height / 2 + 4;

        let label_x = logo_width + (label_width - logo_width) / 2;
        let text_x = label_width + text_width / 2;
        let accessible = escape(format!("{}: {}", content.label, content.text)).into_owned();
        let label = escape(label.as_str()).into_owned();
        let text = escape(text.as_str()).into_owned();

        let logo = content
            .icon
            .as_ref()
            .map(|icon| {
                format!(
                    r#"<image x="5" y="{}" width="{LOGO_SIZE}" height="{LOGO_SIZE}" href="{}"/>"#,
                    (height - LOGO_SIZE) / 2,
                    icon.to_data_url()
                )
            })
            .unwrap_or_default();

        let gradient = match style {
            BadgeStyle::Flat | BadgeStyle::Plastic => concat!(
                r##"<linearGradient id="s" x2="0" y2="100%"><stop offset="0" stop-color="#bbb" stop-opacity=".1"/>"##,
                r##"<stop offset="1" stop-opacity=".1"/></linearGradient>"##
            ),
            _ => "",
        };
        let gradient_fill = if gradient.is_empty() {
            String::new()
        } else {
            format!(r##"<rect width="{width}" height="{height}" fill="url(#s)"/>"##)
        };

        format!(
            concat!(
                r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" role="img" aria-label="{accessible}">"##,
                "<title>{accessible}</title>",
                "{gradient}",
                r##"<clipPath id="r"><rect width="{width}" height="{height}" rx="{radius}" fill="#fff"/></clipPath>"##,
                r##"<g clip-path="url(#r)">"##,
                r##"<rect width="{label_width}" height="{height}" fill="{label_color}"/>"##,
                r##"<rect x="{label_width}" width="{text_width}" height="{height}" fill="{color}"/>"##,
                "{gradient_fill}",
                "</g>",
                r##"<g fill="#fff" text-anchor="middle" font-family="Verdana,Geneva,DejaVu Sans,sans-serif" font-size="11">"##,
                "{logo}",
                r##"<text x="{label_x}" y="{text_y}">{label}</text>"##,
                r##"<text x="{text_x}" y="{text_y}">{text}</text>"##,
                "</g></svg>"
            ),
            width = width,
            height = height,
            accessible = accessible,
            gradient = gradient,
            radius = radius,
            label_width = label_width,
            label_color = label_color.to_rgb_hex(),
            text_width = text_width,
            color = content.color.to_rgb_hex(),
            gradient_fill = gradient_fill,
            logo = logo,
            label_x = label_x,
            label = label,
            text_x = text_x,
            text = text,
            text_y = text_y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::icon::Icon;
    use rstest::rstest;

    #[test]
    fn render_contains_label_text_and_color() {
        let content = BadgeContent::new("build", "passing", Color::GREEN);
        let svg = SvgRenderer.render(&content, BadgeStyle::Flat);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(">build</text>"));
        assert!(svg.contains(">passing</text>"));
        assert!(svg.contains(r##"fill="#008000""##));
        assert!(svg.contains(r##"fill="#555555""##));
    }

    #[test]
    fn render_escapes_markup_in_text() {
        let content = BadgeContent::new("a<b", "x&y", Color::RED);
        let svg = SvgRenderer.render(&content, BadgeStyle::Flat);

        assert!(svg.contains("a&lt;b"));
        assert!(svg.contains("x&amp;y"));
        assert!(!svg.contains("a<b"));
    }

    #[test]
    fn render_embeds_icon_and_label_color() {
        let content = BadgeContent::new("nuget", "1.2.0", Color::GREEN)
            .with_icon(Some(Icon::registry()))
            .with_label_color(Some(Color::BLACK));
        let svg = SvgRenderer.render(&content, BadgeStyle::Flat);

        assert!(svg.contains("data:image/svg+xml;base64,"));
        assert!(svg.contains(r##"fill="#000000""##));
    }

    #[test]
    fn for_the_badge_uppercases_text() {
        let content = BadgeContent::new("build", "passing", Color::GREEN);
        let svg = SvgRenderer.render(&content, BadgeStyle::ForTheBadge);

        assert!(svg.contains(">BUILD</text>"));
        assert!(svg.contains(r#"height="28""#));
    }

    #[rstest]
    #[case("flat", Ok(BadgeStyle::Flat))]
    #[case("FLAT-SQUARE", Ok(BadgeStyle::FlatSquare))]
    #[case("plastic", Ok(BadgeStyle::Plastic))]
    #[case("for-the-badge", Ok(BadgeStyle::ForTheBadge))]
    #[case("social", Err(()))]
    fn style_from_str(#[case] input: &str, #[case] expected: Result<BadgeStyle, ()>) {
        assert_eq!(input.parse::<BadgeStyle>(), expected);
    }
}
