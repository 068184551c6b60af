use crate::badge::color::Color;
use crate::badge::icon::Icon;

/// Resolved badge content handed to the renderer
///
/// Every source produces this shape, whatever its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeContent {
    pub label: String,
    pub text: String,
    pub color: Color,
    pub label_color: Option<Color>,
    pub icon: Option<Icon>,
}

impl BadgeContent {
    pub fn new(label: impl Into<String>, text: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
            color,
            label_color: None,
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: Option<Icon>) -> Self {
        self.icon = icon;
        self
    }

    pub fn with_label_color(mut self, label_color: Option<Color>) -> Self {
        self.label_color = label_color;
        self
    }
}
