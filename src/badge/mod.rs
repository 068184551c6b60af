//! Badge values and rendering
//!
//! - [`color`]: RGB colors and the named color catalog
//! - [`icon`]: logo catalog embedded into badges
//! - [`content`]: the resolved `{label, text, color, icon}` value
//! - [`render`]: markup generation

pub mod color;
pub mod content;
pub mod icon;
pub mod render;

pub use color::Color;
pub use content::BadgeContent;
pub use icon::Icon;
pub use render::{BadgeRenderer, BadgeStyle, SvgRenderer};
