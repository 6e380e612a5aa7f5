//! corridor-export: Pure format serializers (sans-IO)
//!
//! Renders corridor grids for inspection. Currently supports SVG and
//! plain ASCII text.

pub mod svg;
pub mod text;

pub use svg::{SvgMetadata, to_diagnostic_svg, to_svg};
pub use text::{to_ascii, tile_char};
