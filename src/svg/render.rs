//! SVG to PNG rasterization.
//!
//! Parses with usvg, renders with resvg onto a tiny-skia pixmap at the
//! document's intrinsic size, and encodes the pixmap as PNG.

use resvg::tiny_skia::{Pixmap, Transform};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to parse SVG: {0}")]
    Parse(#[from] usvg::Error),

    #[error("invalid SVG dimensions: {0}x{1}")]
    Size(u32, u32),

    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// Render SVG bytes to PNG bytes.
pub fn render_png(svg_data: &[u8]) -> Result<Vec<u8>, RenderError> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_data(svg_data, &options)?;

    let size = tree.size().to_int_size();
    let (width, height) = (size.width(), size.height());
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Size(width, height))?;

    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_render_png_signature() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="8">
<rect width="16" height="8" fill="#00ABF6"/></svg>"##;
        let png = render_png(svg).unwrap();
        assert!(png.starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn test_render_invalid_svg() {
        assert!(matches!(render_png(b"not svg"), Err(RenderError::Parse(_))));
    }
}
