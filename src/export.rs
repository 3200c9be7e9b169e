//! Serialization of the surface to SVG, PNG and JPEG.
//!
//! Only permanent shape elements are exported; the preview and the selection overlays never
//! are. Raster output has no font stack, so text elements are left out of it.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use log::debug;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use crate::color::parse_paint;
use crate::error::ExportError;
use crate::shape::ShapeKind;
use crate::surface::{Element, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn extension(self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Jpeg => "jpeg",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            RasterFormat::Png => ImageFormat::Png,
            RasterFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn write_element(svg: &mut String, element: &Element) {
    let tag = element.kind.svg_tag();
    svg.push_str(&format!("  <{tag}"));
    if let Some(id) = element.key.shape_id() {
        svg.push_str(&format!(r#" id="{id}""#));
    }
    for (name, value) in element.attributes.iter() {
        if element.kind == ShapeKind::Text && name == "text" {
            continue;
        }
        svg.push_str(&format!(r#" {name}="{}""#, escape_xml(&value.to_string())));
    }
    if !element.transform.is_identity() {
        if let Some(center) = element.center() {
            svg.push_str(&format!(r#" transform="{}""#, element.transform.to_svg(center)));
        }
    }
    match element.attributes.text("text") {
        Some(text) if element.kind == ShapeKind::Text => {
            svg.push_str(&format!(">{}</{tag}>\n", escape_xml(text)));
        }
        _ => svg.push_str("/>\n"),
    }
}

/// The whole surface as an SVG document
pub fn export_vector(surface: &Surface) -> Vec<u8> {
    let size = surface.size();
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = size.x,
        h = size.y,
    );
    svg.push('\n');
    for element in surface.shape_elements() {
        write_element(&mut svg, element);
    }
    svg.push_str("</svg>\n");
    svg.into_bytes()
}

fn paint_for(value: Option<&str>) -> Option<Paint<'static>> {
    let color = parse_paint(value?)?;
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    Some(paint)
}

fn draw_element(pixmap: &mut Pixmap, element: &Element) {
    if element.kind == ShapeKind::Text {
        debug!("Skipping text element {:?} in raster export", element.key);
        return;
    }
    let Ok(geometry) = element.geometry() else {
        return;
    };
    let outline = element.transformed_outline();
    let Some((first, rest)) = outline.split_first() else {
        return;
    };

    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    if geometry.is_closed() {
        pb.close();
    }
    let Some(path) = pb.finish() else {
        return;
    };

    if geometry.is_closed() {
        if let Some(paint) = paint_for(element.attributes.text("fill")) {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }
    if let Some(paint) = paint_for(element.attributes.text("stroke")) {
        let stroke = Stroke {
            width: element.stroke_width(),
            dash: element
                .dash_pattern()
                .and_then(|(dash, gap)| StrokeDash::new(vec![dash, gap], 0.0)),
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

/// Rasterise the surface at its own size
fn render(surface: &Surface, background: Option<tiny_skia::Color>) -> Result<Pixmap, ExportError> {
    let size = surface.size();
    let (width, height) = (size.x.round().max(0.0) as u32, size.y.round().max(0.0) as u32);
    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::InvalidSize { width, height })?;
    if let Some(background) = background {
        pixmap.fill(background);
    }
    for element in surface.shape_elements() {
        draw_element(&mut pixmap, element);
    }
    Ok(pixmap)
}

/// The surface encoded as PNG (transparent background) or JPEG (white background)
pub fn export_raster(surface: &Surface, format: RasterFormat) -> Result<Vec<u8>, ExportError> {
    let image = match format {
        RasterFormat::Png => {
            let pixmap = render(surface, None)?;
            let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
            for (pixel, out) in pixmap.pixels().iter().zip(image.pixels_mut()) {
                let c = pixel.demultiply();
                *out = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
            }
            DynamicImage::ImageRgba8(image)
        }
        RasterFormat::Jpeg => {
            let pixmap = render(surface, Some(tiny_skia::Color::WHITE))?;
            let (width, height) = (pixmap.width(), pixmap.height());
            let data = pixmap.data();
            DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
                let idx = ((y * width + x) * 4) as usize;
                // Opaque after the white fill
                Rgb([data[idx], data[idx + 1], data[idx + 2]])
            }))
        }
    };

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format.image_format())?;
    debug!("Exported {} bytes of {}", bytes.len(), format.extension());
    Ok(bytes)
}
