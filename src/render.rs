/// Drawing the styled graph to an image file
use anyhow::{anyhow, Context, Result};
use resvg::tiny_skia::{Pixmap, Transform};
use std::path::Path;
use svg::node::element::{Circle, Line, Rectangle, Text};
use svg::Document;

use crate::layout::{Layout, Point};
use crate::network::RelationshipGraph;
use crate::style::{GraphStyle, FALLBACK_COLOR};

/// Image formats the renderer can write, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
}

impl ImageFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Some(ImageFormat::Svg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| anyhow!("Unsupported image format for {}", path.display()))
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }
}

pub trait Renderer {
    fn render(&self, graph: &RelationshipGraph, style: &GraphStyle, output: &Path) -> Result<()>;
}

/// Square canvas with circles for nodes, straight edges and text labels
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    /// Canvas side in pixels
    pub size: f64,
    pub margin: f64,
    pub node_radius: f64,
    pub font_size: f64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        // 12 x 12 inches at 100 dpi
        SvgRenderer {
            size: 1200.0,
            margin: 60.0,
            node_radius: 9.0,
            font_size: 12.0,
        }
    }
}

/// Affine map from layout space onto the canvas, y pointing up
struct Viewport {
    min: Point,
    scale: f64,
    margin: f64,
    size: f64,
}

impl Viewport {
    fn fit(positions: &[&Layout], size: f64, margin: f64) -> Self {
        let mut min = Point { x: f64::MAX, y: f64::MAX };
        let mut max = Point { x: f64::MIN, y: f64::MIN };
        for p in positions.iter().flat_map(|layout| layout.values()) {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        if min.x > max.x {
            min = Point { x: 0.0, y: 0.0 };
            max = Point { x: 1.0, y: 1.0 };
        }

        let extent = (max.x - min.x).max(max.y - min.y);
        let scale = if extent > 0.0 { (size - 2.0 * margin) / extent } else { 1.0 };
        Viewport { min, scale, margin, size }
    }

    fn project(&self, p: Point) -> (f64, f64) {
        (
            self.margin + (p.x - self.min.x) * self.scale,
            self.size - self.margin - (p.y - self.min.y) * self.scale,
        )
    }
}

impl SvgRenderer {
    pub fn document(&self, graph: &RelationshipGraph, style: &GraphStyle) -> Document {
        let viewport = Viewport::fit(
            &[&style.positions, &style.label_positions],
            self.size,
            self.margin,
        );

        let mut doc = Document::new()
            .set("viewBox", (0, 0, self.size, self.size))
            .set("width", self.size)
            .set("height", self.size)
            .add(
                Rectangle::new()
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", self.size)
                    .set("height", self.size)
                    .set("fill", "#ffffff"),
            );

        for (a, b, _) in graph.edges() {
            let (Some(&pa), Some(&pb)) = (style.positions.get(a), style.positions.get(b)) else {
                continue;
            };
            let (x1, y1) = viewport.project(pa);
            let (x2, y2) = viewport.project(pb);
            doc = doc.add(
                Line::new()
                    .set("x1", x1)
                    .set("y1", y1)
                    .set("x2", x2)
                    .set("y2", y2)
                    .set("stroke", "#000000")
                    .set("stroke-width", 1),
            );
        }

        for (name, _) in graph.nodes() {
            let Some(&p) = style.positions.get(name) else {
                continue;
            };
            let (cx, cy) = viewport.project(p);
            let color = style.colors.get(name).map(String::as_str).unwrap_or(FALLBACK_COLOR);
            doc = doc.add(
                Circle::new()
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", self.node_radius)
                    .set("fill", color),
            );
        }

        for (name, _) in graph.nodes() {
            let label = style.labels.get(name).map(String::as_str).unwrap_or(name);
            if label.is_empty() {
                continue;
            }
            let Some(&p) = style.label_positions.get(name) else {
                continue;
            };
            let (x, y) = viewport.project(p);
            doc = doc.add(
                Text::new(label)
                    .set("x", x)
                    .set("y", y)
                    .set("font-family", "sans-serif")
                    .set("font-size", self.font_size)
                    .set("text-anchor", "middle")
                    .set("fill", "#000000"),
            );
        }

        doc
    }

    fn write_png(&self, svg_text: &str, output: &Path) -> Result<()> {
        let mut options = resvg::usvg::Options::default();
        options.fontdb_mut().load_system_fonts();

        let tree = resvg::usvg::Tree::from_str(svg_text, &options)
            .map_err(|err| anyhow!("Failed to parse generated SVG for PNG export: {err}"))?;

        let size = tree.size().to_int_size();
        let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            anyhow!(
                "Failed to allocate {}x{} surface for PNG export",
                size.width(),
                size.height()
            )
        })?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        let png = pixmap
            .encode_png()
            .map_err(|err| anyhow!("Failed to encode PNG output: {err}"))?;
        std::fs::write(output, png).with_context(|| format!("Failed to write {}", output.display()))
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, graph: &RelationshipGraph, style: &GraphStyle, output: &Path) -> Result<()> {
        let format = ImageFormat::from_path(output)?;
        let svg_text = self.document(graph, style).to_string();

        match format {
            ImageFormat::Svg => std::fs::write(output, svg_text)
                .with_context(|| format!("Failed to write {}", output.display())),
            ImageFormat::Png => self.write_png(&svg_text, output),
        }
    }
}
