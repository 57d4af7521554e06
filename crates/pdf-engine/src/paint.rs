//! Solid colour painting of page content streams for the lopdf backend.
//!
//! Handles path construction, fill and stroke, the gray/RGB/CMYK colour
//! operators and the graphics state stack. Text, images and shadings are
//! skipped.

use crate::{PdfEngineError, RgbaImage};
use image::Rgba;
use lopdf::content::{Content, Operation};

const CURVE_STEPS: usize = 16;

type Point = (f32, f32);

/// Affine matrix in PDF order `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Transform {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Transform {
    pub(crate) fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Maps page space (origin bottom-left) onto a raster (origin top-left).
    pub(crate) fn page_to_raster(
        origin: Point,
        page_height: f32,
        scale_x: f32,
        scale_y: f32,
    ) -> Self {
        Self::new(
            scale_x,
            0.0,
            0.0,
            -scale_y,
            -origin.0 * scale_x,
            (origin.1 + page_height) * scale_y,
        )
    }

    /// `self` first, then `next`.
    fn then(self, next: Transform) -> Transform {
        Transform {
            a: self.a * next.a + self.b * next.c,
            b: self.a * next.b + self.b * next.d,
            c: self.c * next.a + self.d * next.c,
            d: self.c * next.b + self.d * next.d,
            e: self.e * next.a + self.f * next.c + next.e,
            f: self.e * next.b + self.f * next.d + next.f,
        }
    }

    fn apply(self, x: f32, y: f32) -> Point {
        (self.a * x + self.c * y + self.e, self.b * x + self.d * y + self.f)
    }

    fn scale_factor(self) -> f32 {
        (self.a * self.d - self.b * self.c).abs().sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FillRule {
    NonZero,
    EvenOdd,
}

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    ctm: Transform,
    fill: [u8; 3],
    stroke: [u8; 3],
    line_width: f32,
}

/// Paints the decoded `content` onto `image`. Unknown operators are ignored.
pub(crate) fn paint_content(
    image: &mut RgbaImage,
    content: &[u8],
    page_to_raster: Transform,
) -> Result<(), PdfEngineError> {
    let content = Content::decode(content)?;
    let mut painter = Painter::new(image, page_to_raster);

    for operation in &content.operations {
        painter.apply(operation);
    }

    Ok(())
}

struct Painter<'a> {
    image: &'a mut RgbaImage,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    subpaths: Vec<Vec<Point>>,
}

impl<'a> Painter<'a> {
    fn new(image: &'a mut RgbaImage, ctm: Transform) -> Self {
        Self {
            image,
            state: GraphicsState { ctm, fill: [0, 0, 0], stroke: [0, 0, 0], line_width: 1.0 },
            saved: Vec::new(),
            subpaths: Vec::new(),
        }
    }

    fn apply(&mut self, operation: &Operation) {
        let operands: Vec<f32> =
            operation.operands.iter().filter_map(|operand| operand.as_float().ok()).collect();

        match (operation.operator.as_str(), operands.as_slice()) {
            ("q", _) => self.saved.push(self.state),
            ("Q", _) => {
                if let Some(state) = self.saved.pop() {
                    self.state = state;
                }
            }
            ("cm", &[a, b, c, d, e, f]) => {
                self.state.ctm = Transform::new(a, b, c, d, e, f).then(self.state.ctm);
            }
            ("w", &[width]) => self.state.line_width = width,

            ("m", &[x, y]) => self.move_to(x, y),
            ("l", &[x, y]) => self.line_to(x, y),
            ("c", &[x1, y1, x2, y2, x3, y3]) => self.curve_to(Some((x1, y1)), (x2, y2), (x3, y3)),
            ("v", &[x2, y2, x3, y3]) => self.curve_to(None, (x2, y2), (x3, y3)),
            ("y", &[x1, y1, x3, y3]) => self.curve_to(Some((x1, y1)), (x3, y3), (x3, y3)),
            ("h", _) => self.close_path(),
            ("re", &[x, y, width, height]) => {
                self.move_to(x, y);
                self.line_to(x + width, y);
                self.line_to(x + width, y + height);
                self.line_to(x, y + height);
                self.close_path();
            }

            ("f" | "F", _) => self.paint(Some(FillRule::NonZero), false),
            ("f*", _) => self.paint(Some(FillRule::EvenOdd), false),
            ("S", _) => self.paint(None, true),
            ("s", _) => {
                self.close_path();
                self.paint(None, true);
            }
            ("B", _) => self.paint(Some(FillRule::NonZero), true),
            ("B*", _) => self.paint(Some(FillRule::EvenOdd), true),
            ("b", _) => {
                self.close_path();
                self.paint(Some(FillRule::NonZero), true);
            }
            ("b*", _) => {
                self.close_path();
                self.paint(Some(FillRule::EvenOdd), true);
            }
            ("n", _) => self.subpaths.clear(),

            ("g" | "rg" | "k" | "sc" | "scn", components) => {
                if let Some(color) = device_color(components) {
                    self.state.fill = color;
                }
            }
            ("G" | "RG" | "K" | "SC" | "SCN", components) => {
                if let Some(color) = device_color(components) {
                    self.state.stroke = color;
                }
            }
            _ => {}
        }
    }

    fn current_point(&self) -> Option<Point> {
        self.subpaths.last().and_then(|subpath| subpath.last().copied())
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let point = self.state.ctm.apply(x, y);
        self.subpaths.push(vec![point]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let point = self.state.ctm.apply(x, y);
        match self.subpaths.last_mut() {
            Some(subpath) => subpath.push(point),
            None => self.subpaths.push(vec![point]),
        }
    }

    /// Cubic Bezier from the current point. A missing first control point
    /// means "use the current point" (`v`).
    fn curve_to(&mut self, control1: Option<Point>, control2: Point, end: Point) {
        let Some(start) = self.current_point() else {
            return;
        };

        let ctm = self.state.ctm;
        let c1 = control1.map_or(start, |(x, y)| ctm.apply(x, y));
        let c2 = ctm.apply(control2.0, control2.1);
        let end = ctm.apply(end.0, end.1);

        let points = (1..=CURVE_STEPS).map(|step| {
            let t = step as f32 / CURVE_STEPS as f32;
            let mt = 1.0 - t;
            let w0 = mt * mt * mt;
            let w1 = 3.0 * mt * mt * t;
            let w2 = 3.0 * mt * t * t;
            let w3 = t * t * t;
            (
                w0 * start.0 + w1 * c1.0 + w2 * c2.0 + w3 * end.0,
                w0 * start.1 + w1 * c1.1 + w2 * c2.1 + w3 * end.1,
            )
        });

        if let Some(subpath) = self.subpaths.last_mut() {
            subpath.extend(points);
        }
    }

    /// Closes the current subpath; the next segment starts at its first point.
    fn close_path(&mut self) {
        let Some(subpath) = self.subpaths.last_mut() else {
            return;
        };
        let (Some(&first), Some(&last)) = (subpath.first(), subpath.last()) else {
            return;
        };

        if subpath.len() > 1 && first != last {
            subpath.push(first);
        }
        self.subpaths.push(vec![first]);
    }

    fn paint(&mut self, fill: Option<FillRule>, stroke: bool) {
        let subpaths = std::mem::take(&mut self.subpaths);

        if let Some(rule) = fill {
            fill_polygons(self.image, &subpaths, rule, self.state.fill);
        }

        if stroke {
            let width = (self.state.line_width * self.state.ctm.scale_factor()).max(1.0);
            for subpath in &subpaths {
                for segment in subpath.windows(2) {
                    stroke_segment(self.image, segment[0], segment[1], width, self.state.stroke);
                }
            }
        }
    }
}

fn device_color(components: &[f32]) -> Option<[u8; 3]> {
    fn channel(value: f32) -> u8 {
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    match *components {
        [gray] => Some([channel(gray); 3]),
        [r, g, b] => Some([channel(r), channel(g), channel(b)]),
        [c, m, y, k] => Some([
            channel((1.0 - c) * (1.0 - k)),
            channel((1.0 - m) * (1.0 - k)),
            channel((1.0 - y) * (1.0 - k)),
        ]),
        _ => None,
    }
}

/// Segment as a rectangle `width` wide, extended by half the width at both
/// ends so consecutive segments overlap at the joins.
fn stroke_segment(image: &mut RgbaImage, from: Point, to: Point, width: f32, color: [u8; 3]) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return;
    }

    let half = width / 2.0;
    let (ux, uy) = (dx / length * half, dy / length * half);
    let (nx, ny) = (-uy, ux);
    let start = (from.0 - ux, from.1 - uy);
    let end = (to.0 + ux, to.1 + uy);

    let quad = vec![
        (start.0 + nx, start.1 + ny),
        (end.0 + nx, end.1 + ny),
        (end.0 - nx, end.1 - ny),
        (start.0 - nx, start.1 - ny),
    ];
    fill_polygons(image, &[quad], FillRule::NonZero, color);
}

/// Scanline fill sampled at pixel centres. Every subpath is closed
/// implicitly.
fn fill_polygons(
    image: &mut RgbaImage,
    subpaths: &[Vec<Point>],
    rule: FillRule,
    color: [u8; 3],
) {
    let mut edges = Vec::new();
    for subpath in subpaths.iter().filter(|subpath| subpath.len() > 2) {
        for (index, &from) in subpath.iter().enumerate() {
            let to = subpath[(index + 1) % subpath.len()];
            if from.1 != to.1 {
                edges.push((from, to));
            }
        }
    }
    if edges.is_empty() {
        return;
    }

    let (width, height) = image.dimensions();
    let top = edges.iter().map(|(a, b)| a.1.min(b.1)).fold(f32::INFINITY, f32::min);
    let bottom = edges.iter().map(|(a, b)| a.1.max(b.1)).fold(f32::NEG_INFINITY, f32::max);
    let first_row = top.floor().clamp(0.0, height as f32) as u32;
    let last_row = bottom.ceil().clamp(0.0, height as f32) as u32;

    let mut crossings: Vec<(f32, i32)> = Vec::new();
    for row in first_row..last_row {
        let y = row as f32 + 0.5;
        crossings.clear();

        for &(from, to) in &edges {
            let (upper, lower, direction) =
                if from.1 < to.1 { (from, to, 1) } else { (to, from, -1) };
            if y < upper.1 || y >= lower.1 {
                continue;
            }
            let x = upper.0 + (y - upper.1) * (lower.0 - upper.0) / (lower.1 - upper.1);
            crossings.push((x, direction));
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0;
        for pair in crossings.windows(2) {
            winding += pair[0].1;
            let inside = match rule {
                FillRule::NonZero => winding != 0,
                FillRule::EvenOdd => winding % 2 != 0,
            };
            if !inside {
                continue;
            }

            let start = (pair[0].0 - 0.5).ceil().clamp(0.0, width as f32) as u32;
            let end = (pair[1].0 - 0.5).ceil().clamp(0.0, width as f32) as u32;
            for x in start..end {
                image.put_pixel(x, row, Rgba([color[0], color[1], color[2], 255]));
            }
        }
    }
}
