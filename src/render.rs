//! Raster rendering of gesture traces.
//!
//! Draws one or more models onto an RGBA surface: each trace is projected
//! into plane coordinates, stroked as a smoothed path with a per-index
//! palette color, and overlaid with a filled marker at every sample point.
//! Rendering is stateless and idempotent; the same input always produces the
//! same picture.

use image::{ImageBuffer, Rgba, RgbaImage};
use std::io::Cursor;

use crate::error::Result;
use crate::geometry::trace_to_coordinates;
use crate::{Coordinate, Model, Trace};

/// Fixed trace color palette. Colors are assigned by model index modulo the
/// palette size, so reordering models changes their colors.
pub const PALETTE: [[u8; 4]; 6] = [
    [41, 98, 255, 255],   // blue
    [213, 0, 0, 255],     // red
    [0, 150, 36, 255],    // green
    [255, 109, 0, 255],   // orange
    [123, 31, 162, 255],  // purple
    [0, 131, 143, 255],   // teal
];

/// How many line segments each quadratic curve span is flattened into.
const CURVE_STEPS: u32 = 8;

/// Configuration for the drawing surface.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Background color (RGBA).
    pub background: [u8; 4],
    /// Stroke width for trace paths, in pixels.
    pub line_width: f32,
    /// Radius of the filled marker drawn at every sample point.
    pub marker_radius: f32,
    /// Whether to draw the fixed origin marker after clearing.
    pub draw_origin: bool,
    /// Origin marker color (RGBA).
    pub origin_color: [u8; 4],
    /// Origin marker radius in pixels.
    pub origin_radius: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            background: [255, 255, 255, 255],
            line_width: 1.5,
            marker_radius: 2.5,
            draw_origin: true,
            origin_color: [117, 117, 117, 255],
            origin_radius: 3.5,
        }
    }
}

/// The 2D drawing surface traces are rendered onto.
///
/// All traces are anchored at the surface's fixed origin (its center).
#[derive(Debug)]
pub struct Canvas {
    img: RgbaImage,
    config: RenderConfig,
}

impl Canvas {
    /// Create a cleared canvas with the given configuration.
    pub fn new(config: RenderConfig) -> Self {
        let img = ImageBuffer::from_pixel(config.width, config.height, Rgba(config.background));
        Self { img, config }
    }

    /// The fixed origin every trace is anchored at.
    pub fn origin(&self) -> Coordinate {
        Coordinate::new(
            f64::from(self.config.width) / 2.0,
            f64::from(self.config.height) / 2.0,
        )
    }

    /// Reset the surface to the background color.
    pub fn clear(&mut self) {
        for pixel in self.img.pixels_mut() {
            *pixel = Rgba(self.config.background);
        }
    }

    /// Render zero or more models onto a cleared surface.
    ///
    /// The surface is cleared, the origin marker drawn, then each model is
    /// stroked in order with its palette color. A model with fewer than two
    /// points gets only markers; an empty model draws nothing.
    pub fn render_models(&mut self, models: &[Model]) {
        self.clear();
        if self.config.draw_origin {
            self.fill_disc(
                self.origin(),
                self.config.origin_radius,
                self.config.origin_color,
            );
        }

        for (index, model) in models.iter().enumerate() {
            let color = PALETTE[index % PALETTE.len()];
            self.draw_trace(&model.trace, color);
        }
    }

    /// Stroke one trace with the given color.
    fn draw_trace(&mut self, trace: &Trace, color: [u8; 4]) {
        let coords = trace_to_coordinates(trace, self.origin());
        if coords.is_empty() {
            return;
        }

        if coords.len() >= 2 {
            self.stroke_smoothed_path(&coords, color);
        }

        for coord in &coords {
            self.fill_disc(*coord, self.config.marker_radius, color);
        }
    }

    /// Stroke a smoothed path through the coordinates.
    ///
    /// Between consecutive points the curve is a quadratic span anchored at
    /// the current position, with `p[i]` as the control point and the
    /// midpoint of `p[i]` and `p[i + 1]` as the endpoint. The final point is
    /// connected with a straight segment.
    fn stroke_smoothed_path(&mut self, coords: &[Coordinate], color: [u8; 4]) {
        let mut current = coords[0];

        for i in 1..coords.len().saturating_sub(1) {
            let control = coords[i];
            let end = midpoint(coords[i], coords[i + 1]);
            self.stroke_quad(current, control, end, color);
            current = end;
        }

        self.stroke_line(current, coords[coords.len() - 1], color);
    }

    /// Flatten one quadratic span into short line segments and stroke them.
    fn stroke_quad(&mut self, from: Coordinate, control: Coordinate, to: Coordinate, color: [u8; 4]) {
        let mut prev = from;
        for step in 1..=CURVE_STEPS {
            let t = f64::from(step) / f64::from(CURVE_STEPS);
            let next = quad_point(from, control, to, t);
            self.stroke_line(prev, next, color);
            prev = next;
        }
    }

    /// Stroke a straight segment by stamping discs along it.
    fn stroke_line(&mut self, from: Coordinate, to: Coordinate, color: [u8; 4]) {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as u32;
        let radius = (self.config.line_width / 2.0).max(0.5);

        for step in 0..=steps {
            let t = f64::from(step) / f64::from(steps);
            let point = Coordinate::new(from.x + dx * t, from.y + dy * t);
            self.fill_disc(point, radius, color);
        }
    }

    /// Fill a solid disc, clipped to the surface.
    fn fill_disc(&mut self, center: Coordinate, radius: f32, color: [u8; 4]) {
        let r = f64::from(radius);
        let min_x = (center.x - r).floor() as i64;
        let max_x = (center.x + r).ceil() as i64;
        let min_y = (center.y - r).floor() as i64;
        let max_y = (center.y + r).ceil() as i64;

        for py in min_y..=max_y {
            for px in min_x..=max_x {
                if px < 0
                    || py < 0
                    || px >= i64::from(self.config.width)
                    || py >= i64::from(self.config.height)
                {
                    continue;
                }
                let dx = px as f64 - center.x;
                let dy = py as f64 - center.y;
                if dx * dx + dy * dy <= r * r {
                    self.img.put_pixel(px as u32, py as u32, Rgba(color));
                }
            }
        }
    }

    /// The underlying RGBA image.
    pub fn image(&self) -> &RgbaImage {
        &self.img
    }

    /// Read one pixel as RGBA.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.img.get_pixel(x, y).0
    }

    /// Encode the surface as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut cursor = Cursor::new(&mut data);
        self.img.write_to(&mut cursor, image::ImageFormat::Png)?;
        Ok(data)
    }
}

fn midpoint(a: Coordinate, b: Coordinate) -> Coordinate {
    Coordinate::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

fn quad_point(from: Coordinate, control: Coordinate, to: Coordinate, t: f64) -> Coordinate {
    let u = 1.0 - t;
    Coordinate::new(
        u * u * from.x + 2.0 * u * t * control.x + t * t * to.x,
        u * u * from.y + 2.0 * u * t * control.y + t * t * to.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Segment, Trace};

    fn canvas() -> Canvas {
        Canvas::new(RenderConfig::default())
    }

    #[test]
    fn test_zero_models_clears_surface() {
        let mut canvas = canvas();
        canvas.render_models(&[]);

        let config = RenderConfig::default();
        assert_eq!(canvas.pixel(0, 0), config.background);
        // origin marker is the only thing drawn
        let origin = canvas.origin();
        assert_eq!(
            canvas.pixel(origin.x as u32, origin.y as u32),
            config.origin_color
        );
    }

    #[test]
    fn test_single_segment_marker_position() {
        // angle 0, distance 10 puts the sample at (origin.x - 10, origin.y)
        let mut canvas = canvas();
        let model = Model::new(Trace::new(vec![Segment::new(0.0, 10.0)]));
        canvas.render_models(&[model]);

        let origin = canvas.origin();
        let px = (origin.x - 10.0) as u32;
        let py = origin.y as u32;
        assert_eq!(canvas.pixel(px, py), PALETTE[0]);
    }

    #[test]
    fn test_two_models_get_first_two_palette_colors() {
        let mut canvas = canvas();
        let near = Model::new(Trace::new(vec![Segment::new(0.0, 60.0)]));
        let far = Model::new(Trace::new(vec![Segment::new(0.0, 120.0)]));
        canvas.render_models(&[near, far]);

        let origin = canvas.origin();
        let y = origin.y as u32;
        assert_eq!(canvas.pixel((origin.x - 60.0) as u32, y), PALETTE[0]);
        assert_eq!(canvas.pixel((origin.x - 120.0) as u32, y), PALETTE[1]);
    }

    #[test]
    fn test_single_point_draws_no_path() {
        let mut canvas = canvas();
        let model = Model::new(Trace::new(vec![Segment::new(0.0, 40.0)]));
        canvas.render_models(&[model]);

        // halfway between origin and the lone marker nothing is stroked
        let origin = canvas.origin();
        let background = RenderConfig::default().background;
        assert_eq!(
            canvas.pixel((origin.x - 20.0) as u32, origin.y as u32),
            background
        );
    }

    #[test]
    fn test_two_points_connected_by_straight_segment() {
        let mut canvas = canvas();
        let model = Model::new(Trace::new(vec![
            Segment::new(0.0, 40.0),
            Segment::new(0.0, 40.0),
        ]));
        canvas.render_models(&[model]);

        // samples at origin.x - 40 and origin.x - 80; the midpoint between
        // them lies on the connecting stroke
        let origin = canvas.origin();
        assert_eq!(
            canvas.pixel((origin.x - 60.0) as u32, origin.y as u32),
            PALETTE[0]
        );
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let model = Model::new(Trace::new(vec![
            Segment::new(0.2, 25.0),
            Segment::new(-0.4, 18.0),
            Segment::new(0.9, 30.0),
        ]));

        let mut first = canvas();
        first.render_models(std::slice::from_ref(&model));
        let mut second = canvas();
        second.render_models(std::slice::from_ref(&model));
        second.render_models(std::slice::from_ref(&model));

        assert_eq!(first.image().as_raw(), second.image().as_raw());
    }

    #[test]
    fn test_png_export() {
        let mut canvas = canvas();
        canvas.render_models(&[Model::new(Trace::new(vec![Segment::new(0.0, 10.0)]))]);

        let png = canvas.to_png().unwrap();
        assert_eq!(&png[0..4], &[0x89, 0x50, 0x4E, 0x47]);
    }
}
