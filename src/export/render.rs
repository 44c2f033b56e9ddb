//! Draws a recorded path onto a PNG canvas.
//!
//! The path is fitted into the canvas (aspect ratio kept, centred inside the
//! padding) and flipped vertically, since recorded coordinates grow upwards.
//! Non-finite points are skipped.

use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};

use crate::models::TrajectoryPoint;
use crate::settings::ExportSettings;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PATH_COLOR: Rgba<u8> = Rgba([0, 122, 255, 255]);
const DOT_COLOR: Rgba<u8> = Rgba([255, 59, 48, 255]);
const DOT_RADIUS: i64 = 2;

pub fn render_trajectory(points: &[TrajectoryPoint], settings: &ExportSettings) -> RgbaImage {
    let width = settings.width.max(1);
    let height = settings.height.max(1);
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);

    let finite: Vec<&TrajectoryPoint> = points
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    if finite.is_empty() {
        return canvas;
    }

    let projection = Projection::fit(&finite, width, height, settings.padding);
    let mapped: Vec<(f64, f64)> = finite.iter().map(|p| projection.apply(p)).collect();

    let brush = i64::from(settings.line_width.max(1));
    for pair in mapped.windows(2) {
        draw_line(&mut canvas, pair[0], pair[1], brush, PATH_COLOR);
    }
    for &center in &mapped {
        fill_circle(&mut canvas, center, DOT_RADIUS, DOT_COLOR);
    }

    canvas
}

pub fn export_png(
    points: &[TrajectoryPoint],
    settings: &ExportSettings,
    path: &Path,
) -> Result<()> {
    settings.validate()?;
    let canvas = render_trajectory(points, settings);
    canvas
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write PNG to {}", path.display()))?;
    log::info!("Exported {} points to {}", points.len(), path.display());
    Ok(())
}

/// Maps trajectory coordinates onto canvas pixels.
struct Projection {
    min_x: f64,
    max_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Projection {
    fn fit(points: &[&TrajectoryPoint], width: u32, height: u32, padding: u32) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        let avail_w = f64::from(width.saturating_sub(padding.saturating_mul(2)).max(1));
        let avail_h = f64::from(height.saturating_sub(padding.saturating_mul(2)).max(1));
        let span_x = max_x - min_x;
        let span_y = max_y - min_y;

        let scale = match (span_x > 0.0, span_y > 0.0) {
            (true, true) => (avail_w / span_x).min(avail_h / span_y),
            (true, false) => avail_w / span_x,
            (false, true) => avail_h / span_y,
            (false, false) => 1.0,
        };

        let pad = f64::from(padding.min(width.min(height) / 2));
        Self {
            min_x,
            max_y,
            scale,
            offset_x: pad + (avail_w - span_x * scale) / 2.0,
            offset_y: pad + (avail_h - span_y * scale) / 2.0,
        }
    }

    fn apply(&self, p: &TrajectoryPoint) -> (f64, f64) {
        (
            self.offset_x + (p.x - self.min_x) * self.scale,
            self.offset_y + (self.max_y - p.y) * self.scale,
        )
    }
}

fn put_pixel_checked(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    canvas.put_pixel(x as u32, y as u32, color);
}

fn stamp(canvas: &mut RgbaImage, (x, y): (f64, f64), size: i64, color: Rgba<u8>) {
    let cx = x.round() as i64;
    let cy = y.round() as i64;
    let start = -(size / 2);
    for dy in start..start + size {
        for dx in start..start + size {
            put_pixel_checked(canvas, cx + dx, cy + dy, color);
        }
    }
}

fn draw_line(
    canvas: &mut RgbaImage,
    from: (f64, f64),
    to: (f64, f64),
    brush: i64,
    color: Rgba<u8>,
) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        stamp(canvas, (from.0 + dx * t, from.1 + dy * t), brush, color);
    }
}

fn fill_circle(canvas: &mut RgbaImage, (x, y): (f64, f64), radius: i64, color: Rgba<u8>) {
    let cx = x.round() as i64;
    let cy = y.round() as i64;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_checked(canvas, cx + dx, cy + dy, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> TrajectoryPoint {
        TrajectoryPoint::new(x, y, 0.0)
    }

    #[test]
    fn empty_path_is_blank_canvas() {
        let settings = ExportSettings::default();
        let canvas = render_trajectory(&[], &settings);
        assert_eq!(canvas.dimensions(), (800, 600));
        assert!(canvas.pixels().all(|px| *px == BACKGROUND));
    }

    #[test]
    fn single_point_is_centered() {
        let canvas = render_trajectory(&[p(37.0, 91.0)], &ExportSettings::default());
        assert_eq!(*canvas.get_pixel(400, 300), DOT_COLOR);
        assert_eq!(*canvas.get_pixel(0, 0), BACKGROUND);
    }

    #[test]
    fn horizontal_path_spans_padded_width() {
        let canvas = render_trajectory(&[p(0.0, 5.0), p(100.0, 5.0)], &ExportSettings::default());
        assert_eq!(*canvas.get_pixel(20, 300), DOT_COLOR);
        assert_eq!(*canvas.get_pixel(780, 300), DOT_COLOR);
        assert_eq!(*canvas.get_pixel(400, 300), PATH_COLOR);
        assert_eq!(*canvas.get_pixel(400, 100), BACKGROUND);
    }

    #[test]
    fn higher_points_render_nearer_the_top() {
        let canvas = render_trajectory(&[p(0.0, 0.0), p(0.0, 100.0)], &ExportSettings::default());
        // Vertical span fills 560 px; the upper point lands on the top padding.
        assert_eq!(*canvas.get_pixel(400, 20), DOT_COLOR);
        assert_eq!(*canvas.get_pixel(400, 580), DOT_COLOR);
    }

    #[test]
    fn non_finite_points_are_skipped() {
        let canvas = render_trajectory(
            &[p(f64::NAN, 0.0), p(10.0, 10.0)],
            &ExportSettings::default(),
        );
        assert_eq!(*canvas.get_pixel(400, 300), DOT_COLOR);
    }

    #[test]
    fn export_writes_a_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trail.png");
        let settings = ExportSettings {
            width: 64,
            height: 48,
            padding: 4,
            line_width: 1,
        };

        export_png(&[p(0.0, 0.0), p(3.0, 4.0)], &settings, &path).unwrap();

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn oversized_export_is_rejected_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.png");
        let settings = ExportSettings {
            width: 1_000_000,
            height: 1_000_000,
            ..ExportSettings::default()
        };

        assert!(export_png(&[p(0.0, 0.0), p(3.0, 4.0)], &settings, &path).is_err());
        assert!(!path.exists());
    }
}
