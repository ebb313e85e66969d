//! Footprint rasterization.
//!
//! Draws every footprint as a filled quadrilateral in lon/lat space, adds a
//! colorbar, title and axis labels, and encodes the canvas as PNG.
//!
//! The canvas is opaque (white background, opaque paints), so tiny-skia's
//! premultiplied pixels can be handed to the PNG encoder as straight RGBA.

use std::io::Write;
use std::path::{Path, PathBuf};

use footprint::{Extent, FootprintSet, FootprintSink, SinkReport};
use serde::{Deserialize, Serialize};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tracing::{debug, info};

use crate::colormap::{ramp, Color, ColorScale};
use crate::error::{RenderError, Result};
use crate::font::{self, Align};
use crate::png::encode_png;

/// Unit shown when neither the configuration nor the data names one.
pub const FALLBACK_UNIT: &str = "mol/m^2";

/// Reference canvas size the layout constants are designed for.
const BASE_WIDTH: f32 = 1600.0;
const BASE_HEIGHT: f32 = 1200.0;

/// Number of axis ticks per axis.
const AXIS_TICKS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    pub title: String,
    /// Colorbar unit label; defaults to the value unit of the data.
    pub unit_label: Option<String>,
    /// Margin around the footprints, as a fraction of their extent.
    pub padding: f64,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            width: 1600,
            height: 1200,
            title: "TEMPO NO2 Footprints".to_string(),
            unit_label: None,
            padding: 0.05,
        }
    }
}

/// What ended up on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Polygons drawn, filled or outline-only.
    pub drawn: usize,
    /// Polygons left out because a vertex was not finite.
    pub skipped: usize,
    /// Drawn polygons without fill because their value is missing.
    pub unfilled: usize,
}

/// Pixel rectangle, `[left, top, right, bottom]`.
pub type PixelRect = [f32; 4];

/// Placement of the plot, colorbar and labels on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    /// Size of one font pixel and of the base stroke width.
    pub scale: f32,
    pub plot: PixelRect,
    pub colorbar: PixelRect,
}

impl Layout {
    pub fn for_canvas(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let s = (w / BASE_WIDTH).min(h / BASE_HEIGHT);

        let plot = [150.0 * s, 110.0 * s, w - 330.0 * s, h - 130.0 * s];
        let bar_left = plot[2] + 50.0 * s;
        let colorbar = [bar_left, plot[1], bar_left + 40.0 * s, plot[3]];

        Self {
            width,
            height,
            scale: s,
            plot,
            colorbar,
        }
    }

    /// Font pixel size for a nominal size, snapped to whole pixels.
    fn font(&self, nominal: f32) -> f32 {
        (nominal * self.scale).round().max(1.0)
    }
}

/// Linear lon/lat to pixel mapping onto the plot area.
struct Projection {
    extent: Extent,
    plot: PixelRect,
}

impl Projection {
    fn project(&self, lon: f64, lat: f64) -> (f32, f32) {
        let [left, top, right, bottom] = self.plot;
        let fx = (lon - self.extent.min_lon) / self.extent.width();
        let fy = (lat - self.extent.min_lat) / self.extent.height();
        (
            left + fx as f32 * (right - left),
            bottom - fy as f32 * (bottom - top),
        )
    }
}

fn solid(color: Color, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = anti_alias;
    paint
}

fn thin_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        ..Stroke::default()
    }
}

fn rect_path(r: PixelRect) -> Option<tiny_skia::Path> {
    Rect::from_ltrb(r[0], r[1], r[2], r[3]).map(PathBuilder::from_rect)
}

/// Render footprints to PNG bytes.
pub fn render_png(
    footprints: &FootprintSet,
    config: &RasterConfig,
) -> Result<(Vec<u8>, RenderStats)> {
    if footprints.is_empty() {
        return Err(RenderError::EmptyInput);
    }
    let extent = footprints.extent().ok_or(RenderError::NothingToDraw {
        skipped: footprints.len(),
    })?;

    let layout = Layout::for_canvas(config.width, config.height);
    let mut pixmap = Pixmap::new(config.width, config.height).ok_or(RenderError::Canvas {
        width: config.width,
        height: config.height,
    })?;
    pixmap.fill(Color::WHITE.to_skia());

    let scale = footprints.value_range().map(ColorScale::from_range);
    let projection = Projection {
        extent: extent.padded(config.padding),
        plot: layout.plot,
    };

    let stats = draw_footprints(&mut pixmap, footprints, &projection, scale.as_ref(), &layout);
    if stats.drawn == 0 {
        return Err(RenderError::NothingToDraw {
            skipped: stats.skipped,
        });
    }

    let unit = config
        .unit_label
        .as_deref()
        .or(footprints.unit())
        .unwrap_or(FALLBACK_UNIT);

    draw_axes(&mut pixmap, &projection, &layout);
    draw_colorbar(&mut pixmap, scale.as_ref(), unit, &layout);

    let black = solid(Color::BLACK, false);
    font::draw_text(
        &mut pixmap,
        &config.title,
        config.width as f32 / 2.0,
        35.0 * layout.scale,
        layout.font(5.0),
        Align::Center,
        &black,
    );

    info!(
        drawn = stats.drawn,
        skipped = stats.skipped,
        unfilled = stats.unfilled,
        width = config.width,
        height = config.height,
        "Rendered footprint raster"
    );

    let software = concat!("footprints ", env!("CARGO_PKG_VERSION"));
    let png = encode_png(
        pixmap.data(),
        config.width as usize,
        config.height as usize,
        &[("Title", config.title.as_str()), ("Unit", unit), ("Software", software)],
    )?;
    Ok((png, stats))
}

fn draw_footprints(
    pixmap: &mut Pixmap,
    footprints: &FootprintSet,
    projection: &Projection,
    scale: Option<&ColorScale>,
    layout: &Layout,
) -> RenderStats {
    let outline = solid(Color::BLACK, true);
    let stroke = thin_stroke((0.8 * layout.scale).max(0.5));
    let mut stats = RenderStats::default();

    for fp in footprints {
        if !fp.polygon.is_finite() {
            debug!(row = fp.row, col = fp.col, "Skipping footprint with non-finite vertex");
            stats.skipped += 1;
            continue;
        }

        let mut pb = PathBuilder::new();
        for (i, &[lon, lat]) in fp.polygon.vertices().iter().enumerate() {
            let (x, y) = projection.project(lon, lat);
            if i == 0 {
                pb.move_to(x, y);
            } else {
                pb.line_to(x, y);
            }
        }
        pb.close();

        let Some(path) = pb.finish() else {
            debug!(row = fp.row, col = fp.col, "Skipping degenerate footprint");
            stats.skipped += 1;
            continue;
        };

        match scale.and_then(|s| s.color(fp.value)) {
            Some(color) => {
                let fill = solid(color, true);
                pixmap.fill_path(&path, &fill, FillRule::Winding, Transform::identity(), None);
            }
            None => stats.unfilled += 1,
        }
        pixmap.stroke_path(&path, &outline, &stroke, Transform::identity(), None);
        stats.drawn += 1;
    }

    stats
}

/// Decimal places that keep neighbouring tick labels distinct.
fn coordinate_decimals(step: f64) -> usize {
    match step.abs() {
        s if s >= 5.0 => 0,
        s if s >= 0.5 => 1,
        s if s >= 0.05 => 2,
        _ => 3,
    }
}

/// Compact label for a data value.
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if value == 0.0 {
        "0".to_string()
    } else if (1e-2..1e4).contains(&magnitude) {
        format!("{:.3}", value)
    } else {
        format!("{:.2e}", value)
    }
}

fn draw_axes(pixmap: &mut Pixmap, projection: &Projection, layout: &Layout) {
    let black = solid(Color::BLACK, false);
    let frame_stroke = thin_stroke((1.5 * layout.scale).max(1.0));
    if let Some(frame) = rect_path(layout.plot) {
        pixmap.stroke_path(&frame, &black, &frame_stroke, Transform::identity(), None);
    }

    let [left, top, right, bottom] = layout.plot;
    let tick_len = 10.0 * layout.scale;
    let tick_font = layout.font(2.0);
    let extent = projection.extent;
    let lon_step = extent.width() / (AXIS_TICKS - 1) as f64;
    let lat_step = extent.height() / (AXIS_TICKS - 1) as f64;

    let mut ticks = PathBuilder::new();
    for i in 0..AXIS_TICKS {
        let lon = extent.min_lon + lon_step * i as f64;
        let (x, _) = projection.project(lon, extent.min_lat);
        ticks.move_to(x, bottom);
        ticks.line_to(x, bottom + tick_len);
        let label = format!("{:.*}", coordinate_decimals(lon_step), lon);
        font::draw_text(
            pixmap,
            &label,
            x,
            bottom + tick_len + 6.0 * layout.scale,
            tick_font,
            Align::Center,
            &black,
        );

        let lat = extent.min_lat + lat_step * i as f64;
        let (_, y) = projection.project(extent.min_lon, lat);
        ticks.move_to(left - tick_len, y);
        ticks.line_to(left, y);
        let label = format!("{:.*}", coordinate_decimals(lat_step), lat);
        font::draw_text(
            pixmap,
            &label,
            left - tick_len - 6.0 * layout.scale,
            y - font::text_height(tick_font) / 2.0,
            tick_font,
            Align::Right,
            &black,
        );
    }
    if let Some(path) = ticks.finish() {
        pixmap.stroke_path(&path, &black, &frame_stroke, Transform::identity(), None);
    }

    let label_font = layout.font(3.0);
    font::draw_text(
        pixmap,
        "Longitude",
        (left + right) / 2.0,
        bottom + 70.0 * layout.scale,
        label_font,
        Align::Center,
        &black,
    );
    font::draw_text_vertical(
        pixmap,
        "Latitude",
        25.0 * layout.scale,
        (top + bottom) / 2.0,
        label_font,
        &black,
    );
}

fn draw_colorbar(pixmap: &mut Pixmap, scale: Option<&ColorScale>, unit: &str, layout: &Layout) {
    let [left, top, right, bottom] = layout.colorbar;
    let height = bottom - top;
    let strips = height.ceil().max(1.0) as usize;

    for i in 0..strips {
        let y = top + i as f32;
        let t = 1.0 - (i as f64 + 0.5) / strips as f64;
        let strip_h = (bottom - y).min(1.0);
        if let Some(rect) = Rect::from_xywh(left, y, right - left, strip_h) {
            pixmap.fill_rect(rect, &solid(ramp(t), false), Transform::identity(), None);
        }
    }

    let black = solid(Color::BLACK, false);
    let stroke = thin_stroke((1.5 * layout.scale).max(1.0));
    if let Some(frame) = rect_path(layout.colorbar) {
        pixmap.stroke_path(&frame, &black, &stroke, Transform::identity(), None);
    }

    let tick_font = layout.font(2.0);
    let tick_len = 8.0 * layout.scale;
    match scale {
        Some(scale) => {
            let mut ticks = PathBuilder::new();
            for (value, y) in [
                (scale.max(), top),
                (scale.mid(), (top + bottom) / 2.0),
                (scale.min(), bottom),
            ] {
                ticks.move_to(right, y);
                ticks.line_to(right + tick_len, y);
                font::draw_text(
                    pixmap,
                    &format_value(value),
                    right + tick_len + 6.0 * layout.scale,
                    y - font::text_height(tick_font) / 2.0,
                    tick_font,
                    Align::Left,
                    &black,
                );
            }
            if let Some(path) = ticks.finish() {
                pixmap.stroke_path(&path, &black, &stroke, Transform::identity(), None);
            }
        }
        None => debug!("No finite values, colorbar left without ticks"),
    }

    font::draw_text(
        pixmap,
        unit,
        (left + right) / 2.0,
        top - 40.0 * layout.scale,
        layout.font(3.0),
        Align::Center,
        &black,
    );
}

/// Write `bytes` to a temporary file next to `path`, then move it into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Render footprints and persist the PNG at `output_path`.
pub fn render(
    footprints: &FootprintSet,
    output_path: &Path,
    config: &RasterConfig,
) -> Result<(RenderStats, u64)> {
    let (png, stats) = render_png(footprints, config)?;
    write_atomic(output_path, &png).map_err(|source| RenderError::Io {
        path: output_path.to_path_buf(),
        source,
    })?;
    Ok((stats, png.len() as u64))
}

/// Raster output of the footprint pipeline.
#[derive(Debug, Clone)]
pub struct RasterSink {
    path: PathBuf,
    config: RasterConfig,
}

impl RasterSink {
    pub fn new(path: impl Into<PathBuf>, config: RasterConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }
}

impl FootprintSink for RasterSink {
    type Error = RenderError;

    fn name(&self) -> &'static str {
        "raster"
    }

    fn write(&self, footprints: &FootprintSet) -> Result<SinkReport> {
        let (stats, bytes) = render(footprints, &self.path, &self.config)?;
        Ok(SinkReport {
            sink: self.name(),
            path: self.path.clone(),
            features: stats.drawn,
            bytes,
        })
    }
}
