//! Raster rendering of pixel footprints.
//!
//! - [`colormap`]: value to color mapping on a viridis ramp
//! - [`font`]: `font8x8` bitmap text for titles, ticks and labels
//! - [`png`]: PNG encoding (indexed or RGBA) with text metadata
//! - [`raster`]: the footprint plot and the [`RasterSink`]

pub mod colormap;
pub mod error;
pub mod font;
pub mod png;
pub mod raster;

pub use colormap::{Color, ColorScale};
pub use error::{RenderError, Result};
pub use raster::{render, render_png, Layout, RasterConfig, RasterSink, RenderStats};
