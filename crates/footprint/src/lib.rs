//! Pixel footprint extraction from swath grids.
//!
//! The flow is strictly one-directional:
//!
//! 1. [`select`] marks the grid cells of interest from their center
//!    coordinates, optionally within a radius of a [`ReferencePoint`].
//! 2. [`build`] turns every selected cell into a [`Footprint`]: its four
//!    corner vertices plus the measured value.
//! 3. [`fan_out`] hands the resulting [`FootprintSet`] to two independent
//!    [`FootprintSink`]s which run concurrently.
//!
//! Nothing here mutates the swath; every stage consumes the previous stage's
//! output by reference.

pub mod build;
pub mod error;
pub mod select;
pub mod sink;

pub use build::{build, Extent, Footprint, FootprintSet, Quad};
pub use error::{FootprintError, Result};
pub use select::{select, ReferencePoint, SelectionMask, DEFAULT_RADIUS};
pub use sink::{fan_out, FootprintSink, SinkReport};
