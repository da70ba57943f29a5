//! Camera pixel-layout visualization for telescope images.
//!
//! This crate draws a telescope camera's pixel grid as a 2D plot, colors
//! each pixel by a per-pixel intensity value, and can overlay a fitted
//! moment ellipse summarizing a reconstructed image shape. It is a thin
//! display adapter over [`plotters`]: the camera geometry and the image
//! values come from elsewhere, and every operation is a direct delegation
//! to plotting primitives.
//!
//! # Core Modules
//!
//! - [`geometry`]: camera pixel positions, radii, and pixel type
//! - [`colormap`]: intensity-to-color mapping (jet, or any plotters colormap)
//! - [`display`]: the [`CameraDisplay`](display::CameraDisplay) itself
//!
//! # Example
//!
//! ```rust,no_run
//! use camviz::display::CameraDisplay;
//! use camviz::geometry::CameraGeometry;
//! use plotters::prelude::*;
//!
//! let geom = CameraGeometry::hexagonal_grid(5, 0.05, "m")?;
//! let root = BitMapBackend::new("camera.png", (800, 800)).into_drawing_area();
//! let mut display = CameraDisplay::new(&geom, root)?;
//!
//! let image = ndarray::Array1::from_elem(geom.npix(), 1.0);
//! display.draw_image(image.view())?;
//! # Ok::<(), camviz::CamVizError>(())
//! ```

use thiserror::Error;

use crate::geometry::PixelType;

/// Errors raised by camera display operations.
#[derive(Debug, Error)]
pub enum CamVizError {
    /// The camera geometry uses a pixel type the display cannot render.
    ///
    /// Raised at construction; only hexagonal pixels are implemented.
    #[error("unimplemented pixel type: {0}")]
    UnsupportedPixelType(PixelType),

    /// An image array does not have one value per camera pixel.
    #[error("image has {actual} values but the camera geometry has {expected} pixels")]
    ImageShapeMismatch { expected: usize, actual: usize },

    /// Geometry construction received per-pixel arrays of different lengths.
    #[error("pixel coordinate arrays have mismatched lengths: x={x_len}, y={y_len}, r={r_len}")]
    MismatchedLengths {
        x_len: usize,
        y_len: usize,
        r_len: usize,
    },

    /// A plotters drawing operation failed.
    ///
    /// Stringified because plotters errors are generic over the backend.
    #[error("drawing backend error: {0}")]
    Backend(String),
}

/// Standard Result type for all camera display operations.
pub type Result<T> = std::result::Result<T, CamVizError>;

pub mod colormap;
pub mod display;
pub mod geometry;
