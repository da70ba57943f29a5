//! Camera geometry: per-pixel positions, radii, and pixel type.
//!
//! A [`CameraGeometry`] describes the physical layout of a camera's
//! photosensor pixels on the focal plane. It is immutable once built; the
//! display only reads from it. Positions and radii share a coordinate unit
//! (typically meters on the focal plane), carried as a label for axis
//! annotation.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CamVizError, Result};

/// Shape of the individual photosensor pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelType {
    /// Regular hexagonal pixels (PMT cameras). The only type the display renders.
    Hexagonal,
    /// Square pixels (SiPM cameras). Not yet supported by the display.
    Square,
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelType::Hexagonal => write!(f, "hexagonal"),
            PixelType::Square => write!(f, "square"),
        }
    }
}

/// Layout of a camera's pixels on the focal plane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraGeometry {
    pix_x: Array1<f64>,
    pix_y: Array1<f64>,
    pix_r: Array1<f64>,
    pix_type: PixelType,
    unit: String,
}

impl CameraGeometry {
    /// Create a geometry from per-pixel coordinate and radius arrays.
    ///
    /// `unit` is the coordinate unit label used for axis annotation (e.g. "m").
    /// All three arrays must have one entry per pixel.
    pub fn new(
        pix_x: Array1<f64>,
        pix_y: Array1<f64>,
        pix_r: Array1<f64>,
        pix_type: PixelType,
        unit: impl Into<String>,
    ) -> Result<Self> {
        if pix_x.len() != pix_y.len() || pix_x.len() != pix_r.len() {
            return Err(CamVizError::MismatchedLengths {
                x_len: pix_x.len(),
                y_len: pix_y.len(),
                r_len: pix_r.len(),
            });
        }

        Ok(Self {
            pix_x,
            pix_y,
            pix_r,
            pix_type,
            unit: unit.into(),
        })
    }

    /// Build a camera of hexagonal pixels arranged in `rings` concentric
    /// rings around a central pixel, pointy-top orientation.
    ///
    /// Pixel count is `1 + 3 * rings * (rings + 1)`. `pix_radius` is the
    /// circumradius of each pixel; neighboring centers are spaced so the
    /// hexagons tile without gaps.
    pub fn hexagonal_grid(rings: usize, pix_radius: f64, unit: impl Into<String>) -> Result<Self> {
        let mut xs = Vec::new();
        let mut ys = Vec::new();

        let rings = rings as i64;
        for q in -rings..=rings {
            for r in (-rings).max(-q - rings)..=rings.min(-q + rings) {
                // Axial hex coordinates to cartesian, pointy-top tiling
                let x = 3f64.sqrt() * pix_radius * (q as f64 + r as f64 / 2.0);
                let y = 1.5 * pix_radius * r as f64;
                xs.push(x);
                ys.push(y);
            }
        }

        let npix = xs.len();
        Self::new(
            Array1::from_vec(xs),
            Array1::from_vec(ys),
            Array1::from_elem(npix, pix_radius),
            PixelType::Hexagonal,
            unit,
        )
    }

    /// Number of pixels in the camera.
    pub fn npix(&self) -> usize {
        self.pix_x.len()
    }

    /// Per-pixel x positions.
    pub fn pix_x(&self) -> &Array1<f64> {
        &self.pix_x
    }

    /// Per-pixel y positions.
    pub fn pix_y(&self) -> &Array1<f64> {
        &self.pix_y
    }

    /// Per-pixel radii (circumradius of the pixel shape).
    pub fn pix_r(&self) -> &Array1<f64> {
        &self.pix_r
    }

    /// Shape of the pixels.
    pub fn pix_type(&self) -> PixelType {
        self.pix_type
    }

    /// Coordinate unit label, e.g. "m".
    pub fn unit(&self) -> &str {
        &self.unit
    }
}
