//! Intensity-to-color mapping for camera pixels.
//!
//! The display accepts any colormap implementing plotters' [`ColorMap`]
//! trait, so the stock plotters maps (`ViridisRGB`, `Copper`, ...) work
//! directly. This module adds [`Jet`], the classic rainbow map long used as
//! the default for Cherenkov camera images, which plotters does not ship.

use plotters::style::RGBColor;

pub use plotters::style::colors::colormaps::{ColorMap, ViridisRGB};

/// The classic "jet" rainbow colormap: dark blue through green to dark red.
///
/// Default colormap of [`CameraDisplay`](crate::display::CameraDisplay).
#[derive(Debug, Clone, Copy, Default)]
pub struct Jet;

impl Jet {
    fn channel(value: f32) -> u8 {
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

impl ColorMap<RGBColor> for Jet {
    fn get_color_normalized(&self, h: f32, min: f32, max: f32) -> RGBColor {
        let span = max - min;
        // Degenerate or junk inputs map to the low end rather than panic
        let t = if span.abs() > f32::EPSILON && h.is_finite() {
            ((h - min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Piecewise-linear ramps of the MATLAB jet colormap
        let r = Self::channel(1.5 - (4.0 * t - 3.0).abs());
        let g = Self::channel(1.5 - (4.0 * t - 2.0).abs());
        let b = Self::channel(1.5 - (4.0 * t - 1.0).abs());
        RGBColor(r, g, b)
    }
}
