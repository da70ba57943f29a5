//! Camera display: renders a pixel layout with per-pixel intensities.
//!
//! [`CameraDisplay`] wraps a plotters drawing area. Construction lays out
//! one hexagonal marker per camera pixel and renders an all-zero image;
//! afterwards [`draw_image`](CameraDisplay::draw_image) replaces the value
//! array and re-renders, and
//! [`add_moment_ellipse`](CameraDisplay::add_moment_ellipse) overlays a
//! fitted ellipse on top of the camera.
//!
//! plotters is immediate-mode, so every mutating call re-renders the full
//! scene and presents the drawing area. Overlay ellipses added so far are
//! retained by the display and survive redraws.

use ndarray::{Array1, ArrayView1};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::colors::colormaps::ColorMap;
use std::f64::consts::PI;
use std::ops::Range;

use crate::colormap::Jet;
use crate::geometry::{CameraGeometry, PixelType};
use crate::{CamVizError, Result};

/// Empirical tuning factor of the radius-to-marker-size transform.
///
/// A known approximation, not a derived formula.
const RADIUS_TO_SIZE: f64 = 550.0;

/// Number of line segments used to approximate an ellipse outline.
const ELLIPSE_SEGMENTS: usize = 72;

/// Convert a pixel radius in data units to a marker size.
///
/// The size is in squared screen units; the marker's on-screen radius is
/// `size.sqrt()` backend pixels.
pub(crate) fn radius_to_size(radius: f64) -> f64 {
    radius * PI * RADIUS_TO_SIZE
}

/// Line style for a moment ellipse overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseStyle {
    pub color: RGBColor,
    pub stroke_width: u32,
}

impl Default for EllipseStyle {
    fn default() -> Self {
        Self {
            color: RED,
            stroke_width: 2,
        }
    }
}

/// An unfilled ellipse summarizing a reconstructed image's centroid and spread.
///
/// Returned to the caller by
/// [`add_moment_ellipse`](CameraDisplay::add_moment_ellipse); the display
/// keeps its own copy for redraws.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentEllipse {
    /// Center of the ellipse in camera coordinates.
    pub centroid: (f64, f64),
    /// Major axis extent (along local y before rotation).
    pub length: f64,
    /// Minor axis extent (along local x before rotation).
    pub width: f64,
    /// Rotation angle in degrees, counterclockwise.
    pub angle_deg: f64,
    /// Third-order moment for directionality. Accepted and stored but not
    /// yet used in rendering.
    pub asymmetry: f64,
    /// Outline style.
    pub style: EllipseStyle,
}

impl MomentEllipse {
    /// Sample the ellipse outline as a closed polyline in camera coordinates.
    fn outline(&self) -> Vec<(f64, f64)> {
        let (cx, cy) = self.centroid;
        let (sin_phi, cos_phi) = self.angle_deg.to_radians().sin_cos();

        (0..=ELLIPSE_SEGMENTS)
            .map(|i| {
                let t = 2.0 * PI * i as f64 / ELLIPSE_SEGMENTS as f64;
                let ex = 0.5 * self.width * t.cos();
                let ey = 0.5 * self.length * t.sin();
                (
                    cx + ex * cos_phi - ey * sin_phi,
                    cy + ex * sin_phi + ey * cos_phi,
                )
            })
            .collect()
    }
}

/// Renders a camera's pixel layout and image values onto a drawing area.
///
/// The marker collection is built once at construction and always has one
/// marker per geometry pixel; only the per-pixel value array changes
/// afterwards. The display assumes exclusive single-threaded ownership of
/// its drawing area.
pub struct CameraDisplay<'a, DB: DrawingBackend> {
    area: DrawingArea<DB, Shift>,
    geom: &'a CameraGeometry,
    sizes: Vec<f64>,
    values: Array1<f64>,
    cmap: Box<dyn ColorMap<RGBColor>>,
    ellipses: Vec<MomentEllipse>,
    title: String,
    x_range: Range<f64>,
    y_range: Range<f64>,
}

fn backend_err(e: impl std::fmt::Display) -> CamVizError {
    CamVizError::Backend(e.to_string())
}

impl<'a, DB: DrawingBackend> CameraDisplay<'a, DB> {
    /// Create a display with the default title `"Camera"`.
    pub fn new(geom: &'a CameraGeometry, area: DrawingArea<DB, Shift>) -> Result<Self> {
        Self::with_title(geom, area, "Camera")
    }

    /// Create a display for `geom` on `area`, render an all-zero image.
    ///
    /// Fails with [`CamVizError::UnsupportedPixelType`] unless the geometry
    /// uses hexagonal pixels.
    pub fn with_title(
        geom: &'a CameraGeometry,
        area: DrawingArea<DB, Shift>,
        title: &str,
    ) -> Result<Self> {
        if geom.pix_type() != PixelType::Hexagonal {
            return Err(CamVizError::UnsupportedPixelType(geom.pix_type()));
        }

        let sizes: Vec<f64> = geom.pix_r().iter().map(|&r| radius_to_size(r)).collect();
        let (x_range, y_range) = data_bounds(geom, area.dim_in_pixel());

        log::debug!(
            "camera display: {} hexagonal pixels, x {:?}, y {:?}",
            geom.npix(),
            x_range,
            y_range
        );

        let display = Self {
            area,
            geom,
            sizes,
            values: Array1::zeros(geom.npix()),
            cmap: Box::new(Jet),
            ellipses: Vec::new(),
            title: title.to_string(),
            x_range,
            y_range,
        };
        display.render()?;
        Ok(display)
    }

    /// Replace the colormap used to translate intensities into colors.
    ///
    /// Takes effect on the next redraw.
    pub fn set_cmap<C>(&mut self, cmap: C)
    where
        C: ColorMap<RGBColor> + 'static,
    {
        self.cmap = Box::new(cmap);
    }

    /// Replace the per-pixel value array and re-render the display.
    ///
    /// `image` must hold exactly one value per camera pixel; otherwise the
    /// call fails with [`CamVizError::ImageShapeMismatch`] and the stored
    /// values are left unchanged.
    pub fn draw_image(&mut self, image: ArrayView1<'_, f64>) -> Result<()> {
        if image.len() != self.values.len() {
            return Err(CamVizError::ImageShapeMismatch {
                expected: self.values.len(),
                actual: image.len(),
            });
        }
        self.values.assign(&image);
        self.render()
    }

    /// Overlay an unfilled ellipse on top of the camera and re-render.
    ///
    /// `phi` is the rotation angle in radians, converted to degrees for
    /// storage. `asymmetry` is accepted but has no rendering effect yet.
    /// Returns the created overlay; the display keeps its own copy so the
    /// ellipse survives later redraws, and never removes it.
    pub fn add_moment_ellipse(
        &mut self,
        centroid: (f64, f64),
        length: f64,
        width: f64,
        phi: f64,
        asymmetry: f64,
        style: EllipseStyle,
    ) -> Result<MomentEllipse> {
        let ellipse = MomentEllipse {
            centroid,
            length,
            width,
            angle_deg: phi.to_degrees(),
            asymmetry,
            style,
        };
        self.ellipses.push(ellipse.clone());
        self.render()?;
        Ok(ellipse)
    }

    /// Number of pixel markers, equal to the geometry's pixel count.
    pub fn pixel_count(&self) -> usize {
        self.values.len()
    }

    /// Currently displayed per-pixel values.
    pub fn image(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    /// Chart title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The camera geometry this display renders.
    pub fn geometry(&self) -> &CameraGeometry {
        self.geom
    }

    /// Render the full scene and present the drawing area.
    fn render(&self) -> Result<()> {
        self.area.fill(&WHITE).map_err(backend_err)?;

        let mut chart = ChartBuilder::on(&self.area)
            .caption(&self.title, ("sans-serif", 30))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(self.x_range.clone(), self.y_range.clone())
            .map_err(backend_err)?;

        chart
            .configure_mesh()
            .disable_mesh()
            .x_desc(format!("X position ({})", self.geom.unit()))
            .y_desc(format!("Y position ({})", self.geom.unit()))
            .draw()
            .map_err(backend_err)?;

        // Normalize colors over the current value range
        let (vmin, vmax) = value_range(&self.values);
        let span = vmax - vmin;

        let xs = self.geom.pix_x();
        let ys = self.geom.pix_y();
        chart
            .draw_series((0..self.values.len()).map(|i| {
                let v = self.values[i];
                let t = if span > 0.0 && v.is_finite() {
                    (((v - vmin) / span) as f32).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let color = self.cmap.get_color(t);
                // Zero-width outline: fill only
                EmptyElement::at((xs[i], ys[i]))
                    + Polygon::new(hexagon_offsets(self.sizes[i]), color.filled())
            }))
            .map_err(backend_err)?;

        for ellipse in &self.ellipses {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    ellipse.outline(),
                    ellipse.style.color.stroke_width(ellipse.style.stroke_width),
                )))
                .map_err(backend_err)?;
        }

        self.area.present().map_err(backend_err)
    }
}

/// Pixel offsets of a pointy-top hexagon marker with the given size.
fn hexagon_offsets(size: f64) -> Vec<(i32, i32)> {
    let screen_r = size.max(0.0).sqrt();
    (0..6)
        .map(|k| {
            let angle = PI / 2.0 + k as f64 * PI / 3.0;
            // Backend y axis points down
            (
                (screen_r * angle.cos()).round() as i32,
                (-screen_r * angle.sin()).round() as i32,
            )
        })
        .collect()
}

/// Finite min/max of the value array, (0, 0) if none.
fn value_range(values: &Array1<f64>) -> (f64, f64) {
    let mut vmin = f64::INFINITY;
    let mut vmax = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        vmin = vmin.min(v);
        vmax = vmax.max(v);
    }
    if vmin > vmax {
        (0.0, 0.0)
    } else {
        (vmin, vmax)
    }
}

/// Data ranges that fit every pixel with a margin, stretched so both axes
/// share the same data-units-per-pixel scale on the plot area.
fn data_bounds(geom: &CameraGeometry, area_dim: (u32, u32)) -> (Range<f64>, Range<f64>) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let mut max_r: f64 = 0.0;

    for i in 0..geom.npix() {
        x_min = x_min.min(geom.pix_x()[i]);
        x_max = x_max.max(geom.pix_x()[i]);
        y_min = y_min.min(geom.pix_y()[i]);
        y_max = y_max.max(geom.pix_y()[i]);
        max_r = max_r.max(geom.pix_r()[i]);
    }

    if geom.npix() == 0 {
        return (-1.0..1.0, -1.0..1.0);
    }

    let pad_x = max_r + 0.05 * (x_max - x_min).max(2.0 * max_r).max(f64::MIN_POSITIVE);
    let pad_y = max_r + 0.05 * (y_max - y_min).max(2.0 * max_r).max(f64::MIN_POSITIVE);
    let mut x_span = (x_max - x_min) + 2.0 * pad_x;
    let mut y_span = (y_max - y_min) + 2.0 * pad_y;
    if x_span <= f64::EPSILON {
        x_span = 1.0;
    }
    if y_span <= f64::EPSILON {
        y_span = 1.0;
    }

    // Approximate plot area inside margins, caption, and label areas; the
    // constants match those used by render()
    let plot_w = (area_dim.0 as f64 - 50.0 - 20.0).max(1.0);
    let plot_h = (area_dim.1 as f64 - 40.0 - 40.0 - 20.0).max(1.0);
    let aspect = plot_w / plot_h;

    // Widen the narrower axis to equalize scale
    if x_span < y_span * aspect {
        x_span = y_span * aspect;
    } else {
        y_span = x_span / aspect;
    }

    let x_mid = 0.5 * (x_min + x_max);
    let y_mid = 0.5 * (y_min + y_max);
    (
        (x_mid - 0.5 * x_span)..(x_mid + 0.5 * x_span),
        (y_mid - 0.5 * y_span)..(y_mid + 0.5 * y_span),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colormap::ViridisRGB;
    use approx::assert_relative_eq;
    use ndarray::array;

    const DIM: (u32, u32) = (400, 400);

    fn three_pixel_geometry() -> CameraGeometry {
        CameraGeometry::new(
            array![0.0, 1.0, 0.0],
            array![0.0, 0.0, 1.0],
            array![0.1, 0.1, 0.1],
            PixelType::Hexagonal,
            "m",
        )
        .unwrap()
    }

    fn buffer() -> Vec<u8> {
        vec![0u8; (DIM.0 * DIM.1 * 3) as usize]
    }

    #[test]
    fn test_construction_matches_pixel_count() {
        let _ = env_logger::builder().is_test(true).try_init();
        let geom = three_pixel_geometry();
        let mut buf = buffer();
        let area = BitMapBackend::with_buffer(&mut buf, DIM).into_drawing_area();

        let display = CameraDisplay::new(&geom, area).unwrap();
        assert_eq!(display.pixel_count(), 3);
        assert_eq!(display.title(), "Camera");
        // Initial image is all zeros
        assert!(display.image().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_hexgrid_construction() {
        let _ = env_logger::builder().is_test(true).try_init();
        let geom = CameraGeometry::hexagonal_grid(2, 0.05, "m").unwrap();
        let mut buf = buffer();
        let area = BitMapBackend::with_buffer(&mut buf, DIM).into_drawing_area();

        let display = CameraDisplay::with_title(&geom, area, "Test Camera").unwrap();
        assert_eq!(display.pixel_count(), 19);
        assert_eq!(display.title(), "Test Camera");
    }

    #[test]
    fn test_square_pixels_rejected() {
        let _ = env_logger::builder().is_test(true).try_init();
        let geom = CameraGeometry::new(
            array![0.0],
            array![0.0],
            array![0.1],
            PixelType::Square,
            "m",
        )
        .unwrap();
        let mut buf = buffer();
        let area = BitMapBackend::with_buffer(&mut buf, DIM).into_drawing_area();

        let result = CameraDisplay::new(&geom, area);
        assert!(matches!(
            result,
            Err(CamVizError::UnsupportedPixelType(PixelType::Square))
        ));
    }

    #[test]
    fn test_draw_image_stores_values() {
        let _ = env_logger::builder().is_test(true).try_init();
        let geom = three_pixel_geometry();
        let mut buf = buffer();
        let area = BitMapBackend::with_buffer(&mut buf, DIM).into_drawing_area();
        let mut display = CameraDisplay::new(&geom, area).unwrap();

        let image = array![1.0, 2.0, 3.0];
        display.draw_image(image.view()).unwrap();
        assert_eq!(display.image().to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_draw_image_shape_mismatch_keeps_previous_values() {
        let _ = env_logger::builder().is_test(true).try_init();
        let geom = three_pixel_geometry();
        let mut buf = buffer();
        let area = BitMapBackend::with_buffer(&mut buf, DIM).into_drawing_area();
        let mut display = CameraDisplay::new(&geom, area).unwrap();

        display.draw_image(array![1.0, 2.0, 3.0].view()).unwrap();

        let result = display.draw_image(array![1.0, 2.0].view());
        assert!(matches!(
            result,
            Err(CamVizError::ImageShapeMismatch {
                expected: 3,
                actual: 2
            })
        ));
        // Previous image untouched
        assert_eq!(display.image().to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_add_moment_ellipse_returns_overlay() {
        let _ = env_logger::builder().is_test(true).try_init();
        let geom = three_pixel_geometry();
        let mut buf = buffer();
        let area = BitMapBackend::with_buffer(&mut buf, DIM).into_drawing_area();
        let mut display = CameraDisplay::new(&geom, area).unwrap();

        let phi = std::f64::consts::FRAC_PI_4;
        let ellipse = display
            .add_moment_ellipse((0.3, 0.4), 0.8, 0.2, phi, 0.1, EllipseStyle::default())
            .unwrap();

        assert_relative_eq!(ellipse.angle_deg, 45.0, epsilon = 1e-12);
        assert_relative_eq!(ellipse.length, 0.8);
        assert_relative_eq!(ellipse.width, 0.2);
        assert_relative_eq!(ellipse.centroid.0, 0.3);
        assert_relative_eq!(ellipse.centroid.1, 0.4);
        assert_relative_eq!(ellipse.asymmetry, 0.1);
    }

    #[test]
    fn test_set_cmap_and_redraw() {
        let _ = env_logger::builder().is_test(true).try_init();
        let geom = three_pixel_geometry();
        let mut buf = buffer();
        let area = BitMapBackend::with_buffer(&mut buf, DIM).into_drawing_area();
        let mut display = CameraDisplay::new(&geom, area).unwrap();

        display.set_cmap(ViridisRGB);
        display.draw_image(array![0.0, 0.5, 1.0].view()).unwrap();
        assert_eq!(display.image().to_vec(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_radius_to_size_scale() {
        assert_relative_eq!(radius_to_size(0.1), 0.1 * PI * 550.0);
        assert_relative_eq!(radius_to_size(0.0), 0.0);
    }

    #[test]
    fn test_ellipse_outline_geometry() {
        let ellipse = MomentEllipse {
            centroid: (1.0, 2.0),
            length: 2.0,
            width: 1.0,
            angle_deg: 0.0,
            asymmetry: 0.0,
            style: EllipseStyle::default(),
        };

        let outline = ellipse.outline();
        assert_eq!(outline.len(), ELLIPSE_SEGMENTS + 1);
        // Closed path
        assert_relative_eq!(outline[0].0, outline[ELLIPSE_SEGMENTS].0, epsilon = 1e-9);
        assert_relative_eq!(outline[0].1, outline[ELLIPSE_SEGMENTS].1, epsilon = 1e-9);
        // Unrotated: x extent is width/2, y extent is length/2 around the centroid
        for (x, y) in &outline {
            assert!((x - 1.0).abs() <= 0.5 + 1e-9);
            assert!((y - 2.0).abs() <= 1.0 + 1e-9);
        }
        assert_relative_eq!(outline[0].0, 1.5, epsilon = 1e-9);
        assert_relative_eq!(outline[0].1, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_value_range_ignores_non_finite() {
        let values = array![f64::NAN, 1.0, -2.0, f64::INFINITY];
        assert_eq!(value_range(&values), (-2.0, 1.0));
        assert_eq!(value_range(&Array1::zeros(0)), (0.0, 0.0));
    }

    #[test]
    fn test_hexagon_offsets_are_symmetric() {
        let offsets = hexagon_offsets(radius_to_size(0.1));
        assert_eq!(offsets.len(), 6);
        // Opposite vertices mirror through the marker center
        for k in 0..3 {
            assert_eq!(offsets[k].0, -offsets[k + 3].0);
            assert_eq!(offsets[k].1, -offsets[k + 3].1);
        }
    }
}
