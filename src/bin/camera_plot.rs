//! Render a synthetic camera image with a fitted moment ellipse.
//!
//! Builds a hexagonal-grid camera, fills it with an elliptical shower-like
//! intensity distribution plus noise, fits the image moments, and renders
//! the display with the moment ellipse overlaid.
//!
//! Usage:
//! ```
//! cargo run --bin camera_plot -- --rings 12 --output plots/camera_display.png
//! ```

use anyhow::{Context, Result};
use camviz::display::{CameraDisplay, EllipseStyle};
use camviz::geometry::CameraGeometry;
use clap::Parser;
use ndarray::Array1;
use plotters::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::FRAC_PI_2;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Render a synthetic camera image with a moment ellipse")]
struct Args {
    /// Number of pixel rings around the central pixel
    #[arg(long, default_value_t = 12)]
    rings: usize,

    /// Pixel circumradius in meters
    #[arg(long, default_value_t = 0.02)]
    pix_radius: f64,

    /// Output PNG path
    #[arg(short, long, default_value = "plots/camera_display.png")]
    output: PathBuf,

    /// Plot title
    #[arg(long, default_value = "Camera")]
    title: String,

    /// RNG seed for the noise component
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Elliptical gaussian image centered off-axis, with uniform noise on top.
fn synthetic_shower(geom: &CameraGeometry, rng: &mut StdRng) -> Array1<f64> {
    let (cx, cy) = (0.08, 0.05);
    let psi = 0.6_f64; // major axis angle from x, radians
    let (sigma_l, sigma_w) = (0.12, 0.04);
    let (sin_psi, cos_psi) = psi.sin_cos();

    Array1::from_iter((0..geom.npix()).map(|i| {
        let dx = geom.pix_x()[i] - cx;
        let dy = geom.pix_y()[i] - cy;
        let u = dx * cos_psi + dy * sin_psi;
        let v = -dx * sin_psi + dy * cos_psi;
        let signal = 100.0 * (-0.5 * ((u / sigma_l).powi(2) + (v / sigma_w).powi(2))).exp();
        signal + rng.gen_range(0.0..3.0)
    }))
}

/// Weighted image moments: centroid, major/minor axis lengths (2-sigma full
/// extents), and major-axis angle from x in radians.
fn image_moments(geom: &CameraGeometry, image: &Array1<f64>) -> ((f64, f64), f64, f64, f64) {
    let total: f64 = image.sum();
    let mean_x = geom
        .pix_x()
        .iter()
        .zip(image)
        .map(|(x, w)| x * w)
        .sum::<f64>()
        / total;
    let mean_y = geom
        .pix_y()
        .iter()
        .zip(image)
        .map(|(y, w)| y * w)
        .sum::<f64>()
        / total;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for i in 0..geom.npix() {
        let dx = geom.pix_x()[i] - mean_x;
        let dy = geom.pix_y()[i] - mean_y;
        let w = image[i];
        sxx += w * dx * dx;
        syy += w * dy * dy;
        sxy += w * dx * dy;
    }
    sxx /= total;
    syy /= total;
    sxy /= total;

    // Eigenvalues of the 2x2 second-moment matrix, closed form
    let trace = sxx + syy;
    let det = sxx * syy - sxy * sxy;
    let disc = (trace * trace / 4.0 - det).max(0.0).sqrt();
    let lambda_max = (trace / 2.0 + disc).max(0.0);
    let lambda_min = (trace / 2.0 - disc).max(0.0);
    let psi = 0.5 * (2.0 * sxy).atan2(sxx - syy);

    let length = 4.0 * lambda_max.sqrt();
    let width = 4.0 * lambda_min.sqrt();
    ((mean_x, mean_y), length, width, psi)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let geom = CameraGeometry::hexagonal_grid(args.rings, args.pix_radius, "m")?;
    println!("Camera geometry: {} pixels", geom.npix());

    let mut rng = StdRng::seed_from_u64(args.seed);
    let image = synthetic_shower(&geom, &mut rng);
    let (centroid, length, width, psi) = image_moments(&geom, &image);
    println!(
        "Moments: centroid ({:.3}, {:.3}) m, length {length:.3} m, width {width:.3} m, psi {:.1} deg",
        centroid.0,
        centroid.1,
        psi.to_degrees()
    );

    if let Some(dir) = args.output.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let root = BitMapBackend::new(&args.output, (900, 900)).into_drawing_area();
    let mut display = CameraDisplay::with_title(&geom, root, &args.title)?;
    display.draw_image(image.view())?;

    // The display draws the major axis along local y, so rotate psi by -90 deg
    display.add_moment_ellipse(
        centroid,
        length,
        width,
        psi - FRAC_PI_2,
        0.0,
        EllipseStyle::default(),
    )?;

    println!("Plot saved to: {}", args.output.display());
    Ok(())
}
