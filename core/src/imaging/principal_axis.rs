//! Principal-axis analysis of bright pixels
//!
//! Bone is the brightest structure on a radiograph, so the dominant
//! direction of the thresholded point cloud approximates the long axis of
//! the imaged bone.

use super::codec::ImageCodec;

/// Normalized luminance above which a sample counts as bone
pub const LUMINANCE_THRESHOLD: f64 = 0.35;

/// Fewer thresholded samples than this yields no estimate
pub const MIN_POINTS: usize = 10;

/// The sampling grid keeps roughly this many samples along the short side
pub const SAMPLES_PER_SHORT_SIDE: u32 = 200;

const AXIS_EPSILON: f64 = 1e-12;

/// Sampling stride that bounds cost on large images
pub fn sampling_stride(width: u32, height: u32) -> u32 {
    (width.min(height) / SAMPLES_PER_SHORT_SIDE).max(1)
}

/// Collects (x, y) coordinates of bright samples on the stride grid
pub fn bright_points<C: ImageCodec>(codec: &C, raster: &C::Raster) -> Vec<(f64, f64)> {
    let (width, height) = codec.dimensions(raster);
    let stride = sampling_stride(width, height) as usize;

    let mut points = Vec::new();
    for y in (0..height).step_by(stride) {
        for x in (0..width).step_by(stride) {
            if codec.sample_luminance(raster, x, y) > LUMINANCE_THRESHOLD {
                points.push((f64::from(x), f64::from(y)));
            }
        }
    }
    points
}

/// Orientation of the dominant axis in degrees, normalized into [0, 180)
///
/// Solves the 2×2 covariance eigenproblem in closed form:
/// `λ₁ = tr/2 + sqrt(tr²/4 − det)` with eigenvector `(Sxy, λ₁ − Sxx)`.
/// Returns `None` with fewer than [`MIN_POINTS`] points.
pub fn principal_axis_angle(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < MIN_POINTS {
        return None;
    }

    let n = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
    let (mean_x, mean_y) = (sum_x / n, sum_y / n);

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in points {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    sxx /= n;
    sxy /= n;
    syy /= n;

    let trace = sxx + syy;
    let det = sxx * syy - sxy * sxy;
    let discriminant = (trace * trace / 4.0 - det).max(0.0);
    let lambda1 = trace / 2.0 + discriminant.sqrt();

    let (vx, vy) = if sxy.abs() > AXIS_EPSILON {
        (sxy, lambda1 - sxx)
    } else if sxx >= syy {
        // Uncorrelated cloud: the dominant axis is the wider one
        (1.0, 0.0)
    } else {
        (0.0, 1.0)
    };

    Some(normalize_half_turn(vy.atan2(vx).to_degrees()))
}

/// Maps any angle into [0, 180)
pub fn normalize_half_turn(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(180.0);
    // rem_euclid can round up to exactly 180 for tiny negative inputs
    if wrapped >= 180.0 {
        0.0
    } else {
        wrapped
    }
}
