//! Face area estimation.
//!
//! The scoring models consume a single scalar: total face bounding area as
//! a percentage of image area. Detection is behind a trait so a cascade or
//! NN-backed detector can be slotted in; the default implementation is a
//! deterministic skin-tone-region estimator that reports 0.0 when nothing
//! face-like is present.

use image::RgbImage;

/// Estimates how much of an image is covered by faces.
pub trait FaceDetector: Send + Sync {
    /// Total detected face area as a percentage of image area, in [0, 100].
    /// Returns 0.0 when no faces are found.
    fn face_area_percentage(&self, image: &RgbImage) -> f64;
}

/// Skin-tone-region face area estimator.
///
/// Classifies pixels with a standard RGB skin rule and reports the skin
/// fraction as face area. Fractions below `min_fraction` are treated as
/// noise and reported as 0.0.
pub struct SkinRegionDetector {
    min_fraction: f64,
}

impl SkinRegionDetector {
    pub fn new() -> Self {
        Self { min_fraction: 0.02 }
    }

    fn is_skin(r: u8, g: u8, b: u8) -> bool {
        let (r, g, b) = (r as i32, g as i32, b as i32);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        r > 95 && g > 40 && b > 20 && (max - min) > 15 && (r - g).abs() > 15 && r > g && r > b
    }
}

impl Default for SkinRegionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl FaceDetector for SkinRegionDetector {
    fn face_area_percentage(&self, image: &RgbImage) -> f64 {
        let total = (image.width() as u64 * image.height() as u64).max(1);
        let skin = image
            .pixels()
            .filter(|p| Self::is_skin(p.0[0], p.0[1], p.0[2]))
            .count() as u64;

        let fraction = skin as f64 / total as f64;
        if fraction < self.min_fraction {
            0.0
        } else {
            (fraction * 100.0).min(100.0)
        }
    }
}
