//! Extracted thumbnail features.

use serde::{Deserialize, Serialize};

/// An RGB color triple.
pub type Rgb = [u8; 3];

/// Feature record extracted from a thumbnail image.
///
/// Invariant: always fully populated. Extraction failures substitute the
/// [`Default`] record, so downstream scoring never branches on missing
/// values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailFeatures {
    /// width / height.
    pub aspect_ratio: f64,
    /// Up to 3 representative colors.
    pub dominant_colors: Vec<Rgb>,
    /// Up to 5 representative colors.
    pub color_palette: Vec<Rgb>,
    /// Channel-wise mean color.
    pub average_rgb: [f64; 3],
    /// Mean grayscale intensity, 0-255.
    pub brightness: f64,
    /// Grayscale intensity standard deviation.
    pub contrast: f64,
    /// Mean HSV saturation, 0-255.
    pub saturation: f64,
    /// Standard deviation over all sampled channel values.
    pub color_variance: f64,
    /// (mean red - mean blue) / 255; positive is warm.
    pub warm_cool: f64,
    /// Detected face bounding area as a percentage of image area, 0-100.
    pub face_area_percentage: f64,
    /// 1.0 when edge density in the top/bottom thirds suggests overlaid
    /// text, else 0.0.
    pub has_text: f64,
    /// Fraction of pixels classified as edges.
    pub edge_density: f64,
    /// Variance of the Laplacian response (blur proxy).
    pub sharpness: f64,
}

impl ThumbnailFeatures {
    pub fn avg_r(&self) -> f64 {
        self.average_rgb[0]
    }

    pub fn avg_g(&self) -> f64 {
        self.average_rgb[1]
    }

    pub fn avg_b(&self) -> f64 {
        self.average_rgb[2]
    }

    /// Exact-name scalar lookup used by the feature assembler.
    pub fn scalar(&self, name: &str) -> Option<f64> {
        match name {
            "aspect_ratio" => Some(self.aspect_ratio),
            "brightness" => Some(self.brightness),
            "contrast" => Some(self.contrast),
            "saturation" => Some(self.saturation),
            "color_variance" => Some(self.color_variance),
            "warm_cool" => Some(self.warm_cool),
            "face_area_percentage" => Some(self.face_area_percentage),
            "has_text" => Some(self.has_text),
            "edge_density" => Some(self.edge_density),
            "sharpness" => Some(self.sharpness),
            "avg_r" => Some(self.avg_r()),
            "avg_g" => Some(self.avg_g()),
            "avg_b" => Some(self.avg_b()),
            _ => None,
        }
    }
}

impl Default for ThumbnailFeatures {
    /// The fixed fallback record used whenever extraction fails or no
    /// thumbnail was uploaded: neutral gray, no faces, no text.
    fn default() -> Self {
        Self {
            aspect_ratio: 1.78,
            dominant_colors: vec![[128, 128, 128]; 3],
            color_palette: vec![[128, 128, 128]; 5],
            average_rgb: [128.0, 128.0, 128.0],
            brightness: 128.0,
            contrast: 50.0,
            saturation: 128.0,
            color_variance: 30.0,
            warm_cool: 0.0,
            face_area_percentage: 0.0,
            has_text: 0.0,
            edge_density: 0.1,
            sharpness: 100.0,
        }
    }
}
