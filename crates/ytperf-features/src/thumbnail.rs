//! Thumbnail feature extraction.
//!
//! Contract: [`ThumbnailExtractor::extract`] always returns a fully
//! populated [`ThumbnailFeatures`] record. Decode failures substitute the
//! fixed default record; no sub-step can fail after a successful decode.

use image::imageops::FilterType;
use image::RgbImage;
use tracing::debug;

use ytperf_models::{Rgb, ThumbnailFeatures};

use crate::face::{FaceDetector, SkinRegionDetector};

/// Maximum dimension the working image is scaled down to before the
/// per-pixel passes. Keeps extraction bounded for oversized uploads.
const MAX_DIMENSION: u32 = 512;

/// Upper bound on pixels sampled for the color statistics passes.
const MAX_COLOR_SAMPLES: usize = 16_384;

/// Gradient magnitude above which a pixel counts as an edge.
const EDGE_THRESHOLD: f64 = 150.0;

/// Edge density in the top/bottom thirds above which overlaid text is
/// assumed present.
const TEXT_EDGE_THRESHOLD: f64 = 0.05;

/// Extracts the full thumbnail feature record from raw image bytes.
pub struct ThumbnailExtractor {
    detector: Box<dyn FaceDetector>,
}

impl ThumbnailExtractor {
    pub fn new() -> Self {
        Self {
            detector: Box::new(SkinRegionDetector::new()),
        }
    }

    pub fn with_detector(detector: Box<dyn FaceDetector>) -> Self {
        Self { detector }
    }

    /// Extract features from raw image bytes. Never fails: undecodable or
    /// degenerate input yields [`ThumbnailFeatures::default`].
    pub fn extract(&self, bytes: &[u8]) -> ThumbnailFeatures {
        let decoded = match image::load_from_memory(bytes) {
            Ok(img) => img.to_rgb8(),
            Err(e) => {
                debug!("thumbnail decode failed, using defaults: {}", e);
                return ThumbnailFeatures::default();
            }
        };

        let (orig_w, orig_h) = (decoded.width(), decoded.height());
        if orig_w == 0 || orig_h == 0 {
            return ThumbnailFeatures::default();
        }
        let aspect_ratio = orig_w as f64 / orig_h as f64;

        let rgb = downscale(decoded);
        let gray = grayscale(&rgb);
        let (w, h) = (rgb.width() as usize, rgb.height() as usize);

        let brightness = mean(&gray);
        let contrast = stddev(&gray, brightness);

        let samples = sample_pixels(&rgb);
        let average_rgb = channel_means(&samples);
        let saturation = mean_saturation(&samples);
        let color_variance = flat_stddev(&samples);
        let warm_cool = (average_rgb[0] - average_rgb[2]) / 255.0;

        let dominant_colors = kmeans_palette(&samples, 3);
        let color_palette = kmeans_palette(&samples, 5);

        let edges = edge_mask(&gray, w, h);
        let edge_density = density(&edges);
        let has_text = if text_region_density(&edges, w, h) > TEXT_EDGE_THRESHOLD {
            1.0
        } else {
            0.0
        };
        let sharpness = laplacian_variance(&gray, w, h);

        let face_area_percentage = self
            .detector
            .face_area_percentage(&rgb)
            .clamp(0.0, 100.0);

        ThumbnailFeatures {
            aspect_ratio,
            dominant_colors,
            color_palette,
            average_rgb,
            brightness,
            contrast,
            saturation,
            color_variance,
            warm_cool,
            face_area_percentage,
            has_text,
            edge_density,
            sharpness,
        }
    }
}

impl Default for ThumbnailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn downscale(rgb: RgbImage) -> RgbImage {
    let (w, h) = (rgb.width(), rgb.height());
    if w <= MAX_DIMENSION && h <= MAX_DIMENSION {
        return rgb;
    }
    let scale = MAX_DIMENSION as f64 / w.max(h) as f64;
    let nw = ((w as f64 * scale) as u32).max(1);
    let nh = ((h as f64 * scale) as u32).max(1);
    image::imageops::resize(&rgb, nw, nh, FilterType::Triangle)
}

fn grayscale(rgb: &RgbImage) -> Vec<f64> {
    rgb.pixels()
        .map(|p| 0.299 * p.0[0] as f64 + 0.587 * p.0[1] as f64 + 0.114 * p.0[2] as f64)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Evenly-strided pixel sample for the color statistics passes.
fn sample_pixels(rgb: &RgbImage) -> Vec<Rgb> {
    let total = (rgb.width() as usize) * (rgb.height() as usize);
    let stride = (total / MAX_COLOR_SAMPLES).max(1);
    rgb.pixels()
        .step_by(stride)
        .map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect()
}

fn channel_means(samples: &[Rgb]) -> [f64; 3] {
    if samples.is_empty() {
        return [0.0; 3];
    }
    let mut sums = [0.0f64; 3];
    for px in samples {
        for c in 0..3 {
            sums[c] += px[c] as f64;
        }
    }
    let n = samples.len() as f64;
    [sums[0] / n, sums[1] / n, sums[2] / n]
}

/// Mean HSV saturation over the sample, scaled to 0-255.
fn mean_saturation(samples: &[Rgb]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let total: f64 = samples
        .iter()
        .map(|px| {
            let max = px.iter().copied().max().unwrap_or(0) as f64;
            let min = px.iter().copied().min().unwrap_or(0) as f64;
            if max == 0.0 {
                0.0
            } else {
                (max - min) / max * 255.0
            }
        })
        .sum();
    total / samples.len() as f64
}

/// Standard deviation over all channel values of the sample, flattened.
fn flat_stddev(samples: &[Rgb]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let flat: Vec<f64> = samples
        .iter()
        .flat_map(|px| px.iter().map(|&c| c as f64))
        .collect();
    let m = mean(&flat);
    stddev(&flat, m)
}

/// Deterministic k-means over the pixel sample.
///
/// Centroids are seeded from luma quantiles of the sample instead of a
/// random init, so repeated calls on the same bytes are bit-identical.
fn kmeans_palette(samples: &[Rgb], k: usize) -> Vec<Rgb> {
    if samples.is_empty() {
        return vec![[128, 128, 128]; k];
    }

    let mut by_luma: Vec<Rgb> = samples.to_vec();
    by_luma.sort_by(|a, b| {
        let la = 0.299 * a[0] as f64 + 0.587 * a[1] as f64 + 0.114 * a[2] as f64;
        let lb = 0.299 * b[0] as f64 + 0.587 * b[1] as f64 + 0.114 * b[2] as f64;
        la.partial_cmp(&lb).unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut centroids: Vec<[f64; 3]> = (0..k)
        .map(|i| {
            let idx = (i * 2 + 1) * by_luma.len() / (k * 2);
            let px = by_luma[idx.min(by_luma.len() - 1)];
            [px[0] as f64, px[1] as f64, px[2] as f64]
        })
        .collect();

    for _ in 0..10 {
        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];

        for px in samples {
            let mut best = 0;
            let mut best_dist = f64::MAX;
            for (i, c) in centroids.iter().enumerate() {
                let d = (px[0] as f64 - c[0]).powi(2)
                    + (px[1] as f64 - c[1]).powi(2)
                    + (px[2] as f64 - c[2]).powi(2);
                if d < best_dist {
                    best_dist = d;
                    best = i;
                }
            }
            counts[best] += 1;
            for c in 0..3 {
                sums[best][c] += px[c] as f64;
            }
        }

        let mut moved = false;
        for i in 0..k {
            if counts[i] == 0 {
                continue;
            }
            let next = [
                sums[i][0] / counts[i] as f64,
                sums[i][1] / counts[i] as f64,
                sums[i][2] / counts[i] as f64,
            ];
            if next != centroids[i] {
                moved = true;
                centroids[i] = next;
            }
        }
        if !moved {
            break;
        }
    }

    centroids
        .iter()
        .map(|c| {
            [
                c[0].round().clamp(0.0, 255.0) as u8,
                c[1].round().clamp(0.0, 255.0) as u8,
                c[2].round().clamp(0.0, 255.0) as u8,
            ]
        })
        .collect()
}

/// Sobel gradient-magnitude edge mask.
fn edge_mask(gray: &[f64], w: usize, h: usize) -> Vec<bool> {
    let mut edges = vec![false; w * h];
    if w < 3 || h < 3 {
        return edges;
    }
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let at = |dx: isize, dy: isize| -> f64 {
                gray[(y as isize + dy) as usize * w + (x as isize + dx) as usize]
            };
            let gx = -at(-1, -1) - 2.0 * at(-1, 0) - at(-1, 1)
                + at(1, -1)
                + 2.0 * at(1, 0)
                + at(1, 1);
            let gy = -at(-1, -1) - 2.0 * at(0, -1) - at(1, -1)
                + at(-1, 1)
                + 2.0 * at(0, 1)
                + at(1, 1);
            if (gx * gx + gy * gy).sqrt() > EDGE_THRESHOLD {
                edges[y * w + x] = true;
            }
        }
    }
    edges
}

fn density(edges: &[bool]) -> f64 {
    if edges.is_empty() {
        return 0.0;
    }
    edges.iter().filter(|&&e| e).count() as f64 / edges.len() as f64
}

/// Edge density over the top and bottom thirds, where overlaid text
/// usually sits.
fn text_region_density(edges: &[bool], w: usize, h: usize) -> f64 {
    let third = h / 3;
    if third == 0 {
        return 0.0;
    }
    let top = &edges[..third * w];
    let bottom = &edges[(h - third) * w..];
    let hits = top.iter().filter(|&&e| e).count() + bottom.iter().filter(|&&e| e).count();
    hits as f64 / (top.len() + bottom.len()) as f64
}

/// Variance of the 3x3 Laplacian response; low values indicate blur.
fn laplacian_variance(gray: &[f64], w: usize, h: usize) -> f64 {
    if w < 3 || h < 3 {
        return 0.0;
    }
    let mut responses = Vec::with_capacity((w - 2) * (h - 2));
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let c = gray[y * w + x];
            let lap = gray[(y - 1) * w + x] + gray[(y + 1) * w + x]
                + gray[y * w + x - 1]
                + gray[y * w + x + 1]
                - 4.0 * c;
            responses.push(lap);
        }
    }
    let m = mean(&responses);
    let var = responses.iter().map(|r| (r - m).powi(2)).sum::<f64>() / responses.len() as f64;
    var
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb as Px;

    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img.clone())
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_corrupt_bytes_return_default_features() {
        let extractor = ThumbnailExtractor::new();
        let features = extractor.extract(b"definitely not an image");
        assert_eq!(features, ThumbnailFeatures::default());
    }

    #[test]
    fn test_empty_bytes_return_default_features() {
        let extractor = ThumbnailExtractor::new();
        assert_eq!(extractor.extract(&[]), ThumbnailFeatures::default());
    }

    #[test]
    fn test_solid_color_image() {
        let img = RgbImage::from_pixel(160, 90, Px([200, 100, 50]));
        let extractor = ThumbnailExtractor::new();
        let features = extractor.extract(&encode_png(&img));

        assert!((features.aspect_ratio - 160.0 / 90.0).abs() < 1e-9);
        assert!((features.average_rgb[0] - 200.0).abs() < 1.0);
        assert!((features.average_rgb[2] - 50.0).abs() < 1.0);
        // Flat image: no edges, no text, zero contrast and sharpness.
        assert_eq!(features.edge_density, 0.0);
        assert_eq!(features.has_text, 0.0);
        assert!(features.contrast < 1e-9);
        assert!(features.sharpness < 1e-9);
        // Warm image: red dominates blue.
        assert!(features.warm_cool > 0.0);
        // All palette entries collapse onto the single color.
        for color in &features.dominant_colors {
            assert_eq!(*color, [200, 100, 50]);
        }
    }

    #[test]
    fn test_high_contrast_stripes_have_edges_and_text() {
        let img = RgbImage::from_fn(120, 120, |x, _| {
            if (x / 4) % 2 == 0 {
                Px([255, 255, 255])
            } else {
                Px([0, 0, 0])
            }
        });
        let extractor = ThumbnailExtractor::new();
        let features = extractor.extract(&encode_png(&img));

        assert!(features.edge_density > TEXT_EDGE_THRESHOLD);
        assert_eq!(features.has_text, 1.0);
        assert!(features.contrast > 50.0);
        assert!(features.sharpness > 0.0);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let img = RgbImage::from_fn(100, 60, |x, y| {
            Px([(x * 2) as u8, (y * 4) as u8, ((x + y) % 256) as u8])
        });
        let bytes = encode_png(&img);
        let extractor = ThumbnailExtractor::new();
        assert_eq!(extractor.extract(&bytes), extractor.extract(&bytes));
    }

    #[test]
    fn test_palette_sizes() {
        let img = RgbImage::from_fn(64, 64, |x, y| Px([(x * 4) as u8, (y * 4) as u8, 128]));
        let extractor = ThumbnailExtractor::new();
        let features = extractor.extract(&encode_png(&img));
        assert_eq!(features.dominant_colors.len(), 3);
        assert_eq!(features.color_palette.len(), 5);
    }
}
