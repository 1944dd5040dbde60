// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input preparation: turns a photograph into the edge map and gradient field
// the stroke width transform consumes (downscale, blur, Canny, Sobel).

use std::path::Path;

use image::imageops::FilterType;
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use strichwerk_core::{EdgeMap, GradientField, Grid, PrepareConfig, Result, StrichwerkError};
use tracing::{debug, info, instrument};

/// Edge map and gradients derived from one grayscale image.
#[derive(Debug, Clone)]
pub struct PreparedInput {
    pub edges: EdgeMap,
    pub gradients: GradientField,
    /// Original width divided by prepared width; 1.0 when not downscaled.
    pub scale: f32,
}

/// Open an image file and convert it to 8-bit grayscale.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_luma(path: impl AsRef<Path>) -> Result<GrayImage> {
    let image = image::open(path.as_ref()).map_err(|err| {
        StrichwerkError::ImageError(format!("failed to open image {}: {}", path.as_ref().display(), err))
    })?;
    info!(width = image.width(), height = image.height(), "Image loaded");
    Ok(image.to_luma8())
}

/// Shrink `gray` to `max_width` columns, keeping its aspect ratio. Images
/// already narrow enough are returned as-is.
pub fn downscale(gray: &GrayImage, max_width: u32) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w <= max_width || max_width == 0 {
        return gray.clone();
    }
    let new_h = ((h as f64 * max_width as f64 / w as f64).round() as u32).max(1);
    debug!(from_w = w, from_h = h, to_w = max_width, to_h = new_h, "Downscaling input");
    image::imageops::resize(gray, max_width, new_h, FilterType::Lanczos3)
}

/// Canny thresholds `[(1 - sigma) * median, (1 + sigma) * median]` from the
/// median intensity, clamped to `0..=255`.
pub fn auto_canny_thresholds(gray: &GrayImage, sigma: f32) -> (f32, f32) {
    let mut histogram = [0usize; 256];
    for pixel in gray.pixels() {
        histogram[pixel[0] as usize] += 1;
    }
    let total: usize = histogram.iter().sum();
    if total == 0 {
        return (0.0, 0.0);
    }

    let target = total / 2;
    let mut seen = 0;
    let mut median = 0u8;
    for (value, &count) in histogram.iter().enumerate() {
        seen += count;
        if seen > target {
            median = value as u8;
            break;
        }
    }

    let median = median as f32;
    let low = ((1.0 - sigma) * median).clamp(0.0, 255.0);
    let high = ((1.0 + sigma) * median).clamp(0.0, 255.0);
    (low, high)
}

fn sobel_to_grid(sobel: &ImageBuffer<Luma<i16>, Vec<i16>>) -> Result<Grid<f32>> {
    let (w, h) = sobel.dimensions();
    Grid::from_vec(w, h, sobel.pixels().map(|p| p[0] as f32).collect())
}

/// Downscale, blur, then extract Canny edges and Sobel gradients.
#[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
pub fn prepare(gray: &GrayImage, config: &PrepareConfig) -> Result<PreparedInput> {
    let working = downscale(gray, config.max_input_width);
    let scale = gray.width() as f32 / working.width().max(1) as f32;

    let blurred = gaussian_blur_f32(&working, config.blur_sigma);
    let (low, high) = auto_canny_thresholds(&blurred, config.canny_sigma);
    let edge_image = canny(&blurred, low, high);
    let (w, h) = edge_image.dimensions();
    let edges = Grid::from_vec(w, h, edge_image.into_raw())?;
    debug!(low, high, edge_pixels = edges.edge_count(), "Canny edges extracted");

    let gradients = GradientField::new(
        sobel_to_grid(&horizontal_sobel(&blurred))?,
        sobel_to_grid(&vertical_sobel(&blurred))?,
    )?;

    Ok(PreparedInput {
        edges,
        gradients,
        scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dark_bar(width: u32, height: u32, from: u32, to: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if (from..=to).contains(&x) { Luma([0]) } else { Luma([255]) }
        })
    }

    #[test]
    fn thresholds_follow_median() {
        let gray = GrayImage::from_raw(5, 1, vec![10, 20, 30, 40, 50]).expect("raw image");
        let (low, high) = auto_canny_thresholds(&gray, 0.27);
        assert!((low - 21.9).abs() < 1e-3, "low {low}");
        assert!((high - 38.1).abs() < 1e-3, "high {high}");

        let white = GrayImage::from_pixel(4, 4, Luma([250]));
        assert_eq!(auto_canny_thresholds(&white, 0.27).1, 255.0);
    }

    #[test]
    fn downscale_keeps_aspect_ratio() {
        let wide = GrayImage::new(2400, 600);
        let small = downscale(&wide, 1200);
        assert_eq!(small.dimensions(), (1200, 300));

        let narrow = GrayImage::new(800, 600);
        assert_eq!(downscale(&narrow, 1200).dimensions(), (800, 600));
    }

    #[test]
    fn prepared_gradients_point_to_bright_side() {
        let gray = dark_bar(40, 30, 15, 20);
        let prepared = prepare(&gray, &PrepareConfig::default()).expect("prepare");

        assert_eq!(prepared.edges.dimensions(), (40, 30));
        assert_eq!(prepared.gradients.dimensions(), (40, 30));
        assert_eq!(prepared.scale, 1.0);
        assert!(prepared.edges.edge_count() > 0);

        let (left_dx, _) = prepared.gradients.at(14, 15).expect("in bounds");
        let (right_dx, _) = prepared.gradients.at(21, 15).expect("in bounds");
        assert!(left_dx < 0.0, "left edge dx {left_dx}");
        assert!(right_dx > 0.0, "right edge dx {right_dx}");
    }

    #[test]
    fn load_round_trips_through_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bar.png");
        dark_bar(16, 8, 4, 7).save(&path).expect("save png");

        let loaded = load_luma(&path).expect("load");
        assert_eq!(loaded.dimensions(), (16, 8));
        assert_eq!(loaded.get_pixel(5, 3)[0], 0);
        assert_eq!(loaded.get_pixel(10, 3)[0], 255);
    }

    #[test]
    fn load_missing_file_is_image_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = load_luma(dir.path().join("absent.png"));
        assert!(matches!(result, Err(StrichwerkError::ImageError(_))));
    }
}
