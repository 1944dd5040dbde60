// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic test images: vertical bars with analytic edge maps and gradients.

use strichwerk_core::{EdgeMap, GradientField, Grid};

pub(crate) const DARK: u8 = 0;
pub(crate) const LIGHT: u8 = 255;

/// A `width x height` intensity image with full-height vertical bars at the
/// given inclusive column ranges.
pub(crate) fn bar_image(width: u32, height: u32, bars: &[(u32, u32)], dark_bars: bool) -> Grid<u8> {
    let (bar, background) = if dark_bars { (DARK, LIGHT) } else { (LIGHT, DARK) };
    let mut data = Vec::with_capacity(width as usize * height as usize);
    for _y in 0..height {
        for x in 0..width {
            let in_bar = bars.iter().any(|&(lo, hi)| (lo..=hi).contains(&x));
            data.push(if in_bar { bar } else { background });
        }
    }
    Grid::from_vec(width, height, data).expect("fixture dimensions")
}

/// Central-difference gradients with clamped borders. Vectors point from
/// dark to bright.
pub(crate) fn central_gradients(image: &Grid<u8>) -> GradientField {
    let (w, h) = image.dimensions();
    let sample = |x: i64, y: i64| -> f32 {
        let cx = x.clamp(0, w as i64 - 1) as u32;
        let cy = y.clamp(0, h as i64 - 1) as u32;
        *image.get(cx, cy).expect("clamped sample") as f32
    };
    let mut dx = Vec::with_capacity(image.len());
    let mut dy = Vec::with_capacity(image.len());
    for y in 0..h as i64 {
        for x in 0..w as i64 {
            dx.push(sample(x + 1, y) - sample(x - 1, y));
            dy.push(sample(x, y + 1) - sample(x, y - 1));
        }
    }
    GradientField::new(
        Grid::from_vec(w, h, dx).expect("dx dimensions"),
        Grid::from_vec(w, h, dy).expect("dy dimensions"),
    )
    .expect("matching gradient grids")
}

/// Every pixel with a nonzero gradient is an edge.
pub(crate) fn edges_from_gradients(gradients: &GradientField) -> EdgeMap {
    let (w, h) = gradients.dimensions();
    let data = gradients
        .dx()
        .data()
        .iter()
        .zip(gradients.dy().data())
        .map(|(&gx, &gy)| if gx != 0.0 || gy != 0.0 { 255 } else { 0 })
        .collect();
    Grid::from_vec(w, h, data).expect("edge dimensions")
}

/// Edge map and gradients for a bar image in one call.
pub(crate) fn bar_scene(
    width: u32,
    height: u32,
    bars: &[(u32, u32)],
    dark_bars: bool,
) -> (EdgeMap, GradientField) {
    let image = bar_image(width, height, bars, dark_bars);
    let gradients = central_gradients(&image);
    let edges = edges_from_gradients(&gradients);
    (edges, gradients)
}

/// Uniform gradient field with a constant vector.
pub(crate) fn uniform_gradients(width: u32, height: u32, gx: f32, gy: f32) -> GradientField {
    GradientField::new(
        Grid::new_fill(width, height, gx),
        Grid::new_fill(width, height, gy),
    )
    .expect("matching gradient grids")
}
