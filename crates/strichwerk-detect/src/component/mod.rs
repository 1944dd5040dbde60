// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Connected components of stroke-width-compatible pixels, and the filter that
// turns them into letter candidates.

pub mod filter;
pub mod group;

use serde::Serialize;
use strichwerk_core::{BoundingBox, Point};

pub use filter::{LetterCandidate, Rejection, classify, filter};
pub use group::{group, widths_compatible};

/// Stroke-width statistics over a component's pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrokeStats {
    pub mean: f32,
    /// Population variance.
    pub variance: f32,
    /// Upper median.
    pub median: f32,
}

impl StrokeStats {
    /// Statistics of a non-empty width sample.
    pub fn from_widths(widths: &[u8]) -> Option<Self> {
        if widths.is_empty() {
            return None;
        }
        let n = widths.len() as f32;
        let mean = widths.iter().map(|&w| w as f32).sum::<f32>() / n;
        let variance = widths
            .iter()
            .map(|&w| {
                let d = w as f32 - mean;
                d * d
            })
            .sum::<f32>()
            / n;
        let mut sorted = widths.to_vec();
        sorted.sort_unstable();
        let median = sorted[sorted.len() / 2] as f32;
        Some(Self {
            mean,
            variance,
            median,
        })
    }
}

/// A set of 8-connected pixels with mutually compatible stroke widths.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// 1-based label, unique within one grouping run.
    pub label: u32,
    /// Member pixels in discovery order.
    pub pixels: Vec<Point>,
    pub bounds: BoundingBox,
    pub stroke: StrokeStats,
}

impl Component {
    /// Build a component from its pixels and their widths (same order).
    /// `None` when the pixel list is empty or the lengths differ.
    pub fn new(label: u32, pixels: Vec<Point>, widths: &[u8]) -> Option<Self> {
        if pixels.len() != widths.len() {
            return None;
        }
        let (first, rest) = pixels.split_first()?;
        let mut bounds = BoundingBox::from_point(*first);
        for p in rest {
            bounds.include(*p);
        }
        let stroke = StrokeStats::from_widths(widths)?;
        Some(Self {
            label,
            pixels,
            bounds,
            stroke,
        })
    }

    /// Pixel count.
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    pub fn width(&self) -> u32 {
        self.bounds.width()
    }

    pub fn height(&self) -> u32 {
        self.bounds.height()
    }

    /// Bounding-box centre.
    pub fn center(&self) -> (f32, f32) {
        self.bounds.center()
    }

    /// Bounding-box diagonal.
    pub fn diameter(&self) -> f32 {
        self.bounds.diagonal()
    }

    pub fn mean_stroke_width(&self) -> f32 {
        self.stroke.mean
    }
}
