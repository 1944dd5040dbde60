// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stroke-width ray caster. Marches from every edge pixel along its inward
// gradient direction until it meets an opposing edge.

use std::f32::consts::FRAC_PI_2;

use strichwerk_core::{EdgeMap, GradientField, Point, Result, Settings, StrichwerkError, StrokeWidthMap};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Sub-pixel marching increment, in pixels.
pub const STEP: f32 = 0.05;

/// A pixel path from an edge pixel `p` to the opposing edge pixel `q`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray {
    pub p: Point,
    pub q: Point,
    /// Euclidean distance between `p` and `q`.
    pub length: f32,
    /// Every visited pixel, `p` first and `q` last.
    pub points: Vec<Point>,
}

/// Per-run ray accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CastStats {
    /// Edge pixels considered as ray origins.
    pub origins: usize,
    /// Origins skipped because their gradient has no direction.
    pub degenerate: usize,
    pub accepted: usize,
    pub out_of_bounds: usize,
    pub too_long: usize,
}

/// Everything a cast produces.
#[derive(Debug, Clone)]
pub struct CastOutcome {
    pub map: StrokeWidthMap,
    pub rays: Vec<Ray>,
    pub stats: CastStats,
}

impl CastOutcome {
    /// Drop the statistics and keep the `(map, rays)` pair.
    pub fn into_parts(self) -> (StrokeWidthMap, Vec<Ray>) {
        (self.map, self.rays)
    }
}

/// Result of marching from one origin.
#[derive(Debug, Clone, PartialEq)]
pub enum Trace {
    Accepted(Ray),
    /// Zero-magnitude gradient at the origin.
    Degenerate,
    OutOfBounds,
    TooLong,
}

/// Unit gradient at `(x, y)` turned to point into the stroke.
///
/// Gradients point from dark to bright, so for dark strokes on a light
/// background the vector is negated. `None` when the magnitude is below
/// `f32::EPSILON` or the pixel is outside the field.
pub fn inward_direction(gradients: &GradientField, x: u32, y: u32, dark_on_light: bool) -> Option<(f32, f32)> {
    let (gx, gy) = gradients.at(x, y)?;
    let mag = (gx * gx + gy * gy).sqrt();
    if !mag.is_finite() || mag < f32::EPSILON {
        return None;
    }
    let (ux, uy) = (gx / mag, gy / mag);
    if dark_on_light {
        Some((-ux, -uy))
    } else {
        Some((ux, uy))
    }
}

/// Two edges face each other when their inward directions are more than
/// 90° apart. The dot product is clamped before `acos`.
pub fn edges_face_each_other(start: (f32, f32), end: (f32, f32)) -> bool {
    let dot = (start.0 * end.0 + start.1 * end.1).clamp(-1.0, 1.0);
    dot.acos() > FRAC_PI_2
}

/// March from `origin` until an opposing edge is found, the ray leaves the
/// grid, or the stroke is longer than `settings.max_stroke_length`.
///
/// Edges that do not face the origin are crossed, as are edge pixels whose
/// own gradient has no direction.
pub fn trace_ray(edges: &EdgeMap, gradients: &GradientField, settings: &Settings, origin: Point) -> Trace {
    let Some(dir) = inward_direction(gradients, origin.x, origin.y, settings.dark_on_light) else {
        return Trace::Degenerate;
    };

    let max_length = settings.max_stroke_length as f32;
    // Past this distance any pixel still ahead is farther than max_length.
    let cutoff = max_length + 1.0;

    let (cx, cy) = (origin.x as f32 + 0.5, origin.y as f32 + 0.5);
    let mut cell = (origin.x as i64, origin.y as i64);
    let mut points = vec![origin];
    let mut steps: u32 = 0;

    loop {
        steps += 1;
        let travelled = steps as f32 * STEP;
        if travelled > cutoff {
            return Trace::TooLong;
        }

        let px = cx + dir.0 * travelled;
        let py = cy + dir.1 * travelled;
        let next = (px.floor() as i64, py.floor() as i64);
        if next == cell {
            continue;
        }
        cell = next;

        if !edges.in_bounds(next.0, next.1) {
            return Trace::OutOfBounds;
        }
        let current = Point::new(next.0 as u32, next.1 as u32);
        points.push(current);

        if !edges.is_edge(current.x, current.y) {
            continue;
        }
        let Some(end) = inward_direction(gradients, current.x, current.y, settings.dark_on_light) else {
            continue;
        };
        if !edges_face_each_other(dir, end) {
            continue;
        }

        let length = origin.distance(&current);
        if length > max_length {
            return Trace::TooLong;
        }
        return Trace::Accepted(Ray {
            p: origin,
            q: current,
            length,
            points,
        });
    }
}

fn trace_row(edges: &EdgeMap, gradients: &GradientField, settings: &Settings, y: u32) -> Vec<Trace> {
    (0..edges.width())
        .filter(|&x| edges.is_edge(x, y))
        .map(|x| trace_ray(edges, gradients, settings, Point::new(x, y)))
        .collect()
}

/// Cast a ray from every edge pixel and min-accumulate each accepted ray's
/// quantized length into a fresh [`StrokeWidthMap`].
///
/// Rays are traced per row (in parallel with the `parallel` feature) and
/// merged in row order, so the outcome does not depend on scheduling.
#[instrument(skip_all, fields(width = edges.width(), height = edges.height(), dark_on_light = settings.dark_on_light))]
pub fn cast(edges: &EdgeMap, gradients: &GradientField, settings: &Settings) -> Result<CastOutcome> {
    if edges.dimensions() != gradients.dimensions() {
        return Err(StrichwerkError::DimensionMismatch {
            left: "edge map",
            left_width: edges.width(),
            left_height: edges.height(),
            right: "gradient field",
            right_width: gradients.width(),
            right_height: gradients.height(),
        });
    }

    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<Trace>> = (0..edges.height())
        .into_par_iter()
        .map(|y| trace_row(edges, gradients, settings, y))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<Trace>> = (0..edges.height())
        .map(|y| trace_row(edges, gradients, settings, y))
        .collect();

    let mut map = StrokeWidthMap::new(edges.width(), edges.height());
    let mut rays = Vec::new();
    let mut stats = CastStats::default();

    for trace in rows.into_iter().flatten() {
        stats.origins += 1;
        match trace {
            Trace::Accepted(ray) => {
                let width = StrokeWidthMap::quantize(ray.length);
                for point in &ray.points {
                    map.lower(point.x, point.y, width);
                }
                stats.accepted += 1;
                rays.push(ray);
            }
            Trace::Degenerate => stats.degenerate += 1,
            Trace::OutOfBounds => stats.out_of_bounds += 1,
            Trace::TooLong => stats.too_long += 1,
        }
    }

    debug!(
        degenerate = stats.degenerate,
        out_of_bounds = stats.out_of_bounds,
        too_long = stats.too_long,
        "Rays discarded"
    );
    info!(
        edge_pixels = stats.origins,
        rays = stats.accepted,
        defined_pixels = map.defined_count(),
        "Stroke width transform complete"
    );

    Ok(CastOutcome { map, rays, stats })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{bar_scene, uniform_gradients};
    use strichwerk_core::Grid;

    fn settings(dark_on_light: bool, max_stroke_length: u32) -> Settings {
        Settings {
            dark_on_light,
            max_stroke_length,
        }
    }

    fn at_degrees(angle: f32) -> (f32, f32) {
        (angle.to_radians().cos(), angle.to_radians().sin())
    }

    /// A one-row strip with edges at `x = 0` and `x = 3`. The origin points
    /// right; the far edge's inward direction is `end`.
    fn angled_pair(end: (f32, f32)) -> (EdgeMap, GradientField) {
        let edges = Grid::from_vec(5, 1, vec![255, 0, 0, 255, 0]).expect("edges");
        // Light-on-dark polarity keeps the raw gradient equal to the inward direction.
        let dx = Grid::from_vec(5, 1, vec![1.0, 0.0, 0.0, end.0, 0.0]).expect("dx");
        let dy = Grid::from_vec(5, 1, vec![0.0, 0.0, 0.0, end.1, 0.0]).expect("dy");
        (edges, GradientField::new(dx, dy).expect("gradients"))
    }

    #[test]
    fn facing_boundary_at_ninety_degrees() {
        assert!(!edges_face_each_other((1.0, 0.0), at_degrees(89.0)));
        assert!(!edges_face_each_other((1.0, 0.0), (0.0, 1.0)));
        assert!(edges_face_each_other((1.0, 0.0), at_degrees(91.0)));
        assert!(edges_face_each_other((1.0, 0.0), (-1.0, 0.0)));
    }

    #[test]
    fn facing_tolerates_rounding_outside_unit_range() {
        assert!(edges_face_each_other((1.0, 0.0), (-1.000_001, 0.0)));
        assert!(!edges_face_each_other((1.000_001, 0.0), (1.0, 0.0)));
    }

    #[test]
    fn ray_accepted_only_past_ninety_degrees() {
        let s = settings(false, 20);

        let (edges, gradients) = angled_pair(at_degrees(91.0));
        match trace_ray(&edges, &gradients, &s, Point::new(0, 0)) {
            Trace::Accepted(ray) => {
                assert_eq!(ray.q, Point::new(3, 0));
                assert_eq!(ray.length, 3.0);
                assert_eq!(ray.points.len(), 4);
            }
            other => panic!("expected accepted ray, got {other:?}"),
        }

        for end in [at_degrees(89.0), (0.0, 1.0)] {
            let (edges, gradients) = angled_pair(end);
            assert_eq!(
                trace_ray(&edges, &gradients, &s, Point::new(0, 0)),
                Trace::OutOfBounds,
                "end direction {end:?}"
            );
        }
    }

    #[test]
    fn zero_gradient_origin_is_degenerate() {
        let edges = Grid::new_fill(4, 4, 255u8);
        let gradients = uniform_gradients(4, 4, 0.0, 0.0);
        let outcome = cast(&edges, &gradients, &settings(true, 20)).expect("cast");
        assert_eq!(outcome.stats.origins, 16);
        assert_eq!(outcome.stats.degenerate, 16);
        assert!(outcome.rays.is_empty());
        assert_eq!(outcome.map.defined_count(), 0);
    }

    #[test]
    fn dark_bar_rays_span_the_bar() {
        let (edges, gradients) = bar_scene(20, 20, &[(8, 11)], true);
        let outcome = cast(&edges, &gradients, &settings(true, 20)).expect("cast");

        assert_eq!(outcome.stats.origins, 4 * 20);
        assert_eq!(outcome.stats.accepted, 4 * 20);
        for ray in &outcome.rays {
            assert_eq!(ray.p.y, ray.q.y);
            assert_eq!(ray.points.first(), Some(&ray.p));
            assert_eq!(ray.points.last(), Some(&ray.q));
            assert!(ray.length == 3.0 || ray.length == 4.0, "length {}", ray.length);
        }
        for y in 0..20 {
            assert_eq!(outcome.map.get(7, y), Some(4));
            assert_eq!(outcome.map.get(9, y), Some(3));
            assert_eq!(outcome.map.get(12, y), Some(4));
            assert_eq!(outcome.map.get(5, y), None);
            assert_eq!(outcome.map.get(15, y), None);
        }
    }

    #[test]
    fn wrong_polarity_escapes_the_image() {
        let (edges, gradients) = bar_scene(20, 20, &[(8, 11)], true);
        let outcome = cast(&edges, &gradients, &settings(false, 20)).expect("cast");
        assert!(outcome.rays.is_empty());
        assert_eq!(outcome.stats.out_of_bounds, outcome.stats.origins);
    }

    #[test]
    fn short_limit_discards_as_too_long() {
        let (edges, gradients) = bar_scene(20, 20, &[(8, 11)], true);
        let outcome = cast(&edges, &gradients, &settings(true, 2)).expect("cast");
        assert!(outcome.rays.is_empty());
        assert_eq!(outcome.stats.too_long, outcome.stats.origins);
        assert_eq!(outcome.map.defined_count(), 0);
    }

    #[test]
    fn mismatched_inputs_rejected() {
        let edges = Grid::new_fill(10, 10, 0u8);
        let gradients = uniform_gradients(10, 9, 1.0, 0.0);
        assert!(matches!(
            cast(&edges, &gradients, &settings(true, 20)),
            Err(StrichwerkError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn into_parts_keeps_map_and_rays() {
        let (edges, gradients) = bar_scene(20, 20, &[(8, 11)], true);
        let outcome = cast(&edges, &gradients, &settings(true, 20)).expect("cast");
        let ray_count = outcome.rays.len();
        let (map, rays) = outcome.into_parts();
        assert_eq!(rays.len(), ray_count);
        assert_eq!(map.dimensions(), (20, 20));
    }
}
