// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ray median refinement: caps every ray pixel at the ray's median width.

use strichwerk_core::StrokeWidthMap;
use tracing::{debug, instrument};

use super::cast::Ray;

/// Upper median (index `count / 2`) of a ray's current widths, or `None`
/// when none of its pixels is defined.
pub fn ray_median(map: &StrokeWidthMap, ray: &Ray) -> Option<u8> {
    let mut widths: Vec<u8> = ray.points.iter().filter_map(|p| map.get(p.x, p.y)).collect();
    if widths.is_empty() {
        return None;
    }
    widths.sort_unstable();
    Some(widths[widths.len() / 2])
}

/// One refinement pass over `rays` in order. Returns the number of pixels
/// whose width went down.
pub fn refine_pass(map: &mut StrokeWidthMap, rays: &[Ray]) -> usize {
    let mut lowered = 0;
    for ray in rays {
        let Some(median) = ray_median(map, ray) else {
            continue;
        };
        for point in &ray.points {
            if map.lower(point.x, point.y, median) {
                lowered += 1;
            }
        }
    }
    lowered
}

/// Repeat [`refine_pass`] until a pass changes nothing.
///
/// Returns the number of passes that lowered at least one pixel, so calling
/// this again on its own output returns 0 and leaves the map untouched.
#[instrument(skip_all, fields(rays = rays.len()))]
pub fn refine(map: &mut StrokeWidthMap, rays: &[Ray]) -> usize {
    let mut passes = 0;
    loop {
        let lowered = refine_pass(map, rays);
        if lowered == 0 {
            break;
        }
        passes += 1;
        debug!(pass = passes, lowered, "Median pass");
    }
    debug!(passes, "Median refinement converged");
    passes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::bar_scene;
    use crate::swt::cast::cast;
    use strichwerk_core::{Point, Settings};

    fn horizontal_ray(y: u32, x0: u32, x1: u32) -> Ray {
        let points: Vec<Point> = (x0..=x1).map(|x| Point::new(x, y)).collect();
        Ray {
            p: Point::new(x0, y),
            q: Point::new(x1, y),
            length: (x1 - x0) as f32,
            points,
        }
    }

    fn map_from_row(widths: &[u8]) -> StrokeWidthMap {
        let mut map = StrokeWidthMap::new(widths.len() as u32, 1);
        for (x, &w) in widths.iter().enumerate() {
            map.lower(x as u32, 0, w);
        }
        map
    }

    #[test]
    fn median_uses_upper_middle() {
        let map = map_from_row(&[7, 1, 4, 2]);
        assert_eq!(ray_median(&map, &horizontal_ray(0, 0, 3)), Some(4));
        let map = map_from_row(&[9, 3, 5]);
        assert_eq!(ray_median(&map, &horizontal_ray(0, 0, 2)), Some(5));
    }

    #[test]
    fn outliers_capped_at_median() {
        let mut map = map_from_row(&[9, 2, 2, 2, 9]);
        let rays = vec![horizontal_ray(0, 0, 4)];
        assert_eq!(refine(&mut map, &rays), 1);
        for x in 0..5 {
            assert_eq!(map.get(x, 0), Some(2));
        }
    }

    #[test]
    fn overlapping_rays_converge() {
        // The second ray lowers x = 2, which moves the first ray's median.
        let mut map = map_from_row(&[6, 6, 6, 1, 1, 1]);
        let rays = vec![horizontal_ray(0, 0, 2), horizontal_ray(0, 1, 5)];

        let mut single = map.clone();
        refine_pass(&mut single, &rays);
        assert_eq!(single.get(0, 0), Some(6));
        assert!(refine_pass(&mut single, &rays) > 0);

        assert_eq!(refine(&mut map, &rays), 2);
        for x in 0..6 {
            assert_eq!(map.get(x, 0), Some(1));
        }
    }

    #[test]
    fn refinement_never_raises_and_is_idempotent() {
        let (edges, gradients) = bar_scene(24, 16, &[(6, 9), (14, 15)], true);
        let settings = Settings {
            dark_on_light: true,
            max_stroke_length: 20,
        };
        let (mut map, rays) = cast(&edges, &gradients, &settings).expect("cast").into_parts();
        let before = map.clone();

        refine(&mut map, &rays);
        for y in 0..map.height() {
            for x in 0..map.width() {
                match (before.get(x, y), map.get(x, y)) {
                    (Some(b), Some(a)) => assert!(a <= b, "({x}, {y}) rose from {b} to {a}"),
                    (None, None) => {}
                    other => panic!("definedness changed at ({x}, {y}): {other:?}"),
                }
            }
        }

        let refined = map.clone();
        assert_eq!(refine(&mut map, &rays), 0);
        assert_eq!(map, refined);
    }
}
