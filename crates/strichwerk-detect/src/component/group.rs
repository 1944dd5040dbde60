// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Component grouping: breadth-first region growing over the finished stroke
// width map with a width-ratio constraint.

use std::collections::VecDeque;

use strichwerk_core::{GroupingConfig, StrokeWidthMap};
use tracing::{debug, instrument};

use super::Component;

const UNLABELLED: u32 = 0;

const NEIGHBOURS: [(i64, i64); 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];

/// `max(a, b) / min(a, b) <= ratio_threshold`.
pub fn widths_compatible(a: u8, b: u8, ratio_threshold: f32) -> bool {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if lo == 0 {
        return false;
    }
    hi as f32 / lo as f32 <= ratio_threshold
}

/// Flat indices of the in-bounds 8-neighbours of `index`.
fn neighbours(map: &StrokeWidthMap, index: usize) -> impl Iterator<Item = usize> + '_ {
    let grid = map.as_grid();
    let p = grid.point_of(index);
    NEIGHBOURS.iter().filter_map(move |&(dx, dy)| {
        let (nx, ny) = (p.x as i64 + dx, p.y as i64 + dy);
        grid.in_bounds(nx, ny).then(|| grid.index_of(nx as u32, ny as u32))
    })
}

/// Label every defined pixel of `map` into components.
///
/// A pixel joins the component being grown only if its width is compatible
/// with every 8-neighbour already in that component. Refused pixels stay
/// unlabelled and seed a component of their own later in the scan.
/// Components come out in row-major order of their seed pixel.
#[instrument(skip_all, fields(width = map.width(), height = map.height()))]
pub fn group(map: &StrokeWidthMap, config: &GroupingConfig) -> Vec<Component> {
    let threshold = config.ratio_threshold;
    let total = map.as_grid().len();
    let mut labels = vec![UNLABELLED; total];
    let mut queue = VecDeque::new();
    let mut components = Vec::new();
    let mut next_label = UNLABELLED;

    for seed in 0..total {
        if labels[seed] != UNLABELLED || map.get_index(seed).is_none() {
            continue;
        }
        next_label += 1;
        let label = next_label;
        labels[seed] = label;
        queue.push_back(seed);

        let mut members = Vec::new();
        let mut widths = Vec::new();

        while let Some(index) = queue.pop_front() {
            let Some(width) = map.get_index(index) else {
                continue;
            };
            members.push(map.as_grid().point_of(index));
            widths.push(width);

            for candidate in neighbours(map, index) {
                if labels[candidate] != UNLABELLED {
                    continue;
                }
                let Some(candidate_width) = map.get_index(candidate) else {
                    continue;
                };
                let fits = neighbours(map, candidate)
                    .filter(|&n| labels[n] == label)
                    .all(|n| {
                        map.get_index(n)
                            .is_some_and(|w| widths_compatible(w, candidate_width, threshold))
                    });
                if fits {
                    labels[candidate] = label;
                    queue.push_back(candidate);
                }
            }
        }

        if let Some(component) = Component::new(label, members, &widths) {
            components.push(component);
        }
    }

    debug!(components = components.len(), "Grouping complete");
    components
}
