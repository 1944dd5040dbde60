// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text-line chaining: pairs similar neighbouring letter candidates, then
// merges collinear pairs sharing an end into longer chains.

use serde::Serialize;
use strichwerk_core::{BoundingBox, ChainConfig};
use tracing::{debug, instrument};

use crate::component::LetterCandidate;

/// A run of letter candidates along one direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chain {
    /// Candidate indices, ascending and unique.
    pub members: Vec<usize>,
    /// Union of the members' bounding boxes.
    pub bounds: BoundingBox,
}

impl Chain {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Working state while merging. `p` and `q` are the candidate indices at the
/// two ends; `direction` is the unit vector from `q`'s centre to `p`'s.
#[derive(Debug, Clone)]
struct Link {
    p: usize,
    q: usize,
    direction: (f32, f32),
    distance: f32,
    members: Vec<usize>,
    merged: bool,
}

impl Link {
    fn between(p: usize, q: usize, centers: &[(f32, f32)]) -> Self {
        let mut link = Self {
            p,
            q,
            direction: (0.0, 0.0),
            distance: 0.0,
            members: vec![p, q],
            merged: false,
        };
        link.reorient(centers);
        link
    }

    /// Recompute `direction` and `distance` from the current ends.
    fn reorient(&mut self, centers: &[(f32, f32)]) {
        let dx = centers[self.p].0 - centers[self.q].0;
        let dy = centers[self.p].1 - centers[self.q].1;
        let mag = (dx * dx + dy * dy).sqrt();
        self.distance = mag;
        self.direction = if mag > 0.0 { (dx / mag, dy / mag) } else { (0.0, 0.0) };
    }
}

/// `a / b` lies in `[1 / bound, bound]`.
fn ratio_within(a: f32, b: f32, bound: f32) -> bool {
    if a <= 0.0 || b <= 0.0 {
        return false;
    }
    let r = a / b;
    r >= 1.0 / bound && r <= bound
}

fn angle_between(a: (f32, f32), b: (f32, f32)) -> f32 {
    (a.0 * b.0 + a.1 * b.1).clamp(-1.0, 1.0).acos()
}

fn eligible_pair(a: &LetterCandidate, b: &LetterCandidate, config: &ChainConfig) -> bool {
    if !ratio_within(a.stroke.median, b.stroke.median, config.max_median_ratio)
        || !ratio_within(a.height() as f32, b.height() as f32, config.max_dimension_ratio)
        || !ratio_within(a.width() as f32, b.width() as f32, config.max_dimension_ratio)
    {
        return false;
    }
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    let dist_sq = (ax - bx).powi(2) + (ay - by).powi(2);
    let min_height = a.height().min(b.height()) as f32;
    dist_sq / (min_height * min_height) < config.max_distance_ratio
}

/// Try to fold `other` into `link`. The direction comparison flips `other`
/// when both links point away from, or both into, the shared end.
fn try_merge(link: &mut Link, other: &Link, tolerance: f32, centers: &[(f32, f32)]) -> bool {
    let flipped = (-other.direction.0, -other.direction.1);
    let (compare, new_end) = if link.p == other.p {
        (flipped, End::P(other.q))
    } else if link.p == other.q {
        (other.direction, End::P(other.p))
    } else if link.q == other.p {
        (other.direction, End::Q(other.q))
    } else if link.q == other.q {
        (flipped, End::Q(other.p))
    } else {
        return false;
    };

    if angle_between(link.direction, compare) >= tolerance {
        return false;
    }
    match new_end {
        End::P(p) => link.p = p,
        End::Q(q) => link.q = q,
    }
    link.members.extend_from_slice(&other.members);
    link.reorient(centers);
    true
}

enum End {
    P(usize),
    Q(usize),
}

/// Group candidates into text lines.
///
/// Returns chains ordered longest first. Chains shorter than
/// `config.min_chain_len` and chains whose members all belong to an
/// already accepted chain are dropped.
#[instrument(skip_all, fields(candidates = candidates.len()))]
pub fn chain(candidates: &[LetterCandidate], config: &ChainConfig) -> Vec<Chain> {
    let centers: Vec<(f32, f32)> = candidates.iter().map(|c| c.center()).collect();

    let mut links = Vec::new();
    for i in 0..candidates.len() {
        for j in i + 1..candidates.len() {
            if eligible_pair(&candidates[i], &candidates[j], config) {
                links.push(Link::between(i, j, &centers));
            }
        }
    }
    debug!(pairs = links.len(), "Eligible candidate pairs");
    links.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    let tolerance = config.max_direction_angle_deg.to_radians();
    loop {
        let mut merges = 0;
        for link in &mut links {
            link.merged = false;
        }
        for i in 0..links.len() {
            for j in 0..links.len() {
                if i == j || links[i].merged || links[j].merged {
                    continue;
                }
                let other = links[j].clone();
                if try_merge(&mut links[i], &other, tolerance, &centers) {
                    links[j].merged = true;
                    merges += 1;
                }
            }
        }
        links.retain(|link| !link.merged);
        links.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
        if merges == 0 {
            break;
        }
    }

    for link in &mut links {
        link.members.sort_unstable();
        link.members.dedup();
    }
    links.sort_by(|a, b| b.members.len().cmp(&a.members.len()));

    let mut accepted: Vec<Chain> = Vec::new();
    for link in links {
        if link.members.len() < config.min_chain_len {
            continue;
        }
        let covered = accepted
            .iter()
            .any(|chain| link.members.iter().all(|m| chain.members.binary_search(m).is_ok()));
        if covered {
            continue;
        }
        let Some(bounds) = link
            .members
            .iter()
            .map(|&m| candidates[m].bounds)
            .reduce(|acc, b| acc.union(&b))
        else {
            continue;
        };
        accepted.push(Chain {
            members: link.members,
            bounds,
        });
    }

    debug!(chains = accepted.len(), "Chaining complete");
    accepted
}
