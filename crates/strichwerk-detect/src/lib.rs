// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// strichwerk-detect: stroke width transform text detection for Strichwerk.
//
// Provides the ray caster and median refiner (swt), component grouping and
// letter candidate filtering (component), text-line chaining (chain), input
// preparation from photographs (prepare), and the TextDetector pipeline.

pub mod chain;
pub mod component;
pub mod detector;
pub mod prepare;
pub mod swt;

#[cfg(test)]
mod fixtures;

// Re-export the primary types so callers can use `strichwerk_detect::TextDetector` etc.
pub use chain::Chain;
pub use component::{Component, LetterCandidate, Rejection, StrokeStats};
pub use detector::{Detection, TextDetector};
pub use prepare::PreparedInput;
pub use swt::{CastOutcome, CastStats, Ray};
