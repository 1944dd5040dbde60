// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stroke width transform: ray casting and median refinement.

pub mod cast;
pub mod median;

pub use cast::{CastOutcome, CastStats, Ray, Trace, cast, edges_face_each_other, inward_direction, trace_ray};
pub use median::{ray_median, refine, refine_pass};
