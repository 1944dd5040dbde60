// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Letter candidate filter: geometric and stroke-statistics plausibility checks.

use std::ops::Deref;

use serde::Serialize;
use strichwerk_core::FilterConfig;
use thiserror::Error;
use tracing::{debug, instrument};

use super::Component;

/// Why a component is not a letter candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("area below minimum")]
    TooSmall,
    #[error("area too large relative to the image")]
    TooLarge,
    #[error("height below minimum")]
    TooShort,
    #[error("height above maximum")]
    TooTall,
    #[error("touches an excluded border band")]
    InBorder,
    #[error("aspect ratio out of range")]
    AspectRatio,
    #[error("stroke width variance too high")]
    StrokeVariance,
    #[error("diameter to stroke width ratio out of range")]
    DiameterRatio,
}

/// A component that passed [`classify`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LetterCandidate(pub(crate) Component);

impl LetterCandidate {
    pub fn component(&self) -> &Component {
        &self.0
    }

    pub fn into_component(self) -> Component {
        self.0
    }
}

impl Deref for LetterCandidate {
    type Target = Component;

    fn deref(&self) -> &Component {
        &self.0
    }
}

/// Decide whether `component` looks like a single glyph in an image of
/// `image_dims = (width, height)`.
pub fn classify(component: &Component, image_dims: (u32, u32), config: &FilterConfig) -> Result<(), Rejection> {
    let (image_width, image_height) = image_dims;
    let area = component.area();

    if area < config.min_area {
        return Err(Rejection::TooSmall);
    }
    let image_area = image_width as f32 * image_height as f32;
    if area as f32 > config.max_area_ratio * image_area {
        return Err(Rejection::TooLarge);
    }

    let height = component.height();
    if height < config.min_height {
        return Err(Rejection::TooShort);
    }
    if height > config.max_height {
        return Err(Rejection::TooTall);
    }

    let bounds = &component.bounds;
    if bounds.min_y < config.top_border {
        return Err(Rejection::InBorder);
    }
    if config.bottom_border > 0 && bounds.max_y >= image_height.saturating_sub(config.bottom_border) {
        return Err(Rejection::InBorder);
    }

    let aspect = component.width() as f32 / height as f32;
    if aspect < 1.0 / config.max_aspect_ratio || aspect > config.max_aspect_ratio {
        return Err(Rejection::AspectRatio);
    }

    let mean = component.mean_stroke_width();
    if mean <= 0.0 || component.stroke.variance / mean > config.max_variance_ratio {
        return Err(Rejection::StrokeVariance);
    }

    let diameter_ratio = component.diameter() / mean;
    if diameter_ratio < config.min_diameter_ratio || diameter_ratio > config.max_diameter_ratio {
        return Err(Rejection::DiameterRatio);
    }

    Ok(())
}

/// Keep the components that [`classify`] accepts, in input order.
#[instrument(skip_all, fields(components = components.len()))]
pub fn filter(components: &[Component], image_dims: (u32, u32), config: &FilterConfig) -> Vec<LetterCandidate> {
    let candidates: Vec<LetterCandidate> = components
        .iter()
        .filter(|component| match classify(component, image_dims, config) {
            Ok(()) => true,
            Err(reason) => {
                debug!(
                    label = component.label,
                    area = component.area(),
                    width = component.width(),
                    height = component.height(),
                    %reason,
                    "Component rejected"
                );
                false
            }
        })
        .cloned()
        .map(LetterCandidate)
        .collect();

    debug!(candidates = candidates.len(), "Filtering complete");
    candidates
}
