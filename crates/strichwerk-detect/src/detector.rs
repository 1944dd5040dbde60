// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection pipeline: cast, refine, group, filter, chain.

use image::GrayImage;
use strichwerk_core::{DetectionConfig, EdgeMap, GradientField, Result, StrichwerkError, StrokeWidthMap};
use tracing::{info, instrument};

use crate::chain::{Chain, chain};
use crate::component::{Component, LetterCandidate, filter, group};
use crate::prepare::prepare;
use crate::swt::{CastStats, Ray, cast, refine};

/// Everything one detection run produces.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Refined stroke widths.
    pub stroke_widths: StrokeWidthMap,
    pub rays: Vec<Ray>,
    pub cast_stats: CastStats,
    /// Median passes that changed the map.
    pub refine_passes: usize,
    /// Every grouped component, accepted or not.
    pub components: Vec<Component>,
    pub candidates: Vec<LetterCandidate>,
    /// Text lines over `candidates` (indices into that list).
    pub chains: Vec<Chain>,
}

/// Stroke-width text detector.
///
/// Holds no per-image state: one detector can serve any number of images,
/// from any number of threads.
///
/// ```no_run
/// use strichwerk_core::DetectionConfig;
/// use strichwerk_detect::TextDetector;
///
/// let detector = TextDetector::new(DetectionConfig::default())?;
/// let gray = strichwerk_detect::prepare::load_luma("bib.jpg")?;
/// let detection = detector.detect_luma(&gray)?;
/// for candidate in &detection.candidates {
///     println!("{:?}", candidate.bounds);
/// }
/// # Ok::<(), strichwerk_core::StrichwerkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TextDetector {
    config: DetectionConfig,
}

impl TextDetector {
    /// Build a detector; fails if `config` does not validate.
    pub fn new(config: DetectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Run the full pipeline on a precomputed edge map and gradient field.
    ///
    /// Fails only when the two inputs differ in size.
    #[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
    pub fn detect(&self, edges: &EdgeMap, gradients: &GradientField) -> Result<Detection> {
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

        let outcome = cast(edges, gradients, &self.config.settings)?;
        let cast_stats = outcome.stats;
        let (mut stroke_widths, rays) = outcome.into_parts();
        let refine_passes = refine(&mut stroke_widths, &rays);

        // Grouping reads the finished map only.
        let components = group(&stroke_widths, &self.config.grouping);
        let candidates = filter(&components, edges.dimensions(), &self.config.filter);
        let chains = chain(&candidates, &self.config.chaining);

        info!(
            rays = rays.len(),
            refine_passes,
            components = components.len(),
            candidates = candidates.len(),
            chains = chains.len(),
            "Detection complete"
        );

        Ok(Detection {
            stroke_widths,
            rays,
            cast_stats,
            refine_passes,
            components,
            candidates,
            chains,
        })
    }

    /// Prepare a grayscale photograph and run [`TextDetector::detect`] on it.
    /// Coordinates in the result refer to the prepared (possibly downscaled)
    /// image.
    pub fn detect_luma(&self, gray: &GrayImage) -> Result<Detection> {
        let prepared = prepare(gray, &self.config.preparation)?;
        self.detect(&prepared.edges, &prepared.gradients)
    }
}
