// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection configuration: per-stage thresholds with JSON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, StrichwerkError};

/// Ray-casting settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Strokes are darker than their background. Selects the sign that turns
    /// a raw gradient into a direction pointing into the stroke.
    pub dark_on_light: bool,
    /// Longest accepted ray, in pixels (Euclidean edge-to-edge distance).
    pub max_stroke_length: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_on_light: true,
            max_stroke_length: 20,
        }
    }
}

/// Component grouping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Largest `max(w1, w2) / min(w1, w2)` allowed between two adjacent
    /// pixels of one component.
    pub ratio_threshold: f32,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: 3.0,
        }
    }
}

/// Letter candidate filter thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Minimum component pixel count.
    pub min_area: usize,
    /// Maximum component pixel count as a fraction of the image area.
    pub max_area_ratio: f32,
    /// Minimum bounding-box height in pixels.
    pub min_height: u32,
    /// Maximum bounding-box height in pixels.
    pub max_height: u32,
    /// Accepted `width / height` lies in `[1 / max, max]`.
    pub max_aspect_ratio: f32,
    /// Largest accepted stroke-width `variance / mean`.
    pub max_variance_ratio: f32,
    /// Lower bound on `diagonal / mean stroke width`.
    pub min_diameter_ratio: f32,
    /// Upper bound on `diagonal / mean stroke width`.
    pub max_diameter_ratio: f32,
    /// Rows at the top of the image in which no candidate may start.
    pub top_border: u32,
    /// Rows at the bottom of the image in which no candidate may end.
    pub bottom_border: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_area: 8,
            max_area_ratio: 0.5,
            min_height: 11,
            max_height: 300,
            max_aspect_ratio: 4.0,
            max_variance_ratio: 0.5,
            min_diameter_ratio: 1.0,
            max_diameter_ratio: 10.0,
            top_border: 0,
            bottom_border: 0,
        }
    }
}

/// Text-line chaining of letter candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Symmetric bound on the ratio of two candidates' median stroke widths.
    pub max_median_ratio: f32,
    /// Symmetric bound on the ratio of two candidates' heights and widths.
    pub max_dimension_ratio: f32,
    /// Squared centre distance over squared smaller height must stay below this.
    pub max_distance_ratio: f32,
    /// Largest direction difference, in degrees, for two chains to merge.
    pub max_direction_angle_deg: f32,
    /// Chains with fewer members are dropped.
    pub min_chain_len: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_median_ratio: 3.0,
            max_dimension_ratio: 2.0,
            max_distance_ratio: 0.8,
            max_direction_angle_deg: 18.0,
            min_chain_len: 3,
        }
    }
}

/// Edge map and gradient preparation from a raw photograph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareConfig {
    /// Gaussian blur applied before edge and gradient extraction.
    pub blur_sigma: f32,
    /// Spread of the automatic Canny thresholds around the median intensity.
    pub canny_sigma: f32,
    /// Wider inputs are downscaled to this width, aspect ratio preserved.
    pub max_input_width: u32,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            canny_sigma: 0.27,
            max_input_width: 1200,
        }
    }
}

/// Everything a detection run needs, grouped per stage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub settings: Settings,
    pub grouping: GroupingConfig,
    pub filter: FilterConfig,
    pub chaining: ChainConfig,
    pub preparation: PrepareConfig,
}

impl DetectionConfig {
    /// Check every threshold for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.settings.max_stroke_length == 0 {
            return Err(invalid("settings.max_stroke_length must be at least 1"));
        }

        require_ratio("grouping.ratio_threshold", self.grouping.ratio_threshold)?;

        let f = &self.filter;
        require_positive("filter.max_area_ratio", f.max_area_ratio)?;
        require_ratio("filter.max_aspect_ratio", f.max_aspect_ratio)?;
        require_positive("filter.max_variance_ratio", f.max_variance_ratio)?;
        require_positive("filter.min_diameter_ratio", f.min_diameter_ratio)?;
        require_positive("filter.max_diameter_ratio", f.max_diameter_ratio)?;
        if f.min_height > f.max_height {
            return Err(invalid(format!(
                "filter.min_height ({}) exceeds filter.max_height ({})",
                f.min_height, f.max_height
            )));
        }
        if f.min_diameter_ratio > f.max_diameter_ratio {
            return Err(invalid(format!(
                "filter.min_diameter_ratio ({}) exceeds filter.max_diameter_ratio ({})",
                f.min_diameter_ratio, f.max_diameter_ratio
            )));
        }

        let c = &self.chaining;
        require_ratio("chaining.max_median_ratio", c.max_median_ratio)?;
        require_ratio("chaining.max_dimension_ratio", c.max_dimension_ratio)?;
        require_positive("chaining.max_distance_ratio", c.max_distance_ratio)?;
        if !c.max_direction_angle_deg.is_finite()
            || !(0.0..=180.0).contains(&c.max_direction_angle_deg)
        {
            return Err(invalid(format!(
                "chaining.max_direction_angle_deg must lie in 0..=180, got {}",
                c.max_direction_angle_deg
            )));
        }
        if c.min_chain_len == 0 {
            return Err(invalid("chaining.min_chain_len must be at least 1"));
        }

        let p = &self.preparation;
        require_positive("preparation.blur_sigma", p.blur_sigma)?;
        if !p.canny_sigma.is_finite() || !(0.0..=1.0).contains(&p.canny_sigma) {
            return Err(invalid(format!(
                "preparation.canny_sigma must lie in 0..=1, got {}",
                p.canny_sigma
            )));
        }
        if p.max_input_width == 0 {
            return Err(invalid("preparation.max_input_width must be at least 1"));
        }

        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&data)?;
        info!(path = %path.display(), "detection config loaded");
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), "detection config saved");
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> StrichwerkError {
    StrichwerkError::InvalidConfig(msg.into())
}

fn require_positive(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(format!("{name} must be positive and finite, got {value}")));
    }
    Ok(())
}

/// A symmetric ratio bound `r` accepts `[1/r, r]`, so it must be at least 1.
fn require_ratio(name: &str, value: f32) -> Result<()> {
    require_positive(name, value)?;
    if value < 1.0 {
        return Err(invalid(format!("{name} must be at least 1, got {value}")));
    }
    Ok(())
}
