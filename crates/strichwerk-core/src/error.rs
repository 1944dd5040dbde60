// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Strichwerk.

use thiserror::Error;

/// Top-level error type for all Strichwerk operations.
///
/// Only construction and configuration boundaries produce these. The
/// detection stages themselves never fail: a degenerate gradient, a ray
/// leaving the image, or an over-long stroke is a logged rejection.
#[derive(Debug, Error)]
pub enum StrichwerkError {
    // -- Grid construction --
    #[error("grid size mismatch: expected {expected} cells, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error(
        "dimension mismatch: {left} is {left_width}x{left_height}, \
         {right} is {right_width}x{right_height}"
    )]
    DimensionMismatch {
        left: &'static str,
        left_width: u32,
        left_height: u32,
        right: &'static str,
        right_width: u32,
        right_height: u32,
    },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Input preparation --
    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, StrichwerkError>;
