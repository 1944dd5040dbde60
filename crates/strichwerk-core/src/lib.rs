// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Strichwerk core: grid types, configuration, and error definitions shared
// across all crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::{ChainConfig, DetectionConfig, FilterConfig, GroupingConfig, PrepareConfig, Settings};
pub use error::{Result, StrichwerkError};
pub use types::*;
