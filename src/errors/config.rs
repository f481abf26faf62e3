// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ResolutionError;
use thiserror::Error;

/// Errors that can occur while loading and validating configuration or scenarios.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Buffer watermarks must satisfy `0 < min < max`.
    #[error("invalid {buffer} watermarks: min={min}, max={max} (expected 0 < min < max)")]
    InvalidWatermarks {
        buffer: &'static str,
        min: usize,
        max: usize,
    },

    #[error("resolution.max_path_length must be at least 2, got {0}")]
    InvalidPathLength(usize),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}
