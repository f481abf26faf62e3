// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_BUFFER_MAX, DEFAULT_BUFFER_MIN, DEFAULT_MAX_PATH_LENGTH, DEFAULT_RECORD_EXPLANATIONS,
};
use crate::config::validation::validate_config;
use crate::errors::ConfigError;
use crate::producer::Watermarks;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Tuning of the reasoner.
///
/// Every field is optional; unset values fall back to the constants in
/// [`crate::config::consts`].
///
/// # Example
/// ```yaml
/// traversal_buffer:
///   min: 32
///   max: 64
/// answer_buffer:
///   min: 2
///   max: 8
/// resolution:
///   max_path_length: 64
///   record_explanations: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Buffer between a storage cursor and the resolver reading it
    #[serde(default)]
    pub traversal_buffer: BufferOptions,
    /// Buffer between the root resolver and the caller
    #[serde(default)]
    pub answer_buffer: BufferOptions,
    #[serde(default)]
    pub resolution: ResolutionOptions,
}

/// Low and high watermarks of one buffered aggregator.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BufferOptions {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl BufferOptions {
    pub fn get_min(&self) -> usize {
        self.min.unwrap_or(DEFAULT_BUFFER_MIN)
    }

    pub fn get_max(&self) -> usize {
        self.max.unwrap_or(DEFAULT_BUFFER_MAX)
    }

    /// The configured watermarks; `buffer` names this buffer in the error.
    pub fn watermarks(&self, buffer: &'static str) -> Result<Watermarks, ConfigError> {
        let (min, max) = (self.get_min(), self.get_max());
        Watermarks::new(min, max).map_err(|_| ConfigError::InvalidWatermarks { buffer, min, max })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResolutionOptions {
    /// A concludable stops asking rules once the request path is this long.
    /// Bounds recursion through rules over cyclic data.
    pub max_path_length: Option<usize>,
    pub record_explanations: Option<bool>,
}

impl ResolutionOptions {
    pub fn max_path_length(&self) -> usize {
        self.max_path_length.unwrap_or(DEFAULT_MAX_PATH_LENGTH)
    }

    pub fn record_explanations(&self) -> bool {
        self.record_explanations.unwrap_or(DEFAULT_RECORD_EXPLANATIONS)
    }
}

pub(crate) fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|extension| extension == "toml")
}

/// Loads a config from a YAML file, or from TOML when the file ends in `.toml`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let config = if is_toml(path) {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(config)
}

pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let config = load_config(path)?;
    validate_config(&config)?;
    Ok(config)
}
