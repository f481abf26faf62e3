// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Validation of a loaded [`Config`].
//!
//! Checks, in order:
//! 1. traversal buffer watermarks satisfy `0 < min < max`
//! 2. answer buffer watermarks satisfy `0 < min < max`
//! 3. the resolution path cap leaves room for at least one concludable

use crate::config::consts::MIN_PATH_LENGTH;
use crate::config::Config;
use crate::errors::ConfigError;

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    config.traversal_buffer.watermarks("traversal_buffer")?;
    config.answer_buffer.watermarks("answer_buffer")?;

    let max_path_length = config.resolution.max_path_length();
    if max_path_length < MIN_PATH_LENGTH {
        return Err(ConfigError::InvalidPathLength(max_path_length));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BufferOptions, ResolutionOptions};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_equal_watermarks_rejected() {
        let config = Config {
            answer_buffer: BufferOptions {
                min: Some(4),
                max: Some(4),
            },
            ..Default::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidWatermarks { buffer: "answer_buffer", min: 4, max: 4 })
        ));
    }

    #[test]
    fn test_max_below_default_min_rejected() {
        // min falls back to its default, which is above the configured max
        let config = Config {
            traversal_buffer: BufferOptions { min: None, max: Some(8) },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_path_length_too_short() {
        let config = Config {
            resolution: ResolutionOptions {
                max_path_length: Some(1),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(validate_config(&config), Err(ConfigError::InvalidPathLength(1))));
    }
}
