// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod producer;
mod resolution;

pub use config::ConfigError;
pub use producer::ProducerError;
pub use resolution::ResolutionError;
