// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod scenario;
mod validation;

pub mod consts;

pub use loader::{load_and_validate_config, load_config, BufferOptions, Config, ResolutionOptions};
pub use scenario::{load_scenario, Scenario};
pub use validation::validate_config;
