// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // traversal collaborators
pub mod config;        // config + scenarios
pub mod errors;        // error handling
pub mod observability;
pub mod producer;      // buffered production
pub mod resolution;    // resolver actors
pub mod traits;        // unified abstractions
