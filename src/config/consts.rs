// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default low watermark of a buffered aggregator
pub const DEFAULT_BUFFER_MIN: usize = 32;
/// Default high watermark of a buffered aggregator
pub const DEFAULT_BUFFER_MAX: usize = 64;
/// Default cap on the resolver path a rule request may extend
pub const DEFAULT_MAX_PATH_LENGTH: usize = 64;
/// Shortest usable path: the root and one concludable
pub const MIN_PATH_LENGTH: usize = 2;
pub const DEFAULT_RECORD_EXPLANATIONS: bool = true;
