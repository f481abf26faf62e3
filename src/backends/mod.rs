// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod memory; // in-memory fact store and join cursor
pub mod stub;   // canned sources for tests and demos

pub use memory::{Fact, MemoryGraph};
