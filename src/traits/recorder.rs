// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::resolution::answer::Answer;

/// Collaborator notified of every inferred answer before it reaches the caller.
pub trait ExplanationRecorder: Send + Sync {
    fn record(&self, answer: &Answer);
}
