// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use parking_lot::Mutex;

use crate::resolution::answer::Answer;
use crate::traits::ExplanationRecorder;

/// Keeps every inferred answer, with its full derivation, in memory.
#[derive(Default)]
pub struct ResolutionRecorder {
    answers: Mutex<Vec<Answer>>,
}

impl ResolutionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answers(&self) -> Vec<Answer> {
        self.answers.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.answers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ExplanationRecorder for ResolutionRecorder {
    fn record(&self, answer: &Answer) {
        tracing::debug!(answer = %answer.concept_map(), "recording explanation");
        self.answers.lock().push(answer.clone());
    }
}
