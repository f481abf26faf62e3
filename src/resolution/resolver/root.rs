// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::errors::{ProducerError, ResolutionError};
use crate::resolution::answer::{Answer, Derivation};
use crate::resolution::concept::ConceptMap;
use crate::resolution::message::{Outgoing, Request, ResolverId, Response};
use crate::resolution::resolver::plan::{ConjunctionPlan, Step};
use crate::resolution::response_producer::ResponseProducer;
use crate::traits::{ExplanationRecorder, Resolver};

/// What the root hands back to the answer stream for one pull.
#[derive(Debug)]
pub enum RootOutcome {
    Answer(Answer),
    Exhausted,
    Failed(ProducerError),
}

/// Resolves the query conjunction and delivers its answers to the caller.
pub struct RootResolver {
    id: ResolverId,
    name: String,
    plan: ConjunctionPlan,
    outcomes: mpsc::UnboundedSender<RootOutcome>,
    recorder: Option<Arc<dyn ExplanationRecorder>>,
}

impl RootResolver {
    pub fn new(
        id: ResolverId,
        name: impl Into<String>,
        plan: ConjunctionPlan,
        outcomes: mpsc::UnboundedSender<RootOutcome>,
        recorder: Option<Arc<dyn ExplanationRecorder>>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            plan,
            outcomes,
            recorder,
        }
    }

    fn submit(&self, binding: ConceptMap, derivation: Derivation) {
        let answer = Answer::new(binding, self.plan.conjunction().to_string(), derivation, self.id);
        if answer.is_inferred() {
            if let Some(recorder) = &self.recorder {
                recorder.record(&answer);
            }
        }
        // The stream may already have been recycled.
        let _ = self.outcomes.send(RootOutcome::Answer(answer));
    }

    fn respond(&self, from_upstream: &Request, step: Step) -> Outgoing {
        match step {
            Step::Answer(binding, derivation) => {
                self.submit(binding, derivation);
                Outgoing::Response(Response::RootResponse {
                    source_request: from_upstream.clone(),
                })
            }
            Step::Request(downstream) => Outgoing::Request(downstream),
            Step::Exhausted => {
                let _ = self.outcomes.send(RootOutcome::Exhausted);
                Outgoing::Response(Response::Exhausted {
                    source_request: from_upstream.clone(),
                })
            }
        }
    }
}

#[async_trait]
impl Resolver for RootResolver {
    fn id(&self) -> ResolverId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn response_producer(&self, from_upstream: &Request) -> Result<ResponseProducer, ResolutionError> {
        self.plan.initialise(&self.name, from_upstream)
    }

    async fn receive_request(
        &mut self,
        from_upstream: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Outgoing, ResolutionError> {
        let step = self.plan.next_step(response_producer).await?;
        Ok(self.respond(from_upstream, step))
    }

    async fn receive_answer(
        &mut self,
        from_upstream: &Request,
        answer: Answer,
        source_request: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Outgoing, ResolutionError> {
        let step = self
            .plan
            .on_answer(from_upstream, answer, source_request, response_producer)
            .await?;
        Ok(self.respond(from_upstream, step))
    }

    async fn receive_exhausted(
        &mut self,
        from_upstream: &Request,
        source_request: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Outgoing, ResolutionError> {
        let step = self.plan.on_exhausted(source_request, response_producer).await?;
        Ok(self.respond(from_upstream, step))
    }
}
