// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::ResolutionError;
use crate::resolution::answer::Answer;
use crate::resolution::message::{Outgoing, Request, ResolverId, Response};
use crate::resolution::resolver::plan::{ConjunctionPlan, Step};
use crate::resolution::response_producer::ResponseProducer;
use crate::traits::Resolver;

/// Resolves the condition of a rule and answers in the rule's variables.
pub struct ConjunctionResolver {
    id: ResolverId,
    name: String,
    plan: ConjunctionPlan,
}

impl ConjunctionResolver {
    pub fn new(id: ResolverId, name: impl Into<String>, plan: ConjunctionPlan) -> Self {
        Self {
            id,
            name: name.into(),
            plan,
        }
    }

    fn respond(&self, from_upstream: &Request, step: Step) -> Outgoing {
        match step {
            Step::Answer(binding, derivation) => Outgoing::Response(Response::Answer {
                answer: Answer::new(binding, self.plan.conjunction().to_string(), derivation, self.id),
                source_request: from_upstream.clone(),
            }),
            Step::Request(downstream) => Outgoing::Request(downstream),
            Step::Exhausted => Outgoing::Response(Response::Exhausted {
                source_request: from_upstream.clone(),
            }),
        }
    }
}

#[async_trait]
impl Resolver for ConjunctionResolver {
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
