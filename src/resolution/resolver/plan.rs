// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::errors::ResolutionError;
use crate::resolution::answer::{Answer, Derivation};
use crate::resolution::concept::ConceptMap;
use crate::resolution::context::ResolutionContext;
use crate::resolution::message::{Request, ResolverId};
use crate::resolution::pattern::Conjunction;
use crate::resolution::response_producer::ResponseProducer;
use crate::resolution::unifier::Unifier;

/// What a conjunction-shaped resolver does next for one upstream request.
#[derive(Debug)]
pub enum Step {
    Answer(ConceptMap, Derivation),
    Request(Request),
    Exhausted,
}

/// Plan-ordered, backtracking evaluation of a conjunction over one
/// concludable resolver per sub-pattern.
///
/// The whole conjunction is first traversed against stored facts. Then the
/// planned resolvers are walked depth-first: an answer from resolver `i` is
/// merged into the binding and forwarded as a request to resolver `i + 1`; the
/// merged answer of the last resolver is emitted. Bindings already emitted for
/// the upstream request are skipped.
pub struct ConjunctionPlan {
    conjunction: Conjunction,
    planned: Vec<ResolverId>,
    context: Arc<ResolutionContext>,
}

impl ConjunctionPlan {
    pub fn new(conjunction: Conjunction, planned: Vec<ResolverId>, context: Arc<ResolutionContext>) -> Self {
        assert_eq!(
            conjunction.atoms().len(),
            planned.len(),
            "one planned resolver is needed per sub-pattern"
        );
        Self {
            conjunction,
            planned,
            context,
        }
    }

    pub fn conjunction(&self) -> &Conjunction {
        &self.conjunction
    }

    pub fn initialise(&self, name: &str, from_upstream: &Request) -> Result<ResponseProducer, ResolutionError> {
        let traversal = self
            .context
            .traverse(name, self.conjunction.atoms(), from_upstream.partial())?;
        let mut response_producer = ResponseProducer::new(Some(traversal));
        if let Some(first) = self.planned.first() {
            response_producer.add_downstream(Request::new(
                from_upstream.path().append(*first),
                from_upstream.partial().clone(),
                Unifier::identity(),
                Derivation::empty(),
            ));
        }
        Ok(response_producer)
    }

    fn next_planned(&self, resolver: ResolverId) -> Option<ResolverId> {
        let position = self.planned.iter().position(|planned| *planned == resolver)?;
        self.planned.get(position + 1).copied()
    }

    /// Stored-fact answers first, then the newest open downstream request.
    pub async fn next_step(&self, response_producer: &mut ResponseProducer) -> Result<Step, ResolutionError> {
        while let Some(binding) = response_producer.next_traversal().await? {
            if response_producer.record_produced(binding.clone()) {
                return Ok(Step::Answer(binding, Derivation::empty()));
            }
        }
        Ok(match response_producer.next_downstream() {
            Some(downstream) => Step::Request(downstream),
            None => Step::Exhausted,
        })
    }

    pub async fn on_answer(
        &self,
        from_upstream: &Request,
        answer: Answer,
        source_request: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Step, ResolutionError> {
        let downstream = source_request.path().receiver();
        let Some(binding) = source_request.partial().merge(answer.concept_map()) else {
            return self.next_step(response_producer).await;
        };
        let derivation = if answer.is_inferred() {
            source_request.derivation().with_answer(downstream, answer)
        } else {
            source_request.derivation().clone()
        };

        match self.next_planned(downstream) {
            Some(next) => {
                let request = Request::new(
                    from_upstream.path().append(next),
                    binding,
                    Unifier::identity(),
                    derivation,
                );
                response_producer.add_downstream(request.clone());
                Ok(Step::Request(request))
            }
            None if response_producer.record_produced(binding.clone()) => Ok(Step::Answer(binding, derivation)),
            None => self.next_step(response_producer).await,
        }
    }

    pub async fn on_exhausted(
        &self,
        source_request: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Step, ResolutionError> {
        response_producer.remove_downstream(source_request);
        self.next_step(response_producer).await
    }
}
