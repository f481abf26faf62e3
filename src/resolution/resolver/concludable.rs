// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::slice;
use std::sync::Arc;

use crate::errors::ResolutionError;
use crate::observability::messages::resolution::RuleExpansionCut;
use crate::observability::messages::StructuredLog;
use crate::resolution::answer::{Answer, Derivation};
use crate::resolution::concept::ConceptMap;
use crate::resolution::context::ResolutionContext;
use crate::resolution::message::{Outgoing, Request, ResolverId, Response};
use crate::resolution::pattern::{Atom, Rule};
use crate::resolution::response_producer::ResponseProducer;
use crate::resolution::unifier::Unifier;
use crate::traits::Resolver;

/// Answers one sub-pattern from stored facts, then from each rule whose
/// conclusion unifies with it.
pub struct ConcludableResolver {
    id: ResolverId,
    name: String,
    atom: Atom,
    /// Rules that can conclude `atom`, with the resolver of their condition.
    rules: Vec<(ResolverId, Rule)>,
    context: Arc<ResolutionContext>,
}

impl ConcludableResolver {
    pub fn new(
        id: ResolverId,
        atom: Atom,
        rules: Vec<(ResolverId, Rule)>,
        context: Arc<ResolutionContext>,
    ) -> Self {
        Self {
            id,
            name: atom.to_string(),
            atom,
            rules,
            context,
        }
    }

    fn answer(&self, from_upstream: &Request, binding: ConceptMap, derivation: Derivation) -> Outgoing {
        Outgoing::Response(Response::Answer {
            answer: Answer::new(binding, self.name.clone(), derivation, self.id),
            source_request: from_upstream.clone(),
        })
    }

    async fn next_message(
        &self,
        from_upstream: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Outgoing, ResolutionError> {
        while let Some(binding) = response_producer.next_traversal().await? {
            if response_producer.record_produced(binding.clone()) {
                return Ok(self.answer(from_upstream, binding, Derivation::empty()));
            }
        }
        Ok(match response_producer.next_downstream() {
            Some(downstream) => Outgoing::Request(downstream),
            None => Outgoing::Response(Response::Exhausted {
                source_request: from_upstream.clone(),
            }),
        })
    }
}

#[async_trait]
impl Resolver for ConcludableResolver {
    fn id(&self) -> ResolverId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn response_producer(&self, from_upstream: &Request) -> Result<ResponseProducer, ResolutionError> {
        let traversal = self.context.traverse(
            &self.name,
            slice::from_ref(&self.atom),
            from_upstream.partial(),
        )?;
        let mut response_producer = ResponseProducer::new(Some(traversal));

        let path = from_upstream.path();
        if path.len() >= self.context.max_path_length() {
            for (_, rule) in &self.rules {
                RuleExpansionCut {
                    resolver: &self.name,
                    rule: rule.label(),
                    path_length: path.len(),
                }
                .log();
            }
            return Ok(response_producer);
        }

        // Pushed in reverse so that the first rule is resumed first.
        for (rule_resolver, rule) in self.rules.iter().rev() {
            if let Some((bounds, unifier)) = Unifier::unify(&self.atom, rule.then(), from_upstream.partial()) {
                response_producer.add_downstream(Request::new(
                    path.append(*rule_resolver),
                    bounds,
                    unifier,
                    Derivation::empty(),
                ));
            }
        }
        Ok(response_producer)
    }

    async fn receive_request(
        &mut self,
        from_upstream: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Outgoing, ResolutionError> {
        self.next_message(from_upstream, response_producer).await
    }

    async fn receive_answer(
        &mut self,
        from_upstream: &Request,
        answer: Answer,
        source_request: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Outgoing, ResolutionError> {
        let concluded = source_request
            .unifier()
            .unify_answer(answer.concept_map(), from_upstream.partial())
            .filter(|binding| self.atom.admits_all(binding));

        match concluded {
            Some(binding) if response_producer.record_produced(binding.clone()) => {
                let derivation = Derivation::empty().with_answer(source_request.path().receiver(), answer);
                Ok(self.answer(from_upstream, binding, derivation))
            }
            _ => self.next_message(from_upstream, response_producer).await,
        }
    }

    async fn receive_exhausted(
        &mut self,
        from_upstream: &Request,
        source_request: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Outgoing, ResolutionError> {
        response_producer.remove_downstream(source_request);
        self.next_message(from_upstream, response_producer).await
    }
}
