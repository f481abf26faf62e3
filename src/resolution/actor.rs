// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One tokio task per resolver, fed by an unbounded mailbox.
//!
//! The actor owns every response producer of its resolver and the table that
//! maps each downstream request back to the upstream request it serves. Messages
//! are handled one at a time, so neither needs a lock.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::errors::ResolutionError;
use crate::observability::messages::resolution::{
    AnswerProduced, RequestExhausted, RequestReceived, ResolverFailed,
};
use crate::observability::messages::StructuredLog;
use crate::resolution::message::{Outgoing, Request, RequestId, ResolverId, ResolverMessage, Response};
use crate::resolution::resolver::RootOutcome;
use crate::resolution::response_producer::ResponseProducer;
use crate::traits::Resolver;

/// Mailboxes of every resolver of one query.
#[derive(Default)]
pub struct ResolverRegistry {
    mailboxes: HashMap<ResolverId, mpsc::UnboundedSender<ResolverMessage>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, resolver: ResolverId) -> mpsc::UnboundedReceiver<ResolverMessage> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.mailboxes.insert(resolver, sender);
        receiver
    }

    pub fn len(&self) -> usize {
        self.mailboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mailboxes.is_empty()
    }

    pub fn send(&self, to: ResolverId, message: ResolverMessage) -> Result<(), ResolutionError> {
        let mailbox = self
            .mailboxes
            .get(&to)
            .ok_or(ResolutionError::UnknownResolver(to.index()))?;
        mailbox
            .send(message)
            .map_err(|_| ResolutionError::MailboxClosed {
                resolver: to.to_string(),
            })
    }
}

pub struct ResolverActor {
    resolver: Box<dyn Resolver>,
    mailbox: mpsc::UnboundedReceiver<ResolverMessage>,
    registry: Arc<ResolverRegistry>,
    outcomes: mpsc::UnboundedSender<RootOutcome>,
    cancellation_token: CancellationToken,
    response_producers: HashMap<RequestId, ResponseProducer>,
    /// downstream request -> the upstream request it was issued for
    request_router: HashMap<RequestId, Request>,
}

impl ResolverActor {
    pub fn new(
        resolver: Box<dyn Resolver>,
        mailbox: mpsc::UnboundedReceiver<ResolverMessage>,
        registry: Arc<ResolverRegistry>,
        outcomes: mpsc::UnboundedSender<RootOutcome>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            resolver,
            mailbox,
            registry,
            outcomes,
            cancellation_token,
            response_producers: HashMap::new(),
            request_router: HashMap::new(),
        }
    }

    /// Runs until the query is cancelled, the mailbox closes, or handling a
    /// message fails. A failure is reported once on the answer stream and
    /// cancels every other resolver of the query.
    pub async fn run(mut self) {
        loop {
            let message = tokio::select! {
                _ = self.cancellation_token.cancelled() => break,
                message = self.mailbox.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };

            if let Err(error) = self.handle(message).await {
                let name = self.resolver.name().to_string();
                ResolverFailed {
                    resolver: &name,
                    error: &error,
                }
                .log();
                let _ = self
                    .outcomes
                    .send(RootOutcome::Failed(error.into_producer_error(&name)));
                self.cancellation_token.cancel();
                break;
            }
        }

        for (_, mut response_producer) in self.response_producers.drain() {
            response_producer.recycle();
        }
        tracing::trace!(resolver = self.resolver.name(), "resolver stopped");
    }

    async fn handle(&mut self, message: ResolverMessage) -> Result<(), ResolutionError> {
        match message {
            ResolverMessage::Request(request) => {
                RequestReceived {
                    resolver: self.resolver.name(),
                    request: request.id().value(),
                    path_length: request.path().len(),
                }
                .log();

                let response_producer = match self.response_producers.entry(request.id()) {
                    Entry::Occupied(entry) => entry.into_mut(),
                    Entry::Vacant(entry) => entry.insert(self.resolver.response_producer(&request)?),
                };
                let outgoing = self
                    .resolver
                    .receive_request(&request, response_producer)
                    .await?;
                self.dispatch(&request, outgoing)
            }
            ResolverMessage::Response(response) => {
                let source_request = response.source_request().clone();
                let upstream = self
                    .request_router
                    .get(&source_request.id())
                    .cloned()
                    .ok_or_else(|| unknown_request(self.resolver.name(), &source_request))?;
                let Some(response_producer) = self.response_producers.get_mut(&upstream.id()) else {
                    // The upstream request was already exhausted; nothing waits for this.
                    return Err(unknown_request(self.resolver.name(), &upstream));
                };

                let outgoing = match response {
                    Response::Answer { answer, .. } => {
                        self.resolver
                            .receive_answer(&upstream, answer, &source_request, response_producer)
                            .await?
                    }
                    Response::Exhausted { .. } => {
                        self.request_router.remove(&source_request.id());
                        self.resolver
                            .receive_exhausted(&upstream, &source_request, response_producer)
                            .await?
                    }
                    Response::RootResponse { .. } => return Ok(()),
                };
                self.dispatch(&upstream, outgoing)
            }
        }
    }

    fn dispatch(&mut self, upstream: &Request, outgoing: Outgoing) -> Result<(), ResolutionError> {
        match outgoing {
            Outgoing::Request(downstream) => {
                self.request_router.insert(downstream.id(), upstream.clone());
                self.registry
                    .send(downstream.path().receiver(), ResolverMessage::Request(downstream))
            }
            Outgoing::Response(response) => {
                match &response {
                    Response::Answer { answer, .. } => AnswerProduced {
                        resolver: self.resolver.name(),
                        answer: answer.concept_map(),
                        inferred: answer.is_inferred(),
                    }
                    .log(),
                    Response::Exhausted { source_request } => {
                        if let Some(mut response_producer) = self.response_producers.remove(&source_request.id()) {
                            RequestExhausted {
                                resolver: self.resolver.name(),
                                request: source_request.id().value(),
                                produced: response_producer.produced_count(),
                            }
                            .log();
                            response_producer.recycle();
                        }
                    }
                    Response::RootResponse { .. } => {}
                }
                match response.source_request().path().sender() {
                    Some(sender) => self.registry.send(sender, ResolverMessage::Response(response)),
                    None => Ok(()),
                }
            }
        }
    }
}

fn unknown_request(resolver: &str, request: &Request) -> ResolutionError {
    ResolutionError::UnknownRequest {
        resolver: resolver.to_string(),
        request: request.id().value(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryGraph;
    use crate::errors::ProducerError;
    use crate::producer::Watermarks;
    use crate::resolution::answer::Derivation;
    use crate::resolution::concept::ConceptMap;
    use crate::resolution::context::ResolutionContext;
    use crate::resolution::message::ResolutionPath;
    use crate::resolution::pattern::{Atom, Conjunction, Rule, Term};
    use crate::resolution::resolver::ConcludableResolver;
    use crate::resolution::unifier::Unifier;
    use tokio::runtime::Handle;
    use tokio::task::JoinHandle;

    fn atom(relation: &str) -> Atom {
        Atom::new(relation, vec![Term::var("x")])
    }

    fn concludable(id: usize, relation: &str, rules: Vec<(ResolverId, Rule)>) -> Box<dyn Resolver> {
        let context = Arc::new(ResolutionContext::new(
            Arc::new(MemoryGraph::new()),
            Handle::current(),
            Watermarks::new(1, 2).unwrap(),
            16,
        ));
        Box::new(ConcludableResolver::new(ResolverId::new(id), atom(relation), rules, context))
    }

    struct Network {
        registry: Arc<ResolverRegistry>,
        outcomes: mpsc::UnboundedReceiver<RootOutcome>,
        cancellation_token: CancellationToken,
        actors: Vec<JoinHandle<()>>,
    }

    fn spawn(resolvers: Vec<Box<dyn Resolver>>) -> Network {
        let mut registry = ResolverRegistry::new();
        let mailboxes: Vec<_> = resolvers.iter().map(|r| registry.register(r.id())).collect();
        let registry = Arc::new(registry);
        let (sender, outcomes) = mpsc::unbounded_channel();
        let cancellation_token = CancellationToken::new();

        let actors = resolvers
            .into_iter()
            .zip(mailboxes)
            .map(|(resolver, mailbox)| {
                let actor = ResolverActor::new(
                    resolver,
                    mailbox,
                    Arc::clone(&registry),
                    sender.clone(),
                    cancellation_token.clone(),
                );
                tokio::spawn(actor.run())
            })
            .collect();

        Network {
            registry,
            outcomes,
            cancellation_token,
            actors,
        }
    }

    /// Waits for every actor to stop, then checks exactly one failure was reported.
    async fn single_failure(mut network: Network) -> ProducerError {
        for actor in network.actors {
            actor.await.unwrap();
        }
        assert!(network.cancellation_token.is_cancelled());

        let failure = match network.outcomes.recv().await {
            Some(RootOutcome::Failed(error)) => error,
            other => panic!("expected a failure, got {:?}", other),
        };
        // Every sender lived in a stopped actor.
        assert!(network.outcomes.recv().await.is_none());
        failure
    }

    #[tokio::test]
    async fn test_response_for_unrouted_request_fails_the_query() {
        let network = spawn(vec![concludable(0, "p", vec![]), concludable(1, "q", vec![])]);

        let stray = Request::new(
            ResolutionPath::root(ResolverId::new(0)).append(ResolverId::new(1)),
            ConceptMap::new(),
            Unifier::identity(),
            Derivation::empty(),
        );
        network
            .registry
            .send(
                ResolverId::new(0),
                ResolverMessage::Response(Response::Exhausted { source_request: stray }),
            )
            .unwrap();

        match single_failure(network).await {
            ProducerError::Resolution { resolver, message } => {
                assert_eq!(resolver, "p($x)");
                assert!(message.contains("unknown request"), "{}", message);
            }
            other => panic!("expected a resolution failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_request_to_unregistered_resolver_fails_the_query() {
        let rule = Rule::new("q-from-r", Conjunction::new(vec![atom("r")]), atom("q")).unwrap();
        // The rule's condition resolver (#7) was never registered.
        let network = spawn(vec![
            concludable(0, "p", vec![]),
            concludable(1, "q", vec![(ResolverId::new(7), rule)]),
        ]);

        let request = Request::new(
            ResolutionPath::root(ResolverId::new(0)).append(ResolverId::new(1)),
            ConceptMap::new(),
            Unifier::identity(),
            Derivation::empty(),
        );
        network
            .registry
            .send(ResolverId::new(1), ResolverMessage::Request(request))
            .unwrap();

        assert_eq!(
            single_failure(network).await,
            ProducerError::Resolution {
                resolver: "q($x)".to_string(),
                message: ResolutionError::UnknownResolver(7).to_string(),
            }
        );
    }

    #[test]
    fn test_registry_rejects_unknown_resolver() {
        let registry = ResolverRegistry::new();
        let error = registry
            .send(ResolverId::new(3), ResolverMessage::Request(Request::root(ResolverId::new(3))))
            .unwrap_err();
        assert_eq!(error, ResolutionError::UnknownResolver(3));
    }
}
