// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Entry point of resolution: builds the resolver network of a query and
//! exposes its answers as a buffered stream.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::Config;
use crate::errors::{ConfigError, ProducerError, ResolutionError};
use crate::observability::messages::resolution::ResolversSpawned;
use crate::observability::messages::StructuredLog;
use crate::producer::{BufferedAggregator, Watermarks};
use crate::resolution::actor::{ResolverActor, ResolverRegistry};
use crate::resolution::answer::Answer;
use crate::resolution::context::ResolutionContext;
use crate::resolution::message::{Request, ResolverId, ResolverMessage};
use crate::resolution::pattern::{Atom, Conjunction, Rule};
use crate::resolution::resolver::{
    ConcludableResolver, ConjunctionPlan, ConjunctionResolver, RootOutcome, RootResolver,
};
use crate::traits::{ExplanationRecorder, Producer, Resolver, Sink, Traversal};

pub struct Reasoner {
    traversal: Arc<dyn Traversal>,
    rules: Vec<Rule>,
    worker_pool: Handle,
    traversal_buffer: Watermarks,
    answer_buffer: Watermarks,
    max_path_length: usize,
    record_explanations: bool,
    recorder: Option<Arc<dyn ExplanationRecorder>>,
}

impl Reasoner {
    pub fn new(
        traversal: Arc<dyn Traversal>,
        rules: Vec<Rule>,
        config: &Config,
        worker_pool: Handle,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            traversal,
            rules,
            worker_pool,
            traversal_buffer: config.traversal_buffer.watermarks("traversal_buffer")?,
            answer_buffer: config.answer_buffer.watermarks("answer_buffer")?,
            max_path_length: config.resolution.max_path_length(),
            record_explanations: config.resolution.record_explanations(),
            recorder: None,
        })
    }

    /// Inferred answers are handed to `recorder` before they are delivered,
    /// unless explanations are switched off in the configuration.
    pub fn with_recorder(mut self, recorder: Arc<dyn ExplanationRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Spawns the resolvers of `conjunction` on the worker pool and returns its
    /// answers. Dropping or recycling the stream stops every resolver.
    pub fn query(&self, conjunction: Conjunction) -> Result<BufferedAggregator<Answer>, ResolutionError> {
        let label = conjunction.to_string();
        let context = Arc::new(ResolutionContext::new(
            Arc::clone(&self.traversal),
            self.worker_pool.clone(),
            self.traversal_buffer,
            self.max_path_length,
        ));
        let (outcomes, outcome_receiver) = mpsc::unbounded_channel();

        let mut network = Network::new(&self.rules, Arc::clone(&context));
        let root = network.reserve();
        let planned = network.concludables(conjunction.atoms());
        network.push(Box::new(RootResolver::new(
            root,
            format!("root[{}]", label),
            ConjunctionPlan::new(conjunction, planned, context),
            outcomes.clone(),
            self.recorder.clone().filter(|_| self.record_explanations),
        )));

        let mut registry = ResolverRegistry::new();
        let resolvers: Vec<_> = network
            .resolvers
            .into_iter()
            .map(|resolver| {
                let mailbox = registry.register(resolver.id());
                (resolver, mailbox)
            })
            .collect();
        let registry = Arc::new(registry);
        let cancellation_token = CancellationToken::new();

        let spawned = ResolversSpawned {
            query: &label,
            resolver_count: resolvers.len(),
        };
        spawned.log();
        let span = spawned.span("query");
        for (resolver, mailbox) in resolvers {
            let actor = ResolverActor::new(
                resolver,
                mailbox,
                Arc::clone(&registry),
                outcomes.clone(),
                cancellation_token.clone(),
            );
            self.worker_pool.spawn(actor.run().instrument(span.clone()));
        }

        let producer: Arc<dyn Producer<Answer>> = Arc::new(ResolutionProducer {
            name: label,
            root: Request::root(root),
            registry,
            outcomes: Arc::new(Mutex::new(outcome_receiver)),
            cancellation_token,
            worker_pool: self.worker_pool.clone(),
        });
        Ok(BufferedAggregator::new(vec![producer], self.answer_buffer))
    }
}

/// Resolvers of one query, in id order.
struct Network<'a> {
    rules: &'a [Rule],
    context: Arc<ResolutionContext>,
    next_id: usize,
    resolvers: Vec<Box<dyn Resolver>>,
    /// rule index -> resolver of its condition, shared by every concludable
    rule_resolvers: HashMap<usize, ResolverId>,
}

impl<'a> Network<'a> {
    fn new(rules: &'a [Rule], context: Arc<ResolutionContext>) -> Self {
        Self {
            rules,
            context,
            next_id: 0,
            resolvers: Vec::new(),
            rule_resolvers: HashMap::new(),
        }
    }

    fn reserve(&mut self) -> ResolverId {
        let id = ResolverId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn push(&mut self, resolver: Box<dyn Resolver>) {
        self.resolvers.push(resolver);
    }

    fn concludables(&mut self, atoms: &[Atom]) -> Vec<ResolverId> {
        atoms.iter().map(|atom| self.concludable(atom)).collect()
    }

    fn concludable(&mut self, atom: &Atom) -> ResolverId {
        let id = self.reserve();
        let rules = self.rules;
        let applicable: Vec<(ResolverId, Rule)> = rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.concludes(atom))
            .map(|(index, rule)| (self.rule_resolver(index), rule.clone()))
            .collect();
        let context = Arc::clone(&self.context);
        self.push(Box::new(ConcludableResolver::new(id, atom.clone(), applicable, context)));
        id
    }

    /// Memoized, so recursive rules close a cycle instead of recursing forever.
    fn rule_resolver(&mut self, index: usize) -> ResolverId {
        if let Some(id) = self.rule_resolvers.get(&index) {
            return *id;
        }
        let id = self.reserve();
        self.rule_resolvers.insert(index, id);

        let rules = self.rules;
        let rule = &rules[index];
        let planned = self.concludables(rule.when().atoms());
        let plan = ConjunctionPlan::new(rule.when().clone(), planned, Arc::clone(&self.context));
        self.push(Box::new(ConjunctionResolver::new(id, format!("rule[{}]", rule.label()), plan)));
        id
    }
}

/// Pulls answers from the root resolver, one root request per item asked for.
struct ResolutionProducer {
    name: String,
    root: Request,
    registry: Arc<ResolverRegistry>,
    outcomes: Arc<Mutex<mpsc::UnboundedReceiver<RootOutcome>>>,
    cancellation_token: CancellationToken,
    worker_pool: Handle,
}

impl Producer<Answer> for ResolutionProducer {
    fn produce(&self, sink: Arc<dyn Sink<Answer>>, count: usize) {
        let name = self.name.clone();
        let root = self.root.clone();
        let registry = Arc::clone(&self.registry);
        let outcomes = Arc::clone(&self.outcomes);
        let cancellation_token = self.cancellation_token.clone();

        self.worker_pool.spawn(async move {
            let mut outcomes = outcomes.lock().await;
            for _ in 0..count {
                // Outside of a pull only a resolver failure can be waiting.
                let outcome = match outcomes.try_recv() {
                    Ok(outcome) => Some(outcome),
                    Err(_) if cancellation_token.is_cancelled() => return,
                    Err(_) => {
                        let receiver = root.path().receiver();
                        match registry.send(receiver, ResolverMessage::Request(root.clone())) {
                            Ok(()) => tokio::select! {
                                biased;
                                outcome = outcomes.recv() => outcome,
                                _ = cancellation_token.cancelled() => return,
                            },
                            Err(error) => match outcomes.try_recv() {
                                Ok(outcome) => Some(outcome),
                                Err(_) => {
                                    sink.done(Err(error.into_producer_error(&name)));
                                    return;
                                }
                            },
                        }
                    }
                };

                match outcome {
                    Some(RootOutcome::Answer(answer)) => sink.put(answer),
                    Some(RootOutcome::Exhausted) => {
                        sink.done(Ok(()));
                        return;
                    }
                    Some(RootOutcome::Failed(error)) => {
                        sink.done(Err(error));
                        return;
                    }
                    None => {
                        sink.done(Err(ProducerError::interrupted("resolvers stopped before the query completed")));
                        return;
                    }
                }
            }
        });
    }

    fn recycle(&self) {
        self.cancellation_token.cancel();
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ResolutionProducer {
    fn drop(&mut self) {
        self.cancellation_token.cancel();
    }
}
