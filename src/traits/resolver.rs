// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::ResolutionError;
use crate::resolution::answer::Answer;
use crate::resolution::message::{Outgoing, Request, ResolverId};
use crate::resolution::response_producer::ResponseProducer;

/// Behaviour of one resolver variant.
///
/// A resolver is driven by its actor, one message at a time. Every hook returns
/// the single message the actor must send next: either a request to a downstream
/// resolver or a response to the upstream one.
#[async_trait]
pub trait Resolver: Send {
    fn id(&self) -> ResolverId;

    fn name(&self) -> &str;

    /// Builds the per-request state the first time `from_upstream` is seen.
    fn response_producer(&self, from_upstream: &Request) -> Result<ResponseProducer, ResolutionError>;

    async fn receive_request(
        &mut self,
        from_upstream: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Outgoing, ResolutionError>;

    /// `source_request` is the downstream request that `answer` responds to.
    async fn receive_answer(
        &mut self,
        from_upstream: &Request,
        answer: Answer,
        source_request: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Outgoing, ResolutionError>;

    async fn receive_exhausted(
        &mut self,
        from_upstream: &Request,
        source_request: &Request,
        response_producer: &mut ResponseProducer,
    ) -> Result<Outgoing, ResolutionError>;
}
