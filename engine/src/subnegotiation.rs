//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Extension points invoked for completed subnegotiation blocks.

use crate::{Context, TelnetOption, TelnetResult};
use bytes::BytesMut;

///
/// Handler for the payload of one option's subnegotiation blocks.
///
/// Registered with [`TelnetEngine::register_handler`](crate::TelnetEngine::register_handler) and
/// invoked after the [`TelnetEvent::Subnegotiate`](crate::TelnetEvent::Subnegotiate) event for
/// the block has been delivered. The handler may reply through `ctx` or emit further events such
/// as [`TelnetEvent::Ttype`](crate::TelnetEvent::Ttype).
///
pub trait SubnegotiationHandler<U>: Send {
    /// Handle a completed `IAC SB <option> <payload> IAC SE` block.
    fn subnegotiate(
        &mut self,
        ctx: &mut Context<'_, U>,
        option: TelnetOption,
        payload: &[u8],
    ) -> HandlerOutcome;
}

/// What the engine does with the rest of the input once a handler returns.
pub enum HandlerOutcome {
    /// Keep decoding as before
    Continue,
    /// Every byte after the `IAC SE` that ended the block must pass through this transform
    /// before it is decoded
    Decompress(Box<dyn InputTransform>),
}

impl std::fmt::Debug for HandlerOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerOutcome::Continue => write!(f, "Continue"),
            HandlerOutcome::Decompress(_) => write!(f, "Decompress(..)"),
        }
    }
}

/// Outcome of one [`InputTransform::transform`] call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransformStatus {
    /// All input was consumed and the transform expects more
    Active,
    /// The transformed stream ended after `consumed` input bytes. Anything after that is plain
    /// Telnet again.
    Finished {
        /// Input bytes belonging to the transformed stream
        consumed: usize,
    },
}

///
/// Stream transform applied to received bytes ahead of the decoder, typically an inflater
/// for MCCP.
///
pub trait InputTransform: Send {
    /// Append the transformed form of `input` to `output`.
    fn transform(&mut self, input: &[u8], output: &mut BytesMut) -> TelnetResult<TransformStatus>;
}
