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

use crate::decoder::{DecoderSink, StreamDecoder};
use crate::dispatch::EventDispatcher;
use crate::{
    Context, DecoderState, EngineConfig, HandlerOutcome, InputTransform, NegotiationState,
    NegotiationVerb, OptionNegotiator, OptionRequirement, OptionTable, QState,
    SubnegotiationHandler, TelnetError, TelnetEvent, TelnetOption, TransformStatus,
};
use bytes::BytesMut;
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

///
/// Telnet protocol engine for a single connection.
///
/// The engine performs no I/O. Received bytes go in through [`TelnetEngine::feed`]; everything
/// the engine has to say comes out synchronously through the subscriber registered with
/// [`TelnetEngine::subscribe`], including the bytes to put on the wire as
/// [`TelnetEvent::Send`]. `U` is an opaque per-connection value handed to the subscriber with
/// every event.
///
/// # Example
///
/// ```
/// use telq_engine::{EngineConfig, OptionRequirement, TelnetEngine, TelnetEvent, TelnetOption};
///
/// let mut engine = TelnetEngine::new(
///     [OptionRequirement::local(TelnetOption::Echo)],
///     EngineConfig::default(),
///     Vec::<u8>::new(),
/// );
/// engine.subscribe(|ctx, event| {
///     if let TelnetEvent::Send(bytes) = event {
///         ctx.user_data_mut().extend_from_slice(&bytes);
///     }
/// });
///
/// // The peer asks us to echo, we agree.
/// engine.feed(&[255, 253, 1]);
/// assert_eq!(engine.user_data(), &vec![255, 251, 1]);
/// assert!(engine.is_enabled_local(TelnetOption::Echo));
/// ```
///
pub struct TelnetEngine<U = ()> {
    config: EngineConfig,
    negotiator: OptionNegotiator,
    decoder: StreamDecoder,
    dispatcher: EventDispatcher<U>,
    handlers: HashMap<u8, Box<dyn SubnegotiationHandler<U>>>,
    inflater: Option<Box<dyn InputTransform>>,
    inflated: BytesMut,
}

impl<U> TelnetEngine<U> {
    /// Create an engine agreeing to the peer's requests listed in `requirements`.
    pub fn new<I>(requirements: I, config: EngineConfig, user_data: U) -> Self
    where
        I: IntoIterator<Item = OptionRequirement>,
    {
        let decoder = StreamDecoder::new(
            config.nvt_eol,
            config.newline_on_crlf,
            config.max_subnegotiation_size,
        );
        Self {
            negotiator: OptionNegotiator::new(OptionTable::new(requirements)),
            decoder,
            dispatcher: EventDispatcher::new(user_data),
            handlers: HashMap::new(),
            inflater: None,
            inflated: BytesMut::new(),
            config,
        }
    }

    /// Register the subscriber, replacing any previous one.
    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: FnMut(&mut Context<'_, U>, TelnetEvent<'_>) + Send + 'static,
    {
        self.dispatcher.subscribe(Box::new(subscriber));
    }

    /// Whether a subscriber is registered.
    pub fn is_subscribed(&self) -> bool {
        self.dispatcher.is_subscribed()
    }

    /// Register the handler for `option`'s subnegotiation blocks, returning the one it replaces.
    pub fn register_handler<H>(
        &mut self,
        option: TelnetOption,
        handler: H,
    ) -> Option<Box<dyn SubnegotiationHandler<U>>>
    where
        H: SubnegotiationHandler<U> + 'static,
    {
        self.handlers.insert(option.to_u8(), Box::new(handler))
    }

    /// Remove the handler for `option`.
    pub fn remove_handler(&mut self, option: TelnetOption) -> Option<Box<dyn SubnegotiationHandler<U>>> {
        self.handlers.remove(&option.to_u8())
    }

    ///
    /// Process bytes received from the peer.
    ///
    /// Every event caused by `input` has been delivered when this returns. Bytes following a
    /// subnegotiation whose handler started decompression are passed through the installed
    /// [`InputTransform`] before being decoded.
    ///
    pub fn feed(&mut self, input: &[u8]) {
        trace!("Received {} bytes", input.len());
        let mut rest = input;
        while !rest.is_empty() {
            let Some(mut inflater) = self.inflater.take() else {
                match self.decode(rest, false) {
                    Some(consumed) => {
                        rest = &rest[consumed..];
                        continue;
                    }
                    None => break,
                }
            };

            let mut inflated = std::mem::take(&mut self.inflated);
            inflated.clear();
            match inflater.transform(rest, &mut inflated) {
                Ok(TransformStatus::Active) => {
                    self.decode(&inflated, true);
                    self.inflater = Some(inflater);
                    rest = &[];
                }
                Ok(TransformStatus::Finished { consumed }) => {
                    self.decode(&inflated, true);
                    debug!("Stream decompression ended after {consumed} bytes");
                    self.context().emit(TelnetEvent::Compress(false));
                    rest = rest.get(consumed..).unwrap_or_default();
                }
                Err(err) => {
                    warn!("Stream decompression failed: {err}");
                    self.context().emit(TelnetEvent::Error(err));
                    rest = &[];
                }
            }
            self.inflated = inflated;
        }
    }

    fn decode(&mut self, input: &[u8], decompressing: bool) -> Option<usize> {
        let mut sink = EngineSink {
            ctx: self.dispatcher.context(&mut self.negotiator, &self.config),
            handlers: &mut self.handlers,
            decompressing,
            activated: None,
        };
        let consumed = self.decoder.decode(input, &mut sink);
        if let Some(transform) = sink.activated.take() {
            self.inflater = Some(transform);
        }
        consumed
    }

    fn context(&mut self) -> Context<'_, U> {
        self.dispatcher.context(&mut self.negotiator, &self.config)
    }

    /// Send bytes, escaping `IAC`.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.context().send_raw(bytes);
    }

    /// Send text with NVT line ending translation unless transmit-binary is enabled.
    pub fn send_text(&mut self, text: &[u8]) {
        self.context().send_text(text);
    }

    /// Send `IAC <command>`.
    pub fn send_command(&mut self, command: u8) {
        self.context().send_command(command);
    }

    /// Ask to enable (`WILL`/`DO`) or disable (`WONT`/`DONT`) an option.
    pub fn request_negotiation(&mut self, verb: NegotiationVerb, option: TelnetOption) {
        self.context().request_negotiation(verb, option);
    }

    /// Send `IAC SB <option>`.
    pub fn begin_subnegotiation(&mut self, option: TelnetOption) {
        self.context().begin_subnegotiation(option);
    }

    /// Send `IAC SE`.
    pub fn finish_subnegotiation(&mut self) {
        self.context().finish_subnegotiation();
    }

    /// Send `IAC SB <option> <payload> IAC SE` with the payload escaped.
    pub fn send_subnegotiation(&mut self, option: TelnetOption, payload: &[u8]) {
        self.context().send_subnegotiation(option, payload);
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current decoder position in the byte grammar.
    pub fn decoder_state(&self) -> DecoderState {
        self.decoder.state()
    }

    /// Whether received bytes currently pass through an input transform.
    pub fn is_decompressing(&self) -> bool {
        self.inflater.is_some()
    }

    /// Negotiation state of `option`.
    pub fn negotiation_state(&self, option: TelnetOption) -> NegotiationState {
        self.negotiator.state(option)
    }

    /// Our half of `option`.
    pub fn local_state(&self, option: TelnetOption) -> QState {
        self.negotiator.state(option).local
    }

    /// The peer's half of `option`.
    pub fn remote_state(&self, option: TelnetOption) -> QState {
        self.negotiator.state(option).remote
    }

    /// Whether we perform `option`.
    pub fn is_enabled_local(&self, option: TelnetOption) -> bool {
        self.negotiator.is_enabled_local(option)
    }

    /// Whether the peer performs `option`.
    pub fn is_enabled_remote(&self, option: TelnetOption) -> bool {
        self.negotiator.is_enabled_remote(option)
    }

    /// Whether we transmit in binary mode.
    pub fn transmit_binary(&self) -> bool {
        self.negotiator.binary().transmit
    }

    /// Whether the peer transmits in binary mode.
    pub fn receive_binary(&self) -> bool {
        self.negotiator.binary().receive
    }

    /// Per-connection value.
    pub fn user_data(&self) -> &U {
        self.dispatcher.user_data()
    }

    /// Mutable per-connection value.
    pub fn user_data_mut(&mut self) -> &mut U {
        self.dispatcher.user_data_mut()
    }

    /// Replace the per-connection value, returning the old one.
    pub fn set_user_data(&mut self, user_data: U) -> U {
        self.dispatcher.replace_user_data(user_data)
    }

    /// Consume the engine, returning the per-connection value.
    pub fn into_user_data(self) -> U {
        self.dispatcher.into_user_data()
    }
}

impl<U> std::fmt::Write for TelnetEngine<U> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.send_text(s.as_bytes());
        Ok(())
    }
}

impl<U: std::fmt::Debug> std::fmt::Debug for TelnetEngine<U> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetEngine")
            .field("config", &self.config)
            .field("decoder_state", &self.decoder.state())
            .field("negotiator", &self.negotiator)
            .field("user_data", self.dispatcher.user_data())
            .field("subscribed", &self.dispatcher.is_subscribed())
            .field("decompressing", &self.inflater.is_some())
            .finish_non_exhaustive()
    }
}

/// Routes decoder output through negotiation, handlers and the subscriber.
struct EngineSink<'a, U> {
    ctx: Context<'a, U>,
    handlers: &'a mut HashMap<u8, Box<dyn SubnegotiationHandler<U>>>,
    decompressing: bool,
    activated: Option<Box<dyn InputTransform>>,
}

fn negotiation_event(verb: NegotiationVerb, option: TelnetOption) -> TelnetEvent<'static> {
    match verb {
        NegotiationVerb::Will => TelnetEvent::Will(option),
        NegotiationVerb::Wont => TelnetEvent::Wont(option),
        NegotiationVerb::Do => TelnetEvent::Do(option),
        NegotiationVerb::Dont => TelnetEvent::Dont(option),
    }
}

impl<U> DecoderSink for EngineSink<'_, U> {
    fn receive_binary(&self) -> bool {
        self.ctx.receive_binary()
    }

    fn data(&mut self, bytes: &[u8]) {
        self.ctx.emit(TelnetEvent::Data(Cow::Borrowed(bytes)));
    }

    fn command(&mut self, command: u8) {
        self.ctx.emit(TelnetEvent::Iac(command));
    }

    fn negotiate(&mut self, verb: NegotiationVerb, option: TelnetOption) {
        if self.ctx.config().proxy {
            self.ctx.emit(negotiation_event(verb, option));
            return;
        }
        let outcome = self.ctx.negotiator_mut().receive(verb, option);
        if let Some(reply) = outcome.reply {
            self.ctx.send_negotiation(reply, option);
        }
        if let Some(event) = outcome.event {
            self.ctx.emit(negotiation_event(event, option));
        }
        if let Some(anomaly) = outcome.anomaly {
            warn!("{anomaly}");
            self.warning(anomaly);
        }
    }

    fn subnegotiate(&mut self, option: TelnetOption, payload: &[u8]) -> bool {
        self.ctx
            .emit(TelnetEvent::Subnegotiate(option, Cow::Borrowed(payload)));
        let Some(handler) = self.handlers.get_mut(&option.to_u8()) else {
            return false;
        };
        debug!("Dispatching {} byte {option} subnegotiation", payload.len());
        match handler.subnegotiate(&mut self.ctx, option, payload) {
            HandlerOutcome::Continue => false,
            HandlerOutcome::Decompress(_) if self.decompressing || self.activated.is_some() => {
                warn!("{option} requested decompression while already decompressing");
                self.warning(TelnetError::DecompressionActive { option });
                false
            }
            HandlerOutcome::Decompress(transform) => {
                debug!("{option} started stream decompression");
                self.activated = Some(transform);
                self.ctx.emit(TelnetEvent::Compress(true));
                true
            }
        }
    }

    fn warning(&mut self, warning: TelnetError) {
        if self.ctx.config().diagnostics {
            self.ctx.emit(TelnetEvent::Warning(warning));
        }
    }
}
