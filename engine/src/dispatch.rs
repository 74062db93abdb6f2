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

//! Synchronous single-subscriber event delivery and the send-side encoders.

use crate::{
    EngineConfig, NegotiationState, NegotiationVerb, OptionNegotiator, QState, TelnetEvent,
    TelnetOption, consts,
};
use bytes::{BufMut, BytesMut};
use std::borrow::Cow;
use std::collections::VecDeque;
use tracing::trace;

/// Event subscriber of a [`TelnetEngine`](crate::TelnetEngine).
///
/// The [`Context`] gives access to the connection's user data and lets the subscriber reply
/// without holding a reference to the engine.
pub type Subscriber<U> = Box<dyn FnMut(&mut Context<'_, U>, TelnetEvent<'_>) + Send>;

/// Owner of the subscriber, the user data and events queued from inside a callback.
pub(crate) struct EventDispatcher<U> {
    subscriber: Option<Subscriber<U>>,
    user_data: U,
    pending: VecDeque<TelnetEvent<'static>>,
    scratch: BytesMut,
}

impl<U> EventDispatcher<U> {
    pub(crate) fn new(user_data: U) -> Self {
        Self {
            subscriber: None,
            user_data,
            pending: VecDeque::new(),
            scratch: BytesMut::new(),
        }
    }

    pub(crate) fn subscribe(&mut self, subscriber: Subscriber<U>) {
        self.subscriber = Some(subscriber);
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        self.subscriber.is_some()
    }

    pub(crate) fn user_data(&self) -> &U {
        &self.user_data
    }

    pub(crate) fn user_data_mut(&mut self) -> &mut U {
        &mut self.user_data
    }

    pub(crate) fn replace_user_data(&mut self, user_data: U) -> U {
        std::mem::replace(&mut self.user_data, user_data)
    }

    pub(crate) fn into_user_data(self) -> U {
        self.user_data
    }

    pub(crate) fn context<'a>(
        &'a mut self,
        negotiator: &'a mut OptionNegotiator,
        config: &'a EngineConfig,
    ) -> Context<'a, U> {
        let route = match self.subscriber.as_mut() {
            Some(subscriber) => Route::Subscriber(subscriber),
            None => Route::Detached,
        };
        Context {
            user_data: &mut self.user_data,
            negotiator,
            config,
            pending: &mut self.pending,
            scratch: &mut self.scratch,
            route,
        }
    }
}

enum Route<'a, U> {
    /// Top level: deliver to the subscriber
    Subscriber(&'a mut Subscriber<U>),
    /// Inside a callback: queue until it returns
    Nested,
    /// Nobody is listening
    Detached,
}

///
/// Handle through which subscribers and subnegotiation handlers talk back to the engine.
///
/// Every send method produces exactly one [`TelnetEvent::Send`] carrying the complete wire
/// encoding. Events raised from inside the subscriber are delivered right after it returns,
/// ahead of anything the engine emits afterwards.
///
pub struct Context<'a, U> {
    user_data: &'a mut U,
    negotiator: &'a mut OptionNegotiator,
    config: &'a EngineConfig,
    pending: &'a mut VecDeque<TelnetEvent<'static>>,
    scratch: &'a mut BytesMut,
    route: Route<'a, U>,
}

impl<U> Context<'_, U> {
    /// Opaque per-connection value supplied at construction.
    pub fn user_data(&self) -> &U {
        self.user_data
    }

    /// Mutable access to the per-connection value.
    pub fn user_data_mut(&mut self) -> &mut U {
        self.user_data
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    /// Deliver an event to the subscriber.
    pub fn emit(&mut self, event: TelnetEvent<'_>) {
        match self.route {
            Route::Nested => self.pending.push_back(event.into_owned()),
            Route::Detached => trace!("No subscriber, dropping {:?} event", event.kind()),
            Route::Subscriber(_) => {
                self.deliver(event);
                while let Some(queued) = self.pending.pop_front() {
                    self.deliver(queued);
                }
            }
        }
    }

    fn deliver(&mut self, event: TelnetEvent<'_>) {
        if let Route::Subscriber(subscriber) = &mut self.route {
            let mut nested = Context {
                user_data: &mut *self.user_data,
                negotiator: &mut *self.negotiator,
                config: self.config,
                pending: &mut *self.pending,
                scratch: &mut *self.scratch,
                route: Route::Nested,
            };
            (**subscriber)(&mut nested, event);
        }
    }

    fn transmit(&mut self, encode: impl FnOnce(&mut BytesMut)) {
        let mut wire = std::mem::take(&mut *self.scratch);
        wire.clear();
        encode(&mut wire);
        self.emit(TelnetEvent::Send(Cow::Borrowed(&wire)));
        *self.scratch = wire;
    }

    /// Send bytes, escaping `IAC` as `IAC IAC`.
    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.transmit(|wire| escape_into(wire, bytes));
    }

    /// Send text. Outside transmit-binary mode `CR` becomes `CR NUL` and `LF` becomes
    /// `CR LF`. `IAC` is always escaped.
    pub fn send_text(&mut self, text: &[u8]) {
        if self.transmit_binary() {
            self.send_raw(text);
        } else {
            self.transmit(|wire| translate_into(wire, text));
        }
    }

    /// Send `IAC <command>`.
    pub fn send_command(&mut self, command: u8) {
        self.transmit(|wire| wire.put_slice(&[consts::IAC, command]));
    }

    /// Ask to enable or disable an option.
    ///
    /// In proxy mode the command goes out as is. Otherwise the RFC1143 state decides whether
    /// anything is transmitted at all.
    pub fn request_negotiation(&mut self, verb: NegotiationVerb, option: TelnetOption) {
        if self.config.proxy {
            self.send_negotiation(verb, option);
        } else if let Some(verb) = self.negotiator.request(verb, option) {
            self.send_negotiation(verb, option);
        }
    }

    pub(crate) fn send_negotiation(&mut self, verb: NegotiationVerb, option: TelnetOption) {
        self.transmit(|wire| wire.put_slice(&[consts::IAC, verb.to_u8(), option.to_u8()]));
    }

    /// Send `IAC SB <option>`. The payload can follow through [`Context::send_raw`].
    pub fn begin_subnegotiation(&mut self, option: TelnetOption) {
        self.transmit(|wire| wire.put_slice(&[consts::IAC, consts::SB, option.to_u8()]));
    }

    /// Send `IAC SE`.
    pub fn finish_subnegotiation(&mut self) {
        self.send_command(consts::SE);
    }

    /// Send a complete subnegotiation block with an escaped payload.
    pub fn send_subnegotiation(&mut self, option: TelnetOption, payload: &[u8]) {
        self.transmit(|wire| {
            wire.put_slice(&[consts::IAC, consts::SB, option.to_u8()]);
            escape_into(wire, payload);
            wire.put_slice(&[consts::IAC, consts::SE]);
        });
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

    pub(crate) fn negotiator_mut(&mut self) -> &mut OptionNegotiator {
        self.negotiator
    }
}

impl<U> std::fmt::Write for Context<'_, U> {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.send_text(s.as_bytes());
        Ok(())
    }
}

/// Append `bytes` with every `IAC` doubled.
pub(crate) fn escape_into(wire: &mut BytesMut, bytes: &[u8]) {
    wire.reserve(bytes.len());
    for chunk in bytes.split_inclusive(|&byte| byte == consts::IAC) {
        wire.put_slice(chunk);
        if chunk.last() == Some(&consts::IAC) {
            wire.put_u8(consts::IAC);
        }
    }
}

/// Append `text` with NVT line endings and `IAC` escaping.
pub(crate) fn translate_into(wire: &mut BytesMut, text: &[u8]) {
    wire.reserve(text.len());
    for &byte in text {
        match byte {
            consts::IAC => wire.put_slice(&[consts::IAC, consts::IAC]),
            consts::CR => wire.put_slice(&[consts::CR, consts::NUL]),
            consts::LF => wire.put_slice(&[consts::CR, consts::LF]),
            byte => wire.put_u8(byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OptionTable, TelnetEventKind};
    use std::fmt::Write;

    fn escaped(bytes: &[u8]) -> Vec<u8> {
        let mut wire = BytesMut::new();
        escape_into(&mut wire, bytes);
        wire.to_vec()
    }

    fn translated(bytes: &[u8]) -> Vec<u8> {
        let mut wire = BytesMut::new();
        translate_into(&mut wire, bytes);
        wire.to_vec()
    }

    fn recording() -> EventDispatcher<Vec<TelnetEvent<'static>>> {
        let mut dispatcher = EventDispatcher::new(Vec::new());
        dispatcher.subscribe(Box::new(|ctx, event| {
            ctx.user_data_mut().push(event.into_owned());
        }));
        dispatcher
    }

    #[test]
    fn test_escape() {
        assert_eq!(escaped(b"plain"), b"plain");
        assert_eq!(escaped(&[0xFF]), vec![0xFF, 0xFF]);
        assert_eq!(escaped(&[1, 0xFF, 2, 0xFF]), vec![1, 0xFF, 0xFF, 2, 0xFF, 0xFF]);
        assert_eq!(escaped(b"a\r\n"), b"a\r\n");
        assert!(escaped(b"").is_empty());
    }

    #[test]
    fn test_translate() {
        assert_eq!(translated(b"a\r\nb"), b"a\r\0\r\nb");
        assert_eq!(translated(&[0xFF, b'\n']), vec![0xFF, 0xFF, b'\r', b'\n']);
    }

    #[test]
    fn test_detached_context_drops_events() {
        let mut dispatcher: EventDispatcher<()> = EventDispatcher::new(());
        let mut negotiator = OptionNegotiator::default();
        let config = EngineConfig::default();
        let mut ctx = dispatcher.context(&mut negotiator, &config);
        ctx.send_raw(b"lost");
        assert!(dispatcher.pending.is_empty());
        assert!(!dispatcher.is_subscribed());
    }

    #[test]
    fn test_send_produces_one_event_per_call() {
        let mut dispatcher = recording();
        let mut negotiator = OptionNegotiator::default();
        let config = EngineConfig::default();
        let mut ctx = dispatcher.context(&mut negotiator, &config);
        ctx.send_subnegotiation(TelnetOption::GMCP, &[b'x', 0xFF]);
        ctx.send_command(consts::GA);
        assert_eq!(
            dispatcher.user_data(),
            &vec![
                TelnetEvent::Send(Cow::Owned(vec![0xFF, 0xFA, 201, b'x', 0xFF, 0xFF, 0xFF, 0xF0])),
                TelnetEvent::Send(Cow::Owned(vec![0xFF, 0xF9])),
            ]
        );
    }

    #[test]
    fn test_events_raised_in_callback_follow_it() {
        let mut dispatcher = EventDispatcher::new(Vec::<TelnetEventKind>::new());
        dispatcher.subscribe(Box::new(|ctx, event| {
            ctx.user_data_mut().push(event.kind());
            if event.kind() == TelnetEventKind::Iac {
                ctx.send_raw(b"reply");
                ctx.emit(TelnetEvent::Compress(false));
            }
        }));
        let mut negotiator = OptionNegotiator::default();
        let config = EngineConfig::default();
        let mut ctx = dispatcher.context(&mut negotiator, &config);
        ctx.emit(TelnetEvent::Iac(consts::NOP));
        ctx.emit(TelnetEvent::Data(Cow::Borrowed(b"after")));
        assert_eq!(
            dispatcher.user_data(),
            &vec![
                TelnetEventKind::Iac,
                TelnetEventKind::Send,
                TelnetEventKind::Compress,
                TelnetEventKind::Data,
            ]
        );
    }

    #[test]
    fn test_request_negotiation_in_proxy_mode_always_sends() {
        let mut dispatcher = recording();
        let mut negotiator = OptionNegotiator::new(OptionTable::default());
        let config = EngineConfig::proxy();
        let mut ctx = dispatcher.context(&mut negotiator, &config);
        ctx.request_negotiation(NegotiationVerb::Will, TelnetOption::Echo);
        ctx.request_negotiation(NegotiationVerb::Will, TelnetOption::Echo);
        assert_eq!(dispatcher.user_data().len(), 2);
        assert_eq!(negotiator.tracked(), 0);
    }

    #[test]
    fn test_write_translates_text() {
        let mut dispatcher = recording();
        let mut negotiator = OptionNegotiator::default();
        let config = EngineConfig::default();
        let mut ctx = dispatcher.context(&mut negotiator, &config);
        writeln!(ctx, "{} online", 3).unwrap();
        let sent: Vec<u8> = dispatcher
            .user_data()
            .iter()
            .filter_map(|event| event.payload())
            .flatten()
            .copied()
            .collect();
        assert_eq!(sent, b"3 online\r\n");
    }
}
