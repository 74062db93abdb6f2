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

//! # Telq Telnet Protocol Engine
//!
//! This crate implements the Telnet protocol (RFC 854) as a synchronous, I/O free state
//! machine. Feed it the bytes read from a socket and it reports what they mean through a single
//! event subscriber, including the bytes that have to be written back.
//!
//! ## Overview
//!
//! The engine handles:
//!
//! - **Data**: application bytes with `IAC IAC` unescaped, optionally with NVT end-of-line
//!   translation (`CR LF`, `CR NUL`)
//! - **Commands**: `IAC <cmd>` for Go Ahead, Are You There, Break and the rest
//! - **Option negotiation**: RFC 1143 "Q method" bookkeeping of `WILL`/`WONT`/`DO`/`DONT`,
//!   answering the peer according to an [`OptionTable`]
//! - **Subnegotiation**: buffering of `IAC SB <opt> ... IAC SE` blocks, with per-option
//!   [`SubnegotiationHandler`]s that may switch the inbound stream to decompression
//! - **Sending**: `IAC` escaping and NVT line ending translation for outbound data
//!
//! ## Core Components
//!
//! ### [`TelnetEngine`]
//!
//! Per-connection façade owning the decoder, the negotiator and the subscriber.
//!
//! ### [`OptionNegotiator`]
//!
//! The RFC 1143 state machine. Each option has an independent local ("us") and remote
//! ("him") [`QState`].
//!
//! ### [`TelnetEvent`]
//!
//! Everything the engine reports: received data, bytes to send, commands, negotiation results,
//! subnegotiation payloads and diagnostics.
//!
//! ## Usage Example
//!
//! ```rust
//! use telq_engine::{
//!     EngineConfig, NegotiationVerb, OptionRequirement, TelnetEngine, TelnetEvent, TelnetOption,
//! };
//!
//! #[derive(Default)]
//! struct Connection {
//!     outbound: Vec<u8>,
//!     lines: Vec<String>,
//! }
//!
//! let mut engine = TelnetEngine::new(
//!     [
//!         OptionRequirement::local(TelnetOption::SuppressGoAhead),
//!         OptionRequirement::remote(TelnetOption::NAWS),
//!     ],
//!     EngineConfig::default(),
//!     Connection::default(),
//! );
//! engine.subscribe(|ctx, event| match event {
//!     TelnetEvent::Send(bytes) => ctx.user_data_mut().outbound.extend_from_slice(&bytes),
//!     TelnetEvent::Data(bytes) => ctx
//!         .user_data_mut()
//!         .lines
//!         .push(String::from_utf8_lossy(&bytes).into_owned()),
//!     TelnetEvent::Will(TelnetOption::NAWS) => {
//!         // Window size reports will follow as subnegotiations
//!     }
//!     _ => {}
//! });
//!
//! engine.request_negotiation(NegotiationVerb::Will, TelnetOption::SuppressGoAhead);
//! engine.feed(b"\xFF\xFD\x03hello");
//!
//! assert!(engine.is_enabled_local(TelnetOption::SuppressGoAhead));
//! assert_eq!(engine.user_data().outbound, b"\xFF\xFB\x03");
//! assert_eq!(engine.user_data().lines, vec!["hello".to_string()]);
//! ```
//!
//! ## Replying From The Subscriber
//!
//! The subscriber receives a [`Context`] which offers the same send and negotiation methods as
//! the engine. Anything sent from inside the callback is delivered as a [`TelnetEvent::Send`]
//! immediately after the callback returns.
//!
//! ## Error Handling
//!
//! Nothing a peer sends can make the engine fail. Malformed sequences are recovered from and
//! logged through `tracing`. With [`EngineConfig::diagnostics`] they are also reported as
//! [`TelnetEvent::Warning`] carrying a [`TelnetError`].
//!
//! ## Thread Safety
//!
//! `TelnetEngine` is `Send` when its user data is, but has no internal synchronization. Each
//! connection owns its own engine.
//!
//! ## Related RFCs
//!
//! - RFC 854: Telnet Protocol Specification
//! - RFC 855: Telnet Option Specifications
//! - RFC 856: Telnet Binary Transmission
//! - RFC 1143: The Q Method of Implementing Telnet Option Negotiation

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod config;
pub mod consts;
mod decoder;
mod dispatch;
mod engine;
mod event;
mod negotiation;
mod options;
mod result;
mod subnegotiation;

pub use self::config::EngineConfig;
pub use self::decoder::DecoderState;
pub use self::dispatch::{Context, Subscriber};
pub use self::engine::TelnetEngine;
pub use self::event::{TelnetEvent, TelnetEventKind};
pub use self::negotiation::{
    BinaryMode, NegotiationOutcome, NegotiationState, NegotiationVerb, OptionNegotiator, QState,
    TelnetSide,
};
pub use self::options::{OptionRequirement, OptionTable, TelnetOption};
pub use self::result::{TelnetError, TelnetResult};
pub use self::subnegotiation::{
    HandlerOutcome, InputTransform, SubnegotiationHandler, TransformStatus,
};
