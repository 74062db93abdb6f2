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

use crate::{TelnetError, TelnetOption};
use enum_kinds::EnumKind;
use std::borrow::Cow;

///
/// Observation delivered to the subscriber of a [`TelnetEngine`](crate::TelnetEngine).
///
/// Outside proxy mode the negotiation events report settled RFC1143 state changes. In proxy
/// mode no state is kept and they only name the command the peer sent.
///
/// Payloads borrow from the engine's buffers for the duration of the callback. Use
/// [`TelnetEvent::into_owned`] to keep an event around afterwards.
///
#[derive(Clone, Debug, PartialEq, Eq, EnumKind)]
#[enum_kind(TelnetEventKind, derive(Hash))]
pub enum TelnetEvent<'a> {
    /// Application data received from the peer, with IAC escaping removed
    Data(Cow<'a, [u8]>),
    /// Wire bytes the application must transmit to the peer
    Send(Cow<'a, [u8]>),
    /// A Telnet command other than negotiation or subnegotiation (`IAC <cmd>`)
    Iac(u8),
    /// The peer performs an option. In proxy mode: the peer sent `WILL`
    Will(TelnetOption),
    /// The peer stopped performing an option. In proxy mode: the peer sent `WONT`
    Wont(TelnetOption),
    /// We now perform an option. In proxy mode: the peer sent `DO`
    Do(TelnetOption),
    /// We no longer perform an option. In proxy mode: the peer sent `DONT`
    Dont(TelnetOption),
    /// Completed `IAC SB <option> ... IAC SE` block and its unescaped payload
    Subnegotiate(TelnetOption, Cow<'a, [u8]>),
    /// Stream decompression started (`true`) or ended (`false`)
    Compress(bool),
    /// ZMP command, emitted by a ZMP subnegotiation handler
    Zmp(Cow<'a, [u8]>),
    /// Terminal type report, emitted by a TTYPE subnegotiation handler
    Ttype(Cow<'a, [u8]>),
    /// Environment variables, emitted by an ENVIRON subnegotiation handler
    Environ(Cow<'a, [u8]>),
    /// MSSP variables, emitted by an MSSP subnegotiation handler
    Mssp(Cow<'a, [u8]>),
    /// Recovered protocol violation
    Warning(TelnetError),
    /// Failure that abandoned part of the input
    Error(TelnetError),
}

impl TelnetEvent<'_> {
    /// Kind of this event
    pub fn kind(&self) -> TelnetEventKind {
        TelnetEventKind::from(self)
    }

    /// Detach the event from the engine's buffers.
    pub fn into_owned(self) -> TelnetEvent<'static> {
        fn own(bytes: Cow<'_, [u8]>) -> Cow<'static, [u8]> {
            Cow::Owned(bytes.into_owned())
        }
        match self {
            TelnetEvent::Data(bytes) => TelnetEvent::Data(own(bytes)),
            TelnetEvent::Send(bytes) => TelnetEvent::Send(own(bytes)),
            TelnetEvent::Iac(command) => TelnetEvent::Iac(command),
            TelnetEvent::Will(option) => TelnetEvent::Will(option),
            TelnetEvent::Wont(option) => TelnetEvent::Wont(option),
            TelnetEvent::Do(option) => TelnetEvent::Do(option),
            TelnetEvent::Dont(option) => TelnetEvent::Dont(option),
            TelnetEvent::Subnegotiate(option, bytes) => TelnetEvent::Subnegotiate(option, own(bytes)),
            TelnetEvent::Compress(active) => TelnetEvent::Compress(active),
            TelnetEvent::Zmp(bytes) => TelnetEvent::Zmp(own(bytes)),
            TelnetEvent::Ttype(bytes) => TelnetEvent::Ttype(own(bytes)),
            TelnetEvent::Environ(bytes) => TelnetEvent::Environ(own(bytes)),
            TelnetEvent::Mssp(bytes) => TelnetEvent::Mssp(own(bytes)),
            TelnetEvent::Warning(err) => TelnetEvent::Warning(err),
            TelnetEvent::Error(err) => TelnetEvent::Error(err),
        }
    }

    /// Byte payload carried by data-like events
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            TelnetEvent::Data(bytes)
            | TelnetEvent::Send(bytes)
            | TelnetEvent::Subnegotiate(_, bytes)
            | TelnetEvent::Zmp(bytes)
            | TelnetEvent::Ttype(bytes)
            | TelnetEvent::Environ(bytes)
            | TelnetEvent::Mssp(bytes) => Some(bytes),
            _ => None,
        }
    }
}
