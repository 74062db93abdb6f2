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

//! RFC1143 "Q method" option negotiation.
//!
//! Each option carries two independent [`QState`]s: the local half tracks options we perform
//! (`WILL`/`WONT` from us, `DO`/`DONT` from the peer) and the remote half tracks options the peer
//! performs (`DO`/`DONT` from us, `WILL`/`WONT` from the peer). The intermediate `Want*` states
//! remember outstanding requests so neither end can be driven into a negotiation loop.
//!
//! [`OptionNegotiator`] performs no I/O. Its methods report the verb to put on the wire and
//! the event to surface, and leave delivery to the caller.

use crate::{OptionTable, TelnetError, TelnetOption, TelnetResult, consts};
use std::collections::HashMap;
use tracing::debug;

/// Negotiation state of one half of an option.
#[derive(Copy, Clone, Debug, Default, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub enum QState {
    /// Disabled
    #[default]
    No,
    /// Enabled, we asked to disable and await the answer
    WantNo,
    /// Enabled, we asked to disable and will ask to re-enable once answered
    WantNoOpposite,
    /// Enabled
    Yes,
    /// Disabled, we asked to enable and await the answer
    WantYes,
    /// Disabled, we asked to enable and will ask to disable once answered
    WantYesOpposite,
}

impl QState {
    /// Only a settled `Yes` counts as enabled.
    pub fn is_enabled(self) -> bool {
        self == QState::Yes
    }
}

impl std::fmt::Display for QState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QState::No => write!(f, "No"),
            QState::WantNo => write!(f, "WantNo"),
            QState::WantNoOpposite => write!(f, "WantNoOpposite"),
            QState::Yes => write!(f, "Yes"),
            QState::WantYes => write!(f, "WantYes"),
            QState::WantYesOpposite => write!(f, "WantYesOpposite"),
        }
    }
}

/// Which end of the connection performs an option.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetSide {
    /// We perform the option ("us")
    Local,
    /// The peer performs the option ("him")
    Remote,
}

impl TelnetSide {
    /// Verb we send to request or accept enabling this half.
    pub const fn enable_verb(self) -> NegotiationVerb {
        match self {
            TelnetSide::Local => NegotiationVerb::Will,
            TelnetSide::Remote => NegotiationVerb::Do,
        }
    }

    /// Verb we send to request disabling or to refuse this half.
    pub const fn disable_verb(self) -> NegotiationVerb {
        match self {
            TelnetSide::Local => NegotiationVerb::Wont,
            TelnetSide::Remote => NegotiationVerb::Dont,
        }
    }

    /// Verb the peer sends to enable this half.
    pub const fn peer_enable_verb(self) -> NegotiationVerb {
        match self {
            TelnetSide::Local => NegotiationVerb::Do,
            TelnetSide::Remote => NegotiationVerb::Will,
        }
    }

    /// Verb the peer sends to disable this half.
    pub const fn peer_disable_verb(self) -> NegotiationVerb {
        match self {
            TelnetSide::Local => NegotiationVerb::Dont,
            TelnetSide::Remote => NegotiationVerb::Wont,
        }
    }
}

impl std::fmt::Display for TelnetSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetSide::Local => write!(f, "Local"),
            TelnetSide::Remote => write!(f, "Remote"),
        }
    }
}

/// Per-option pair of Q-states.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct NegotiationState {
    /// Our half ("us")
    pub local: QState,
    /// The peer's half ("him")
    pub remote: QState,
}

impl NegotiationState {
    /// State of one half.
    pub fn get(&self, side: TelnetSide) -> QState {
        match side {
            TelnetSide::Local => self.local,
            TelnetSide::Remote => self.remote,
        }
    }

    /// Replace one half, leaving the other untouched.
    pub fn set(&mut self, side: TelnetSide, state: QState) {
        match side {
            TelnetSide::Local => self.local = state,
            TelnetSide::Remote => self.remote = state,
        }
    }
}

/// One of the four option negotiation commands.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NegotiationVerb {
    /// `IAC WILL`
    Will,
    /// `IAC WONT`
    Wont,
    /// `IAC DO`
    Do,
    /// `IAC DONT`
    Dont,
}

impl NegotiationVerb {
    /// Command byte on the wire.
    pub const fn to_u8(self) -> u8 {
        match self {
            NegotiationVerb::Will => consts::WILL,
            NegotiationVerb::Wont => consts::WONT,
            NegotiationVerb::Do => consts::DO,
            NegotiationVerb::Dont => consts::DONT,
        }
    }

    /// `WILL` and `DO` ask for an option to be on.
    pub const fn is_enable(self) -> bool {
        matches!(self, NegotiationVerb::Will | NegotiationVerb::Do)
    }

    /// Half affected when we send this verb.
    pub const fn sent_side(self) -> TelnetSide {
        match self {
            NegotiationVerb::Will | NegotiationVerb::Wont => TelnetSide::Local,
            NegotiationVerb::Do | NegotiationVerb::Dont => TelnetSide::Remote,
        }
    }

    /// Half affected when the peer sends this verb.
    pub const fn received_side(self) -> TelnetSide {
        match self {
            NegotiationVerb::Will | NegotiationVerb::Wont => TelnetSide::Remote,
            NegotiationVerb::Do | NegotiationVerb::Dont => TelnetSide::Local,
        }
    }
}

impl TryFrom<u8> for NegotiationVerb {
    type Error = TelnetError;

    fn try_from(byte: u8) -> TelnetResult<Self> {
        match byte {
            consts::WILL => Ok(NegotiationVerb::Will),
            consts::WONT => Ok(NegotiationVerb::Wont),
            consts::DO => Ok(NegotiationVerb::Do),
            consts::DONT => Ok(NegotiationVerb::Dont),
            byte => Err(TelnetError::UnknownCommand(byte)),
        }
    }
}

impl From<NegotiationVerb> for u8 {
    fn from(verb: NegotiationVerb) -> Self {
        verb.to_u8()
    }
}

impl std::fmt::Display for NegotiationVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NegotiationVerb::Will => write!(f, "WILL"),
            NegotiationVerb::Wont => write!(f, "WONT"),
            NegotiationVerb::Do => write!(f, "DO"),
            NegotiationVerb::Dont => write!(f, "DONT"),
        }
    }
}

/// Binary transmission flags derived from the state of option 0 (RFC856).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BinaryMode {
    /// We send binary, so outgoing text is not NVT translated
    pub transmit: bool,
    /// The peer sends binary, so incoming CR is not NVT translated
    pub receive: bool,
}

/// Result of handling a negotiation command from the peer.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NegotiationOutcome {
    /// Verb to send back for the same option
    pub reply: Option<NegotiationVerb>,
    /// Event kind to surface to the application
    pub event: Option<NegotiationVerb>,
    /// Protocol anomaly detected along the way
    pub anomaly: Option<TelnetError>,
}

/// RFC1143 bookkeeping for every option touched on a connection.
///
/// Entries are created the first time an option is requested or received and are never
/// removed, so an option keeps its record for the negotiator's lifetime.
#[derive(Clone, Debug, Default)]
pub struct OptionNegotiator {
    table: OptionTable,
    states: HashMap<u8, NegotiationState>,
    binary: BinaryMode,
}

impl OptionNegotiator {
    /// Negotiator answering peer requests according to `table`.
    pub fn new(table: OptionTable) -> Self {
        Self {
            table,
            states: HashMap::new(),
            binary: BinaryMode::default(),
        }
    }

    /// Support declarations consulted for peer-initiated requests.
    pub fn table(&self) -> &OptionTable {
        &self.table
    }

    /// Current state of `option`, `No/No` when it was never touched.
    pub fn state(&self, option: TelnetOption) -> NegotiationState {
        self.states
            .get(&option.to_u8())
            .copied()
            .unwrap_or_default()
    }

    /// Number of options with a recorded state.
    pub fn tracked(&self) -> usize {
        self.states.len()
    }

    /// Whether we currently perform `option`.
    pub fn is_enabled_local(&self, option: TelnetOption) -> bool {
        self.state(option).local.is_enabled()
    }

    /// Whether the peer currently performs `option`.
    pub fn is_enabled_remote(&self, option: TelnetOption) -> bool {
        self.state(option).remote.is_enabled()
    }

    /// Binary transmission flags.
    pub fn binary(&self) -> BinaryMode {
        self.binary
    }

    ///
    /// Ask for a change we initiate. Returns the verb to transmit, or `None` when the request is
    /// redundant or only alters a queued request.
    ///
    /// | verb | state            | result                         |
    /// |------|------------------|--------------------------------|
    /// | WILL | No               | send WILL, WantYes             |
    /// | WILL | WantNo           | WantNoOpposite                 |
    /// | WILL | WantYesOpposite  | WantYes                        |
    /// | WONT | Yes              | send WONT, WantNo              |
    /// | WONT | WantYes          | WantYesOpposite                |
    /// | WONT | WantNoOpposite   | WantNo                         |
    ///
    /// `DO` and `DONT` act the same way on the remote half. Anything else is a no-op.
    ///
    pub fn request(&mut self, verb: NegotiationVerb, option: TelnetOption) -> Option<NegotiationVerb> {
        let side = verb.sent_side();
        let mut state = self.state(option);
        let current = state.get(side);
        let (next, send) = match (verb.is_enable(), current) {
            (true, QState::No) => (QState::WantYes, true),
            (true, QState::WantNo) => (QState::WantNoOpposite, false),
            (true, QState::WantYesOpposite) => (QState::WantYes, false),
            (false, QState::Yes) => (QState::WantNo, true),
            (false, QState::WantYes) => (QState::WantYesOpposite, false),
            (false, QState::WantNoOpposite) => (QState::WantNo, false),
            (_, unchanged) => (unchanged, false),
        };
        state.set(side, next);
        self.store(option, state);
        send.then_some(verb)
    }

    /// Handle a negotiation command received from the peer.
    pub fn receive(&mut self, verb: NegotiationVerb, option: TelnetOption) -> NegotiationOutcome {
        let side = verb.received_side();
        let mut state = self.state(option);
        let current = state.get(side);
        let mut outcome = NegotiationOutcome::default();

        let next = if verb.is_enable() {
            match current {
                QState::No => {
                    if self.supports(side, option) {
                        outcome.reply = Some(side.enable_verb());
                        outcome.event = Some(side.peer_enable_verb());
                        QState::Yes
                    } else {
                        outcome.reply = Some(side.disable_verb());
                        QState::No
                    }
                }
                QState::Yes => QState::Yes,
                QState::WantNo => {
                    outcome.event = Some(side.peer_disable_verb());
                    outcome.anomaly = Some(Self::answered_by(side, option));
                    QState::No
                }
                QState::WantNoOpposite => {
                    outcome.event = Some(side.peer_enable_verb());
                    outcome.anomaly = Some(Self::answered_by(side, option));
                    QState::Yes
                }
                QState::WantYes => {
                    outcome.event = Some(side.peer_enable_verb());
                    QState::Yes
                }
                QState::WantYesOpposite => {
                    outcome.reply = Some(side.disable_verb());
                    outcome.event = Some(side.peer_enable_verb());
                    QState::WantNo
                }
            }
        } else {
            match current {
                QState::No => QState::No,
                QState::Yes => {
                    outcome.reply = Some(side.disable_verb());
                    outcome.event = Some(side.peer_disable_verb());
                    QState::No
                }
                QState::WantNo => {
                    outcome.event = Some(side.peer_disable_verb());
                    QState::No
                }
                QState::WantNoOpposite => {
                    outcome.event = Some(side.enable_verb());
                    QState::WantYes
                }
                QState::WantYes | QState::WantYesOpposite => QState::No,
            }
        };

        if next != current {
            debug!("{side} {option} {verb}: {current} -> {next}");
        }
        state.set(side, next);
        self.store(option, state);
        outcome
    }

    fn supports(&self, side: TelnetSide, option: TelnetOption) -> bool {
        match side {
            TelnetSide::Local => self.table.supports_local(option),
            TelnetSide::Remote => self.table.supports_remote(option),
        }
    }

    fn answered_by(side: TelnetSide, option: TelnetOption) -> TelnetError {
        TelnetError::UnexpectedNegotiation {
            option,
            pending: side.disable_verb(),
            received: side.peer_enable_verb(),
        }
    }

    fn store(&mut self, option: TelnetOption, state: NegotiationState) {
        self.states.insert(option.to_u8(), state);
        if option.to_u8() == consts::option::BINARY {
            self.binary = BinaryMode {
                transmit: state.local.is_enabled(),
                receive: state.remote.is_enabled(),
            };
        }
    }
}
