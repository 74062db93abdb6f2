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

//! Error types for the Telnet engine

use crate::{NegotiationVerb, TelnetOption};
use thiserror::Error;

/// Result type for fallible engine operations
pub type TelnetResult<T> = Result<T, TelnetError>;

/// Protocol anomalies and collaborator failures observed by the engine.
///
/// None of these abort processing. The decoder recovers from every one of them and they reach
/// the caller only as [`TelnetEvent::Warning`](crate::TelnetEvent::Warning) or
/// [`TelnetEvent::Error`](crate::TelnetEvent::Error).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TelnetError {
    /// A byte other than `SE` or `IAC` followed `IAC` inside a subnegotiation block
    #[error("Unexpected byte {byte:#04X} after IAC in {option} subnegotiation")]
    UnexpectedSubnegotiationByte {
        /// Option whose block was open
        option: TelnetOption,
        /// Offending byte
        byte: u8,
    },

    /// The peer answered a pending disable request by enabling the option
    #[error("{pending} {option} answered by {received}")]
    UnexpectedNegotiation {
        /// Option being negotiated
        option: TelnetOption,
        /// The request we had outstanding
        pending: NegotiationVerb,
        /// What the peer sent back
        received: NegotiationVerb,
    },

    /// A subnegotiation block grew beyond the configured size limit
    #[error("{option} subnegotiation exceeded {limit} bytes")]
    SubnegotiationOverflow {
        /// Option whose block was abandoned
        option: TelnetOption,
        /// Configured limit
        limit: usize,
    },

    /// A handler asked for stream decompression while a transform was already installed
    #[error("{option} requested decompression while the stream is already decompressing")]
    DecompressionActive {
        /// Option whose handler made the request
        option: TelnetOption,
    },

    /// The installed input transform failed
    #[error("Input transform failed: {0}")]
    Transform(String),

    /// A byte that is not a negotiation command
    #[error("Unknown negotiation command {0:#04X}")]
    UnknownCommand(u8),
}

impl TelnetError {
    /// Whether the error describes malformed or contradictory input from the peer
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            TelnetError::UnexpectedSubnegotiationByte { .. }
                | TelnetError::UnexpectedNegotiation { .. }
                | TelnetError::SubnegotiationOverflow { .. }
        )
    }

    /// The option the error relates to, when there is one
    pub fn option(&self) -> Option<TelnetOption> {
        match self {
            TelnetError::UnexpectedSubnegotiationByte { option, .. }
            | TelnetError::UnexpectedNegotiation { option, .. }
            | TelnetError::SubnegotiationOverflow { option, .. }
            | TelnetError::DecompressionActive { option } => Some(*option),
            TelnetError::Transform(_) | TelnetError::UnknownCommand(_) => None,
        }
    }
}
