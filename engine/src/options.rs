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

use crate::consts;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

macro_rules! telnet_options {
    ($($(#[$meta:meta])* $variant:ident = $code:ident,)*) => {
        ///
        /// [Telnet Terminal Options](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
        ///
        /// Every byte value maps to exactly one variant: codes without a named variant are carried
        /// as [`TelnetOption::Unknown`], so `TelnetOption::from(byte).to_u8() == byte` always holds.
        ///
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub enum TelnetOption {
            $($(#[$meta])* $variant,)*
            /// Option code without a named variant
            Unknown(u8),
        }

        impl TelnetOption {
            /// Wire value of this option.
            pub const fn to_u8(self) -> u8 {
                match self {
                    $(TelnetOption::$variant => consts::option::$code,)*
                    TelnetOption::Unknown(byte) => byte,
                }
            }

            /// Option for a wire value, falling back to [`TelnetOption::Unknown`].
            pub const fn from_u8(byte: u8) -> Self {
                match byte {
                    $(consts::option::$code => TelnetOption::$variant,)*
                    byte => TelnetOption::Unknown(byte),
                }
            }

            /// Short name of a known option.
            pub const fn name(self) -> Option<&'static str> {
                match self {
                    $(TelnetOption::$variant => Some(stringify!($variant)),)*
                    TelnetOption::Unknown(_) => None,
                }
            }
        }
    };
}

telnet_options! {
    /// Binary Transmission [RFC856](https://tools.ietf.org/html/rfc856)
    TransmitBinary = BINARY,
    /// Echo [RFC857](https://tools.ietf.org/html/rfc857)
    Echo = ECHO,
    /// Prepare to reconnect
    Reconnection = RCP,
    /// Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    SuppressGoAhead = SGA,
    /// Negotiate Approximate Message Size
    NegotiateApproxMessageSize = NAMS,
    /// Status [RFC859](http://www.iana.org/go/rfc859)
    Status = STATUS,
    /// Timing Mark [RFC860](http://www.iana.org/go/rfc860)
    TimingMark = TM,
    /// Remote Controlled Transmission and Echo [RFC726](http://www.iana.org/go/rfc726)
    RCTE = RCTE,
    /// Output Line Width
    OutLineWidth = NAOL,
    /// Output Page Size
    OutPageSize = NAOP,
    /// Output Carriage-Return Disposition [RFC652](http://www.iana.org/go/rfc652)
    NAOCRD = NAOCRD,
    /// Output Horizontal Tab Stops [RFC653](http://www.iana.org/go/rfc653)
    NAOHTS = NAOHTS,
    /// Output Horizontal Tab Disposition [RFC654](http://www.iana.org/go/rfc654)
    NAOHTD = NAOHTD,
    /// Output Form Feed Disposition [RFC655](http://www.iana.org/go/rfc655)
    NAOFFD = NAOFFD,
    /// Output Vertical Tab Stops [RFC656](http://www.iana.org/go/rfc656)
    NAOVTS = NAOVTS,
    /// Output Vertical Tab Disposition [RFC657](http://www.iana.org/go/rfc657)
    NAOVTD = NAOVTD,
    /// Output Linefeed Disposition [RFC658](http://www.iana.org/go/rfc658)
    NAOLFD = NAOLFD,
    /// Extended ASCII [RFC698](http://www.iana.org/go/rfc698)
    XASCII = XASCII,
    /// Logout [RFC727](http://www.iana.org/go/rfc727)
    Logout = LOGOUT,
    /// Byte Macro [RFC735](http://www.iana.org/go/rfc735)
    ByteMacro = BM,
    /// Data Entry Terminal [RFC1043](http://www.iana.org/go/rfc1043)
    DET = DET,
    /// SUPDUP [RFC736](http://www.iana.org/go/rfc736)
    SUPDUP = SUPDUP,
    /// SUPDUP Output [RFC749](http://www.iana.org/go/rfc749)
    SUPDUPOutput = SUPDUP_OUTPUT,
    /// Send Location [RFC779](http://www.iana.org/go/rfc779)
    SNDLOC = SNDLOC,
    /// Terminal Type [RFC1091](http://www.iana.org/go/rfc1091)
    TTYPE = TTYPE,
    /// End of Record [RFC885](http://www.iana.org/go/rfc885)
    EOR = EOR,
    /// TACACS User Identification [RFC927](http://www.iana.org/go/rfc927)
    TUID = TUID,
    /// Output Marking [RFC933](http://www.iana.org/go/rfc933)
    OUTMRK = OUTMRK,
    /// Terminal Location Number [RFC946](http://www.iana.org/go/rfc946)
    TTYLOC = TTYLOC,
    /// Telnet 3270 Regime [RFC1041](http://www.iana.org/go/rfc1041)
    OPT3270Regime = OPT3270REGIME,
    /// X.3 PAD [RFC1053](http://www.iana.org/go/rfc1053)
    X3PAD = X3PAD,
    /// Negotiate About Window Size [RFC1073](http://www.iana.org/go/rfc1073)
    NAWS = NAWS,
    /// Terminal Speed [RFC1079](http://www.iana.org/go/rfc1079)
    TSPEED = TSPEED,
    /// Remote Flow Control [RFC1372](http://www.iana.org/go/rfc1372)
    LFLOW = LFLOW,
    /// Linemode [RFC1184](http://www.iana.org/go/rfc1184)
    Linemode = LINEMODE,
    /// X Display Location [RFC1096](http://www.iana.org/go/rfc1096)
    XDISPLOC = XDISPLOC,
    /// Environment [RFC1408](http://www.iana.org/go/rfc1408)
    Environment = OLD_ENVIRONMENT,
    /// Authentication [RFC2941](http://www.iana.org/go/rfc2941)
    Authentication = AUTHENTICATION,
    /// Encryption [RFC2946](http://www.iana.org/go/rfc2946)
    Encryption = ENCRYPTION,
    /// New Environment [RFC1572](http://www.iana.org/go/rfc1572)
    NewEnvironment = NEW_ENVIRONMENT,
    /// TN3270E [RFC2355](http://www.iana.org/go/rfc2355)
    TN3270E = TN3270E,
    /// XAUTH
    XAUTH = XAUTH,
    /// Charset [RFC2066](http://www.iana.org/go/rfc2066)
    Charset = CHARSET,
    /// Remote Serial Port
    TRSP = TRSP,
    /// Com Port Control [RFC2217](http://www.iana.org/go/rfc2217)
    CPCO = CPCO,
    /// Suppress Local Echo
    TSLE = TSLE,
    /// Start TLS
    StartTLS = START_TLS,
    /// Kermit [RFC2840](http://www.iana.org/go/rfc2840)
    Kermit = KERMIT,
    /// SEND-URL
    SendUrl = SENDURL,
    /// FORWARD_X
    ForwardX = FORWARDX,
    /// Mud Server Data Protocol [MSDP](https://tintin.sourceforge.io/protocols/msdp/)
    MSDP = MSDP,
    /// Mud Server Status Protocol [MSSP](https://tintin.sourceforge.io/protocols/mssp/)
    MSSP = MSSP,
    /// Mud Client Compression Protocol v1 [MCCPv1](http://www.gammon.com.au/mccp/protocol.html)
    Compress1 = COMPRESS1,
    /// Mud Client Compression Protocol v2 [MCCPv2](https://tintin.sourceforge.io/protocols/mccp/)
    Compress2 = COMPRESS2,
    /// Zenith Mud Protocol
    ZMP = ZMP,
    /// Pragma Logon
    PragmaLogon = PRAGMA_LOGIN,
    /// SSPI Logon
    SSPILogon = SSPI_LOGIN,
    /// Pragma Heartbeat
    PragmaHeartbeat = PRAGMA_HEARTBEAT,
    /// Generic Mud Communication Protocol [GMCP](https://www.gammon.com.au/gmcp)
    GMCP = GMCP,
    /// Extended Options List [RFC861](http://www.iana.org/go/rfc861)
    EXOPL = EXOPL,
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown({})", self.to_u8()),
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(byte: u8) -> Self {
        Self::from_u8(byte)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

/// Which sides of an option this endpoint is prepared to agree to.
///
/// Consulted only when the peer initiates a change: an option the peer offers (`WILL`) is
/// accepted when `remote` is set, an option the peer asks us to perform (`DO`) is accepted when
/// `local` is set. Requests we initiate ourselves are never gated by this table.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct OptionRequirement {
    /// Option this entry describes
    pub option: TelnetOption,
    /// We are willing to perform the option ourselves
    pub local: bool,
    /// We want the peer to perform the option
    pub remote: bool,
}

impl OptionRequirement {
    /// Requirement with explicit intents for both sides.
    pub const fn new(option: TelnetOption, local: bool, remote: bool) -> Self {
        Self {
            option,
            local,
            remote,
        }
    }

    /// Option we will perform when asked, but don't expect from the peer.
    pub const fn local(option: TelnetOption) -> Self {
        Self::new(option, true, false)
    }

    /// Option we accept from the peer, but won't perform ourselves.
    pub const fn remote(option: TelnetOption) -> Self {
        Self::new(option, false, true)
    }

    /// Option accepted in both directions.
    pub const fn both(option: TelnetOption) -> Self {
        Self::new(option, true, true)
    }
}

/// Immutable set of [`OptionRequirement`]s keyed by option code.
///
/// When the same option is listed more than once the first entry wins. Options absent from
/// the table are unsupported in both directions.
#[derive(Clone, Debug, Default)]
pub struct OptionTable {
    entries: HashMap<u8, OptionRequirement>,
}

impl OptionTable {
    /// Build a table from a list of requirements.
    pub fn new<I>(requirements: I) -> Self
    where
        I: IntoIterator<Item = OptionRequirement>,
    {
        let mut entries = HashMap::new();
        for requirement in requirements {
            if let Entry::Vacant(slot) = entries.entry(requirement.option.to_u8()) {
                slot.insert(requirement);
            }
        }
        Self { entries }
    }

    /// Requirement recorded for `option`, if any.
    pub fn get(&self, option: TelnetOption) -> Option<&OptionRequirement> {
        self.entries.get(&option.to_u8())
    }

    /// Whether we agree to perform `option` when the peer asks with `DO`.
    pub fn supports_local(&self, option: TelnetOption) -> bool {
        self.get(option).is_some_and(|entry| entry.local)
    }

    /// Whether we agree to the peer performing `option` when it offers with `WILL`.
    pub fn supports_remote(&self, option: TelnetOption) -> bool {
        self.get(option).is_some_and(|entry| entry.remote)
    }

    /// Number of distinct options in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table declares no options at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<OptionRequirement> for OptionTable {
    fn from_iter<I: IntoIterator<Item = OptionRequirement>>(iter: I) -> Self {
        Self::new(iter)
    }
}
