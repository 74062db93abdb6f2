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

//! Wire-level byte values for the Telnet command set (RFC854) and option codes.

/// Null byte, the second half of an NVT bare carriage return (`CR NUL`).
pub const NUL: u8 = 0x00;
/// Line Feed
pub const LF: u8 = 0x0A;
/// Carriage Return
pub const CR: u8 = 0x0D;

/// End of Record (RFC885)
pub const EOR: u8 = 239;
/// End of Subnegotiation
pub const SE: u8 = 240;
/// No Operation
pub const NOP: u8 = 241;
/// Data Mark, the data stream portion of a Synch
pub const DM: u8 = 242;
/// Break
pub const BRK: u8 = 243;
/// Interrupt Process
pub const IP: u8 = 244;
/// Abort Output
pub const AO: u8 = 245;
/// Are You There
pub const AYT: u8 = 246;
/// Erase Character
pub const EC: u8 = 247;
/// Erase Line
pub const EL: u8 = 248;
/// Go Ahead
pub const GA: u8 = 249;
/// Begin Subnegotiation
pub const SB: u8 = 250;
/// Sender wants to enable an option
pub const WILL: u8 = 251;
/// Sender refuses or wants to disable an option
pub const WONT: u8 = 252;
/// Sender asks the receiver to enable an option
pub const DO: u8 = 253;
/// Sender asks the receiver to disable an option
pub const DONT: u8 = 254;
/// Interpret As Command
pub const IAC: u8 = 255;

/// Option codes as registered with IANA plus the common MUD extensions.
pub mod option {
    /// Binary Transmission
    pub const BINARY: u8 = 0;
    /// Echo
    pub const ECHO: u8 = 1;
    /// Reconnection
    pub const RCP: u8 = 2;
    /// Suppress Go Ahead
    pub const SGA: u8 = 3;
    /// Negotiate Approximate Message Size
    pub const NAMS: u8 = 4;
    /// Status
    pub const STATUS: u8 = 5;
    /// Timing Mark
    pub const TM: u8 = 6;
    /// Remote Controlled Transmission and Echo
    pub const RCTE: u8 = 7;
    /// Output Line Width
    pub const NAOL: u8 = 8;
    /// Output Page Size
    pub const NAOP: u8 = 9;
    /// Output Carriage-Return Disposition
    pub const NAOCRD: u8 = 10;
    /// Output Horizontal Tab Stops
    pub const NAOHTS: u8 = 11;
    /// Output Horizontal Tab Disposition
    pub const NAOHTD: u8 = 12;
    /// Output Form Feed Disposition
    pub const NAOFFD: u8 = 13;
    /// Output Vertical Tab Stops
    pub const NAOVTS: u8 = 14;
    /// Output Vertical Tab Disposition
    pub const NAOVTD: u8 = 15;
    /// Output Linefeed Disposition
    pub const NAOLFD: u8 = 16;
    /// Extended ASCII
    pub const XASCII: u8 = 17;
    /// Logout
    pub const LOGOUT: u8 = 18;
    /// Byte Macro
    pub const BM: u8 = 19;
    /// Data Entry Terminal
    pub const DET: u8 = 20;
    /// SUPDUP
    pub const SUPDUP: u8 = 21;
    /// SUPDUP Output
    pub const SUPDUP_OUTPUT: u8 = 22;
    /// Send Location
    pub const SNDLOC: u8 = 23;
    /// Terminal Type
    pub const TTYPE: u8 = 24;
    /// End of Record
    pub const EOR: u8 = 25;
    /// TACACS User Identification
    pub const TUID: u8 = 26;
    /// Output Marking
    pub const OUTMRK: u8 = 27;
    /// Terminal Location Number
    pub const TTYLOC: u8 = 28;
    /// Telnet 3270 Regime
    pub const OPT3270REGIME: u8 = 29;
    /// X.3 PAD
    pub const X3PAD: u8 = 30;
    /// Negotiate About Window Size
    pub const NAWS: u8 = 31;
    /// Terminal Speed
    pub const TSPEED: u8 = 32;
    /// Remote Flow Control
    pub const LFLOW: u8 = 33;
    /// Linemode
    pub const LINEMODE: u8 = 34;
    /// X Display Location
    pub const XDISPLOC: u8 = 35;
    /// Environment (RFC1408)
    pub const OLD_ENVIRONMENT: u8 = 36;
    /// Authentication
    pub const AUTHENTICATION: u8 = 37;
    /// Encryption
    pub const ENCRYPTION: u8 = 38;
    /// New Environment (RFC1572)
    pub const NEW_ENVIRONMENT: u8 = 39;
    /// TN3270E
    pub const TN3270E: u8 = 40;
    /// XAUTH
    pub const XAUTH: u8 = 41;
    /// Charset
    pub const CHARSET: u8 = 42;
    /// Remote Serial Port
    pub const TRSP: u8 = 43;
    /// Com Port Control
    pub const CPCO: u8 = 44;
    /// Suppress Local Echo
    pub const TSLE: u8 = 45;
    /// Start TLS
    pub const START_TLS: u8 = 46;
    /// Kermit
    pub const KERMIT: u8 = 47;
    /// SEND-URL
    pub const SENDURL: u8 = 48;
    /// FORWARD_X
    pub const FORWARDX: u8 = 49;
    /// Mud Server Data Protocol
    pub const MSDP: u8 = 69;
    /// Mud Server Status Protocol
    pub const MSSP: u8 = 70;
    /// Mud Client Compression Protocol v1
    pub const COMPRESS1: u8 = 85;
    /// Mud Client Compression Protocol v2
    pub const COMPRESS2: u8 = 86;
    /// Zenith Mud Protocol
    pub const ZMP: u8 = 93;
    /// Pragma Logon
    pub const PRAGMA_LOGIN: u8 = 138;
    /// SSPI Logon
    pub const SSPI_LOGIN: u8 = 139;
    /// Pragma Heartbeat
    pub const PRAGMA_HEARTBEAT: u8 = 140;
    /// Generic Mud Communication Protocol
    pub const GMCP: u8 = 201;
    /// Extended Options List
    pub const EXOPL: u8 = 255;
}
