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

///
/// Construction-time settings of a [`TelnetEngine`](crate::TelnetEngine).
///
/// The engine never changes these after construction.
///
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    /// Pass negotiation straight through as events, without RFC1143 bookkeeping or automatic
    /// replies, and transmit negotiation requests unconditionally.
    pub proxy: bool,
    /// Apply NVT end-of-line translation to received data while the peer is not in binary mode.
    pub nvt_eol: bool,
    /// With `nvt_eol`, deliver `CR LF` as `'\n'` instead of `'\r'`.
    pub newline_on_crlf: bool,
    /// Surface recovered protocol violations as [`TelnetEvent::Warning`](crate::TelnetEvent::Warning).
    pub diagnostics: bool,
    /// Subnegotiation payloads longer than this are discarded up to their closing `IAC SE`.
    /// `None`, the default, lets the buffer grow as needed.
    pub max_subnegotiation_size: Option<usize>,
}

impl EngineConfig {
    /// Default configuration
    pub fn new() -> EngineConfig {
        EngineConfig::default()
    }

    /// Configuration for a transparent proxy between two Telnet endpoints
    pub fn proxy() -> EngineConfig {
        EngineConfig {
            proxy: true,
            ..EngineConfig::default()
        }
    }

    /// Set proxy mode
    #[must_use]
    pub fn with_proxy(mut self, proxy: bool) -> Self {
        self.proxy = proxy;
        self
    }

    /// Set NVT end-of-line translation on receive
    #[must_use]
    pub fn with_nvt_eol(mut self, nvt_eol: bool) -> Self {
        self.nvt_eol = nvt_eol;
        self
    }

    /// Set whether `CR LF` is delivered as a newline
    #[must_use]
    pub fn with_newline_on_crlf(mut self, newline: bool) -> Self {
        self.newline_on_crlf = newline;
        self
    }

    /// Set warning events for recovered protocol violations
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Set the subnegotiation size limit
    #[must_use]
    pub fn with_max_subnegotiation_size(mut self, limit: Option<usize>) -> Self {
        self.max_subnegotiation_size = limit;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            proxy: false,
            nvt_eol: false,
            newline_on_crlf: false,
            diagnostics: false,
            max_subnegotiation_size: None,
        }
    }
}
