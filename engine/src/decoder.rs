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

//! RFC854 byte stream decoder.

use crate::{NegotiationVerb, TelnetError, TelnetOption, consts};
use bytes::BytesMut;
use tracing::{trace, warn};

/// Position of the decoder within the Telnet byte grammar.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum DecoderState {
    /// Plain application data
    #[default]
    NormalData,
    /// A carriage return was received with NVT end-of-line translation active
    EndOfLine,
    /// `IAC` received
    InterpretAsCommand,
    /// `IAC WILL` received, awaiting the option
    NegotiateWill,
    /// `IAC WONT` received, awaiting the option
    NegotiateWont,
    /// `IAC DO` received, awaiting the option
    NegotiateDo,
    /// `IAC DONT` received, awaiting the option
    NegotiateDont,
    /// `IAC SB` received, awaiting the option
    Subnegotiate,
    /// Collecting payload for the given option
    SubnegotiateArgument(u8),
    /// `IAC` received inside the payload of the given option
    SubnegotiateArgumentIAC(u8),
    /// Skipping the rest of an oversized payload of the given option
    SubnegotiateDiscard(u8),
    /// `IAC` received while skipping an oversized payload
    SubnegotiateDiscardIAC(u8),
}

/// Receiver of everything the decoder recognizes.
pub(crate) trait DecoderSink {
    /// Whether the peer currently transmits in binary mode.
    fn receive_binary(&self) -> bool;
    /// A run of application data.
    fn data(&mut self, bytes: &[u8]);
    /// `IAC <command>` for any command that is not negotiation or subnegotiation.
    fn command(&mut self, command: u8);
    /// `IAC <verb> <option>`.
    fn negotiate(&mut self, verb: NegotiationVerb, option: TelnetOption);
    /// A completed subnegotiation block. Returns true when the rest of the input must be
    /// decompressed before it is decoded.
    fn subnegotiate(&mut self, option: TelnetOption, payload: &[u8]) -> bool;
    /// A recovered protocol violation.
    fn warning(&mut self, warning: TelnetError);
}

///
/// Incremental Telnet decoder.
///
/// State survives between [`StreamDecoder::decode`] calls, so sequences may be split across
/// reads at any byte boundary.
///
#[derive(Clone, Debug)]
pub(crate) struct StreamDecoder {
    state: DecoderState,
    buffer: BytesMut,
    discard_next: bool,
    nvt_eol: bool,
    newline_on_crlf: bool,
    limit: Option<usize>,
}

impl StreamDecoder {
    pub(crate) fn new(nvt_eol: bool, newline_on_crlf: bool, limit: Option<usize>) -> Self {
        Self {
            state: DecoderState::NormalData,
            buffer: BytesMut::new(),
            discard_next: false,
            nvt_eol,
            newline_on_crlf,
            limit,
        }
    }

    pub(crate) fn state(&self) -> DecoderState {
        self.state
    }

    ///
    /// Decode `input`, reporting to `sink` as bytes are recognized.
    ///
    /// Returns `Some(n)` when a subnegotiation handler activated decompression: the first `n`
    /// bytes were decoded and the remainder has not been looked at. Returns `None` once all of
    /// `input` has been consumed.
    ///
    pub(crate) fn decode<S: DecoderSink>(&mut self, input: &[u8], sink: &mut S) -> Option<usize> {
        let mut run: Option<usize> = None;
        let mut i = 0;
        while i < input.len() {
            let byte = input[i];
            if self.discard_next {
                self.discard_next = false;
                i += 1;
                continue;
            }
            match (self.state, byte) {
                (DecoderState::NormalData, consts::IAC) => {
                    flush(input, &mut run, i, sink);
                    self.state = DecoderState::InterpretAsCommand;
                }
                (DecoderState::NormalData, consts::CR)
                    if self.nvt_eol && !sink.receive_binary() =>
                {
                    flush(input, &mut run, i, sink);
                    self.state = DecoderState::EndOfLine;
                }
                (DecoderState::NormalData, _) => {
                    run.get_or_insert(i);
                }
                (DecoderState::EndOfLine, consts::LF) => {
                    self.state = DecoderState::NormalData;
                    if self.newline_on_crlf {
                        run = Some(i);
                    } else {
                        sink.data(&[consts::CR]);
                    }
                }
                (DecoderState::EndOfLine, consts::NUL) => {
                    self.state = DecoderState::NormalData;
                    sink.data(&[consts::CR]);
                }
                (DecoderState::EndOfLine, _) => {
                    // Lone CR, then run the byte through the data rules
                    self.state = DecoderState::NormalData;
                    sink.data(&[consts::CR]);
                    continue;
                }
                (DecoderState::InterpretAsCommand, consts::IAC) => {
                    self.state = DecoderState::NormalData;
                    sink.data(&[consts::IAC]);
                }
                (DecoderState::InterpretAsCommand, consts::WILL) => {
                    self.state = DecoderState::NegotiateWill;
                }
                (DecoderState::InterpretAsCommand, consts::WONT) => {
                    self.state = DecoderState::NegotiateWont;
                }
                (DecoderState::InterpretAsCommand, consts::DO) => {
                    self.state = DecoderState::NegotiateDo;
                }
                (DecoderState::InterpretAsCommand, consts::DONT) => {
                    self.state = DecoderState::NegotiateDont;
                }
                (DecoderState::InterpretAsCommand, consts::SB) => {
                    self.state = DecoderState::Subnegotiate;
                }
                (DecoderState::InterpretAsCommand, _) => {
                    self.state = DecoderState::NormalData;
                    sink.command(byte);
                }
                (DecoderState::NegotiateWill, _) => {
                    self.state = DecoderState::NormalData;
                    sink.negotiate(NegotiationVerb::Will, byte.into());
                }
                (DecoderState::NegotiateWont, _) => {
                    self.state = DecoderState::NormalData;
                    sink.negotiate(NegotiationVerb::Wont, byte.into());
                }
                (DecoderState::NegotiateDo, _) => {
                    self.state = DecoderState::NormalData;
                    sink.negotiate(NegotiationVerb::Do, byte.into());
                }
                (DecoderState::NegotiateDont, _) => {
                    self.state = DecoderState::NormalData;
                    sink.negotiate(NegotiationVerb::Dont, byte.into());
                }
                (DecoderState::Subnegotiate, _) => {
                    self.buffer.clear();
                    self.state = DecoderState::SubnegotiateArgument(byte);
                }
                (DecoderState::SubnegotiateArgument(option), consts::IAC) => {
                    self.state = DecoderState::SubnegotiateArgumentIAC(option);
                }
                (DecoderState::SubnegotiateArgument(consts::option::COMPRESS1), consts::WILL) => {
                    // MCCPv1 announced itself with IAC SB 85 WILL SE
                    trace!("Discarding legacy MCCPv1 subnegotiation");
                    self.state = DecoderState::NormalData;
                    self.discard_next = true;
                }
                (DecoderState::SubnegotiateArgument(option), _) => {
                    self.push_payload(option, byte, sink);
                }
                (DecoderState::SubnegotiateArgumentIAC(option), consts::SE) => {
                    self.state = DecoderState::NormalData;
                    if sink.subnegotiate(option.into(), &self.buffer) {
                        return Some(i + 1);
                    }
                }
                (DecoderState::SubnegotiateArgumentIAC(option), consts::IAC) => {
                    self.state = DecoderState::SubnegotiateArgument(option);
                    self.push_payload(option, consts::IAC, sink);
                }
                (DecoderState::SubnegotiateArgumentIAC(option), _) => {
                    let option = TelnetOption::from(option);
                    warn!("Unexpected byte {byte:#04X} after IAC in {option} subnegotiation");
                    sink.warning(TelnetError::UnexpectedSubnegotiationByte { option, byte });
                    // Deliver what we have, then treat the byte as a fresh command
                    self.state = DecoderState::InterpretAsCommand;
                    if sink.subnegotiate(option, &self.buffer) {
                        self.state = DecoderState::NormalData;
                        return Some(i + 1);
                    }
                    continue;
                }
                (DecoderState::SubnegotiateDiscard(option), consts::IAC) => {
                    self.state = DecoderState::SubnegotiateDiscardIAC(option);
                }
                (DecoderState::SubnegotiateDiscard(_), _) => {}
                (DecoderState::SubnegotiateDiscardIAC(option), consts::SE) => {
                    let option = TelnetOption::from(option);
                    trace!("Skipped the rest of an oversized {option} subnegotiation");
                    self.state = DecoderState::NormalData;
                }
                (DecoderState::SubnegotiateDiscardIAC(option), consts::IAC) => {
                    self.state = DecoderState::SubnegotiateDiscard(option);
                }
                (DecoderState::SubnegotiateDiscardIAC(option), _) => {
                    let option = TelnetOption::from(option);
                    warn!("Unexpected byte {byte:#04X} after IAC in {option} subnegotiation");
                    sink.warning(TelnetError::UnexpectedSubnegotiationByte { option, byte });
                    self.state = DecoderState::InterpretAsCommand;
                    continue;
                }
            }
            i += 1;
        }
        flush(input, &mut run, input.len(), sink);
        None
    }

    fn push_payload<S: DecoderSink>(&mut self, option: u8, byte: u8, sink: &mut S) {
        if let Some(limit) = self.limit
            && self.buffer.len() >= limit
        {
            warn!(
                "{} subnegotiation exceeded {limit} bytes, skipping it",
                TelnetOption::from(option)
            );
            self.state = DecoderState::SubnegotiateDiscard(option);
            self.buffer.clear();
            sink.warning(TelnetError::SubnegotiationOverflow {
                option: option.into(),
                limit,
            });
            return;
        }
        self.buffer.extend_from_slice(&[byte]);
    }
}

fn flush<S: DecoderSink>(input: &[u8], run: &mut Option<usize>, end: usize, sink: &mut S) {
    if let Some(start) = run.take()
        && start < end
    {
        sink.data(&input[start..end]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Seen {
        Data(Vec<u8>),
        Command(u8),
        Negotiate(NegotiationVerb, TelnetOption),
        Subnegotiate(TelnetOption, Vec<u8>),
        Warning(TelnetError),
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Seen>,
        binary: bool,
        compress_on: Option<TelnetOption>,
    }

    impl DecoderSink for Recorder {
        fn receive_binary(&self) -> bool {
            self.binary
        }
        fn data(&mut self, bytes: &[u8]) {
            self.seen.push(Seen::Data(bytes.to_vec()));
        }
        fn command(&mut self, command: u8) {
            self.seen.push(Seen::Command(command));
        }
        fn negotiate(&mut self, verb: NegotiationVerb, option: TelnetOption) {
            self.seen.push(Seen::Negotiate(verb, option));
        }
        fn subnegotiate(&mut self, option: TelnetOption, payload: &[u8]) -> bool {
            self.seen.push(Seen::Subnegotiate(option, payload.to_vec()));
            self.compress_on == Some(option)
        }
        fn warning(&mut self, warning: TelnetError) {
            self.seen.push(Seen::Warning(warning));
        }
    }

    fn decode_all(decoder: &mut StreamDecoder, input: &[u8]) -> Vec<Seen> {
        let mut sink = Recorder::default();
        assert_eq!(decoder.decode(input, &mut sink), None);
        sink.seen
    }

    fn plain() -> StreamDecoder {
        StreamDecoder::new(false, false, None)
    }

    fn data(bytes: &[u8]) -> Seen {
        Seen::Data(bytes.to_vec())
    }

    // ============================================================================
    // Data
    // ============================================================================

    #[test]
    fn decode_plain_run_is_one_chunk() {
        let mut decoder = plain();
        assert_eq!(decode_all(&mut decoder, b"Hello"), vec![data(b"Hello")]);
        assert_eq!(decoder.state(), DecoderState::NormalData);
    }

    #[test]
    fn decode_empty_input() {
        let mut decoder = plain();
        assert!(decode_all(&mut decoder, b"").is_empty());
    }

    #[test]
    fn decode_trailing_iac_waits() {
        let mut decoder = plain();
        assert_eq!(decode_all(&mut decoder, b"AB\xFF"), vec![data(b"AB")]);
        assert_eq!(decoder.state(), DecoderState::InterpretAsCommand);
        assert_eq!(decode_all(&mut decoder, b"\xFFC"), vec![data(&[0xFF]), data(b"C")]);
    }

    #[test]
    fn decode_escaped_iac_between_runs() {
        let mut decoder = plain();
        assert_eq!(
            decode_all(&mut decoder, b"a\xFF\xFFb"),
            vec![data(b"a"), data(&[0xFF]), data(b"b")]
        );
    }

    #[test]
    fn decode_crlf_untouched_without_nvt_eol() {
        let mut decoder = plain();
        assert_eq!(decode_all(&mut decoder, b"Line\r\n"), vec![data(b"Line\r\n")]);
    }

    // ============================================================================
    // NVT end of line
    // ============================================================================

    #[test]
    fn decode_nvt_crlf_collapses_to_cr() {
        let mut decoder = StreamDecoder::new(true, false, None);
        assert_eq!(
            decode_all(&mut decoder, b"ab\r\ncd"),
            vec![data(b"ab"), data(b"\r"), data(b"cd")]
        );
    }

    #[test]
    fn decode_nvt_crlf_as_newline() {
        let mut decoder = StreamDecoder::new(true, true, None);
        assert_eq!(
            decode_all(&mut decoder, b"ab\r\ncd"),
            vec![data(b"ab"), data(b"\ncd")]
        );
    }

    #[test]
    fn decode_nvt_crnul_is_cr() {
        let mut decoder = StreamDecoder::new(true, false, None);
        assert_eq!(
            decode_all(&mut decoder, b"a\r\0b"),
            vec![data(b"a"), data(b"\r"), data(b"b")]
        );
    }

    #[test]
    fn decode_nvt_bare_cr_reprocesses_next_byte() {
        let mut decoder = StreamDecoder::new(true, false, None);
        assert_eq!(
            decode_all(&mut decoder, b"a\rb"),
            vec![data(b"a"), data(b"\r"), data(b"b")]
        );
        assert_eq!(
            decode_all(&mut decoder, b"\r\xFF\xF1"),
            vec![data(b"\r"), Seen::Command(consts::NOP)]
        );
    }

    #[test]
    fn decode_nvt_eol_split_across_calls() {
        let mut decoder = StreamDecoder::new(true, false, None);
        assert_eq!(decode_all(&mut decoder, b"a\r"), vec![data(b"a")]);
        assert_eq!(decoder.state(), DecoderState::EndOfLine);
        assert_eq!(decode_all(&mut decoder, b"\nb"), vec![data(b"\r"), data(b"b")]);
    }

    #[test]
    fn decode_nvt_eol_disabled_in_binary() {
        let mut decoder = StreamDecoder::new(true, false, None);
        let mut sink = Recorder {
            binary: true,
            ..Recorder::default()
        };
        decoder.decode(b"a\r\n", &mut sink);
        assert_eq!(sink.seen, vec![data(b"a\r\n")]);
    }

    // ============================================================================
    // Commands and negotiation
    // ============================================================================

    #[test]
    fn decode_commands() {
        let mut decoder = plain();
        assert_eq!(
            decode_all(&mut decoder, &[b'x', consts::IAC, consts::AYT, b'y', consts::IAC, consts::GA]),
            vec![
                data(b"x"),
                Seen::Command(consts::AYT),
                data(b"y"),
                Seen::Command(consts::GA)
            ]
        );
    }

    #[test]
    fn decode_negotiation() {
        let mut decoder = plain();
        assert_eq!(
            decode_all(
                &mut decoder,
                &[
                    consts::IAC, consts::WILL, 1,
                    consts::IAC, consts::WONT, 3,
                    consts::IAC, consts::DO, 24,
                    consts::IAC, consts::DONT, 31,
                ]
            ),
            vec![
                Seen::Negotiate(NegotiationVerb::Will, TelnetOption::Echo),
                Seen::Negotiate(NegotiationVerb::Wont, TelnetOption::SuppressGoAhead),
                Seen::Negotiate(NegotiationVerb::Do, TelnetOption::TTYPE),
                Seen::Negotiate(NegotiationVerb::Dont, TelnetOption::NAWS),
            ]
        );
    }

    #[test]
    fn decode_negotiation_split_across_calls() {
        let mut decoder = plain();
        assert!(decode_all(&mut decoder, &[consts::IAC]).is_empty());
        assert!(decode_all(&mut decoder, &[consts::DO]).is_empty());
        assert_eq!(decoder.state(), DecoderState::NegotiateDo);
        assert_eq!(
            decode_all(&mut decoder, &[1]),
            vec![Seen::Negotiate(NegotiationVerb::Do, TelnetOption::Echo)]
        );
    }

    // ============================================================================
    // Subnegotiation
    // ============================================================================

    #[test]
    fn decode_empty_subnegotiation() {
        let mut decoder = plain();
        assert_eq!(
            decode_all(&mut decoder, &[consts::IAC, consts::SB, 24, consts::IAC, consts::SE]),
            vec![Seen::Subnegotiate(TelnetOption::TTYPE, vec![])]
        );
    }

    #[test]
    fn decode_subnegotiation_unescapes_iac() {
        let mut decoder = plain();
        assert_eq!(
            decode_all(
                &mut decoder,
                &[consts::IAC, consts::SB, 201, b'a', consts::IAC, consts::IAC, b'b', consts::IAC, consts::SE, b'z']
            ),
            vec![
                Seen::Subnegotiate(TelnetOption::GMCP, vec![b'a', 0xFF, b'b']),
                data(b"z")
            ]
        );
    }

    #[test]
    fn decode_subnegotiation_split_across_calls() {
        let mut decoder = plain();
        assert!(decode_all(&mut decoder, &[consts::IAC, consts::SB, 24, 0]).is_empty());
        assert_eq!(decoder.state(), DecoderState::SubnegotiateArgument(24));
        assert!(decode_all(&mut decoder, b"xterm").is_empty());
        assert!(decode_all(&mut decoder, &[consts::IAC]).is_empty());
        assert_eq!(decoder.state(), DecoderState::SubnegotiateArgumentIAC(24));
        assert_eq!(
            decode_all(&mut decoder, &[consts::SE]),
            vec![Seen::Subnegotiate(TelnetOption::TTYPE, b"\0xterm".to_vec())]
        );
    }

    #[test]
    fn decode_mccp1_quirk_is_discarded() {
        let mut decoder = plain();
        assert!(
            decode_all(&mut decoder, &[consts::IAC, consts::SB, 85, consts::WILL, consts::SE])
                .is_empty()
        );
        assert_eq!(decoder.state(), DecoderState::NormalData);
        assert_eq!(decode_all(&mut decoder, b"ok"), vec![data(b"ok")]);
    }

    #[test]
    fn decode_mccp1_quirk_discard_spans_calls() {
        let mut decoder = plain();
        assert!(decode_all(&mut decoder, &[consts::IAC, consts::SB, 85, consts::WILL]).is_empty());
        assert_eq!(decode_all(&mut decoder, &[consts::SE, b'x']), vec![data(b"x")]);
    }

    #[test]
    fn decode_unexpected_byte_after_iac_in_subnegotiation() {
        let mut decoder = plain();
        assert_eq!(
            decode_all(
                &mut decoder,
                &[consts::IAC, consts::SB, 24, b'a', consts::IAC, consts::WILL, 1, b'b']
            ),
            vec![
                Seen::Warning(TelnetError::UnexpectedSubnegotiationByte {
                    option: TelnetOption::TTYPE,
                    byte: consts::WILL,
                }),
                Seen::Subnegotiate(TelnetOption::TTYPE, b"a".to_vec()),
                Seen::Negotiate(NegotiationVerb::Will, TelnetOption::Echo),
                data(b"b"),
            ]
        );
    }

    #[test]
    fn decode_subnegotiation_overflow_skips_to_se() {
        let mut decoder = StreamDecoder::new(false, false, Some(2));
        let seen = decode_all(
            &mut decoder,
            &[consts::IAC, consts::SB, 24, b'a', b'b', b'c', b'd', consts::IAC, consts::IAC, b'e'],
        );
        assert_eq!(
            seen,
            vec![Seen::Warning(TelnetError::SubnegotiationOverflow {
                option: TelnetOption::TTYPE,
                limit: 2,
            })]
        );
        assert_eq!(decoder.state(), DecoderState::SubnegotiateDiscard(24));
        assert_eq!(decode_all(&mut decoder, &[consts::IAC, consts::SE, b'z']), vec![data(b"z")]);
        assert_eq!(decoder.state(), DecoderState::NormalData);
    }

    #[test]
    fn decode_subnegotiation_at_limit_is_delivered() {
        let mut decoder = StreamDecoder::new(false, false, Some(2));
        assert_eq!(
            decode_all(&mut decoder, &[consts::IAC, consts::SB, 24, b'a', b'b', consts::IAC, consts::SE]),
            vec![Seen::Subnegotiate(TelnetOption::TTYPE, b"ab".to_vec())]
        );
    }

    #[test]
    fn decode_command_inside_skipped_subnegotiation() {
        let mut decoder = StreamDecoder::new(false, false, Some(1));
        assert_eq!(
            decode_all(&mut decoder, &[consts::IAC, consts::SB, 24, b'a', b'b', consts::IAC, consts::GA, b'c']),
            vec![
                Seen::Warning(TelnetError::SubnegotiationOverflow {
                    option: TelnetOption::TTYPE,
                    limit: 1,
                }),
                Seen::Warning(TelnetError::UnexpectedSubnegotiationByte {
                    option: TelnetOption::TTYPE,
                    byte: consts::GA,
                }),
                Seen::Command(consts::GA),
                data(b"c"),
            ]
        );
    }

    #[test]
    fn decode_large_subnegotiation_without_limit() {
        let mut decoder = plain();
        let mut input = vec![consts::IAC, consts::SB, 201];
        input.extend(std::iter::repeat_n(b'x', 20_000));
        input.extend([consts::IAC, consts::SE]);
        assert_eq!(
            decode_all(&mut decoder, &input),
            vec![Seen::Subnegotiate(TelnetOption::GMCP, vec![b'x'; 20_000])]
        );
    }

    #[test]
    fn decode_stops_when_compression_starts() {
        let mut decoder = plain();
        let mut sink = Recorder {
            compress_on: Some(TelnetOption::Compress2),
            ..Recorder::default()
        };
        let input = [b'a', consts::IAC, consts::SB, 86, consts::IAC, consts::SE, 0x78, 0x9C];
        assert_eq!(decoder.decode(&input, &mut sink), Some(6));
        assert_eq!(
            sink.seen,
            vec![data(b"a"), Seen::Subnegotiate(TelnetOption::Compress2, vec![])]
        );
        assert_eq!(decoder.state(), DecoderState::NormalData);
    }
}
