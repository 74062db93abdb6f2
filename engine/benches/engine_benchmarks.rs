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

//! Benchmarks for telq engine performance

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use telq_engine::{
    EngineConfig, NegotiationVerb, OptionRequirement, TelnetEngine, TelnetEvent, TelnetOption,
    consts,
};

// ============================================================================
// Helper Functions
// ============================================================================

/// Engine whose subscriber only counts events and transmitted bytes.
fn counting_engine(config: EngineConfig) -> TelnetEngine<(usize, usize)> {
    let mut engine = TelnetEngine::new(
        [
            OptionRequirement::both(TelnetOption::Echo),
            OptionRequirement::both(TelnetOption::SuppressGoAhead),
            OptionRequirement::remote(TelnetOption::NAWS),
            OptionRequirement::remote(TelnetOption::TTYPE),
        ],
        config,
        (0, 0),
    );
    engine.subscribe(|ctx, event| {
        let counters = ctx.user_data_mut();
        counters.0 += 1;
        if let TelnetEvent::Send(bytes) = event {
            counters.1 += bytes.len();
        }
    });
    engine
}

fn plain_text(size: usize) -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(size)
        .collect()
}

fn iac_heavy(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| if i % 4 == 0 { consts::IAC } else { (i % 200) as u8 + 32 })
        .collect()
}

fn escaped(bytes: &[u8]) -> Vec<u8> {
    let mut wire = Vec::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        wire.push(byte);
        if byte == consts::IAC {
            wire.push(consts::IAC);
        }
    }
    wire
}

// ============================================================================
// Decoding Benchmarks
// ============================================================================

fn bench_feed_plain_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_plain_text");

    for size in [64, 1024, 16 * 1024] {
        let input = plain_text(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            let mut engine = counting_engine(EngineConfig::default());
            b.iter(|| engine.feed(black_box(input)));
        });
    }

    group.finish();
}

fn bench_feed_escaped_iac(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_escaped_iac");

    for size in [64, 1024, 16 * 1024] {
        let input = escaped(&iac_heavy(size));
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            let mut engine = counting_engine(EngineConfig::default());
            b.iter(|| engine.feed(black_box(input)));
        });
    }

    group.finish();
}

fn bench_feed_nvt_lines(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_nvt_lines");
    let input: Vec<u8> = b"look\r\nsay hello\r\n\r\0"
        .iter()
        .copied()
        .cycle()
        .take(4096)
        .collect();
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("crlf_as_cr", |b| {
        let mut engine = counting_engine(EngineConfig::default().with_nvt_eol(true));
        b.iter(|| engine.feed(black_box(&input)));
    });

    group.bench_function("crlf_as_newline", |b| {
        let mut engine = counting_engine(
            EngineConfig::default()
                .with_nvt_eol(true)
                .with_newline_on_crlf(true),
        );
        b.iter(|| engine.feed(black_box(&input)));
    });

    group.finish();
}

fn bench_feed_negotiation(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_negotiation");
    let handshake = [
        consts::IAC, consts::DO, consts::option::ECHO,
        consts::IAC, consts::WILL, consts::option::SGA,
        consts::IAC, consts::WILL, consts::option::NAWS,
        consts::IAC, consts::WILL, consts::option::TTYPE,
        consts::IAC, consts::DO, consts::option::GMCP,
    ];

    group.bench_function("fresh_connection", |b| {
        b.iter(|| {
            let mut engine = counting_engine(EngineConfig::default());
            engine.feed(black_box(&handshake));
            engine.into_user_data()
        });
    });

    group.bench_function("repeated_requests", |b| {
        let mut engine = counting_engine(EngineConfig::default());
        engine.feed(&handshake);
        b.iter(|| engine.feed(black_box(&handshake)));
    });

    group.finish();
}

fn bench_feed_subnegotiation(c: &mut Criterion) {
    let mut group = c.benchmark_group("feed_subnegotiation");

    for size in [16, 256, 4096] {
        let mut input = vec![consts::IAC, consts::SB, consts::option::GMCP];
        input.extend(escaped(&iac_heavy(size)));
        input.extend([consts::IAC, consts::SE]);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            let mut engine = counting_engine(EngineConfig::default());
            b.iter(|| engine.feed(black_box(input)));
        });
    }

    group.finish();
}

// ============================================================================
// Sending Benchmarks
// ============================================================================

fn bench_send(c: &mut Criterion) {
    let mut group = c.benchmark_group("send");

    for size in [64, 1024, 16 * 1024] {
        let text = plain_text(size);
        let binary = iac_heavy(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("raw", size), &binary, |b, binary| {
            let mut engine = counting_engine(EngineConfig::default());
            b.iter(|| engine.send_raw(black_box(binary)));
        });

        group.bench_with_input(BenchmarkId::new("text", size), &text, |b, text| {
            let mut engine = counting_engine(EngineConfig::default());
            b.iter(|| engine.send_text(black_box(text)));
        });
    }

    group.bench_function("negotiation_request", |b| {
        let mut engine = counting_engine(EngineConfig::proxy());
        b.iter(|| engine.request_negotiation(NegotiationVerb::Will, black_box(TelnetOption::Echo)));
    });

    group.bench_function("subnegotiation", |b| {
        let mut engine = counting_engine(EngineConfig::default());
        let payload = br#"Core.Hello {"client": "bench", "version": "1.0"}"#;
        b.iter(|| engine.send_subnegotiation(TelnetOption::GMCP, black_box(payload)));
    });

    group.finish();
}

criterion_group!(
    feed_benches,
    bench_feed_plain_text,
    bench_feed_escaped_iac,
    bench_feed_nvt_lines,
    bench_feed_negotiation,
    bench_feed_subnegotiation
);

criterion_group!(send_benches, bench_send);

criterion_main!(feed_benches, send_benches);
