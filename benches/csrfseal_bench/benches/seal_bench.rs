//! Sealing and verification benchmarks
//!
//! Measures the per-request cost of the cookie codec, the store, and token
//! masking.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use csrfseal::prelude::*;
use csrfseal::token;
use std::sync::Arc;

const KEY: &[u8] = b"benchmark-signing-key-0123456789";

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");
    let codec = HmacCodec::new(KEY);
    let secret = [0x5au8; 32];
    let sealed = codec.encode("csrf_token", &secret).unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| codec.encode(black_box("csrf_token"), black_box(&secret)))
    });

    group.bench_function("decode", |b| {
        b.iter(|| codec.decode(black_box("csrf_token"), black_box(&sealed)))
    });

    group.finish();
}

fn bench_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("cookie_store");
    let store = CookieStore::new(
        CookieOptions::new().name("csrf_token").max_age(3600),
        Arc::new(HmacCodec::new(KEY)),
    );
    let secret = Secret::generate();

    let mut response = HeaderMap::new();
    store.save(&secret, &mut response).unwrap();
    let set_cookie = response
        .get(http::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    let pair = set_cookie.split(';').next().unwrap();

    let mut request = HeaderMap::new();
    request.insert(
        http::header::COOKIE,
        http::HeaderValue::from_str(&format!("session=abc; theme=dark; {}", pair)).unwrap(),
    );

    group.bench_function("save", |b| {
        b.iter(|| {
            let mut response = HeaderMap::new();
            store.save(black_box(&secret), &mut response).unwrap();
            response
        })
    });

    group.bench_function("get", |b| b.iter(|| store.get(black_box(&request))));

    group.finish();
}

fn bench_masking(c: &mut Criterion) {
    let mut group = c.benchmark_group("masking");
    let secret = Secret::generate();
    let masked = token::mask(&secret);

    group.bench_function("mask", |b| b.iter(|| token::mask(black_box(&secret))));

    group.bench_function("verify", |b| {
        b.iter(|| token::verify(black_box(&secret), black_box(&masked)))
    });

    group.finish();
}

criterion_group!(benches, bench_codec, bench_store, bench_masking);
criterion_main!(benches);
