use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use envelope_core::config::EnvelopeConfig;
use envelope_core::crypto::{make_encryptor, SymmetricKey};
use envelope_core::headers::Method;
use envelope_core::stream::{stream_decrypt_with, stream_encrypt_with};

fn cfg() -> EnvelopeConfig {
    // Keep PBKDF2 out of the payload numbers.
    EnvelopeConfig { pbkdf2_iterations: 1, ..EnvelopeConfig::default() }
}

fn bench_gcm(c: &mut Criterion) {
    let key = SymmetricKey::from_bytes([7u8; 32]);
    let mut group = c.benchmark_group("gcm_update");
    for size in [4 * 1024, 64 * 1024, 1024 * 1024] {
        let data = vec![0xA5u8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| {
                let mut enc = make_encryptor(&key, &[1u8; 12]);
                let mut buf = data.clone();
                enc.update_in_place(&mut buf).unwrap();
                black_box(enc.finalize())
            })
        });
    }
    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let size = 4 * 1024 * 1024;
    let data = vec![0x5Au8; size];
    let envelope: Vec<u8> = stream_encrypt_with(Cursor::new(&data), "pw", Method::PasswordAesGcm, &cfg())
        .unwrap()
        .map(|c| c.unwrap())
        .flat_map(|c| c.to_vec())
        .collect();

    let mut group = c.benchmark_group("envelope");
    group.throughput(Throughput::Bytes(size as u64));
    group.sample_size(20);

    group.bench_function("encrypt_4MiB", |b| {
        b.iter(|| {
            let stream = stream_encrypt_with(Cursor::new(&data), "pw", Method::PasswordAesGcm, &cfg()).unwrap();
            black_box(stream.map(|c| c.unwrap().len()).sum::<usize>())
        })
    });

    group.bench_function("decrypt_4MiB", |b| {
        b.iter(|| {
            let stream = stream_decrypt_with(Cursor::new(&envelope), "pw", &cfg()).unwrap();
            black_box(stream.map(|c| c.unwrap().len()).sum::<usize>())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_gcm, bench_envelope);
criterion_main!(benches);
