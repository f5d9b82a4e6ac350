//! # Beacon Storage Benchmarks
//!
//! - Beacon write: ID allocation, hash write and geo insert
//! - Thread read: beacon plus N comments (N+1 reads)
//! - Radius query against a populated geo index
//! - Vote round trip: heart then unheart

use beacon_storage::test_utils::{
    make_new_beacon, make_new_comment, make_test_service, offset_by_km, TestService, ORIGIN,
};
use beacon_storage::{BeaconStorageApi, StorageConfig};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::time::Duration;

fn service() -> TestService {
    make_test_service(StorageConfig::test()).0
}

pub fn bench_add_beacon(c: &mut Criterion) {
    let mut group = c.benchmark_group("beacon-storage-write");
    group.measurement_time(Duration::from_secs(5));

    let service = service();
    let mut rng = rand::thread_rng();
    group.throughput(Throughput::Elements(1));
    group.bench_function("add_beacon", |b| {
        b.iter(|| {
            let at = offset_by_km(ORIGIN, rng.gen_range(-20.0..20.0), rng.gen_range(-20.0..20.0));
            black_box(service.add_beacon(make_new_beacon(1, at)).unwrap())
        })
    });

    group.finish();
}

pub fn bench_get_thread(c: &mut Criterion) {
    let mut group = c.benchmark_group("beacon-storage-thread");

    for comments in [0usize, 10, 100] {
        let service = service();
        let beacon = service.add_beacon(make_new_beacon(1, ORIGIN)).unwrap();
        for i in 0..comments {
            service
                .add_comment(make_new_comment(beacon, i as u64, "benchmark comment"))
                .unwrap();
        }

        group.throughput(Throughput::Elements(comments as u64 + 1));
        group.bench_with_input(
            BenchmarkId::new("get_thread", comments),
            &beacon,
            |b, &beacon| b.iter(|| black_box(service.get_thread(beacon).unwrap())),
        );
    }

    group.finish();
}

pub fn bench_radius_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("beacon-storage-geo");

    let service = service();
    let mut rng = rand::thread_rng();
    for _ in 0..1_000 {
        let at = offset_by_km(ORIGIN, rng.gen_range(-50.0..50.0), rng.gen_range(-50.0..50.0));
        service.add_beacon(make_new_beacon(1, at)).unwrap();
    }

    for radius_miles in [1.0, 10.0] {
        group.bench_with_input(
            BenchmarkId::new("beacons_within", radius_miles),
            &radius_miles,
            |b, &radius| b.iter(|| black_box(service.beacons_within(ORIGIN, radius).unwrap())),
        );
    }

    group.finish();
}

pub fn bench_vote_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("beacon-storage-votes");

    let service = service();
    let beacon = service.add_beacon(make_new_beacon(1, ORIGIN)).unwrap();
    group.bench_function("heart_unheart", |b| {
        b.iter(|| {
            service.heart(beacon, 7).unwrap();
            service.unheart(beacon, 7).unwrap();
        })
    });

    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_add_beacon(c);
    bench_get_thread(c);
    bench_radius_query(c);
    bench_vote_round_trip(c);
}
