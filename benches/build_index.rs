use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use clustercen::catalog::{ClusterRecord, MemberRecord};
use clustercen::conversion::round_to_decimals;
use clustercen::membership::identity::build_identity_map;
use clustercen::membership::index::build_membership_index;

/// `n_clusters` clusters with `members_per_cluster` contiguous member rows each.
///
/// Every third cluster carries a +0.001 redshift drift in its member rows so that the
/// fallback keys are exercised.
fn synthetic_catalogs(
    n_clusters: usize,
    members_per_cluster: usize,
) -> (Vec<ClusterRecord>, Vec<MemberRecord>) {
    let clusters: Vec<ClusterRecord> = (0..n_clusters)
        .map(|i| {
            let ra = (i as f64 * 0.137) % 360.0;
            let dec = -60.0 + (i as f64 * 0.071) % 120.0;
            let z = 0.05 + (i % 600) as f64 * 0.001 + 0.0002;
            ClusterRecord::new(format!("RM-{i:06}"), ra, dec, z)
        })
        .collect();

    let members = clusters
        .iter()
        .enumerate()
        .flat_map(|(i, c)| {
            let drift = if i % 3 == 0 { 0.001 } else { 0.0 };
            let z = round_to_decimals(c.redshift + drift, 3);
            (0..members_per_cluster).map(move |k| MemberRecord {
                cluster_ra: c.ra,
                cluster_dec: c.dec,
                cluster_redshift: z,
                ra: c.ra + k as f64 * 1e-4,
                dec: c.dec - k as f64 * 1e-4,
                probability: (k % 100) as f64 / 100.0,
            })
        })
        .collect();

    (clusters, members)
}

fn bench_build_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_membership_index");
    for &n_clusters in &[1_000usize, 10_000] {
        let (clusters, members) = synthetic_catalogs(n_clusters, 40);
        let identity = build_identity_map(&clusters);

        group.bench_with_input(
            BenchmarkId::from_parameter(n_clusters),
            &members,
            |b, members| {
                b.iter(|| build_membership_index(black_box(members), black_box(&identity)).unwrap())
            },
        );
    }
    group.finish();
}

fn bench_identity_map(c: &mut Criterion) {
    let (clusters, _) = synthetic_catalogs(10_000, 0);
    c.bench_function("build_identity_map/10000", |b| {
        b.iter(|| build_identity_map(black_box(&clusters)))
    });
}

criterion_group!(benches, bench_build_index, bench_identity_map);
criterion_main!(benches);
