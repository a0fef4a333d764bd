#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use clustercen::catalog::{ClusterColumns, IdSource, MemberColumns};
use clustercen::ClusterCen;

pub const CLUSTERS: &str = "tests/data/clusters.txt";
pub const CLUSTER_IDS: &str = "tests/data/cluster_ids.txt";
pub const MEMBERS: &str = "tests/data/members.txt";
pub const OFFSETS: &str = "tests/data/offsets.txt";

pub fn load_fixture() -> ClusterCen {
    ClusterCen::load(
        Utf8Path::new(CLUSTERS),
        IdSource::File(Utf8Path::new(CLUSTER_IDS)),
        Utf8Path::new(MEMBERS),
        &ClusterColumns::default(),
        &MemberColumns::default(),
    )
    .unwrap()
}

pub fn utf8_dir(dir: &tempfile::TempDir) -> Utf8PathBuf {
    Utf8Path::from_path(dir.path()).unwrap().to_path_buf()
}

/// Header line and `(ra, dec)` rows of a written member list.
pub fn read_member_list(path: &Utf8Path) -> (String, Vec<(f64, f64)>) {
    let content = std::fs::read_to_string(path).unwrap();
    let mut lines = content.lines();
    let header = lines.next().unwrap().to_string();
    let rows = lines
        .map(|line| {
            let (ra, dec) = line.split_once(',').unwrap();
            (ra.trim().parse().unwrap(), dec.trim().parse().unwrap())
        })
        .collect();
    (header, rows)
}
