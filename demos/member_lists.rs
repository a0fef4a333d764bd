use std::env;

use camino::Utf8Path;
use clustercen::catalog::{ClusterColumns, IdSource, MemberColumns};
use clustercen::{ClusterCen, ClusterCenError, ProbabilityBounds};

/// Write the member lists of the requested clusters.
///
/// Usage:
///   member_lists <CLUSTERS> <IDS> <MEMBERS> <OUT_DIR> [--pmin P] [--pmax P] [ID ...]
/// Example:
///   RUST_LOG=info member_lists tests/data/clusters.txt tests/data/cluster_ids.txt \
///       tests/data/members.txt out --pmin 0.5 RM-0001 RM-0002
///
/// Without explicit IDs, every indexed cluster is written.
fn main() -> Result<(), ClusterCenError> {
    env_logger::init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let pmin = take_option(&mut args, "--pmin").unwrap_or(0.0);
    let pmax = take_option(&mut args, "--pmax").unwrap_or(1.0);
    if args.len() < 4 {
        eprintln!("usage: member_lists <CLUSTERS> <IDS> <MEMBERS> <OUT_DIR> [--pmin P] [--pmax P] [ID ...]");
        return Ok(());
    }

    let cc = ClusterCen::load(
        Utf8Path::new(&args[0]),
        IdSource::File(Utf8Path::new(&args[1])),
        Utf8Path::new(&args[2]),
        &ClusterColumns::default(),
        &MemberColumns::default(),
    )?;
    let out_dir = Utf8Path::new(&args[3]);
    let bounds = ProbabilityBounds::new(pmin, pmax)?;

    let requested: Vec<String> = if args.len() > 4 {
        args[4..].to_vec()
    } else {
        cc.index().ids().map(str::to_string).collect()
    };

    let results = cc.write_all(&requested, &bounds, out_dir);
    let written = results.iter().filter(|(_, r)| r.is_ok()).count();
    for (id, result) in &results {
        match result {
            Ok(path) => println!("{id}: {path}"),
            Err(err) => println!("{id}: FAILED ({err})"),
        }
    }
    println!("{written}/{} member lists written", results.len());
    Ok(())
}

/// Remove `--name value` from `args` and parse the value.
fn take_option(args: &mut Vec<String>, name: &str) -> Option<f64> {
    let pos = args.iter().position(|a| a == name)?;
    args.remove(pos);
    if pos < args.len() {
        args.remove(pos).parse().ok()
    } else {
        None
    }
}
