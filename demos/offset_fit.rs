use std::env;

use camino::Utf8Path;
use clustercen::offsets::fit::{fit_offsets, FitParams};
use clustercen::offsets::mixture::MixtureModel;
use clustercen::offsets::{classify_offsets, read_offsets, Centering, OffsetHistogram};
use clustercen::ClusterCenError;

/// Fit a Rayleigh mixture to a file of centering offsets and classify each object.
///
/// Usage:
///   offset_fit <OFFSETS> [N_RAYLEIGH] [--linear]
/// Example:
///   RUST_LOG=debug offset_fit tests/data/offsets.txt 2 --linear
fn main() -> Result<(), ClusterCenError> {
    env_logger::init();

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    let linear = if let Some(pos) = args.iter().position(|a| a == "--linear") {
        args.remove(pos);
        true
    } else {
        false
    };
    let path = args
        .first()
        .cloned()
        .unwrap_or_else(|| "tests/data/offsets.txt".to_string());
    let n_rayleigh = args.get(1).and_then(|n| n.parse().ok()).unwrap_or(1);

    let offsets = read_offsets(Utf8Path::new(&path))?;
    let values: Vec<f64> = offsets.iter().map(|o| o.offset).collect();

    let hist = OffsetHistogram::new(&values, 10, None)?;
    println!("offset histogram (Mpc, density):");
    for (center, density) in hist.centers().iter().zip(&hist.density) {
        println!("  {center:8.4}  {density:10.4}");
    }

    let model = MixtureModel::new(n_rayleigh, linear)?;
    let fit = fit_offsets(&values, &model, &FitParams::default())?;
    println!("{fit}");

    let cutoff = fit.cutoff_radius(0.9)?;
    println!("cutoff radius (90% of the narrowest component): {cutoff:.4} Mpc");
    for (name, class) in classify_offsets(&offsets, cutoff) {
        let marker = if class == Centering::WellCentered { " " } else { "*" };
        println!("{marker} {name:<12} {class}");
    }
    Ok(())
}
