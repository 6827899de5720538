//! Demonstration of the four tail estimators on one paid pattern
//!
//! - Constant tail split over the run-off with decay
//! - Exponential and inverse-power curve tails
//! - Generalized Bondy tail
//! - Clark growth-curve tail, with and without truncation

use tailor::prelude::*;

/// Selected link ratios of an annual paid triangle, 12-24 through 108-120
const PAID: [f64; 9] = [2.42, 1.61, 1.29, 1.17, 1.09, 1.058, 1.031, 1.019, 1.011];

fn main() -> Result<(), TailError> {
    println!("==========================================================");
    println!("              Tailor - Tail Estimator Demo");
    println!("==========================================================\n");

    let axis = DevelopmentAxis::new(Grain::Annual, (1..=9).map(|i| f64::from(i * 12)).collect())?;
    let ldf = PatternArray::from_ldf(axis, &PAID)?;

    // Demo 1: Constant tail
    let mut constant = ConstantTail::constant(ConstantConfig {
        tail: 1.05,
        decay: 0.8,
        ..Default::default()
    })?;
    print_pattern("Constant (1.05, decay 0.8)", &constant.fit_transform(&ldf)?);

    // Demo 2: Curve tails
    for curve in [CurveKind::Exponential, CurveKind::InversePower] {
        let mut estimator = CurveTail::curve(CurveConfig {
            curve,
            ..Default::default()
        })?;
        let out = estimator.fit_transform(&ldf)?;
        println!(
            "slope: {:.4}  intercept: {:.4}",
            estimator.slope()?[[0, 0]],
            estimator.intercept()?[[0, 0]]
        );
        print_pattern(&format!("Curve ({curve})"), &out);
    }

    // Demo 3: Generalized Bondy
    let mut bondy = BondyTail::bondy(BondyConfig::new(48.0))?;
    let out = bondy.fit_transform(&ldf)?;
    println!(
        "B: {:.4}  earliest ldf: {:.4}",
        bondy.b()?[[0, 0]],
        bondy.earliest_ldf()?[[0, 0]]
    );
    print_pattern("Bondy (from 48)", &out);

    // Demo 4: Clark continuation
    let source = ClarkPattern::new(
        ldf,
        vec![GrowthCurve::LogLogistic {
            omega: 1.45,
            theta: 22.0,
        }],
    )?;
    for truncation_age in [None, Some(240.0)] {
        let mut clark = ClarkTail::clark(ClarkConfig {
            truncation_age,
            ..Default::default()
        })?;
        let label = truncation_age.map_or("Clark".to_string(), |t| format!("Clark (truncated at {t})"));
        print_pattern(&label, &clark.fit_transform(&source)?);
    }

    println!("==========================================================");
    println!("                    Demo Complete!");
    println!("==========================================================");
    Ok(())
}

fn print_pattern(title: &str, out: &TailedPattern) {
    println!("----------------------------------------------------------");
    println!("{title}");
    println!("  tail at {}: {:.5}", out.attachment.age, out.tail[[0, 0]]);
    for ((label, ldf), cdf) in out
        .ldf
        .axis()
        .labels()
        .iter()
        .zip(out.ldf.row(0, 0))
        .zip(out.cdf.row(0, 0))
    {
        println!("  {label:>10}  ldf {ldf:>8.5}  cdf {cdf:>8.5}");
    }
    println!();
}
