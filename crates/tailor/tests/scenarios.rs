//! End-to-end tail scenarios on small development patterns.

use approx::assert_relative_eq;
use ndarray::Array3;
use rstest::rstest;
use tailor::prelude::*;

/// Link ratios of a typical paid triangle, with some noise around the decay
const PAID: [f64; 9] = [2.42, 1.61, 1.29, 1.17, 1.09, 1.058, 1.031, 1.019, 1.011];

fn annual_axis(n: usize) -> DevelopmentAxis {
    DevelopmentAxis::new(Grain::Annual, (1..=n).map(|i| (12 * i) as f64).collect()).unwrap()
}

#[test]
fn test_constant_tail_two_buckets() {
    let ldf = PatternArray::from_ldf(annual_axis(11), &[1.5; 11]).unwrap();
    let mut estimator = ConstantTail::constant(ConstantConfig {
        tail: 1.05,
        decay: 0.95,
        ..Default::default()
    })
    .unwrap();
    let out = estimator.fit_transform(&ldf).unwrap();

    let row = out.ldf.row(0, 0);
    assert_eq!(row.len(), 13);
    assert_eq!(out.ldf.axis().labels()[12], "156-Ult");

    let (penultimate, last) = (row[11], row[12]);
    assert_relative_eq!(penultimate * last, 1.05, epsilon = 1e-12);
    assert!(penultimate < last);
    assert_relative_eq!(out.tail[[0, 0]], 1.05);
}

#[rstest]
#[case(CurveKind::Exponential)]
#[case(CurveKind::InversePower)]
fn test_curve_tail_matches_extrapolated_product(#[case] curve: CurveKind) {
    // Columns 12..=108; attaching at the 120 edge is development period 10,
    // so the extrapolated links are periods 11 through 20.
    let ldf = PatternArray::from_ldf(annual_axis(9), &PAID).unwrap();
    let mut estimator = CurveTail::curve(CurveConfig {
        curve,
        attachment_age: Some(120.0),
        extrap_periods: 10,
        ..Default::default()
    })
    .unwrap();
    estimator.fit(&ldf).unwrap();

    let slope = estimator.slope().unwrap()[[0, 0]];
    let intercept = estimator.intercept().unwrap()[[0, 0]];
    assert!(slope < 0.0);

    let expected: f64 = (1..=10)
        .map(|i| {
            let x = f64::from(10 + i);
            match curve {
                CurveKind::Exponential => 1.0 + (slope * x + intercept).exp(),
                CurveKind::InversePower => 1.0 + intercept.exp() * x.powf(slope),
            }
        })
        .product();

    assert_relative_eq!(estimator.tail().unwrap()[[0, 0]], expected, epsilon = 1e-12);
}

#[test]
fn test_clark_truncation() {
    let curve = GrowthCurve::Weibull {
        omega: 1.1,
        theta: 40.0,
    };
    let ldf = PatternArray::from_ldf(annual_axis(9), &PAID).unwrap();
    let source = ClarkPattern::new(ldf, vec![curve]).unwrap();

    let mut open = ClarkTail::clark(ClarkConfig::default()).unwrap();
    let mut truncated = ClarkTail::clark(ClarkConfig {
        truncation_age: Some(245.0),
        ..Default::default()
    })
    .unwrap();

    let open_tail = open.fit_transform(&source).unwrap().tail[[0, 0]];
    let truncated_tail = truncated.fit_transform(&source).unwrap().tail[[0, 0]];
    assert!(truncated_tail < open_tail);
    assert!(truncated_tail >= 1.0);
}

#[test]
fn test_bondy_on_multi_row_pattern() {
    let keys = vec!["paid".to_string(), "incurred".to_string()];
    let origins = vec!["2019".to_string(), "2020".to_string(), "2021".to_string()];
    let values = Array3::from_shape_fn((2, 3, 9), |(k, o, j)| {
        let f0 = 1.6 + 0.1 * k as f64 + 0.05 * o as f64;
        f64::powf(f0, 0.55_f64.powi(j as i32))
    });
    let ldf = PatternArray::new(PatternKind::Incremental, keys, origins, annual_axis(9), values)
        .unwrap();

    let mut estimator = BondyTail::bondy(BondyConfig::new(12.0)).unwrap();
    let out = estimator.fit_transform(&ldf).unwrap();

    let b = estimator.b().unwrap();
    assert_eq!(b.dim(), (2, 3));
    assert!(b.iter().all(|&b| (b - 0.55).abs() < 1e-9));
    assert_relative_eq!(estimator.earliest_ldf().unwrap()[[1, 2]], 1.8, epsilon = 1e-9);

    for k in 0..2 {
        for o in 0..3 {
            let runoff: f64 = out.ldf.row(k, o).iter().skip(9).product();
            assert_relative_eq!(runoff, out.tail[[k, o]], epsilon = 1e-12);
            assert_relative_eq!(out.cdf.values()[[k, o, 9]], out.tail[[k, o]], epsilon = 1e-12);
        }
    }
}
