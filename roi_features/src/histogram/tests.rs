use super::*;

const EPS: f64 = 1e-12;

fn histogram_of(values: &[PixIntens]) -> Histogram {
    let mut h = Histogram::new();
    for &v in values {
        h.add(v);
    }
    h
}

#[test]
fn test_empty_histogram_has_no_stats() {
    let h = Histogram::new();
    assert!(h.is_empty());
    assert!(h.stats().is_none());
}

#[test]
fn test_counts_are_exact() {
    let h = histogram_of(&[3, 3, 7, 3, 1000]);
    assert_eq!(h.len(), 5);
    assert_eq!(h.distinct(), 3);
    assert_eq!(h.count_of(3), 3);
    assert_eq!(h.count_of(4), 0);
}

#[test]
fn test_percentiles_interpolate_between_order_statistics() {
    let values: Vec<PixIntens> = (1..=10).collect();
    let s = histogram_of(&values).stats().unwrap();

    assert!((s.median - 5.5).abs() < EPS);
    assert!((s.p10 - 1.9).abs() < EPS);
    assert!((s.p25 - 3.25).abs() < EPS);
    assert!((s.p75 - 7.75).abs() < EPS);
    assert!((s.p90 - 9.1).abs() < EPS);
    assert!((s.iqr - 4.5).abs() < EPS);
}

#[test]
fn test_percentiles_with_repeated_values() {
    // sorted: 2 2 2 9; rank(50%) = 1.5 -> both neighbours are 2
    let s = histogram_of(&[9, 2, 2, 2]).stats().unwrap();
    assert_eq!(s.median, 2.0);
    // rank(90%) = 2.7 -> 2 + 0.7 * 7
    assert!((s.p90 - 6.9).abs() < EPS);
}

#[test]
fn test_mode_prefers_smallest_on_ties() {
    let s = histogram_of(&[8, 8, 3, 3, 5]).stats().unwrap();
    assert_eq!(s.mode, 3.0);
    let s = histogram_of(&[1, 4, 4, 4, 2, 2]).stats().unwrap();
    assert_eq!(s.mode, 4.0);
}

#[test]
fn test_entropy_and_uniformity() {
    let values: Vec<PixIntens> = (1..=10).collect();
    let s = histogram_of(&values).stats().unwrap();
    // ten distinct values land in ten distinct bins
    assert!((s.entropy - 10f64.log2()).abs() < 1e-9);
    assert!((s.uniformity - 0.1).abs() < EPS);

    let flat = histogram_of(&[42; 16]).stats().unwrap();
    assert_eq!(flat.entropy, 0.0);
    assert_eq!(flat.uniformity, 1.0);
}

#[test]
fn test_robust_mad_trims_tails() {
    let values: Vec<PixIntens> = (1..=10).collect();
    let s = histogram_of(&values).stats().unwrap();
    // [P10, P90] = [1.9, 9.1] keeps 2..=9, mean 5.5
    assert!((s.rmad - 2.0).abs() < EPS);
}

#[test]
fn test_single_value() {
    let s = histogram_of(&[17]).stats().unwrap();
    assert_eq!(s.median, 17.0);
    assert_eq!(s.p10, 17.0);
    assert_eq!(s.p90, 17.0);
    assert_eq!(s.iqr, 0.0);
    assert_eq!(s.rmad, 0.0);
    assert_eq!(s.mode, 17.0);
}
