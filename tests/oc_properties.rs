use approx::assert_abs_diff_eq;
use rand::prelude::*;
use rand::rngs::StdRng;

use oc_curves::domain::OcPoint;
use oc_curves::report::calculate_oc;

fn random_minima(rng: &mut StdRng, n: usize, period: f64) -> Vec<f64> {
    let mut t = rng.gen_range(-50.0..50.0);
    (0..n)
        .map(|_| {
            // skip 0..3 cycles and jitter by up to 0.4 P
            t += period * rng.gen_range(0..4) as f64 + period * rng.gen_range(-0.4..0.4);
            t
        })
        .collect()
}

#[test]
fn oc_is_always_within_limit() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let period = rng.gen_range(0.1..10.0);
        let n = rng.gen_range(1..40);
        let times = random_minima(&mut rng, n, period);
        let t0 = if rng.gen_bool(0.5) {
            Some(rng.gen_range(-100.0..100.0))
        } else {
            None
        };
        let oc = calculate_oc(&times, period, t0, None).unwrap();
        assert_eq!(oc.len(), n);
        for p in &oc {
            assert!(p.oc.abs() <= 0.9 * period + 1e-9, "oc={} period={period}", p.oc);
        }
    }
}

#[test]
fn oc_does_not_depend_on_input_order() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..50 {
        let period = rng.gen_range(0.5..3.0);
        let times = random_minima(&mut rng, 25, period);
        let errors: Vec<f64> = (0..times.len()).map(|i| 0.001 * (i + 1) as f64).collect();

        let mut order: Vec<usize> = (0..times.len()).collect();
        order.shuffle(&mut rng);
        let shuffled_times: Vec<f64> = order.iter().map(|&i| times[i]).collect();
        let shuffled_errors: Vec<f64> = order.iter().map(|&i| errors[i]).collect();

        let a = calculate_oc(&times, period, None, Some(&errors)).unwrap();
        let b = calculate_oc(&shuffled_times, period, None, Some(&shuffled_errors)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn oc_times_are_ascending_and_cycles_advance() {
    let times = [10.0, 12.05, 11.02, 15.0, 13.01];
    let oc = calculate_oc(&times, 1.0, Some(10.0), None).unwrap();
    let t: Vec<f64> = oc.iter().map(|p| p.time).collect();
    assert_eq!(t, vec![10.0, 11.02, 12.05, 13.01, 15.0]);

    let expected = [0.0, 0.02, 0.05, 0.01, 0.0];
    for (p, e) in oc.iter().zip(expected) {
        assert_abs_diff_eq!(p.oc, e, epsilon = 1e-9);
    }
}

#[test]
fn linear_period_drift_shows_as_a_slope() {
    // true period 1.001 against an ephemeris of 1.0
    let times: Vec<f64> = (0..50).map(|i| 100.0 + 1.001 * i as f64).collect();
    let oc: Vec<OcPoint> = calculate_oc(&times, 1.0, None, None).unwrap();
    for (i, p) in oc.iter().enumerate() {
        assert_abs_diff_eq!(p.oc, 0.001 * i as f64, epsilon = 1e-9);
    }
}
