use approx::assert_abs_diff_eq;

use oc_curves::data::{Series, SyntheticConfig, generate_light_curve};
use oc_curves::domain::{DivergencePolicy, FitKind, MinimaConfig};
use oc_curves::error::OcError;
use oc_curves::fit::fit_minima;
use oc_curves::report::calculate_oc_for;

fn config(fit: FitKind, samplings: usize) -> MinimaConfig {
    MinimaConfig {
        fit,
        samplings,
        seed: Some(2024),
        threads: Some(2),
        ..MinimaConfig::default()
    }
}

#[test]
fn polynomial_recovers_every_minimum() {
    let curve = generate_light_curve(&SyntheticConfig::default()).unwrap();
    let result = fit_minima(&curve.series, 1.0, &config(FitKind::Poly, 200)).unwrap();

    assert_eq!(result.minima.len(), 20);
    for (found, truth) in result.minima.iter().zip(&curve.minima) {
        assert_abs_diff_eq!(found.time, *truth, epsilon = 0.01);
        assert!(found.error > 0.0 && found.error < 0.01, "error={}", found.error);
    }
    assert!(result.diverged.is_empty());

    let oc = calculate_oc_for(&result.minima, 1.0, None).unwrap();
    assert_eq!(oc.len(), 20);
    assert!(oc.iter().all(|p| p.oc.abs() < 0.02));
}

#[test]
fn errors_cover_the_truth_across_seeds() {
    let (mut covered, mut total) = (0usize, 0usize);
    for seed in 1..=5 {
        let cfg = SyntheticConfig {
            seed,
            ..SyntheticConfig::default()
        };
        let curve = generate_light_curve(&cfg).unwrap();
        let result = fit_minima(&curve.series, 1.0, &config(FitKind::Poly, 300)).unwrap();
        assert_eq!(result.minima.len(), 20, "seed {seed}");

        total += result.minima.len();
        covered += result
            .minima
            .iter()
            .zip(&curve.minima)
            .filter(|(m, truth)| (m.time - **truth).abs() <= 3.0 * m.error)
            .count();
    }
    assert!(covered * 100 >= total * 95, "covered {covered} of {total}");
}

#[test]
fn bootstrap_error_scales_with_noise() {
    let mean_error = |noise: f64| {
        let cfg = SyntheticConfig {
            noise,
            cycles: 8,
            ..SyntheticConfig::default()
        };
        let curve = generate_light_curve(&cfg).unwrap();
        let result = fit_minima(&curve.series, 1.0, &config(FitKind::Poly, 300)).unwrap();
        assert_eq!(result.minima.len(), 8);
        result.errors().iter().sum::<f64>() / 8.0
    };
    let small = mean_error(0.005);
    let large = mean_error(0.01);
    assert!(large > 1.4 * small, "small={small} large={large}");
}

/// Keeps the samples outside `(from, to)` and those inside it that `keep`
/// accepts by their position within the interval.
fn thinned(series: &Series, from: f64, to: f64, keep: impl Fn(usize, f64) -> bool) -> Series {
    let (mut t, mut y, mut e) = (Vec::new(), Vec::new(), Vec::new());
    let mut inside = 0;
    for i in 0..series.len() {
        let time = series.time()[i];
        let retained = if time > from && time < to {
            inside += 1;
            keep(inside - 1, time)
        } else {
            true
        };
        if retained {
            t.push(time);
            y.push(series.brightness()[i]);
            e.push(series.error()[i]);
        }
    }
    Series::new(&t, &y, &e).unwrap()
}

#[test]
fn sparse_cycle_is_skipped() {
    let cfg = SyntheticConfig {
        gaps: vec![(7.3, 7.7)],
        ..SyntheticConfig::default()
    };
    let curve = generate_light_curve(&cfg).unwrap();
    let result = fit_minima(&curve.series, 1.0, &config(FitKind::Poly, 50)).unwrap();

    assert_eq!(result.minima.len(), 19);
    assert!(result.minima.iter().all(|m| (m.time - 7.5).abs() > 0.5));
    assert!(result.diverged.is_empty());
}

#[test]
fn window_below_the_duty_threshold_is_skipped() {
    // pm / cadence * duty_cycle = 0.1 / 0.01 * 0.2 = 2 samples; leave one
    let curve = generate_light_curve(&SyntheticConfig::default()).unwrap();
    let series = thinned(&curve.series, 7.3, 7.7, |_, t| (t - 7.5).abs() < 0.005);
    assert_eq!(series.window(7.3, 7.7).len(), 1);

    let result = fit_minima(&series, 1.0, &config(FitKind::Poly, 50)).unwrap();
    assert_eq!(result.minima.len(), 19);
    assert!(result.minima.iter().all(|m| (m.time - 7.5).abs() > 0.5));
}

#[test]
fn window_at_the_duty_threshold_is_timed() {
    // every fourth sample: each half window holds two or three
    let curve = generate_light_curve(&SyntheticConfig::default()).unwrap();
    let series = thinned(&curve.series, 7.3, 7.7, |k, _| k % 4 == 0);
    assert!(series.window(7.4, 7.5).len() >= 2);

    let result = fit_minima(&series, 1.0, &config(FitKind::Poly, 50)).unwrap();
    assert_eq!(result.minima.len(), 20);
    assert!(result.minima.iter().any(|m| (m.time - 7.5).abs() < 0.02));
}

#[test]
fn monotonic_ramp_has_no_minima() {
    let t: Vec<f64> = (0..1000).map(|i| i as f64 * 0.01).collect();
    let y = t.clone();
    let e = vec![0.01; t.len()];
    let series = Series::new(&t, &y, &e).unwrap();

    let result = fit_minima(&series, 1.0, &config(FitKind::Poly, 20)).unwrap();
    assert!(result.minima.is_empty());
    assert!(result.epoch.is_none());
    assert!(calculate_oc_for(&result.minima, 1.0, None).unwrap().is_empty());
}

#[test]
fn nonparametric_recovers_minima() {
    let cfg = SyntheticConfig {
        noise: 0.002,
        cycles: 10,
        ..SyntheticConfig::default()
    };
    let curve = generate_light_curve(&cfg).unwrap();
    let config = MinimaConfig {
        smoothness: 3.0,
        ..config(FitKind::Nonparametric, 50)
    };
    let result = fit_minima(&curve.series, 1.0, &config).unwrap();

    assert_eq!(result.minima.len(), 10);
    for (found, truth) in result.minima.iter().zip(&curve.minima) {
        assert_abs_diff_eq!(found.time, *truth, epsilon = 0.01);
    }
}

#[test]
fn template_recovers_minima() {
    let cfg = SyntheticConfig {
        noise: 0.002,
        cycles: 10,
        ..SyntheticConfig::default()
    };
    let curve = generate_light_curve(&cfg).unwrap();
    let result = fit_minima(&curve.series, 1.0, &config(FitKind::Template, 50)).unwrap();

    assert_eq!(result.minima.len(), 10);
    for (found, truth) in result.minima.iter().zip(&curve.minima) {
        assert_abs_diff_eq!(found.time, *truth, epsilon = 0.01);
        assert!(found.error >= 0.0);
    }
}

#[test]
fn results_do_not_depend_on_thread_count() {
    let cfg = SyntheticConfig {
        cycles: 5,
        ..SyntheticConfig::default()
    };
    let curve = generate_light_curve(&cfg).unwrap();
    let one = fit_minima(
        &curve.series,
        1.0,
        &MinimaConfig {
            threads: Some(1),
            ..config(FitKind::Poly, 100)
        },
    )
    .unwrap();
    let four = fit_minima(
        &curve.series,
        1.0,
        &MinimaConfig {
            threads: Some(4),
            ..config(FitKind::Poly, 100)
        },
    )
    .unwrap();
    assert_eq!(one, four);
}

/// Doubles every sample inside `(from, to)`; a kernel window there has a
/// median spacing of zero.
fn with_duplicated_rows(series: &Series, from: f64, to: f64) -> Series {
    let (mut t, mut y, mut e) = (Vec::new(), Vec::new(), Vec::new());
    for i in 0..series.len() {
        let copies = if series.time()[i] > from && series.time()[i] < to { 2 } else { 1 };
        for _ in 0..copies {
            t.push(series.time()[i]);
            y.push(series.brightness()[i]);
            e.push(series.error()[i]);
        }
    }
    Series::new(&t, &y, &e).unwrap()
}

#[test]
fn divergence_policy_controls_degenerate_cycles() {
    let cfg = SyntheticConfig {
        noise: 0.0,
        cycles: 8,
        ..SyntheticConfig::default()
    };
    let curve = generate_light_curve(&cfg).unwrap();
    let series = with_duplicated_rows(&curve.series, 4.3, 4.7);

    let abort = config(FitKind::Nonparametric, 10);
    let err = fit_minima(&series, 1.0, &abort).unwrap_err();
    match &err {
        OcError::FitDivergence(d) => {
            assert_eq!(d.cycle, 5);
            assert_abs_diff_eq!(d.time, 4.5, epsilon = 0.01);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.exit_code(), 4);

    let skip = MinimaConfig {
        on_divergence: DivergencePolicy::Skip,
        ..abort
    };
    let result = fit_minima(&series, 1.0, &skip).unwrap();
    assert_eq!(result.minima.len(), 7);
    assert_eq!(result.diverged.len(), 1);
    assert_eq!(result.diverged[0].cycle, 5);
}
