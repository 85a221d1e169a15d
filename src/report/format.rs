//! Formatted terminal output.
//!
//! Formatting lives here so the fitting code stays free of presentation and
//! output changes stay local.

use crate::data::Series;
use crate::domain::{MinimaConfig, MinimaResult, OcPoint};

/// Dataset, configuration and detection summary of a `minima` run.
pub fn format_run_summary(series: &Series, period: f64, config: &MinimaConfig, result: &MinimaResult) -> String {
    let mut out = String::new();

    out.push_str("=== oc - eclipse minima timing ===\n");
    out.push_str(&format!(
        "Series: n={} (dropped {}) | t=[{:.5}, {:.5}]\n",
        series.len(),
        series.dropped(),
        series.first_time(),
        series.last_time(),
    ));
    out.push_str(&format!(
        "Fit: {} | period={period} | window=±{:.3}P | duty cycle={}\n",
        config.fit.display_name(),
        config.phase_interval,
        config.duty_cycle,
    ));
    out.push_str(&format!("Bootstrap: {} samplings\n", config.samplings));

    out.push_str(&format!(
        "Reference epoch: {:.6} (zero time {})\n",
        result.reference_epoch, result.zero_time
    ));
    out.push_str(&format!(
        "Minima: {} accepted over {} cycles\n",
        result.minima.len(),
        result.cycles
    ));
    for d in &result.diverged {
        out.push_str(&format!("  (diverged cycle {} near t={:.5}) {}\n", d.cycle, d.time, d.reason));
    }
    out.push('\n');

    out
}

/// Format an O-C table with one row per minimum.
pub fn format_oc_table(points: &[OcPoint]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>16} {:>12} {:>12}", "time", "O-C", "error").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<16} {:-<12} {:-<12}", "", "", "").trim_end());
    out.push('\n');

    for p in points {
        let error = p.error.map(|e| format!("{e:.6}")).unwrap_or_default();
        out.push_str(format!("{:>16.6} {:>12.6} {:>12}", p.time, p.oc, error).trim_end());
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Minimum;
    use crate::error::Divergence;

    #[test]
    fn summary_mentions_counts_and_divergences() {
        let series = Series::new(&[10.2, 10.4, 10.6], &[1.0, 0.0, 1.0], &[0.1; 3]).unwrap();
        let result = MinimaResult {
            minima: vec![Minimum { time: 10.4, error: 0.001 }],
            zero_time: 10.0,
            reference_epoch: 10.4,
            epoch: Some(0.4),
            cycles: 2,
            diverged: vec![Divergence {
                cycle: 2,
                time: 10.9,
                reason: "kernel fit needs at least two samples".to_string(),
            }],
        };
        let text = format_run_summary(&series, 0.5, &MinimaConfig::default(), &result);
        assert!(text.contains("Series: n=3 (dropped 0)"));
        assert!(text.contains("Minima: 1 accepted over 2 cycles"));
        assert!(text.contains("diverged cycle 2"));
        assert!(text.contains("Fit: poly"));
    }

    #[test]
    fn oc_table_layout() {
        let points = [
            OcPoint {
                time: 2457000.5,
                oc: 0.0,
                error: Some(0.0012),
            },
            OcPoint {
                time: 2457001.51,
                oc: 0.01,
                error: None,
            },
        ];
        let table = format_oc_table(&points);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "            time          O-C        error");
        assert_eq!(lines[2], "  2457000.500000     0.000000     0.001200");
        assert_eq!(lines[3], "  2457001.510000     0.010000");
    }
}
