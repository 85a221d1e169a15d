//! Cleaned light-curve series and windowing.
//!
//! A [`Series`] is built once per run from raw `(time, brightness, error)`
//! columns:
//! - rows where any of the three values is non-finite are dropped together,
//!   so the columns stay paired
//! - time must already be ascending (duplicates are allowed); out-of-order
//!   input is rejected rather than silently re-sorted
//!
//! Windows are contiguous index ranges found by binary search, handed out
//! as borrowed [`Samples`].

use std::ops::Range;

use crate::error::OcError;
use crate::math::median_spacing;

/// Minimum number of usable rows.
const MIN_POINTS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    time: Vec<f64>,
    brightness: Vec<f64>,
    error: Vec<f64>,
    dropped: usize,
}

/// Borrowed view of a contiguous run of samples.
#[derive(Debug, Clone, Copy)]
pub struct Samples<'a> {
    pub time: &'a [f64],
    pub brightness: &'a [f64],
    pub error: &'a [f64],
}

impl Series {
    pub fn new(time: &[f64], brightness: &[f64], error: &[f64]) -> Result<Self, OcError> {
        if time.len() != brightness.len() || time.len() != error.len() {
            return Err(OcError::LengthMismatch {
                time: time.len(),
                brightness: brightness.len(),
                error: error.len(),
            });
        }

        let mut t_out = Vec::with_capacity(time.len());
        let mut y_out = Vec::with_capacity(time.len());
        let mut e_out = Vec::with_capacity(time.len());
        for ((&t, &y), &e) in time.iter().zip(brightness).zip(error) {
            if t.is_finite() && y.is_finite() && e.is_finite() {
                t_out.push(t);
                y_out.push(y);
                e_out.push(e);
            }
        }
        let dropped = time.len() - t_out.len();

        if t_out.len() < MIN_POINTS {
            return Err(OcError::InsufficientData {
                actual: t_out.len(),
                minimum: MIN_POINTS,
            });
        }
        if let Some(index) = t_out.windows(2).position(|w| w[1] < w[0]) {
            return Err(OcError::UnsortedTime {
                index: index + 1,
                previous: t_out[index],
                current: t_out[index + 1],
            });
        }

        Ok(Self {
            time: t_out,
            brightness: y_out,
            error: e_out,
            dropped,
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn brightness(&self) -> &[f64] {
        &self.brightness
    }

    pub fn error(&self) -> &[f64] {
        &self.error
    }

    /// Rows removed because they held non-finite values.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn first_time(&self) -> f64 {
        self.time[0]
    }

    pub fn last_time(&self) -> f64 {
        self.time[self.time.len() - 1]
    }

    /// Integer part of the first timestamp.
    pub fn zero_time(&self) -> f64 {
        self.first_time().floor()
    }

    /// Median spacing between consecutive samples.
    pub fn cadence(&self) -> Option<f64> {
        median_spacing(&self.time)
    }

    pub fn all(&self) -> Samples<'_> {
        self.slice(0..self.len())
    }

    /// Samples with `lower < t <= upper`.
    pub fn window(&self, lower: f64, upper: f64) -> Samples<'_> {
        self.slice(self.range(lower, upper))
    }

    /// Samples with `t < upper`.
    pub fn before(&self, upper: f64) -> Samples<'_> {
        let end = self.time.partition_point(|&t| t < upper);
        self.slice(0..end)
    }

    fn range(&self, lower: f64, upper: f64) -> Range<usize> {
        let start = self.time.partition_point(|&t| t <= lower);
        let end = self.time.partition_point(|&t| t <= upper).max(start);
        start..end
    }

    fn slice(&self, r: Range<usize>) -> Samples<'_> {
        Samples {
            time: &self.time[r.clone()],
            brightness: &self.brightness[r.clone()],
            error: &self.error[r],
        }
    }
}

impl<'a> Samples<'a> {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Number of samples with `lower < t <= upper`.
    pub fn count_between(&self, lower: f64, upper: f64) -> usize {
        let start = self.time.partition_point(|&t| t <= lower);
        let end = self.time.partition_point(|&t| t <= upper);
        end.saturating_sub(start)
    }

    /// Index of the lowest brightness sample (first on ties).
    pub fn argmin(&self) -> Option<usize> {
        self.brightness
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &y)| match best {
                Some((_, b)) if b <= y => best,
                _ => Some((i, y)),
            })
            .map(|(i, _)| i)
    }

    /// Same samples with a different brightness column.
    pub fn with_brightness<'b>(&self, brightness: &'b [f64]) -> Samples<'b>
    where
        'a: 'b,
    {
        Samples {
            time: self.time,
            brightness,
            error: self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Series {
        let t: Vec<f64> = (0..n).map(|i| 10.0 + i as f64 * 0.5).collect();
        let y: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let e = vec![0.1; n];
        Series::new(&t, &y, &e).unwrap()
    }

    #[test]
    fn non_finite_rows_are_dropped_together() {
        let t = [0.0, 1.0, f64::NAN, 3.0, 4.0];
        let y = [1.0, f64::INFINITY, 2.0, 3.0, 4.0];
        let e = [0.1, 0.1, 0.1, f64::NAN, 0.1];
        let s = Series::new(&t, &y, &e).unwrap();
        assert_eq!(s.time(), &[0.0, 4.0]);
        assert_eq!(s.brightness(), &[1.0, 4.0]);
        assert_eq!(s.error(), &[0.1, 0.1]);
        assert_eq!(s.dropped(), 3);
    }

    #[test]
    fn unsorted_time_is_rejected() {
        let err = Series::new(&[0.0, 2.0, 1.0], &[0.0; 3], &[0.1; 3]).unwrap_err();
        assert_eq!(
            err,
            OcError::UnsortedTime {
                index: 2,
                previous: 2.0,
                current: 1.0
            }
        );
    }

    #[test]
    fn duplicate_timestamps_are_accepted() {
        assert!(Series::new(&[0.0, 1.0, 1.0, 2.0], &[0.0; 4], &[0.1; 4]).is_ok());
    }

    #[test]
    fn length_mismatch_and_short_input_are_rejected() {
        assert!(matches!(
            Series::new(&[0.0, 1.0], &[0.0], &[0.1, 0.1]),
            Err(OcError::LengthMismatch { .. })
        ));
        assert!(matches!(
            Series::new(&[0.0, f64::NAN], &[0.0, 0.0], &[0.1, 0.1]),
            Err(OcError::InsufficientData { actual: 1, minimum: 2 })
        ));
    }

    #[test]
    fn window_is_open_below_closed_above() {
        let s = ramp(10); // t = 10.0, 10.5, ..., 14.5
        let w = s.window(11.0, 12.0);
        assert_eq!(w.time, &[11.5, 12.0]);
        assert_eq!(w.count_between(11.5, 12.0), 1);
        assert!(s.window(20.0, 21.0).is_empty());
        assert_eq!(s.before(11.0).time, &[10.0, 10.5]);
    }

    #[test]
    fn cadence_and_zero_time() {
        let s = ramp(5);
        assert_eq!(s.cadence(), Some(0.5));
        assert_eq!(s.zero_time(), 10.0);
        assert_eq!(s.last_time(), 12.0);
    }

    #[test]
    fn argmin_prefers_first_on_ties() {
        let s = Series::new(&[0.0, 1.0, 2.0], &[1.0, 0.0, 0.0], &[0.1; 3]).unwrap();
        assert_eq!(s.all().argmin(), Some(1));
    }
}
