//! Time-varying boundary condition lookups: `f(t)` built either from a
//! constant or from a periodic cubic spline over a table of `(t, value)`
//! knots.

use crate::linalg::{Mat64, Vec64};
use std::fmt;

/// A table-driven time series was malformed in a way the caller must fix
/// before a simulation can start.
#[derive(Debug, Clone)]
pub enum BcTableError {
    /// Fewer than 2 knots were supplied.
    TooFewPoints,
    /// `time` and `values` had different lengths.
    LengthMismatch { time_len: usize, value_len: usize },
    /// Periodic splines require `values[0] == values[last]`.
    NotPeriodic { first: f64, last: f64 },
    /// Knot times must be strictly increasing.
    NonMonotonicTime { index: usize },
}

impl fmt::Display for BcTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BcTableError::TooFewPoints => write!(f, "a boundary condition table needs at least 2 points"),
            BcTableError::LengthMismatch { time_len, value_len } => write!(
                f,
                "time series length {} does not match value series length {}",
                time_len, value_len
            ),
            BcTableError::NotPeriodic { first, last } => write!(
                f,
                "periodic boundary condition table must start and end at the same value (got {} and {})",
                first, last
            ),
            BcTableError::NonMonotonicTime { index } => write!(
                f,
                "boundary condition time series is not strictly increasing at index {}",
                index
            ),
        }
    }
}

impl std::error::Error for BcTableError {}

/// A periodic cubic spline through knots `(time[i], value[i])`, matched
/// at the endpoints so the interpolant is C1-periodic over
/// `time[last] - time[0]`.
#[derive(Debug, Clone)]
pub struct PeriodicCubicSpline {
    /// Knot times, `time[0]..time[m-1]`, strictly increasing, one period's worth.
    time: Vec<f64>,
    /// Knot values, same length as `time`; `value[0] == value[m-1]` was checked at construction.
    value: Vec<f64>,
    /// Second derivatives at each knot, periodic (`second_deriv[0] == second_deriv[m-1]`).
    second_deriv: Vec<f64>,
    period: f64,
}

impl PeriodicCubicSpline {
    /// Builds a periodic cubic spline from a time series. `time` and
    /// `values` must have equal length >= 2 and `values[0] == values[last]`.
    pub fn new(time: &[f64], values: &[f64]) -> Result<Self, BcTableError> {
        if time.len() < 2 {
            return Err(BcTableError::TooFewPoints);
        }
        if time.len() != values.len() {
            return Err(BcTableError::LengthMismatch {
                time_len: time.len(),
                value_len: values.len(),
            });
        }
        for i in 1..time.len() {
            if time[i] <= time[i - 1] {
                return Err(BcTableError::NonMonotonicTime { index: i });
            }
        }
        let first = values[0];
        let last = *values.last().unwrap();
        if (first - last).abs() > 1e-12 * first.abs().max(1.0) {
            return Err(BcTableError::NotPeriodic { first, last });
        }

        let period = time[time.len() - 1] - time[0];
        // The last knot duplicates the first (value[0] == value[m-1]), so the
        // independent periodic point set is time[0..m-1].
        let m = time.len() - 1;
        let t = &time[..m];
        let y = &values[..m];

        let second_deriv = solve_periodic_second_derivatives(t, y, period);

        Ok(Self {
            time: t.to_vec(),
            value: y.to_vec(),
            second_deriv,
            period,
        })
    }

    /// Evaluates the spline at an arbitrary time, wrapping into one period.
    pub fn eval(&self, t: f64) -> f64 {
        let m = self.time.len();
        let t0 = self.time[0];
        let mut tau = (t - t0) % self.period;
        if tau < 0.0 {
            tau += self.period;
        }
        tau += t0;

        // Locate the segment i such that time[i] <= tau < time[i+1] (last
        // segment wraps to time[0] + period).
        let mut i = match self.time.partition_point(|&x| x <= tau) {
            0 => 0,
            k => k - 1,
        };
        if i >= m {
            i = m - 1;
        }
        let i_next = (i + 1) % m;

        let t_i = self.time[i];
        let t_next = if i_next == 0 { self.time[0] + self.period } else { self.time[i_next] };
        let h = t_next - t_i;

        let y_i = self.value[i];
        let y_next = self.value[i_next];
        let m_i = self.second_deriv[i];
        let m_next = self.second_deriv[i_next];

        let a = (t_next - tau) / h;
        let b = (tau - t_i) / h;

        a * y_i
            + b * y_next
            + ((a.powi(3) - a) * m_i + (b.powi(3) - b) * m_next) * (h * h) / 6.0
    }

    /// Derivative of the interpolant with respect to time, at an
    /// arbitrary time (wrapping into one period).
    pub fn eval_derivative(&self, t: f64) -> f64 {
        let m = self.time.len();
        let t0 = self.time[0];
        let mut tau = (t - t0) % self.period;
        if tau < 0.0 {
            tau += self.period;
        }
        tau += t0;

        let mut i = match self.time.partition_point(|&x| x <= tau) {
            0 => 0,
            k => k - 1,
        };
        if i >= m {
            i = m - 1;
        }
        let i_next = (i + 1) % m;

        let t_i = self.time[i];
        let t_next = if i_next == 0 { self.time[0] + self.period } else { self.time[i_next] };
        let h = t_next - t_i;

        let y_i = self.value[i];
        let y_next = self.value[i_next];
        let m_i = self.second_deriv[i];
        let m_next = self.second_deriv[i_next];

        let a = (t_next - tau) / h;
        let b = (tau - t_i) / h;

        (y_next - y_i) / h + (h / 6.0) * (-(3.0 * a * a - 1.0) * m_i + (3.0 * b * b - 1.0) * m_next)
    }
}

/// Solves the cyclic tridiagonal system for periodic cubic spline
/// second derivatives at each of the `m` periodic knots.
fn solve_periodic_second_derivatives(t: &[f64], y: &[f64], period: f64) -> Vec<f64> {
    let m = t.len();
    if m == 1 {
        return vec![0.0];
    }

    let h = |i: usize| -> f64 {
        if i + 1 < m {
            t[i + 1] - t[i]
        } else {
            (t[0] + period) - t[m - 1]
        }
    };
    let y_next = |i: usize| -> f64 { y[(i + 1) % m] };

    let mut a = Mat64::zeros(m, m);
    let mut rhs = Vec64::zeros(m);
    for i in 0..m {
        let i_prev = (i + m - 1) % m;
        let h_prev = h(i_prev);
        let h_i = h(i);
        a[(i, i_prev)] += h_prev;
        a[(i, i)] += 2.0 * (h_prev + h_i);
        a[(i, (i + 1) % m)] += h_i;
        rhs[i] = 6.0 * ((y_next(i) - y[i]) / h_i - (y[i] - y_next(i_prev)) / h_prev);
    }

    match a.clone().lu().solve(&rhs) {
        Some(sol) => sol.iter().copied().collect(),
        // A periodic spline's cyclic system is diagonally dominant for any
        // valid (strictly increasing) knot spacing, so this only triggers
        // on malformed input that already failed validation upstream.
        None => vec![0.0; m],
    }
}

/// A time-varying scalar boundary input, `f(t)`.
#[derive(Debug, Clone)]
pub enum BcValueFn {
    Constant(f64),
    Periodic(PeriodicCubicSpline),
}

impl BcValueFn {
    /// Builds a `BcValueFn` from a table. Two knots with equal values
    /// collapse to a constant; three or more require a periodic spline.
    pub fn from_table(time: &[f64], values: &[f64]) -> Result<Self, BcTableError> {
        if time.len() == 2 && (values[0] - values[1]).abs() <= 1e-12 * values[0].abs().max(1.0) {
            return Ok(BcValueFn::Constant(values[0]));
        }
        Ok(BcValueFn::Periodic(PeriodicCubicSpline::new(time, values)?))
    }

    pub fn constant(value: f64) -> Self {
        BcValueFn::Constant(value)
    }

    pub fn eval(&self, t: f64) -> f64 {
        match self {
            BcValueFn::Constant(v) => *v,
            BcValueFn::Periodic(spline) => spline.eval(t),
        }
    }

    /// Time derivative of the lookup; zero for a constant value.
    pub fn eval_derivative(&self, t: f64) -> f64 {
        match self {
            BcValueFn::Constant(_) => 0.0,
            BcValueFn::Periodic(spline) => spline.eval_derivative(t),
        }
    }

    /// Mean value over the underlying table (or the constant itself).
    /// Used by the steady-BC prelude (SPEC_FULL.md §4.5) to collapse an
    /// unsteady input to its cycle mean.
    pub fn mean_value(&self, samples: usize) -> f64 {
        match self {
            BcValueFn::Constant(v) => *v,
            BcValueFn::Periodic(spline) => {
                let n = samples.max(2);
                let t0 = spline.time[0];
                let period = spline.period;
                let mut sum = 0.0;
                for k in 0..n {
                    let t = t0 + period * (k as f64) / (n as f64);
                    sum += spline.eval(t);
                }
                sum / n as f64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_equal_knots_collapse_to_constant() {
        let f = BcValueFn::from_table(&[0.0, 1.0], &[5.0, 5.0]).unwrap();
        assert!(matches!(f, BcValueFn::Constant(_)));
        assert_eq!(f.eval(0.3), 5.0);
        assert_eq!(f.mean_value(10), 5.0);
    }

    #[test]
    fn rejects_non_periodic_table() {
        let err = BcValueFn::from_table(&[0.0, 0.5, 1.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, BcTableError::NotPeriodic { .. }));
    }

    #[test]
    fn rejects_non_monotonic_time() {
        let err = BcValueFn::from_table(&[0.0, 1.0, 0.5], &[1.0, 2.0, 1.0]).unwrap_err();
        assert!(matches!(err, BcTableError::NonMonotonicTime { .. }));
    }

    #[test]
    fn spline_interpolates_knots_exactly() {
        let time = vec![0.0, 0.25, 0.5, 0.75, 1.0];
        let values = vec![0.0, 1.0, 0.0, -1.0, 0.0];
        let f = BcValueFn::from_table(&time, &values).unwrap();
        for (t, v) in time.iter().zip(values.iter()) {
            let got = f.eval(*t);
            assert!((got - v).abs() < 1e-8, "t={t} expected={v} got={got}");
        }
    }

    #[test]
    fn spline_wraps_periodically() {
        let time = vec![0.0, 0.25, 0.5, 0.75, 1.0];
        let values = vec![0.0, 1.0, 0.0, -1.0, 0.0];
        let f = BcValueFn::from_table(&time, &values).unwrap();
        let at_half = f.eval(0.25);
        let one_period_later = f.eval(1.25);
        assert!((at_half - one_period_later).abs() < 1e-8);
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let n = 60;
        let time: Vec<f64> = (0..=n).map(|i| i as f64 / n as f64).collect();
        let values: Vec<f64> = time.iter().map(|t| (2.0 * std::f64::consts::PI * t).sin()).collect();
        let f = BcValueFn::from_table(&time, &values).unwrap();
        let t = 0.37;
        let h = 1e-5;
        let fd = (f.eval(t + h) - f.eval(t - h)) / (2.0 * h);
        let analytic = f.eval_derivative(t);
        assert!((fd - analytic).abs() < 1e-3, "fd={fd} analytic={analytic}");
    }

    #[test]
    fn sine_like_table_has_zero_mean() {
        let n = 40;
        let time: Vec<f64> = (0..=n).map(|i| i as f64 / n as f64).collect();
        let values: Vec<f64> = time.iter().map(|t| (2.0 * std::f64::consts::PI * t).sin()).collect();
        let f = BcValueFn::from_table(&time, &values).unwrap();
        assert!(f.mean_value(400).abs() < 1e-3);
    }
}
