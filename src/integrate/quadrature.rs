//! Globally adaptive Gauss–Kronrod quadrature.
//!
//! Each subinterval is integrated with the 15-point Kronrod rule and its
//! embedded 7-point Gauss rule; the interval with the largest error
//! estimate is bisected until the total error meets the tolerance or the
//! subdivision limit is reached. Nodes are strictly interior, so
//! integrands that blow up or are undefined exactly at an endpoint are
//! handled as long as they stay integrable.

use serde::{Deserialize, Serialize};

/// Kronrod abscissae on [-1, 1] (non-negative half, descending).
/// Odd indices are the Gauss nodes.
const XGK: [f64; 8] = [
    0.991455371120812639206854697526329,
    0.949107912342758524526189684047851,
    0.864864423359769072789712788640926,
    0.741531185599394439863864773280788,
    0.586087235467691130294144845693013,
    0.405845151377397166906606412076961,
    0.207784955007898467600689403773245,
    0.000000000000000000000000000000000,
];

const WGK: [f64; 8] = [
    0.022935322010529224963732008058970,
    0.063092092629978553290700663189204,
    0.104790010322250183839876322541518,
    0.140653259715525918745189590510238,
    0.169004726639267902826583426598550,
    0.190350578064785409913256402421014,
    0.204432940075298892414161999234649,
    0.209482141084727828012999174891714,
];

const WG: [f64; 4] = [
    0.129484966168869693270611432679082,
    0.279705391489276667901467771423780,
    0.381830050505118944950369775488975,
    0.417959183673469387755102040816327,
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuadratureResult {
    pub value: f64,
    /// Estimated absolute error.
    pub error: f64,
    /// Subintervals in the final partition.
    pub intervals: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrature {
    pub epsabs: f64,
    pub epsrel: f64,
    pub limit: usize,
}

impl Default for Quadrature {
    fn default() -> Self {
        Self { epsabs: 1.49e-8, epsrel: 1.49e-8, limit: 50 }
    }
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

impl Quadrature {
    pub fn new(epsabs: f64, epsrel: f64, limit: usize) -> Self {
        Self { epsabs, epsrel, limit: limit.max(1) }
    }

    /// Integrate `f` over `[a, b]`, starting from a partition split at the
    /// given interior `points` (points outside `(a, b)` are ignored).
    pub fn integrate<F>(&self, f: F, a: f64, b: f64, points: &[f64]) -> QuadratureResult
    where
        F: Fn(f64) -> f64,
    {
        let mut cuts: Vec<f64> = points.iter().copied().filter(|&p| p > a && p < b).collect();
        cuts.sort_by(f64::total_cmp);
        cuts.dedup();

        let mut bounds = Vec::with_capacity(cuts.len() + 2);
        bounds.push(a);
        bounds.extend(cuts);
        bounds.push(b);

        let mut intervals: Vec<Interval> = bounds
            .windows(2)
            .map(|w| {
                let (value, error) = kronrod15(&f, w[0], w[1]);
                Interval { a: w[0], b: w[1], value, error }
            })
            .collect();

        let limit = self.limit.max(intervals.len());
        loop {
            let (value, error) = totals(&intervals);
            let tolerance = self.epsabs.max(self.epsrel * value.abs());
            if error <= tolerance {
                return QuadratureResult { value, error, intervals: intervals.len(), converged: true };
            }
            let worst = intervals
                .iter()
                .enumerate()
                .max_by(|(_, x), (_, y)| x.error.total_cmp(&y.error))
                .map(|(k, _)| k);
            let Some(k) = worst else {
                return QuadratureResult { value, error, intervals: 0, converged: true };
            };
            let Interval { a: lo, b: hi, .. } = intervals[k];
            let mid = 0.5 * (lo + hi);
            if intervals.len() >= limit || !(mid > lo && mid < hi) {
                tracing::warn!(
                    value,
                    error,
                    tolerance,
                    intervals = intervals.len(),
                    "quadrature stopped before reaching tolerance"
                );
                return QuadratureResult { value, error, intervals: intervals.len(), converged: false };
            }
            let (left, left_err) = kronrod15(&f, lo, mid);
            let (right, right_err) = kronrod15(&f, mid, hi);
            intervals[k] = Interval { a: lo, b: mid, value: left, error: left_err };
            intervals.push(Interval { a: mid, b: hi, value: right, error: right_err });
        }
    }
}

fn totals(intervals: &[Interval]) -> (f64, f64) {
    intervals
        .iter()
        .fold((0.0, 0.0), |(v, e), i| (v + i.value, e + i.error))
}

/// 15-point Kronrod estimate on `[a, b]` and its error against the
/// embedded 7-point Gauss rule, scaled as in QUADPACK's `qk15`.
fn kronrod15<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> (f64, f64) {
    let center = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    let abs_half = half.abs();

    let fc = f(center);
    let mut res_gauss = fc * WG[3];
    let mut res_kronrod = fc * WGK[7];
    let mut res_abs = res_kronrod.abs();
    let mut fv1 = [0.0; 7];
    let mut fv2 = [0.0; 7];

    for j in 0..7 {
        let x = half * XGK[j];
        let f1 = f(center - x);
        let f2 = f(center + x);
        fv1[j] = f1;
        fv2[j] = f2;
        res_kronrod += WGK[j] * (f1 + f2);
        res_abs += WGK[j] * (f1.abs() + f2.abs());
        if j % 2 == 1 {
            res_gauss += WG[j / 2] * (f1 + f2);
        }
    }

    let mean = res_kronrod * 0.5;
    let mut res_asc = WGK[7] * (fc - mean).abs();
    for j in 0..7 {
        res_asc += WGK[j] * ((fv1[j] - mean).abs() + (fv2[j] - mean).abs());
    }

    let result = res_kronrod * half;
    res_abs *= abs_half;
    res_asc *= abs_half;
    let mut error = ((res_kronrod - res_gauss) * half).abs();
    if res_asc != 0.0 && error != 0.0 {
        error = res_asc * (200.0 * error / res_asc).powf(1.5).min(1.0);
    }
    if res_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        error = error.max(50.0 * f64::EPSILON * res_abs);
    }
    (result, error)
}
