//! Revision coefficients by ordinary least squares.
//!
//! Regresses forecast errors on a constant and forecast revisions,
//! `error = a + b * revision + e`, solving the normal equations
//! `beta = (X'X)^{-1} X'y` on an ndarray design matrix.

use crate::{FireError, Result};
use ndarray::{Array1, Array2, array};

/// Relative tolerance below which the normal equations count as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Full fit of `error` on `[1, revision]`.
///
/// A degenerate sample (fewer than two usable pairs, or revisions without
/// variation) yields NaN in every estimated field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevisionFit {
    /// Constant term
    pub intercept: f64,
    /// Revision coefficient
    pub slope: f64,
    /// Classical standard error of the slope
    pub slope_std_error: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Number of pairs used
    pub n: usize,
}

impl RevisionFit {
    const fn degenerate(n: usize) -> Self {
        Self {
            intercept: f64::NAN,
            slope: f64::NAN,
            slope_std_error: f64::NAN,
            r_squared: f64::NAN,
            n,
        }
    }

    /// Whether the regression could not be estimated.
    pub fn is_degenerate(&self) -> bool {
        self.slope.is_nan()
    }
}

/// OLS slope of `error` on `[1, revision]`.
///
/// NaN when the regression is degenerate; see [`fit_revision`].
pub fn revision_coefficient(revision: &[f64], error: &[f64]) -> Result<f64> {
    Ok(fit_revision(revision, error)?.slope)
}

/// OLS of `error` on `[1, revision]`.
///
/// Pairs with a non-finite side are skipped. Fails only when the two
/// slices differ in length.
pub fn fit_revision(revision: &[f64], error: &[f64]) -> Result<RevisionFit> {
    if revision.len() != error.len() {
        return Err(FireError::ShapeMismatch {
            expected: (revision.len(), 2),
            actual: (error.len(), 1),
        });
    }

    let pairs: Vec<(f64, f64)> = revision
        .iter()
        .zip(error)
        .map(|(x, y)| (*x, *y))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let n = pairs.len();
    if n < 2 {
        return Ok(RevisionFit::degenerate(n));
    }

    let mut x = Array2::<f64>::ones((n, 2));
    let mut y = Array1::<f64>::zeros(n);
    for (i, (revision, error)) in pairs.iter().enumerate() {
        x[[i, 1]] = *revision;
        y[i] = *error;
    }

    let xtx = x.t().dot(&x);
    let xty = x.t().dot(&y);
    let det = xtx[[0, 0]] * xtx[[1, 1]] - xtx[[0, 1]] * xtx[[1, 0]];
    if det.abs() <= SINGULAR_TOLERANCE * xtx[[0, 0]] * xtx[[1, 1]] || !det.is_finite() {
        return Ok(RevisionFit::degenerate(n));
    }

    let inverse = array![
        [xtx[[1, 1]] / det, -xtx[[0, 1]] / det],
        [-xtx[[1, 0]] / det, xtx[[0, 0]] / det],
    ];
    let beta = inverse.dot(&xty);

    let residuals = &y - &x.dot(&beta);
    let sse = residuals.dot(&residuals);
    let mean = y.mean().unwrap_or(f64::NAN);
    let sst: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();

    let slope_std_error = if n > 2 {
        (sse / (n - 2) as f64 * inverse[[1, 1]]).sqrt()
    } else {
        f64::NAN
    };
    let r_squared = if sst > 0.0 { 1.0 - sse / sst } else { f64::NAN };

    Ok(RevisionFit {
        intercept: beta[0],
        slope: beta[1],
        slope_std_error,
        r_squared,
        n,
    })
}
