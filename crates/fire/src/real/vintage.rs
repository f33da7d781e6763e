//! Observation × vintage matrices.
//!
//! Row `i` holds successive releases of the observation for period
//! `observations[i]`; column `j` is the data set published at
//! `vintages[j]`. NaN marks a value that had not been released yet.

use crate::{FireError, Result, period::Period};
use ndarray::Array2;
use std::collections::HashMap;

/// Real-time data for one variable.
#[derive(Debug, Clone)]
pub struct VintageMatrix {
    observations: Vec<Period>,
    vintages: Vec<Period>,
    values: Array2<f64>,
    row_index: HashMap<Period, usize>,
    column_index: HashMap<Period, usize>,
}

impl VintageMatrix {
    /// Create a matrix from labelled values.
    ///
    /// Labels must be strictly increasing and share one frequency per axis;
    /// `values` must be `observations.len() × vintages.len()`.
    pub fn new(observations: Vec<Period>, vintages: Vec<Period>, values: Array2<f64>) -> Result<Self> {
        let expected = (observations.len(), vintages.len());
        if values.dim() != expected {
            return Err(FireError::ShapeMismatch {
                expected,
                actual: values.dim(),
            });
        }
        check_labels(&observations, "observation")?;
        check_labels(&vintages, "vintage")?;

        let row_index = observations.iter().enumerate().map(|(i, p)| (*p, i)).collect();
        let column_index = vintages.iter().enumerate().map(|(j, p)| (*p, j)).collect();

        Ok(Self {
            observations,
            vintages,
            values,
            row_index,
            column_index,
        })
    }

    /// Create a matrix from `(observation, vintage, value)` cells.
    ///
    /// Cells not listed stay NaN. Cells outside the labels are ignored.
    pub fn from_cells(
        observations: Vec<Period>,
        vintages: Vec<Period>,
        cells: impl IntoIterator<Item = (Period, Period, f64)>,
    ) -> Result<Self> {
        let values = Array2::from_elem((observations.len(), vintages.len()), f64::NAN);
        let mut matrix = Self::new(observations, vintages, values)?;
        for (observation, vintage, value) in cells {
            if let (Some(&i), Some(&j)) = (
                matrix.row_index.get(&observation),
                matrix.column_index.get(&vintage),
            ) {
                matrix.values[[i, j]] = value;
            }
        }
        Ok(matrix)
    }

    /// Value of `observation` in the `vintage` release, NaN if absent.
    pub fn get(&self, observation: Period, vintage: Period) -> f64 {
        match (
            self.row_index.get(&observation),
            self.column_index.get(&vintage),
        ) {
            (Some(&i), Some(&j)) => self.values[[i, j]],
            _ => f64::NAN,
        }
    }

    /// Mean of several observations in one release, skipping NaN.
    ///
    /// NaN when none of them is available.
    pub fn mean_at(&self, observations: &[Period], vintage: Period) -> f64 {
        let (sum, count) = observations
            .iter()
            .map(|&p| self.get(p, vintage))
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }

    /// Observation periods in order.
    pub fn observations(&self) -> &[Period] {
        &self.observations
    }

    /// Vintage periods in order.
    pub fn vintages(&self) -> &[Period] {
        &self.vintages
    }

    /// The underlying values.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }
}

fn check_labels(labels: &[Period], axis: &str) -> Result<()> {
    if let Some(first) = labels.first() {
        if labels.iter().any(|p| p.frequency() != first.frequency()) {
            return Err(FireError::InvalidPeriod(format!(
                "{axis} labels mix frequencies"
            )));
        }
    }
    if labels.windows(2).any(|w| w[0] >= w[1]) {
        return Err(FireError::InvalidPeriod(format!(
            "{axis} labels must be strictly increasing"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn p(s: &str) -> Period {
        s.parse().unwrap()
    }

    #[test]
    fn test_lookup() {
        let matrix = VintageMatrix::new(
            vec![p("2000Q1"), p("2000Q2")],
            vec![p("2000Q2"), p("2000Q3")],
            array![[100.0, 101.0], [f64::NAN, 102.0]],
        )
        .unwrap();

        assert_relative_eq!(matrix.get(p("2000Q1"), p("2000Q3")), 101.0);
        assert!(matrix.get(p("2000Q2"), p("2000Q2")).is_nan());
        assert!(matrix.get(p("1999Q4"), p("2000Q2")).is_nan());
    }

    #[test]
    fn test_shape_mismatch() {
        let result = VintageMatrix::new(
            vec![p("2000Q1")],
            vec![p("2000Q2"), p("2000Q3")],
            array![[1.0], [2.0]],
        );
        assert!(matches!(
            result,
            Err(FireError::ShapeMismatch {
                expected: (1, 2),
                actual: (2, 1)
            })
        ));
    }

    #[test]
    fn test_rejects_unsorted_labels() {
        let result = VintageMatrix::from_cells(vec![p("2000Q2"), p("2000Q1")], vec![p("2000Q3")], []);
        assert!(matches!(result, Err(FireError::InvalidPeriod(_))));
    }

    #[test]
    fn test_mean_skips_missing() {
        let months = vec![p("2000-01"), p("2000-02"), p("2000-03")];
        let vintage = p("2000-04");
        let matrix = VintageMatrix::from_cells(
            months.clone(),
            vec![vintage],
            [(months[0], vintage, 1.0), (months[2], vintage, 3.0)],
        )
        .unwrap();

        assert_relative_eq!(matrix.mean_at(&months, vintage), 2.0);
        assert!(matrix.mean_at(&[months[1]], vintage).is_nan());
    }
}
