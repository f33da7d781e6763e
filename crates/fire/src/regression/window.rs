//! Rolling windows over a FIRE panel.
//!
//! Rows are sorted once into an arena; a [`Window`] borrows the contiguous
//! slice of rows whose period falls inside its [`WindowSpan`].
//!
//! With the panel covering the calendar range `[start, end]`
//! (`L = end - start + 1` periods, gaps included) and window size `W`, the
//! generator yields `max(L - W, 0)` windows; window `k` covers
//! `[start + k, start + k + W - 1]`.

use super::{beta::BetaRecord, ols::revision_coefficient};
use crate::{Result, fire::FireRow, period::Period};
use std::fmt;
use std::iter::FusedIterator;

/// Closed range of periods covered by a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowSpan {
    /// First period
    pub start: Period,
    /// Last period; keys the window's beta record
    pub end: Period,
}

impl WindowSpan {
    /// Whether `period` falls inside the span.
    pub fn contains(&self, period: Period) -> bool {
        self.start <= period && period <= self.end
    }

    /// All `max(L - W, 0)` spans of `window_size` periods over
    /// `[start, end]`.
    pub fn all(start: Period, end: Period, window_size: usize) -> Vec<Self> {
        let count = window_count(start, end, window_size);
        let last_offset = window_size as i32 - 1;
        (0..count as i32)
            .map(|k| Self {
                start: start.add(k),
                end: start.add(k + last_offset),
            })
            .collect()
    }
}

impl fmt::Display for WindowSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

fn window_count(start: Period, end: Period, window_size: usize) -> usize {
    let length = end.offset_from(start).map_or(0, |offset| offset as i64 + 1);
    (length - window_size as i64).max(0) as usize
}

/// Paired `(revision, error)` observations for one regression.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    /// Regressor
    pub revision: Vec<f64>,
    /// Regressand
    pub error: Vec<f64>,
}

impl Sample {
    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.revision.len()
    }

    /// Whether the sample holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.revision.is_empty()
    }

    /// OLS slope of error on revision.
    pub fn coefficient(&self) -> Result<f64> {
        revision_coefficient(&self.revision, &self.error)
    }
}

impl FromIterator<(f64, f64)> for Sample {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        let (revision, error) = iter.into_iter().unzip();
        Self { revision, error }
    }
}

/// A borrowed view of the rows inside one span.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    span: WindowSpan,
    rows: &'a [FireRow],
}

impl<'a> Window<'a> {
    /// The covered span.
    pub const fn span(&self) -> WindowSpan {
        self.span
    }

    /// Rows inside the span, sorted by (period, id).
    pub const fn rows(&self) -> &'a [FireRow] {
        self.rows
    }

    /// Individual errors and revisions.
    pub fn individual(&self) -> Sample {
        self.rows.iter().map(|r| (r.revision, r.error)).collect()
    }

    /// Idiosyncratic errors and revisions.
    pub fn idiosyncratic(&self) -> Sample {
        self.rows
            .iter()
            .map(|r| (r.revision_idio, r.error_idio))
            .collect()
    }

    /// Consensus errors and revisions, one pair per period.
    pub fn consensus(&self) -> Sample {
        self.rows
            .chunk_by(|a, b| a.period == b.period)
            .map(|group| (group[0].revision_mean, group[0].error_mean))
            .collect()
    }

    /// Revision coefficients of the three samples, keyed by the span end.
    pub fn beta(&self) -> Result<BetaRecord> {
        Ok(BetaRecord::new(
            self.span.end,
            self.consensus().coefficient()?,
            self.individual().coefficient()?,
            self.idiosyncratic().coefficient()?,
        ))
    }
}

/// Owns the sorted row arena and hands out windows over it.
#[derive(Debug, Clone)]
pub struct WindowGenerator {
    rows: Vec<FireRow>,
    window_size: usize,
    spans: Vec<WindowSpan>,
}

impl WindowGenerator {
    /// Sort `rows` by (period, id) and lay out the windows.
    pub fn new(mut rows: Vec<FireRow>, window_size: usize) -> Self {
        rows.sort_by(|a, b| a.period.cmp(&b.period).then(a.id.cmp(&b.id)));
        let spans = match (rows.first(), rows.last()) {
            (Some(first), Some(last)) => WindowSpan::all(first.period, last.period, window_size),
            _ => Vec::new(),
        };
        tracing::debug!(
            rows = rows.len(),
            window_size,
            windows = spans.len(),
            "laid out regression windows"
        );
        Self {
            rows,
            window_size,
            spans,
        }
    }

    /// Periods per window.
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// The sorted row arena.
    pub fn rows(&self) -> &[FireRow] {
        &self.rows
    }

    /// Spans of every window in order.
    pub fn spans(&self) -> &[WindowSpan] {
        &self.spans
    }

    /// Number of windows.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether the panel is too short for a single window.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// View of the rows inside `span`.
    pub fn window(&self, span: WindowSpan) -> Window<'_> {
        let lo = self.rows.partition_point(|r| r.period < span.start);
        let hi = self.rows.partition_point(|r| r.period <= span.end);
        Window {
            span,
            rows: &self.rows[lo..hi.max(lo)],
        }
    }

    /// Iterate over all windows; each call starts from the first window.
    pub fn windows(&self) -> Windows<'_> {
        Windows {
            generator: self,
            next: 0,
        }
    }
}

impl<'a> IntoIterator for &'a WindowGenerator {
    type Item = Window<'a>;
    type IntoIter = Windows<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.windows()
    }
}

/// Iterator over the windows of a [`WindowGenerator`].
#[derive(Debug, Clone)]
pub struct Windows<'a> {
    generator: &'a WindowGenerator,
    next: usize,
}

impl<'a> Iterator for Windows<'a> {
    type Item = Window<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let span = *self.generator.spans.get(self.next)?;
        self.next += 1;
        Some(self.generator.window(span))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.generator.spans.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Windows<'_> {}

impl FusedIterator for Windows<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn row(period: Period, id: i64, revision: f64, error: f64) -> FireRow {
        FireRow {
            period,
            id,
            nowcast: 0.0,
            forecast: -revision,
            actual: error,
            revision,
            error,
            error_mean: error,
            revision_mean: revision,
            error_idio: 0.0,
            revision_idio: 0.0,
        }
    }

    fn panel(periods: i32, ids: i64) -> Vec<FireRow> {
        let start: Period = "1990Q1".parse().unwrap();
        (0..periods)
            .flat_map(|t| {
                let revision = f64::from(t);
                (1..=ids).map(move |id| row(start.add(t), id, revision, 2.0 * revision))
            })
            .collect()
    }

    #[rstest]
    #[case(20, 80, 0)]
    #[case(20, 20, 0)]
    #[case(20, 19, 1)]
    #[case(100, 80, 20)]
    #[case(10, 3, 7)]
    fn test_window_count(#[case] periods: i32, #[case] window_size: usize, #[case] expected: usize) {
        let generator = WindowGenerator::new(panel(periods, 2), window_size);
        assert_eq!(generator.len(), expected);
        assert_eq!(generator.windows().len(), expected);
        assert_eq!(generator.windows().count(), expected);
    }

    #[test]
    fn test_window_coverage() {
        let generator = WindowGenerator::new(panel(10, 3), 4);
        let start: Period = "1990Q1".parse().unwrap();

        for (k, window) in generator.windows().enumerate() {
            let span = window.span();
            assert_eq!(span.start, start.add(k as i32));
            assert_eq!(span.end, start.add(k as i32 + 3));
            assert_eq!(window.rows().len(), 4 * 3);
            assert!(window.rows().iter().all(|r| span.contains(r.period)));
            assert_eq!(window.consensus().len(), 4);
            assert_eq!(window.individual().len(), 12);
        }
    }

    #[test]
    fn test_windows_restart() {
        let generator = WindowGenerator::new(panel(8, 1), 3);
        let first: Vec<_> = generator.windows().map(|w| w.span()).collect();
        let second: Vec<_> = (&generator).into_iter().map(|w| w.span()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn test_gaps_count_as_calendar_periods() {
        let start: Period = "1990Q1".parse().unwrap();
        let rows = vec![row(start, 1, 1.0, 1.0), row(start.add(9), 1, 2.0, 2.0)];
        let generator = WindowGenerator::new(rows, 4);
        assert_eq!(generator.len(), 6);
        let middle = generator.window(generator.spans()[2]);
        assert!(middle.rows().is_empty());
        assert!(middle.beta().unwrap().individual.is_nan());
    }

    #[test]
    fn test_window_beta() {
        let generator = WindowGenerator::new(panel(6, 2), 4);
        let window = generator.windows().next().unwrap();
        let beta = window.beta().unwrap();
        assert_relative_eq!(beta.individual, 2.0, epsilon = 1e-9);
        assert_relative_eq!(beta.consensus, 2.0, epsilon = 1e-9);
        assert!(beta.idiosyncratic.is_nan());
        assert_eq!(beta.period, "1990Q4".parse::<Period>().unwrap());
    }

    #[test]
    fn test_empty_panel() {
        let generator = WindowGenerator::new(Vec::new(), 4);
        assert!(generator.is_empty());
        assert_eq!(generator.windows().next().map(|w| w.span()), None);
    }
}
