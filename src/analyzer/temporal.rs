use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::filter::FilteredView;
use crate::parser::types::Measure;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: NaiveDateTime,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingPoint {
    pub date: NaiveDateTime,
    pub mean: f64,
    /// Observations inside the window ending at `date`.
    pub observations: usize,
}

/// `(date, value)` pairs of rows carrying both, sorted by date. Rows sharing a
/// timestamp keep their view order.
fn dated_values(view: &FilteredView<'_>, measure: Measure) -> Vec<(NaiveDateTime, f64)> {
    let mut points: Vec<(NaiveDateTime, f64)> = view
        .records()
        .filter_map(|r| Some((r.date?, r.measure(measure)?)))
        .collect();
    points.sort_by_key(|(date, _)| *date);
    points
}

/// One point per dated row with a value, in chronological order.
pub fn measure_series(view: &FilteredView<'_>, measure: Measure) -> Vec<SeriesPoint> {
    dated_values(view, measure)
        .into_iter()
        .map(|(date, value)| SeriesPoint { date, value })
        .collect()
}

/// Trailing mean of `measure` over the last `window_days` days.
///
/// One point per distinct timestamp `t`, averaging every observation dated in
/// `(t - window_days, t]`. Leading points use whatever falls inside their
/// shorter history. Returns nothing when the view has no date column or holds
/// no more than `window_days` rows.
pub fn rolling_mean(
    view: &FilteredView<'_>,
    measure: Measure,
    window_days: u32,
) -> Vec<RollingPoint> {
    if !view.capabilities().date || view.len() <= window_days as usize {
        return vec![];
    }
    let points = dated_values(view, measure);
    let window = Duration::days(i64::from(window_days));

    let mut result: Vec<RollingPoint> = Vec::new();
    let mut start = 0usize;
    let mut sum = 0.0;
    let mut i = 0usize;
    while i < points.len() {
        let t = points[i].0;
        // Absorb every observation stamped exactly `t`.
        while i < points.len() && points[i].0 == t {
            sum += points[i].1;
            i += 1;
        }
        while start < i && points[start].0 <= t - window {
            sum -= points[start].1;
            start += 1;
        }
        let observations = i - start;
        if observations == 0 {
            continue;
        }
        result.push(RollingPoint {
            date: t,
            mean: sum / observations as f64,
            observations,
        });
    }
    result
}

/// Calendar days between the earliest and latest date, both included.
/// `None` when no row of the view is dated.
pub fn date_span_days(view: &FilteredView<'_>) -> Option<i64> {
    let mut dates = view.records().filter_map(|r| r.date);
    let first = dates.next()?;
    let (lo, hi) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some((hi.date() - lo.date()).num_days() + 1)
}
