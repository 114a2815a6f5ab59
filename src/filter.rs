//! Row selection by store, category, product and date range.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::parser::types::{Capabilities, Dataset, Dimension, Record};

/// Dimensions with more distinct values than this start pre-filtered.
pub const DEFAULT_SELECTION_LIMIT: usize = 5;

/// Value selection for one categorical dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode", content = "values")]
pub enum Selection {
    /// All values when there are few, otherwise the first few in first-seen order.
    #[default]
    Default,
    /// Every row, including rows where the value is missing.
    All,
    /// Only rows whose value is listed. An empty list selects nothing.
    Only(Vec<String>),
}

impl Selection {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, swapping the bounds when given in reverse.
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        DateRange {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// The same range with `start <= end`.
    pub fn normalized(self) -> Self {
        DateRange::new(self.start, self.end)
    }

    pub fn contains(&self, dt: &NaiveDateTime) -> bool {
        let day = dt.date();
        day >= self.start && day <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelection {
    pub stores: Selection,
    pub categories: Selection,
    pub products: Selection,
    pub date_range: Option<DateRange>,
}

impl FilterSelection {
    /// Selects every row of the dataset.
    pub fn all() -> Self {
        FilterSelection {
            stores: Selection::All,
            categories: Selection::All,
            products: Selection::All,
            date_range: None,
        }
    }

    pub fn selection(&self, dim: Dimension) -> Option<&Selection> {
        match dim {
            Dimension::Store => Some(&self.stores),
            Dimension::Category => Some(&self.categories),
            Dimension::Product => Some(&self.products),
            Dimension::Date => None,
        }
    }

    pub fn with(mut self, dim: Dimension, selection: Selection) -> Self {
        match dim {
            Dimension::Store => self.stores = selection,
            Dimension::Category => self.categories = selection,
            Dimension::Product => self.products = selection,
            Dimension::Date => {}
        }
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }
}

/// Rows of a dataset kept by a filter, in original order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// View over every row.
    pub fn full(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            rows: (0..dataset.len()).collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn capabilities(&self) -> Capabilities {
        self.dataset.capabilities()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Dataset row indices, ascending.
    pub fn row_indices(&self) -> &[usize] {
        &self.rows
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.rows.iter().map(move |&i| &records[i])
    }
}

/// Distinct values of a categorical dimension in first-seen order.
pub fn distinct_values(dataset: &Dataset, dim: Dimension) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut values = Vec::new();
    for value in dataset.records().iter().filter_map(|r| r.text(dim)) {
        if seen.insert(value) {
            values.push(value.to_string());
        }
    }
    values
}

/// Values pre-selected for a dimension: the first `limit` distinct values in
/// first-seen order, or all of them when there are no more than `limit`.
pub fn default_values(dataset: &Dataset, dim: Dimension, limit: usize) -> Vec<String> {
    let mut values = distinct_values(dataset, dim);
    values.truncate(limit);
    values
}

/// Earliest and latest timestamp in the date column.
pub fn date_bounds(dataset: &Dataset) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut dates = dataset.records().iter().filter_map(|r| r.date);
    let first = dates.next()?;
    Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
}

/// Date range spanning the whole dataset, if it has dates.
pub fn full_date_range(dataset: &Dataset) -> Option<DateRange> {
    date_bounds(dataset).map(|(lo, hi)| DateRange::new(lo.date(), hi.date()))
}

/// Selection that [`Selection::Default`] stands for on `dim`: every value
/// when there are at most `limit`, otherwise the first `limit` seen.
fn resolve_default(dataset: &Dataset, dim: Dimension, limit: usize) -> Selection {
    // One value past the limit tells whether the limit cuts anything.
    let mut values = default_values(dataset, dim, limit.saturating_add(1));
    if values.len() > limit {
        values.truncate(limit);
        Selection::Only(values)
    } else {
        Selection::All
    }
}

/// Initial selection for a freshly loaded dataset, with the defaults spelled
/// out: dimensions above `limit` distinct values list their first `limit`
/// values, the others select everything, and the range covers every date.
///
/// Applying it keeps the same rows as [`FilterSelection::default`].
pub fn default_selection(dataset: &Dataset, limit: usize) -> FilterSelection {
    let selection = Dimension::CATEGORICAL
        .iter()
        .fold(FilterSelection::all(), |acc, &dim| {
            acc.with(dim, resolve_default(dataset, dim, limit))
        });
    FilterSelection {
        date_range: full_date_range(dataset),
        ..selection
    }
}

/// Membership test resolved against the dataset.
enum Predicate {
    Any,
    Members(HashSet<String>),
}

impl Predicate {
    fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Predicate::Any => true,
            Predicate::Members(set) => value.map(|v| set.contains(v)).unwrap_or(false),
        }
    }
}

fn resolve(dataset: &Dataset, dim: Dimension, selection: &Selection, limit: usize) -> Predicate {
    if !dataset.capabilities().has_dimension(dim) {
        return Predicate::Any;
    }
    match selection {
        Selection::All => Predicate::Any,
        Selection::Default => match resolve_default(dataset, dim, limit) {
            Selection::Only(values) => {
                log::debug!("{:?}: defaulting to first {} values {:?}", dim, limit, values);
                Predicate::Members(values.into_iter().collect())
            }
            _ => Predicate::Any,
        },
        Selection::Only(values) => {
            let observed: HashSet<&str> = dataset
                .records()
                .iter()
                .filter_map(|r| r.text(dim))
                .collect();
            let (known, unknown): (Vec<&String>, Vec<&String>) =
                values.iter().partition(|v| observed.contains(v.as_str()));
            if !unknown.is_empty() {
                log::debug!("{:?}: ignoring unknown values {:?}", dim, unknown);
            }
            Predicate::Members(known.into_iter().cloned().collect())
        }
    }
}

/// Apply `selection` with the default pre-selection limit.
pub fn apply_filters<'a>(dataset: &'a Dataset, selection: &FilterSelection) -> FilteredView<'a> {
    apply_filters_with_limit(dataset, selection, DEFAULT_SELECTION_LIMIT)
}

/// Keep the rows matching every configured predicate, preserving row order.
///
/// Predicates on columns the dataset lacks are skipped. Unknown values are
/// ignored and an inverted date range is swapped; neither is an error.
pub fn apply_filters_with_limit<'a>(
    dataset: &'a Dataset,
    selection: &FilterSelection,
    limit: usize,
) -> FilteredView<'a> {
    let predicates: Vec<(Dimension, Predicate)> = Dimension::CATEGORICAL
        .iter()
        .filter_map(|&dim| {
            let chosen = selection.selection(dim)?;
            Some((dim, resolve(dataset, dim, chosen, limit)))
        })
        .collect();
    let date_range = selection
        .date_range
        .filter(|_| dataset.capabilities().date)
        .map(DateRange::normalized);

    let rows: Vec<usize> = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            predicates.iter().all(|(dim, p)| p.matches(r.text(*dim)))
                && date_range
                    .map(|range| r.date.map(|d| range.contains(&d)).unwrap_or(false))
                    .unwrap_or(true)
        })
        .map(|(i, _)| i)
        .collect();

    log::debug!("Filter kept {} of {} rows", rows.len(), dataset.len());
    FilteredView { dataset, rows }
}
