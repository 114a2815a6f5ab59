//! Group-and-sum reducers over a filtered view.
//!
//! Missing numeric cells are excluded, never read as zero: a key whose every
//! value is missing does not appear in the output at all.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::filter::FilteredView;
use crate::parser::types::{Dimension, GroupKey, Measure, Record};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotal {
    pub key: GroupKey,
    pub value: f64,
    /// Number of non-missing observations summed into `value`.
    pub count: usize,
}

impl GroupTotal {
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.value / self.count as f64
        }
    }
}

/// Per-key sums in first-seen key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Grouped {
    entries: Vec<GroupTotal>,
}

impl Grouped {
    pub fn entries(&self) -> &[GroupTotal] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &GroupKey) -> Option<f64> {
        self.entries.iter().find(|e| &e.key == key).map(|e| e.value)
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.entries.iter().map(|e| &e.key)
    }

    /// All groups, largest value first. Ties keep first-seen order.
    pub fn sorted_desc(&self) -> Vec<GroupTotal> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
        sorted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    /// Largest values first.
    Max,
    /// Smallest values first.
    Min,
}

/// Sum `measure` per value of `dim`. Rows missing the key or the value are skipped.
pub fn sum_by(view: &FilteredView<'_>, dim: Dimension, measure: Measure) -> Grouped {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut entries: Vec<GroupTotal> = Vec::new();

    for record in view.records() {
        let (Some(key), Some(value)) = (record.key(dim), record.measure(measure)) else {
            continue;
        };
        match index.get(&key) {
            Some(&i) => {
                entries[i].value += value;
                entries[i].count += 1;
            }
            None => {
                index.insert(key.clone(), entries.len());
                entries.push(GroupTotal {
                    key,
                    value,
                    count: 1,
                });
            }
        }
    }

    Grouped { entries }
}

/// The `n` largest (`Max`) or smallest (`Min`) groups. `n` is clamped to the
/// group count; ties keep first-seen order.
pub fn top_n(grouped: &Grouped, n: usize, direction: Direction) -> Vec<GroupTotal> {
    let mut ranked = grouped.entries.clone();
    match direction {
        Direction::Max => ranked.sort_by(|a, b| b.value.total_cmp(&a.value)),
        Direction::Min => ranked.sort_by(|a, b| a.value.total_cmp(&b.value)),
    }
    ranked.truncate(n);
    ranked
}

/// Sum of every non-missing value of `measure` in the view.
pub fn sum_measure(view: &FilteredView<'_>, measure: Measure) -> f64 {
    view.records().filter_map(|r| r.measure(measure)).sum()
}

/// Non-missing values of `measure`, in view order.
pub fn measure_values(view: &FilteredView<'_>, measure: Measure) -> Vec<f64> {
    view.records().filter_map(|r| r.measure(measure)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub key: GroupKey,
    pub value: f64,
    /// `value / total`, 0 when the total is 0.
    pub fraction: f64,
}

/// Each group's fraction of the grouped total (pie chart data).
pub fn shares(grouped: &Grouped) -> Vec<Share> {
    let total = grouped.total();
    grouped
        .entries
        .iter()
        .map(|e| Share {
            key: e.key.clone(),
            value: e.value,
            fraction: if total == 0.0 { 0.0 } else { e.value / total },
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairedTotal {
    pub key: GroupKey,
    pub x: f64,
    pub y: f64,
}

/// Per-key totals of two measures, keeping only keys present in both
/// (scatter chart data). Ordered like the `x` grouping.
pub fn paired_totals(
    view: &FilteredView<'_>,
    dim: Dimension,
    x: Measure,
    y: Measure,
) -> Vec<PairedTotal> {
    let xs = sum_by(view, dim, x);
    let ys = sum_by(view, dim, y);
    xs.entries
        .iter()
        .filter_map(|e| {
            ys.get(&e.key).map(|y| PairedTotal {
                key: e.key.clone(),
                x: e.value,
                y,
            })
        })
        .collect()
}

/// Rows recording at least one stockout, in view order.
pub fn stockout_rows<'a>(view: &FilteredView<'a>) -> Vec<&'a Record> {
    view.records()
        .filter(|r| r.stockout.map(|s| s > 0.0).unwrap_or(false))
        .collect()
}
