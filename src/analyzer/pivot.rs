use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::filter::FilteredView;
use crate::parser::types::{Dimension, GroupKey, Measure};

/// Two-way table of summed values. `cells[r][c]` belongs to `row_keys[r]` and
/// `col_keys[c]`; combinations never observed hold 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotTable {
    pub row_dimension: Option<Dimension>,
    pub col_dimension: Option<Dimension>,
    pub row_keys: Vec<GroupKey>,
    pub col_keys: Vec<GroupKey>,
    pub cells: Vec<Vec<f64>>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty() || self.col_keys.is_empty()
    }

    pub fn get(&self, row: &GroupKey, col: &GroupKey) -> Option<f64> {
        let r = self.row_keys.binary_search(row).ok()?;
        let c = self.col_keys.binary_search(col).ok()?;
        Some(self.cells[r][c])
    }

    pub fn row_total(&self, row: &GroupKey) -> Option<f64> {
        let r = self.row_keys.binary_search(row).ok()?;
        Some(self.cells[r].iter().sum())
    }

    pub fn grand_total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }
}

/// Cross-tabulate `measure` by `row_dim` × `col_dim`. Both axes are sorted.
/// Rows missing either key or the value do not contribute, so totals match
/// [`sum_by`](super::aggregate::sum_by) only over rows carrying both keys.
pub fn pivot(
    view: &FilteredView<'_>,
    row_dim: Dimension,
    col_dim: Dimension,
    measure: Measure,
) -> PivotTable {
    let mut sums: BTreeMap<(GroupKey, GroupKey), f64> = BTreeMap::new();
    let mut row_set: BTreeSet<GroupKey> = BTreeSet::new();
    let mut col_set: BTreeSet<GroupKey> = BTreeSet::new();

    for record in view.records() {
        let (Some(row), Some(col), Some(value)) =
            (record.key(row_dim), record.key(col_dim), record.measure(measure))
        else {
            continue;
        };
        row_set.insert(row.clone());
        col_set.insert(col.clone());
        *sums.entry((row, col)).or_insert(0.0) += value;
    }

    let row_keys: Vec<GroupKey> = row_set.into_iter().collect();
    let col_keys: Vec<GroupKey> = col_set.into_iter().collect();
    let mut cells = vec![vec![0.0; col_keys.len()]; row_keys.len()];
    for ((row, col), value) in sums {
        // Both keys were inserted above, so the lookups always succeed.
        if let (Ok(r), Ok(c)) = (row_keys.binary_search(&row), col_keys.binary_search(&col)) {
            cells[r][c] = value;
        }
    }

    PivotTable {
        row_dimension: Some(row_dim),
        col_dimension: Some(col_dim),
        row_keys,
        col_keys,
        cells,
    }
}
