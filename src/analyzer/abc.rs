use serde::Serialize;

use crate::analyzer::aggregate::sum_by;
use crate::config::AbcThresholds;
use crate::filter::FilteredView;
use crate::parser::types::{Dimension, GroupKey, Measure};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbcEntry {
    pub key: GroupKey,
    pub value: f64,
    pub cumulative_fraction: f64,
    pub class: AbcClass,
}

/// Class for a cumulative share of the total.
/// A : fraction <= thresholds.a
/// B : thresholds.a < fraction <= thresholds.b
/// C : fraction > thresholds.b
pub fn classify(cumulative_fraction: f64, thresholds: &AbcThresholds) -> AbcClass {
    if cumulative_fraction <= thresholds.a {
        AbcClass::A
    } else if cumulative_fraction <= thresholds.b {
        AbcClass::B
    } else {
        AbcClass::C
    }
}

/// Ranks the groups of `dim` by total `measure`, descending, and tags each with
/// its cumulative share of the grand total.
///
/// When the grand total is 0 every fraction is 0 and every entry is class C.
pub fn abc_analysis(
    view: &FilteredView<'_>,
    dim: Dimension,
    measure: Measure,
    thresholds: &AbcThresholds,
) -> Vec<AbcEntry> {
    let ranked = sum_by(view, dim, measure).sorted_desc();
    // Summed in ranked order so the last running total equals it exactly.
    let total: f64 = ranked.iter().map(|g| g.value).sum();

    let mut running = 0.0;
    ranked
        .into_iter()
        .map(|g| {
            running += g.value;
            if total == 0.0 {
                AbcEntry {
                    key: g.key,
                    value: g.value,
                    cumulative_fraction: 0.0,
                    class: AbcClass::C,
                }
            } else {
                let cumulative_fraction = running / total;
                AbcEntry {
                    key: g.key,
                    value: g.value,
                    cumulative_fraction,
                    class: classify(cumulative_fraction, thresholds),
                }
            }
        })
        .collect()
}
