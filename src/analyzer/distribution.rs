//! Distribution summaries: box plot statistics and equal-width histograms.

use serde::Serialize;

use super::stats::{mean, percentile_sorted, std_dev};

/// Tukey box plot with linearly interpolated quartiles and 1.5×IQR fences.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxplotStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    /// Smallest value not below the lower fence.
    pub whisker_low: f64,
    /// Largest value not above the upper fence.
    pub whisker_high: f64,
    /// Values outside the fences, ascending.
    pub outliers: Vec<f64>,
    pub mean: f64,
    pub std_dev: f64,
}

const FENCE_FACTOR: f64 = 1.5;

pub fn boxplot_stats(values: &[f64]) -> Option<BoxplotStats> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = percentile_sorted(&sorted, 25.0);
    let median = percentile_sorted(&sorted, 50.0);
    let q3 = percentile_sorted(&sorted, 75.0);
    let iqr = q3 - q1;
    let lower_fence = q1 - FENCE_FACTOR * iqr;
    let upper_fence = q3 + FENCE_FACTOR * iqr;

    let is_inside = |v: &f64| *v >= lower_fence && *v <= upper_fence;
    // The quartiles lie within the fences, so at least one value is inside.
    let whisker_low = sorted.iter().copied().find(is_inside).unwrap_or(q1);
    let whisker_high = sorted.iter().copied().rev().find(is_inside).unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lower_fence || *v > upper_fence)
        .collect();

    Some(BoxplotStats {
        count: sorted.len(),
        min: sorted[0],
        q1,
        median,
        q3,
        max: sorted[sorted.len() - 1],
        lower_fence,
        upper_fence,
        whisker_low,
        whisker_high,
        outliers,
        mean: mean(&sorted),
        std_dev: std_dev(&sorted),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width bins spanning `[min, max]`. Every bin is half-open except the
/// last, which also takes `max`. A constant series gives a single bin.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return vec![];
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max == min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── boxplot_stats ──

    #[test]
    fn test_boxplot_empty() {
        assert_eq!(boxplot_stats(&[]), None);
    }

    #[test]
    fn test_boxplot_single_value() {
        let stats = boxplot_stats(&[4.0]).unwrap();
        assert_eq!(stats.min, 4.0);
        assert_eq!(stats.q1, 4.0);
        assert_eq!(stats.median, 4.0);
        assert_eq!(stats.max, 4.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_boxplot_quartiles_and_outlier() {
        // 1..=8 plus 100: q1=3, median=5, q3=7, IQR=4, fences -3 and 13
        let mut values: Vec<f64> = (1..=8).map(|v| v as f64).collect();
        values.push(100.0);
        let stats = boxplot_stats(&values).unwrap();
        assert_eq!(stats.count, 9);
        assert_eq!(stats.q1, 3.0);
        assert_eq!(stats.median, 5.0);
        assert_eq!(stats.q3, 7.0);
        assert_eq!(stats.lower_fence, -3.0);
        assert_eq!(stats.upper_fence, 13.0);
        assert_eq!(stats.whisker_low, 1.0);
        assert_eq!(stats.whisker_high, 8.0);
        assert_eq!(stats.max, 100.0);
        assert_eq!(stats.outliers, vec![100.0]);
        assert_eq!(stats.mean, 136.0 / 9.0);
    }

    #[test]
    fn test_boxplot_ignores_order() {
        let a = boxplot_stats(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        let b = boxplot_stats(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(a, b);
    }

    // ── histogram ──

    #[test]
    fn test_histogram_counts_everything() {
        let values: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        let bins = histogram(&values, 30);
        assert_eq!(bins.len(), 30);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), values.len());
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[29].upper, 100.0);
    }

    #[test]
    fn test_histogram_max_in_last_bin() {
        let bins = histogram(&[0.0, 5.0, 10.0], 2);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[1].count, 2);
    }

    #[test]
    fn test_histogram_constant_and_empty() {
        let bins = histogram(&[3.0, 3.0, 3.0], 30);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
        assert!(histogram(&[], 30).is_empty());
        assert!(histogram(&[1.0, 2.0], 0).is_empty());
    }
}
