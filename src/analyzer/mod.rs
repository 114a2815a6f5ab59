pub mod abc;
pub mod aggregate;
pub mod dashboard;
pub mod distribution;
pub mod pivot;
pub mod stats;
pub mod temporal;

pub use abc::{abc_analysis, AbcClass, AbcEntry};
pub use aggregate::{
    measure_values, paired_totals, shares, stockout_rows, sum_by, sum_measure, top_n, Direction,
    GroupTotal, Grouped,
};
pub use dashboard::{build_dashboard, Dashboard, Notice};
pub use distribution::{boxplot_stats, histogram, BoxplotStats, HistogramBin};
pub use pivot::{pivot, PivotTable};
pub use temporal::{date_span_days, measure_series, rolling_mean, RollingPoint};
