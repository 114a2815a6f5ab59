/// Inventory dashboard: every chart and table slot derived from one filtered view.
use std::time::Instant;

use serde::Serialize;

use super::abc::{abc_analysis, AbcEntry};
use super::aggregate::{
    measure_values, paired_totals, shares, stockout_rows, sum_by, sum_measure, top_n, Direction,
    GroupTotal, Grouped, PairedTotal, Share,
};
use super::distribution::{boxplot_stats, histogram, BoxplotStats, HistogramBin};
use super::pivot::{pivot, PivotTable};
use super::temporal::{date_span_days, measure_series, rolling_mean, RollingPoint, SeriesPoint};
use crate::config::DashboardConfig;
use crate::filter::FilteredView;
use crate::parser::types::{Capabilities, Dimension, Measure, Record};

// ─── Data Structures ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub meta: DashboardMeta,
    pub kpis: KpiSection,
    pub trends: Option<TrendsSection>,
    pub products: Option<ProductSection>,
    pub stores: Option<StoreSection>,
    pub categories: Option<CategorySection>,
    pub advanced: AdvancedSection,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMeta {
    pub filtered_rows: usize,
    pub total_rows: usize,
    pub capabilities: Capabilities,
    /// First and last day present in the view.
    pub date_range: Option<(String, String)>,
    pub compute_duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSection {
    pub total_demand: f64,
    pub total_stock: Option<f64>,
    pub total_sales: Option<f64>,
    pub stockout_days: Option<f64>,
    pub date_span_days: Option<i64>,
    pub row_count: usize,
    pub preview: Vec<Record>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsSection {
    pub demand: Vec<SeriesPoint>,
    pub stock: Option<Vec<SeriesPoint>>,
    pub sales: Option<Vec<SeriesPoint>>,
    pub rolling_window_days: u32,
    /// Empty when the view is too short for the window.
    pub demand_rolling_mean: Vec<RollingPoint>,
    pub top_demand_days: Vec<GroupTotal>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSection {
    pub top_demand: Vec<GroupTotal>,
    pub top_sales: Option<Vec<GroupTotal>>,
    pub lowest_stock: Option<Vec<GroupTotal>>,
    pub abc: Vec<AbcEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSection {
    /// Descending by demand.
    pub demand: Vec<GroupTotal>,
    pub stock: Option<Grouped>,
    /// Demand on `x`, stock on `y`.
    pub stock_vs_demand: Option<Vec<PairedTotal>>,
    pub sales: Option<Grouped>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySection {
    /// Descending by demand.
    pub demand: Vec<GroupTotal>,
    pub sales_shares: Option<Vec<Share>>,
    pub stock: Option<Grouped>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSection {
    pub demand_boxplot: Option<BoxplotStats>,
    /// Demand by product (rows) and store (columns).
    pub product_store_heatmap: Option<PivotTable>,
    pub stockout_events: Option<Vec<Record>>,
    /// Demand by store (rows) and category (columns).
    pub store_category_pivot: Option<PivotTable>,
    pub demand_histogram: Vec<HistogramBin>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Notice {
    /// The current selection matches no rows.
    EmptyResult,
    /// The dataset has no date column; trend charts are unavailable.
    NoDateColumn,
}

// ─── Sections ────────────────────────────────────────────────────────────────

fn build_meta(view: &FilteredView<'_>) -> DashboardMeta {
    let date_range = view
        .records()
        .filter_map(|r| r.date)
        .fold(None, |acc: Option<(chrono::NaiveDateTime, chrono::NaiveDateTime)>, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })
        .map(|(lo, hi)| {
            (
                lo.date().format("%Y-%m-%d").to_string(),
                hi.date().format("%Y-%m-%d").to_string(),
            )
        });

    DashboardMeta {
        filtered_rows: view.len(),
        total_rows: view.dataset().len(),
        capabilities: view.capabilities(),
        date_range,
        compute_duration_ms: 0,
    }
}

fn build_kpis(
    view: &FilteredView<'_>,
    caps: &Capabilities,
    config: &DashboardConfig,
) -> KpiSection {
    let optional_sum = |m: Measure| caps.has_measure(m).then(|| sum_measure(view, m));

    KpiSection {
        total_demand: sum_measure(view, Measure::DemandForecast),
        total_stock: optional_sum(Measure::Stock),
        total_sales: optional_sum(Measure::Sales),
        stockout_days: optional_sum(Measure::Stockout),
        date_span_days: if caps.date { date_span_days(view) } else { None },
        row_count: view.len(),
        preview: view.records().take(config.preview_rows).cloned().collect(),
    }
}

fn build_trends(
    view: &FilteredView<'_>,
    caps: &Capabilities,
    config: &DashboardConfig,
) -> TrendsSection {
    let optional_series = |m: Measure| caps.has_measure(m).then(|| measure_series(view, m));
    let daily_demand = sum_by(view, Dimension::Date, Measure::DemandForecast);

    TrendsSection {
        demand: measure_series(view, Measure::DemandForecast),
        stock: optional_series(Measure::Stock),
        sales: optional_series(Measure::Sales),
        rolling_window_days: config.rolling_window_days,
        demand_rolling_mean: rolling_mean(
            view,
            Measure::DemandForecast,
            config.rolling_window_days,
        ),
        top_demand_days: top_n(&daily_demand, config.top_n, Direction::Max),
    }
}

fn build_products(
    view: &FilteredView<'_>,
    caps: &Capabilities,
    config: &DashboardConfig,
) -> ProductSection {
    let ranked = |m: Measure, direction: Direction| {
        caps.has_measure(m)
            .then(|| top_n(&sum_by(view, Dimension::Product, m), config.top_n, direction))
    };

    ProductSection {
        top_demand: top_n(
            &sum_by(view, Dimension::Product, Measure::DemandForecast),
            config.top_n,
            Direction::Max,
        ),
        top_sales: ranked(Measure::Sales, Direction::Max),
        lowest_stock: ranked(Measure::Stock, Direction::Min),
        abc: abc_analysis(view, Dimension::Product, Measure::DemandForecast, &config.abc),
    }
}

fn build_stores(view: &FilteredView<'_>, caps: &Capabilities) -> StoreSection {
    StoreSection {
        demand: sum_by(view, Dimension::Store, Measure::DemandForecast).sorted_desc(),
        stock: caps
            .stock
            .then(|| sum_by(view, Dimension::Store, Measure::Stock)),
        stock_vs_demand: caps.stock.then(|| {
            paired_totals(view, Dimension::Store, Measure::DemandForecast, Measure::Stock)
        }),
        sales: caps
            .sales
            .then(|| sum_by(view, Dimension::Store, Measure::Sales)),
    }
}

fn build_categories(view: &FilteredView<'_>, caps: &Capabilities) -> CategorySection {
    CategorySection {
        demand: sum_by(view, Dimension::Category, Measure::DemandForecast).sorted_desc(),
        sales_shares: caps
            .sales
            .then(|| shares(&sum_by(view, Dimension::Category, Measure::Sales))),
        stock: caps
            .stock
            .then(|| sum_by(view, Dimension::Category, Measure::Stock)),
    }
}

fn build_advanced(
    view: &FilteredView<'_>,
    caps: &Capabilities,
    config: &DashboardConfig,
) -> AdvancedSection {
    let demand = measure_values(view, Measure::DemandForecast);

    AdvancedSection {
        demand_boxplot: boxplot_stats(&demand),
        product_store_heatmap: (caps.product && caps.store).then(|| {
            pivot(view, Dimension::Product, Dimension::Store, Measure::DemandForecast)
        }),
        stockout_events: caps
            .stockout
            .then(|| stockout_rows(view).into_iter().cloned().collect()),
        store_category_pivot: (caps.store && caps.category).then(|| {
            pivot(view, Dimension::Store, Dimension::Category, Measure::DemandForecast)
        }),
        demand_histogram: histogram(&demand, config.histogram_bins),
    }
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Builds every dashboard slot from the filtered view.
///
/// Slots whose source columns are absent are `None`. An empty view still
/// yields a complete dashboard (zero totals, empty series) with
/// `Notice::EmptyResult`.
pub fn build_dashboard(view: &FilteredView<'_>, config: &DashboardConfig) -> Dashboard {
    let start = Instant::now();
    let caps = view.capabilities();

    let mut notices = Vec::new();
    if view.is_empty() {
        notices.push(Notice::EmptyResult);
    }
    if !caps.date {
        notices.push(Notice::NoDateColumn);
    }

    let mut meta = build_meta(view);
    let kpis = build_kpis(view, &caps, config);
    let trends = caps.date.then(|| build_trends(view, &caps, config));
    let products = caps.product.then(|| build_products(view, &caps, config));
    let stores = caps.store.then(|| build_stores(view, &caps));
    let categories = caps.category.then(|| build_categories(view, &caps));
    let advanced = build_advanced(view, &caps, config);

    meta.compute_duration_ms = start.elapsed().as_millis() as u64;
    log::debug!(
        "Dashboard built over {} of {} rows in {} ms",
        meta.filtered_rows,
        meta.total_rows,
        meta.compute_duration_ms
    );

    Dashboard {
        meta,
        kpis,
        trends,
        products,
        stores,
        categories,
        advanced,
        notices,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
