//! Filter-and-aggregate core of a retail inventory dashboard.
//!
//! A dataset is loaded once ([`state::SharedDataset`]), narrowed by a
//! [`filter::FilterSelection`] into a [`filter::FilteredView`], and turned into
//! every chart and table of the dashboard by [`analyzer::build_dashboard`].

pub mod analyzer;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod parser;
pub mod state;

#[cfg(test)]
mod test_support;

pub use analyzer::{build_dashboard, Dashboard};
pub use config::DashboardConfig;
pub use error::AppError;
pub use filter::{apply_filters, FilterSelection, FilteredView, Selection};
pub use parser::{load_dataset, Dataset, LoadOutput};

// ─── E2E Integration Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod e2e_tests {
    use std::io::Write;

    use chrono::NaiveDate;

    use crate::analyzer::{abc_analysis, pivot, sum_by, sum_measure, top_n, Direction, Notice};
    use crate::config::{AbcThresholds, DashboardConfig};
    use crate::filter::{apply_filters, distinct_values, FilterSelection, FilteredView, Selection};
    use crate::parser::{parse_csv_reader, Dimension, GroupKey, Measure};

    /// 3 stores × 2 products × 5 days, demand 10 on every row.
    fn grid_csv() -> String {
        let mut csv =
            String::from("Date,Store,Category,Product,Demand Forecast,Stock,Sales,Stockout\n");
        for s in 1..=3 {
            for p in 1..=2 {
                for d in 1..=5 {
                    let category = if p == 1 { "Toys" } else { "Food" };
                    let stock = s + p;
                    csv.push_str(&format!("2024-01-0{d},S{s},{category},P{p},10,{stock},{d},0\n"));
                }
            }
        }
        csv
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// E2E: load → filter one store → totals and grouping match
    #[test]
    fn test_e2e_single_store_totals() {
        let config = DashboardConfig::default();
        let out = parse_csv_reader(grid_csv().as_bytes(), &config).unwrap();
        assert_eq!(out.dataset.len(), 30);
        assert!(out.warnings.is_empty());
        assert!(out.missing_optional_columns.is_empty());

        let selection = FilterSelection::default().with(Dimension::Store, Selection::only(["S1"]));
        let view = apply_filters(&out.dataset, &selection);
        assert_eq!(view.len(), 10);
        assert_eq!(sum_measure(&view, Measure::DemandForecast), 100.0);

        let by_store = sum_by(&view, Dimension::Store, Measure::DemandForecast);
        assert_eq!(by_store.len(), 1);
        assert_eq!(by_store.get(&GroupKey::from("S1")), Some(100.0));

        let dash = crate::build_dashboard(&view, &config);
        assert_eq!(dash.kpis.total_demand, 100.0);
        assert_eq!(dash.kpis.date_span_days, Some(5));
        assert!(dash.notices.is_empty());
    }

    /// E2E: filtering never invents rows, and the all-values selection is the identity
    #[test]
    fn test_e2e_filter_subset_and_identity() {
        let out = parse_csv_reader(grid_csv().as_bytes(), &DashboardConfig::default()).unwrap();
        let ds = &out.dataset;

        let everything = FilterSelection {
            stores: Selection::Only(distinct_values(ds, Dimension::Store)),
            categories: Selection::Only(distinct_values(ds, Dimension::Category)),
            products: Selection::Only(distinct_values(ds, Dimension::Product)),
            date_range: crate::filter::full_date_range(ds),
        };
        assert_eq!(
            apply_filters(ds, &everything).row_indices(),
            FilteredView::full(ds).row_indices()
        );

        let narrow = FilterSelection::all()
            .with(Dimension::Category, Selection::only(["Food"]))
            .with_date_range(day("2024-01-04"), day("2024-01-02"));
        let view = apply_filters(ds, &narrow);
        assert_eq!(view.len(), 9);
        assert!(view.len() <= ds.len());
        assert!(view.records().all(|r| ds.records().contains(r)));
    }

    /// E2E: pivot cells and row totals agree with the filtered sum
    #[test]
    fn test_e2e_pivot_mass_conservation() {
        let out = parse_csv_reader(grid_csv().as_bytes(), &DashboardConfig::default()).unwrap();
        let view = apply_filters(
            &out.dataset,
            &FilterSelection::all().with(Dimension::Store, Selection::only(["S2", "S3"])),
        );
        let table = pivot(&view, Dimension::Store, Dimension::Category, Measure::Stock);
        assert_eq!(table.grand_total(), sum_measure(&view, Measure::Stock));
        for entry in sum_by(&view, Dimension::Store, Measure::Stock).entries() {
            assert_eq!(table.row_total(&entry.key), Some(entry.value));
        }
    }

    /// E2E: ranking and ABC over product sales
    #[test]
    fn test_e2e_top_n_and_abc() {
        let csv = "\
Store,Product,Demand Forecast,Sales
S1,A,5,50
S1,B,3,30
S1,C,1,10
S1,D,1,5
S1,E,1,5
S1,F,1,0
";
        let out = parse_csv_reader(csv.as_bytes(), &DashboardConfig::default()).unwrap();
        let view = FilteredView::full(&out.dataset);

        let sales = sum_by(&view, Dimension::Product, Measure::Sales);
        let top = top_n(&sales, 5, Direction::Max);
        assert_eq!(top.len(), 5);
        let cutoff = top.last().unwrap().value;
        assert!(sales
            .entries()
            .iter()
            .filter(|e| !top.iter().any(|t| t.key == e.key))
            .all(|e| e.value <= cutoff));

        let thresholds = AbcThresholds::default();
        let abc = abc_analysis(&view, Dimension::Product, Measure::Sales, &thresholds);
        assert!(abc
            .windows(2)
            .all(|w| w[0].cumulative_fraction <= w[1].cumulative_fraction));
        assert_eq!(abc.last().unwrap().cumulative_fraction, 1.0);
    }

    /// E2E: missing stock cells are not read as zero
    #[test]
    fn test_e2e_missing_stock_excluded() {
        let csv = "\
Store,Product,Demand Forecast,Stock
S1,P1,1,6
S1,P1,1,
S1,P2,1,4
S1,P3,1,
";
        let out = parse_csv_reader(csv.as_bytes(), &DashboardConfig::default()).unwrap();
        let view = FilteredView::full(&out.dataset);
        let stock = sum_by(&view, Dimension::Product, Measure::Stock);
        assert_eq!(stock.get(&GroupKey::from("P3")), None);
        assert_eq!(stock.entries()[0].mean(), 6.0);

        let dash = crate::build_dashboard(&view, &DashboardConfig::default());
        let lowest = dash.products.unwrap().lowest_stock.unwrap();
        assert_eq!(lowest[0].key, GroupKey::from("P2"));
    }

    /// E2E: an empty selection is a notice, not an error
    #[test]
    fn test_e2e_empty_selection() {
        let config = DashboardConfig::default();
        let out = parse_csv_reader(grid_csv().as_bytes(), &config).unwrap();
        let selection = FilterSelection::all().with(Dimension::Product, Selection::Only(vec![]));
        let view = apply_filters(&out.dataset, &selection);
        let dash = crate::build_dashboard(&view, &config);
        assert_eq!(dash.notices, vec![Notice::EmptyResult]);
        assert_eq!(dash.kpis.row_count, 0);
    }

    /// E2E: file → shared dataset → filter → CSV export → reload
    #[test]
    fn test_e2e_file_export_round_trip() {
        let config = DashboardConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("inventory.csv");
        std::fs::File::create(&source)
            .unwrap()
            .write_all(grid_csv().as_bytes())
            .unwrap();

        let shared = crate::state::SharedDataset::new();
        let dataset = shared.get_or_load(&source, &config).unwrap();
        let selection = FilterSelection::all()
            .with(Dimension::Store, Selection::only(["S3"]))
            .with_date_range(day("2024-01-02"), day("2024-01-03"));
        let view = apply_filters(&dataset, &selection);
        assert_eq!(view.len(), 4);

        let target = dir.path().join("filtered.csv");
        crate::export::export_csv(&view, &target).unwrap();
        let reloaded = crate::load_dataset(&target, &config).unwrap();
        let original: Vec<_> = view.records().cloned().collect();
        assert_eq!(reloaded.dataset.records(), original.as_slice());
    }
}
