use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;

use inventory_dashboard::analyzer::build_dashboard;
use inventory_dashboard::config::DashboardConfig;
use inventory_dashboard::error::AppError;
use inventory_dashboard::export::{export_csv, export_xlsx};
use inventory_dashboard::filter::{
    apply_filters_with_limit, full_date_range, DateRange, FilterSelection, Selection,
};
use inventory_dashboard::parser::Dimension;
use inventory_dashboard::state::SharedDataset;

#[derive(Parser)]
#[command(
    name = "inventory-dashboard",
    version,
    about = "Filter a retail inventory dataset and print the dashboard as JSON."
)]
struct Args {
    /// CSV or spreadsheet file to load.
    file: PathBuf,

    /// JSON configuration file; missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep only these stores (repeatable).
    #[arg(long = "store")]
    stores: Vec<String>,

    /// Keep only these categories (repeatable).
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Keep only these products (repeatable).
    #[arg(long = "product")]
    products: Vec<String>,

    /// Select every value of dimensions without an explicit selection,
    /// instead of the first few.
    #[arg(long)]
    all: bool,

    /// First day of the date range (YYYY-MM-DD).
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the date range (YYYY-MM-DD).
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Also write the filtered rows to this file (.xlsx for a workbook, CSV
    /// otherwise). CSV output is always comma-separated, whatever
    /// `csvDelimiter` the config sets for input.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Indent the JSON output.
    #[arg(long)]
    pretty: bool,
}

fn selection_for(values: &[String], all: bool) -> Selection {
    if !values.is_empty() {
        Selection::Only(values.to_vec())
    } else if all {
        Selection::All
    } else {
        Selection::Default
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config = match &args.config {
        Some(path) => DashboardConfig::from_json_file(path)?,
        None => DashboardConfig::default(),
    };

    let shared = SharedDataset::new();
    let dataset = shared.get_or_load(&args.file, &config)?;

    let mut selection = FilterSelection::default()
        .with(Dimension::Store, selection_for(&args.stores, args.all))
        .with(Dimension::Category, selection_for(&args.categories, args.all))
        .with(Dimension::Product, selection_for(&args.products, args.all));
    if args.from.is_some() || args.to.is_some() {
        // An open end falls back to the dataset's own bound.
        if let Some(full) = full_date_range(&dataset) {
            selection.date_range = Some(DateRange::new(
                args.from.unwrap_or(full.start),
                args.to.unwrap_or(full.end),
            ));
        }
    }

    let view = apply_filters_with_limit(&dataset, &selection, config.default_selection_limit);
    let dashboard = build_dashboard(&view, &config);

    if let Some(path) = &args.export {
        let is_xlsx = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("xlsx"))
            .unwrap_or(false);
        if is_xlsx {
            export_xlsx(&view, &dashboard, path)?;
        } else {
            export_csv(&view, path)?;
        }
    }

    let json = if args.pretty {
        serde_json::to_string_pretty(&dashboard)?
    } else {
        serde_json::to_string(&dashboard)?
    };
    println!("{}", json);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_export_help_mentions_comma_output() {
        let cmd = Args::command();
        let export = cmd
            .get_arguments()
            .find(|a| a.get_id() == "export")
            .unwrap();
        let help = export.get_help().unwrap().to_string();
        assert!(help.contains("comma-separated"), "help was {:?}", help);
    }

    #[test]
    fn test_selection_for() {
        assert_eq!(selection_for(&[], false), Selection::Default);
        assert_eq!(selection_for(&[], true), Selection::All);
        let stores = vec!["S1".to_string()];
        assert_eq!(selection_for(&stores, true), Selection::only(["S1"]));
    }

    #[test]
    fn test_parse_date_range_flags() {
        let args = Args::try_parse_from([
            "inventory-dashboard",
            "inventory.csv",
            "--store",
            "S1",
            "--store",
            "S2",
            "--from",
            "2024-01-02",
        ])
        .unwrap();
        assert_eq!(args.stores, vec!["S1", "S2"]);
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert!(args.to.is_none());
    }
}
