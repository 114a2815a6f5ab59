use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::export::cell_text;
use crate::filter::FilteredView;

/// Write the view as CSV: the dataset's headers in original order, then one
/// line per kept row. Dates at midnight are written as `YYYY-MM-DD`.
pub fn write_csv<W: Write>(view: &FilteredView<'_>, writer: W) -> Result<(), AppError> {
    let schema = view.dataset().schema();
    let mut wtr = ::csv::Writer::from_writer(writer);

    wtr.write_record(schema.iter().map(|c| c.name.as_str()))?;
    for record in view.records() {
        wtr.write_record(schema.iter().map(|c| cell_text(record, c.role)))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the view to a CSV file at `path`, returning the number of data rows.
pub fn export_csv(view: &FilteredView<'_>, path: &Path) -> Result<usize, AppError> {
    let file = std::fs::File::create(path)?;
    write_csv(view, std::io::BufWriter::new(file))?;
    log::info!("Exported {} rows to {}", view.len(), path.display());
    Ok(view.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::filter::{apply_filters, FilterSelection, Selection};
    use crate::parser::parse_csv_reader;
    use crate::parser::types::{Dimension, Record};

    const SOURCE: &str = "\
Date,Store,Category,Product,Demand Forecast,Stock,Sales,Stockout,Region
2024-01-01,S1,Toys,P1,10,5,8,0,north
2024-01-01 14:30:00,S2,Food,P2,12.5,,3,1,\"south, coast\"
2024-01-02,S1,,P3,7,4,2,0,
2024-01-03,S3,Toys,P1,1,9,1,0,east
";

    fn to_string(view: &FilteredView<'_>) -> String {
        let mut buf = Vec::new();
        write_csv(view, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_header_and_row_layout() {
        let out = parse_csv_reader(SOURCE.as_bytes(), &DashboardConfig::default()).unwrap();
        let view = FilteredView::full(&out.dataset);
        let text = to_string(&view);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Date,Store,Category,Product,Demand Forecast,Stock,Sales,Stockout,Region"
        );
        assert_eq!(lines[1], "2024-01-01,S1,Toys,P1,10,5,8,0,north");
        assert_eq!(lines[2], "2024-01-01 14:30:00,S2,Food,P2,12.5,,3,1,\"south, coast\"");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_round_trip_filtered_view() {
        let config = DashboardConfig::default();
        let out = parse_csv_reader(SOURCE.as_bytes(), &config).unwrap();
        let selection =
            FilterSelection::all().with(Dimension::Store, Selection::only(["S1", "S2"]));
        let view = apply_filters(&out.dataset, &selection);
        assert_eq!(view.len(), 3);

        let text = to_string(&view);
        let reparsed = parse_csv_reader(text.as_bytes(), &config).unwrap();
        let original: Vec<&Record> = view.records().collect();
        let back: Vec<&Record> = reparsed.dataset.records().iter().collect();
        assert_eq!(back, original);
        assert!(reparsed.warnings.is_empty());
        assert_eq!(
            reparsed.dataset.headers().collect::<Vec<_>>(),
            out.dataset.headers().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_view_writes_header_only() {
        let out = parse_csv_reader(SOURCE.as_bytes(), &DashboardConfig::default()).unwrap();
        let selection = FilterSelection::all().with(Dimension::Store, Selection::Only(vec![]));
        let text = to_string(&apply_filters(&out.dataset, &selection));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_export_csv_to_file() {
        let out = parse_csv_reader(SOURCE.as_bytes(), &DashboardConfig::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered.csv");
        let written = export_csv(&FilteredView::full(&out.dataset), &path).unwrap();
        assert_eq!(written, 4);
        let reloaded = crate::parser::parse_csv(&path, &DashboardConfig::default()).unwrap();
        assert_eq!(reloaded.dataset.len(), 4);
    }
}
