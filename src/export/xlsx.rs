use std::path::Path;

use chrono::NaiveTime;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::analyzer::dashboard::{Dashboard, KpiSection};
use crate::analyzer::AbcEntry;
use crate::error::AppError;
use crate::export::{
    create_date_format, create_datetime_format, create_header_format, create_number_format,
    create_percent_format, highlight_positive,
};
use crate::filter::FilteredView;
use crate::parser::types::{ColumnRole, Dimension, Measure, Record};

/// Excel workbook of the view: filtered rows first, then the KPI summary and
/// the product ABC ranking when available. Returned as bytes.
pub fn generate_xlsx_report(
    view: &FilteredView<'_>,
    dashboard: &Dashboard,
) -> Result<Vec<u8>, AppError> {
    let mut wb = Workbook::new();
    write_rows(&mut wb, view)?;
    write_summary(&mut wb, &dashboard.kpis)?;
    if let Some(products) = &dashboard.products {
        write_abc(&mut wb, &products.abc)?;
    }
    Ok(wb.save_to_buffer()?)
}

pub fn export_xlsx(
    view: &FilteredView<'_>,
    dashboard: &Dashboard,
    path: &Path,
) -> Result<usize, AppError> {
    let bytes = generate_xlsx_report(view, dashboard)?;
    std::fs::write(path, bytes)?;
    log::info!("Exported {} rows to {}", view.len(), path.display());
    Ok(view.len())
}

// ── Sheet 1: filtered rows ───────────────────────────────────────────────────

fn write_rows(wb: &mut Workbook, view: &FilteredView<'_>) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name("Data")?;

    let hdr = create_header_format();
    let date = create_date_format();
    let datetime = create_datetime_format();
    let schema = view.dataset().schema();

    for (col, column) in schema.iter().enumerate() {
        ws.write_with_format(0, col as u16, column.name.as_str(), &hdr)?;
    }

    for (i, record) in view.records().enumerate() {
        let row = (i + 1) as u32;
        for (col, column) in schema.iter().enumerate() {
            write_cell(ws, row, col as u16, record, column.role, &date, &datetime)?;
        }
    }

    if !view.is_empty() && !schema.is_empty() {
        let last_row = view.len() as u32;
        ws.set_freeze_panes(1, 0)?;
        ws.autofilter(0, 0, last_row, (schema.len() - 1) as u16)?;
        if let Some(col) = schema
            .iter()
            .position(|c| c.role == ColumnRole::Measure(Measure::Stockout))
        {
            highlight_positive(ws, 1, col as u16, last_row)?;
        }
    }
    for col in 0..schema.len() {
        ws.set_column_width(col as u16, 16)?;
    }

    Ok(())
}

/// Missing values leave the cell blank.
fn write_cell(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    record: &Record,
    role: ColumnRole,
    date: &Format,
    datetime: &Format,
) -> Result<(), XlsxError> {
    match role {
        ColumnRole::Dimension(Dimension::Date) => {
            if let Some(dt) = &record.date {
                let format = if dt.time() == NaiveTime::MIN { date } else { datetime };
                ws.write_datetime_with_format(row, col, dt, format)?;
            }
        }
        ColumnRole::Dimension(dim) => {
            if let Some(text) = record.text(dim) {
                ws.write(row, col, text)?;
            }
        }
        ColumnRole::Measure(m) => {
            if let Some(v) = record.measure(m) {
                ws.write(row, col, v)?;
            }
        }
        ColumnRole::Extra(i) => {
            if let Some(text) = record.extra.get(i).filter(|s| !s.is_empty()) {
                ws.write(row, col, text.as_str())?;
            }
        }
    }
    Ok(())
}

// ── Sheet 2: KPI summary ─────────────────────────────────────────────────────

fn write_summary(wb: &mut Workbook, kpis: &KpiSection) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name("Summary")?;

    let hdr = create_header_format();
    let num = create_number_format();

    ws.write_with_format(0, 0, "Indicator", &hdr)?;
    ws.write_with_format(0, 1, "Value", &hdr)?;

    let rows: Vec<(&str, f64)> = [
        ("Total demand forecast", Some(kpis.total_demand)),
        ("Total stock", kpis.total_stock),
        ("Total sales", kpis.total_sales),
        ("Stockout days", kpis.stockout_days),
        ("Date span (days)", kpis.date_span_days.map(|d| d as f64)),
        ("Rows", Some(kpis.row_count as f64)),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.map(|v| (label, v)))
    .collect();

    for (i, (label, value)) in rows.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write(row, 0, *label)?;
        ws.write_with_format(row, 1, *value, &num)?;
    }

    ws.set_column_width(0, 26)?;
    ws.set_column_width(1, 16)?;
    Ok(())
}

// ── Sheet 3: ABC ranking ─────────────────────────────────────────────────────

fn write_abc(wb: &mut Workbook, entries: &[AbcEntry]) -> Result<(), XlsxError> {
    let ws = wb.add_worksheet();
    ws.set_name("ABC")?;

    let hdr = create_header_format();
    let num = create_number_format();
    let pct = create_percent_format();

    let headers = ["Product", "Demand Forecast", "Cumulative share", "Class"];
    for (col, h) in headers.iter().enumerate() {
        ws.write_with_format(0, col as u16, *h, &hdr)?;
    }
    for (i, e) in entries.iter().enumerate() {
        let row = (i + 1) as u32;
        ws.write(row, 0, e.key.to_string())?;
        ws.write_with_format(row, 1, e.value, &num)?;
        ws.write_with_format(row, 2, e.cumulative_fraction, &pct)?;
        ws.write(row, 3, format!("{:?}", e.class))?;
    }
    if !entries.is_empty() {
        ws.set_freeze_panes(1, 0)?;
    }
    ws.set_column_width(0, 22)?;
    Ok(())
}
