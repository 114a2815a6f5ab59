use std::io::{Read, Seek};
use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::config::DashboardConfig;
use crate::error::AppError;
use crate::parser::columns::{validate_columns, ColumnMap, ColumnValidation};
use crate::parser::deserializers::{
    format_datetime, parse_datetime, parse_opt_f64, parse_opt_text,
};
use crate::parser::types::{
    ColumnRole, Dataset, Dimension, LoadOutput, Measure, ParseWarning, Record,
};

/// Extensions routed to the spreadsheet reader; anything else is read as CSV.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// A single source cell before it is assigned to a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    DateTime(NaiveDateTime),
}

impl RawCell {
    fn from_data(data: &Data) -> RawCell {
        match data {
            Data::Empty => RawCell::Empty,
            Data::String(s) => RawCell::Text(s.clone()),
            Data::Float(f) => RawCell::Number(*f),
            Data::Int(i) => RawCell::Number(*i as f64),
            Data::Bool(b) => RawCell::Text(b.to_string()),
            Data::Error(e) => RawCell::Text(format!("{:?}", e)),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(ndt) => RawCell::DateTime(ndt),
                None => RawCell::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) => RawCell::Text(s.clone()),
            Data::DurationIso(s) => RawCell::Text(s.clone()),
        }
    }

    fn to_text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.trim().to_string(),
            RawCell::Number(n) => n.to_string(),
            RawCell::DateTime(dt) => format_datetime(dt),
        }
    }
}

/// Load the dataset at `path`, choosing the reader from the file extension.
pub fn load_dataset(path: &Path, config: &DashboardConfig) -> Result<LoadOutput, AppError> {
    let is_workbook = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKBOOK_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
    let output = if is_workbook {
        parse_workbook(path, config)?
    } else {
        parse_csv(path, config)?
    };
    log::info!(
        "Loaded {} rows from {} ({} warnings, {} ms)",
        output.dataset.len(),
        path.display(),
        output.warnings.len(),
        output.parse_duration_ms
    );
    Ok(output)
}

/// Parse a delimited text file from `path`.
pub fn parse_csv(path: &Path, config: &DashboardConfig) -> Result<LoadOutput, AppError> {
    let file = std::fs::File::open(path)?;
    parse_csv_reader(std::io::BufReader::new(file), config)
}

/// Core CSV parsing logic. Accepts any `Read` source, useful for tests.
pub fn parse_csv_reader<R: Read>(
    reader: R,
    config: &DashboardConfig,
) -> Result<LoadOutput, AppError> {
    let start = Instant::now();

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte())
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .double_quote(true)
        .quoting(true)
        .from_reader(reader);

    // Phase 1: validate columns
    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::EmptyFile);
    }
    let mut builder = DatasetBuilder::new(headers.iter(), config)?;

    // Phase 2: parse records
    let mut row_idx = 0usize;
    for result in rdr.records() {
        row_idx += 1;
        let line = row_idx + 1; // +1 for the header row
        match result {
            Ok(record) => {
                builder.push_row(line, record.iter().map(|f| RawCell::Text(f.to_string())))
            }
            Err(err) => builder.skip_row(line, err.to_string()),
        }
    }

    builder.finish(start)
}

/// Parse the first worksheet of a spreadsheet file.
pub fn parse_workbook(path: &Path, config: &DashboardConfig) -> Result<LoadOutput, AppError> {
    let start = Instant::now();
    let mut workbook = open_workbook_auto(path)?;
    read_first_sheet(&mut workbook, config, start)
}

/// Same as [`parse_workbook`] for an in-memory workbook.
pub fn parse_workbook_reader<RS>(
    reader: RS,
    config: &DashboardConfig,
) -> Result<LoadOutput, AppError>
where
    RS: Read + Seek + Clone,
{
    let start = Instant::now();
    let mut workbook = open_workbook_auto_from_rs(reader)?;
    read_first_sheet(&mut workbook, config, start)
}

fn read_first_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    config: &DashboardConfig,
    start: Instant,
) -> Result<LoadOutput, AppError> {
    let sheet_name = first_sheet_name(&workbook.sheet_names())?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let header_row = rows.next().ok_or(AppError::EmptyFile)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| RawCell::from_data(cell).to_text())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(AppError::EmptyFile);
    }
    let mut builder = DatasetBuilder::new(headers.iter(), config)?;

    for (i, row) in rows.enumerate() {
        builder.push_row(i + 2, row.iter().map(RawCell::from_data));
    }

    builder.finish(start)
}

fn first_sheet_name(names: &[String]) -> Result<String, AppError> {
    names.first().cloned().ok_or(AppError::NoSheet)
}

/// Accumulates records for a validated header row.
struct DatasetBuilder {
    col_map: ColumnMap,
    validation: ColumnValidation,
    records: Vec<Record>,
    warnings: Vec<ParseWarning>,
    rows_seen: usize,
}

impl DatasetBuilder {
    fn new<I, S>(headers: I, config: &DashboardConfig) -> Result<Self, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let col_map = ColumnMap::from_headers(headers, &config.columns);
        let validation = validate_columns(&col_map, &config.columns)?;
        Ok(DatasetBuilder {
            col_map,
            validation,
            records: Vec::with_capacity(1_024),
            warnings: Vec::new(),
            rows_seen: 0,
        })
    }

    fn skip_row(&mut self, line: usize, message: String) {
        self.rows_seen += 1;
        log::warn!("Skipping line {}: {}", line, message);
        self.warnings.push(ParseWarning { line, message });
    }

    fn push_row<I: IntoIterator<Item = RawCell>>(&mut self, line: usize, cells: I) {
        self.rows_seen += 1;
        let mut record = Record {
            extra: vec![String::new(); self.col_map.extra_count()],
            ..Default::default()
        };
        let mut cells = cells.into_iter();

        for column in self.col_map.columns() {
            let cell = cells.next().unwrap_or(RawCell::Empty);
            match column.role {
                ColumnRole::Dimension(Dimension::Date) => match cell_to_datetime(&cell) {
                    Ok(value) => record.date = value,
                    Err(msg) => self.warnings.push(ParseWarning {
                        line,
                        message: format!("{}: {}", column.name, msg),
                    }),
                },
                ColumnRole::Dimension(Dimension::Store) => {
                    record.store = parse_opt_text(&cell.to_text())
                }
                ColumnRole::Dimension(Dimension::Category) => {
                    record.category = parse_opt_text(&cell.to_text())
                }
                ColumnRole::Dimension(Dimension::Product) => {
                    record.product = parse_opt_text(&cell.to_text())
                }
                ColumnRole::Measure(measure) => match cell_to_f64(&cell) {
                    Ok(value) => set_measure(&mut record, measure, value),
                    Err(msg) => self.warnings.push(ParseWarning {
                        line,
                        message: format!("{}: {}", column.name, msg),
                    }),
                },
                ColumnRole::Extra(idx) => record.extra[idx] = cell.to_text(),
            }
        }

        self.records.push(record);
    }

    fn finish(self, start: Instant) -> Result<LoadOutput, AppError> {
        if self.rows_seen == 0 {
            return Err(AppError::EmptyFile);
        }
        for w in &self.warnings {
            log::debug!("line {}: {}", w.line, w.message);
        }
        Ok(LoadOutput {
            dataset: Dataset::new(self.col_map.into_columns(), self.records),
            warnings: self.warnings,
            total_rows_processed: self.rows_seen,
            detected_columns: self.validation.present,
            missing_optional_columns: self.validation.missing_optional,
            parse_duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

fn set_measure(record: &mut Record, measure: Measure, value: Option<f64>) {
    match measure {
        Measure::DemandForecast => record.demand_forecast = value,
        Measure::Stock => record.stock = value,
        Measure::Sales => record.sales = value,
        Measure::Stockout => record.stockout = value,
    }
}

fn cell_to_f64(cell: &RawCell) -> Result<Option<f64>, String> {
    match cell {
        RawCell::Empty => Ok(None),
        RawCell::Text(s) => parse_opt_f64(s),
        RawCell::Number(n) if n.is_finite() => Ok(Some(*n)),
        RawCell::Number(n) => Err(format!("not a number: {}", n)),
        RawCell::DateTime(dt) => Err(format!("expected a number, found date {}", dt)),
    }
}

fn cell_to_datetime(cell: &RawCell) -> Result<Option<NaiveDateTime>, String> {
    match cell {
        RawCell::Empty => Ok(None),
        RawCell::DateTime(dt) => Ok(Some(*dt)),
        RawCell::Number(serial) => excel_serial_to_datetime(*serial)
            .map(Some)
            .ok_or_else(|| format!("invalid date serial: {}", serial)),
        RawCell::Text(s) if s.trim().is_empty() => Ok(None),
        RawCell::Text(s) => parse_datetime(s)
            .map(Some)
            .ok_or_else(|| format!("invalid date: {:?}", s.trim())),
    }
}

/// Spreadsheet day serial (1900 date system) to a timestamp.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
