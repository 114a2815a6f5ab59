pub mod csv;
pub mod xlsx;

pub use self::csv::{export_csv, write_csv};
pub use self::xlsx::{export_xlsx, generate_xlsx_report};

use rust_xlsxwriter::{
    ConditionalFormatCell, ConditionalFormatCellRule, Format, FormatBorder, Worksheet, XlsxError,
};

use crate::parser::deserializers::format_datetime;
use crate::parser::types::{ColumnRole, Dimension, Record};

/// Text of one record cell as written to delimited output. Missing values
/// become the empty string.
pub(crate) fn cell_text(record: &Record, role: ColumnRole) -> String {
    match role {
        ColumnRole::Dimension(Dimension::Date) => {
            record.date.as_ref().map(format_datetime).unwrap_or_default()
        }
        ColumnRole::Dimension(dim) => record.text(dim).unwrap_or_default().to_string(),
        ColumnRole::Measure(m) => record.measure(m).map(|v| v.to_string()).unwrap_or_default(),
        ColumnRole::Extra(i) => record.extra.get(i).cloned().unwrap_or_default(),
    }
}

/// Header: dark blue fill, white bold text, thin border.
pub fn create_header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color("2C5F8A")
        .set_font_color("FFFFFF")
        .set_font_size(11)
        .set_border(FormatBorder::Thin)
        .set_text_wrap()
}

/// Calendar date yyyy-mm-dd
pub fn create_date_format() -> Format {
    Format::new().set_num_format("yyyy-mm-dd")
}

/// Timestamp with seconds
pub fn create_datetime_format() -> Format {
    Format::new().set_num_format("yyyy-mm-dd hh:mm:ss")
}

/// Decimal #,##0.00
pub fn create_number_format() -> Format {
    Format::new().set_num_format("#,##0.00")
}

/// Percentage 0.0%
pub fn create_percent_format() -> Format {
    Format::new().set_num_format("0.0%")
}

/// Red fill on every cell of column `col` holding a value above zero.
pub fn highlight_positive(
    ws: &mut Worksheet,
    first_row: u32,
    col: u16,
    last_row: u32,
) -> Result<(), XlsxError> {
    let red = Format::new()
        .set_background_color("FFC7CE")
        .set_font_color("9C0006");
    ws.add_conditional_format(
        first_row,
        col,
        last_row,
        col,
        &ConditionalFormatCell::new()
            .set_rule(ConditionalFormatCellRule::GreaterThan(0.0))
            .set_format(&red),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::parser::types::Measure;

    #[test]
    fn test_cell_text() {
        let record = Record {
            store: Some("S1".into()),
            date: NaiveDate::from_ymd_opt(2024, 2, 3).unwrap().and_hms_opt(0, 0, 0),
            stock: Some(12.5),
            sales: Some(8.0),
            extra: vec!["north".into()],
            ..Default::default()
        };
        assert_eq!(cell_text(&record, ColumnRole::Dimension(Dimension::Store)), "S1");
        assert_eq!(cell_text(&record, ColumnRole::Dimension(Dimension::Product)), "");
        assert_eq!(cell_text(&record, ColumnRole::Dimension(Dimension::Date)), "2024-02-03");
        assert_eq!(cell_text(&record, ColumnRole::Measure(Measure::Stock)), "12.5");
        assert_eq!(cell_text(&record, ColumnRole::Measure(Measure::Sales)), "8");
        assert_eq!(cell_text(&record, ColumnRole::Measure(Measure::Stockout)), "");
        assert_eq!(cell_text(&record, ColumnRole::Extra(0)), "north");
        assert_eq!(cell_text(&record, ColumnRole::Extra(3)), "");
    }
}
