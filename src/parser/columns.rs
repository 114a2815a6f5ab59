use crate::config::ColumnNames;
use crate::error::AppError;
use crate::parser::types::{Column, ColumnRole, Dimension, Measure};

/// Label reported in `missing_optional_columns` when no date-like header exists.
pub const DATE_COLUMN_LABEL: &str = "<date>";

/// Maps source column positions to their role in a `Record`.
pub struct ColumnMap {
    columns: Vec<Column>,
    extra_count: usize,
}

impl ColumnMap {
    /// Build a ColumnMap from the header row.
    /// Header fields are trimmed of surrounding whitespace (and a leading BOM).
    /// The first header containing "date" (case-insensitive) becomes the date
    /// column; known names are matched exactly, first occurrence wins.
    pub fn from_headers<I, S>(headers: I, names: &ColumnNames) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let trimmed: Vec<String> = headers
            .into_iter()
            .map(|h| h.as_ref().trim_start_matches('\u{FEFF}').trim().to_string())
            .collect();
        let date_idx = detect_date_column(&trimmed);

        let known: [(&str, ColumnRole); 7] = [
            (names.store.as_str(), ColumnRole::Dimension(Dimension::Store)),
            (names.category.as_str(), ColumnRole::Dimension(Dimension::Category)),
            (names.product.as_str(), ColumnRole::Dimension(Dimension::Product)),
            (
                names.demand_forecast.as_str(),
                ColumnRole::Measure(Measure::DemandForecast),
            ),
            (names.stock.as_str(), ColumnRole::Measure(Measure::Stock)),
            (names.sales.as_str(), ColumnRole::Measure(Measure::Sales)),
            (names.stockout.as_str(), ColumnRole::Measure(Measure::Stockout)),
        ];

        let mut columns: Vec<Column> = Vec::with_capacity(trimmed.len());
        let mut extra_count = 0usize;
        for (i, name) in trimmed.into_iter().enumerate() {
            let role = if Some(i) == date_idx {
                ColumnRole::Dimension(Dimension::Date)
            } else {
                known
                    .iter()
                    .find(|(label, role)| {
                        *label == name && !columns.iter().any(|c| c.role == *role)
                    })
                    .map(|(_, role)| *role)
                    .unwrap_or_else(|| {
                        extra_count += 1;
                        ColumnRole::Extra(extra_count - 1)
                    })
            };
            columns.push(Column { name, role });
        }

        ColumnMap {
            columns,
            extra_count,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn extra_count(&self) -> usize {
        self.extra_count
    }

    /// Returns true if a column plays the given role.
    pub fn has_role(&self, role: ColumnRole) -> bool {
        self.columns.iter().any(|c| c.role == role)
    }

    /// All header names in order.
    pub fn all_headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Index of the first header whose lowercase form contains "date".
pub fn detect_date_column(headers: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.to_lowercase().contains("date"))
}

/// Result of column validation.
#[derive(Debug)]
pub struct ColumnValidation {
    /// All column names present in the source.
    pub present: Vec<String>,
    /// Optional columns that are absent from the source.
    pub missing_optional: Vec<String>,
}

/// Validate that the demand forecast column is present.
/// Returns `AppError::MissingColumns` if it is absent.
pub fn validate_columns(
    col_map: &ColumnMap,
    names: &ColumnNames,
) -> Result<ColumnValidation, AppError> {
    if !col_map.has_role(ColumnRole::Measure(Measure::DemandForecast)) {
        return Err(AppError::MissingColumns(vec![names.demand_forecast.clone()]));
    }

    let optional: [(&str, ColumnRole); 7] = [
        (names.store.as_str(), ColumnRole::Dimension(Dimension::Store)),
        (names.category.as_str(), ColumnRole::Dimension(Dimension::Category)),
        (names.product.as_str(), ColumnRole::Dimension(Dimension::Product)),
        (DATE_COLUMN_LABEL, ColumnRole::Dimension(Dimension::Date)),
        (names.stock.as_str(), ColumnRole::Measure(Measure::Stock)),
        (names.sales.as_str(), ColumnRole::Measure(Measure::Sales)),
        (names.stockout.as_str(), ColumnRole::Measure(Measure::Stockout)),
    ];
    let missing_optional = optional
        .iter()
        .filter(|(_, role)| !col_map.has_role(*role))
        .map(|(label, _)| label.to_string())
        .collect();

    Ok(ColumnValidation {
        present: col_map.all_headers(),
        missing_optional,
    })
}
